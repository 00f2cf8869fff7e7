use crate::protocol::PageInfo;
use serde::Serialize;

#[derive(Default, Serialize, Clone, Debug, PartialEq)]
pub struct DiagnosisItem {
    pub cie10_id: u64,
    pub code: String,
    pub description: String,
    pub kind: String,
}

#[derive(Default, Serialize)]
pub struct HistoryItem {
    pub id: u64,
    pub code: String,
    pub appointment_id: u64,
    pub appointment_code: String,
    pub recorded_at: String,
    pub patient_id: u64,
    pub patient_name: String,
    pub patient_document: String,
    pub doctor_id: u64,
    pub doctor_name: String,
    pub specialty_name: String,
    pub reason: String,
    pub background: String,
    pub treatment: String,
    pub diagnoses: Vec<DiagnosisItem>,
}

#[derive(Default, Serialize)]
pub struct ViewHistoryResponse {
    pub success: bool,
    pub err: String,
    pub history: HistoryItem,
}

#[derive(Default, Serialize)]
pub struct SearchHistoryResponse {
    pub success: bool,
    pub err: String,
    pub page: PageInfo,
    pub histories: Vec<HistoryItem>,
}

#[derive(Default, Serialize)]
pub struct PendingAppointmentItem {
    pub id: u64,
    pub code: String,
    pub patient_name: String,
    pub doctor_name: String,
    pub date: String,
    pub time: String,
}

#[derive(Default, Serialize)]
pub struct PendingAppointmentsResponse {
    pub success: bool,
    pub err: String,
    pub appointments: Vec<PendingAppointmentItem>,
}

crate::impl_err_response! {
    ViewHistoryResponse,
    SearchHistoryResponse,
    PendingAppointmentsResponse,
}
