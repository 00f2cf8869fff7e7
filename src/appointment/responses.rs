use crate::protocol::PageInfo;
use serde::Serialize;

#[derive(Default, Serialize)]
pub struct AppointmentItem {
    pub id: u64,
    pub code: String,
    pub patient_id: u64,
    pub patient_name: String,
    pub patient_document: String,
    pub doctor_id: u64,
    pub doctor_name: String,
    pub specialty_name: String,
    pub date: String,
    pub time: String,
    pub duration: i32,
    pub kind: String,
    pub reason: String,
    pub status: String,
    pub notes: String,
}

#[derive(Default, Serialize)]
pub struct SearchAppointmentResponse {
    pub success: bool,
    pub err: String,
    pub page: PageInfo,
    pub appointments: Vec<AppointmentItem>,
}

crate::impl_err_response! {
    SearchAppointmentResponse,
}
