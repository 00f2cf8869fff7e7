use crate::protocol::PageInfo;
use serde::Serialize;

#[derive(Default, Serialize)]
pub struct InvoiceItem {
    pub id: u64,
    pub code: String,
    pub appointment_id: u64,
    pub appointment_code: String,
    pub patient_name: String,
    pub patient_document: String,
    pub doctor_name: String,
    pub service: String,
    pub amount: f64,
    pub status: String,
    pub issued_at: String,
    pub due_date: String,
    pub payment_method: String,
    pub kind: String,
    pub notes: String,
}

#[derive(Default, Serialize)]
pub struct SearchInvoiceResponse {
    pub success: bool,
    pub err: String,
    pub page: PageInfo,
    pub invoices: Vec<InvoiceItem>,
}

#[derive(Default, Serialize)]
pub struct PendingAppointmentItem {
    pub id: u64,
    pub code: String,
    pub patient_name: String,
    pub doctor_name: String,
    pub date: String,
}

#[derive(Default, Serialize)]
pub struct PendingAppointmentsResponse {
    pub success: bool,
    pub err: String,
    pub appointments: Vec<PendingAppointmentItem>,
}

#[derive(Default, Serialize)]
pub struct SuggestServiceResponse {
    pub success: bool,
    pub err: String,
    pub specialty_name: String,
    pub service: Option<String>,
    pub price: Option<f64>,
}

crate::impl_err_response! {
    SearchInvoiceResponse,
    PendingAppointmentsResponse,
    SuggestServiceResponse,
}
