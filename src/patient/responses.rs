use crate::protocol::PageInfo;
use serde::Serialize;

#[derive(Default, Serialize)]
pub struct PatientItem {
    pub id: u64,
    pub code: String,
    pub first_name: String,
    pub last_name: String,
    pub document_type: String,
    pub document_number: String,
    pub birth_date: String,
    pub sex: String,
    pub blood_type: String,
    pub regime: String,
    pub department_id: u64,
    pub city_id: u64,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub marital_status: String,
    pub occupation: String,
    pub eps: String,
    pub emergency_contact: String,
    pub emergency_phone: String,
}

#[derive(Default, Serialize)]
pub struct SearchPatientResponse {
    pub success: bool,
    pub err: String,
    pub page: PageInfo,
    pub patients: Vec<PatientItem>,
}

crate::impl_err_response! {
    SearchPatientResponse,
}
