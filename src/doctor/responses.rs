use crate::protocol::PageInfo;
use serde::Serialize;

#[derive(Default, Serialize)]
pub struct DoctorItem {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub document_type: String,
    pub document_number: String,
    pub birth_date: String,
    pub gender: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub department_id: u64,
    pub city_id: u64,
    pub university_id: u64,
    pub years_experience: i32,
    pub specialty: String,
    pub specialty_name: String,
    pub registry_number: String,
    pub status: String,
    pub registered_at: String,
    pub updated_at: String,
}

#[derive(Default, Serialize)]
pub struct SearchDoctorResponse {
    pub success: bool,
    pub err: String,
    pub page: PageInfo,
    pub doctors: Vec<DoctorItem>,
}

crate::impl_err_response! {
    SearchDoctorResponse,
}
