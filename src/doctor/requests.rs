use serde::Deserialize;

#[derive(Deserialize, Default)]
pub struct DoctorForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub document_type: Option<String>,
    pub document_number: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub department_id: Option<u64>,
    pub city_id: Option<u64>,
    pub university_id: Option<u64>,
    pub years_experience: Option<i32>,
    pub specialty: Option<String>,
    pub registry_number: Option<String>,
}

#[derive(Deserialize)]
pub struct AddDoctorRequest {
    pub login_token: String,
    #[serde(flatten)]
    pub doctor: DoctorForm,
}

#[derive(Deserialize)]
pub struct ModifyDoctorRequest {
    pub login_token: String,
    pub id: u64,
    pub status: Option<String>,
    #[serde(flatten)]
    pub doctor: DoctorForm,
}

#[derive(Deserialize)]
pub struct DeleteDoctorRequest {
    pub login_token: String,
    pub id: u64,
}

#[derive(Deserialize)]
pub struct SearchDoctorRequest {
    pub login_token: String,
    pub keyword: Option<String>,
    pub specialty: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Deserialize)]
pub struct ExportDoctorRequest {
    pub login_token: String,
    pub keyword: Option<String>,
    pub specialty: Option<String>,
}
