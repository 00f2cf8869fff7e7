use serde::Deserialize;

#[derive(Deserialize)]
pub struct DepartmentsRequest {}

#[derive(Deserialize)]
pub struct CitiesRequest {
    pub department_id: u64,
}

#[derive(Deserialize)]
pub struct UniversitiesRequest {}

#[derive(Deserialize)]
pub struct ServicesRequest {
    pub active_only: Option<bool>,
}

#[derive(Deserialize)]
pub struct AddServiceRequest {
    pub login_token: String,
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub price: Option<f64>,
    pub active: Option<bool>,
}

#[derive(Deserialize)]
pub struct ModifyServiceRequest {
    pub login_token: String,
    pub id: u64,
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub price: Option<f64>,
    pub active: Option<bool>,
}

#[derive(Deserialize)]
pub struct CodeListRequest {}
