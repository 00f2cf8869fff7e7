use serde::Serialize;

#[derive(Default, Serialize)]
pub struct NamedItem {
    pub id: u64,
    pub name: String,
}

#[derive(Default, Serialize)]
pub struct DepartmentsResponse {
    pub success: bool,
    pub err: String,
    pub departments: Vec<NamedItem>,
}

#[derive(Default, Serialize)]
pub struct CitiesResponse {
    pub success: bool,
    pub err: String,
    pub cities: Vec<NamedItem>,
}

#[derive(Default, Serialize)]
pub struct UniversityItem {
    pub id: u64,
    pub name: String,
    pub acronym: String,
    pub department: String,
    pub city: String,
    pub kind: String,
    pub status: String,
}

#[derive(Default, Serialize)]
pub struct UniversitiesResponse {
    pub success: bool,
    pub err: String,
    pub universities: Vec<UniversityItem>,
}

#[derive(Default, Serialize)]
pub struct ServiceItem {
    pub id: u64,
    pub name: String,
    pub specialty: String,
    pub specialty_name: String,
    pub price: f64,
    pub active: bool,
}

#[derive(Default, Serialize)]
pub struct ServicesResponse {
    pub success: bool,
    pub err: String,
    pub services: Vec<ServiceItem>,
}

#[derive(Default, Serialize)]
pub struct CodeItem {
    pub code: String,
    pub name: String,
}

#[derive(Default, Serialize)]
pub struct CodeListResponse {
    pub success: bool,
    pub err: String,
    pub items: Vec<CodeItem>,
}

crate::impl_err_response! {
    DepartmentsResponse,
    CitiesResponse,
    UniversitiesResponse,
    ServicesResponse,
    CodeListResponse,
}
