use serde::Deserialize;

/// Every field of the patient form; blank values are rejected as missing.
#[derive(Deserialize, Default)]
pub struct PatientForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub document_type: Option<String>,
    pub document_number: Option<String>,
    pub birth_date: Option<String>,
    pub sex: Option<String>,
    pub blood_type: Option<String>,
    pub regime: Option<String>,
    pub department_id: Option<u64>,
    pub city_id: Option<u64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub marital_status: Option<String>,
    pub occupation: Option<String>,
    pub eps: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
}

#[derive(Deserialize)]
pub struct AddPatientRequest {
    pub login_token: String,
    #[serde(flatten)]
    pub patient: PatientForm,
}

#[derive(Deserialize)]
pub struct ModifyPatientRequest {
    pub login_token: String,
    pub id: u64,
    #[serde(flatten)]
    pub patient: PatientForm,
}

#[derive(Deserialize)]
pub struct DeletePatientRequest {
    pub login_token: String,
    pub id: u64,
}

#[derive(Deserialize)]
pub struct SearchPatientRequest {
    pub login_token: String,
    pub keyword: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Deserialize)]
pub struct ExportPatientRequest {
    pub login_token: String,
    pub keyword: Option<String>,
}
