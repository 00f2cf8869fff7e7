use serde::Deserialize;

#[derive(Deserialize, Default)]
pub struct AppointmentForm {
    pub patient_id: Option<u64>,
    pub doctor_id: Option<u64>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub duration: Option<i32>,
    pub kind: Option<String>,
    pub reason: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct AddAppointmentRequest {
    pub login_token: String,
    #[serde(flatten)]
    pub appointment: AppointmentForm,
}

#[derive(Deserialize)]
pub struct ModifyAppointmentRequest {
    pub login_token: String,
    pub id: u64,
    #[serde(flatten)]
    pub appointment: AppointmentForm,
}

#[derive(Deserialize)]
pub struct DeleteAppointmentRequest {
    pub login_token: String,
    pub id: u64,
}

#[derive(Deserialize)]
pub struct SearchAppointmentRequest {
    pub login_token: String,
    pub keyword: Option<String>,
    pub date: Option<String>,
    pub status: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Deserialize)]
pub struct ExportAppointmentRequest {
    pub login_token: String,
    pub keyword: Option<String>,
    pub date: Option<String>,
    pub status: Option<String>,
}
