use serde::Deserialize;

#[derive(Deserialize)]
pub struct AddHistoryRequest {
    pub login_token: String,
    pub appointment_id: Option<u64>,
    pub reason: Option<String>,
    pub background: Option<String>,
    pub treatment: Option<String>,
    /// CIE-10 ids in the order chosen; the first valid one is the principal.
    #[serde(default)]
    pub diagnoses: Vec<u64>,
}

#[derive(Deserialize)]
pub struct ModifyHistoryRequest {
    pub login_token: String,
    pub id: u64,
    pub reason: Option<String>,
    pub background: Option<String>,
    pub treatment: Option<String>,
    #[serde(default)]
    pub diagnoses: Vec<u64>,
}

#[derive(Deserialize)]
pub struct DeleteHistoryRequest {
    pub login_token: String,
    pub id: u64,
}

#[derive(Deserialize)]
pub struct ViewHistoryRequest {
    pub login_token: String,
    pub id: u64,
}

#[derive(Deserialize)]
pub struct SearchHistoryRequest {
    pub login_token: String,
    pub keyword: Option<String>,
    pub doctor_id: Option<u64>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Deserialize)]
pub struct PendingAppointmentsRequest {
    pub login_token: String,
}

#[derive(Deserialize)]
pub struct ExportHistoryRequest {
    pub login_token: String,
    pub id: u64,
}

#[derive(Deserialize)]
pub struct ExportHistoriesRequest {
    pub login_token: String,
    pub keyword: Option<String>,
    pub doctor_id: Option<u64>,
    /// Matched against the linked CIE-10 codes and descriptions.
    pub diagnosis: Option<String>,
}
