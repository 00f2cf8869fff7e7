use crate::schema::{histories, history_diagnoses};
use chrono::NaiveDateTime;

#[derive(Queryable)]
pub struct History {
    pub id: u64,
    pub appointment_id: u64,
    pub recorded_at: NaiveDateTime,
    pub reason: String,
    pub background: Option<String>,
    pub treatment: Option<String>,
}

#[derive(Insertable)]
#[table_name = "histories"]
pub struct NewHistory {
    pub appointment_id: u64,
    pub recorded_at: NaiveDateTime,
    pub reason: String,
    pub background: Option<String>,
    pub treatment: Option<String>,
}

#[derive(AsChangeset)]
#[table_name = "histories"]
#[changeset_options(treat_none_as_null = "true")]
pub struct UpdateHistory {
    pub recorded_at: NaiveDateTime,
    pub reason: String,
    pub background: Option<String>,
    pub treatment: Option<String>,
}

#[derive(Queryable, Insertable)]
#[table_name = "history_diagnoses"]
pub struct HistoryDiagnosis {
    pub history_id: u64,
    pub cie10_id: u64,
    pub kind: Option<String>,
}

pub const DIAGNOSIS_KIND_PRINCIPAL: &str = "Principal";
pub const DIAGNOSIS_KIND_RELATED: &str = "Relacionado";
