use crate::schema::patients;
use chrono::NaiveDate;

#[derive(Queryable)]
pub struct Patient {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub document_type: String,
    pub document_number: String,
    pub birth_date: NaiveDate,
    pub sex: String,
    pub blood_type: Option<String>,
    pub regime: Option<String>,
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

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Used both for inserts and for full-form updates.
#[derive(Insertable, AsChangeset, Debug)]
#[table_name = "patients"]
#[changeset_options(treat_none_as_null = "true")]
pub struct PatientData {
    pub first_name: String,
    pub last_name: String,
    pub document_type: String,
    pub document_number: String,
    pub birth_date: NaiveDate,
    pub sex: String,
    pub blood_type: Option<String>,
    pub regime: Option<String>,
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

pub const SEXES: [&str; 3] = ["M", "F", "O"];
