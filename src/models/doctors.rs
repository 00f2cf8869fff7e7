use crate::schema::doctors;
use chrono::{NaiveDate, NaiveDateTime};

#[derive(Queryable)]
pub struct Doctor {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub document_type: String,
    pub document_number: String,
    pub birth_date: NaiveDate,
    pub gender: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub department_id: u64,
    pub city_id: u64,
    pub university_id: u64,
    pub years_experience: i32,
    pub specialty: String,
    pub registry_number: String,
    pub status: String,
    pub registered_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn display_name(&self) -> String {
        format!("Dr. {} {}", self.first_name, self.last_name)
    }
}

#[derive(Insertable)]
#[table_name = "doctors"]
pub struct NewDoctor {
    pub first_name: String,
    pub last_name: String,
    pub document_type: String,
    pub document_number: String,
    pub birth_date: NaiveDate,
    pub gender: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub department_id: u64,
    pub city_id: u64,
    pub university_id: u64,
    pub years_experience: i32,
    pub specialty: String,
    pub registry_number: String,
    pub status: String,
    pub registered_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[table_name = "doctors"]
pub struct UpdateDoctor {
    pub first_name: String,
    pub last_name: String,
    pub document_type: String,
    pub document_number: String,
    pub birth_date: NaiveDate,
    pub gender: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub department_id: u64,
    pub city_id: u64,
    pub university_id: u64,
    pub years_experience: i32,
    pub specialty: String,
    pub registry_number: String,
    pub status: String,
    pub updated_at: NaiveDateTime,
}

pub const DOCTOR_STATUS_ACTIVE: &str = "Activo";
