use crate::schema::appointments;
use chrono::{NaiveDate, NaiveTime};

#[derive(Queryable)]
pub struct Appointment {
    pub id: u64,
    pub patient_id: u64,
    pub doctor_id: u64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration: i32,
    pub kind: String,
    pub reason: String,
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Insertable, AsChangeset, Debug)]
#[table_name = "appointments"]
#[changeset_options(treat_none_as_null = "true")]
pub struct AppointmentData {
    pub patient_id: u64,
    pub doctor_id: u64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration: i32,
    pub kind: String,
    pub reason: String,
    pub status: String,
    pub notes: Option<String>,
}
