//! Helpers for tests that need MySQL. They run only when `DATABASE_URL`
//! points at a migrated database, and callers wrap their work in
//! `test_transaction` so nothing they seed is kept.

use chrono::{NaiveDate, NaiveTime, Utc};
use diesel::{prelude::*, MysqlConnection};

use super::last_insert_id;
use crate::{
    models::{
        accounts::NewAccount, appointments::AppointmentData, doctors::NewDoctor,
        patients::PatientData,
    },
    utils::hash_password,
};

pub fn connect() -> Option<MysqlConnection> {
    let url = std::env::var("DATABASE_URL").ok()?;
    Some(MysqlConnection::establish(&url).expect("DATABASE_URL is set but unreachable"))
}

/// Short value unique enough for the UNIQUE columns of one test run.
pub fn unique(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{}{}", prefix, &id[..10])
}

fn inserted_id(conn: &MysqlConnection) -> u64 {
    diesel::select(last_insert_id)
        .get_result::<u64>(conn)
        .expect("last insert id")
}

pub fn seed_department(conn: &MysqlConnection, name: &str) -> u64 {
    use crate::schema::departments;

    diesel::insert_into(departments::table)
        .values(departments::name.eq(name))
        .execute(conn)
        .expect("insert department");
    inserted_id(conn)
}

pub fn seed_city(conn: &MysqlConnection, department_id: u64, name: &str) -> u64 {
    use crate::schema::cities;

    diesel::insert_into(cities::table)
        .values((cities::name.eq(name), cities::department_id.eq(department_id)))
        .execute(conn)
        .expect("insert city");
    inserted_id(conn)
}

/// A patient and a doctor in a fresh department, with one appointment between them.
pub fn seed_appointment(conn: &MysqlConnection) -> u64 {
    use crate::schema::{appointments, doctors, patients, universities};

    let department_id = seed_department(conn, "Antioquia");
    let city_id = seed_city(conn, department_id, "Medellin");
    diesel::insert_into(universities::table)
        .values(universities::name.eq("Universidad de Antioquia"))
        .execute(conn)
        .expect("insert university");
    let university_id = inserted_id(conn);

    diesel::insert_into(patients::table)
        .values(PatientData {
            first_name: "Ana".to_string(),
            last_name: "Perez".to_string(),
            document_type: "CC".to_string(),
            document_number: unique("P"),
            birth_date: NaiveDate::from_ymd(1990, 5, 17),
            sex: "F".to_string(),
            blood_type: None,
            regime: None,
            department_id,
            city_id,
            phone: "3001234567".to_string(),
            email: format!("{}@example.com", unique("ana")),
            address: "Calle 10".to_string(),
            marital_status: "Soltera".to_string(),
            occupation: "Docente".to_string(),
            eps: "SURA".to_string(),
            emergency_contact: "Luis Perez".to_string(),
            emergency_phone: "3007654321".to_string(),
        })
        .execute(conn)
        .expect("insert patient");
    let patient_id = inserted_id(conn);

    let now = Utc::now().naive_utc();
    diesel::insert_into(doctors::table)
        .values(NewDoctor {
            first_name: "Luis".to_string(),
            last_name: "Gomez".to_string(),
            document_type: "CC".to_string(),
            document_number: unique("D"),
            birth_date: NaiveDate::from_ymd(1980, 1, 2),
            gender: "M".to_string(),
            phone: "3011112233".to_string(),
            email: format!("{}@example.com", unique("luis")),
            address: "Carrera 5".to_string(),
            department_id,
            city_id,
            university_id,
            years_experience: 10,
            specialty: "MG".to_string(),
            registry_number: unique("R"),
            status: "Activo".to_string(),
            registered_at: now,
            updated_at: now,
        })
        .execute(conn)
        .expect("insert doctor");
    let doctor_id = inserted_id(conn);

    diesel::insert_into(appointments::table)
        .values(AppointmentData {
            patient_id,
            doctor_id,
            date: NaiveDate::from_ymd(2025, 6, 10),
            time: NaiveTime::from_hms(9, 30, 0),
            duration: 30,
            kind: "Consulta".to_string(),
            reason: "Control".to_string(),
            status: "Programada".to_string(),
            notes: None,
        })
        .execute(conn)
        .expect("insert appointment");
    inserted_id(conn)
}

/// Returns the account id and its email.
pub fn seed_account(conn: &MysqlConnection, password: &str) -> (u64, String) {
    use crate::schema::accounts;

    let email = format!("{}@example.com", unique("staff"));
    diesel::insert_into(accounts::table)
        .values(NewAccount {
            first_name: "Marta".to_string(),
            last_name: None,
            email: email.clone(),
            password: hash_password(password),
            phone: None,
            city: None,
            registered_at: Utc::now().naive_utc(),
        })
        .execute(conn)
        .expect("insert account");
    (inserted_id(conn), email)
}
