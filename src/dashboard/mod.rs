use crate::{
    account::utils::get_account_id_from_token,
    database::{block, get_db_conn},
    models::{appointments::Appointment, doctors::Doctor, patients::Patient},
    DbPool,
};
use actix_web::{post, web, HttpResponse, Responder};
use anyhow::{self, Context};
use chrono::{Local, NaiveDate};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(summary);
}

#[derive(Deserialize)]
pub struct SummaryRequest {
    pub login_token: String,
}

#[derive(Default, Serialize)]
pub struct TodayAppointmentItem {
    pub id: u64,
    pub time: String,
    pub patient_name: String,
    pub doctor_name: String,
    pub kind: String,
    pub status: String,
}

#[derive(Default, Serialize)]
pub struct SummaryResponse {
    pub success: bool,
    pub err: String,
    pub date: String,
    pub today_appointments: Vec<TodayAppointmentItem>,
    pub total_patients: i64,
    pub total_doctors: i64,
}

crate::impl_err_response! {
    SummaryResponse,
}

crate::post_funcs! {
    (summary, "/summary", SummaryRequest, SummaryResponse),
}

async fn summary_impl(
    pool: web::Data<DbPool>,
    info: web::Json<SummaryRequest>,
) -> anyhow::Result<SummaryResponse> {
    use crate::schema::{appointments, doctors, patients};

    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;

    let today: NaiveDate = Local::now().date_naive();
    let conn = get_db_conn(&pool)?;
    let (rows, total_patients, total_doctors) = block(move || {
        let rows = appointments::table
            .inner_join(patients::table.on(appointments::patient_id.eq(patients::id)))
            .inner_join(doctors::table.on(appointments::doctor_id.eq(doctors::id)))
            .filter(appointments::date.eq(today))
            .order(appointments::time.asc())
            .get_results::<(Appointment, Patient, Doctor)>(&conn)
            .context("DB error")?;
        let total_patients = patients::table
            .count()
            .get_result::<i64>(&conn)
            .context("DB error")?;
        let total_doctors = doctors::table
            .count()
            .get_result::<i64>(&conn)
            .context("DB error")?;
        Ok((rows, total_patients, total_doctors))
    })
    .await?;

    let today_appointments = rows
        .into_iter()
        .map(|(a, p, d)| TodayAppointmentItem {
            id: a.id,
            time: crate::utils::format_time_of_day_str(&a.time),
            patient_name: p.full_name(),
            doctor_name: d.display_name(),
            kind: a.kind,
            status: a.status,
        })
        .collect();

    Ok(SummaryResponse {
        success: true,
        err: "".to_string(),
        date: crate::utils::format_date_str(&today),
        today_appointments,
        total_patients,
        total_doctors,
    })
}
