mod requests;
mod responses;

use crate::{
    account::utils::get_account_id_from_token,
    database::{assert, block, get_db_conn},
    models::{
        appointments::{Appointment, AppointmentData},
        doctors::Doctor,
        patients::Patient,
        references::specialty_name_or_unknown,
    },
    protocol::{PageInfo, SimpleResponse},
    report::{
        self,
        excel::{self, Cell},
        pdf::{Column, Orientation, PdfReport},
        ExportFile,
    },
    utils::{non_blank, require_str},
    DbPool,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use anyhow::{self, bail, Context};
use diesel::prelude::*;

use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(add_appointment)
        .service(modify_appointment)
        .service(delete_appointment)
        .service(search_appointment)
        .service(export_appointment_pdf)
        .service(export_appointment_excel);
}

crate::post_funcs! {
    (add_appointment, "/add_appointment", AddAppointmentRequest, SimpleResponse),
    (modify_appointment, "/modify_appointment", ModifyAppointmentRequest, SimpleResponse),
    (delete_appointment, "/delete_appointment", DeleteAppointmentRequest, SimpleResponse),
    (search_appointment, "/search_appointment", SearchAppointmentRequest, SearchAppointmentResponse),
}

crate::export_funcs! {
    (export_appointment_pdf, "/export_pdf", ExportAppointmentRequest),
    (export_appointment_excel, "/export_excel", ExportAppointmentRequest),
}

/// Appointments joined with their patient and doctor, filtered by keyword,
/// day and status.
macro_rules! search_query {
    ($pattern:expr, $start:expr, $end:expr, $status:expr, $all_status:expr) => {
        appointments::table
            .inner_join(patients::table.on(appointments::patient_id.eq(patients::id)))
            .inner_join(doctors::table.on(appointments::doctor_id.eq(doctors::id)))
            .filter(
                patients::first_name
                    .like($pattern)
                    .or(patients::last_name.like($pattern))
                    .or(patients::document_number.like($pattern))
                    .or(doctors::first_name.like($pattern))
                    .or(doctors::last_name.like($pattern)),
            )
            .filter(appointments::date.between($start, $end))
            .filter(appointments::status.eq($status).or($all_status))
    };
}

impl AppointmentForm {
    fn into_data(self) -> anyhow::Result<AppointmentData> {
        let date = crate::utils::parse_date_str(require_str(self.date, "Date")?)?;
        let time = crate::utils::parse_time_of_day_str(require_str(self.time, "Time")?)?;
        let duration = self.duration.context("Duration is required")?;
        if duration <= 0 {
            bail!("Duration must be greater than zero");
        }

        Ok(AppointmentData {
            patient_id: self.patient_id.context("Patient is required")?,
            doctor_id: self.doctor_id.context("Doctor is required")?,
            date,
            time,
            duration,
            kind: require_str(self.kind, "Appointment type")?,
            reason: require_str(self.reason, "Reason")?,
            status: require_str(self.status, "Status")?,
            notes: non_blank(self.notes),
        })
    }
}

fn appointment_item((a, p, d): (Appointment, Patient, Doctor)) -> AppointmentItem {
    AppointmentItem {
        id: a.id,
        code: report::format_code(report::APPOINTMENT_CODE, a.id),
        patient_id: p.id,
        patient_name: p.full_name(),
        patient_document: p.document_number,
        doctor_id: d.id,
        doctor_name: d.display_name(),
        specialty_name: specialty_name_or_unknown(&d.specialty).to_string(),
        date: crate::utils::format_date_str(&a.date),
        time: crate::utils::format_time_of_day_str(&a.time),
        duration: a.duration,
        kind: a.kind,
        reason: a.reason,
        status: a.status,
        notes: a.notes.unwrap_or_default(),
    }
}

async fn add_appointment_impl(
    pool: web::Data<DbPool>,
    info: web::Json<AddAppointmentRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::appointments;

    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;

    let data = info.appointment.into_data()?;
    assert::assert_patient(&pool, data.patient_id).await?;
    assert::assert_doctor(&pool, data.doctor_id).await?;

    let conn = get_db_conn(&pool)?;
    block(move || {
        diesel::insert_into(appointments::table)
            .values(data)
            .execute(&conn)
            .context("DB error")
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn modify_appointment_impl(
    pool: web::Data<DbPool>,
    info: web::Json<ModifyAppointmentRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::appointments;

    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;
    assert::assert_appointment(&pool, info.id).await?;

    let id = info.id;
    let data = info.appointment.into_data()?;
    assert::assert_patient(&pool, data.patient_id).await?;
    assert::assert_doctor(&pool, data.doctor_id).await?;

    let conn = get_db_conn(&pool)?;
    block(move || {
        diesel::update(appointments::table.filter(appointments::id.eq(id)))
            .set(data)
            .execute(&conn)
            .context("DB error")
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn delete_appointment_impl(
    pool: web::Data<DbPool>,
    info: web::Json<DeleteAppointmentRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::appointments;

    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;
    assert::assert_appointment(&pool, info.id).await?;

    let id = info.id;
    let conn = get_db_conn(&pool)?;
    block(move || {
        diesel::delete(appointments::table.filter(appointments::id.eq(id)))
            .execute(&conn)
            .context("DB error")
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn search_appointment_impl(
    pool: web::Data<DbPool>,
    info: web::Json<SearchAppointmentRequest>,
) -> anyhow::Result<SearchAppointmentResponse> {
    use crate::schema::{appointments, doctors, patients};

    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;

    let pattern = crate::utils::get_str_pattern_opt(info.keyword);
    let (start, end) = crate::utils::get_date_pair_opt(info.date)?;
    let (status, all_status) = crate::utils::get_filter_opt(info.status);
    let page = PageInfo::request(info.page, info.per_page);
    let (offset, limit) = (page.offset(), page.limit());

    let conn = get_db_conn(&pool)?;
    let (total, res) = block(move || {
        let total = search_query!(&pattern, start, end, &status, all_status)
            .count()
            .get_result::<i64>(&conn)
            .context("DB error")?;
        let res = search_query!(&pattern, start, end, &status, all_status)
            .order((appointments::date.desc(), appointments::time.desc()))
            .offset(offset)
            .limit(limit)
            .get_results::<(Appointment, Patient, Doctor)>(&conn)
            .context("DB error")?;
        Ok((total, res))
    })
    .await?;

    Ok(SearchAppointmentResponse {
        success: true,
        err: "".to_string(),
        page: page.with_total(total),
        appointments: res.into_iter().map(appointment_item).collect(),
    })
}

async fn load_appointments(
    pool: &web::Data<DbPool>,
    info: ExportAppointmentRequest,
) -> anyhow::Result<Vec<(Appointment, Patient, Doctor)>> {
    use crate::schema::{appointments, doctors, patients};

    let pattern = crate::utils::get_str_pattern_opt(info.keyword);
    let (start, end) = crate::utils::get_date_pair_opt(info.date)?;
    let (status, all_status) = crate::utils::get_filter_opt(info.status);

    let conn = get_db_conn(pool)?;
    block(move || {
        search_query!(&pattern, start, end, &status, all_status)
            .order((appointments::date.desc(), appointments::time.desc()))
            .get_results::<(Appointment, Patient, Doctor)>(&conn)
            .context("DB error")
    })
    .await
}

const PDF_COLUMNS: [Column; 8] = [
    Column::new("ID", 16.0),
    Column::new("Date", 22.0),
    Column::new("Time", 14.0),
    Column::new("Patient", 40.0),
    Column::new("Doctor", 42.0),
    Column::new("Specialty", 36.0),
    Column::new("Status", 26.0),
    Column::new("Reason", 58.0),
];

fn appointments_pdf(company: &str, rows: &[(Appointment, Patient, Doctor)]) -> anyhow::Result<Vec<u8>> {
    let mut pdf = PdfReport::new(
        company,
        "Appointment report",
        Some("Summary of scheduled appointments"),
        Orientation::Landscape,
    )?;

    pdf.heading("Statistics");
    pdf.stats(&[
        ("Total appointments:", rows.len().to_string()),
        (
            "Most common status:",
            report::most_common_or_na(rows.iter().map(|(a, _, _)| a.status.clone())),
        ),
        (
            "Most common type:",
            report::most_common_or_na(rows.iter().map(|(a, _, _)| a.kind.clone())),
        ),
        (
            "Most requested doctor:",
            report::most_common_or_na(rows.iter().map(|(_, _, d)| d.full_name())),
        ),
    ]);

    pdf.page_break();
    pdf.heading("Appointment listing");
    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|(a, p, d)| {
            vec![
                report::format_code(report::APPOINTMENT_CODE, a.id),
                report::format_display_date(&a.date),
                crate::utils::format_time_of_day_str(&a.time),
                p.full_name(),
                d.display_name(),
                specialty_name_or_unknown(&d.specialty).to_string(),
                a.status.clone(),
                a.reason.clone(),
            ]
        })
        .collect();
    pdf.table(&PDF_COLUMNS, &table);
    pdf.finish()
}

async fn export_appointment_pdf_impl(
    pool: web::Data<DbPool>,
    info: web::Query<ExportAppointmentRequest>,
) -> anyhow::Result<ExportFile> {
    let info = info.into_inner();
    let account_id = get_account_id_from_token(info.login_token.clone(), &pool).await?;

    let company = crate::setting::company_name(&pool, account_id).await?;
    let rows = load_appointments(&pool, info).await?;
    let bytes = appointments_pdf(&company, &rows)?;

    Ok(ExportFile::pdf("appointments_report.pdf", bytes))
}

async fn export_appointment_excel_impl(
    pool: web::Data<DbPool>,
    info: web::Query<ExportAppointmentRequest>,
) -> anyhow::Result<ExportFile> {
    let info = info.into_inner();
    get_account_id_from_token(info.login_token.clone(), &pool).await?;

    let rows = load_appointments(&pool, info)
        .await?
        .into_iter()
        .map(|(a, p, d)| {
            vec![
                Cell::from(report::format_display_date(&a.date)),
                crate::utils::format_time_of_day_str(&a.time).into(),
                p.full_name().into(),
                d.full_name().into(),
                a.kind.into(),
                a.status.into(),
                a.reason.into(),
            ]
        })
        .collect();
    let bytes = excel::build_sheet(
        "Appointments",
        &["Date", "Time", "Patient", "Doctor", "Type", "Status", "Reason"],
        rows,
    )?;

    Ok(ExportFile::xlsx("appointments.xlsx", bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn form() -> AppointmentForm {
        AppointmentForm {
            patient_id: Some(1),
            doctor_id: Some(2),
            date: Some("2025-06-10".to_string()),
            time: Some("14:30".to_string()),
            duration: Some(30),
            kind: Some("Primera vez".to_string()),
            reason: Some("Dolor de cabeza".to_string()),
            status: Some("Programada".to_string()),
            notes: Some("".to_string()),
        }
    }

    #[test]
    fn form_converts() {
        let data = form().into_data().unwrap();
        assert_eq!(data.date, NaiveDate::from_ymd(2025, 6, 10));
        assert_eq!(data.time, NaiveTime::from_hms(14, 30, 0));
        assert_eq!(data.notes, None);
    }

    #[test]
    fn zero_duration_is_rejected() {
        let mut f = form();
        f.duration = Some(0);
        assert!(f.into_data().is_err());
    }

    #[test]
    fn bad_time_is_rejected() {
        let mut f = form();
        f.time = Some("2:30 pm".to_string());
        assert!(f.into_data().is_err());
    }

    #[test]
    fn missing_doctor_is_rejected() {
        let mut f = form();
        f.doctor_id = None;
        assert_eq!(f.into_data().unwrap_err().to_string(), "Doctor is required");
    }

    #[test]
    fn pdf_export_renders_without_rows() {
        let bytes = appointments_pdf("MediSoft", &[]).unwrap();
        assert_eq!(&bytes[0..4], b"%PDF");
    }
}
