//! Clinical histories, one per appointment, each linked to a set of CIE-10
//! diagnoses.

mod requests;
mod responses;

use crate::{
    account::utils::get_account_id_from_token,
    database::{assert, block, get_db_conn, last_insert_id},
    models::{
        appointments::Appointment,
        cie10::Cie10,
        doctors::Doctor,
        histories::{
            History, HistoryDiagnosis, NewHistory, UpdateHistory, DIAGNOSIS_KIND_PRINCIPAL,
            DIAGNOSIS_KIND_RELATED,
        },
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
    utils::{local_now, non_blank, require_str},
    DbPool,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use anyhow::{self, bail, Context};
use diesel::prelude::*;
use std::collections::{HashMap, HashSet};

use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(add_history)
        .service(modify_history)
        .service(delete_history)
        .service(view_history)
        .service(search_history)
        .service(pending_appointments)
        .service(export_history_pdf)
        .service(export_histories_pdf)
        .service(export_history_excel);
}

crate::post_funcs! {
    (add_history, "/add_history", AddHistoryRequest, SimpleResponse),
    (modify_history, "/modify_history", ModifyHistoryRequest, SimpleResponse),
    (delete_history, "/delete_history", DeleteHistoryRequest, SimpleResponse),
    (view_history, "/view_history", ViewHistoryRequest, ViewHistoryResponse),
    (search_history, "/search_history", SearchHistoryRequest, SearchHistoryResponse),
    (pending_appointments, "/pending_appointments", PendingAppointmentsRequest, PendingAppointmentsResponse),
}

crate::export_funcs! {
    (export_history_pdf, "/export_pdf_one", ExportHistoryRequest),
    (export_histories_pdf, "/export_pdf", ExportHistoriesRequest),
    (export_history_excel, "/export_excel", ExportHistoriesRequest),
}

type HistoryRow = (History, Appointment, Patient, Doctor);

macro_rules! joined_histories {
    () => {
        histories::table
            .inner_join(appointments::table.on(histories::appointment_id.eq(appointments::id)))
            .inner_join(patients::table.on(appointments::patient_id.eq(patients::id)))
            .inner_join(doctors::table.on(appointments::doctor_id.eq(doctors::id)))
    };
}

macro_rules! search_query {
    ($pattern:expr, $doctor_id:expr, $all_doctors:expr) => {
        joined_histories!()
            .filter(
                patients::first_name
                    .like($pattern)
                    .or(patients::last_name.like($pattern))
                    .or(patients::document_number.like($pattern))
                    .or(doctors::first_name.like($pattern))
                    .or(doctors::last_name.like($pattern)),
            )
            .filter(doctors::id.eq($doctor_id).or($all_doctors))
    };
}

/// Keeps the requested order, drops duplicates and ids not in `valid`; the
/// first kept id becomes the principal diagnosis.
fn plan_diagnoses(history_id: u64, requested: &[u64], valid: &HashSet<u64>) -> Vec<HistoryDiagnosis> {
    let mut seen = HashSet::new();
    requested
        .iter()
        .filter(|id| valid.contains(id) && seen.insert(**id))
        .enumerate()
        .map(|(i, id)| HistoryDiagnosis {
            history_id,
            cie10_id: *id,
            kind: Some(
                if i == 0 {
                    DIAGNOSIS_KIND_PRINCIPAL
                } else {
                    DIAGNOSIS_KIND_RELATED
                }
                .to_string(),
            ),
        })
        .collect()
}

fn link_diagnoses(conn: &MysqlConnection, history_id: u64, requested: &[u64]) -> anyhow::Result<usize> {
    use crate::schema::{cie10, history_diagnoses};

    if requested.is_empty() {
        return Ok(0);
    }
    let valid: HashSet<u64> = cie10::table
        .filter(cie10::id.eq_any(requested.to_vec()))
        .filter(cie10::active.eq(true))
        .select(cie10::id)
        .get_results::<u64>(conn)
        .context("DB error")?
        .into_iter()
        .collect();

    let links = plan_diagnoses(history_id, requested, &valid);
    if !links.is_empty() {
        diesel::insert_into(history_diagnoses::table)
            .values(&links)
            .execute(conn)
            .context("DB error")?;
    }
    Ok(links.len())
}

/// Principal first, then by code.
fn order_diagnoses(items: &mut [DiagnosisItem]) {
    items.sort_by(|a, b| {
        (a.kind != DIAGNOSIS_KIND_PRINCIPAL, &a.code).cmp(&(b.kind != DIAGNOSIS_KIND_PRINCIPAL, &b.code))
    });
}

fn load_diagnoses(
    conn: &MysqlConnection,
    history_ids: Vec<u64>,
) -> anyhow::Result<HashMap<u64, Vec<DiagnosisItem>>> {
    use crate::schema::{cie10, history_diagnoses};

    let mut map: HashMap<u64, Vec<DiagnosisItem>> = HashMap::new();
    if history_ids.is_empty() {
        return Ok(map);
    }

    let rows = history_diagnoses::table
        .inner_join(cie10::table.on(history_diagnoses::cie10_id.eq(cie10::id)))
        .filter(history_diagnoses::history_id.eq_any(history_ids))
        .get_results::<(HistoryDiagnosis, Cie10)>(conn)
        .context("DB error")?;
    for (link, code) in rows {
        map.entry(link.history_id).or_default().push(DiagnosisItem {
            cie10_id: code.id,
            code: code.code,
            description: code.description,
            kind: link.kind.unwrap_or_default(),
        });
    }
    for items in map.values_mut() {
        order_diagnoses(items);
    }
    Ok(map)
}

fn history_item((h, a, p, d): HistoryRow, diagnoses: Vec<DiagnosisItem>) -> HistoryItem {
    HistoryItem {
        id: h.id,
        code: report::format_code(report::HISTORY_CODE, h.id),
        appointment_id: a.id,
        appointment_code: report::format_code(report::APPOINTMENT_CODE, a.id),
        recorded_at: crate::utils::format_time_str(&h.recorded_at),
        patient_id: p.id,
        patient_name: p.full_name(),
        patient_document: p.document_number,
        doctor_id: d.id,
        doctor_name: d.display_name(),
        specialty_name: specialty_name_or_unknown(&d.specialty).to_string(),
        reason: h.reason,
        background: h.background.unwrap_or_default(),
        treatment: h.treatment.unwrap_or_default(),
        diagnoses,
    }
}

fn diagnosis_text(d: &DiagnosisItem) -> String {
    format!("{} - {}", d.code, d.description)
}

fn principal_diagnosis(diagnoses: &[DiagnosisItem]) -> Option<String> {
    diagnoses
        .iter()
        .find(|d| d.kind == DIAGNOSIS_KIND_PRINCIPAL)
        .map(diagnosis_text)
}

async fn add_history_impl(
    pool: web::Data<DbPool>,
    info: web::Json<AddHistoryRequest>,
) -> anyhow::Result<SimpleResponse> {
    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;

    let appointment_id = match info.appointment_id {
        Some(id) => id,
        None => bail!("An appointment must be selected for the clinical history"),
    };
    let reason = require_str(info.reason, "Reason for consultation")?;
    assert::assert_appointment(&pool, appointment_id).await?;

    let data = NewHistory {
        appointment_id,
        recorded_at: local_now(),
        reason,
        background: non_blank(info.background),
        treatment: non_blank(info.treatment),
    };
    let diagnoses = info.diagnoses;

    let conn = get_db_conn(&pool)?;
    let history_id = block(move || create_history(&conn, data, &diagnoses)).await?;
    log::info!("clinical history {} added", history_id);

    Ok(SimpleResponse::ok())
}

/// Inserts the history of an appointment that has none yet, with its diagnoses.
fn create_history(
    conn: &MysqlConnection,
    data: NewHistory,
    diagnoses: &[u64],
) -> anyhow::Result<u64> {
    use crate::schema::histories;

    conn.transaction(|| {
        let res = histories::table
            .filter(histories::appointment_id.eq(data.appointment_id))
            .count()
            .get_result::<i64>(conn)
            .context("DB error")?;
        if res > 0 {
            bail!("This appointment already has a clinical history, edit it instead");
        }

        diesel::insert_into(histories::table)
            .values(data)
            .execute(conn)
            .context("DB error")?;
        let history_id = diesel::select(last_insert_id)
            .get_result::<u64>(conn)
            .context("DB error")?;
        link_diagnoses(conn, history_id, diagnoses)?;

        Ok(history_id)
    })
}

async fn modify_history_impl(
    pool: web::Data<DbPool>,
    info: web::Json<ModifyHistoryRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::{histories, history_diagnoses};

    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;
    assert::assert_history(&pool, info.id).await?;

    let id = info.id;
    let data = UpdateHistory {
        recorded_at: local_now(),
        reason: require_str(info.reason, "Reason for consultation")?,
        background: non_blank(info.background),
        treatment: non_blank(info.treatment),
    };
    let diagnoses = info.diagnoses;

    let conn = get_db_conn(&pool)?;
    block(move || {
        conn.transaction(|| {
            diesel::update(histories::table.filter(histories::id.eq(id)))
                .set(data)
                .execute(&conn)
                .context("DB error")?;
            diesel::delete(history_diagnoses::table.filter(history_diagnoses::history_id.eq(id)))
                .execute(&conn)
                .context("DB error")?;
            link_diagnoses(&conn, id, &diagnoses)?;
            Ok(())
        })
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn delete_history_impl(
    pool: web::Data<DbPool>,
    info: web::Json<DeleteHistoryRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::{histories, history_diagnoses};

    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;
    assert::assert_history(&pool, info.id).await?;

    let id = info.id;
    let conn = get_db_conn(&pool)?;
    block(move || {
        conn.transaction(|| {
            diesel::delete(history_diagnoses::table.filter(history_diagnoses::history_id.eq(id)))
                .execute(&conn)
                .context("DB error")?;
            diesel::delete(histories::table.filter(histories::id.eq(id)))
                .execute(&conn)
                .context("DB error")?;
            Ok(())
        })
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn load_history(pool: &web::Data<DbPool>, id: u64) -> anyhow::Result<HistoryItem> {
    use crate::schema::{appointments, doctors, histories, patients};

    let conn = get_db_conn(pool)?;
    block(move || {
        let row = joined_histories!()
            .filter(histories::id.eq(id))
            .get_result::<HistoryRow>(&conn)
            .optional()
            .context("DB error")?;
        let row = match row {
            Some(row) => row,
            None => bail!("No such clinical history"),
        };
        let mut diagnoses = load_diagnoses(&conn, vec![id])?;
        Ok(history_item(row, diagnoses.remove(&id).unwrap_or_default()))
    })
    .await
}

async fn view_history_impl(
    pool: web::Data<DbPool>,
    info: web::Json<ViewHistoryRequest>,
) -> anyhow::Result<ViewHistoryResponse> {
    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;

    let history = load_history(&pool, info.id).await?;

    Ok(ViewHistoryResponse {
        success: true,
        err: "".to_string(),
        history,
    })
}

async fn search_history_impl(
    pool: web::Data<DbPool>,
    info: web::Json<SearchHistoryRequest>,
) -> anyhow::Result<SearchHistoryResponse> {
    use crate::schema::{appointments, doctors, histories, patients};

    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;

    let pattern = crate::utils::get_str_pattern_opt(info.keyword);
    let (doctor_id, all_doctors) = (info.doctor_id.unwrap_or(0), info.doctor_id.is_none());
    let page = PageInfo::request(info.page, info.per_page);
    let (offset, limit) = (page.offset(), page.limit());

    let conn = get_db_conn(&pool)?;
    let (total, histories) = block(move || {
        let total = search_query!(&pattern, doctor_id, all_doctors)
            .count()
            .get_result::<i64>(&conn)
            .context("DB error")?;
        let rows = search_query!(&pattern, doctor_id, all_doctors)
            .order(histories::recorded_at.desc())
            .offset(offset)
            .limit(limit)
            .get_results::<HistoryRow>(&conn)
            .context("DB error")?;

        let mut diagnoses = load_diagnoses(&conn, rows.iter().map(|r| r.0.id).collect())?;
        let histories = rows
            .into_iter()
            .map(|row| {
                let items = diagnoses.remove(&row.0.id).unwrap_or_default();
                history_item(row, items)
            })
            .collect::<Vec<_>>();
        Ok((total, histories))
    })
    .await?;

    Ok(SearchHistoryResponse {
        success: true,
        err: "".to_string(),
        page: page.with_total(total),
        histories,
    })
}

async fn pending_appointments_impl(
    pool: web::Data<DbPool>,
    info: web::Json<PendingAppointmentsRequest>,
) -> anyhow::Result<PendingAppointmentsResponse> {
    use crate::schema::{appointments, doctors, histories, patients};

    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;

    let conn = get_db_conn(&pool)?;
    let rows = block(move || {
        appointments::table
            .inner_join(patients::table.on(appointments::patient_id.eq(patients::id)))
            .inner_join(doctors::table.on(appointments::doctor_id.eq(doctors::id)))
            .left_join(histories::table.on(histories::appointment_id.eq(appointments::id)))
            .filter(histories::id.is_null())
            .select((
                appointments::all_columns,
                patients::all_columns,
                doctors::all_columns,
            ))
            .order((appointments::date.desc(), appointments::time.desc()))
            .get_results::<(Appointment, Patient, Doctor)>(&conn)
            .context("DB error")
    })
    .await?;

    let appointments = rows
        .into_iter()
        .map(|(a, p, d)| PendingAppointmentItem {
            id: a.id,
            code: report::format_code(report::APPOINTMENT_CODE, a.id),
            patient_name: p.full_name(),
            doctor_name: d.display_name(),
            date: crate::utils::format_date_str(&a.date),
            time: crate::utils::format_time_of_day_str(&a.time),
        })
        .collect();

    Ok(PendingAppointmentsResponse {
        success: true,
        err: "".to_string(),
        appointments,
    })
}

fn history_pdf(company: &str, h: &HistoryItem, patient: &Patient) -> anyhow::Result<Vec<u8>> {
    let mut pdf = PdfReport::new(company, "Clinical history", Some(&h.code), Orientation::Portrait)?;

    pdf.heading("Patient");
    pdf.stats(&[
        ("Name:", h.patient_name.clone()),
        (
            "Document:",
            format!("{} {}", patient.document_type, patient.document_number),
        ),
        ("Phone:", patient.phone.clone()),
        ("Email:", patient.email.clone()),
        ("EPS:", patient.eps.clone()),
    ]);

    pdf.heading("Consultation");
    pdf.stats(&[
        ("Date:", h.recorded_at.replace('T', " ")),
        ("Doctor:", h.doctor_name.clone()),
        ("Specialty:", h.specialty_name.clone()),
        ("Appointment:", h.appointment_code.clone()),
    ]);

    pdf.paragraph("Reason for consultation", &h.reason);
    let background = if h.background.is_empty() {
        "No background recorded"
    } else {
        &h.background
    };
    pdf.paragraph("Background", background);
    let diagnoses = if h.diagnoses.is_empty() {
        "No diagnoses recorded".to_string()
    } else {
        h.diagnoses
            .iter()
            .map(|d| format!("{} ({})", diagnosis_text(d), d.kind))
            .collect::<Vec<_>>()
            .join("\n")
    };
    pdf.paragraph("Diagnoses (CIE-10)", &diagnoses);
    pdf.paragraph("Treatment", &h.treatment);

    pdf.finish()
}

async fn export_history_pdf_impl(
    pool: web::Data<DbPool>,
    info: web::Query<ExportHistoryRequest>,
) -> anyhow::Result<ExportFile> {
    use crate::schema::patients;

    let info = info.into_inner();
    let account_id = get_account_id_from_token(info.login_token, &pool).await?;

    let company = crate::setting::company_name(&pool, account_id).await?;
    let history = load_history(&pool, info.id).await?;
    let patient_id = history.patient_id;
    let conn = get_db_conn(&pool)?;
    let patient = block(move || {
        patients::table
            .filter(patients::id.eq(patient_id))
            .get_result::<Patient>(&conn)
            .context("DB error")
    })
    .await?;

    let bytes = history_pdf(&company, &history, &patient)?;
    Ok(ExportFile::pdf(format!("clinical_history_{}.pdf", info.id), bytes))
}

/// Histories matching the export filters, newest first, with their diagnoses.
async fn load_histories(pool: &web::Data<DbPool>, info: ExportHistoriesRequest) -> anyhow::Result<Vec<HistoryItem>> {
    use crate::schema::{appointments, doctors, histories, patients};

    let pattern = crate::utils::get_str_pattern_opt(info.keyword);
    let (doctor_id, all_doctors) = (info.doctor_id.unwrap_or(0), info.doctor_id.is_none());
    let diagnosis = non_blank(info.diagnosis).map(|d| d.to_lowercase());

    let conn = get_db_conn(pool)?;
    let items = block(move || {
        let rows = search_query!(&pattern, doctor_id, all_doctors)
            .order(histories::recorded_at.desc())
            .get_results::<HistoryRow>(&conn)
            .context("DB error")?;
        let mut diagnoses = load_diagnoses(&conn, rows.iter().map(|r| r.0.id).collect())?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let items = diagnoses.remove(&row.0.id).unwrap_or_default();
                history_item(row, items)
            })
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(match diagnosis {
        Some(needle) => items
            .into_iter()
            .filter(|h| {
                h.diagnoses
                    .iter()
                    .any(|d| diagnosis_text(d).to_lowercase().contains(&needle))
            })
            .collect(),
        None => items,
    })
}

const PDF_COLUMNS: [Column; 6] = [
    Column::new("ID", 18.0),
    Column::new("Date", 22.0),
    Column::new("Patient", 44.0),
    Column::new("Doctor", 46.0),
    Column::new("Principal diagnosis", 70.0),
    Column::new("Reason", 55.0),
];

fn histories_pdf(company: &str, histories: &[HistoryItem]) -> anyhow::Result<Vec<u8>> {
    let mut pdf = PdfReport::new(
        company,
        "Clinical history report",
        Some("Summary of clinical histories"),
        Orientation::Landscape,
    )?;

    pdf.heading("Statistics");
    pdf.stats(&[
        ("Total histories:", histories.len().to_string()),
        (
            "Most active doctor:",
            report::most_common_or_na(histories.iter().map(|h| h.doctor_name.clone())),
        ),
        (
            "Most common diagnosis:",
            report::most_common_or_na(
                histories
                    .iter()
                    .filter_map(|h| principal_diagnosis(&h.diagnoses)),
            ),
        ),
    ]);

    pdf.page_break();
    pdf.heading("Clinical history listing");
    let rows: Vec<Vec<String>> = histories
        .iter()
        .map(|h| {
            vec![
                h.code.clone(),
                h.recorded_at.get(..10).unwrap_or("").to_string(),
                h.patient_name.clone(),
                h.doctor_name.clone(),
                principal_diagnosis(&h.diagnoses).unwrap_or_else(|| "-".to_string()),
                h.reason.clone(),
            ]
        })
        .collect();
    pdf.table(&PDF_COLUMNS, &rows);
    pdf.finish()
}

async fn export_histories_pdf_impl(
    pool: web::Data<DbPool>,
    info: web::Query<ExportHistoriesRequest>,
) -> anyhow::Result<ExportFile> {
    let info = info.into_inner();
    let account_id = get_account_id_from_token(info.login_token.clone(), &pool).await?;

    let company = crate::setting::company_name(&pool, account_id).await?;
    let histories = load_histories(&pool, info).await?;
    let bytes = histories_pdf(&company, &histories)?;

    Ok(ExportFile::pdf("clinical_histories_report.pdf", bytes))
}

async fn export_history_excel_impl(
    pool: web::Data<DbPool>,
    info: web::Query<ExportHistoriesRequest>,
) -> anyhow::Result<ExportFile> {
    let info = info.into_inner();
    get_account_id_from_token(info.login_token.clone(), &pool).await?;

    let rows = load_histories(&pool, info)
        .await?
        .into_iter()
        .map(|h| {
            let diagnoses = h
                .diagnoses
                .iter()
                .map(diagnosis_text)
                .collect::<Vec<_>>()
                .join("; ");
            vec![
                Cell::from(h.recorded_at.get(..10).unwrap_or("")),
                h.patient_name.into(),
                h.doctor_name.into(),
                h.reason.into(),
                diagnoses.into(),
                h.treatment.into(),
            ]
        })
        .collect();
    let bytes = excel::build_sheet(
        "Histories",
        &["Date", "Patient", "Doctor", "Reason", "Diagnoses", "Treatment"],
        rows,
    )?;

    Ok(ExportFile::xlsx("clinical_histories.xlsx", bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(code: &str, kind: &str) -> DiagnosisItem {
        DiagnosisItem {
            cie10_id: 0,
            code: code.to_string(),
            description: format!("desc {}", code),
            kind: kind.to_string(),
        }
    }

    #[test]
    fn first_valid_diagnosis_is_principal() {
        let valid: HashSet<u64> = [3, 5, 9].iter().cloned().collect();
        let links = plan_diagnoses(7, &[1, 5, 3, 5, 9], &valid);
        let planned: Vec<(u64, &str)> = links
            .iter()
            .map(|l| (l.cie10_id, l.kind.as_deref().unwrap_or("")))
            .collect();
        assert_eq!(
            planned,
            vec![
                (5, DIAGNOSIS_KIND_PRINCIPAL),
                (3, DIAGNOSIS_KIND_RELATED),
                (9, DIAGNOSIS_KIND_RELATED)
            ]
        );
        assert!(links.iter().all(|l| l.history_id == 7));
    }

    #[test]
    fn no_valid_diagnoses_links_nothing() {
        let valid = HashSet::new();
        assert!(plan_diagnoses(1, &[1, 2], &valid).is_empty());
        assert!(plan_diagnoses(1, &[], &valid).is_empty());
    }

    #[test]
    fn principal_is_listed_first() {
        let mut items = vec![
            diag("A09", DIAGNOSIS_KIND_RELATED),
            diag("J00", DIAGNOSIS_KIND_PRINCIPAL),
            diag("B01", DIAGNOSIS_KIND_RELATED),
        ];
        order_diagnoses(&mut items);
        let codes: Vec<&str> = items.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec!["J00", "A09", "B01"]);
        assert_eq!(principal_diagnosis(&items), Some("J00 - desc J00".to_string()));
    }

    #[test]
    fn listing_pdf_renders() {
        let history = HistoryItem {
            id: 12,
            code: "HC012".to_string(),
            recorded_at: "2025-06-10T09:15:00".to_string(),
            patient_name: "Ana Perez".to_string(),
            doctor_name: "Dr. Laura Rios".to_string(),
            reason: "Control".to_string(),
            diagnoses: vec![diag("J00", DIAGNOSIS_KIND_PRINCIPAL)],
            ..Default::default()
        };
        let bytes = histories_pdf("MediSoft", &[history]).unwrap();
        assert_eq!(&bytes[0..4], b"%PDF");
    }

    #[test]
    fn second_history_for_an_appointment_is_refused() {
        let conn = match crate::database::testing::connect() {
            Some(conn) => conn,
            None => return,
        };
        conn.test_transaction::<_, anyhow::Error, _>(|| {
            let appointment_id = crate::database::testing::seed_appointment(&conn);
            let history = |reason: &str| NewHistory {
                appointment_id,
                recorded_at: local_now(),
                reason: reason.to_string(),
                background: None,
                treatment: None,
            };

            create_history(&conn, history("Control"), &[])?;
            let err = create_history(&conn, history("Fiebre"), &[]).unwrap_err();
            assert_eq!(
                err.to_string(),
                "This appointment already has a clinical history, edit it instead"
            );

            use crate::schema::histories;
            let count: i64 = histories::table
                .filter(histories::appointment_id.eq(appointment_id))
                .count()
                .get_result(&conn)?;
            assert_eq!(count, 1);
            Ok(())
        });
    }
}
