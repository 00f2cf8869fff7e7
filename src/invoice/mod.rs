mod requests;
mod responses;

use crate::{
    account::utils::get_account_id_from_token,
    database::{assert, block, get_db_conn},
    models::{
        appointments::Appointment,
        doctors::Doctor,
        invoices::{Invoice, NewInvoice, UpdateInvoice, INVOICE_STATUS_PENDING},
        patients::Patient,
        references::specialty_name_or_unknown,
    },
    protocol::{PageInfo, SimpleResponse},
    report::{
        self,
        pdf::{Column, Orientation, PdfReport},
        ExportFile,
    },
    utils::{local_now, non_blank, require_str},
    DbPool,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use anyhow::{self, bail, Context};
use diesel::prelude::*;

use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(add_invoice)
        .service(modify_invoice)
        .service(delete_invoice)
        .service(search_invoice)
        .service(pending_appointments)
        .service(suggest_service)
        .service(export_invoice_pdf)
        .service(print_invoice);
}

crate::post_funcs! {
    (add_invoice, "/add_invoice", AddInvoiceRequest, SimpleResponse),
    (modify_invoice, "/modify_invoice", ModifyInvoiceRequest, SimpleResponse),
    (delete_invoice, "/delete_invoice", DeleteInvoiceRequest, SimpleResponse),
    (search_invoice, "/search_invoice", SearchInvoiceRequest, SearchInvoiceResponse),
    (pending_appointments, "/pending_appointments", PendingAppointmentsRequest, PendingAppointmentsResponse),
    (suggest_service, "/suggest_service", SuggestServiceRequest, SuggestServiceResponse),
}

crate::export_funcs! {
    (export_invoice_pdf, "/export_pdf", ExportInvoiceRequest),
    (print_invoice, "/print", PrintInvoiceRequest),
}

type InvoiceRow = (Invoice, Appointment, Patient, Doctor);

macro_rules! joined_invoices {
    () => {
        invoices::table
            .inner_join(appointments::table.on(invoices::appointment_id.eq(appointments::id)))
            .inner_join(patients::table.on(appointments::patient_id.eq(patients::id)))
            .inner_join(doctors::table.on(appointments::doctor_id.eq(doctors::id)))
    };
}

macro_rules! search_query {
    ($pattern:expr, $status:expr, $all_status:expr, $start:expr, $end:expr) => {
        joined_invoices!()
            .filter(
                patients::first_name
                    .like($pattern)
                    .or(patients::last_name.like($pattern))
                    .or(patients::document_number.like($pattern))
                    .or(doctors::first_name.like($pattern))
                    .or(doctors::last_name.like($pattern))
                    .or(invoices::service.like($pattern)),
            )
            .filter(invoices::status.eq($status).or($all_status))
            .filter(invoices::issued_at.between($start, $end))
    };
}

fn parse_amount(amount: Option<Amount>) -> anyhow::Result<f64> {
    let value = match amount {
        None => bail!("Amount is required"),
        Some(Amount::Number(n)) => n,
        Some(Amount::Text(s)) => {
            let s = s.trim();
            if s.is_empty() {
                bail!("Amount is required");
            }
            s.parse::<f64>().context("Amount must be a number")?
        }
    };
    if !value.is_finite() || value < 0.0 {
        bail!("Amount must be a non-negative number");
    }
    Ok(value)
}

impl InvoiceForm {
    fn into_update(self) -> anyhow::Result<UpdateInvoice> {
        let amount = parse_amount(self.amount)?;
        let due_date = crate::utils::parse_date_str(require_str(self.due_date, "Due date")?)?;

        Ok(UpdateInvoice {
            service: require_str(self.service, "Service")?,
            amount,
            status: non_blank(self.status).unwrap_or_else(|| INVOICE_STATUS_PENDING.to_string()),
            due_date,
            payment_method: require_str(self.payment_method, "Payment method")?,
            notes: non_blank(self.notes),
        })
    }
}

fn invoice_item((i, a, p, d): InvoiceRow) -> InvoiceItem {
    InvoiceItem {
        id: i.id,
        code: report::format_code(report::INVOICE_CODE, i.id),
        appointment_id: a.id,
        appointment_code: report::format_code(report::APPOINTMENT_CODE, a.id),
        patient_name: p.full_name(),
        patient_document: p.document_number,
        doctor_name: d.display_name(),
        service: i.service,
        amount: i.amount,
        status: i.status,
        issued_at: crate::utils::format_time_str(&i.issued_at),
        due_date: crate::utils::format_date_str(&i.due_date),
        payment_method: i.payment_method,
        kind: i.kind,
        notes: i.notes.unwrap_or_default(),
    }
}

async fn add_invoice_impl(
    pool: web::Data<DbPool>,
    info: web::Json<AddInvoiceRequest>,
) -> anyhow::Result<SimpleResponse> {
    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;

    let appointment_id = match info.appointment_id {
        Some(id) => id,
        None => bail!("An appointment must be selected for the invoice"),
    };
    let kind = require_str(info.kind, "Invoice type")?;
    let form = info.invoice.into_update()?;
    assert::assert_appointment(&pool, appointment_id).await?;

    let data = NewInvoice {
        appointment_id,
        service: form.service,
        amount: form.amount,
        status: form.status,
        issued_at: local_now(),
        due_date: form.due_date,
        payment_method: form.payment_method,
        kind,
        notes: form.notes,
    };

    let conn = get_db_conn(&pool)?;
    block(move || create_invoice(&conn, data)).await?;

    Ok(SimpleResponse::ok())
}

/// An appointment is billed at most once.
fn create_invoice(conn: &MysqlConnection, data: NewInvoice) -> anyhow::Result<()> {
    use crate::schema::invoices;

    conn.transaction(|| {
        let res = invoices::table
            .filter(invoices::appointment_id.eq(data.appointment_id))
            .count()
            .get_result::<i64>(conn)
            .context("DB error")?;
        if res > 0 {
            bail!("This appointment already has an invoice");
        }

        diesel::insert_into(invoices::table)
            .values(data)
            .execute(conn)
            .context("DB error")?;
        Ok(())
    })
}

async fn modify_invoice_impl(
    pool: web::Data<DbPool>,
    info: web::Json<ModifyInvoiceRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::invoices;

    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;
    assert::assert_invoice(&pool, info.id).await?;

    let id = info.id;
    let data = info.invoice.into_update()?;

    let conn = get_db_conn(&pool)?;
    block(move || {
        diesel::update(invoices::table.filter(invoices::id.eq(id)))
            .set(data)
            .execute(&conn)
            .context("DB error")
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn delete_invoice_impl(
    pool: web::Data<DbPool>,
    info: web::Json<DeleteInvoiceRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::invoices;

    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;
    assert::assert_invoice(&pool, info.id).await?;

    let id = info.id;
    let conn = get_db_conn(&pool)?;
    block(move || {
        diesel::delete(invoices::table.filter(invoices::id.eq(id)))
            .execute(&conn)
            .context("DB error")
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn search_invoice_impl(
    pool: web::Data<DbPool>,
    info: web::Json<SearchInvoiceRequest>,
) -> anyhow::Result<SearchInvoiceResponse> {
    use crate::schema::{appointments, doctors, invoices, patients};

    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;

    let pattern = crate::utils::get_str_pattern_opt(info.keyword);
    let (status, all_status) = crate::utils::get_filter_opt(info.status);
    let (start, end) = crate::utils::get_time_pair_from_date_opt(info.date)?;
    let page = PageInfo::request(info.page, info.per_page);
    let (offset, limit) = (page.offset(), page.limit());

    let conn = get_db_conn(&pool)?;
    let (total, res) = block(move || {
        let total = search_query!(&pattern, &status, all_status, start, end)
            .count()
            .get_result::<i64>(&conn)
            .context("DB error")?;
        let res = search_query!(&pattern, &status, all_status, start, end)
            .order(invoices::issued_at.desc())
            .offset(offset)
            .limit(limit)
            .get_results::<InvoiceRow>(&conn)
            .context("DB error")?;
        Ok((total, res))
    })
    .await?;

    Ok(SearchInvoiceResponse {
        success: true,
        err: "".to_string(),
        page: page.with_total(total),
        invoices: res.into_iter().map(invoice_item).collect(),
    })
}

async fn pending_appointments_impl(
    pool: web::Data<DbPool>,
    info: web::Json<PendingAppointmentsRequest>,
) -> anyhow::Result<PendingAppointmentsResponse> {
    use crate::schema::{appointments, doctors, invoices, patients};

    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;

    let conn = get_db_conn(&pool)?;
    let rows = block(move || {
        appointments::table
            .inner_join(patients::table.on(appointments::patient_id.eq(patients::id)))
            .inner_join(doctors::table.on(appointments::doctor_id.eq(doctors::id)))
            .left_join(invoices::table.on(invoices::appointment_id.eq(appointments::id)))
            .filter(invoices::id.is_null())
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
        })
        .collect();

    Ok(PendingAppointmentsResponse {
        success: true,
        err: "".to_string(),
        appointments,
    })
}

async fn suggest_service_impl(
    pool: web::Data<DbPool>,
    info: web::Json<SuggestServiceRequest>,
) -> anyhow::Result<SuggestServiceResponse> {
    use crate::schema::{appointments, doctors, services};

    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;

    let appointment_id = info.appointment_id;
    let conn = get_db_conn(&pool)?;
    let (specialty, service) = block(move || {
        let specialty = appointments::table
            .inner_join(doctors::table.on(appointments::doctor_id.eq(doctors::id)))
            .filter(appointments::id.eq(appointment_id))
            .select(doctors::specialty)
            .get_result::<String>(&conn)
            .optional()
            .context("DB error")?;
        let specialty = match specialty {
            Some(specialty) => specialty,
            None => bail!("No such appointment"),
        };

        let service = services::table
            .filter(services::specialty.eq(&specialty))
            .filter(services::active.eq(true))
            .order(services::id.asc())
            .select((services::name, services::price))
            .first::<(String, f64)>(&conn)
            .optional()
            .context("DB error")?;
        Ok((specialty, service))
    })
    .await?;

    let (service, price) = match service {
        Some((name, price)) => (Some(name), Some(price)),
        None => (None, None),
    };
    Ok(SuggestServiceResponse {
        success: true,
        err: "".to_string(),
        specialty_name: specialty_name_or_unknown(&specialty).to_string(),
        service,
        price,
    })
}

/// Count, sum and mean of the invoice amounts.
fn amount_summary(amounts: &[f64]) -> (usize, f64, f64) {
    let total: f64 = amounts.iter().sum();
    let average = if amounts.is_empty() {
        0.0
    } else {
        total / amounts.len() as f64
    };
    (amounts.len(), total, average)
}

const PDF_COLUMNS: [Column; 8] = [
    Column::new("No.", 16.0),
    Column::new("Issued", 22.0),
    Column::new("Patient", 42.0),
    Column::new("Doctor", 42.0),
    Column::new("Service", 50.0),
    Column::new("Amount", 28.0),
    Column::new("Status", 24.0),
    Column::new("Method", 30.0),
];

fn invoices_pdf(company: &str, rows: &[InvoiceRow]) -> anyhow::Result<Vec<u8>> {
    let mut pdf = PdfReport::new(
        company,
        "Invoice report",
        Some("Summary of issued invoices"),
        Orientation::Landscape,
    )?;

    let amounts: Vec<f64> = rows.iter().map(|(i, _, _, _)| i.amount).collect();
    let (count, total, average) = amount_summary(&amounts);

    pdf.heading("Statistics");
    pdf.stats(&[
        ("Total invoices:", count.to_string()),
        ("Total value:", report::format_money(total)),
        ("Average per invoice:", report::format_money(average)),
        (
            "Most common status:",
            report::most_common_or_na(rows.iter().map(|(i, _, _, _)| i.status.clone())),
        ),
        (
            "Most used payment method:",
            report::most_common_or_na(rows.iter().map(|(i, _, _, _)| i.payment_method.clone())),
        ),
    ]);

    pdf.page_break();
    pdf.heading("Invoice listing");
    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|(i, _, p, d)| {
            vec![
                report::format_code(report::INVOICE_CODE, i.id),
                report::format_display_date(&i.issued_at.date()),
                p.full_name(),
                d.display_name(),
                i.service.clone(),
                report::format_money(i.amount),
                i.status.clone(),
                i.payment_method.clone(),
            ]
        })
        .collect();
    pdf.table(&PDF_COLUMNS, &table);
    pdf.finish()
}

async fn export_invoice_pdf_impl(
    pool: web::Data<DbPool>,
    info: web::Query<ExportInvoiceRequest>,
) -> anyhow::Result<ExportFile> {
    use crate::schema::{appointments, doctors, invoices, patients};

    let info = info.into_inner();
    let account_id = get_account_id_from_token(info.login_token, &pool).await?;
    let company = crate::setting::company_name(&pool, account_id).await?;

    let pattern = crate::utils::get_str_pattern_opt(info.keyword);
    let (status, all_status) = crate::utils::get_filter_opt(info.status);
    let (start, end) = crate::utils::get_time_pair_from_date_opt(info.date)?;

    let conn = get_db_conn(&pool)?;
    let rows = block(move || {
        search_query!(&pattern, &status, all_status, start, end)
            .order(invoices::issued_at.desc())
            .get_results::<InvoiceRow>(&conn)
            .context("DB error")
    })
    .await?;

    let bytes = invoices_pdf(&company, &rows)?;
    Ok(ExportFile::pdf("invoices_report.pdf", bytes))
}

const LINE_COLUMNS: [Column; 2] = [Column::new("Description", 140.0), Column::new("Value", 40.0)];

fn invoice_document(company: &str, (i, _, p, d): &InvoiceRow) -> anyhow::Result<Vec<u8>> {
    let number = format!("No. {}", report::format_code(report::INVOICE_CODE, i.id));
    let mut pdf = PdfReport::new(company, "Medical invoice", Some(&number), Orientation::Portrait)?;

    pdf.stats(&[
        ("Issue date:", report::format_display_date(&i.issued_at.date())),
        ("Due date:", report::format_display_date(&i.due_date)),
        ("Status:", i.status.clone()),
        ("Payment method:", i.payment_method.clone()),
        ("Invoice type:", i.kind.clone()),
    ]);

    pdf.heading("Patient");
    pdf.stats(&[
        ("Name:", p.full_name()),
        ("Document:", format!("{} {}", p.document_type, p.document_number)),
        ("EPS:", p.eps.clone()),
    ]);

    pdf.heading("Service");
    pdf.stats(&[
        ("Service:", i.service.clone()),
        ("Doctor:", d.display_name()),
        ("Specialty:", specialty_name_or_unknown(&d.specialty).to_string()),
    ]);

    pdf.table(
        &LINE_COLUMNS,
        &[vec![i.service.clone(), report::format_money(i.amount)]],
    );
    pdf.stats(&[
        ("Subtotal:", report::format_money(i.amount)),
        ("VAT (0%):", report::format_money(0.0)),
        ("Total:", report::format_money(i.amount)),
    ]);
    if let Some(notes) = &i.notes {
        pdf.paragraph("Notes", notes);
    }

    pdf.finish()
}

async fn print_invoice_impl(
    pool: web::Data<DbPool>,
    info: web::Query<PrintInvoiceRequest>,
) -> anyhow::Result<ExportFile> {
    use crate::schema::{appointments, doctors, invoices, patients};

    let info = info.into_inner();
    let account_id = get_account_id_from_token(info.login_token, &pool).await?;
    let company = crate::setting::company_name(&pool, account_id).await?;

    let id = info.id;
    let conn = get_db_conn(&pool)?;
    let row = block(move || {
        joined_invoices!()
            .filter(invoices::id.eq(id))
            .get_result::<InvoiceRow>(&conn)
            .optional()
            .context("DB error")
    })
    .await?;
    let row = match row {
        Some(row) => row,
        None => bail!("No such invoice"),
    };

    let bytes = invoice_document(&company, &row)?;
    Ok(ExportFile::pdf(
        format!("invoice_{}.pdf", report::format_code(report::INVOICE_CODE, id)),
        bytes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(amount: Option<Amount>) -> InvoiceForm {
        InvoiceForm {
            service: Some("Consulta general".to_string()),
            amount,
            status: None,
            due_date: Some("2025-07-01".to_string()),
            payment_method: Some("efectivo".to_string()),
            notes: Some("  ".to_string()),
        }
    }

    #[test]
    fn amount_accepts_numbers_and_numeric_text() {
        assert_eq!(parse_amount(Some(Amount::Number(50000.0))).unwrap(), 50000.0);
        assert_eq!(
            parse_amount(Some(Amount::Text(" 1250.5 ".to_string()))).unwrap(),
            1250.5
        );
    }

    #[test]
    fn amount_is_required_and_numeric() {
        assert!(parse_amount(None).is_err());
        assert!(parse_amount(Some(Amount::Text("".to_string()))).is_err());
        assert!(parse_amount(Some(Amount::Text("abc".to_string()))).is_err());
        assert!(parse_amount(Some(Amount::Number(-1.0))).is_err());
    }

    #[test]
    fn amount_deserializes_from_either_shape() {
        let n: Amount = serde_json::from_str("120").unwrap();
        assert_eq!(n, Amount::Number(120.0));
        let t: Amount = serde_json::from_str("\"120\"").unwrap();
        assert_eq!(t, Amount::Text("120".to_string()));
    }

    #[test]
    fn status_defaults_to_pending() {
        let update = form(Some(Amount::Number(10.0))).into_update().unwrap();
        assert_eq!(update.status, INVOICE_STATUS_PENDING);
        assert_eq!(update.notes, None);
    }

    #[test]
    fn due_date_is_required() {
        let mut f = form(Some(Amount::Number(10.0)));
        f.due_date = None;
        assert!(f.into_update().is_err());
    }

    #[test]
    fn summary_of_amounts() {
        assert_eq!(amount_summary(&[]), (0, 0.0, 0.0));
        assert_eq!(amount_summary(&[100.0, 300.0]), (2, 400.0, 200.0));
    }

    #[test]
    fn second_invoice_for_an_appointment_is_refused() {
        let conn = match crate::database::testing::connect() {
            Some(conn) => conn,
            None => return,
        };
        conn.test_transaction::<_, anyhow::Error, _>(|| {
            let appointment_id = crate::database::testing::seed_appointment(&conn);
            let invoice = |amount: f64| NewInvoice {
                appointment_id,
                service: "Consulta general".to_string(),
                amount,
                status: INVOICE_STATUS_PENDING.to_string(),
                issued_at: local_now(),
                due_date: chrono::NaiveDate::from_ymd(2025, 7, 10),
                payment_method: "Efectivo".to_string(),
                kind: "Consulta".to_string(),
                notes: None,
            };

            create_invoice(&conn, invoice(50000.0))?;
            let err = create_invoice(&conn, invoice(80000.0)).unwrap_err();
            assert_eq!(err.to_string(), "This appointment already has an invoice");

            use crate::schema::invoices;
            let amounts: Vec<f64> = invoices::table
                .filter(invoices::appointment_id.eq(appointment_id))
                .select(invoices::amount)
                .load(&conn)?;
            assert_eq!(amounts, vec![50000.0]);
            Ok(())
        });
    }
}
