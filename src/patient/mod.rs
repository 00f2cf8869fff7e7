mod requests;
mod responses;

use crate::{
    account::utils::get_account_id_from_token,
    database::{assert, block, get_db_conn},
    models::patients::{Patient, PatientData},
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
use diesel::{mysql::Mysql, prelude::*};

use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(add_patient)
        .service(modify_patient)
        .service(delete_patient)
        .service(search_patient)
        .service(export_patient_pdf)
        .service(export_patient_excel);
}

crate::post_funcs! {
    (add_patient, "/add_patient", AddPatientRequest, SimpleResponse),
    (modify_patient, "/modify_patient", ModifyPatientRequest, SimpleResponse),
    (delete_patient, "/delete_patient", DeletePatientRequest, SimpleResponse),
    (search_patient, "/search_patient", SearchPatientRequest, SearchPatientResponse),
}

crate::export_funcs! {
    (export_patient_pdf, "/export_pdf", ExportPatientRequest),
    (export_patient_excel, "/export_excel", ExportPatientRequest),
}

impl PatientForm {
    fn into_data(self) -> anyhow::Result<PatientData> {
        let sex = require_str(self.sex, "Sex")?;
        crate::utils::assert_sex_str(&sex)?;
        let email = require_str(self.email, "Email")?;
        crate::utils::assert_email_str(&email)?;
        let birth_date = crate::utils::parse_date_str(require_str(self.birth_date, "Birth date")?)?;

        Ok(PatientData {
            first_name: require_str(self.first_name, "First name")?,
            last_name: require_str(self.last_name, "Last name")?,
            document_type: require_str(self.document_type, "Document type")?,
            document_number: require_str(self.document_number, "Document number")?,
            birth_date,
            sex,
            blood_type: non_blank(self.blood_type),
            regime: non_blank(self.regime),
            department_id: self.department_id.context("Department is required")?,
            city_id: self.city_id.context("City is required")?,
            phone: require_str(self.phone, "Phone")?,
            email,
            address: require_str(self.address, "Address")?,
            marital_status: require_str(self.marital_status, "Marital status")?,
            occupation: require_str(self.occupation, "Occupation")?,
            eps: require_str(self.eps, "EPS")?,
            emergency_contact: require_str(self.emergency_contact, "Emergency contact")?,
            emergency_phone: require_str(self.emergency_phone, "Emergency phone")?,
        })
    }
}

/// Rejects a document number or email already used by another patient.
fn check_unique(conn: &MysqlConnection, data: &PatientData, exclude: Option<u64>) -> anyhow::Result<()> {
    use crate::schema::patients;

    let exclude = exclude.unwrap_or(0);
    let res = patients::table
        .filter(patients::document_number.eq(&data.document_number))
        .filter(patients::id.ne(exclude))
        .count()
        .get_result::<i64>(conn)
        .context("DB error")?;
    if res > 0 {
        bail!("A patient with this document number already exists");
    }

    let res = patients::table
        .filter(patients::email.eq(&data.email))
        .filter(patients::id.ne(exclude))
        .count()
        .get_result::<i64>(conn)
        .context("DB error")?;
    if res > 0 {
        bail!("A patient with this email already exists");
    }

    Ok(())
}

fn search_query<'a>(pattern: &'a str) -> crate::schema::patients::BoxedQuery<'a, Mysql> {
    use crate::schema::patients;

    patients::table
        .filter(
            patients::first_name
                .like(pattern)
                .or(patients::last_name.like(pattern))
                .or(patients::document_number.like(pattern))
                .or(patients::email.like(pattern))
                .or(patients::phone.like(pattern)),
        )
        .into_boxed()
}

fn patient_item(p: Patient) -> PatientItem {
    PatientItem {
        id: p.id,
        code: report::format_code(report::PATIENT_CODE, p.id),
        first_name: p.first_name,
        last_name: p.last_name,
        document_type: p.document_type,
        document_number: p.document_number,
        birth_date: crate::utils::format_date_str(&p.birth_date),
        sex: p.sex,
        blood_type: p.blood_type.unwrap_or_default(),
        regime: p.regime.unwrap_or_default(),
        department_id: p.department_id,
        city_id: p.city_id,
        phone: p.phone,
        email: p.email,
        address: p.address,
        marital_status: p.marital_status,
        occupation: p.occupation,
        eps: p.eps,
        emergency_contact: p.emergency_contact,
        emergency_phone: p.emergency_phone,
    }
}

async fn add_patient_impl(
    pool: web::Data<DbPool>,
    info: web::Json<AddPatientRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::patients;

    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;

    let data = info.patient.into_data()?;
    assert::assert_location(&pool, data.department_id, data.city_id).await?;

    let conn = get_db_conn(&pool)?;
    block(move || {
        conn.transaction(|| {
            check_unique(&conn, &data, None)?;
            diesel::insert_into(patients::table)
                .values(data)
                .execute(&conn)
                .context("DB error")?;
            Ok(())
        })
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn modify_patient_impl(
    pool: web::Data<DbPool>,
    info: web::Json<ModifyPatientRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::patients;

    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;
    assert::assert_patient(&pool, info.id).await?;

    let id = info.id;
    let data = info.patient.into_data()?;
    assert::assert_location(&pool, data.department_id, data.city_id).await?;

    let conn = get_db_conn(&pool)?;
    block(move || {
        conn.transaction(|| {
            check_unique(&conn, &data, Some(id))?;
            diesel::update(patients::table.filter(patients::id.eq(id)))
                .set(&data)
                .execute(&conn)
                .context("DB error")?;
            Ok(())
        })
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn delete_patient_impl(
    pool: web::Data<DbPool>,
    info: web::Json<DeletePatientRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::patients;

    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;
    assert::assert_patient(&pool, info.id).await?;

    let id = info.id;
    let conn = get_db_conn(&pool)?;
    block(move || {
        diesel::delete(patients::table.filter(patients::id.eq(id)))
            .execute(&conn)
            .context("DB error")
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn search_patient_impl(
    pool: web::Data<DbPool>,
    info: web::Json<SearchPatientRequest>,
) -> anyhow::Result<SearchPatientResponse> {
    use crate::schema::patients;

    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;

    let pattern = crate::utils::get_str_pattern_opt(info.keyword);
    let page = PageInfo::request(info.page, info.per_page);
    let (offset, limit) = (page.offset(), page.limit());

    let conn = get_db_conn(&pool)?;
    let (total, res) = block(move || {
        let total = search_query(&pattern)
            .count()
            .get_result::<i64>(&conn)
            .context("DB error")?;
        let res = search_query(&pattern)
            .order(patients::id.asc())
            .offset(offset)
            .limit(limit)
            .get_results::<Patient>(&conn)
            .context("DB error")?;
        Ok((total, res))
    })
    .await?;

    Ok(SearchPatientResponse {
        success: true,
        err: "".to_string(),
        page: page.with_total(total),
        patients: res.into_iter().map(patient_item).collect(),
    })
}

async fn load_patients(pool: &web::Data<DbPool>, keyword: Option<String>) -> anyhow::Result<Vec<Patient>> {
    use crate::schema::patients;

    let pattern = crate::utils::get_str_pattern_opt(keyword);
    let conn = get_db_conn(pool)?;
    block(move || {
        search_query(&pattern)
            .order(patients::id.asc())
            .get_results::<Patient>(&conn)
            .context("DB error")
    })
    .await
}

const PDF_COLUMNS: [Column; 8] = [
    Column::new("ID", 16.0),
    Column::new("First name", 32.0),
    Column::new("Last name", 32.0),
    Column::new("Doc. type", 20.0),
    Column::new("Doc. number", 28.0),
    Column::new("Phone", 26.0),
    Column::new("Email", 56.0),
    Column::new("EPS", 40.0),
];

fn patients_pdf(company: &str, patients: &[Patient]) -> anyhow::Result<Vec<u8>> {
    let mut pdf = PdfReport::new(
        company,
        "Patient report",
        Some("Registered patients"),
        Orientation::Landscape,
    )?;
    let rows: Vec<Vec<String>> = patients
        .iter()
        .map(|p| {
            vec![
                report::format_code(report::PATIENT_CODE, p.id),
                p.first_name.clone(),
                p.last_name.clone(),
                p.document_type.clone(),
                p.document_number.clone(),
                p.phone.clone(),
                p.email.clone(),
                p.eps.clone(),
            ]
        })
        .collect();
    pdf.stats(&[("Total patients:", patients.len().to_string())]);
    pdf.table(&PDF_COLUMNS, &rows);
    pdf.finish()
}

async fn export_patient_pdf_impl(
    pool: web::Data<DbPool>,
    info: web::Query<ExportPatientRequest>,
) -> anyhow::Result<ExportFile> {
    let info = info.into_inner();
    let account_id = get_account_id_from_token(info.login_token, &pool).await?;

    let company = crate::setting::company_name(&pool, account_id).await?;
    let patients = load_patients(&pool, info.keyword).await?;
    let bytes = patients_pdf(&company, &patients)?;

    Ok(ExportFile::pdf("patients_report.pdf", bytes))
}

async fn export_patient_excel_impl(
    pool: web::Data<DbPool>,
    info: web::Query<ExportPatientRequest>,
) -> anyhow::Result<ExportFile> {
    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;

    let patients = load_patients(&pool, info.keyword).await?;
    let rows = patients
        .into_iter()
        .map(|p| {
            vec![
                Cell::from(p.first_name),
                p.last_name.into(),
                p.document_type.into(),
                p.document_number.into(),
                p.phone.into(),
                p.email.into(),
                p.eps.into(),
            ]
        })
        .collect();
    let bytes = excel::build_sheet(
        "Patients",
        &["First name", "Last name", "Doc. type", "Doc. number", "Phone", "Email", "EPS"],
        rows,
    )?;

    Ok(ExportFile::xlsx("patients.xlsx", bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn form() -> PatientForm {
        PatientForm {
            first_name: Some("Ana".to_string()),
            last_name: Some("Perez".to_string()),
            document_type: Some("CC".to_string()),
            document_number: Some("1020304050".to_string()),
            birth_date: Some("1990-05-17".to_string()),
            sex: Some("F".to_string()),
            blood_type: Some(" ".to_string()),
            regime: Some("Contributivo".to_string()),
            department_id: Some(5),
            city_id: Some(51),
            phone: Some("3001234567".to_string()),
            email: Some("ana@mail.co".to_string()),
            address: Some("Calle 1 # 2-3".to_string()),
            marital_status: Some("Soltera".to_string()),
            occupation: Some("Docente".to_string()),
            eps: Some("NUEVA EPS".to_string()),
            emergency_contact: Some("Luis Perez".to_string()),
            emergency_phone: Some("3017654321".to_string()),
        }
    }

    #[test]
    fn complete_form_converts() {
        let data = form().into_data().unwrap();
        assert_eq!(data.birth_date, NaiveDate::from_ymd(1990, 5, 17));
        assert_eq!(data.blood_type, None);
        assert_eq!(data.regime.as_deref(), Some("Contributivo"));
    }

    #[test]
    fn invalid_sex_is_rejected() {
        let mut f = form();
        f.sex = Some("X".to_string());
        assert!(f.into_data().is_err());
    }

    #[test]
    fn missing_city_is_rejected() {
        let mut f = form();
        f.city_id = None;
        let err = f.into_data().unwrap_err();
        assert_eq!(err.to_string(), "City is required");
    }

    #[test]
    fn blank_required_field_is_rejected() {
        let mut f = form();
        f.document_number = Some("  ".to_string());
        assert_eq!(f.into_data().unwrap_err().to_string(), "Document number is required");
    }

    #[test]
    fn pdf_export_renders() {
        let bytes = patients_pdf("MediSoft", &[]).unwrap();
        assert_eq!(&bytes[0..4], b"%PDF");
    }
}
