mod requests;
mod responses;

use crate::{
    account::utils::get_account_id_from_token,
    database::{assert, block, get_db_conn},
    models::{
        doctors::{Doctor, NewDoctor, UpdateDoctor, DOCTOR_STATUS_ACTIVE},
        references::specialty_name_or_unknown,
    },
    protocol::{PageInfo, SimpleResponse},
    report::{
        excel::{self, Cell},
        pdf::{Column, Orientation, PdfReport},
        ExportFile,
    },
    utils::require_str,
    DbPool,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use anyhow::{self, bail, Context};
use chrono::{NaiveDateTime, Utc};
use diesel::{mysql::Mysql, prelude::*};

use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(add_doctor)
        .service(modify_doctor)
        .service(delete_doctor)
        .service(search_doctor)
        .service(export_doctor_pdf)
        .service(export_doctor_excel);
}

crate::post_funcs! {
    (add_doctor, "/add_doctor", AddDoctorRequest, SimpleResponse),
    (modify_doctor, "/modify_doctor", ModifyDoctorRequest, SimpleResponse),
    (delete_doctor, "/delete_doctor", DeleteDoctorRequest, SimpleResponse),
    (search_doctor, "/search_doctor", SearchDoctorRequest, SearchDoctorResponse),
}

crate::export_funcs! {
    (export_doctor_pdf, "/export_pdf", ExportDoctorRequest),
    (export_doctor_excel, "/export_excel", ExportDoctorRequest),
}

impl DoctorForm {
    /// A new record: status `Activo`, both timestamps `now`.
    fn into_new(self, now: NaiveDateTime) -> anyhow::Result<NewDoctor> {
        let email = require_str(self.email, "Email")?;
        crate::utils::assert_email_str(&email)?;
        let birth_date = crate::utils::parse_date_str(require_str(self.birth_date, "Birth date")?)?;
        let years_experience = self
            .years_experience
            .context("Years of experience is required")?;
        if years_experience < 0 {
            bail!("Years of experience cannot be negative");
        }

        Ok(NewDoctor {
            first_name: require_str(self.first_name, "First name")?,
            last_name: require_str(self.last_name, "Last name")?,
            document_type: require_str(self.document_type, "Document type")?,
            document_number: require_str(self.document_number, "Document number")?,
            birth_date,
            gender: require_str(self.gender, "Gender")?,
            phone: require_str(self.phone, "Phone")?,
            email,
            address: require_str(self.address, "Address")?,
            department_id: self.department_id.context("Department is required")?,
            city_id: self.city_id.context("City is required")?,
            university_id: self.university_id.context("University is required")?,
            years_experience,
            specialty: require_str(self.specialty, "Specialty")?,
            registry_number: require_str(self.registry_number, "Registry number")?,
            status: DOCTOR_STATUS_ACTIVE.to_string(),
            registered_at: now,
            updated_at: now,
        })
    }
}

impl From<NewDoctor> for UpdateDoctor {
    fn from(d: NewDoctor) -> Self {
        Self {
            first_name: d.first_name,
            last_name: d.last_name,
            document_type: d.document_type,
            document_number: d.document_number,
            birth_date: d.birth_date,
            gender: d.gender,
            phone: d.phone,
            email: d.email,
            address: d.address,
            department_id: d.department_id,
            city_id: d.city_id,
            university_id: d.university_id,
            years_experience: d.years_experience,
            specialty: d.specialty,
            registry_number: d.registry_number,
            status: d.status,
            updated_at: d.updated_at,
        }
    }
}

fn check_unique(
    conn: &MysqlConnection,
    document_number: &str,
    email: &str,
    registry_number: &str,
    exclude: Option<u64>,
) -> anyhow::Result<()> {
    use crate::schema::doctors;

    let exclude = exclude.unwrap_or(0);
    let others = doctors::table.filter(doctors::id.ne(exclude));

    let res = others
        .clone()
        .filter(doctors::document_number.eq(document_number))
        .count()
        .get_result::<i64>(conn)
        .context("DB error")?;
    if res > 0 {
        bail!("A doctor with this document number already exists");
    }

    let res = others
        .clone()
        .filter(doctors::email.eq(email))
        .count()
        .get_result::<i64>(conn)
        .context("DB error")?;
    if res > 0 {
        bail!("A doctor with this email already exists");
    }

    let res = others
        .clone()
        .filter(doctors::registry_number.eq(registry_number))
        .count()
        .get_result::<i64>(conn)
        .context("DB error")?;
    if res > 0 {
        bail!("A doctor with this registry number already exists");
    }

    Ok(())
}

fn search_query<'a>(
    pattern: &'a str,
    specialty: &'a str,
    all_specialties: bool,
) -> crate::schema::doctors::BoxedQuery<'a, Mysql> {
    use crate::schema::doctors;

    doctors::table
        .filter(
            doctors::first_name
                .like(pattern)
                .or(doctors::last_name.like(pattern))
                .or(doctors::document_number.like(pattern))
                .or(doctors::email.like(pattern))
                .or(doctors::phone.like(pattern)),
        )
        .filter(doctors::specialty.eq(specialty).or(all_specialties))
        .into_boxed()
}

fn doctor_item(d: Doctor) -> DoctorItem {
    DoctorItem {
        id: d.id,
        specialty_name: specialty_name_or_unknown(&d.specialty).to_string(),
        first_name: d.first_name,
        last_name: d.last_name,
        document_type: d.document_type,
        document_number: d.document_number,
        birth_date: crate::utils::format_date_str(&d.birth_date),
        gender: d.gender,
        phone: d.phone,
        email: d.email,
        address: d.address,
        department_id: d.department_id,
        city_id: d.city_id,
        university_id: d.university_id,
        years_experience: d.years_experience,
        specialty: d.specialty,
        registry_number: d.registry_number,
        status: d.status,
        registered_at: crate::utils::format_time_str(&d.registered_at),
        updated_at: crate::utils::format_time_str(&d.updated_at),
    }
}

async fn add_doctor_impl(
    pool: web::Data<DbPool>,
    info: web::Json<AddDoctorRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::doctors;

    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;

    let data = info.doctor.into_new(Utc::now().naive_utc())?;
    assert::assert_location(&pool, data.department_id, data.city_id).await?;
    assert::assert_university(&pool, data.university_id).await?;

    let conn = get_db_conn(&pool)?;
    block(move || {
        conn.transaction(|| {
            check_unique(
                &conn,
                &data.document_number,
                &data.email,
                &data.registry_number,
                None,
            )?;
            diesel::insert_into(doctors::table)
                .values(data)
                .execute(&conn)
                .context("DB error")?;
            Ok(())
        })
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn modify_doctor_impl(
    pool: web::Data<DbPool>,
    info: web::Json<ModifyDoctorRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::doctors;

    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;
    assert::assert_doctor(&pool, info.id).await?;

    let id = info.id;
    let mut data: UpdateDoctor = info.doctor.into_new(Utc::now().naive_utc())?.into();
    if let Some(status) = crate::utils::non_blank(info.status) {
        data.status = status;
    }
    assert::assert_location(&pool, data.department_id, data.city_id).await?;
    assert::assert_university(&pool, data.university_id).await?;

    let conn = get_db_conn(&pool)?;
    block(move || {
        conn.transaction(|| {
            check_unique(
                &conn,
                &data.document_number,
                &data.email,
                &data.registry_number,
                Some(id),
            )?;
            diesel::update(doctors::table.filter(doctors::id.eq(id)))
                .set(data)
                .execute(&conn)
                .context("DB error")?;
            Ok(())
        })
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn delete_doctor_impl(
    pool: web::Data<DbPool>,
    info: web::Json<DeleteDoctorRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::doctors;

    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;
    assert::assert_doctor(&pool, info.id).await?;

    let id = info.id;
    let conn = get_db_conn(&pool)?;
    block(move || {
        diesel::delete(doctors::table.filter(doctors::id.eq(id)))
            .execute(&conn)
            .context("DB error")
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn search_doctor_impl(
    pool: web::Data<DbPool>,
    info: web::Json<SearchDoctorRequest>,
) -> anyhow::Result<SearchDoctorResponse> {
    use crate::schema::doctors;

    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;

    let pattern = crate::utils::get_str_pattern_opt(info.keyword);
    let (specialty, all_specialties) = crate::utils::get_filter_opt(info.specialty);
    let page = PageInfo::request(info.page, info.per_page);
    let (offset, limit) = (page.offset(), page.limit());

    let conn = get_db_conn(&pool)?;
    let (total, res) = block(move || {
        let total = search_query(&pattern, &specialty, all_specialties)
            .count()
            .get_result::<i64>(&conn)
            .context("DB error")?;
        let res = search_query(&pattern, &specialty, all_specialties)
            .order(doctors::id.asc())
            .offset(offset)
            .limit(limit)
            .get_results::<Doctor>(&conn)
            .context("DB error")?;
        Ok((total, res))
    })
    .await?;

    Ok(SearchDoctorResponse {
        success: true,
        err: "".to_string(),
        page: page.with_total(total),
        doctors: res.into_iter().map(doctor_item).collect(),
    })
}

async fn load_doctors(
    pool: &web::Data<DbPool>,
    keyword: Option<String>,
    specialty: Option<String>,
) -> anyhow::Result<Vec<Doctor>> {
    use crate::schema::doctors;

    let pattern = crate::utils::get_str_pattern_opt(keyword);
    let (specialty, all_specialties) = crate::utils::get_filter_opt(specialty);
    let conn = get_db_conn(pool)?;
    block(move || {
        search_query(&pattern, &specialty, all_specialties)
            .order(doctors::id.asc())
            .get_results::<Doctor>(&conn)
            .context("DB error")
    })
    .await
}

const PDF_COLUMNS: [Column; 7] = [
    Column::new("Name", 48.0),
    Column::new("Specialty", 42.0),
    Column::new("Doc. type", 20.0),
    Column::new("Doc. number", 28.0),
    Column::new("Registry", 28.0),
    Column::new("Phone", 26.0),
    Column::new("Email", 58.0),
];

fn doctors_pdf(company: &str, doctors: &[Doctor]) -> anyhow::Result<Vec<u8>> {
    let mut pdf = PdfReport::new(
        company,
        "Doctor report",
        Some("Registered medical staff"),
        Orientation::Landscape,
    )?;

    let active = doctors
        .iter()
        .filter(|d| d.status == DOCTOR_STATUS_ACTIVE)
        .count();
    let specialty = crate::report::most_common_or_na(
        doctors
            .iter()
            .map(|d| specialty_name_or_unknown(&d.specialty).to_string()),
    );
    pdf.stats(&[
        ("Total doctors:", doctors.len().to_string()),
        ("Active doctors:", active.to_string()),
        ("Most common specialty:", specialty),
    ]);

    let rows: Vec<Vec<String>> = doctors
        .iter()
        .map(|d| {
            vec![
                d.display_name(),
                specialty_name_or_unknown(&d.specialty).to_string(),
                d.document_type.clone(),
                d.document_number.clone(),
                d.registry_number.clone(),
                d.phone.clone(),
                d.email.clone(),
            ]
        })
        .collect();
    pdf.table(&PDF_COLUMNS, &rows);
    pdf.finish()
}

async fn export_doctor_pdf_impl(
    pool: web::Data<DbPool>,
    info: web::Query<ExportDoctorRequest>,
) -> anyhow::Result<ExportFile> {
    let info = info.into_inner();
    let account_id = get_account_id_from_token(info.login_token, &pool).await?;

    let company = crate::setting::company_name(&pool, account_id).await?;
    let doctors = load_doctors(&pool, info.keyword, info.specialty).await?;
    let bytes = doctors_pdf(&company, &doctors)?;

    Ok(ExportFile::pdf("doctors_report.pdf", bytes))
}

async fn export_doctor_excel_impl(
    pool: web::Data<DbPool>,
    info: web::Query<ExportDoctorRequest>,
) -> anyhow::Result<ExportFile> {
    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;

    let doctors = load_doctors(&pool, info.keyword, info.specialty).await?;
    let rows = doctors
        .into_iter()
        .map(|d| {
            vec![
                Cell::from(specialty_name_or_unknown(&d.specialty)),
                d.first_name.into(),
                d.last_name.into(),
                d.document_type.into(),
                d.document_number.into(),
                d.phone.into(),
                d.email.into(),
            ]
        })
        .collect();
    let bytes = excel::build_sheet(
        "Doctors",
        &["Specialty", "First name", "Last name", "Doc. type", "Doc. number", "Phone", "Email"],
        rows,
    )?;

    Ok(ExportFile::xlsx("doctors.xlsx", bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> DoctorForm {
        DoctorForm {
            first_name: Some("Laura".to_string()),
            last_name: Some("Rios".to_string()),
            document_type: Some("CC".to_string()),
            document_number: Some("52000111".to_string()),
            birth_date: Some("1980-02-29".to_string()),
            gender: Some("Femenino".to_string()),
            phone: Some("3105556677".to_string()),
            email: Some("laura.rios@clinic.co".to_string()),
            address: Some("Cra 7 # 10-20".to_string()),
            department_id: Some(11),
            city_id: Some(1101),
            university_id: Some(3),
            years_experience: Some(12),
            specialty: Some("cardiologia".to_string()),
            registry_number: Some("RM-4455".to_string()),
        }
    }

    #[test]
    fn new_doctor_starts_active() {
        let now = Utc::now().naive_utc();
        let data = form().into_new(now).unwrap();
        assert_eq!(data.status, DOCTOR_STATUS_ACTIVE);
        assert_eq!(data.registered_at, now);
        assert_eq!(data.updated_at, now);
    }

    #[test]
    fn negative_experience_is_rejected() {
        let mut f = form();
        f.years_experience = Some(-1);
        assert!(f.into_new(Utc::now().naive_utc()).is_err());
    }

    #[test]
    fn bad_birth_date_is_rejected() {
        let mut f = form();
        f.birth_date = Some("1981-02-29".to_string());
        assert!(f.into_new(Utc::now().naive_utc()).is_err());
    }

    #[test]
    fn search_item_carries_specialty_name() {
        let now = Utc::now().naive_utc();
        let d = form().into_new(now).unwrap();
        let doctor = Doctor {
            id: 4,
            first_name: d.first_name,
            last_name: d.last_name,
            document_type: d.document_type,
            document_number: d.document_number,
            birth_date: d.birth_date,
            gender: d.gender,
            phone: d.phone,
            email: d.email,
            address: d.address,
            department_id: d.department_id,
            city_id: d.city_id,
            university_id: d.university_id,
            years_experience: d.years_experience,
            specialty: "astrologia".to_string(),
            registry_number: d.registry_number,
            status: d.status,
            registered_at: now,
            updated_at: now,
        };
        let item = doctor_item(doctor);
        assert_eq!(item.specialty_name, "Unknown specialty");
    }

    #[test]
    fn pdf_export_renders() {
        let bytes = doctors_pdf("MediSoft", &[]).unwrap();
        assert_eq!(&bytes[0..4], b"%PDF");
    }
}
