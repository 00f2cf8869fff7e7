use crate::schema::clinic_settings;
use chrono::NaiveDateTime;

#[derive(Queryable)]
pub struct ClinicSetting {
    pub id: u64,
    pub account_id: u64,
    pub company_name: String,
    pub company_nit: String,
    pub health_registry: String,
    pub slogan: Option<String>,
    pub logo: Option<String>,
    pub favicon: Option<String>,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[table_name = "clinic_settings"]
pub struct NewClinicSetting {
    pub account_id: u64,
    pub company_name: String,
    pub company_nit: String,
    pub health_registry: String,
    pub slogan: Option<String>,
    pub logo: Option<String>,
    pub favicon: Option<String>,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset, Default)]
#[table_name = "clinic_settings"]
pub struct UpdateClinicSetting {
    pub company_name: Option<String>,
    pub company_nit: Option<String>,
    pub health_registry: Option<String>,
    pub slogan: Option<String>,
    pub logo: Option<String>,
    pub favicon: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}
