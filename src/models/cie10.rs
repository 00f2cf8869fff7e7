use crate::schema::cie10;
use chrono::NaiveDateTime;

#[derive(Queryable)]
pub struct Cie10 {
    pub id: u64,
    pub code: String,
    pub description: String,
    pub chapter: Option<String>,
    pub group_name: Option<String>,
    pub active: bool,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[table_name = "cie10"]
pub struct NewCie10 {
    pub code: String,
    pub description: String,
    pub chapter: Option<String>,
    pub group_name: Option<String>,
    pub active: bool,
    pub updated_at: NaiveDateTime,
}
