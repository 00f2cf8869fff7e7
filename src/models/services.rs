use crate::schema::services;

#[derive(Queryable)]
pub struct Service {
    pub id: u64,
    pub name: String,
    pub specialty: Option<String>,
    pub price: f64,
    pub active: bool,
}

#[derive(Insertable)]
#[table_name = "services"]
pub struct NewService {
    pub name: String,
    pub specialty: Option<String>,
    pub price: f64,
    pub active: bool,
}

#[derive(AsChangeset, Default, PartialEq, Debug)]
#[table_name = "services"]
pub struct UpdateService {
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub price: Option<f64>,
    pub active: Option<bool>,
}
