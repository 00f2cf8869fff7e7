use crate::schema::accounts;
use chrono::NaiveDateTime;

#[derive(Queryable)]
pub struct Account {
    pub id: u64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub document_type: Option<String>,
    pub document_number: Option<String>,
    pub registered_at: NaiveDateTime,
    pub photo: Option<String>,
}

#[derive(Insertable)]
#[table_name = "accounts"]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub registered_at: NaiveDateTime,
}

#[derive(AsChangeset, Default, PartialEq, Debug)]
#[table_name = "accounts"]
pub struct UpdateAccount {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub document_type: Option<String>,
    pub document_number: Option<String>,
}
