use crate::schema::invoices;
use chrono::{NaiveDate, NaiveDateTime};

#[derive(Queryable)]
pub struct Invoice {
    pub id: u64,
    pub appointment_id: u64,
    pub service: String,
    pub amount: f64,
    pub status: String,
    pub issued_at: NaiveDateTime,
    pub due_date: NaiveDate,
    pub payment_method: String,
    pub kind: String,
    pub notes: Option<String>,
}

#[derive(Insertable)]
#[table_name = "invoices"]
pub struct NewInvoice {
    pub appointment_id: u64,
    pub service: String,
    pub amount: f64,
    pub status: String,
    pub issued_at: NaiveDateTime,
    pub due_date: NaiveDate,
    pub payment_method: String,
    pub kind: String,
    pub notes: Option<String>,
}

#[derive(AsChangeset)]
#[table_name = "invoices"]
#[changeset_options(treat_none_as_null = "true")]
pub struct UpdateInvoice {
    pub service: String,
    pub amount: f64,
    pub status: String,
    pub due_date: NaiveDate,
    pub payment_method: String,
    pub notes: Option<String>,
}

pub const INVOICE_STATUS_PENDING: &str = "pendiente";
