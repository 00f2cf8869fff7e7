use serde::Deserialize;

/// Amounts arrive either as JSON numbers or as the text typed in a form.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

#[derive(Deserialize, Default)]
pub struct InvoiceForm {
    pub service: Option<String>,
    pub amount: Option<Amount>,
    pub status: Option<String>,
    pub due_date: Option<String>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct AddInvoiceRequest {
    pub login_token: String,
    pub appointment_id: Option<u64>,
    pub kind: Option<String>,
    #[serde(flatten)]
    pub invoice: InvoiceForm,
}

#[derive(Deserialize)]
pub struct ModifyInvoiceRequest {
    pub login_token: String,
    pub id: u64,
    #[serde(flatten)]
    pub invoice: InvoiceForm,
}

#[derive(Deserialize)]
pub struct DeleteInvoiceRequest {
    pub login_token: String,
    pub id: u64,
}

#[derive(Deserialize)]
pub struct SearchInvoiceRequest {
    pub login_token: String,
    pub keyword: Option<String>,
    pub status: Option<String>,
    pub date: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Deserialize)]
pub struct PendingAppointmentsRequest {
    pub login_token: String,
}

#[derive(Deserialize)]
pub struct SuggestServiceRequest {
    pub login_token: String,
    pub appointment_id: u64,
}

#[derive(Deserialize)]
pub struct ExportInvoiceRequest {
    pub login_token: String,
    pub keyword: Option<String>,
    pub status: Option<String>,
    pub date: Option<String>,
}

#[derive(Deserialize)]
pub struct PrintInvoiceRequest {
    pub login_token: String,
    pub id: u64,
}
