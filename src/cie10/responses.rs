use serde::Serialize;

#[derive(Default, Serialize, Debug, PartialEq)]
pub struct Cie10Item {
    pub id: u64,
    pub text: String,
    pub code: String,
    pub description: String,
}

#[derive(Default, Serialize)]
pub struct SearchCie10Response {
    pub success: bool,
    pub err: String,
    pub results: Vec<Cie10Item>,
}

#[derive(Default, Serialize)]
pub struct ImportCie10Response {
    pub success: bool,
    pub err: String,
    pub inserted: usize,
    pub skipped: usize,
}

crate::impl_err_response! {
    SearchCie10Response,
    ImportCie10Response,
}
