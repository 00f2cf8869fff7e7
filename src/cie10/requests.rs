use serde::Deserialize;

#[derive(Deserialize)]
pub struct SearchCie10Request {
    pub login_token: String,
    pub q: Option<String>,
}
