use serde::Deserialize;

#[derive(Deserialize)]
pub struct ViewSettingRequest {
    pub login_token: String,
}
