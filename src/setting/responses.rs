use serde::Serialize;

#[derive(Default, Serialize)]
pub struct SettingItem {
    pub company_name: String,
    pub company_nit: String,
    pub health_registry: String,
    pub slogan: String,
    pub logo: String,
    pub favicon: String,
    pub updated_at: String,
}

#[derive(Default, Serialize)]
pub struct ViewSettingResponse {
    pub success: bool,
    pub err: String,
    pub setting: Option<SettingItem>,
}

crate::impl_err_response! {
    ViewSettingResponse,
}
