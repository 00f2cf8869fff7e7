use serde::Serialize;

#[derive(Default, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub err: String,
    pub login_token: String,
    pub name: String,
}

#[derive(Default, Serialize)]
pub struct ViewProfileResponse {
    pub success: bool,
    pub err: String,
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub document_type: String,
    pub document_number: String,
    pub registered_at: String,
    pub photo: String,
}

#[derive(Default, Serialize)]
pub struct UploadPhotoResponse {
    pub success: bool,
    pub err: String,
    pub photo: String,
}

#[derive(Default, Serialize)]
pub struct CheckResetTokenResponse {
    pub success: bool,
    pub err: String,
    pub email: String,
}

crate::impl_err_response! {
    LoginResponse,
    ViewProfileResponse,
    UploadPhotoResponse,
    CheckResetTokenResponse,
}
