//! Per-account clinic configuration. The company name saved here heads
//! every PDF report.

mod requests;
mod responses;

use crate::{
    account::utils::get_account_id_from_token,
    config::AppConfig,
    database::{block, get_db_conn},
    models::clinic_settings::{ClinicSetting, NewClinicSetting, UpdateClinicSetting},
    upload::{self, MultipartForm, UploadedFile},
    DbPool,
};
use actix_multipart::Multipart;
use actix_web::{post, web, HttpResponse, Responder};
use anyhow::{self, bail, Context};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

use self::{requests::*, responses::*};

pub const DEFAULT_COMPANY_NAME: &str = "MediSoft";

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(view_setting).service(save_setting);
}

crate::post_funcs! {
    (view_setting, "/view_setting", ViewSettingRequest, ViewSettingResponse),
}

crate::multipart_funcs! {
    (save_setting, "/save_setting", ViewSettingResponse),
}

fn setting_item(s: ClinicSetting) -> SettingItem {
    SettingItem {
        company_name: s.company_name,
        company_nit: s.company_nit,
        health_registry: s.health_registry,
        slogan: s.slogan.unwrap_or_default(),
        logo: s.logo.unwrap_or_default(),
        favicon: s.favicon.unwrap_or_default(),
        updated_at: crate::utils::format_time_str(&s.updated_at),
    }
}

fn load_setting(conn: &MysqlConnection, account_id: u64) -> anyhow::Result<Option<ClinicSetting>> {
    use crate::schema::clinic_settings;

    clinic_settings::table
        .filter(clinic_settings::account_id.eq(account_id))
        .get_result::<ClinicSetting>(conn)
        .optional()
        .context("DB error")
}

fn display_company_name(name: Option<String>) -> String {
    crate::utils::non_blank(name).unwrap_or_else(|| DEFAULT_COMPANY_NAME.to_string())
}

/// Company name for report headers.
pub async fn company_name(pool: &web::Data<DbPool>, account_id: u64) -> anyhow::Result<String> {
    let conn = get_db_conn(pool)?;
    let setting = block(move || load_setting(&conn, account_id)).await?;
    Ok(display_company_name(setting.map(|s| s.company_name)))
}

/// `<prefix>_<YYYYmmdd_HHMMSS>_<name>`, refusing extensions outside `allowed`.
fn upload_name(
    prefix: &str,
    at: NaiveDateTime,
    filename: &str,
    allowed: &[&str],
) -> anyhow::Result<String> {
    let name = upload::secure_filename(filename);
    if name.is_empty() {
        bail!("Invalid file name");
    }
    upload::checked_extension(&name, allowed)?;
    Ok(format!("{}_{}_{}", prefix, at.format("%Y%m%d_%H%M%S"), name))
}

/// Validated name and contents of an uploaded image, not yet written.
fn prepare_image(
    prefix: &str,
    file: Option<UploadedFile>,
    allowed: &[&str],
    at: NaiveDateTime,
) -> anyhow::Result<Option<(String, Vec<u8>)>> {
    match file {
        Some(file) => Ok(Some((upload_name(prefix, at, &file.filename, allowed)?, file.bytes))),
        None => Ok(None),
    }
}

async fn store_image(
    config: &AppConfig,
    image: Option<(String, Vec<u8>)>,
) -> anyhow::Result<Option<String>> {
    match image {
        Some((name, bytes)) => {
            let path = upload::save_upload(&config.static_dir, name, bytes).await?;
            Ok(Some(path))
        }
        None => Ok(None),
    }
}

async fn view_setting_impl(
    pool: web::Data<DbPool>,
    info: web::Json<ViewSettingRequest>,
) -> anyhow::Result<ViewSettingResponse> {
    let info = info.into_inner();
    let account_id = get_account_id_from_token(info.login_token, &pool).await?;

    let conn = get_db_conn(&pool)?;
    let setting = block(move || load_setting(&conn, account_id)).await?;

    Ok(ViewSettingResponse {
        success: true,
        err: "".to_string(),
        setting: setting.map(setting_item),
    })
}

async fn save_setting_impl(
    pool: web::Data<DbPool>,
    config: web::Data<AppConfig>,
    payload: Multipart,
) -> anyhow::Result<ViewSettingResponse> {
    use crate::schema::clinic_settings;

    let mut form = MultipartForm::read(payload).await?;
    let token = form.field("login_token").unwrap_or_default();
    let account_id = get_account_id_from_token(token, &pool).await?;

    let now = crate::utils::local_now();
    let logo = prepare_image("logo", form.take_file("logo"), &upload::IMAGE_EXTENSIONS, now)?;
    let favicon = prepare_image(
        "favicon",
        form.take_file("favicon"),
        &upload::FAVICON_EXTENSIONS,
        now,
    )?;
    let conn = get_db_conn(&pool)?;
    let logo = store_image(&config, logo).await?;
    let favicon = match store_image(&config, favicon).await {
        Ok(favicon) => favicon,
        Err(err) => {
            if let Some(path) = &logo {
                upload::remove_upload(&config.static_dir, path).await;
            }
            return Err(err);
        }
    };
    let stored: Vec<String> = logo.iter().chain(favicon.iter()).cloned().collect();
    let changes = UpdateClinicSetting {
        company_name: form.field("company_name"),
        company_nit: form.field("company_nit"),
        health_registry: form.field("health_registry"),
        slogan: form.field("slogan"),
        logo,
        favicon,
        updated_at: Some(Utc::now().naive_utc()),
    };

    let saved = block(move || {
        conn.transaction(|| {
            if load_setting(&conn, account_id)?.is_some() {
                diesel::update(
                    clinic_settings::table.filter(clinic_settings::account_id.eq(account_id)),
                )
                .set(changes)
                .execute(&conn)
                .context("DB error")?;
            } else {
                diesel::insert_into(clinic_settings::table)
                    .values(new_setting(account_id, changes))
                    .execute(&conn)
                    .context("DB error")?;
            }
            load_setting(&conn, account_id)
        })
    })
    .await;
    let saved = match saved {
        Ok(saved) => saved,
        Err(err) => {
            for path in stored {
                upload::remove_upload(&config.static_dir, &path).await;
            }
            return Err(err);
        }
    };

    log::info!("account {} saved the clinic settings", account_id);

    Ok(ViewSettingResponse {
        success: true,
        err: "".to_string(),
        setting: saved.map(setting_item),
    })
}

fn new_setting(account_id: u64, changes: UpdateClinicSetting) -> NewClinicSetting {
    NewClinicSetting {
        account_id,
        company_name: changes.company_name.unwrap_or_default(),
        company_nit: changes.company_nit.unwrap_or_default(),
        health_registry: changes.health_registry.unwrap_or_default(),
        slogan: changes.slogan,
        logo: changes.logo,
        favicon: changes.favicon,
        updated_at: changes
            .updated_at
            .unwrap_or_else(|| Utc::now().naive_utc()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_company_name_falls_back() {
        assert_eq!(display_company_name(None), DEFAULT_COMPANY_NAME);
        assert_eq!(display_company_name(Some(" ".to_string())), DEFAULT_COMPANY_NAME);
        assert_eq!(
            display_company_name(Some("Clinica Norte".to_string())),
            "Clinica Norte"
        );
    }

    #[test]
    fn upload_names_carry_prefix_and_timestamp() {
        let at = chrono::NaiveDate::from_ymd(2025, 2, 3).and_hms(14, 5, 9);
        assert_eq!(
            upload_name("logo", at, "Mi Logo.png", &upload::IMAGE_EXTENSIONS).unwrap(),
            "logo_20250203_140509_Mi_Logo.png"
        );
        assert_eq!(
            upload_name("favicon", at, "../../icon.ico", &upload::FAVICON_EXTENSIONS).unwrap(),
            "favicon_20250203_140509_icon.ico"
        );
        assert!(upload_name("logo", at, "///", &upload::IMAGE_EXTENSIONS).is_err());
    }

    #[test]
    fn only_images_are_accepted_as_logo_or_favicon() {
        let at = chrono::NaiveDate::from_ymd(2025, 2, 3).and_hms(14, 5, 9);
        let file = |name: &str| {
            Some(UploadedFile {
                filename: name.to_string(),
                bytes: b"<script>alert(1)</script>".to_vec(),
            })
        };
        assert!(prepare_image("logo", file("x.html"), &upload::IMAGE_EXTENSIONS, at).is_err());
        assert!(prepare_image("logo", file("x.svg"), &upload::IMAGE_EXTENSIONS, at).is_err());
        assert!(prepare_image("logo", file("x.ico"), &upload::IMAGE_EXTENSIONS, at).is_err());
        assert!(prepare_image("favicon", file("x.ico"), &upload::FAVICON_EXTENSIONS, at)
            .unwrap()
            .is_some());
        assert!(prepare_image("logo", None, &upload::IMAGE_EXTENSIONS, at)
            .unwrap()
            .is_none());
    }

    #[test]
    fn stored_paths_fit_the_column() {
        let at = chrono::NaiveDate::from_ymd(2025, 2, 3).and_hms(14, 5, 9);
        let long = format!("{}.png", "x".repeat(400));
        let name = upload_name("favicon", at, &long, &upload::FAVICON_EXTENSIONS).unwrap();
        let stored = format!("{}/{}", upload::UPLOAD_SUBDIR, name);
        assert!(stored.len() <= 255);
        assert!(stored.ends_with(".png"));
    }

    #[test]
    fn first_save_fills_missing_fields() {
        let at = chrono::NaiveDate::from_ymd(2025, 2, 3).and_hms(0, 0, 0);
        let setting = new_setting(
            9,
            UpdateClinicSetting {
                company_name: Some("Clinica Norte".to_string()),
                updated_at: Some(at),
                ..Default::default()
            },
        );
        assert_eq!(setting.account_id, 9);
        assert_eq!(setting.company_name, "Clinica Norte");
        assert_eq!(setting.company_nit, "");
        assert_eq!(setting.logo, None);
        assert_eq!(setting.updated_at, at);
    }
}
