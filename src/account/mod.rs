mod mail;
mod requests;
mod reset;
mod responses;
pub mod utils;

use crate::{
    config::AppConfig,
    database::{block, get_db_conn},
    models::{
        account_logins::AccountLoginData,
        accounts::{Account, NewAccount, UpdateAccount},
    },
    protocol::SimpleResponse,
    upload::{self, MultipartForm},
    utils::{hash_password, non_blank, require_str},
    DbPool,
};
use actix_multipart::Multipart;
use actix_web::{post, web, HttpResponse, Responder};
use anyhow::{self, bail, Context};
use chrono::{NaiveDateTime, Utc};
use diesel::{prelude::*, MysqlConnection};

use self::{requests::*, responses::*, utils::get_account_id_from_token};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(logout)
        .service(view_profile)
        .service(modify_profile)
        .service(modify_password)
        .service(upload_photo)
        .service(forgot_password)
        .service(check_reset_token)
        .service(reset_password);
}

crate::post_funcs! {
    (register, "/register", RegisterRequest, SimpleResponse),
    (login, "/login", LoginRequest, LoginResponse),
    (logout, "/logout", LogoutRequest, SimpleResponse),
    (view_profile, "/view_profile", ViewProfileRequest, ViewProfileResponse),
    (modify_profile, "/modify_profile", ModifyProfileRequest, SimpleResponse),
    (modify_password, "/modify_password", ModifyPasswordRequest, SimpleResponse),
}

crate::config_post_funcs! {
    (forgot_password, "/forgot_password", ForgotPasswordRequest, SimpleResponse),
    (check_reset_token, "/check_reset_token", CheckResetTokenRequest, CheckResetTokenResponse),
    (reset_password, "/reset_password", ResetPasswordRequest, SimpleResponse),
}

crate::multipart_funcs! {
    (upload_photo, "/upload_photo", UploadPhotoResponse),
}

async fn register_impl(
    pool: web::Data<DbPool>,
    info: web::Json<RegisterRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::accounts;

    let info = info.into_inner();
    let first_name = require_str(info.first_name, "First name")?;
    let email = require_str(info.email, "Email")?;
    let password = require_str(info.password, "Password")?;
    crate::utils::assert_password_str(&password)?;
    crate::utils::assert_email_str(&email)?;
    let phone = non_blank(info.phone);
    if let Some(phone) = &phone {
        crate::utils::assert_phone_str(phone)?;
    }
    let (last_name, city) = (non_blank(info.last_name), non_blank(info.city));

    let conn = get_db_conn(&pool)?;
    block(move || {
        conn.transaction(|| {
            let res = accounts::table
                .filter(accounts::email.eq(&email))
                .count()
                .get_result::<i64>(&conn)
                .context("DB error")?;
            if res > 0 {
                bail!("This email address is already registered");
            }

            let data = NewAccount {
                first_name,
                last_name,
                email: email.clone(),
                password: hash_password(&password),
                phone,
                city,
                registered_at: Utc::now().naive_utc(),
            };
            diesel::insert_into(accounts::table)
                .values(data)
                .execute(&conn)
                .context("DB error")?;

            log::info!("registered account {}", email);
            Ok(())
        })
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn login_impl(
    pool: web::Data<DbPool>,
    info: web::Json<LoginRequest>,
) -> anyhow::Result<LoginResponse> {
    let info = info.into_inner();
    let email = require_str(Some(info.email), "Email")?;
    let password = require_str(Some(info.password), "Password")?;

    let conn = get_db_conn(&pool)?;
    let (login_token, name) =
        block(move || open_session(&conn, &email, &password, Utc::now().naive_utc())).await?;

    Ok(LoginResponse {
        success: true,
        err: "".to_string(),
        login_token,
        name,
    })
}

/// Checks the credentials and stores a new session token. Expired sessions
/// of every account are dropped on the way.
fn open_session(
    conn: &MysqlConnection,
    email: &str,
    password: &str,
    now: NaiveDateTime,
) -> anyhow::Result<(String, String)> {
    use crate::schema::{account_logins, accounts};

    conn.transaction(|| {
        utils::purge_expired_sessions(conn, now)?;

        let account = accounts::table
            .filter(accounts::email.eq(email))
            .get_result::<Account>(conn)
            .optional()
            .context("DB error")?;
        let account = match account {
            Some(account) => account,
            None => bail!("This email address is not registered"),
        };
        if account.password != hash_password(password) {
            bail!("Incorrect password");
        }

        let login_token = crate::utils::generate_login_token(account.id);
        let token_data = AccountLoginData {
            token: login_token.clone(),
            account_id: account.id,
            login_time: now,
        };
        diesel::insert_into(account_logins::table)
            .values(token_data)
            .execute(conn)
            .context("DB error")?;

        log::info!("account {} logged in", account.id);
        Ok((login_token, account.first_name))
    })
}

async fn logout_impl(
    pool: web::Data<DbPool>,
    info: web::Json<LogoutRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::account_logins;

    let info = info.into_inner();
    let conn = get_db_conn(&pool)?;
    block(move || {
        diesel::delete(account_logins::table.filter(account_logins::token.eq(info.login_token)))
            .execute(&conn)
            .context("DB error")
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn view_profile_impl(
    pool: web::Data<DbPool>,
    info: web::Json<ViewProfileRequest>,
) -> anyhow::Result<ViewProfileResponse> {
    use crate::schema::accounts;

    let info = info.into_inner();
    let account_id = get_account_id_from_token(info.login_token, &pool).await?;

    let conn = get_db_conn(&pool)?;
    let account = block(move || {
        accounts::table
            .filter(accounts::id.eq(account_id))
            .get_result::<Account>(&conn)
            .optional()
            .context("DB error")
    })
    .await?;
    let account = match account {
        Some(account) => account,
        None => bail!("Account not found"),
    };

    Ok(ViewProfileResponse {
        success: true,
        err: "".to_string(),
        id: account.id,
        first_name: account.first_name,
        last_name: account.last_name.unwrap_or_default(),
        email: account.email,
        phone: account.phone.unwrap_or_default(),
        address: account.address.unwrap_or_default(),
        city: account.city.unwrap_or_default(),
        document_type: account.document_type.unwrap_or_default(),
        document_number: account.document_number.unwrap_or_default(),
        registered_at: crate::utils::format_time_str(&account.registered_at),
        photo: account.photo.unwrap_or_default(),
    })
}

async fn modify_profile_impl(
    pool: web::Data<DbPool>,
    info: web::Json<ModifyProfileRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::accounts;

    let info = info.into_inner();
    let account_id = get_account_id_from_token(info.login_token.clone(), &pool).await?;

    let phone = non_blank(info.phone);
    if let Some(phone) = &phone {
        crate::utils::assert_phone_str(phone)?;
    }
    let data = UpdateAccount {
        first_name: non_blank(info.first_name),
        last_name: non_blank(info.last_name),
        phone,
        address: non_blank(info.address),
        city: non_blank(info.city),
        document_type: non_blank(info.document_type),
        document_number: non_blank(info.document_number),
    };
    if data == UpdateAccount::default() {
        return Ok(SimpleResponse::ok());
    }

    let conn = get_db_conn(&pool)?;
    block(move || {
        diesel::update(accounts::table.filter(accounts::id.eq(account_id)))
            .set(data)
            .execute(&conn)
            .context("DB error")
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn modify_password_impl(
    pool: web::Data<DbPool>,
    info: web::Json<ModifyPasswordRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::accounts;

    let info = info.into_inner();
    let account_id = get_account_id_from_token(info.login_token.clone(), &pool).await?;

    let password_old = require_str(info.password_old, "Current password")?;
    let password_new = require_str(info.password_new, "New password")?;
    let password_confirm = require_str(info.password_confirm, "Password confirmation")?;

    let conn = get_db_conn(&pool)?;
    block(move || {
        conn.transaction(|| {
            let res = accounts::table
                .filter(accounts::id.eq(account_id))
                .filter(accounts::password.eq(hash_password(&password_old)))
                .count()
                .get_result::<i64>(&conn)
                .context("DB error")?;
            if res != 1 {
                bail!("The current password is incorrect");
            }
            if password_new != password_confirm {
                bail!("Passwords do not match");
            }
            crate::utils::assert_password_str(&password_new)?;

            diesel::update(accounts::table.filter(accounts::id.eq(account_id)))
                .set(accounts::password.eq(hash_password(&password_new)))
                .execute(&conn)
                .context("DB error")?;

            Ok(())
        })
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn upload_photo_impl(
    pool: web::Data<DbPool>,
    config: web::Data<AppConfig>,
    payload: Multipart,
) -> anyhow::Result<UploadPhotoResponse> {
    use crate::schema::accounts;

    let mut form = MultipartForm::read(payload).await?;
    let token = form.field("login_token").unwrap_or_default();
    let account_id = get_account_id_from_token(token, &pool).await?;

    let file = match form.take_file("photo") {
        Some(file) => file,
        None => bail!("No image was selected"),
    };
    let ext = upload::image_extension(&upload::secure_filename(&file.filename))?;
    let name = format!(
        "account_{}_{}{}",
        account_id,
        uuid::Uuid::new_v4().simple(),
        ext
    );
    let photo = upload::save_upload(&config.static_dir, name, file.bytes).await?;

    let conn = get_db_conn(&pool)?;
    let stored = photo.clone();
    block(move || {
        diesel::update(accounts::table.filter(accounts::id.eq(account_id)))
            .set(accounts::photo.eq(Some(stored)))
            .execute(&conn)
            .context("DB error")
    })
    .await?;

    Ok(UploadPhotoResponse {
        success: true,
        err: "".to_string(),
        photo,
    })
}

async fn forgot_password_impl(
    pool: web::Data<DbPool>,
    config: web::Data<AppConfig>,
    info: web::Json<ForgotPasswordRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::accounts;

    let email = require_str(Some(info.into_inner().email), "Email")?;

    let conn = get_db_conn(&pool)?;
    let lookup = email.clone();
    let res = block(move || {
        accounts::table
            .filter(accounts::email.eq(lookup))
            .count()
            .get_result::<i64>(&conn)
            .context("DB error")
    })
    .await?;
    if res == 0 {
        bail!("This email address is not registered");
    }

    let token = reset::issue_token(&config.secret_key, &email, Utc::now().timestamp())?;
    let link = format!("{}/reset_password?token={}", config.public_url, token);

    match config.mail.clone() {
        Some(mail_config) => {
            let to = email.clone();
            block(move || mail::send_reset_mail(&mail_config, &to, &link)).await?;
            log::info!("password reset mail sent to {}", email);
        }
        None => {
            log::warn!("SMTP not configured, password reset link for {}: {}", email, link);
        }
    }

    Ok(SimpleResponse::ok())
}

async fn check_reset_token_impl(
    _pool: web::Data<DbPool>,
    config: web::Data<AppConfig>,
    info: web::Json<CheckResetTokenRequest>,
) -> anyhow::Result<CheckResetTokenResponse> {
    let email = reset::verify_token(&config.secret_key, &info.token, Utc::now().timestamp())?;

    Ok(CheckResetTokenResponse {
        success: true,
        err: "".to_string(),
        email,
    })
}

async fn reset_password_impl(
    pool: web::Data<DbPool>,
    config: web::Data<AppConfig>,
    info: web::Json<ResetPasswordRequest>,
) -> anyhow::Result<SimpleResponse> {
    let info = info.into_inner();
    let email = reset::verify_token(&config.secret_key, &info.token, Utc::now().timestamp())?;
    let password = require_str(info.password, "Password")?;
    crate::utils::assert_password_str(&password)?;
    if Some(&password) != non_blank(info.password2).as_ref() {
        bail!("Passwords do not match");
    }

    let conn = get_db_conn(&pool)?;
    block(move || replace_password(&conn, &email, &password)).await?;

    Ok(SimpleResponse::ok())
}

/// Sets a new password and signs the account out everywhere.
fn replace_password(conn: &MysqlConnection, email: &str, password: &str) -> anyhow::Result<u64> {
    use crate::schema::{account_logins, accounts};

    conn.transaction(|| {
        let account_id = accounts::table
            .filter(accounts::email.eq(email))
            .select(accounts::id)
            .get_result::<u64>(conn)
            .optional()
            .context("DB error")?;
        let account_id = match account_id {
            Some(id) => id,
            None => bail!("This email address is not registered"),
        };

        diesel::update(accounts::table.filter(accounts::id.eq(account_id)))
            .set(accounts::password.eq(hash_password(password)))
            .execute(conn)
            .context("DB error")?;
        diesel::delete(account_logins::table.filter(account_logins::account_id.eq(account_id)))
            .execute(conn)
            .context("DB error")?;

        log::info!("password reset for account {}", account_id);
        Ok(account_id)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::testing;
    use chrono::Duration;

    fn sessions_of(conn: &MysqlConnection, account_id: u64) -> i64 {
        use crate::schema::account_logins;

        account_logins::table
            .filter(account_logins::account_id.eq(account_id))
            .count()
            .get_result(conn)
            .expect("count sessions")
    }

    #[test]
    fn login_tells_unknown_email_from_wrong_password() {
        let conn = match testing::connect() {
            Some(conn) => conn,
            None => return,
        };
        conn.test_transaction::<_, anyhow::Error, _>(|| {
            let now = Utc::now().naive_utc();
            let (account_id, email) = testing::seed_account(&conn, "secret1");

            let err = open_session(&conn, "nobody@example.com", "secret1", now).unwrap_err();
            assert_eq!(err.to_string(), "This email address is not registered");
            let err = open_session(&conn, &email, "secret2", now).unwrap_err();
            assert_eq!(err.to_string(), "Incorrect password");
            assert_eq!(sessions_of(&conn, account_id), 0);

            let (token, name) = open_session(&conn, &email, "secret1", now)?;
            assert_eq!(name, "Marta");
            assert_eq!(utils::session_account(&conn, &token, now)?, account_id);
            Ok(())
        });
    }

    #[test]
    fn login_drops_expired_sessions() {
        let conn = match testing::connect() {
            Some(conn) => conn,
            None => return,
        };
        conn.test_transaction::<_, anyhow::Error, _>(|| {
            let (account_id, email) = testing::seed_account(&conn, "secret1");
            let yesterday = Utc::now().naive_utc() - Duration::days(1);
            open_session(&conn, &email, "secret1", yesterday)?;
            assert_eq!(sessions_of(&conn, account_id), 1);

            open_session(&conn, &email, "secret1", Utc::now().naive_utc())?;
            assert_eq!(sessions_of(&conn, account_id), 1);
            Ok(())
        });
    }

    #[test]
    fn password_reset_signs_the_account_out() {
        let conn = match testing::connect() {
            Some(conn) => conn,
            None => return,
        };
        conn.test_transaction::<_, anyhow::Error, _>(|| {
            let now = Utc::now().naive_utc();
            let (account_id, email) = testing::seed_account(&conn, "secret1");
            let (token, _) = open_session(&conn, &email, "secret1", now)?;
            open_session(&conn, &email, "secret1", now)?;
            assert_eq!(sessions_of(&conn, account_id), 2);

            assert_eq!(replace_password(&conn, &email, "secret9")?, account_id);
            assert_eq!(sessions_of(&conn, account_id), 0);
            assert!(utils::session_account(&conn, &token, now).is_err());

            let err = open_session(&conn, &email, "secret1", now).unwrap_err();
            assert_eq!(err.to_string(), "Incorrect password");
            open_session(&conn, &email, "secret9", now)?;

            assert!(replace_password(&conn, "nobody@example.com", "secret9").is_err());
            Ok(())
        });
    }
}
