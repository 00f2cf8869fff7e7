#[macro_export]
macro_rules! post_funcs {
    ( $( ( $func_name:ident, $url:expr, $request:ty, $response:ty ) ),+ $(,)? ) => {
        $(
            paste::paste! {
                #[post($url)]
                async fn $func_name(
                    pool: web::Data<DbPool>,
                    info: web::Json<$request>
                ) -> impl Responder {
                    let response = match [<$func_name _impl>](pool, info).await {
                        Ok(response) => response,
                        Err(err) => {
                            log::warn!("{} failed: {:#}", stringify!($func_name), err);
                            <$response>::err(err.to_string())
                        }
                    };
                    HttpResponse::Ok().json(response)
                }
            }
        )+
    };
}

/// `post_funcs!` for operations that also need the `AppConfig`.
#[macro_export]
macro_rules! config_post_funcs {
    ( $( ( $func_name:ident, $url:expr, $request:ty, $response:ty ) ),+ $(,)? ) => {
        $(
            paste::paste! {
                #[post($url)]
                async fn $func_name(
                    pool: web::Data<DbPool>,
                    config: web::Data<crate::config::AppConfig>,
                    info: web::Json<$request>
                ) -> impl Responder {
                    let response = match [<$func_name _impl>](pool, config, info).await {
                        Ok(response) => response,
                        Err(err) => {
                            log::warn!("{} failed: {:#}", stringify!($func_name), err);
                            <$response>::err(err.to_string())
                        }
                    };
                    HttpResponse::Ok().json(response)
                }
            }
        )+
    };
}

/// `multipart/form-data` uploads; the login token travels as a form field.
#[macro_export]
macro_rules! multipart_funcs {
    ( $( ( $func_name:ident, $url:expr, $response:ty ) ),+ $(,)? ) => {
        $(
            paste::paste! {
                #[post($url)]
                async fn $func_name(
                    pool: web::Data<DbPool>,
                    config: web::Data<crate::config::AppConfig>,
                    payload: actix_multipart::Multipart
                ) -> impl Responder {
                    let response = match [<$func_name _impl>](pool, config, payload).await {
                        Ok(response) => response,
                        Err(err) => {
                            log::warn!("{} failed: {:#}", stringify!($func_name), err);
                            <$response>::err(err.to_string())
                        }
                    };
                    HttpResponse::Ok().json(response)
                }
            }
        )+
    };
}

/// Same shape as `post_funcs!`, for `GET` downloads: the `_impl` function
/// returns a `report::ExportFile` and failures come back as a JSON error.
#[macro_export]
macro_rules! export_funcs {
    ( $( ( $func_name:ident, $url:expr, $request:ty ) ),+ $(,)? ) => {
        $(
            paste::paste! {
                #[get($url)]
                async fn $func_name(
                    pool: web::Data<DbPool>,
                    info: web::Query<$request>
                ) -> impl Responder {
                    match [<$func_name _impl>](pool, info).await {
                        Ok(file) => file.into_response(),
                        Err(err) => {
                            log::warn!("{} failed: {:#}", stringify!($func_name), err);
                            HttpResponse::Ok().json(crate::protocol::SimpleResponse::err(err.to_string()))
                        }
                    }
                }
            }
        )+
    };
}

use anyhow::{bail, Context};
use blake2::{Blake2b, Digest};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

pub const DATE_FMT: &str = "%Y-%m-%d";
pub const TIME_OF_DAY_FMT: &str = "%H:%M";
pub const DATETIME_FMT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn hash_password<S: AsRef<str>>(password: S) -> String {
    format!("{:x}", Blake2b::digest(password.as_ref().as_bytes()))
}

pub fn generate_login_token(account_id: u64) -> String {
    let seed = format!(
        "{}:{}:{}",
        account_id,
        Utc::now().timestamp_millis(),
        uuid::Uuid::new_v4()
    );
    format!("{:x}", Blake2b::digest(seed.as_bytes()))
}

pub fn assert_email_str(email: &str) -> anyhow::Result<()> {
    if !email.contains('@') || !email.contains('.') {
        bail!("Please enter a valid email address")
    }
    Ok(())
}

pub fn assert_phone_str(phone: &str) -> anyhow::Result<()> {
    if phone.is_empty() || !phone.chars().all(|c| c.is_ascii_digit()) {
        bail!("Phone number must contain only digits")
    }
    Ok(())
}

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn assert_password_str(password: &str) -> anyhow::Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        bail!("Password must be at least {} characters", MIN_PASSWORD_LEN)
    }
    Ok(())
}

pub fn assert_sex_str(sex: &str) -> anyhow::Result<()> {
    if !crate::models::patients::SEXES.contains(&sex) {
        bail!("Sex must be one of M, F or O")
    }
    Ok(())
}

/// Blank form values count as absent.
pub fn non_blank(s: Option<String>) -> Option<String> {
    s.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub fn require_str(s: Option<String>, what: &str) -> anyhow::Result<String> {
    match non_blank(s) {
        Some(s) => Ok(s),
        None => bail!("{} is required", what),
    }
}

pub fn parse_date_str<S: AsRef<str>>(s: S) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s.as_ref().trim(), DATE_FMT).context("Invalid date format")
}

pub fn parse_time_of_day_str<S: AsRef<str>>(s: S) -> anyhow::Result<NaiveTime> {
    let s = s.as_ref().trim();
    NaiveTime::parse_from_str(s, TIME_OF_DAY_FMT)
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .context("Invalid time format")
}

/// Inclusive date bounds; no date means every date.
pub fn get_date_pair_opt<S: AsRef<str>>(date: Option<S>) -> anyhow::Result<(NaiveDate, NaiveDate)> {
    if let Some(date) = date {
        let date = date.as_ref().trim();
        if !date.is_empty() {
            let date = parse_date_str(date)?;
            return Ok((date, date));
        }
    }
    Ok((NaiveDate::from_ymd(1901, 1, 1), NaiveDate::from_ymd(2901, 1, 1)))
}

pub fn get_time_pair_from_date_opt<S: AsRef<str>>(
    date: Option<S>,
) -> anyhow::Result<(NaiveDateTime, NaiveDateTime)> {
    let (start, end) = get_date_pair_opt(date)?;
    Ok((start.and_hms(0, 0, 0), end.and_hms(23, 59, 59)))
}

/// Wall-clock time of `now` in its own zone. Records that are filtered by
/// calendar day store this instead of UTC.
pub fn local_timestamp<Tz: TimeZone>(now: DateTime<Tz>) -> NaiveDateTime {
    now.naive_local()
}

pub fn local_now() -> NaiveDateTime {
    local_timestamp(Local::now())
}

pub fn format_date_str(date: &NaiveDate) -> String {
    date.format(DATE_FMT).to_string()
}

pub fn format_time_of_day_str(time: &NaiveTime) -> String {
    time.format(TIME_OF_DAY_FMT).to_string()
}

pub fn format_time_str(time: &NaiveDateTime) -> String {
    time.format(DATETIME_FMT).to_string()
}

pub fn get_str_pattern<S: AsRef<str>>(s: S) -> String {
    format!("%{}%", s.as_ref().trim())
}

pub fn get_str_pattern_opt<S: AsRef<str>>(s: Option<S>) -> String {
    match s {
        Some(s) if !s.as_ref().trim().is_empty() => get_str_pattern(s),
        _ => "%".to_string(),
    }
}

/// Empty filter values select everything.
pub fn get_filter_opt(s: Option<String>) -> (String, bool) {
    match non_blank(s) {
        Some(s) => (s, false),
        None => ("".to_string(), true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn password_hash_is_stable_hex() {
        let a = hash_password("secret1");
        assert_eq!(a, hash_password("secret1"));
        assert_ne!(a, hash_password("secret2"));
        assert_eq!(a.len(), 128);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn login_tokens_differ_per_call() {
        assert_ne!(generate_login_token(1), generate_login_token(1));
    }

    #[test]
    fn email_validation() {
        assert!(assert_email_str("ana@clinic.co").is_ok());
        assert!(assert_email_str("ana.clinic.co").is_err());
        assert!(assert_email_str("ana@clinic").is_err());
    }

    #[test]
    fn phone_validation() {
        assert!(assert_phone_str("3001234567").is_ok());
        assert!(assert_phone_str("300-123").is_err());
        assert!(assert_phone_str("").is_err());
    }

    #[test]
    fn password_length() {
        assert!(assert_password_str("12345").is_err());
        assert!(assert_password_str("123456").is_ok());
    }

    #[test]
    fn sex_validation() {
        assert!(assert_sex_str("F").is_ok());
        assert!(assert_sex_str("X").is_err());
    }

    #[test]
    fn blank_values_are_absent() {
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(Some(" Ana ".to_string())), Some("Ana".to_string()));
        assert!(require_str(None, "Name").is_err());
    }

    #[test]
    fn patterns() {
        assert_eq!(get_str_pattern("ana"), "%ana%");
        assert_eq!(get_str_pattern_opt::<&str>(None), "%");
        assert_eq!(get_str_pattern_opt(Some("")), "%");
    }

    #[test]
    fn filter_opt_matches_all_when_blank() {
        assert_eq!(get_filter_opt(None), ("".to_string(), true));
        assert_eq!(
            get_filter_opt(Some("pendiente".to_string())),
            ("pendiente".to_string(), false)
        );
    }

    #[test]
    fn date_pairs() {
        let (start, end) = get_date_pair_opt(Some("2025-03-04")).unwrap();
        assert_eq!(start, end);
        assert_eq!(start, NaiveDate::from_ymd(2025, 3, 4));

        let (start, end) = get_time_pair_from_date_opt(Some("2025-03-04")).unwrap();
        assert_eq!(format_time_str(&start), "2025-03-04T00:00:00");
        assert_eq!(format_time_str(&end), "2025-03-04T23:59:59");

        let (start, end) = get_date_pair_opt::<&str>(None).unwrap();
        assert!(start < end);
        assert!(get_date_pair_opt(Some("04/03/2025")).is_err());
    }

    #[test]
    fn evening_in_utc_minus_five_stays_on_the_same_day() {
        let bogota = FixedOffset::west(5 * 3600);
        let evening = bogota.ymd(2025, 6, 10).and_hms(20, 0, 0);
        let stamp = local_timestamp(evening);
        assert_eq!(format_time_str(&stamp), "2025-06-10T20:00:00");

        let (start, end) = get_time_pair_from_date_opt(Some("2025-06-10")).unwrap();
        assert!(start <= stamp && stamp <= end);
        assert!(evening.naive_utc() > end);
    }

    #[test]
    fn time_of_day_parsing() {
        assert_eq!(
            parse_time_of_day_str("09:30").unwrap(),
            NaiveTime::from_hms(9, 30, 0)
        );
        assert_eq!(
            parse_time_of_day_str("09:30:15").unwrap(),
            NaiveTime::from_hms(9, 30, 15)
        );
        assert!(parse_time_of_day_str("9h30").is_err());
    }
}
