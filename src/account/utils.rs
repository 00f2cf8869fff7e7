use actix_web::web;
use anyhow::{bail, Context};
use chrono::{Duration, NaiveDateTime, Utc};
use diesel::{prelude::*, MysqlConnection};

use crate::{
    database::{block, get_db_conn},
    models::account_logins::AccountLoginData,
    DbPool,
};

/// Sessions last one working day.
pub const MAX_LOGIN_TIME_SECS: i64 = 8 * 3600;

pub fn check_login_age(login_time: NaiveDateTime, now: NaiveDateTime) -> anyhow::Result<()> {
    if now.signed_duration_since(login_time).num_seconds() > MAX_LOGIN_TIME_SECS {
        bail!("Session expired, please log in again");
    }
    Ok(())
}

pub async fn get_account_id_from_token(
    token: String,
    pool: &web::Data<DbPool>,
) -> anyhow::Result<u64> {
    if token.trim().is_empty() {
        bail!("Please log in to access this page");
    }

    let conn = get_db_conn(pool)?;
    block(move || session_account(&conn, &token, Utc::now().naive_utc())).await
}

/// Account behind a login token. An expired session is removed on sight.
pub fn session_account(
    conn: &MysqlConnection,
    token: &str,
    now: NaiveDateTime,
) -> anyhow::Result<u64> {
    use crate::schema::account_logins;

    let data = account_logins::table
        .filter(account_logins::token.eq(token))
        .order(account_logins::login_time.desc())
        .limit(1)
        .get_result::<AccountLoginData>(conn)
        .optional()
        .context("DB error")?;

    match data {
        Some(data) => {
            if let Err(err) = check_login_age(data.login_time, now) {
                diesel::delete(account_logins::table.filter(account_logins::token.eq(token)))
                    .execute(conn)
                    .context("DB error")?;
                return Err(err);
            }
            Ok(data.account_id)
        }
        None => bail!("Please log in to access this page"),
    }
}

/// Drops every session older than `MAX_LOGIN_TIME_SECS`.
pub fn purge_expired_sessions(
    conn: &MysqlConnection,
    now: NaiveDateTime,
) -> anyhow::Result<usize> {
    use crate::schema::account_logins;

    let oldest = now - Duration::seconds(MAX_LOGIN_TIME_SECS);
    let expired = account_logins::table.filter(account_logins::login_time.lt(oldest));
    let removed = diesel::delete(expired).execute(conn).context("DB error")?;
    if removed > 0 {
        log::debug!("removed {} expired session(s)", removed);
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::testing;
    use diesel::r2d2::ConnectionManager;

    #[test]
    fn fresh_session_is_valid() {
        let now = Utc::now().naive_utc();
        assert!(check_login_age(now - Duration::hours(7), now).is_ok());
        assert!(check_login_age(now - Duration::seconds(MAX_LOGIN_TIME_SECS), now).is_ok());
    }

    #[test]
    fn old_session_expires() {
        let now = Utc::now().naive_utc();
        assert!(check_login_age(now - Duration::hours(9), now).is_err());
    }

    #[test]
    fn blank_token_is_refused_before_touching_the_pool() {
        let manager = ConnectionManager::<MysqlConnection>::new("mysql://nobody@127.0.0.1:1/none");
        let pool = web::Data::new(r2d2::Pool::builder().build_unchecked(manager));
        for token in &["", "   "] {
            let lookup = get_account_id_from_token(token.to_string(), &pool);
            let err = futures::executor::block_on(lookup).unwrap_err();
            assert_eq!(err.to_string(), "Please log in to access this page");
        }
    }

    fn seed_session(conn: &MysqlConnection, account_id: u64, login_time: NaiveDateTime) -> String {
        use crate::schema::account_logins;

        let token = crate::utils::generate_login_token(account_id);
        diesel::insert_into(account_logins::table)
            .values(AccountLoginData {
                token: token.clone(),
                account_id,
                login_time,
            })
            .execute(conn)
            .expect("insert session");
        token
    }

    fn session_count(conn: &MysqlConnection, token: &str) -> i64 {
        use crate::schema::account_logins;

        account_logins::table
            .filter(account_logins::token.eq(token))
            .count()
            .get_result(conn)
            .expect("count sessions")
    }

    #[test]
    fn unknown_and_expired_tokens_are_refused() {
        let conn = match testing::connect() {
            Some(conn) => conn,
            None => return,
        };
        conn.test_transaction::<_, anyhow::Error, _>(|| {
            let now = Utc::now().naive_utc();
            let (account_id, _) = testing::seed_account(&conn, "secret1");
            let fresh = seed_session(&conn, account_id, now - Duration::hours(1));
            let stale = seed_session(&conn, account_id, now - Duration::hours(9));

            assert_eq!(session_account(&conn, &fresh, now)?, account_id);
            assert_eq!(
                session_account(&conn, "no-such-token", now).unwrap_err().to_string(),
                "Please log in to access this page"
            );
            assert_eq!(
                session_account(&conn, &stale, now).unwrap_err().to_string(),
                "Session expired, please log in again"
            );
            assert_eq!(session_count(&conn, &stale), 0);
            assert_eq!(session_count(&conn, &fresh), 1);
            Ok(())
        });
    }

    #[test]
    fn purge_keeps_live_sessions() {
        let conn = match testing::connect() {
            Some(conn) => conn,
            None => return,
        };
        conn.test_transaction::<_, anyhow::Error, _>(|| {
            let now = Utc::now().naive_utc();
            let (account_id, _) = testing::seed_account(&conn, "secret1");
            let fresh = seed_session(&conn, account_id, now - Duration::hours(2));
            let stale = seed_session(&conn, account_id, now - Duration::days(3));

            assert!(purge_expired_sessions(&conn, now)? >= 1);
            assert_eq!(session_count(&conn, &stale), 0);
            assert_eq!(session_count(&conn, &fresh), 1);
            Ok(())
        });
    }
}
