pub mod assert;
#[cfg(test)]
pub mod testing;

use crate::DbPool;
use actix_web::{error::BlockingError, web};
use anyhow::{anyhow, Context};
use diesel::{r2d2::ConnectionManager, MysqlConnection};
use r2d2::PooledConnection;

pub type DbConn = PooledConnection<ConnectionManager<MysqlConnection>>;

no_arg_sql_function!(
    last_insert_id,
    diesel::sql_types::Unsigned<diesel::sql_types::Bigint>
);

pub fn get_db_conn(pool: &web::Data<DbPool>) -> anyhow::Result<DbConn> {
    pool.get().context("DB connection")
}

/// Runs `f` on the blocking pool, keeping the error raised inside it intact.
pub async fn block<F, T>(f: F) -> anyhow::Result<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    web::block(f).await.map_err(|err| match err {
        BlockingError::Error(err) => err,
        BlockingError::Canceled => anyhow!("DB task canceled"),
    })
}
