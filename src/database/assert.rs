use actix_web::web;
use anyhow::{bail, Context};
use diesel::{prelude::*, MysqlConnection};

use crate::{
    database::{block, get_db_conn},
    DbPool,
};

pub async fn assert_patient(pool: &web::Data<DbPool>, id: u64) -> anyhow::Result<()> {
    use crate::schema::patients;

    let conn = get_db_conn(pool)?;
    let res = block(move || {
        patients::table
            .filter(patients::id.eq(id))
            .count()
            .get_result::<i64>(&conn)
            .context("DB error")
    })
    .await?;

    if res == 0 {
        bail!("No such patient");
    }

    Ok(())
}

pub async fn assert_doctor(pool: &web::Data<DbPool>, id: u64) -> anyhow::Result<()> {
    use crate::schema::doctors;

    let conn = get_db_conn(pool)?;
    let res = block(move || {
        doctors::table
            .filter(doctors::id.eq(id))
            .count()
            .get_result::<i64>(&conn)
            .context("DB error")
    })
    .await?;

    if res == 0 {
        bail!("No such doctor");
    }

    Ok(())
}

pub async fn assert_appointment(pool: &web::Data<DbPool>, id: u64) -> anyhow::Result<()> {
    use crate::schema::appointments;

    let conn = get_db_conn(pool)?;
    let res = block(move || {
        appointments::table
            .filter(appointments::id.eq(id))
            .count()
            .get_result::<i64>(&conn)
            .context("DB error")
    })
    .await?;

    if res == 0 {
        bail!("No such appointment");
    }

    Ok(())
}

pub async fn assert_history(pool: &web::Data<DbPool>, id: u64) -> anyhow::Result<()> {
    use crate::schema::histories;

    let conn = get_db_conn(pool)?;
    let res = block(move || {
        histories::table
            .filter(histories::id.eq(id))
            .count()
            .get_result::<i64>(&conn)
            .context("DB error")
    })
    .await?;

    if res == 0 {
        bail!("No such clinical history");
    }

    Ok(())
}

pub async fn assert_invoice(pool: &web::Data<DbPool>, id: u64) -> anyhow::Result<()> {
    use crate::schema::invoices;

    let conn = get_db_conn(pool)?;
    let res = block(move || {
        invoices::table
            .filter(invoices::id.eq(id))
            .count()
            .get_result::<i64>(&conn)
            .context("DB error")
    })
    .await?;

    if res == 0 {
        bail!("No such invoice");
    }

    Ok(())
}

pub async fn assert_service(pool: &web::Data<DbPool>, id: u64) -> anyhow::Result<()> {
    use crate::schema::services;

    let conn = get_db_conn(pool)?;
    let res = block(move || {
        services::table
            .filter(services::id.eq(id))
            .count()
            .get_result::<i64>(&conn)
            .context("DB error")
    })
    .await?;

    if res == 0 {
        bail!("No such service");
    }

    Ok(())
}

pub async fn assert_university(pool: &web::Data<DbPool>, id: u64) -> anyhow::Result<()> {
    use crate::schema::universities;

    let conn = get_db_conn(pool)?;
    let res = block(move || {
        universities::table
            .filter(universities::id.eq(id))
            .count()
            .get_result::<i64>(&conn)
            .context("DB error")
    })
    .await?;

    if res == 0 {
        bail!("No such university");
    }

    Ok(())
}

/// The city must exist and belong to the given department.
pub async fn assert_location(
    pool: &web::Data<DbPool>,
    department_id: u64,
    city_id: u64,
) -> anyhow::Result<()> {
    let conn = get_db_conn(pool)?;
    block(move || check_location(&conn, department_id, city_id)).await
}

pub fn check_location(
    conn: &MysqlConnection,
    department_id: u64,
    city_id: u64,
) -> anyhow::Result<()> {
    use crate::schema::cities;

    let res = cities::table
        .filter(cities::id.eq(city_id))
        .filter(cities::department_id.eq(department_id))
        .count()
        .get_result::<i64>(conn)
        .context("DB error")?;

    if res == 0 {
        bail!("No such city in the selected department");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::testing;

    #[test]
    fn city_must_belong_to_department() {
        let conn = match testing::connect() {
            Some(conn) => conn,
            None => return,
        };
        conn.test_transaction::<_, anyhow::Error, _>(|| {
            let antioquia = testing::seed_department(&conn, "Antioquia");
            let valle = testing::seed_department(&conn, "Valle del Cauca");
            let medellin = testing::seed_city(&conn, antioquia, "Medellin");

            check_location(&conn, antioquia, medellin)?;
            let err = check_location(&conn, valle, medellin).unwrap_err();
            assert_eq!(err.to_string(), "No such city in the selected department");
            assert!(check_location(&conn, antioquia, medellin + 1000).is_err());
            Ok(())
        });
    }
}
