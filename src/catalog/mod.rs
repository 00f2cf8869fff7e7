//! Reference tables behind the form selects. Reads are open; only service
//! maintenance needs a session.

mod requests;
mod responses;

use crate::{
    account::utils::get_account_id_from_token,
    database::{assert, block, get_db_conn},
    models::{
        cities::City,
        departments::Department,
        references::{specialty_name, EPS_LIST, SPECIALTIES},
        services::{NewService, Service, UpdateService},
        universities::University,
    },
    protocol::SimpleResponse,
    utils::{non_blank, require_str},
    DbPool,
};
use actix_web::{post, web, HttpResponse, Responder};
use anyhow::{self, bail, Context};
use diesel::prelude::*;

use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(departments)
        .service(cities)
        .service(universities)
        .service(services)
        .service(add_service)
        .service(modify_service)
        .service(specialties)
        .service(eps);
}

crate::post_funcs! {
    (departments, "/departments", DepartmentsRequest, DepartmentsResponse),
    (cities, "/cities", CitiesRequest, CitiesResponse),
    (universities, "/universities", UniversitiesRequest, UniversitiesResponse),
    (services, "/services", ServicesRequest, ServicesResponse),
    (add_service, "/add_service", AddServiceRequest, SimpleResponse),
    (modify_service, "/modify_service", ModifyServiceRequest, SimpleResponse),
    (specialties, "/specialties", CodeListRequest, CodeListResponse),
    (eps, "/eps", CodeListRequest, CodeListResponse),
}

async fn departments_impl(
    pool: web::Data<DbPool>,
    _info: web::Json<DepartmentsRequest>,
) -> anyhow::Result<DepartmentsResponse> {
    use crate::schema::departments;

    let conn = get_db_conn(&pool)?;
    let departs = block(move || {
        departments::table
            .order(departments::name.asc())
            .get_results::<Department>(&conn)
            .context("DB error")
    })
    .await?;

    Ok(DepartmentsResponse {
        success: true,
        err: "".to_string(),
        departments: departs
            .into_iter()
            .map(|d| NamedItem { id: d.id, name: d.name })
            .collect(),
    })
}

async fn cities_impl(
    pool: web::Data<DbPool>,
    info: web::Json<CitiesRequest>,
) -> anyhow::Result<CitiesResponse> {
    use crate::schema::cities;

    let department_id = info.department_id;
    let conn = get_db_conn(&pool)?;
    let res = block(move || {
        cities::table
            .filter(cities::department_id.eq(department_id))
            .order(cities::name.asc())
            .get_results::<City>(&conn)
            .context("DB error")
    })
    .await?;

    Ok(CitiesResponse {
        success: true,
        err: "".to_string(),
        cities: res
            .into_iter()
            .map(|c| NamedItem { id: c.id, name: c.name })
            .collect(),
    })
}

async fn universities_impl(
    pool: web::Data<DbPool>,
    _info: web::Json<UniversitiesRequest>,
) -> anyhow::Result<UniversitiesResponse> {
    use crate::schema::universities;

    let conn = get_db_conn(&pool)?;
    let res = block(move || {
        universities::table
            .order(universities::name.asc())
            .get_results::<University>(&conn)
            .context("DB error")
    })
    .await?;

    let university_items = res
        .into_iter()
        .map(|u| UniversityItem {
            id: u.id,
            name: u.name,
            acronym: u.acronym.unwrap_or_default(),
            department: u.department.unwrap_or_default(),
            city: u.city.unwrap_or_default(),
            kind: u.kind.unwrap_or_default(),
            status: u.status,
        })
        .collect();

    Ok(UniversitiesResponse {
        success: true,
        err: "".to_string(),
        universities: university_items,
    })
}

async fn services_impl(
    pool: web::Data<DbPool>,
    info: web::Json<ServicesRequest>,
) -> anyhow::Result<ServicesResponse> {
    use crate::schema::services;

    let all = !info.active_only.unwrap_or(false);
    let conn = get_db_conn(&pool)?;
    let res = block(move || {
        services::table
            .filter(services::active.eq(true).or(all))
            .order(services::name.asc())
            .get_results::<Service>(&conn)
            .context("DB error")
    })
    .await?;

    let service_items = res
        .into_iter()
        .map(|s| {
            let specialty = s.specialty.unwrap_or_default();
            ServiceItem {
                id: s.id,
                name: s.name,
                specialty_name: specialty_name(&specialty).unwrap_or("").to_string(),
                specialty,
                price: s.price,
                active: s.active,
            }
        })
        .collect();

    Ok(ServicesResponse {
        success: true,
        err: "".to_string(),
        services: service_items,
    })
}

fn check_service_fields(specialty: &Option<String>, price: Option<f64>) -> anyhow::Result<()> {
    if let Some(specialty) = specialty {
        if specialty_name(specialty).is_none() {
            bail!("Unknown specialty");
        }
    }
    if let Some(price) = price {
        if !price.is_finite() || price < 0.0 {
            bail!("Price must be a non-negative number");
        }
    }
    Ok(())
}

async fn add_service_impl(
    pool: web::Data<DbPool>,
    info: web::Json<AddServiceRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::services;

    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;

    let name = require_str(info.name, "Service name")?;
    let specialty = non_blank(info.specialty);
    let price = match info.price {
        Some(price) => price,
        None => bail!("Price is required"),
    };
    check_service_fields(&specialty, Some(price))?;

    let data = NewService {
        name,
        specialty,
        price,
        active: info.active.unwrap_or(true),
    };
    let conn = get_db_conn(&pool)?;
    block(move || {
        diesel::insert_into(services::table)
            .values(data)
            .execute(&conn)
            .context("DB error")
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn modify_service_impl(
    pool: web::Data<DbPool>,
    info: web::Json<ModifyServiceRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::services;

    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;
    assert::assert_service(&pool, info.id).await?;

    let data = UpdateService {
        name: non_blank(info.name),
        specialty: non_blank(info.specialty),
        price: info.price,
        active: info.active,
    };
    check_service_fields(&data.specialty, data.price)?;
    if data == UpdateService::default() {
        return Ok(SimpleResponse::ok());
    }

    let id = info.id;
    let conn = get_db_conn(&pool)?;
    block(move || {
        diesel::update(services::table.filter(services::id.eq(id)))
            .set(data)
            .execute(&conn)
            .context("DB error")
    })
    .await?;

    Ok(SimpleResponse::ok())
}

fn code_items(list: &[(&str, &str)]) -> Vec<CodeItem> {
    list.iter()
        .map(|(code, name)| CodeItem {
            code: code.to_string(),
            name: name.to_string(),
        })
        .collect()
}

async fn specialties_impl(
    _pool: web::Data<DbPool>,
    _info: web::Json<CodeListRequest>,
) -> anyhow::Result<CodeListResponse> {
    Ok(CodeListResponse {
        success: true,
        err: "".to_string(),
        items: code_items(&SPECIALTIES),
    })
}

async fn eps_impl(
    _pool: web::Data<DbPool>,
    _info: web::Json<CodeListRequest>,
) -> anyhow::Result<CodeListResponse> {
    Ok(CodeListResponse {
        success: true,
        err: "".to_string(),
        items: code_items(&EPS_LIST),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_fields_are_checked() {
        assert!(check_service_fields(&Some("pediatria".to_string()), Some(50_000.0)).is_ok());
        assert!(check_service_fields(&None, None).is_ok());
        assert!(check_service_fields(&Some("astrologia".to_string()), None).is_err());
        assert!(check_service_fields(&None, Some(-1.0)).is_err());
        assert!(check_service_fields(&None, Some(f64::NAN)).is_err());
    }

    #[test]
    fn code_items_keep_order() {
        let items = code_items(&SPECIALTIES);
        assert_eq!(items.len(), SPECIALTIES.len());
        assert_eq!(items[0].code, "medicina_general");
    }
}
