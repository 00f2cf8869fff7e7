#[macro_use]
extern crate diesel;

mod account;
mod appointment;
mod catalog;
mod cie10;
mod config;
mod dashboard;
mod database;
mod doctor;
mod history;
mod invoice;
mod models;
mod patient;
mod protocol;
mod report;
mod schema;
mod setting;
mod upload;
mod utils;

use actix_web::{middleware, web, App, HttpServer};
use diesel::{r2d2::ConnectionManager, MysqlConnection};
use std::io;

type DbPool = r2d2::Pool<ConnectionManager<MysqlConnection>>;

fn startup_error<E: std::fmt::Display>(err: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = config::AppConfig::from_env().map_err(startup_error)?;

    let manager = ConnectionManager::<MysqlConnection>::new(config.database_url.clone());
    let pool = r2d2::Pool::builder()
        .build(manager)
        .map_err(startup_error)?;

    let bind = config.bind_addr.clone();
    if config.mail.is_none() {
        log::warn!("SMTP is not configured, password reset links will only be logged");
    }
    log::info!("listening on {}", bind);

    HttpServer::new(move || {
        App::new()
            .data(pool.clone())
            .data(config.clone())
            .wrap(middleware::Logger::default())
            // accounts and sessions
            .service(web::scope("/account").configure(account::config))
            // reference tables
            .service(web::scope("/catalog").configure(catalog::config))
            .service(web::scope("/patient").configure(patient::config))
            .service(web::scope("/doctor").configure(doctor::config))
            .service(web::scope("/appointment").configure(appointment::config))
            .service(web::scope("/history").configure(history::config))
            .service(web::scope("/invoice").configure(invoice::config))
            .service(web::scope("/cie10").configure(cie10::config))
            .service(web::scope("/setting").configure(setting::config))
            .service(web::scope("/dashboard").configure(dashboard::config))
            .service(actix_files::Files::new("/static", config.static_dir.clone()))
    })
    .bind(bind)?
    .run()
    .await
}
