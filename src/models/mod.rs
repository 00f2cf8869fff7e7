pub mod appointments;
pub mod cie10;
pub mod cities;
pub mod clinic_settings;
pub mod departments;
pub mod doctors;
pub mod histories;
pub mod invoices;
pub mod patients;
pub mod references;
pub mod services;
pub mod universities;

pub mod account_logins;
pub mod accounts;
