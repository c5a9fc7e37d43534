pub mod alerts;
pub mod app;
pub mod config;
pub mod discovery;
pub mod error;
pub mod models;
pub mod notify;
pub mod polling;
pub mod seeders;
pub mod services;
pub mod snmp;
pub mod timeseries;
