pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_devices;
mod m20240601_000002_create_ports;
mod m20240601_000003_create_sensors;
mod m20240601_000004_create_alert_rules;
mod m20240601_000005_create_alerts;
mod m20240601_000006_create_alert_transports;
mod m20240601_000007_create_alert_notifications;
mod m20240601_000008_create_alert_history;
mod m20240601_000009_create_topology;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_devices::Migration),
            Box::new(m20240601_000002_create_ports::Migration),
            Box::new(m20240601_000003_create_sensors::Migration),
            Box::new(m20240601_000004_create_alert_rules::Migration),
            Box::new(m20240601_000005_create_alerts::Migration),
            Box::new(m20240601_000006_create_alert_transports::Migration),
            Box::new(m20240601_000007_create_alert_notifications::Migration),
            Box::new(m20240601_000008_create_alert_history::Migration),
            Box::new(m20240601_000009_create_topology::Migration),
        ]
    }
}