pub mod alert_history;
pub mod alert_notifications;
pub mod alert_rules;
pub mod alert_transports;
pub mod alerts;
pub mod devices;
pub mod ports;
pub mod sensors;
pub mod topology;

pub mod prelude {
    pub use super::alert_history::Entity as AlertHistory;
    pub use super::alert_notifications::Entity as AlertNotifications;
    pub use super::alert_rules::Entity as AlertRules;
    pub use super::alert_transports::Entity as AlertTransports;
    pub use super::alerts::Entity as Alerts;
    pub use super::devices::Entity as Devices;
    pub use super::ports::Entity as Ports;
    pub use super::sensors::Entity as Sensors;
    pub use super::topology::Entity as Topology;
}
