pub mod entities;

pub mod alert;
pub mod alert_rule;
pub mod device;
pub mod notification;
pub mod port;
pub mod sensor;
pub mod topology;
pub mod transport;

pub use alert::{Alert, AlertState};
pub use alert_rule::{AlertRule, Conditions, DeviceFilter, Severity};
pub use device::{Device, DeviceStatus, SnmpConfig};
pub use notification::AlertNotification;
pub use port::Port;
pub use sensor::Sensor;
pub use topology::TopologyLink;
pub use transport::{NotificationTransport, TransportKind};
