pub mod alert_service;
pub mod discovery_service;
pub mod rule_service;
pub mod transport_service;

pub use alert_service::{AlertFilters, AlertService};
pub use discovery_service::DiscoveryService;
pub use rule_service::RuleService;
pub use transport_service::TransportService;
