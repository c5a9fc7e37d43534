pub mod counters;
pub mod history_ring;
pub mod interface_poller;
pub mod scheduler;
pub mod sensor_poller;

pub use counters::{compute_rates, InterfaceDeltas, InterfaceRates};
pub use history_ring::HistoryRing;
pub use interface_poller::InterfacePoller;
pub use scheduler::Scheduler;
pub use sensor_poller::SensorPoller;
