pub mod modules;
pub mod orchestrator;
pub mod os_template;
pub mod session;

pub use orchestrator::DiscoveryOrchestrator;
pub use session::{DiscoverySession, SessionStatus, SessionType};
