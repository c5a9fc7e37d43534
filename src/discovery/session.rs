use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::discovery::modules::ModuleResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Full,
    Incremental,
    Module,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Running,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverySession {
    pub id: Uuid,
    pub device_id: Uuid,
    pub session_type: SessionType,
    pub selected_modules: Vec<String>,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub current_module: Option<String>,
    pub results: Vec<ModuleResult>,
    pub errors: Vec<String>,
    pub progress: u8,
    /// Not serialized: signalled by `cancel()`, observed by the
    /// orchestrator at module boundaries per spec.md §5.
    #[serde(skip)]
    pub cancel_flag: Arc<AtomicBool>,
}

impl DiscoverySession {
    pub fn new(device_id: Uuid, session_type: SessionType, selected_modules: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            device_id,
            session_type,
            selected_modules,
            status: SessionStatus::Running,
            started_at: Utc::now(),
            ended_at: None,
            current_module: None,
            results: Vec::new(),
            errors: Vec::new(),
            progress: 0,
            cancel_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }

    pub fn finish(&mut self, status: SessionStatus) {
        self.status = status;
        self.ended_at = Some(Utc::now());
        self.progress = 100;
        self.current_module = None;
    }
}
