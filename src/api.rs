//! HTTP API for the advisory chat page

mod assets;
mod handlers;
mod sse;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::app::AppController;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Navigation is serialized through this lock; session calls are not
    pub controller: Arc<Mutex<AppController>>,
}

impl AppState {
    pub fn new(controller: AppController) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
        }
    }
}
