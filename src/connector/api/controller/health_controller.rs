use anyhow::Result;

use crate::connector::adapter::http::HealthResponse;

pub struct HealthController;

impl HealthController {
    pub fn new() -> Self {
        Self
    }

    pub fn health(&self) -> Result<String> {
        Ok(serde_json::to_string(&HealthResponse::healthy())?)
    }
}

impl Default for HealthController {
    fn default() -> Self {
        Self::new()
    }
}
