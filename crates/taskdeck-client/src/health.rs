use std::fmt;

use taskdeck_shared::HealthStatus;
use tracing::{info, warn};

use crate::api::TaskApi;
use crate::error::ApiResult;

/// Connection state shown by the API status banner.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ApiHealth {
    #[default]
    Checking,
    Connected,
    Unexpected,
    Failed(String),
}

impl ApiHealth {
    pub fn from_result(result: ApiResult<HealthStatus>) -> Self {
        match result {
            Ok(status) if status.is_ok() => ApiHealth::Connected,
            Ok(status) => {
                warn!(status = %status.status, "health probe returned unexpected status");
                ApiHealth::Unexpected
            }
            Err(err) => {
                warn!(error = %err, "health probe failed");
                ApiHealth::Failed(err.user_message())
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ApiHealth::Connected)
    }

    /// Retry is offered once a probe has settled on anything but success.
    pub fn can_retry(&self) -> bool {
        matches!(self, ApiHealth::Unexpected | ApiHealth::Failed(_))
    }

    pub fn message(&self) -> String {
        match self {
            ApiHealth::Checking => "Checking API connection...".to_string(),
            ApiHealth::Connected => "API connected".to_string(),
            ApiHealth::Unexpected => "API returned unexpected response".to_string(),
            ApiHealth::Failed(reason) => format!("API connection failed: {reason}"),
        }
    }
}

impl fmt::Display for ApiHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

pub async fn check_health<A: TaskApi>(api: &A) -> ApiHealth {
    let health = ApiHealth::from_result(api.health().await);
    if health.is_connected() {
        info!("task service reachable");
    }
    health
}
