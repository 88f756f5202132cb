use getset::{Getters, Setters};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 브라우저처럼 보이도록 모든 요청에 붙이는 기본 User-Agent
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

#[derive(Deserialize, Serialize, Debug, Clone, Getters, Setters)]
pub struct GatewayConfig {
    /// 요청 타임아웃 (초)
    #[getset(get = "pub", set = "pub")]
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
    #[getset(get = "pub", set = "pub")]
    #[serde(default = "default_user_agent")]
    user_agent: String,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl GatewayConfig {
    pub fn new(timeout_secs: u64, user_agent: impl Into<String>) -> Self {
        Self {
            timeout_secs,
            user_agent: user_agent.into(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
