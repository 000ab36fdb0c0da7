// ============================================================
// HEALTH SERVICE
// ============================================================
// Production health checks. Fail-safe: never errors, always
// produces a full status document.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::domain::llm_config::LLMConfig;
use crate::infrastructure::llm_clients::LLMClient;

const LLM_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub status: String,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceStatus {
    fn up(elapsed: Duration) -> Self {
        Self {
            status: "up".to_string(),
            response_time_ms: (elapsed.as_millis() as u64).max(1),
            error: None,
        }
    }

    fn down(error: &str) -> Self {
        Self {
            status: "down".to_string(),
            response_time_ms: 0,
            error: Some(error.to_string()),
        }
    }

    fn is_down(&self) -> bool {
        self.status == "down"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub overall_status: String,
    pub backend: ServiceStatus,
    pub database: ServiceStatus,
    pub llm: ServiceStatus,
    pub timestamp: String,
}

pub struct HealthService {
    pool: SqlitePool,
    llm: Arc<dyn LLMClient + Send + Sync>,
    llm_config: LLMConfig,
}

impl HealthService {
    pub fn new(
        pool: SqlitePool,
        llm: Arc<dyn LLMClient + Send + Sync>,
        llm_config: LLMConfig,
    ) -> Self {
        Self {
            pool,
            llm,
            llm_config,
        }
    }

    pub async fn full_status(&self) -> HealthStatus {
        let backend = ServiceStatus::up(Duration::from_millis(1));
        let database = self.check_database().await;
        let llm = self.check_llm().await;

        let down_count = [&backend, &database, &llm]
            .iter()
            .filter(|s| s.is_down())
            .count();
        let overall_status = match down_count {
            0 => "healthy",
            1 => "degraded",
            _ => "unhealthy",
        };

        HealthStatus {
            overall_status: overall_status.to_string(),
            backend,
            database,
            llm,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    async fn check_database(&self) -> ServiceStatus {
        let start = Instant::now();
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => ServiceStatus::up(start.elapsed()),
            Err(_) => ServiceStatus::down("Database connection failed"),
        }
    }

    /// Minimal test prompt under a hard 5 second timeout
    async fn check_llm(&self) -> ServiceStatus {
        let start = Instant::now();
        let config = LLMConfig {
            max_tokens: Some(5),
            ..self.llm_config.clone()
        };

        let probe = self
            .llm
            .generate(&config, "You are a health probe.", "Respond with OK only.");

        match tokio::time::timeout(LLM_PROBE_TIMEOUT, probe).await {
            Ok(Ok(_)) => ServiceStatus::up(start.elapsed()),
            Ok(Err(_)) => ServiceStatus::down("LLM API error (check credentials)"),
            Err(_) => ServiceStatus::down("LLM connection timeout"),
        }
    }
}
