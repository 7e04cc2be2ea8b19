//! 运行配置（AppConfig）
//!
//! 从环境变量读取（若存在 `.env` 则先加载），未设置的项使用默认值。
//!
use crate::account_deletion::BatchDeleteConfig;
use anyhow::{Context, bail};
use events_domain::RouterConfig;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    // 运行环境
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,

    // 路由器
    pub router_concurrency: usize,
    pub report_timeout_ms: u64,
    pub batch_deadline_ms: Option<u64>,

    // 账户注销的分批删除
    pub delete_chunk_size: usize,
    pub delete_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".into(),
            log_level: "info".into(),
            log_json: true,
            router_concurrency: 8,
            report_timeout_ms: 2_000,
            batch_deadline_ms: None,
            delete_chunk_size: 1_000,
            delete_delay_ms: 500,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 以任意键值来源构建配置，便于测试时不改动进程环境
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            environment: lookup("EVENTS_ENVIRONMENT").unwrap_or(defaults.environment),
            log_level: lookup("EVENTS_LOG_LEVEL").unwrap_or(defaults.log_level),
            log_json: parse_or(&lookup, "EVENTS_LOG_JSON", defaults.log_json)?,
            router_concurrency: parse_or(
                &lookup,
                "EVENTS_ROUTER_CONCURRENCY",
                defaults.router_concurrency,
            )?,
            report_timeout_ms: parse_or(
                &lookup,
                "EVENTS_REPORT_TIMEOUT_MS",
                defaults.report_timeout_ms,
            )?,
            batch_deadline_ms: lookup("EVENTS_BATCH_DEADLINE_MS")
                .map(|raw| raw.trim().parse::<u64>())
                .transpose()
                .context("invalid EVENTS_BATCH_DEADLINE_MS")?,
            delete_chunk_size: parse_or(
                &lookup,
                "EVENTS_DELETE_CHUNK_SIZE",
                defaults.delete_chunk_size,
            )?,
            delete_delay_ms: parse_or(&lookup, "EVENTS_DELETE_DELAY_MS", defaults.delete_delay_ms)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.router_concurrency == 0 {
            bail!("EVENTS_ROUTER_CONCURRENCY must be greater than zero");
        }
        if self.delete_chunk_size == 0 {
            bail!("EVENTS_DELETE_CHUNK_SIZE must be greater than zero");
        }
        Ok(())
    }

    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            concurrency: self.router_concurrency,
            report_timeout: Duration::from_millis(self.report_timeout_ms),
            batch_deadline: self.batch_deadline_ms.map(Duration::from_millis),
        }
    }

    pub fn batch_delete_config(&self) -> BatchDeleteConfig {
        BatchDeleteConfig {
            chunk_size: self.delete_chunk_size,
            delay: Duration::from_millis(self.delete_delay_ms),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {key}: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.environment, "development");
        assert_eq!(config.router_concurrency, 8);
        assert_eq!(config.delete_chunk_size, 1_000);
        assert_eq!(config.router_config().batch_deadline, None);
        assert_eq!(
            config.batch_delete_config().delay,
            Duration::from_millis(500)
        );
    }

    #[test]
    fn values_are_read_and_converted() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("EVENTS_ENVIRONMENT", "production"),
            ("EVENTS_LOG_JSON", "false"),
            ("EVENTS_ROUTER_CONCURRENCY", "2"),
            ("EVENTS_REPORT_TIMEOUT_MS", "250"),
            ("EVENTS_BATCH_DEADLINE_MS", " 9000 "),
            ("EVENTS_DELETE_CHUNK_SIZE", "50"),
            ("EVENTS_DELETE_DELAY_MS", "0"),
        ]))
        .unwrap();

        assert_eq!(config.environment, "production");
        assert!(!config.log_json);
        let router = config.router_config();
        assert_eq!(router.concurrency, 2);
        assert_eq!(router.report_timeout, Duration::from_millis(250));
        assert_eq!(router.batch_deadline, Some(Duration::from_secs(9)));
        assert_eq!(config.batch_delete_config().chunk_size, 50);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("EVENTS_ROUTER_CONCURRENCY", "many")]))
            .unwrap_err();
        assert!(err.to_string().contains("EVENTS_ROUTER_CONCURRENCY"));

        let err = AppConfig::from_lookup(lookup_from(&[("EVENTS_DELETE_CHUNK_SIZE", "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }
}
