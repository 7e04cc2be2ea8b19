//! 日志/追踪初始化
//!
//! `RUST_LOG` 优先，未设置时退回配置中的 `log_level`；日志写到 stderr，
//! 标准输出留给批量结果。重复调用为空操作。
//!
use crate::config::AppConfig;
use tracing_subscriber::EnvFilter;

pub fn init(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = if config.log_json {
        builder
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .try_init()
    } else {
        builder.try_init()
    };
}
