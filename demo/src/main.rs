//! 批量事件处理演示
//!
//! 从文件或标准输入读取 `{"Records": [...]}` 批次，经注册表路由到处理器，
//! 把 `{"batchItemFailures": [...]}` 写到标准输出。日志写到 stderr。
//!
//! ```text
//! events-demo --input batch.json --seed-user 1 --seed-count 2500 --pretty
//! ```
use anyhow::Context;
use clap::Parser;
use events_application::store::{HighlightRecord, InMemoryHighlightStore, InMemoryNoteStore};
use events_application::{
    AppConfig, TracingErrorReporter, UserDataStores, build_registry, build_router, telemetry,
};
use events_domain::InboundBatch;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "events-demo", about = "Route a batch of queue records to event handlers")]
struct Args {
    /// 批次 JSON 文件；缺省时读取标准输入
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// 预置批注数据的用户
    #[arg(long)]
    seed_user: Vec<String>,

    /// 每个预置用户的批注条数
    #[arg(long, default_value_t = 10)]
    seed_count: usize,

    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = AppConfig::from_env()?;
    telemetry::init(&config);

    let raw = match &args.input {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("failed to read batch from stdin")?;
            buf
        }
    };
    let batch: InboundBatch = serde_json::from_str(&raw).context("invalid batch JSON")?;

    let stores = seeded_stores(&args.seed_user, args.seed_count);
    let registry = build_registry(&config, &stores)?;
    let reporter = Arc::new(TracingErrorReporter::new(config.environment.clone()));
    let router = build_router(&config, registry, reporter);

    info!(records = batch.len(), environment = %config.environment, "processing batch");
    let result = router.process(&batch).await;

    let output = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{output}");
    Ok(())
}

fn seeded_stores(users: &[String], count: usize) -> UserDataStores {
    let highlights = InMemoryHighlightStore::new();
    let notes = InMemoryNoteStore::new();
    for user_id in users {
        for i in 0..count {
            let annotation_id = format!("{user_id}-{i:05}");
            if i % 2 == 0 {
                notes.insert(annotation_id.clone(), "seeded note");
            }
            highlights.insert(HighlightRecord {
                annotation_id,
                user_id: user_id.clone(),
                item_id: format!("item-{}", i % 7),
                quote: "seeded quote".into(),
            });
        }
    }
    UserDataStores {
        highlights: Arc::new(highlights),
        notes: Arc::new(notes),
    }
}
