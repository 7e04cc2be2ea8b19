/// 批量路由器（内存版）示例
/// 展示 注册表 -> 路由器 -> 处理器 -> 上报器 的闭环，以及失败消息的选择性重投
use anyhow::Result as AnyResult;
use events_domain::error::EventResult;
use events_domain::{
    BatchRouter, ErrorReport, ErrorReporter, EventType, HandlerRegistry, InboundBatch,
    InboundMessage, handler_fn,
};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// 打印到标准输出的上报器
// ============================================================================

struct StdoutReporter;

#[async_trait::async_trait]
impl ErrorReporter for StdoutReporter {
    async fn report(&self, report: &ErrorReport) -> EventResult<()> {
        println!(
            "report: message_id={} kind={} detail_type={:?} error={}",
            report.message_id(),
            report.kind(),
            report.detail_type(),
            report.message()
        );
        Ok(())
    }
}

fn record(id: &str, inner: serde_json::Value) -> InboundMessage {
    InboundMessage::builder()
        .message_id(id)
        .body(json!({ "Message": inner.to_string() }).to_string())
        .build()
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    // 第一次调用失败，之后成功：模拟下游的瞬时故障
    let attempts = Arc::new(AtomicUsize::new(0));
    let handler = {
        let attempts = attempts.clone();
        handler_fn("account_deletion", move |msg: InboundMessage| {
            let attempts = attempts.clone();
            async move {
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    anyhow::bail!("downstream unavailable for {}", msg.message_id());
                }
                Ok(())
            }
        })
    };

    let registry = HandlerRegistry::builder()
        .register(EventType::AccountDeletion, Arc::new(handler))
        .build()?;
    let router = BatchRouter::builder()
        .registry(registry)
        .error_reporter(Arc::new(StdoutReporter))
        .build();

    let batch = InboundBatch::new(vec![
        record(
            "m-1",
            json!({"detail-type": "ACCOUNT_DELETION", "detail": {"userId": "1"}}),
        ),
        record("m-2", json!({"detail-type": "NOT_A_TYPE"})),
    ]);

    let first = router.process(&batch).await;
    println!("first pass: {}", serde_json::to_string(&first)?);

    // 队列仅重投失败的消息
    let second = router.process(&batch.redrive(&first)).await;
    println!("redrive:    {}", serde_json::to_string(&second)?);

    Ok(())
}
