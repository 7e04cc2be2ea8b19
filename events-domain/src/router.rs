//! 批量路由器（BatchRouter）
//!
//! 处理一次入站批次并产出唯一的 `BatchResult`：
//! - 逐条解析信封、按 `detail-type` 查找处理器并调用；
//! - 每条消息独立执行（有界并发），单条失败不影响同批其它消息；
//! - 路由失败与处理器失败都交给 `ErrorReporter`，并进入失败集合；
//! - 路由器本身不做重试，重试交由队列对失败 ID 的重投完成。
//!
use crate::error::EventError;
use crate::message::{InboundBatch, InboundMessage};
use crate::registry::HandlerRegistry;
use crate::reporter::{ErrorReport, ErrorReporter, FailureKind};
use crate::result::{BatchReport, BatchResult, MessageOutcome};
use bon::Builder;
use futures_util::{FutureExt, StreamExt, stream};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant};
use tracing::{debug, error, info, warn};

/// 路由器配置
#[derive(Clone, Copy, Debug)]
pub struct RouterConfig {
    /// 同一批次内同时处理的消息数上限
    pub concurrency: usize,
    /// 单次错误上报的等待上限
    pub report_timeout: Duration,
    /// 批次截止时间（相对开始处理的时刻）；为空表示不限
    pub batch_deadline: Option<Duration>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            report_timeout: Duration::from_secs(2),
            batch_deadline: None,
        }
    }
}

#[derive(Builder)]
pub struct BatchRouter {
    #[builder(into)]
    registry: Arc<HandlerRegistry>,
    error_reporter: Arc<dyn ErrorReporter>,
    #[builder(default)]
    config: RouterConfig,
}

impl BatchRouter {
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// 处理整批消息，返回需要重投的消息 ID 集合
    pub async fn process(&self, batch: &InboundBatch) -> BatchResult {
        self.process_report(batch).await.into_result()
    }

    /// 处理整批消息，返回按批次顺序排列的逐条终态
    pub async fn process_report(&self, batch: &InboundBatch) -> BatchReport {
        let deadline = self.config.batch_deadline.map(|d| Instant::now() + d);
        let concurrency = self.config.concurrency.max(1);

        // 乱序完成，按下标还原输入顺序；慢消息不占用其它消息的并发槽位
        let mut completed: Vec<(usize, MessageOutcome)> =
            stream::iter(batch.records().iter().enumerate())
                .map(|(index, message)| async move {
                    (index, self.route_within(message, deadline).await)
                })
                .buffer_unordered(concurrency)
                .collect()
                .await;
        completed.sort_unstable_by_key(|(index, _)| *index);

        let outcomes = batch
            .records()
            .iter()
            .zip(completed)
            .map(|(message, (_, outcome))| (message.message_id().to_owned(), outcome))
            .collect();

        let report = BatchReport::new(outcomes);
        if report.failed() > 0 {
            warn!(
                total = report.total(),
                failed = report.failed(),
                "batch processed with failures"
            );
        } else {
            info!(total = report.total(), "batch processed");
        }
        report
    }

    async fn route_within(
        &self,
        message: &InboundMessage,
        deadline: Option<Instant>,
    ) -> MessageOutcome {
        let Some(deadline) = deadline else {
            return self.route(message).await;
        };

        match time::timeout_at(deadline, self.route(message)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(
                    message_id = message.message_id(),
                    "message unresolved at batch deadline"
                );
                let detail_type = message
                    .envelope()
                    .ok()
                    .map(|env| env.detail_type().to_owned());
                // 截止后的上报共用同一截止点，批次最迟在 deadline + report_timeout 返回
                self.report_until(
                    ErrorReport::new(
                        message.message_id(),
                        detail_type,
                        FailureKind::TimedOut,
                        EventError::DeadlineExceeded.into(),
                    ),
                    deadline + self.config.report_timeout,
                )
                .await;
                MessageOutcome::TimedOut
            }
        }
    }

    async fn route(&self, message: &InboundMessage) -> MessageOutcome {
        let envelope = match message.envelope() {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(
                    message_id = message.message_id(),
                    error = %err,
                    "unable to parse message envelope"
                );
                self.report(ErrorReport::new(
                    message.message_id(),
                    None,
                    FailureKind::Routing,
                    err.into(),
                ))
                .await;
                return MessageOutcome::RoutingFailed;
            }
        };

        let detail_type = envelope.detail_type();
        let Some(handler) = envelope.tag().and_then(|tag| self.registry.lookup(tag)) else {
            warn!(
                message_id = message.message_id(),
                detail_type, "no handler registered for detail-type"
            );
            self.report(ErrorReport::new(
                message.message_id(),
                Some(detail_type.to_owned()),
                FailureKind::Routing,
                EventError::handler_not_found(detail_type).into(),
            ))
            .await;
            return MessageOutcome::RoutingFailed;
        };

        debug!(
            message_id = message.message_id(),
            detail_type,
            handler = handler.handler_name(),
            "dispatching message"
        );

        let err = match AssertUnwindSafe(handler.handle(message))
            .catch_unwind()
            .await
        {
            Ok(Ok(())) => {
                debug!(
                    message_id = message.message_id(),
                    handler = handler.handler_name(),
                    "handler succeeded"
                );
                return MessageOutcome::HandlerSucceeded;
            }
            Ok(Err(err)) => err,
            Err(panic) => anyhow::anyhow!(panic_message(panic.as_ref())),
        };

        error!(
            message_id = message.message_id(),
            detail_type,
            handler = handler.handler_name(),
            error = %err,
            "handler failed"
        );
        self.report(ErrorReport::new(
            message.message_id(),
            Some(detail_type.to_owned()),
            FailureKind::Handler,
            err,
        ))
        .await;
        MessageOutcome::HandlerFailed
    }

    async fn report(&self, report: ErrorReport) {
        self.report_until(report, Instant::now() + self.config.report_timeout)
            .await;
    }

    // 上报为尽力而为：超时、出错或 panic 只记录日志
    async fn report_until(&self, report: ErrorReport, until: Instant) {
        let fut = AssertUnwindSafe(self.error_reporter.report(&report)).catch_unwind();
        match time::timeout_at(until, fut).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(err))) => warn!(
                message_id = report.message_id(),
                error = %err,
                "failed to report processing error"
            ),
            Ok(Err(panic)) => warn!(
                message_id = report.message_id(),
                panic = %panic_message(panic.as_ref()),
                "error reporter panicked"
            ),
            Err(_) => warn!(
                message_id = report.message_id(),
                timeout_ms = self.config.report_timeout.as_millis() as u64,
                "error reporter timed out"
            ),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EventResult;
    use crate::event_type::EventType;
    use crate::handler::handler_fn;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect {
        messages: Mutex<Vec<String>>,
    }
    #[async_trait]
    impl ErrorReporter for Collect {
        async fn report(&self, report: &ErrorReport) -> EventResult<()> {
            self.messages.lock().unwrap().push(report.message());
            Ok(())
        }
    }

    fn msg(id: &str, detail_type: &str) -> InboundMessage {
        InboundMessage::builder()
            .message_id(id)
            .body(
                json!({ "Message": json!({ "detail-type": detail_type }).to_string() })
                    .to_string(),
            )
            .build()
    }

    #[test]
    fn panic_message_reads_str_and_string_payloads() {
        let s: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(s.as_ref()), "boom");
        let s: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(s.as_ref()), "bang");
        let s: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(s.as_ref()), "handler panicked");
    }

    #[tokio::test]
    async fn empty_batch_yields_empty_result_without_reports() {
        let reporter = Arc::new(Collect::default());
        let router = BatchRouter::builder()
            .registry(HandlerRegistry::default())
            .error_reporter(reporter.clone())
            .build();

        let result = router.process(&InboundBatch::default()).await;
        assert!(result.is_empty());
        assert!(reporter.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_concurrency_is_treated_as_sequential() {
        let registry = HandlerRegistry::builder()
            .register(
                EventType::AccountDeletion,
                Arc::new(handler_fn("ok", |_m: InboundMessage| async { anyhow::Ok(()) })),
            )
            .build()
            .unwrap();
        let router = BatchRouter::builder()
            .registry(registry)
            .error_reporter(Arc::new(Collect::default()))
            .config(RouterConfig {
                concurrency: 0,
                ..Default::default()
            })
            .build();

        let batch = InboundBatch::new(vec![
            msg("a", "ACCOUNT_DELETION"),
            msg("b", "ACCOUNT_DELETION"),
        ]);
        let report = router.process_report(&batch).await;
        assert_eq!(report.count(MessageOutcome::HandlerSucceeded), 2);
    }
}
