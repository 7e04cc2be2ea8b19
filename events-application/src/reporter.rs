//! 基于 tracing 的错误上报器
//!
//! 每条失败生成一个结构化 `error` 级别事件，由日志管道转发到观测后端。
//!
use async_trait::async_trait;
use events_domain::error::EventResult;
use events_domain::{ErrorReport, ErrorReporter};
use tracing::error;

#[derive(Debug, Clone)]
pub struct TracingErrorReporter {
    environment: String,
}

impl TracingErrorReporter {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
        }
    }
}

#[async_trait]
impl ErrorReporter for TracingErrorReporter {
    async fn report(&self, report: &ErrorReport) -> EventResult<()> {
        error!(
            environment = %self.environment,
            message_id = report.message_id(),
            detail_type = report.detail_type(),
            kind = %report.kind(),
            occurred_at = %report.occurred_at().to_rfc3339(),
            error = %report.message(),
            "event processing failure"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use events_domain::FailureKind;

    #[tokio::test]
    async fn reporting_never_fails() {
        let reporter = TracingErrorReporter::new("test");
        let report = ErrorReport::new(
            "abc",
            None,
            FailureKind::Routing,
            anyhow::anyhow!("Unable to retrieve handler for detail-type='undefined'"),
        );
        assert!(reporter.report(&report).await.is_ok());
    }
}
