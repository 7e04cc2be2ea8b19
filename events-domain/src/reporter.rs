//! 错误上报（ErrorReporter）
//!
//! 旁路观测通道：路由失败与处理器失败都会生成一条 `ErrorReport` 交给上报器。
//! 对路由器而言上报是尽力而为的，上报器的失败或延迟不影响批量结果。
//!
use crate::error::EventResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

/// 失败分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// 信封无法解析、缺少事件类型或无对应处理器
    Routing,
    /// 处理器返回错误（或 panic）
    Handler,
    /// 批次截止时间到达时仍未完成
    TimedOut,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Routing => "routing",
            FailureKind::Handler => "handler",
            FailureKind::TimedOut => "timed_out",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一条失败记录；`error` 为原始错误对象，不做二次包装
#[derive(Debug)]
pub struct ErrorReport {
    message_id: String,
    detail_type: Option<String>,
    kind: FailureKind,
    error: anyhow::Error,
    occurred_at: DateTime<Utc>,
}

impl ErrorReport {
    pub fn new(
        message_id: impl Into<String>,
        detail_type: Option<String>,
        kind: FailureKind,
        error: anyhow::Error,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            detail_type,
            kind,
            error,
            occurred_at: Utc::now(),
        }
    }

    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    pub fn detail_type(&self) -> Option<&str> {
        self.detail_type.as_deref()
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn error(&self) -> &anyhow::Error {
        &self.error
    }

    /// 人类可读的错误信息（即原始错误的 Display）
    pub fn message(&self) -> String {
        self.error.to_string()
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

/// 错误上报器：将非致命的处理错误记录到观测后端
#[async_trait]
pub trait ErrorReporter: Send + Sync {
    async fn report(&self, report: &ErrorReport) -> EventResult<()>;
}
