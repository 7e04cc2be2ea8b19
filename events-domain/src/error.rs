//! 事件路由统一错误定义
//!
//! 聚焦信封解析、处理器路由、注册与上报的最小必要集合。
//! 处理器自身的执行错误以 `anyhow::Error` 原样传递，不在此处包装。
//!
use crate::event_type::EventType;
use thiserror::Error;

/// 统一错误类型（路由层最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EventError {
    // --- 信封 ---
    #[error("malformed envelope: {reason}")]
    MalformedEnvelope { reason: String },

    // --- 路由/注册 ---
    #[error("Unable to retrieve handler for detail-type='{detail_type}'")]
    HandlerNotFound { detail_type: String },
    #[error("handler already registered: detail-type={event_type}")]
    AlreadyRegistered { event_type: EventType },

    // --- 执行/上报 ---
    #[error("message processing exceeded the batch deadline")]
    DeadlineExceeded,
    #[error("error reporter failed: {reason}")]
    Reporter { reason: String },
}

impl EventError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedEnvelope {
            reason: reason.into(),
        }
    }

    pub fn handler_not_found(detail_type: impl Into<String>) -> Self {
        Self::HandlerNotFound {
            detail_type: detail_type.into(),
        }
    }

    pub fn reporter(reason: impl Into<String>) -> Self {
        Self::Reporter {
            reason: reason.into(),
        }
    }
}

/// 统一 Result 类型别名
pub type EventResult<T> = Result<T, EventError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_not_found_message_names_the_detail_type() {
        let err = EventError::handler_not_found("NOT_A_TYPE");
        assert_eq!(
            err.to_string(),
            "Unable to retrieve handler for detail-type='NOT_A_TYPE'"
        );
    }
}
