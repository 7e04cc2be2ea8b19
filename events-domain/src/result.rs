//! 批量结果（BatchResult）与逐条结果（BatchReport）
//!
//! `BatchResult` 是交还队列运行时的线上契约：
//! `{"batchItemFailures": [{"itemIdentifier": "..."}]}`，空列表表示整批处理完成。
//! 失败集合按集合语义去重，顺序为批次内首次失败的顺序。
//!
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    #[serde(default)]
    batch_item_failures: Vec<BatchItemFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemFailure {
    item_identifier: String,
}

impl BatchItemFailure {
    pub fn new(item_identifier: impl Into<String>) -> Self {
        Self {
            item_identifier: item_identifier.into(),
        }
    }

    pub fn item_identifier(&self) -> &str {
        &self.item_identifier
    }
}

impl BatchResult {
    pub fn from_failed_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let batch_item_failures = ids
            .into_iter()
            .map(Into::<String>::into)
            .filter(|id: &String| seen.insert(id.clone()))
            .map(BatchItemFailure::new)
            .collect();
        Self {
            batch_item_failures,
        }
    }

    pub fn batch_item_failures(&self) -> &[BatchItemFailure] {
        &self.batch_item_failures
    }

    pub fn failed_ids(&self) -> impl Iterator<Item = &str> {
        self.batch_item_failures.iter().map(|f| f.item_identifier())
    }

    pub fn contains(&self, message_id: &str) -> bool {
        self.failed_ids().any(|id| id == message_id)
    }

    pub fn len(&self) -> usize {
        self.batch_item_failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch_item_failures.is_empty()
    }
}

/// 单条消息的终态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageOutcome {
    HandlerSucceeded,
    HandlerFailed,
    RoutingFailed,
    TimedOut,
}

impl MessageOutcome {
    /// 除 `HandlerSucceeded` 外的终态都需要重投
    pub fn is_failure(&self) -> bool {
        !matches!(self, MessageOutcome::HandlerSucceeded)
    }
}

/// 按批次顺序记录每条消息的终态
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    outcomes: Vec<(String, MessageOutcome)>,
}

impl BatchReport {
    pub fn new(outcomes: Vec<(String, MessageOutcome)>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[(String, MessageOutcome)] {
        &self.outcomes
    }

    pub fn outcome_of(&self, message_id: &str) -> Option<MessageOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| id == message_id)
            .map(|(_, o)| *o)
    }

    pub fn count(&self, outcome: MessageOutcome) -> usize {
        self.outcomes.iter().filter(|(_, o)| *o == outcome).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_failure()).count()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.len() - self.failed()
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn to_result(&self) -> BatchResult {
        BatchResult::from_failed_ids(
            self.outcomes
                .iter()
                .filter(|(_, o)| o.is_failure())
                .map(|(id, _)| id.as_str()),
        )
    }

    pub fn into_result(self) -> BatchResult {
        self.to_result()
    }
}

impl From<BatchReport> for BatchResult {
    fn from(report: BatchReport) -> Self {
        report.into_result()
    }
}
