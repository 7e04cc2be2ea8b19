//! 账户注销处理器（ACCOUNT_DELETION）
//!
//! 事件形态：`{"detail-type": "ACCOUNT_DELETION", "detail": {"userId": "..."}}`。
//! 清理流程：取出用户全部批注 ID，按块删除（先笔记后批注），块与块之间暂停
//! 一段时间以减轻数据库压力。删除是幂等的，失败后由队列重投即可。
//!
use crate::error::{AppError, AppResult};
use crate::store::{HighlightStore, NoteStore};
use async_trait::async_trait;
use events_domain::{EventEnvelope, EventHandler, InboundMessage};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// 分批删除配置
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchDeleteConfig {
    /// 每块删除的批注数
    pub chunk_size: usize,
    /// 块与块之间的间隔
    pub delay: Duration,
}

impl Default for BatchDeleteConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1_000,
            delay: Duration::from_millis(500),
        }
    }
}

pub struct AccountDeletionHandler {
    highlights: Arc<dyn HighlightStore>,
    notes: Arc<dyn NoteStore>,
    config: BatchDeleteConfig,
}

impl AccountDeletionHandler {
    pub const NAME: &'static str = "account_deletion";

    pub fn new(
        highlights: Arc<dyn HighlightStore>,
        notes: Arc<dyn NoteStore>,
        config: BatchDeleteConfig,
    ) -> Self {
        Self {
            highlights,
            notes,
            config,
        }
    }

    /// 清理用户的批注与笔记，返回删除的批注条数
    pub async fn clear_user_data(&self, user_id: &str, request_id: &str) -> AppResult<usize> {
        let ids = self.highlights.annotation_ids_for_user(user_id).await?;
        if ids.is_empty() {
            info!(user_id, request_id, "no annotation data to delete");
            return Ok(0);
        }

        let chunk_size = self.config.chunk_size.max(1);
        let mut deleted = 0;
        for (index, chunk) in ids.chunks(chunk_size).enumerate() {
            if index > 0 && !self.config.delay.is_zero() {
                tokio::time::sleep(self.config.delay).await;
            }
            let notes = self.notes.delete_by_highlight_ids(chunk).await?;
            let highlights = self
                .highlights
                .delete_by_annotation_ids(user_id, chunk, request_id)
                .await?;
            debug!(
                user_id,
                request_id,
                chunk = index,
                notes,
                highlights,
                "deleted annotation chunk"
            );
            deleted += highlights;
        }

        info!(user_id, request_id, deleted, "cleared user annotation data");
        Ok(deleted)
    }
}

#[async_trait]
impl EventHandler for AccountDeletionHandler {
    fn handler_name(&self) -> &str {
        Self::NAME
    }

    async fn handle(&self, message: &InboundMessage) -> anyhow::Result<()> {
        let envelope = message.envelope()?;
        let user_id = user_id_of(&envelope)?;
        self.clear_user_data(&user_id, message.message_id()).await?;
        Ok(())
    }
}

/// `detail.userId`，兼容字符串与数字
pub fn user_id_of(envelope: &EventEnvelope) -> AppResult<String> {
    match envelope.detail().and_then(|d| d.get("userId")) {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        _ => Err(AppError::InvalidEvent(format!(
            "{} event is missing detail.userId",
            envelope.detail_type()
        ))),
    }
}
