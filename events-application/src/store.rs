//! 用户数据存储协议（HighlightStore / NoteStore）
//!
//! 账户注销时需要清理的两类数据：高亮批注（按用户归属）与挂在批注上的笔记。
//! 真实的数据库适配不在本 crate 内，这里只定义协议与内存实现。
//!
use crate::error::AppResult;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// 高亮批注
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightRecord {
    pub annotation_id: String,
    pub user_id: String,
    pub item_id: String,
    pub quote: String,
}

#[async_trait]
pub trait HighlightStore: Send + Sync {
    /// 用户名下全部批注 ID（有序）
    async fn annotation_ids_for_user(&self, user_id: &str) -> AppResult<Vec<String>>;

    /// 删除指定用户的一组批注，返回实际删除条数；`request_id` 仅用于日志关联
    async fn delete_by_annotation_ids(
        &self,
        user_id: &str,
        annotation_ids: &[String],
        request_id: &str,
    ) -> AppResult<usize>;
}

#[async_trait]
pub trait NoteStore: Send + Sync {
    /// 删除挂在指定批注上的笔记，返回实际删除条数
    async fn delete_by_highlight_ids(&self, highlight_ids: &[String]) -> AppResult<usize>;
}

/// 基于内存的批注存储
#[derive(Debug, Default)]
pub struct InMemoryHighlightStore {
    records: DashMap<String, HighlightRecord>,
}

impl InMemoryHighlightStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: HighlightRecord) {
        self.records.insert(record.annotation_id.clone(), record);
    }

    pub fn count_for_user(&self, user_id: &str) -> usize {
        self.records
            .iter()
            .filter(|r| r.value().user_id == user_id)
            .count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl HighlightStore for InMemoryHighlightStore {
    async fn annotation_ids_for_user(&self, user_id: &str) -> AppResult<Vec<String>> {
        let mut ids: Vec<String> = self
            .records
            .iter()
            .filter(|r| r.value().user_id == user_id)
            .map(|r| r.key().clone())
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn delete_by_annotation_ids(
        &self,
        user_id: &str,
        annotation_ids: &[String],
        _request_id: &str,
    ) -> AppResult<usize> {
        let deleted = annotation_ids
            .iter()
            .filter(|id| {
                self.records
                    .remove_if(id.as_str(), |_, r| r.user_id == user_id)
                    .is_some()
            })
            .count();
        Ok(deleted)
    }
}

/// 基于内存的笔记存储（批注 ID → 笔记内容）
#[derive(Debug, Default)]
pub struct InMemoryNoteStore {
    notes: DashMap<String, String>,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, highlight_id: impl Into<String>, text: impl Into<String>) {
        self.notes.insert(highlight_id.into(), text.into());
    }

    pub fn contains(&self, highlight_id: &str) -> bool {
        self.notes.contains_key(highlight_id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
    async fn delete_by_highlight_ids(&self, highlight_ids: &[String]) -> AppResult<usize> {
        Ok(highlight_ids
            .iter()
            .filter(|id| self.notes.remove(id.as_str()).is_some())
            .count())
    }
}
