//! 启动装配：注册表与路由器
//!
//! 对 `EventType::ALL` 穷举匹配注册处理器，新增事件类型时编译器会提示补齐。
//!
use crate::account_deletion::AccountDeletionHandler;
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::store::{HighlightStore, InMemoryHighlightStore, InMemoryNoteStore, NoteStore};
use events_domain::{BatchRouter, ErrorReporter, EventHandler, EventType, HandlerRegistry};
use std::sync::Arc;
use tracing::info;

/// 处理器依赖的用户数据存储
#[derive(Clone)]
pub struct UserDataStores {
    pub highlights: Arc<dyn HighlightStore>,
    pub notes: Arc<dyn NoteStore>,
}

impl UserDataStores {
    pub fn in_memory() -> Self {
        Self {
            highlights: Arc::new(InMemoryHighlightStore::new()),
            notes: Arc::new(InMemoryNoteStore::new()),
        }
    }
}

pub fn build_registry(config: &AppConfig, stores: &UserDataStores) -> AppResult<HandlerRegistry> {
    let mut builder = HandlerRegistry::builder();
    for event_type in EventType::ALL {
        let handler: Arc<dyn EventHandler> = match event_type {
            EventType::AccountDeletion => Arc::new(AccountDeletionHandler::new(
                stores.highlights.clone(),
                stores.notes.clone(),
                config.batch_delete_config(),
            )),
        };
        builder = builder.register(*event_type, handler);
    }

    let registry = builder.build()?;
    info!(handlers = ?registry, "handler registry built");
    Ok(registry)
}

pub fn build_router(
    config: &AppConfig,
    registry: HandlerRegistry,
    reporter: Arc<dyn ErrorReporter>,
) -> BatchRouter {
    BatchRouter::builder()
        .registry(registry)
        .error_reporter(reporter)
        .config(config.router_config())
        .build()
}
