//! 处理器注册表（HandlerRegistry）
//!
//! 启动期通过 builder 一次性建立 `EventType → EventHandler` 的映射，
//! 构建完成后只读，可通过 `Arc` 在并发批次间共享。
//! 查询永不失败：找不到处理器是正常结果（`None`），由路由器决定如何上报。
//!
use crate::error::{EventError, EventResult};
use crate::event_type::EventType;
use crate::handler::EventHandler;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct HandlerRegistry {
    by_type: HashMap<EventType, Arc<dyn EventHandler>>,
}

impl HandlerRegistry {
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder::default()
    }

    /// 按已识别类型查找
    pub fn resolve(&self, event_type: EventType) -> Option<Arc<dyn EventHandler>> {
        self.by_type.get(&event_type).cloned()
    }

    /// 按 `detail-type` 标签查找；未识别或未注册均返回 `None`
    pub fn lookup(&self, detail_type: &str) -> Option<Arc<dyn EventHandler>> {
        EventType::parse(detail_type).and_then(|ty| self.resolve(ty))
    }

    /// 已注册的事件类型（有序）
    pub fn event_types(&self) -> Vec<EventType> {
        let mut types: Vec<EventType> = self.by_type.keys().copied().collect();
        types.sort();
        types
    }

    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for ty in self.event_types() {
            if let Some(h) = self.by_type.get(&ty) {
                map.entry(&ty.as_str(), &h.handler_name());
            }
        }
        map.finish()
    }
}

/// 注册表构建器：同一事件类型只能注册一次，重复注册在 `build` 时报错
#[derive(Default)]
pub struct HandlerRegistryBuilder {
    by_type: HashMap<EventType, Arc<dyn EventHandler>>,
    duplicate: Option<EventType>,
}

impl HandlerRegistryBuilder {
    pub fn register(mut self, event_type: EventType, handler: Arc<dyn EventHandler>) -> Self {
        if self.by_type.contains_key(&event_type) {
            self.duplicate.get_or_insert(event_type);
        } else {
            self.by_type.insert(event_type, handler);
        }
        self
    }

    pub fn build(self) -> EventResult<HandlerRegistry> {
        if let Some(event_type) = self.duplicate {
            return Err(EventError::AlreadyRegistered { event_type });
        }
        Ok(HandlerRegistry {
            by_type: self.by_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use crate::message::InboundMessage;

    fn noop(name: &'static str) -> Arc<dyn EventHandler> {
        Arc::new(handler_fn(name, |_m: InboundMessage| async { anyhow::Ok(()) }))
    }

    #[test]
    fn lookup_finds_registered_tag() {
        let registry = HandlerRegistry::builder()
            .register(EventType::AccountDeletion, noop("account_deletion"))
            .build()
            .unwrap();

        let h = registry.lookup("ACCOUNT_DELETION").expect("handler");
        assert_eq!(h.handler_name(), "account_deletion");
        assert_eq!(registry.event_types(), vec![EventType::AccountDeletion]);
    }

    #[test]
    fn lookup_returns_none_for_unknown_or_unregistered_tags() {
        let empty = HandlerRegistry::builder().build().unwrap();
        assert!(empty.is_empty());
        assert!(empty.lookup("ACCOUNT_DELETION").is_none());
        assert!(empty.resolve(EventType::AccountDeletion).is_none());

        let registry = HandlerRegistry::builder()
            .register(EventType::AccountDeletion, noop("a"))
            .build()
            .unwrap();
        assert!(registry.lookup("NOT_A_TYPE").is_none());
    }

    #[test]
    fn duplicate_registration_is_rejected_and_first_handler_is_not_replaced() {
        let err = HandlerRegistry::builder()
            .register(EventType::AccountDeletion, noop("first"))
            .register(EventType::AccountDeletion, noop("second"))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            EventError::AlreadyRegistered {
                event_type: EventType::AccountDeletion
            }
        ));
    }

    #[test]
    fn debug_lists_types_and_handler_names() {
        let registry = HandlerRegistry::builder()
            .register(EventType::AccountDeletion, noop("account_deletion"))
            .build()
            .unwrap();
        assert_eq!(
            format!("{registry:?}"),
            r#"{"ACCOUNT_DELETION": "account_deletion"}"#
        );
    }
}
