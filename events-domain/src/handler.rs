//! 事件处理器（EventHandler）
//!
//! 定义消费某一事件类型的处理逻辑与元信息（名称）。
//! 处理器接收原始入站消息（而非仅解码后的信封），成功返回 `Ok(())`，
//! 失败时返回的错误会被原样交给错误上报器。
//!
use crate::message::InboundMessage;
use async_trait::async_trait;
use std::future::Future;

/// 事件处理器：处理某一类型的事件
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// 处理器名称（用于日志与审计）
    fn handler_name(&self) -> &str;
    /// 处理消息
    async fn handle(&self, message: &InboundMessage) -> anyhow::Result<()>;
}

/// 以异步函数充当处理器
pub struct FnHandler<F> {
    name: String,
    f: F,
}

/// 将 `Fn(InboundMessage) -> Future` 包装为具名处理器
pub fn handler_fn<F, Fut>(name: impl Into<String>, f: F) -> FnHandler<F>
where
    F: Fn(InboundMessage) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    FnHandler {
        name: name.into(),
        f,
    }
}

#[async_trait]
impl<F, Fut> EventHandler for FnHandler<F>
where
    F: Fn(InboundMessage) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn handler_name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, message: &InboundMessage) -> anyhow::Result<()> {
        (self.f)(message.clone()).await
    }
}
