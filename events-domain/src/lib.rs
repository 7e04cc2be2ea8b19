//! 事件批量路由基础库（events-domain）
//!
//! 面向“队列批量投递 → 按事件类型分发 → 逐条上报成败”的场景，提供：
//! - 入站数据模型（`message`）：批次 `InboundBatch` 与消息 `InboundMessage`；
//! - 事件信封（`envelope`）：从消息体中解析 `detail-type` 与负载，兼容双重编码；
//! - 事件类型（`event_type`）：封闭的已识别事件类型枚举；
//! - 处理器与注册表（`handler`、`registry`）：启动期一次性构建、运行期只读；
//! - 错误上报（`reporter`）：以能力接口注入的旁路观测通道；
//! - 批量结果（`result`）：`batchItemFailures` 形态的失败集合；
//! - 批量路由器（`router`，默认特性）：逐条隔离、并发处理并汇总结果。
//!
//! 典型用法：
//! 1. 为每个 `EventType` 实现 `EventHandler`，通过 `HandlerRegistry::builder()` 注册；
//! 2. 提供 `ErrorReporter` 实现（观测后端或测试替身）；
//! 3. 使用 `BatchRouter::builder()` 组装路由器，对每个入站批次调用 `process`；
//! 4. 将返回的 `BatchResult` 交回队列运行时，由其对失败消息进行重投。
//!
pub mod envelope;
pub mod error;
pub mod event_type;
pub mod handler;
pub mod message;
pub mod registry;
pub mod reporter;
pub mod result;
#[cfg(feature = "router")]
pub mod router;

pub use envelope::EventEnvelope;
pub use error::{EventError, EventResult};
pub use event_type::EventType;
pub use handler::{EventHandler, FnHandler, handler_fn};
pub use message::{InboundBatch, InboundMessage};
pub use registry::{HandlerRegistry, HandlerRegistryBuilder};
pub use reporter::{ErrorReport, ErrorReporter, FailureKind};
pub use result::{BatchItemFailure, BatchReport, BatchResult, MessageOutcome};
#[cfg(feature = "router")]
pub use router::{BatchRouter, RouterConfig};
