//! 已识别事件类型（EventType）
//!
//! 队列可能投递本服务尚不理解的事件类型，因此未知标签不是错误，
//! 由 `parse` 返回 `None` 交给路由器按“无处理器”处理。
//!
use std::fmt;

/// 封闭的事件类型枚举，每个变体在注册表中至多对应一个处理器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventType {
    /// 用户注销账户，需要清理其批注数据
    AccountDeletion,
}

impl EventType {
    /// 全部已识别类型，用于启动期穷举注册
    pub const ALL: &'static [EventType] = &[EventType::AccountDeletion];

    /// 线上 `detail-type` 标签
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::AccountDeletion => "ACCOUNT_DELETION",
        }
    }

    /// 解析 `detail-type` 标签，未识别时返回 `None`
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "ACCOUNT_DELETION" => Some(EventType::AccountDeletion),
            _ => None,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
