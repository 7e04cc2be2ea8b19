//! 事件信封（EventEnvelope）
//!
//! 消息体解析后的标准形态：`{"detail-type": "...", ...payload}`。
//! 经由主题扇出到队列的消息会被再包一层：外层对象的 `Message` 字段是内层信封的
//! JSON 字符串，解析时自动拆除这一层。
//!
use crate::error::{EventError, EventResult};
use serde_json::Value;

/// 事件类型标签字段
pub const DETAIL_TYPE_FIELD: &str = "detail-type";
/// 外层包装中承载内层信封的字段
pub const WRAPPED_MESSAGE_FIELD: &str = "Message";
/// 缺失 `detail-type` 时的展示值
pub const MISSING_DETAIL_TYPE: &str = "undefined";

#[derive(Debug, Clone, PartialEq)]
pub struct EventEnvelope {
    detail_type: String,
    tagged: bool,
    payload: Value,
}

impl EventEnvelope {
    /// 从消息体字符串解析信封
    ///
    /// 只有消息体（或被包装的 `Message`）不是合法 JSON 时才返回 `MalformedEnvelope`；
    /// 缺失或非字符串的 `detail-type` 照常产出信封，交由路由按未知类型处理。
    pub fn parse(body: &str) -> EventResult<Self> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| EventError::malformed(format!("body is not valid JSON: {e}")))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> EventResult<Self> {
        let value = unwrap_message(value)?;
        let (detail_type, tagged) = match value.get(DETAIL_TYPE_FIELD) {
            Some(Value::String(tag)) => (tag.clone(), true),
            None => (MISSING_DETAIL_TYPE.to_string(), false),
            Some(other) => (other.to_string(), false),
        };

        Ok(Self {
            detail_type,
            tagged,
            payload: value,
        })
    }

    /// `detail-type` 的展示形式：字符串原样返回，缺失为 `undefined`，
    /// 其它取值为其 JSON 文本
    pub fn detail_type(&self) -> &str {
        &self.detail_type
    }

    /// 字符串形态的 `detail-type`，只有它能匹配到处理器
    pub fn tag(&self) -> Option<&str> {
        self.tagged.then_some(self.detail_type.as_str())
    }

    /// 完整的内层信封对象（含 `detail-type`）
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// 事件明细（`detail` 字段），不存在时为 `None`
    pub fn detail(&self) -> Option<&Value> {
        self.payload.get("detail")
    }
}

// 仅拆一层：外层不带 `detail-type` 且 `Message` 为字符串时视为包装
fn unwrap_message(value: Value) -> EventResult<Value> {
    let inner = match &value {
        Value::Object(map) if !map.contains_key(DETAIL_TYPE_FIELD) => {
            match map.get(WRAPPED_MESSAGE_FIELD) {
                Some(Value::String(raw)) => Some(raw),
                _ => None,
            }
        }
        _ => None,
    };

    match inner {
        Some(raw) => serde_json::from_str(raw).map_err(|e| {
            EventError::malformed(format!("{WRAPPED_MESSAGE_FIELD} is not valid JSON: {e}"))
        }),
        None => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wrapped(inner: Value) -> String {
        json!({ "Message": inner.to_string() }).to_string()
    }

    #[test]
    fn parses_plain_envelope() {
        let env = EventEnvelope::parse(
            &json!({"detail-type": "ACCOUNT_DELETION", "detail": {"userId": "1"}}).to_string(),
        )
        .unwrap();
        assert_eq!(env.detail_type(), "ACCOUNT_DELETION");
        assert_eq!(env.detail().unwrap()["userId"], json!("1"));
    }

    #[test]
    fn unwraps_double_encoded_message() {
        let body = wrapped(json!({"detail-type": "ACCOUNT_DELETION", "source": "user-events"}));
        let env = EventEnvelope::parse(&body).unwrap();
        assert_eq!(env.detail_type(), "ACCOUNT_DELETION");
        assert_eq!(env.payload()["source"], json!("user-events"));
    }

    #[test]
    fn keeps_unknown_tags_for_the_router_to_decide() {
        let env = EventEnvelope::parse(&wrapped(json!({"detail-type": "NOT_A_TYPE"}))).unwrap();
        assert_eq!(env.detail_type(), "NOT_A_TYPE");
        assert_eq!(env.tag(), Some("NOT_A_TYPE"));
    }

    #[test]
    fn untagged_envelopes_render_the_raw_detail_type() {
        let cases = [
            (json!({"detail": {}}).to_string(), "undefined"),
            (wrapped(json!({"detail": {}})), "undefined"),
            (json!({"detail-type": 7}).to_string(), "7"),
            (wrapped(json!({"detail-type": null})), "null"),
            ("[1, 2]".to_string(), "undefined"),
        ];
        for (body, rendered) in cases {
            let env = EventEnvelope::parse(&body).unwrap();
            assert_eq!(env.detail_type(), rendered, "body={body}");
            assert_eq!(env.tag(), None);
        }
    }

    #[test]
    fn rejects_bodies_that_are_not_json() {
        for body in ["not json".to_string(), json!({"Message": "{broken"}).to_string()] {
            let err = EventEnvelope::parse(&body).unwrap_err();
            assert!(
                matches!(err, EventError::MalformedEnvelope { .. }),
                "body={body} err={err:?}"
            );
        }
    }
}
