//! 入站批次与消息（InboundBatch / InboundMessage）
//!
//! 对应队列一次投递的线上形态：`{"Records": [{"messageId": "...", "body": "..."}]}`。
//! 传输层的其它字段（receiptHandle、attributes 等）原样保留在 `attributes` 中，
//! 处理器收到的始终是原始消息本身。
//!
use crate::{envelope::EventEnvelope, error::EventResult, result::BatchResult};
use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessage {
    /// 传输层消息 ID，批次内唯一，仅用于失败上报
    #[builder(into)]
    #[serde(default)]
    message_id: String,
    /// 原始消息体（JSON 字符串，可能为双重编码）
    #[builder(into)]
    #[serde(default)]
    body: String,
    /// 传输层附带的其它字段
    #[builder(default)]
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

impl InboundMessage {
    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// 解析消息体为事件信封
    pub fn envelope(&self) -> EventResult<EventEnvelope> {
        EventEnvelope::parse(&self.body)
    }
}

/// 一次投递的有序消息序列
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InboundBatch {
    #[serde(rename = "Records", default)]
    records: Vec<InboundMessage>,
}

impl InboundBatch {
    pub fn new(records: Vec<InboundMessage>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[InboundMessage] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 按上一轮批量结果筛出需要重投的消息（保持原顺序）
    pub fn redrive(&self, previous: &BatchResult) -> Self {
        self.records
            .iter()
            .filter(|m| previous.contains(m.message_id()))
            .cloned()
            .collect()
    }
}

impl FromIterator<InboundMessage> for InboundBatch {
    fn from_iter<I: IntoIterator<Item = InboundMessage>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_queue_records_and_keeps_transport_fields() {
        let raw = json!({
            "Records": [
                {
                    "messageId": "m-1",
                    "receiptHandle": "rh-1",
                    "body": "{\"detail-type\":\"ACCOUNT_DELETION\"}",
                    "attributes": {"ApproximateReceiveCount": "1"}
                }
            ]
        });
        let batch: InboundBatch = serde_json::from_value(raw).unwrap();
        assert_eq!(batch.len(), 1);

        let msg = &batch.records()[0];
        assert_eq!(msg.message_id(), "m-1");
        assert_eq!(msg.attributes()["receiptHandle"], json!("rh-1"));
        assert_eq!(
            serde_json::to_value(msg).unwrap()["receiptHandle"],
            json!("rh-1")
        );
    }

    #[test]
    fn missing_message_id_becomes_empty_instead_of_failing_the_batch() {
        let batch: InboundBatch =
            serde_json::from_value(json!({"Records": [{"body": "{}"}]})).unwrap();
        assert_eq!(batch.records()[0].message_id(), "");
    }

    #[test]
    fn redrive_keeps_only_previously_failed_messages_in_order() {
        let batch: InboundBatch = ["a", "b", "c"]
            .into_iter()
            .map(|id| InboundMessage::builder().message_id(id).body("{}").build())
            .collect();
        let previous = BatchResult::from_failed_ids(["c", "a"]);

        let again = batch.redrive(&previous);
        let ids: Vec<_> = again.records().iter().map(|m| m.message_id()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }
}
