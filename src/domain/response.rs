use std::collections::BTreeMap;

use crate::domain::value::CustomId;

/// Result for one request of a batch (`ResponseRequest`).
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseRecord {
    pub request_id: u64,
    pub sms_count: u32,
    pub sms_price: f64,
    pub custom_id: Option<CustomId>,
    /// Document-level status code; the gateway reports a single status per batch.
    pub status_code: i32,
    /// Numbers as echoed by the gateway, in request order.
    pub numbers: Vec<String>,
}

/// Decoded reply to a batch send.
#[derive(Debug, Clone, PartialEq)]
pub struct SendResponse {
    pub status_code: i32,
    /// Records keyed by gateway request id. A repeated id keeps the last record.
    pub requests: BTreeMap<u64, ResponseRecord>,
}

impl SendResponse {
    /// Look up the record echoing `custom_id`.
    pub fn by_custom_id(&self, custom_id: CustomId) -> Option<&ResponseRecord> {
        self.requests
            .values()
            .find(|record| record.custom_id == Some(custom_id))
    }

    /// Total number of SMS parts billed for the batch.
    pub fn total_sms_count(&self) -> u64 {
        self.requests
            .values()
            .map(|record| u64::from(record.sms_count))
            .sum()
    }
}
