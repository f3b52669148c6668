//! Queue-level summary types.

use serde::{Deserialize, Serialize};

use super::ids::QueueId;

/// Summary of one queue, as used by list views and admin eligibility checks.
///
/// `waiting_count` is the authoritative count of people currently waiting;
/// `max_capacity` is advisory and takes no part in eligibility checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSummary {
    pub queue_id: QueueId,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    pub waiting_count: u32,
    pub max_capacity: u32,
    pub average_service_time_minutes: f64,
}

/// Payload for the pass-through admin create/update operations.
///
/// These carry no reconciliation logic of their own; the backend owns the
/// resulting state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u32,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_max_capacity() -> u32 {
    100
}

fn default_is_active() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_uses_camel_case_fields() {
        let summary = QueueSummary {
            queue_id: QueueId::new("q-1"),
            name: "Pharmacy".to_string(),
            description: "Prescription pickup".to_string(),
            is_active: true,
            waiting_count: 7,
            max_capacity: 100,
            average_service_time_minutes: 5.0,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["queueId"], "q-1");
        assert_eq!(json["waitingCount"], 7);
        assert_eq!(json["isActive"], true);
    }

    #[test]
    fn config_defaults_apply_on_sparse_input() {
        let config: QueueConfig = serde_json::from_str(r#"{"name": "Deli"}"#).unwrap();
        assert_eq!(config.max_capacity, 100);
        assert!(config.is_active);
        assert!(config.description.is_empty());
    }
}
