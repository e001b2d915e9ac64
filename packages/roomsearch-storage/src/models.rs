use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row produced by a full-text query, before hydration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRow {
	pub event_id: String,
	/// Higher is more relevant. Always `0.0` for dialects without a ranking function.
	pub rank: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
	pub event_id: String,
	pub room_id: String,
	pub content: Value,
}
