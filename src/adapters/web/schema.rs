use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PaymentRequest {
	#[serde(rename = "correlationId")]
	pub correlation_id: Uuid,
	pub amount:         Decimal,
}

/// Raw query strings, not yet parsed into timestamps: an unparsable value
/// is treated as absent rather than rejecting the request (§6), so parsing
/// happens in the handler where a failure can fall back to `None` instead
/// of surfacing a 400.
#[derive(Debug, Deserialize)]
pub struct PaymentsSummaryFilter {
	pub from: Option<String>,
	pub to:   Option<String>,
}
