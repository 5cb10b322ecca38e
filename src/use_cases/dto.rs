use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CreatePaymentCommand {
	pub correlation_id: Uuid,
	pub amount:         Decimal,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GetPaymentSummaryQuery {
	pub from: Option<time::OffsetDateTime>,
	pub to:   Option<time::OffsetDateTime>,
}

#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq)]
pub struct PaymentSummaryResult {
	#[serde(rename = "totalRequests")]
	pub total_requests: u64,
	#[serde(rename = "totalAmount")]
	pub total_amount:   Decimal,
}

#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq)]
pub struct PaymentsSummaryResponse {
	pub default:  PaymentSummaryResult,
	pub fallback: PaymentSummaryResult,
}
