use rust_decimal::Decimal;
use time::OffsetDateTime;
use uuid::Uuid;

/// A payment in flight. `requested_at` is only set once a processor worker
/// actually dispatches the outbound call (stamped at attempt time, not
/// ingress time); it stays `None` while a payment sits in the retry heap
/// between attempts. `attempts` starts at 0 and is bumped by the processor
/// worker when it schedules a retry after a failed attempt, and again by
/// the retry worker when it hands the payment back for redelivery.
#[derive(Debug, Clone)]
pub struct Payment {
	pub correlation_id: Uuid,
	pub amount:         Decimal,
	pub requested_at:   Option<OffsetDateTime>,
	pub attempts:       u32,
}

impl Payment {
	pub fn new(correlation_id: Uuid, amount: Decimal) -> Self {
		Self {
			correlation_id,
			amount,
			requested_at: None,
			attempts: 0,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Processor {
	Default,
	Fallback,
}

impl Processor {
	pub fn as_str(&self) -> &'static str {
		match self {
			Processor::Default => "default",
			Processor::Fallback => "fallback",
		}
	}
}

impl std::fmt::Display for Processor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for Processor {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"default" => Ok(Processor::Default),
			"fallback" => Ok(Processor::Fallback),
			_ => Err(()),
		}
	}
}

/// A payment the store has durably accepted. Only created after a 200 from
/// the processor, or an integrity-worker confirmation.
#[derive(Debug, Clone)]
pub struct StoredRecord {
	pub correlation_id: Uuid,
	pub amount:         Decimal,
	pub requested_at:   OffsetDateTime,
	pub processed_by:   Processor,
}
