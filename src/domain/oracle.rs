use crate::domain::error::DomainError;
use crate::domain::payment::Processor;

/// Read contract consumed by the processor and retry workers. Implemented
/// by `infrastructure::health_oracle::RedisHealthOracle`; the publisher and
/// subscriber loops that keep it up to date live alongside that
/// implementation, not behind this trait, since only readers need to be
/// generic over the oracle.
pub trait HealthOracle: Send + Sync + 'static {
	/// The processor new traffic should be routed to right now, or
	/// `NoProcessorAvailable` while the state is `waiting`, `none`, or not
	/// yet initialised.
	fn get_payment_processor(&self) -> Result<Processor, DomainError>;

	/// `true` unless the state is `none`. Unlike `get_payment_processor`,
	/// this reports `waiting` as healthy — it gates the retry tick, not new
	/// submissions.
	fn has_healthy_processors(&self) -> bool;
}
