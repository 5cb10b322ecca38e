use async_trait::async_trait;
use redis::AsyncCommands;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::domain::error::{DomainError, StoreError};
use crate::domain::payment::{Processor, StoredRecord};
use crate::domain::repository::PaymentRepository;

const PAYMENTS_KEY: &str = "payments:all";

fn serialize(record: &StoredRecord) -> Result<String, DomainError> {
	let requested_at = record
		.requested_at
		.format(&Rfc3339)
		.map_err(|e| StoreError::Serialization(e.to_string()))?;

	Ok(format!(
		"{}|{}|{}|{}",
		record.correlation_id,
		record.amount.normalize(),
		requested_at,
		record.processed_by
	))
}

fn deserialize(line: &str) -> Option<StoredRecord> {
	let mut parts = line.splitn(4, '|');
	let correlation_id = parts.next()?.parse().ok()?;
	let amount: Decimal = parts.next()?.parse().ok()?;
	let requested_at = OffsetDateTime::parse(parts.next()?, &Rfc3339).ok()?;
	let processed_by: Processor = parts.next()?.parse().ok()?;

	Some(StoredRecord { correlation_id, amount, requested_at, processed_by })
}

/// Append-only store over a single Redis list (`payments:all`), matching
/// the bit-exact pipe-delimited record format external tooling expects.
/// Summary filtering/dedup happens at read time in the caller, not here —
/// this type is a thin transport over the list.
#[derive(Clone)]
pub struct RedisPaymentRepository {
	client: redis::Client,
}

impl RedisPaymentRepository {
	pub fn new(client: redis::Client) -> Self {
		Self { client }
	}

	async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, DomainError> {
		self.client
			.get_multiplexed_async_connection()
			.await
			.map_err(|e| StoreError::Connection(e.to_string()).into())
	}
}

#[async_trait]
impl PaymentRepository for RedisPaymentRepository {
	async fn append(&self, record: StoredRecord) -> Result<(), DomainError> {
		let line = serialize(&record)?;
		let mut conn = self.connection().await?;
		let _: () = conn
			.rpush(PAYMENTS_KEY, line)
			.await
			.map_err(|e| StoreError::Connection(e.to_string()))?;
		Ok(())
	}

	async fn scan_all(&self) -> Result<Vec<StoredRecord>, DomainError> {
		let mut conn = self.connection().await?;
		let lines: Vec<String> = conn
			.lrange(PAYMENTS_KEY, 0, -1)
			.await
			.map_err(|e| StoreError::Connection(e.to_string()))?;

		Ok(lines.iter().filter_map(|line| deserialize(line)).collect())
	}

	async fn purge(&self) -> Result<(), DomainError> {
		let mut conn = self.connection().await?;
		let _: () = conn
			.del(PAYMENTS_KEY)
			.await
			.map_err(|e| StoreError::Connection(e.to_string()))?;
		Ok(())
	}
}
