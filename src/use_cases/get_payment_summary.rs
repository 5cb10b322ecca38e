use std::collections::HashSet;

use crate::domain::error::DomainError;
use crate::domain::payment::Processor;
use crate::domain::repository::PaymentRepository;
use crate::use_cases::dto::{
	GetPaymentSummaryQuery, PaymentSummaryResult, PaymentsSummaryResponse,
};

/// Aggregates stored records into per-processor totals. Filtering and
/// deduplication happen here, at read time, rather than in the store: the
/// store contract only guarantees append/scan/purge (§6), so the caller
/// owns the window filter and the first-occurrence-wins dedup (S6).
#[derive(Clone)]
pub struct GetPaymentSummaryUseCase<R: PaymentRepository> {
	payment_repo: R,
}

impl<R: PaymentRepository> GetPaymentSummaryUseCase<R> {
	pub fn new(payment_repo: R) -> Self {
		Self { payment_repo }
	}

	pub async fn execute(
		&self,
		query: GetPaymentSummaryQuery,
	) -> Result<PaymentsSummaryResponse, DomainError> {
		let records = self.payment_repo.scan_all().await?;

		let mut seen = HashSet::new();
		let mut default = PaymentSummaryResult::default();
		let mut fallback = PaymentSummaryResult::default();

		for record in records {
			if let Some(from) = query.from {
				if record.requested_at < from {
					continue;
				}
			}
			if let Some(to) = query.to {
				if record.requested_at > to {
					continue;
				}
			}

			if !seen.insert(record.correlation_id) {
				continue;
			}

			let bucket = match record.processed_by {
				Processor::Default => &mut default,
				Processor::Fallback => &mut fallback,
			};
			bucket.total_requests += 1;
			bucket.total_amount += record.amount;
		}

		Ok(PaymentsSummaryResponse { default, fallback })
	}
}

#[cfg(test)]
mod tests {
	use async_trait::async_trait;
	use rust_decimal::Decimal;
	use time::OffsetDateTime;
	use uuid::Uuid;

	use super::*;
	use crate::domain::payment::StoredRecord;

	#[derive(Clone)]
	struct FixedRepository {
		records: Vec<StoredRecord>,
	}

	#[async_trait]
	impl PaymentRepository for FixedRepository {
		async fn append(&self, _record: StoredRecord) -> Result<(), DomainError> {
			Ok(())
		}

		async fn scan_all(&self) -> Result<Vec<StoredRecord>, DomainError> {
			Ok(self.records.clone())
		}

		async fn purge(&self) -> Result<(), DomainError> {
			Ok(())
		}
	}

	fn record(processed_by: Processor, amount: &str, id: Uuid, at: OffsetDateTime) -> StoredRecord {
		StoredRecord {
			correlation_id: id,
			amount: amount.parse().unwrap(),
			requested_at: at,
			processed_by,
		}
	}

	#[tokio::test]
	async fn sums_totals_per_processor() {
		let now = OffsetDateTime::now_utc();
		let repo = FixedRepository {
			records: vec![
				record(Processor::Default, "10.00", Uuid::new_v4(), now),
				record(Processor::Default, "5.50", Uuid::new_v4(), now),
				record(Processor::Fallback, "2.25", Uuid::new_v4(), now),
			],
		};

		let result = GetPaymentSummaryUseCase::new(repo)
			.execute(GetPaymentSummaryQuery::default())
			.await
			.unwrap();

		assert_eq!(result.default.total_requests, 2);
		assert_eq!(result.default.total_amount, Decimal::new(1550, 2));
		assert_eq!(result.fallback.total_requests, 1);
		assert_eq!(result.fallback.total_amount, Decimal::new(225, 2));
	}

	#[tokio::test]
	async fn duplicate_correlation_ids_count_once_first_occurrence_wins() {
		let now = OffsetDateTime::now_utc();
		let id = Uuid::new_v4();
		let repo = FixedRepository {
			records: vec![
				record(Processor::Default, "10.00", id, now),
				record(Processor::Default, "10.00", id, now),
			],
		};

		let result = GetPaymentSummaryUseCase::new(repo)
			.execute(GetPaymentSummaryQuery::default())
			.await
			.unwrap();

		assert_eq!(result.default.total_requests, 1);
		assert_eq!(result.default.total_amount, Decimal::new(1000, 2));
	}

	#[tokio::test]
	async fn window_excludes_records_outside_from_to() {
		let now = OffsetDateTime::now_utc();
		let earlier = now - time::Duration::hours(1);
		let later = now + time::Duration::hours(1);
		let repo = FixedRepository {
			records: vec![
				record(Processor::Default, "1.00", Uuid::new_v4(), earlier),
				record(Processor::Default, "2.00", Uuid::new_v4(), now),
				record(Processor::Default, "3.00", Uuid::new_v4(), later),
			],
		};

		let result = GetPaymentSummaryUseCase::new(repo)
			.execute(GetPaymentSummaryQuery { from: Some(now), to: Some(now) })
			.await
			.unwrap();

		assert_eq!(result.default.total_requests, 1);
		assert_eq!(result.default.total_amount, Decimal::new(200, 2));
	}
}
