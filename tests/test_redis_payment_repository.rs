use payment_gateway::domain::payment::{Processor, StoredRecord};
use payment_gateway::domain::repository::PaymentRepository;
use payment_gateway::infrastructure::persistence::RedisPaymentRepository;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use uuid::Uuid;

#[path = "support/mod.rs"]
mod support;

use support::redis_container::start_redis;

fn sample(processed_by: Processor) -> StoredRecord {
	StoredRecord {
		correlation_id: Uuid::new_v4(),
		amount: Decimal::new(12345, 2),
		requested_at: OffsetDateTime::now_utc(),
		processed_by,
	}
}

#[tokio::test]
async fn append_then_scan_all_returns_the_record() {
	let redis = start_redis().await;
	let repo = RedisPaymentRepository::new(redis.client.clone());

	let record = sample(Processor::Default);
	repo.append(record.clone()).await.expect("append succeeds");

	let records = repo.scan_all().await.expect("scan succeeds");
	assert_eq!(records.len(), 1);
	assert_eq!(records[0].correlation_id, record.correlation_id);
	assert_eq!(records[0].amount, record.amount);
	assert_eq!(records[0].processed_by, record.processed_by);
}

#[tokio::test]
async fn purge_empties_the_store() {
	let redis = start_redis().await;
	let repo = RedisPaymentRepository::new(redis.client.clone());

	repo.append(sample(Processor::Default)).await.expect("append succeeds");
	repo.append(sample(Processor::Fallback)).await.expect("append succeeds");
	assert_eq!(repo.scan_all().await.unwrap().len(), 2);

	repo.purge().await.expect("purge succeeds");
	assert!(repo.scan_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn appends_preserve_insertion_order() {
	let redis = start_redis().await;
	let repo = RedisPaymentRepository::new(redis.client.clone());

	let first = sample(Processor::Default);
	let second = sample(Processor::Fallback);
	repo.append(first.clone()).await.unwrap();
	repo.append(second.clone()).await.unwrap();

	let records = repo.scan_all().await.unwrap();
	assert_eq!(records[0].correlation_id, first.correlation_id);
	assert_eq!(records[1].correlation_id, second.correlation_id);
}
