use std::time::Duration;

use log::{debug, error, warn};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::mpsc;

use crate::domain::error::DomainError;
use crate::domain::oracle::HealthOracle;
use crate::domain::payment::{Payment, Processor, StoredRecord};
use crate::domain::repository::PaymentRepository;
use crate::infrastructure::integrity::IntegrityCheck;
use crate::infrastructure::pool::ShardedPool;
use crate::infrastructure::retry::RetryScheduler;

#[derive(Serialize)]
struct PaymentWireRequest {
	#[serde(rename = "correlationId")]
	correlation_id: uuid::Uuid,
	amount:         Decimal,
	#[serde(rename = "requestedAt")]
	requested_at:   String,
}

fn processor_base_url(processor: Processor, default_url: &str, fallback_url: &str) -> String {
	match processor {
		Processor::Default => default_url.to_string(),
		Processor::Fallback => fallback_url.to_string(),
	}
}

enum Outcome {
	Persisted,
	Duplicate,
	Ambiguous,
	Retryable,
}

async fn attempt(
	http_client: &Client,
	base_url: &str,
	payment: &Payment,
	requested_at: OffsetDateTime,
) -> Outcome {
	let body = PaymentWireRequest {
		correlation_id: payment.correlation_id,
		amount:         payment.amount,
		requested_at:   requested_at
			.format(&Rfc3339)
			.unwrap_or_else(|_| requested_at.to_string()),
	};

	let response = http_client
		.post(format!("{base_url}/payments"))
		.json(&body)
		.send()
		.await;

	match response {
		Ok(resp) if resp.status().is_success() => Outcome::Persisted,
		Ok(resp) if resp.status() == reqwest::StatusCode::UNPROCESSABLE_ENTITY => {
			Outcome::Duplicate
		}
		Ok(resp) => {
			warn!(
				"processor {base_url} returned {} for {}",
				resp.status(),
				payment.correlation_id
			);
			Outcome::Retryable
		}
		Err(e) if e.is_timeout() => {
			warn!("processor {base_url} timed out for {}", payment.correlation_id);
			Outcome::Ambiguous
		}
		Err(e) => {
			warn!("processor {base_url} call failed for {}: {e}", payment.correlation_id);
			Outcome::Retryable
		}
	}
}

/// Runs one processor-pool shard: pulls payments off its mailbox, asks the
/// health oracle who to call, POSTs, and routes the outcome onward. `self_sender`
/// is this worker's own mailbox handle, threaded through the retry scheduler
/// so redelivered payments land back on the same shard.
pub async fn run<H, R>(
	mut inbox: mpsc::Receiver<Payment>,
	self_sender: mpsc::Sender<Payment>,
	http_client: Client,
	default_url: String,
	fallback_url: String,
	health_oracle: H,
	repository: R,
	retry_scheduler: RetryScheduler,
	integrity_pool: ShardedPool<IntegrityCheck>,
) where
	H: HealthOracle,
	R: PaymentRepository,
{
	while let Some(mut payment) = inbox.recv().await {
		let processor = match health_oracle.get_payment_processor() {
			Ok(p) => p,
			Err(DomainError::NoProcessorAvailable) => {
				// No attempt was made; the payment goes back into the heap
				// unchanged and is re-dispatched once a processor is healthy.
				retry_scheduler.schedule(self_sender.clone(), payment).await;
				continue;
			}
			Err(e) => {
				error!("unexpected health oracle error: {e}");
				retry_scheduler.schedule(self_sender.clone(), payment).await;
				continue;
			}
		};

		let base_url = processor_base_url(processor, &default_url, &fallback_url);
		let requested_at = OffsetDateTime::now_utc();
		payment.requested_at = Some(requested_at);

		match attempt(&http_client, &base_url, &payment, requested_at).await {
			Outcome::Persisted => {
				debug!("payment {} accepted by {processor}", payment.correlation_id);
				let record = StoredRecord {
					correlation_id: payment.correlation_id,
					amount:         payment.amount,
					requested_at,
					processed_by:   processor,
				};
				if let Err(e) = repository.append(record).await {
					error!("failed to persist payment {}: {e}", payment.correlation_id);
				}
			}
			Outcome::Duplicate => {
				debug!(
					"payment {} already accepted by {processor} (422)",
					payment.correlation_id
				);
			}
			Outcome::Ambiguous => {
				warn!(
					"payment {} ambiguous after timeout against {processor}, handing to integrity worker",
					payment.correlation_id
				);
				let correlation_id = payment.correlation_id;
				let check = IntegrityCheck { payment, processor };
				if integrity_pool.dispatch(&correlation_id, check).await.is_err() {
					error!("integrity worker mailbox gone, payment outcome unresolved");
				}
			}
			Outcome::Retryable => {
				retry_scheduler
					.schedule(self_sender.clone(), bump_attempts(payment))
					.await;
			}
		}
	}
}

fn bump_attempts(mut payment: Payment) -> Payment {
	payment.attempts += 1;
	payment
}
