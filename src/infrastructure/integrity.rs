use std::time::Duration;

use log::{debug, error, warn};
use reqwest::Client;
use time::OffsetDateTime;
use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::domain::payment::{Payment, Processor, StoredRecord};
use crate::domain::repository::PaymentRepository;

/// A payment whose outbound POST timed out. The processor it was sent to
/// must be re-asked directly rather than re-derived from the health
/// oracle, since by the time the integrity worker gets to it routing may
/// have moved on to the other processor.
pub struct IntegrityCheck {
	pub payment:   Payment,
	pub processor: Processor,
}

/// Floor delay before a self-requeue. The integrity path is rare and
/// low-volume by construction; this only bounds busy-looping during a
/// prolonged processor outage, it does not change correctness.
const SELF_REQUEUE_FLOOR: Duration = Duration::from_millis(100);

/// Runs the single integrity-worker shard. Asks the processor directly
/// whether a timed-out payment was in fact accepted; on anything other
/// than a confirming 200, requeues itself to ask again.
pub async fn run<R>(
	mut inbox: mpsc::Receiver<IntegrityCheck>,
	self_sender: mpsc::Sender<IntegrityCheck>,
	http_client: Client,
	default_url: String,
	fallback_url: String,
	repository: R,
) where
	R: PaymentRepository,
{
	while let Some(check) = inbox.recv().await {
		let base_url = match check.processor {
			Processor::Default => default_url.as_str(),
			Processor::Fallback => fallback_url.as_str(),
		};

		let url = format!("{base_url}/payments/{}", check.payment.correlation_id);
		let response = http_client.get(&url).send().await;

		match response {
			Ok(resp) if resp.status().is_success() => {
				debug!(
					"integrity check confirmed acceptance of {} by {}",
					check.payment.correlation_id, check.processor
				);
				let requested_at = check.payment.requested_at.unwrap_or_else(OffsetDateTime::now_utc);
				let record = StoredRecord {
					correlation_id: check.payment.correlation_id,
					amount:         check.payment.amount,
					requested_at,
					processed_by:   check.processor,
				};
				if let Err(e) = repository.append(record).await {
					error!(
						"failed to persist integrity-confirmed payment {}: {e}",
						check.payment.correlation_id
					);
				}
			}
			Ok(resp) => {
				debug!(
					"integrity check for {} still inconclusive (status {}), requeuing",
					check.payment.correlation_id,
					resp.status()
				);
				requeue(&self_sender, check).await;
			}
			Err(e) => {
				warn!(
					"integrity check for {} failed: {e}, requeuing",
					check.payment.correlation_id
				);
				requeue(&self_sender, check).await;
			}
		}
	}
}

async fn requeue(self_sender: &mpsc::Sender<IntegrityCheck>, check: IntegrityCheck) {
	sleep(SELF_REQUEUE_FLOOR).await;
	if self_sender.send(check).await.is_err() {
		error!("integrity worker mailbox gone, payment outcome unresolved");
	}
}
