use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use log::{debug, trace, warn};
use rand::Rng;
use tokio::sync::mpsc;
use tokio::time::{Instant, interval};

use crate::domain::oracle::HealthOracle;
use crate::domain::payment::Payment;
use crate::domain::retry::RetryEntry;

const BASE_DELAY_MS: u64 = 30;

fn backoff_delay(attempts: u32, max_backoff: Duration) -> Duration {
	let exponent = attempts.max(1) - 1;
	let base = BASE_DELAY_MS.saturating_mul(1u64 << exponent.min(20));
	let jitter = rand::thread_rng().gen_range(0..BASE_DELAY_MS);
	Duration::from_millis(base.saturating_add(jitter)).min(max_backoff)
}

struct HeapEntry(RetryEntry);

impl PartialEq for HeapEntry {
	fn eq(&self, other: &Self) -> bool {
		self.0.next_try == other.0.next_try
	}
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for HeapEntry {
	fn cmp(&self, other: &Self) -> Ordering {
		// BinaryHeap is a max-heap; reverse so the earliest next_try sorts first.
		other.0.next_try.cmp(&self.0.next_try)
	}
}

/// Binary min-heap of deferred retries, ordered by `next_try`.
#[derive(Default)]
pub struct RetryHeap {
	items: BinaryHeap<HeapEntry>,
}

impl RetryHeap {
	pub fn new() -> Self {
		Self { items: BinaryHeap::new() }
	}

	pub fn push(&mut self, entry: RetryEntry) {
		self.items.push(HeapEntry(entry));
	}

	pub fn peek(&self) -> Option<&RetryEntry> {
		self.items.peek().map(|e| &e.0)
	}

	pub fn pop(&mut self) -> Option<RetryEntry> {
		self.items.pop().map(|e| e.0)
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
}

/// Handle processor and integrity workers use to defer a failed payment.
/// Cloning shares the same mailbox into the retry worker task.
#[derive(Clone)]
pub struct RetryScheduler {
	schedule_tx: mpsc::Sender<RetryEntry>,
	max_backoff: Duration,
}

impl RetryScheduler {
	/// Computes `next_try` from the payment's current attempt count and
	/// enqueues the retry. Never blocks indefinitely: if the retry worker's
	/// mailbox is full the caller backpressures on the `await`, same as any
	/// other worker channel.
	pub async fn schedule(&self, sender: mpsc::Sender<Payment>, payment: Payment) {
		let delay = backoff_delay(payment.attempts, self.max_backoff);
		let entry = RetryEntry { sender, payment, next_try: Instant::now() + delay };
		if self.schedule_tx.send(entry).await.is_err() {
			warn!("retry worker mailbox closed, dropping scheduled retry");
		}
	}
}

/// Owns the retry heap and the fixed-cadence tick that drains it. Spawned
/// once; `RetryScheduler` handles are the only way in.
pub fn spawn<H>(
	health_oracle: H,
	retry_interval: Duration,
	max_backoff: Duration,
	mailbox_size: usize,
) -> RetryScheduler
where
	H: HealthOracle,
{
	let (schedule_tx, mut schedule_rx) = mpsc::channel::<RetryEntry>(mailbox_size);

	tokio::spawn(async move {
		let mut heap = RetryHeap::new();
		let mut ticker = interval(retry_interval);

		loop {
			tokio::select! {
				maybe_entry = schedule_rx.recv() => {
					match maybe_entry {
						Some(entry) => heap.push(entry),
						None => break,
					}
				}
				_ = ticker.tick() => {
					if !health_oracle.has_healthy_processors() {
						trace!("no healthy processor, retry tick is a no-op");
						continue;
					}

					let now = Instant::now();
					let mut drained = 0u32;

					while let Some(entry) = heap.peek() {
						if entry.next_try > now {
							break;
						}

						let mut entry = heap.pop().expect("peeked entry must pop");
						entry.payment.attempts += 1;
						drained += 1;

						if entry.sender.send(entry.payment).await.is_err() {
							warn!("processor worker mailbox gone, dropping retry");
						}
					}

					if drained > 0 {
						debug!("retry tick drained {drained} entries, {} remaining", heap.len());
					}
				}
			}
		}
	});

	RetryScheduler { schedule_tx, max_backoff }
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
	use std::sync::Arc;

	use rust_decimal::Decimal;
	use uuid::Uuid;

	use super::*;
	use crate::domain::error::DomainError;
	use crate::domain::payment::Processor;

	fn payment_with_attempts(attempts: u32) -> Payment {
		let mut p = Payment::new(Uuid::new_v4(), Decimal::new(100, 2));
		p.attempts = attempts;
		p
	}

	#[test]
	fn heap_pops_in_next_try_order() {
		let (tx, _rx) = mpsc::channel(1);
		let now = std::time::Instant::now();

		let mut heap = RetryHeap::new();
		heap.push(RetryEntry {
			sender: tx.clone(),
			payment: payment_with_attempts(1),
			next_try: Instant::from_std(now + Duration::from_millis(30)),
		});
		heap.push(RetryEntry {
			sender: tx.clone(),
			payment: payment_with_attempts(2),
			next_try: Instant::from_std(now + Duration::from_millis(10)),
		});
		heap.push(RetryEntry {
			sender: tx,
			payment: payment_with_attempts(3),
			next_try: Instant::from_std(now + Duration::from_millis(20)),
		});

		let first = heap.pop().unwrap();
		let second = heap.pop().unwrap();
		let third = heap.pop().unwrap();

		assert_eq!(first.payment.attempts, 2);
		assert_eq!(second.payment.attempts, 3);
		assert_eq!(third.payment.attempts, 1);
		assert!(heap.is_empty());
	}

	#[test]
	fn backoff_is_zero_jitter_deterministic_at_floor() {
		// With a max_backoff far above the base delay, attempts=1 always
		// lands in [30ms, 60ms) — the base plus at most one jitter unit.
		let delay = backoff_delay(1, Duration::from_secs(1));
		assert!(delay >= Duration::from_millis(30));
		assert!(delay < Duration::from_millis(60));
	}

	#[test]
	fn backoff_is_monotonic_and_capped() {
		let cap = Duration::from_millis(500);
		for attempts in 1..=10 {
			let delay = backoff_delay(attempts, cap);
			assert!(delay <= cap);
			let floor = Duration::from_millis(
				BASE_DELAY_MS.saturating_mul(1u64 << (attempts - 1).min(20)),
			)
			.min(cap);
			assert!(delay >= floor);
		}
	}

	struct StubOracle {
		healthy: AtomicBool,
	}

	impl HealthOracle for StubOracle {
		fn get_payment_processor(&self) -> Result<Processor, DomainError> {
			Err(DomainError::NoProcessorAvailable)
		}

		fn has_healthy_processors(&self) -> bool {
			self.healthy.load(AtomicOrdering::Relaxed)
		}
	}

	#[tokio::test]
	async fn tick_is_noop_while_no_processor_is_healthy() {
		let oracle = Arc::new(StubOracle { healthy: AtomicBool::new(false) });
		let scheduler = spawn(
			ArcOracle(oracle.clone()),
			Duration::from_millis(5),
			Duration::from_millis(500),
			16,
		);

		let (proc_tx, mut proc_rx) = mpsc::channel(4);
		scheduler.schedule(proc_tx, payment_with_attempts(1)).await;

		tokio::time::sleep(Duration::from_millis(40)).await;
		assert!(proc_rx.try_recv().is_err());
	}

	#[tokio::test]
	async fn due_entry_drains_with_incremented_attempts() {
		let oracle = Arc::new(StubOracle { healthy: AtomicBool::new(true) });
		let scheduler = spawn(
			ArcOracle(oracle),
			Duration::from_millis(5),
			Duration::from_millis(50),
			16,
		);

		let (proc_tx, mut proc_rx) = mpsc::channel(4);
		scheduler.schedule(proc_tx, payment_with_attempts(1)).await;

		let redelivered = tokio::time::timeout(Duration::from_millis(500), proc_rx.recv())
			.await
			.expect("retry tick should redeliver")
			.expect("channel open");

		assert_eq!(redelivered.attempts, 2);
	}

	#[derive(Clone)]
	struct ArcOracle(Arc<StubOracle>);

	impl HealthOracle for ArcOracle {
		fn get_payment_processor(&self) -> Result<Processor, DomainError> {
			self.0.get_payment_processor()
		}

		fn has_healthy_processors(&self) -> bool {
			self.0.has_healthy_processors()
		}
	}
}
