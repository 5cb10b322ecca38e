use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::domain::payment::Payment;

/// A deferred retry, ordered by `next_try`. `sender` is the specific
/// processor-worker mailbox that scheduled the retry — the retry worker
/// sends back to it, preserving shard affinity instead of re-hashing the
/// correlation id.
#[derive(Clone)]
pub struct RetryEntry {
	pub sender:   mpsc::Sender<Payment>,
	pub payment:  Payment,
	pub next_try: Instant,
}
