use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::domain::dispatcher::PaymentDispatcher;
use crate::domain::error::DomainError;
use crate::domain::payment::Payment;

const FNV_OFFSET_BASIS: u32 = 0x811c9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a over a correlation id's canonical string form, matching
/// the original pool's `hash/fnv New32a()` so shard assignment is stable
/// across processes and languages, not just within one run.
fn fnv1a32(bytes: &[u8]) -> u32 {
	let mut hash = FNV_OFFSET_BASIS;
	for &b in bytes {
		hash ^= b as u32;
		hash = hash.wrapping_mul(FNV_PRIME);
	}
	hash
}

pub fn shard_for(correlation_id: &Uuid, shard_count: usize) -> usize {
	let hash = fnv1a32(correlation_id.to_string().as_bytes());
	(hash as usize) % shard_count
}

/// A fixed set of bounded mailboxes, one per shard. Routing by correlation
/// id hash guarantees every message for a given id lands on the same
/// mailbox, so a single worker ever owns that id's in-flight state.
#[derive(Clone)]
pub struct ShardedPool<T> {
	senders: std::sync::Arc<Vec<mpsc::Sender<T>>>,
}

impl<T: Send + 'static> ShardedPool<T> {
	/// Creates `shard_count` bounded channels and returns the pool handle
	/// alongside the receiving end of each — callers spawn one worker task
	/// per receiver with whatever loop fits that pool's job.
	pub fn new(shard_count: usize, mailbox_size: usize) -> (Self, Vec<mpsc::Receiver<T>>) {
		let mut senders = Vec::with_capacity(shard_count);
		let mut receivers = Vec::with_capacity(shard_count);

		for _ in 0..shard_count {
			let (tx, rx) = mpsc::channel(mailbox_size);
			senders.push(tx);
			receivers.push(rx);
		}

		(Self { senders: std::sync::Arc::new(senders) }, receivers)
	}

	pub fn sender_for(&self, correlation_id: &Uuid) -> mpsc::Sender<T> {
		let index = shard_for(correlation_id, self.senders.len());
		self.senders[index].clone()
	}

	/// The mailbox for shard `index`, used at startup to hand each worker
	/// task its own sending half (so retries and other self-addressed
	/// sends preserve shard affinity without re-hashing).
	pub fn sender_at(&self, index: usize) -> mpsc::Sender<T> {
		self.senders[index].clone()
	}

	pub fn shard_count(&self) -> usize {
		self.senders.len()
	}

	pub async fn dispatch(
		&self,
		correlation_id: &Uuid,
		message: T,
	) -> Result<(), mpsc::error::SendError<T>> {
		self.sender_for(correlation_id).send(message).await
	}
}

/// The ingress seam: routing a payment to its shard IS the dispatch
/// contract the sharded processor pool satisfies for `create_payment`.
#[async_trait]
impl PaymentDispatcher for ShardedPool<Payment> {
	async fn dispatch(&self, payment: Payment) -> Result<(), DomainError> {
		let correlation_id = payment.correlation_id;
		self.dispatch(&correlation_id, payment)
			.await
			.map_err(|_| DomainError::DispatchFailed)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn same_correlation_id_always_hashes_to_same_shard() {
		let id = Uuid::new_v4();
		let first = shard_for(&id, 30);
		for _ in 0..100 {
			assert_eq!(shard_for(&id, 30), first);
		}
	}

	#[test]
	fn shard_index_is_always_in_range() {
		for _ in 0..1000 {
			let id = Uuid::new_v4();
			assert!(shard_for(&id, 7) < 7);
		}
	}

	#[test]
	fn fnv1a32_matches_known_vector() {
		// "a" under 32-bit FNV-1a is a well-known reference value.
		assert_eq!(fnv1a32(b"a"), 0xe40c_292c);
	}

	#[tokio::test]
	async fn dispatch_delivers_to_the_shard_for_that_id() {
		let (pool, mut receivers) = ShardedPool::<u32>::new(4, 8);
		let id = Uuid::new_v4();
		let target = shard_for(&id, 4);

		pool.dispatch(&id, 42).await.expect("mailbox open");

		let received = receivers[target].try_recv().expect("message delivered");
		assert_eq!(received, 42);

		for (i, rx) in receivers.iter_mut().enumerate() {
			if i != target {
				assert!(rx.try_recv().is_err());
			}
		}
	}
}
