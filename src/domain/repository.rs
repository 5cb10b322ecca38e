use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::payment::StoredRecord;

/// Append-only persistence of accepted payments, a full scan for the
/// summary use case to filter/dedup over, and purge. Concurrency of the
/// store itself is the store's problem, not the caller's.
#[async_trait]
pub trait PaymentRepository: Send + Sync + Clone + 'static {
	async fn append(&self, record: StoredRecord) -> Result<(), DomainError>;

	/// All records ever appended, oldest first. The summary use case
	/// filters by `requested_at` window and deduplicates by correlation id,
	/// first occurrence wins.
	async fn scan_all(&self) -> Result<Vec<StoredRecord>, DomainError>;

	async fn purge(&self) -> Result<(), DomainError>;
}
