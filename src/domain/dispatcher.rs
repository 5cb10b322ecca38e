use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::payment::Payment;

/// The ingress-facing seam over the sharded processor pool. `dispatch`
/// routes by the payment's correlation id so that all messages for one id
/// serialize on a single worker, preserving per-id ordering.
#[async_trait]
pub trait PaymentDispatcher: Send + Sync + Clone + 'static {
	async fn dispatch(&self, payment: Payment) -> Result<(), DomainError>;
}
