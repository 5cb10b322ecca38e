use crate::domain::error::DomainError;
use crate::domain::repository::PaymentRepository;

#[derive(Clone)]
pub struct PurgePaymentsUseCase<R: PaymentRepository> {
	repository: R,
}

impl<R: PaymentRepository> PurgePaymentsUseCase<R> {
	pub fn new(repository: R) -> Self {
		Self { repository }
	}

	pub async fn execute(&self) -> Result<(), DomainError> {
		self.repository.purge().await
	}
}
