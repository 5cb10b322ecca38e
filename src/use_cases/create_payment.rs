use crate::domain::dispatcher::PaymentDispatcher;
use crate::domain::error::DomainError;
use crate::domain::payment::Payment;
use crate::use_cases::dto::CreatePaymentCommand;

/// Ingress-facing orchestration: wraps a raw submission into a `Payment`
/// and hands it to the sharded processor pool. Does not wait for the
/// outbound call to settle — ingress acknowledges before processing does.
#[derive(Clone)]
pub struct CreatePaymentUseCase<D: PaymentDispatcher> {
	dispatcher: D,
}

impl<D: PaymentDispatcher> CreatePaymentUseCase<D> {
	pub fn new(dispatcher: D) -> Self {
		Self { dispatcher }
	}

	pub async fn execute(&self, command: CreatePaymentCommand) -> Result<(), DomainError> {
		let payment = Payment::new(command.correlation_id, command.amount);
		self.dispatcher.dispatch(payment).await
	}
}
