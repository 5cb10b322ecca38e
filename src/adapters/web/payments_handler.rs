use actix_web::{HttpResponse, Responder, ResponseError, post, web};
use log::{debug, warn};

use crate::adapters::web::errors::ApiError;
use crate::adapters::web::schema::PaymentRequest;
use crate::domain::payment::Payment;
use crate::infrastructure::pool::ShardedPool;
use crate::use_cases::create_payment::CreatePaymentUseCase;
use crate::use_cases::dto::CreatePaymentCommand;

/// Always 202s once the payment has been handed to a processor-pool
/// shard (or, if no shard is reachable, enqueued for retry) — ingress
/// acknowledgement is decoupled from actual processor success (§4.6).
#[post("/payments")]
pub async fn payments(
	payload: web::Json<PaymentRequest>,
	create_payment_use_case: web::Data<CreatePaymentUseCase<ShardedPool<Payment>>>,
) -> impl Responder {
	let command = CreatePaymentCommand {
		correlation_id: payload.correlation_id,
		amount:         payload.amount,
	};

	match create_payment_use_case.execute(command).await {
		Ok(()) => {
			debug!("payment {} accepted for processing", payload.correlation_id);
			HttpResponse::Accepted().finish()
		}
		Err(e) => {
			warn!("failed to dispatch payment {}: {e}", payload.correlation_id);
			ApiError::InternalServerError.error_response()
		}
	}
}
