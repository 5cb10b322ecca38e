use actix_web::{HttpResponse, Responder, ResponseError, post, web};
use log::{error, info};

use crate::adapters::web::errors::ApiError;
use crate::infrastructure::persistence::RedisPaymentRepository;
use crate::use_cases::purge_payments::PurgePaymentsUseCase;

#[post("/purge-payments")]
pub async fn payments_purge(
	purge_use_case: web::Data<PurgePaymentsUseCase<RedisPaymentRepository>>,
) -> impl Responder {
	match purge_use_case.execute().await {
		Ok(()) => {
			info!("store purged");
			HttpResponse::Ok().finish()
		}
		Err(e) => {
			error!("failed to purge store: {e}");
			ApiError::InternalServerError.error_response()
		}
	}
}
