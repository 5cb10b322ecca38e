use std::time::Duration;

use actix_web::{HttpResponse, Responder, ResponseError, get, web};
use log::error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::adapters::web::errors::ApiError;
use crate::adapters::web::schema::PaymentsSummaryFilter;
use crate::infrastructure::persistence::RedisPaymentRepository;
use crate::use_cases::dto::GetPaymentSummaryQuery;
use crate::use_cases::get_payment_summary::GetPaymentSummaryUseCase;

const SUMMARY_DEADLINE: Duration = Duration::from_secs(5);

/// An unparsable `from`/`to` is treated as absent (§6), not a 400 — only
/// a well-formed RFC3339-nanosecond value constrains the window.
fn parse_bound(raw: &Option<String>) -> Option<OffsetDateTime> {
	raw.as_deref().and_then(|s| OffsetDateTime::parse(s, &Rfc3339).ok())
}

#[get("/payments-summary")]
pub async fn payments_summary(
	filter: web::Query<PaymentsSummaryFilter>,
	get_payment_summary_use_case: web::Data<GetPaymentSummaryUseCase<RedisPaymentRepository>>,
) -> impl Responder {
	let query = GetPaymentSummaryQuery {
		from: parse_bound(&filter.from),
		to:   parse_bound(&filter.to),
	};

	let outcome =
		tokio::time::timeout(SUMMARY_DEADLINE, get_payment_summary_use_case.execute(query)).await;

	match outcome {
		Ok(Ok(summary)) => HttpResponse::Ok().json(summary),
		Ok(Err(e)) => {
			error!("failed to compute payment summary: {e}");
			ApiError::InternalServerError.error_response()
		}
		Err(_) => {
			error!("payment summary exceeded its {SUMMARY_DEADLINE:?} deadline");
			ApiError::SummaryTimeout.error_response()
		}
	}
}
