use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpServer, web};
use futures::stream::{self, StreamExt};
use log::{info, warn};
use reqwest::Client;

pub mod adapters;
pub mod domain;
pub mod infrastructure;
pub mod use_cases;

use crate::adapters::web::payments_handler::payments;
use crate::adapters::web::payments_purge_handler::payments_purge;
use crate::adapters::web::payments_summary_handler::payments_summary;
use crate::domain::payment::Payment;
use crate::infrastructure::config::Config;
use crate::infrastructure::health_oracle::{new_oracle, run_publisher, run_subscriber};
use crate::infrastructure::integrity::IntegrityCheck;
use crate::infrastructure::persistence::RedisPaymentRepository;
use crate::infrastructure::pool::ShardedPool;
use crate::infrastructure::{integrity, processor_worker, retry};
use crate::use_cases::create_payment::CreatePaymentUseCase;
use crate::use_cases::get_payment_summary::GetPaymentSummaryUseCase;
use crate::use_cases::purge_payments::PurgePaymentsUseCase;

/// `reqwest` exposes a single overall per-request deadline rather than
/// separate read/write phases, so the two configured timeouts are combined
/// by taking the larger — neither phase should be cut short by the other.
fn build_http_client(config: &Config) -> Client {
	let request_timeout_ms = config.read_timeout_ms.max(config.write_timeout_ms);
	Client::builder()
		.timeout(Duration::from_millis(request_timeout_ms))
		.connect_timeout(Duration::from_secs(2))
		.pool_max_idle_per_host(config.actor_pool_size)
		.build()
		.expect("HTTP client configuration is valid")
}

/// Fires `count` concurrent warm-up requests at one processor's
/// `/payments/service-health`, bounded to `count` in flight at once via
/// `buffer_unordered` — this is what actually pre-populates the shared
/// client's per-host connection pool (capped at `count` connections),
/// rather than a single ping that leaves the rest of the pool cold.
async fn warm_up_processor(http_client: &Client, base_url: &str, count: usize) {
	let url = format!("{base_url}/payments/service-health");

	let results = stream::iter(0..count)
		.map(|_| {
			let http_client = http_client.clone();
			let url = url.clone();
			async move { http_client.get(url).send().await }
		})
		.buffer_unordered(count.max(1))
		.collect::<Vec<_>>()
		.await;

	let failures = results.iter().filter(|r| r.is_err()).count();
	if failures > 0 {
		warn!("{failures}/{count} warm-up probes against {base_url} failed");
	}
}

/// Bounded-concurrency burst of warm-up requests against both processor
/// base URLs before the server starts accepting traffic (§10.3). Failures
/// here are expected (a processor may be down at boot) and only logged —
/// the health oracle catches up within one probe cycle regardless.
async fn warm_up(http_client: &Client, default_url: &str, fallback_url: &str, count: usize) {
	tokio::join!(
		warm_up_processor(http_client, default_url, count),
		warm_up_processor(http_client, fallback_url, count),
	);
}

/// Fires `count` concurrent `PING`s to pre-establish the store client's
/// connection pool before any worker touches it, mirroring the same
/// warm-up treatment given to the processor HTTP clients.
async fn warm_up_redis(redis_client: &redis::Client, count: usize) {
	let results = stream::iter(0..count)
		.map(|_| {
			let redis_client = redis_client.clone();
			async move {
				let mut conn = redis_client.get_multiplexed_async_connection().await?;
				redis::cmd("PING").query_async::<()>(&mut conn).await
			}
		})
		.buffer_unordered(count.max(1))
		.collect::<Vec<redis::RedisResult<()>>>()
		.await;

	let failures = results.iter().filter(|r| r.is_err()).count();
	if failures > 0 {
		warn!("{failures}/{count} redis warm-up pings failed");
	}
}

pub async fn run(config: Arc<Config>) -> std::io::Result<()> {
	env_logger::init();

	let redis_client =
		redis::Client::open(config.redis_address.clone()).expect("invalid Redis address");
	let http_client = build_http_client(&config);

	info!("Warming up processor and store connections...");
	tokio::join!(
		warm_up(
			&http_client,
			&config.payment_processor_url_default,
			&config.payment_processor_url_fallback,
			config.actor_pool_size,
		),
		warm_up_redis(&redis_client, config.redis_warmup_connections),
	);

	info!("Starting health oracle ({})...", if config.is_publisher { "publisher" } else { "subscriber" });
	let oracle = new_oracle();
	if config.is_publisher {
		tokio::spawn(run_publisher(
			oracle.clone(),
			redis_client.clone(),
			http_client.clone(),
			config.payment_processor_url_default.clone(),
			config.payment_processor_url_fallback.clone(),
			Duration::from_millis(config.max_latency_ms),
			Duration::from_secs(5),
		));
	} else {
		tokio::spawn(run_subscriber(oracle.clone(), redis_client.clone()));
	}

	let repository = RedisPaymentRepository::new(redis_client.clone());

	info!("Starting retry worker...");
	let retry_scheduler = retry::spawn(
		oracle.clone(),
		Duration::from_millis(config.retry_time_ms),
		Duration::from_millis(config.max_backoff_delay_ms),
		config.heap_size,
	);

	info!("Starting integrity worker pool (size {})...", config.integrity_pool_size);
	let (integrity_pool, integrity_receivers) =
		ShardedPool::<IntegrityCheck>::new(config.integrity_pool_size, config.integrity_mailbox_size);
	for (index, inbox) in integrity_receivers.into_iter().enumerate() {
		let self_sender = integrity_pool.sender_at(index);
		tokio::spawn(integrity::run(
			inbox,
			self_sender,
			http_client.clone(),
			config.payment_processor_url_default.clone(),
			config.payment_processor_url_fallback.clone(),
			repository.clone(),
		));
	}

	info!("Starting processor worker pool (size {})...", config.actor_pool_size);
	let (processor_pool, processor_receivers) =
		ShardedPool::<Payment>::new(config.actor_pool_size, config.processor_mailbox_size);
	for (index, inbox) in processor_receivers.into_iter().enumerate() {
		let self_sender = processor_pool.sender_at(index);
		tokio::spawn(processor_worker::run(
			inbox,
			self_sender,
			http_client.clone(),
			config.payment_processor_url_default.clone(),
			config.payment_processor_url_fallback.clone(),
			oracle.clone(),
			repository.clone(),
			retry_scheduler.clone(),
			integrity_pool.clone(),
		));
	}

	info!("Starting Actix-Web server on 0.0.0.0:{}...", config.port);

	let create_payment_use_case = CreatePaymentUseCase::new(processor_pool);
	let get_payment_summary_use_case = GetPaymentSummaryUseCase::new(repository.clone());
	let purge_payments_use_case = PurgePaymentsUseCase::new(repository);

	let port = config.port;
	let keepalive = config.server_keepalive_secs;

	HttpServer::new(move || {
		App::new()
			.app_data(web::Data::new(create_payment_use_case.clone()))
			.app_data(web::Data::new(get_payment_summary_use_case.clone()))
			.app_data(web::Data::new(purge_payments_use_case.clone()))
			.service(payments)
			.service(payments_summary)
			.service(payments_purge)
	})
	.keep_alive(Duration::from_secs(keepalive))
	.bind(("0.0.0.0", port))?
	.run()
	.await
}
