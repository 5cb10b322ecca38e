use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use futures::StreamExt;
use log::{error, info, warn};
use redis::AsyncCommands;
use reqwest::Client;
use serde::Deserialize;

use crate::domain::error::DomainError;
use crate::domain::health::{ActiveProcessor, ProcessorHealth};
use crate::domain::oracle::HealthOracle;
use crate::domain::payment::Processor;

const STATUS_CHANNEL: &str = "status-update";

/// Wire shape of `GET /payments/service-health`; converted into the domain
/// `ProcessorHealth` (which carries which processor the reading is for)
/// immediately after deserializing.
#[derive(Debug, Clone, Copy, Deserialize)]
struct HealthProbeResponse {
	failing:           bool,
	#[serde(rename = "minResponseTime")]
	min_response_time: i64,
}

/// Shared read side: the current routing decision, updated either by this
/// process's own publisher loop or by messages relayed from the publisher
/// over pub/sub. Lock-free — readers never block the loop that updates it.
#[derive(Clone)]
pub struct RedisHealthOracle {
	state: Arc<ArcSwap<Option<ActiveProcessor>>>,
}

impl RedisHealthOracle {
	fn new() -> Self {
		Self { state: Arc::new(ArcSwap::from_pointee(None)) }
	}

	/// Overwrites the routing decision directly. Used by the publisher and
	/// subscriber loops; also the seam integration tests use to pin a
	/// known-good processor without waiting on a real probe cycle.
	pub fn store(&self, processor: ActiveProcessor) {
		self.state.store(Arc::new(Some(processor)));
	}
}

impl HealthOracle for RedisHealthOracle {
	fn get_payment_processor(&self) -> Result<Processor, DomainError> {
		match **self.state.load() {
			Some(ActiveProcessor::Default) => Ok(Processor::Default),
			Some(ActiveProcessor::Fallback) => Ok(Processor::Fallback),
			_ => Err(DomainError::NoProcessorAvailable),
		}
	}

	fn has_healthy_processors(&self) -> bool {
		!matches!(**self.state.load(), Some(ActiveProcessor::None) | None)
	}
}

fn parse_active_processor(label: &str) -> Option<ActiveProcessor> {
	match label {
		"default" => Some(ActiveProcessor::Default),
		"fallback" => Some(ActiveProcessor::Fallback),
		"waiting" => Some(ActiveProcessor::Waiting),
		"none" => Some(ActiveProcessor::None),
		_ => None,
	}
}

fn active_processor_label(processor: ActiveProcessor) -> &'static str {
	match processor {
		ActiveProcessor::Default => "default",
		ActiveProcessor::Fallback => "fallback",
		ActiveProcessor::Waiting => "waiting",
		ActiveProcessor::None => "none",
	}
}

async fn probe(http_client: &Client, base_url: &str, processor: Processor) -> ProcessorHealth {
	let url = format!("{base_url}/payments/service-health");
	match http_client.get(&url).send().await {
		Ok(resp) if resp.status().is_success() => match resp.json::<HealthProbeResponse>().await {
			Ok(body) => ProcessorHealth {
				processor,
				failing: body.failing,
				min_response_time_ms: body.min_response_time.max(0) as u64,
			},
			Err(e) => {
				error!("malformed health-check body from {base_url}: {e}");
				ProcessorHealth::unreachable(processor)
			}
		},
		Ok(resp) => {
			warn!("health check for {base_url} returned {}", resp.status());
			ProcessorHealth::unreachable(processor)
		}
		Err(e) => {
			warn!("health check for {base_url} failed: {e}");
			ProcessorHealth::unreachable(processor)
		}
	}
}

/// Tracks the sticky `default_failing_since` debounce flag across probe
/// cycles and implements the nine-step decision procedure.
struct Decider {
	max_latency:            Duration,
	default_failing_since:  Option<Instant>,
}

impl Decider {
	fn new(max_latency: Duration) -> Self {
		Self { max_latency, default_failing_since: None }
	}

	fn decide(&mut self, default: ProcessorHealth, fallback: ProcessorHealth) -> ActiveProcessor {
		let max_latency_ms = self.max_latency.as_millis() as u64;

		let default_is_slow = default.min_response_time_ms > max_latency_ms;
		let default_unavailable = default.failing || default_is_slow;

		match (default_unavailable, self.default_failing_since) {
			(true, None) => self.default_failing_since = Some(Instant::now()),
			(false, Some(_)) => self.default_failing_since = None,
			_ => {}
		}

		if !default_unavailable {
			return ActiveProcessor::Default;
		}

		if let Some(since) = self.default_failing_since {
			if since.elapsed() < Duration::from_secs(20) {
				return ActiveProcessor::Waiting;
			}
		}

		let fallback_is_slow = fallback.min_response_time_ms > max_latency_ms;

		if !fallback.failing && fallback.min_response_time_ms < max_latency_ms {
			return ActiveProcessor::Fallback;
		}

		if default.failing && fallback.failing {
			return ActiveProcessor::None;
		}

		if default_is_slow && fallback_is_slow {
			return ActiveProcessor::None;
		}

		if !fallback.failing
			&& default.min_response_time_ms
				> fallback.min_response_time_ms + fallback.min_response_time_ms / 2
		{
			return ActiveProcessor::Fallback;
		}

		ActiveProcessor::Default
	}
}

/// Runs the publisher's probe loop: every `probe_interval`, checks both
/// processors, decides the active processor, applies it locally, and
/// publishes it for subscribers to pick up.
pub async fn run_publisher(
	oracle: RedisHealthOracle,
	redis_client: redis::Client,
	http_client: Client,
	default_url: String,
	fallback_url: String,
	max_latency: Duration,
	probe_interval: Duration,
) {
	let mut decider = Decider::new(max_latency);
	let mut ticker = tokio::time::interval(probe_interval);

	loop {
		ticker.tick().await;

		let (default_health, fallback_health) =
			tokio::join!(
				probe(&http_client, &default_url, Processor::Default),
				probe(&http_client, &fallback_url, Processor::Fallback)
			);

		let decision = decider.decide(default_health, fallback_health);
		info!("health oracle decision: {}", active_processor_label(decision));
		oracle.store(decision);

		let publish_result: redis::RedisResult<()> = async {
			let mut conn = redis_client.get_multiplexed_async_connection().await?;
			conn.publish(STATUS_CHANNEL, active_processor_label(decision)).await
		}
		.await;

		if let Err(e) = publish_result {
			error!("failed to broadcast health decision: {e}");
		}
	}
}

/// Runs a subscriber's listen loop: relays the publisher's decisions into
/// the local state cell. Reconnects on stream errors rather than exiting,
/// since a transient Redis blip shouldn't take the whole process's routing
/// blind.
pub async fn run_subscriber(oracle: RedisHealthOracle, redis_client: redis::Client) {
	loop {
		let conn = match redis_client.get_async_pubsub().await {
			Ok(conn) => conn,
			Err(e) => {
				error!("failed to open pub/sub connection: {e}, retrying in 1s");
				tokio::time::sleep(Duration::from_secs(1)).await;
				continue;
			}
		};

		let mut pubsub = conn;
		if let Err(e) = pubsub.subscribe(STATUS_CHANNEL).await {
			error!("failed to subscribe to {STATUS_CHANNEL}: {e}, retrying in 1s");
			tokio::time::sleep(Duration::from_secs(1)).await;
			continue;
		}

		let mut stream = pubsub.on_message();
		while let Some(msg) = stream.next().await {
			let payload: String = match msg.get_payload() {
				Ok(p) => p,
				Err(e) => {
					warn!("malformed status-update payload: {e}");
					continue;
				}
			};

			match parse_active_processor(&payload) {
				Some(processor) => {
					info!("subscriber received health update: {payload}");
					oracle.store(processor);
				}
				None => warn!("unrecognised status-update payload: {payload}"),
			}
		}

		warn!("status-update subscription stream ended, reconnecting");
	}
}

pub fn new_oracle() -> RedisHealthOracle {
	RedisHealthOracle::new()
}
