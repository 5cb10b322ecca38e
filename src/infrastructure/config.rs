use config::Environment;
use serde::Deserialize;

/// Process-lifetime configuration, loaded once at startup from environment
/// variables (no prefix, matching the bit-exact names external tooling
/// expects). Missing required variables fail fast before any worker spawns.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
	pub payment_processor_url_default:  String,
	pub payment_processor_url_fallback: String,
	pub redis_address:                  String,

	#[serde(default = "default_retry_time_ms")]
	pub retry_time_ms: u64,
	#[serde(default = "default_max_backoff_delay_ms")]
	pub max_backoff_delay_ms: u64,
	#[serde(default = "default_heap_size")]
	pub heap_size: usize,
	#[serde(default = "default_read_timeout_ms")]
	pub read_timeout_ms: u64,
	#[serde(default = "default_write_timeout_ms")]
	pub write_timeout_ms: u64,
	#[serde(default = "default_actor_pool_size")]
	pub actor_pool_size: usize,
	#[serde(default = "default_integrity_pool_size")]
	pub integrity_pool_size: usize,
	#[serde(default = "default_processor_mailbox_size")]
	pub processor_mailbox_size: usize,
	#[serde(default = "default_integrity_mailbox_size")]
	pub integrity_mailbox_size: usize,
	#[serde(default = "default_is_publisher")]
	pub is_publisher: bool,
	#[serde(default = "default_port")]
	pub port: u16,
	#[serde(default = "default_max_latency_ms")]
	pub max_latency_ms: u64,
	#[serde(default = "default_server_keepalive_secs")]
	pub server_keepalive_secs: u64,
	#[serde(default = "default_redis_warmup_connections")]
	pub redis_warmup_connections: usize,
}

fn default_retry_time_ms() -> u64 {
	10
}
fn default_max_backoff_delay_ms() -> u64 {
	500
}
fn default_heap_size() -> usize {
	1024
}
fn default_read_timeout_ms() -> u64 {
	500
}
fn default_write_timeout_ms() -> u64 {
	500
}
fn default_actor_pool_size() -> usize {
	30
}
fn default_integrity_pool_size() -> usize {
	1
}
fn default_processor_mailbox_size() -> usize {
	2048
}
fn default_integrity_mailbox_size() -> usize {
	512
}
fn default_is_publisher() -> bool {
	true
}
fn default_port() -> u16 {
	5000
}
fn default_max_latency_ms() -> u64 {
	500
}
fn default_server_keepalive_secs() -> u64 {
	75
}
fn default_redis_warmup_connections() -> usize {
	20
}

impl Config {
	pub fn load() -> Result<Self, config::ConfigError> {
		Self::load_from(Environment::default())
	}

	fn load_from(environment: Environment) -> Result<Self, config::ConfigError> {
		config::Config::builder()
			.add_source(environment)
			.build()?
			.try_deserialize()
	}
}
