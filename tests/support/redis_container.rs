use testcontainers::GenericImage;
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;

pub struct RedisTestContainer {
	pub client:    redis::Client,
	#[allow(dead_code)]
	pub container: testcontainers::ContainerAsync<GenericImage>,
}

pub async fn start_redis() -> RedisTestContainer {
	let container = GenericImage::new("redis", "8.0.3-alpine")
		.with_exposed_port(ContainerPort::Tcp(6379))
		.with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"))
		.start()
		.await
		.expect("redis container starts");

	let host_port = container
		.get_host_port_ipv4(6379)
		.await
		.expect("redis port is mapped");
	let redis_url = format!("redis://127.0.0.1:{host_port}");
	let client = redis::Client::open(redis_url).expect("valid redis URL");

	RedisTestContainer { client, container }
}
