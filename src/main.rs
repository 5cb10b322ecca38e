use std::sync::Arc;

#[cfg(feature = "perf")]
use pprof::flamegraph::Options;
use payment_gateway::infrastructure::config::Config;
use payment_gateway::run;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
	#[cfg(feature = "perf")]
	let guard = pprof::ProfilerGuardBuilder::default()
		.frequency(1000)
		.blocklist(&["libc", "libgcc", "pthread", "vdso"])
		.build()
		.unwrap();

	let config = Arc::new(Config::load().expect("Failed to load configuration"));
	let result = run(config).await;

	#[cfg(feature = "perf")]
	if let Ok(report) = guard.report().build() {
		let mut file = std::fs::File::create("flamegraph.svg").unwrap();
		let mut options = Options::default();
		options.title = "payment-gateway".to_string();
		options.count_name = "samples".to_string();
		report
			.flamegraph_with_options(&mut file, &mut options)
			.unwrap();
	}

	result
}
