use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.  `RUST_LOG` takes precedence over the
/// filter given on the command line.
pub fn init(default_filter: &str) -> anyhow::Result<()> {
	let filter = match EnvFilter::try_from_default_env() {
		Ok(filter) => filter,
		Err(_) => EnvFilter::builder().parse(default_filter)?,
	};

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(false)
		.with_writer(std::io::stderr)
		.finish()
		.try_init()?;
	Ok(())
}
