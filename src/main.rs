use aws_lambda_events::event::s3::S3Event;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use s3_thumbnailer::config;
use s3_thumbnailer::handler;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Error> {
  // Initialize tracing
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "s3_thumbnailer=debug".into()),
    )
    .with(
      tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact(),
    )
    .init();

  // Load config
  let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_owned());
  let cfg = config::parse(&config_path)?;

  // Build the handler state once per container lifecycle
  let state = handler::bootstrap(cfg).await?;

  run(service_fn(|event: LambdaEvent<S3Event>| {
    let state = state.clone();
    async move { Ok::<_, Error>(handler::handle(&state, event).await) }
  }))
  .await
}
