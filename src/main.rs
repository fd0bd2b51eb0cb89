use anyhow::Context;
use bucketsync::{
    Credentials, SyncConfig, Synchronizer, DEFAULT_CONCURRENCY, DEFAULT_LOCAL_ROOT,
    DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY,
};
use clap::builder::TypedValueParser;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "bucketsync")]
#[command(about = "Mirror a Cloudflare R2 bucket into a local directory", long_about = None)]
#[command(version)]
struct Args {
    /// Bucket to mirror
    #[arg(short, long, env = "BUCKET_NAME")]
    bucket: String,

    /// Cloudflare account id
    #[arg(long, env = "BUCKET_ACCOUNT_ID")]
    account_id: String,

    /// R2 access key id
    #[arg(long, env = "BUCKET_ACCESS_KEY", hide_env_values = true)]
    access_key: String,

    /// R2 secret access key
    #[arg(long, env = "BUCKET_SECRET_KEY", hide_env_values = true)]
    secret_key: String,

    /// Local directory to mirror into
    #[arg(short, long, env = "BUCKET_SAVE_LOCAL_BUCKET", default_value = DEFAULT_LOCAL_ROOT)]
    output: PathBuf,

    /// Number of concurrent downloads
    #[arg(short, long, env = "BUCKET_DOWNLOAD_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY,
          value_parser = clap::value_parser!(u64).range(1..).map(|n: u64| n as usize))]
    concurrency: usize,

    /// Retries per object after a failed download
    #[arg(long, env = "BUCKET_MAX_RETRIES", default_value_t = DEFAULT_MAX_RETRIES,
          value_parser = clap::value_parser!(u32).range(1..))]
    max_retries: u32,

    /// Base delay between retries, multiplied by the attempt number (e.g. "1s", "500ms")
    #[arg(long, default_value_t = humantime::Duration::from(DEFAULT_RETRY_DELAY))]
    retry_delay: humantime::Duration,

    /// Only mirror keys starting with this prefix
    #[arg(short, long, env = "BUCKET_PREFIX", default_value = "")]
    prefix: String,

    /// Custom S3 endpoint instead of the account's R2 endpoint
    #[arg(long, env = "BUCKET_ENDPOINT")]
    endpoint: Option<String>,

    /// Print the final summary as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = SyncConfig {
        bucket: args.bucket,
        local_root: args.output,
        concurrency: args.concurrency,
        max_retries: args.max_retries,
        retry_delay: args.retry_delay.into(),
        prefix: args.prefix,
        credentials: Credentials {
            account_id: args.account_id,
            access_key_id: args.access_key,
            secret_access_key: args.secret_key,
        },
        endpoint_url: args.endpoint,
    };

    info!("Bucket: {}", config.bucket);
    info!("Output directory: {:?}", config.local_root);
    info!(
        "Concurrency: {}, max retries: {}",
        config.concurrency, config.max_retries
    );

    let mut synchronizer = Synchronizer::new(config).context("Invalid configuration")?;
    let summary = synchronizer.sync().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize tracing
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("bucketsync={}", log_level))
        .init();

    info!("🚀 Bucketsync - R2 bucket mirror");

    if let Err(e) = run(args).await {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}
