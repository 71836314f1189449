use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use trawl_cli::{IntensityArg, TypeArg};
use trawl_domain::request::SearchRequest;
use trawl_service::TrawlService;

#[derive(Debug, Parser)]
#[command(
	version = trawl_cli::VERSION,
	rename_all = "kebab",
	styles = trawl_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Free-text query, at most 100 characters.
	#[arg(long, short = 'q')]
	pub query: String,
	/// Region code, e.g. KR or US.
	#[arg(long, short = 'r')]
	pub region: String,
	/// Look-back window in days.
	#[arg(long, default_value_t = 30)]
	pub period_days: u32,
	#[arg(long, short = 'n', default_value_t = 50)]
	pub desired: u32,
	#[arg(long = "type", value_enum, default_value_t = TypeArg::Any)]
	pub type_filter: TypeArg,
	/// Minimum view count.
	#[arg(long)]
	pub min_metric: Option<u64>,
	/// Maximum subscriber count of the owning channel.
	#[arg(long)]
	pub max_owner_metric: Option<u64>,
	#[arg(long, value_enum, default_value_t = IntensityArg::Medium)]
	pub intensity: IntensityArg,
	/// Per-run cost ceiling. The configured quota still applies.
	#[arg(long)]
	pub cost_limit: Option<u64>,
	#[arg(long)]
	pub pretty: bool,
}
impl Args {
	pub fn request(&self) -> SearchRequest {
		SearchRequest {
			query_text: self.query.clone(),
			region: self.region.clone(),
			period_days: self.period_days,
			desired_count: self.desired,
			type_filter: self.type_filter.into(),
			min_metric: self.min_metric,
			max_owner_metric: self.max_owner_metric,
			intensity: self.intensity.into(),
			cost_limit: self.cost_limit,
		}
	}
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = trawl_config::load(&args.config)?;

	init_tracing(&config);

	let request = args.request();
	let service = TrawlService::new(config);
	let result = service.aggregate(request).await?;

	tracing::info!(
		run_id = %result.run_id,
		items = result.items.len(),
		cost_used = result.cost_used,
		quota_level = ?result.quota.level,
		"Run complete."
	);

	let output = if args.pretty {
		serde_json::to_string_pretty(&result)?
	} else {
		serde_json::to_string(&result)?
	};

	println!("{output}");

	Ok(())
}

fn init_tracing(config: &trawl_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
