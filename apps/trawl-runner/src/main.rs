use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = trawl_runner::Args::parse();

	trawl_runner::run(args).await
}
