//! Votes service binary

use clap::Parser;
use votekv::common::cli::{init_tracing, ServeArgs, UpstreamArgs};
use votekv::Config;
use votekv::VotesServer;

#[derive(Parser)]
#[command(name = "votekv-votes")]
#[command(about = "votekv votes service")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    serve: ServeArgs,

    #[command(flatten)]
    upstream: UpstreamArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load()?;
    cli.serve.apply(&mut config, |c| &mut c.votes.port);
    cli.upstream.apply(&mut config);
    config.validate()?;
    init_tracing(&config.log_level);

    VotesServer::new(config).serve().await?;
    Ok(())
}
