//! Voter service binary

use clap::Parser;
use votekv::common::cli::{init_tracing, ServeArgs};
use votekv::Config;
use votekv::VoterServer;

#[derive(Parser)]
#[command(name = "votekv-voter")]
#[command(about = "votekv voter service")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    serve: ServeArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load()?;
    cli.serve.apply(&mut config, |c| &mut c.voter.port);
    config.validate()?;
    init_tracing(&config.log_level);

    VoterServer::new(config).serve().await?;
    Ok(())
}
