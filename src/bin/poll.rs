//! Poll service binary

use clap::Parser;
use votekv::common::cli::{init_tracing, ServeArgs};
use votekv::Config;
use votekv::PollServer;

#[derive(Parser)]
#[command(name = "votekv-poll")]
#[command(about = "votekv poll service")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    serve: ServeArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load()?;
    cli.serve.apply(&mut config, |c| &mut c.poll.port);
    config.validate()?;
    init_tracing(&config.log_level);

    PollServer::new(config).serve().await?;
    Ok(())
}
