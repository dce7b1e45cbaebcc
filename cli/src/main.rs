mod commands;
mod terminal;

use commands::{CommandLine, check};
use reachr_common::config::Config;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging();

    let cfg: Config = commands.to_config()?;
    let protocols = commands.protocols();

    print::banner(cfg.quiet);
    check::check(&commands.file_path, &commands.column_name, &protocols, &cfg).await
}
