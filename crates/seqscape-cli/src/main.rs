use clap::Parser;
mod cli;
mod commands;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = cli::Cli::parse();
    cli.execute()?;
    Ok(())
}
