use clap::Parser;
use vestwatch::Opts;
use vestwatch::cli::SubCommandExtend;
use vestwatch::config::SubCommand;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = Opts::parse();

    match &opts.subcmd {
        SubCommand::Server(config) => config.run(&opts).await,
        SubCommand::List(config) => config.run(&opts).await,
        SubCommand::Delete(config) => config.run(&opts).await,
        SubCommand::Export(config) => config.run(&opts).await,
        SubCommand::Detect(config) => config.run(&opts).await,
        SubCommand::Annotate(config) => config.run(&opts).await,
    }
}
