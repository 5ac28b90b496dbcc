use anyhow::Result;
use clap::{Parser, ValueEnum};

use crate::cli::{SubCommandExtend, open_store};
use crate::config::Opts;
use crate::db::DetectionSummary;

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    /// 输出格式
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for ListCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let store = open_store(opts).await?;
        let history = store.summaries().await?;
        print_history(&history, self)
    }
}

fn print_history(history: &[DetectionSummary], opts: &ListCommand) -> Result<()> {
    match opts.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(history)?)
        }
        OutputFormat::Table => {
            if history.is_empty() {
                println!("No detection history");
            }
            for record in history {
                println!(
                    "{}\t{}\t{}\t{}",
                    record.id, record.source_type, record.source_path, record.image_size
                );
            }
        }
    }
    Ok(())
}

#[derive(ValueEnum, Debug, Clone)]
pub enum OutputFormat {
    Json,
    Table,
}
