use crate::app::driver::Step;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "site-forms")]
#[command(about = "Drive a page's forms headlessly and print the resulting page state")]
pub struct CliConfig {
    #[arg(long, help = "Page fixture (TOML)")]
    pub page: String,

    #[arg(long, help = "Controller settings (TOML); defaults apply when omitted")]
    pub config: Option<String>,

    #[arg(
        long = "step",
        help = "fill:<form>.<field>=<value>, blur:<form>.<field>, submit:<form>, click:<href>"
    )]
    pub steps: Vec<Step>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}
