use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "explorer",
    version,
    about = "Lightweight EVM block explorer with ERC-20 transfer decoding"
)]
pub struct Cli {
    /// Specify the config file path (default: ./config.yaml)
    #[arg(long, default_value = "config.yaml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the explorer HTTP service (default)
    Serve,
    /// Print one home page to stdout and exit
    Page {
        /// Page index, 0 is the chain head
        #[arg(default_value_t = 0)]
        page: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_config_yaml() {
        let cli = Cli::parse_from(["explorer"]);
        assert_eq!(cli.config, PathBuf::from("config.yaml"));
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_page_subcommand() {
        let cli = Cli::parse_from(["explorer", "--config", "dev.yaml", "page", "3"]);
        assert_eq!(cli.config, PathBuf::from("dev.yaml"));
        assert!(matches!(cli.command, Some(Commands::Page { page: 3 })));
    }
}
