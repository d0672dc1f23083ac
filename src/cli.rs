use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "esxnet")]
#[command(version)]
#[command(about = "Converge ESXi host networking to a network-config document", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Network-config document (version 1, YAML or JSON)
    #[arg(short, long, env = "ESXNET_CONFIG", global = true)]
    pub config: Option<String>,

    /// esxcli binary to run
    #[arg(long, env = "ESXNET_ESXCLI", default_value = "esxcli", global = true)]
    pub esxcli: String,

    /// Run inspection commands only; log changes instead of making them
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// The document path. Global args can't be marked required, so a
    /// missing one is reported here as the same usage error clap would give.
    pub fn config_path(&self) -> Result<&str, clap::Error> {
        self.config.as_deref().ok_or_else(|| {
            Self::command().error(
                ErrorKind::MissingRequiredArgument,
                "the following required arguments were not provided:\n  --config <CONFIG>",
            )
        })
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Wipe host networking, then configure it from the document
    Apply(ApplyArgs),

    /// Remove all vmknics, vSwitches, DNS servers and search domains
    Wipe,

    /// Show live adapters, vmknics, vSwitches and DNS settings
    Status,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_apply() {
        let cli = Cli::try_parse_from([
            "esxnet",
            "--config",
            "/tmp/network.yaml",
            "apply",
            "--json",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.config_path().unwrap(), "/tmp/network.yaml");
        assert_eq!(cli.esxcli, "esxcli");
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Apply(ApplyArgs { json: true })));
    }

    #[test]
    fn test_config_after_subcommand() {
        let cli = Cli::try_parse_from(["esxnet", "-n", "wipe", "--config", "n.yaml"]).unwrap();
        assert_eq!(cli.config_path().unwrap(), "n.yaml");
        assert!(cli.dry_run);
        assert!(matches!(cli.command, Command::Wipe));
    }

    #[test]
    fn test_missing_config_is_usage_error() {
        let mut cli = Cli::try_parse_from(["esxnet", "status"]).unwrap();
        // ESXNET_CONFIG may be set in the test environment
        cli.config = None;
        let err = cli.config_path().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_missing_subcommand_is_usage_error() {
        let err = Cli::try_parse_from(["esxnet", "--config", "x.yaml"]).err().unwrap();
        assert_eq!(err.exit_code(), 2);
    }
}
