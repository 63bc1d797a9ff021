//! Command-line interface definitions and argument parsing

use crate::server::ServerConfig;
use clap::{Parser, Subcommand};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Member churn analytics backend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the member dataset CSV
    #[arg(
        short,
        long,
        env = "CHURNLENS_DATA",
        default_value = "data/processed/segmented_members_final.csv",
        global = true
    )]
    pub data: PathBuf,

    /// Directory holding standard_scaler.json and churn_model_gb.json
    #[arg(short, long, env = "CHURNLENS_MODEL_DIR", default_value = "models", global = true)]
    pub model_dir: PathBuf,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only report errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the HTTP API (default)
    Serve {
        /// Interface to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: IpAddr,

        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value = "8000")]
        port: u16,

        /// Disable permissive CORS headers
        #[arg(long)]
        no_cors: bool,
    },
    /// Print the data-quality audit as JSON
    Audit,
    /// Render the segmentation projection to a PNG
    Plot {
        /// Output path for the plot
        #[arg(short, long, default_value = "segmentation.png")]
        output: PathBuf,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Serve { host: IpAddr::from([0, 0, 0, 0]), port: 8000, no_cors: false }
    }
}

impl Args {
    /// The requested subcommand, `serve` when none was given
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or_default()
    }

    /// Server configuration for the given bind settings
    pub fn server_config(&self, host: IpAddr, port: u16, no_cors: bool) -> ServerConfig {
        let config = ServerConfig::default()
            .with_address(SocketAddr::new(host, port))
            .with_data_path(&self.data)
            .with_model_dir(&self.model_dir);
        if no_cors {
            config.without_cors()
        } else {
            config
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_serve() {
        let args = Args::try_parse_from(["churnlens"]).unwrap();
        assert_eq!(args.command(), Command::default());
        assert_eq!(args.model_dir, PathBuf::from("models"));
    }

    #[test]
    fn test_parse_serve_flags() {
        let args = Args::try_parse_from([
            "churnlens", "--data", "/srv/members.csv", "serve", "--host", "127.0.0.1", "--port",
            "9100", "--no-cors",
        ])
        .unwrap();

        let Command::Serve { host, port, no_cors } = args.command() else {
            panic!("expected serve");
        };
        let config = args.server_config(host, port, no_cors);
        assert_eq!(config.address, "127.0.0.1:9100".parse::<SocketAddr>().unwrap());
        assert_eq!(config.data_path, PathBuf::from("/srv/members.csv"));
        assert!(!config.cors_enabled);
    }

    #[test]
    fn test_parse_plot() {
        let args = Args::try_parse_from(["churnlens", "plot", "-o", "out.png", "-v"]).unwrap();
        assert_eq!(args.command(), Command::Plot { output: PathBuf::from("out.png") });
        assert!(args.verbose);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Args::try_parse_from(["churnlens", "-v", "-q"]).is_err());
    }
}
