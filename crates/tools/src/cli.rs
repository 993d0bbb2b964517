use std::path::PathBuf;

use clap::{Parser, Subcommand};
use search::{ConfigError, SearchConfig};

#[derive(Debug, Parser)]
#[command(
    name = "atlas-search",
    version,
    about = "Search places and drive the map from a terminal"
)]
pub struct Cli {
    /// Base URI of the search backend (overrides the config file).
    #[arg(long, env = "ATLAS_SEARCH_BASE")]
    pub base: Option<String>,

    /// JSON config file.
    #[arg(long, env = "ATLAS_SEARCH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List matches for a place name.
    Search { name: String },
    /// Print the encyclopedia snippet for a place name.
    Detail { name: String },
    /// Search, pick one result and center the map on it.
    Goto {
        name: String,
        /// 1-based position in the result list.
        #[arg(long, default_value_t = 1)]
        pick: usize,
        /// Keep the globe view in sync and print its camera.
        #[arg(long)]
        globe: bool,
        /// Write map.png into this directory.
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Interactive session; each line is typed into the search box.
    Repl {
        /// Directory for `:export`.
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

impl Cli {
    pub fn load_config(&self) -> Result<SearchConfig, ConfigError> {
        let mut cfg = match &self.config {
            Some(path) => SearchConfig::from_path(path)?,
            None => SearchConfig::default(),
        };
        if let Some(base) = &self.base {
            cfg.base_uri.clone_from(base);
            cfg.validate()?;
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_goto_flags() {
        let cli = Cli::try_parse_from([
            "atlas-search",
            "--base",
            "http://maps.local",
            "goto",
            "taipei",
            "--pick",
            "2",
            "--globe",
        ])
        .unwrap();
        match cli.command {
            Command::Goto {
                ref name,
                pick,
                globe,
                ref export,
            } => {
                assert_eq!(name, "taipei");
                assert_eq!(pick, 2);
                assert!(globe);
                assert!(export.is_none());
            }
            ref other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.load_config().unwrap().base_uri, "http://maps.local");
    }

    #[test]
    fn base_flag_is_validated() {
        let cli = Cli::try_parse_from(["atlas-search", "--base", "maps.local", "search", "x"]).unwrap();
        assert!(matches!(cli.load_config(), Err(ConfigError::Invalid(_))));
    }
}
