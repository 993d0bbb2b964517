use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use map::MapModel;
use search::SearchConfig;
use service::{DetailQuery, HttpSearchService, SearchService};
use tokio::io::BufReader;
use tools::cli::{Cli, Command};
use tools::session::{Session, print_focus, print_results};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.load_config().context("loading configuration")?;
    info!(base = %config.base_uri, "atlas-search");
    let service = HttpSearchService::new(config.base_uri.clone());
    let mut out = std::io::stdout().lock();

    match cli.command {
        Command::Search { name } => {
            let mut session = Session::new(config, service);
            session.search(&name).await?;
            print_results(session.controller(), &mut out)?;
        }
        Command::Detail { name } => {
            let record = service.detail(&DetailQuery { name: name.clone() }).await?;
            match record.as_ref().and_then(|r| r.content()) {
                Some(content) => writeln!(out, "{content}")?,
                None => writeln!(out, "no detail available for {name:?}")?,
            }
        }
        Command::Goto {
            name,
            pick,
            globe,
            export,
        } => {
            let mut session = Session::with_map(config.clone(), service, map_for(&config, export.as_ref()));
            session.controller_mut().set_globe_enabled(globe);
            session.search(&name).await?;
            session.select(pick.saturating_sub(1)).await?;
            print_focus(session.controller(), &mut out)?;
            if export.is_some() {
                session
                    .controller_mut()
                    .export_snapshot()
                    .context("exporting the map")?;
                info!("snapshot written");
            }
        }
        Command::Repl { export } => {
            let mut session = Session::with_map(config.clone(), service, map_for(&config, export.as_ref()));
            writeln!(out, "type to search, :help for commands")?;
            session
                .run_repl(BufReader::new(tokio::io::stdin()), &mut out)
                .await?;
        }
    }
    out.flush()?;
    Ok(())
}

fn map_for(config: &SearchConfig, export: Option<&std::path::PathBuf>) -> MapModel {
    let map = MapModel::new(config.initial_view(), config.viewport());
    match export {
        Some(dir) => map.with_export_dir(dir),
        None => map,
    }
}
