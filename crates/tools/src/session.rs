//! Terminal driver for the search controller.
//!
//! Lines typed into the REPL play the role of keystrokes in the search box;
//! lines starting with `:` are commands. Commands wait until pending
//! debounce windows and in-flight requests have settled so that `:pick 2`
//! refers to the list the user actually saw.

use std::collections::VecDeque;
use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use foundation::time::Time;
use futures_util::future::LocalBoxFuture;
use futures_util::stream::{FuturesUnordered, StreamExt};
use futures_util::FutureExt;
use map::{MapModel, MapSurface};
use search::{DetailResponse, SearchConfig, SearchController, SearchResponse, SearchResultItem};
use service::SearchService;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text typed into the search box.
    Text(String),
    Pick(usize),
    Cancel,
    Export,
    Globe(bool),
    List,
    Show,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let Some(rest) = line.strip_prefix(':') else {
            return Command::Text(line.to_string());
        };
        let mut words = rest.split_whitespace();
        match (words.next(), words.next()) {
            (Some("pick"), Some(n)) => match n.parse::<usize>() {
                Ok(n) if n >= 1 => Command::Pick(n),
                _ => Command::Unknown(line.to_string()),
            },
            (Some("cancel"), None) => Command::Cancel,
            (Some("export"), None) => Command::Export,
            (Some("globe"), Some("on")) => Command::Globe(true),
            (Some("globe"), Some("off")) => Command::Globe(false),
            (Some("list"), None) => Command::List,
            (Some("show"), None) => Command::Show,
            (Some("help"), None) => Command::Help,
            (Some("quit" | "q"), None) => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

enum Reply {
    Search(SearchResponse),
    Detail(DetailResponse),
}

pub struct Session<S> {
    service: S,
    controller: SearchController<MapModel>,
    epoch: Instant,
}

impl<S: SearchService> Session<S> {
    pub fn new(config: SearchConfig, service: S) -> Self {
        let map = MapModel::new(config.initial_view(), config.viewport());
        Self::with_map(config, service, map)
    }

    pub fn with_map(config: SearchConfig, service: S, map: MapModel) -> Self {
        Self {
            service,
            controller: SearchController::new(config, map),
            epoch: Instant::now(),
        }
    }

    pub fn controller(&self) -> &SearchController<MapModel> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut SearchController<MapModel> {
        &mut self.controller
    }

    /// Types `name` and runs the resulting search without waiting out the
    /// debounce window.
    pub async fn search(&mut self, name: &str) -> Result<&[SearchResultItem]> {
        let now = clock(&self.epoch);
        self.controller.on_key_input(name, now);
        let at = self.controller.next_deadline().unwrap_or(now);
        let dispatch = self
            .controller
            .poll(at)
            .ok_or_else(|| anyhow!("no search was dispatched"))?;
        let response = dispatch.run(&self.service).await;
        let failure = response.result.as_ref().err().cloned();
        self.controller.apply_search(response);
        if let Some(err) = failure {
            return Err(err).with_context(|| format!("searching for {name:?}"));
        }
        Ok(self.controller.results())
    }

    /// Selects the 0-based `index` of the current list, fetches its detail
    /// and applies the deferred render.
    pub async fn select(&mut self, index: usize) -> Result<&SearchResultItem> {
        let dispatch = self
            .controller
            .select_item(index)
            .with_context(|| format!("no result #{}", index + 1))?;
        let response = dispatch.run(&self.service).await;
        self.controller.apply_detail(response);
        self.controller.run_deferred();
        self.controller
            .selected()
            .ok_or_else(|| anyhow!("selection was cleared"))
    }

    pub async fn run_repl<R, W>(&mut self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let Session {
            service,
            controller,
            epoch,
        } = self;
        let service: &S = service;
        let epoch = *epoch;

        let mut lines = input.lines();
        let mut inflight: FuturesUnordered<LocalBoxFuture<'_, Reply>> = FuturesUnordered::new();
        let mut queued: VecDeque<Command> = VecDeque::new();
        let mut eof = false;

        loop {
            while controller.next_deadline().is_none() && inflight.is_empty() {
                let Some(command) = queued.pop_front() else {
                    break;
                };
                match command {
                    Command::Quit => return Ok(()),
                    Command::Pick(n) => match controller.select_item(n - 1) {
                        Some(dispatch) => {
                            debug!(pick = n, "detail dispatched");
                            inflight.push(dispatch.run(service).map(Reply::Detail).boxed_local());
                        }
                        None => writeln!(out, "no result #{n}")?,
                    },
                    other => execute(controller, other, out)?,
                }
            }

            let deadline = controller.next_deadline();
            if eof && queued.is_empty() && deadline.is_none() && inflight.is_empty() {
                break;
            }
            let wake = deadline.map(|t| epoch + Duration::from_secs_f64(t.0.max(0.0)));

            tokio::select! {
                line = lines.next_line(), if !eof && queued.is_empty() => {
                    match line.context("reading input")? {
                        None => eof = true,
                        Some(line) => match Command::parse(line.trim_end()) {
                            Command::Text(text) => controller.on_key_input(text, clock(&epoch)),
                            command => queued.push_back(command),
                        },
                    }
                }
                _ = sleep_until(wake), if wake.is_some() => {
                    // The timer fired at the deadline; poll there rather than
                    // at a rounded clock reading.
                    if let Some(dispatch) = deadline.and_then(|t| controller.poll(t)) {
                        debug!(name = %dispatch.query.name, "search dispatched");
                        inflight.push(dispatch.run(service).map(Reply::Search).boxed_local());
                    }
                }
                Some(reply) = inflight.next(), if !inflight.is_empty() => {
                    apply(controller, reply, out)?;
                }
                else => break,
            }
        }
        Ok(())
    }
}

fn clock(epoch: &Instant) -> Time {
    Time(epoch.elapsed().as_secs_f64())
}

async fn sleep_until(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

fn apply<W: Write>(controller: &mut SearchController<MapModel>, reply: Reply, out: &mut W) -> Result<()> {
    match reply {
        Reply::Search(response) => {
            if controller.apply_search(response) {
                print_notice(controller, out)?;
                print_results(controller, out)?;
            }
        }
        Reply::Detail(response) => {
            if controller.apply_detail(response) {
                controller.run_deferred();
                print_notice(controller, out)?;
                print_focus(controller, out)?;
            }
        }
    }
    Ok(())
}

fn execute<W: Write>(controller: &mut SearchController<MapModel>, command: Command, out: &mut W) -> Result<()> {
    match command {
        Command::Cancel => {
            controller.cancel();
            writeln!(out, "cleared")?;
        }
        Command::Export => {
            controller.export_snapshot().context("exporting the map")?;
            let bytes = controller.map().last_snapshot().map_or(0, |s| s.png.len());
            info!(bytes, "snapshot exported");
            writeln!(out, "exported map.png ({bytes} bytes)")?;
        }
        Command::Globe(enabled) => {
            controller.set_globe_enabled(enabled);
            print_globe(controller, out)?;
        }
        Command::List => print_results(controller, out)?,
        Command::Show => print_focus(controller, out)?,
        Command::Help => writeln!(
            out,
            "type to search; :pick N, :cancel, :export, :globe on|off, :list, :show, :quit"
        )?,
        Command::Unknown(line) => writeln!(out, "unknown command {line:?}, try :help")?,
        Command::Text(_) | Command::Pick(_) | Command::Quit => {}
    }
    Ok(())
}

pub fn print_results<M: MapSurface, W: Write>(controller: &SearchController<M>, out: &mut W) -> Result<()> {
    if controller.results().is_empty() {
        writeln!(out, "no matches")?;
    }
    for (i, item) in controller.results().iter().enumerate() {
        writeln!(
            out,
            "{:>2}. {}  ({:.4}, {:.4})  {}",
            i + 1,
            item.name,
            item.x,
            item.y,
            item.addr
        )?;
    }
    Ok(())
}

pub fn print_focus<W: Write>(controller: &SearchController<MapModel>, out: &mut W) -> Result<()> {
    let view = controller.map().view();
    let (lon, lat) = view.center_lon_lat();
    match controller.selected() {
        Some(item) => writeln!(out, "at {} ({lon:.4}, {lat:.4}) zoom {}", item.name, view.zoom)?,
        None => writeln!(out, "at ({lon:.4}, {lat:.4}) zoom {}", view.zoom)?,
    }
    if controller.detail_visible() {
        if controller.has_detail() {
            writeln!(out, "{}", controller.detail_html())?;
        } else {
            writeln!(out, "no detail available")?;
        }
    }
    if controller.map().globe_enabled() {
        print_globe(controller, out)?;
    }
    Ok(())
}

fn print_globe<W: Write>(controller: &SearchController<MapModel>, out: &mut W) -> Result<()> {
    let globe = controller.map().globe();
    if !globe.enabled() {
        writeln!(out, "globe off")?;
        return Ok(());
    }
    let camera = globe.camera();
    let eye = camera.eye();
    writeln!(
        out,
        "globe camera ({:.4}, {:.4}) altitude {:.0} m, eye ecef ({:.0}, {:.0}, {:.0})",
        camera.lon_deg, camera.lat_deg, camera.altitude_m, eye.x, eye.y, eye.z
    )?;
    Ok(())
}

fn print_notice<M: MapSurface, W: Write>(controller: &SearchController<M>, out: &mut W) -> Result<()> {
    if let Some(notice) = controller.notice() {
        writeln!(out, "! {notice}")?;
    }
    Ok(())
}
