//! Ondes — terminal front-end for the streaming playback engine
//!
//! Two widgets, one binary:
//! - default: the rotating catalog playlist player (`/` opens a search
//!   prompt that re-queries the catalog);
//! - `--live [--station NAME]`: the live-station player with quality
//!   variants (keys 1..9) and the daily program schedule.
//!
//! Keyboard: Space play/pause, ←/→ previous/next, m mute, +/- volume,
//! r reload, q or Esc quit. Shortcuts are suppressed while the search
//! prompt is open.

mod input;
mod status;

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent};
use crossterm::terminal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ondplayer::{device_channel, Engine, EngineOptions, RodioDevice};
use ondschedule::todays_program;
use ondsource::{
    default_stations, find_station, CatalogClient, CatalogConfigExt, TrackQuery, TrackSource,
};

use input::KeyboardBinding;

struct Args {
    live: bool,
    station: Option<String>,
    search: Option<String>,
}

fn parse_args() -> Args {
    let mut args = Args {
        live: false,
        station: None,
        search: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--live" => args.live = true,
            "--station" => args.station = iter.next(),
            "--search" => args.search = iter.next(),
            other => warn!("Ignoring unknown argument: {other}"),
        }
    }
    args
}

fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args();
    let config = ondconfig::get_config();

    // One audio device per widget instance; the engine owns it exclusively.
    let (events_tx, events_rx) = device_channel();
    let device = RodioDevice::spawn(events_tx).context("audio device")?;
    let engine = Engine::new(
        Box::new(device),
        events_rx,
        EngineOptions {
            initial_volume: None,
            config: Some(config.clone()),
        },
    );

    let provider: Option<Arc<dyn TrackSource>> = if args.live {
        let stations = default_stations();
        let station = match &args.station {
            Some(name) => find_station(&stations, name)
                .cloned()
                .with_context(|| format!("unknown station: {name}"))?,
            None => stations[0].clone(),
        };
        info!(station = %station.name, "Live mode");
        engine.set_station(station)?;
        None
    } else {
        let client = Arc::new(CatalogClient::from_config(&config)?);
        let query = base_query(&config, args.search.clone());
        engine.fetch(client.clone(), query)?;
        Some(client)
    };

    terminal::enable_raw_mode().context("raw mode")?;
    let result = run_ui(&engine, provider, &config, args.live).await;
    terminal::disable_raw_mode().ok();
    println!();

    engine.shutdown().await;
    result
}

fn base_query(config: &ondconfig::Config, search: Option<String>) -> TrackQuery {
    let mut query = TrackQuery::default()
        .with_tags(config.get_catalog_tags())
        .with_limit(config.get_catalog_limit());
    query.search = search;
    query
}

async fn run_ui(
    engine: &Engine,
    provider: Option<Arc<dyn TrackSource>>,
    config: &Arc<ondconfig::Config>,
    live: bool,
) -> Result<()> {
    let (key_tx, mut key_rx) = tokio::sync::mpsc::unbounded_channel::<KeyEvent>();
    let keyboard = KeyboardBinding::attach(key_tx);

    let program = if live { todays_program() } else { Vec::new() };
    let mut snapshots = engine.subscribe();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));

    // Search prompt state; while `Some`, every shortcut is suppressed and
    // keys type into the buffer instead.
    let mut search: Option<String> = None;

    loop {
        redraw(engine, live, &program, search.as_deref())?;

        tokio::select! {
            maybe_key = key_rx.recv() => {
                let Some(key) = maybe_key else { break };
                if let Some(buffer) = search.as_mut() {
                    match key.code {
                        KeyCode::Esc => search = None,
                        KeyCode::Enter => {
                            let text = buffer.trim().to_string();
                            search = None;
                            if let Some(provider) = &provider {
                                let mut query = base_query(config, None);
                                if !text.is_empty() {
                                    query.search = Some(text);
                                }
                                engine.fetch(provider.clone(), query)?;
                            }
                        }
                        KeyCode::Backspace => { buffer.pop(); }
                        KeyCode::Char(c) => buffer.push(c),
                        _ => {}
                    }
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char(' ') => engine.toggle_play()?,
                    KeyCode::Right => engine.next()?,
                    KeyCode::Left => engine.prev()?,
                    KeyCode::Char('m') => engine.toggle_mute()?,
                    KeyCode::Char('r') => engine.reload()?,
                    KeyCode::Char('+') => {
                        engine.set_volume(engine.snapshot().volume + 0.05)?;
                    }
                    KeyCode::Char('-') => {
                        engine.set_volume(engine.snapshot().volume - 0.05)?;
                    }
                    KeyCode::Char('/') if provider.is_some() => {
                        search = Some(String::new());
                    }
                    KeyCode::Char(c) if live && c.is_ascii_digit() && c != '0' => {
                        let index = c as usize - '1' as usize;
                        engine.select_variant(index)?;
                    }
                    _ => {}
                }
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = ticker.tick() => {}
        }
    }

    keyboard.detach();
    Ok(())
}

fn redraw(
    engine: &Engine,
    live: bool,
    program: &[ondschedule::ProgramSlot],
    search: Option<&str>,
) -> Result<()> {
    let line = if let Some(buffer) = search {
        status::search_line(buffer)
    } else {
        let session = engine.snapshot();
        if live {
            status::live_line(&session, now_epoch(), program)
        } else {
            status::playlist_line(&session)
        }
    };
    status::draw(&line)?;
    Ok(())
}
