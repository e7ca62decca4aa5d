//! Single-line status rendering

use std::io::{self, Write};

use crossterm::{
    cursor::MoveToColumn,
    style::Print,
    terminal::{Clear, ClearType},
    QueueableCommand,
};
use ondplayer::{PlaybackPhase, PlaybackSession};
use ondschedule::{current_slot_index, progress_percent, ProgramSlot};

/// Formats seconds as `m:ss`; unknown values render as `0:00`.
pub fn fmt_time(secs: f64) -> String {
    if !secs.is_finite() || secs < 0.0 {
        return "0:00".to_string();
    }
    let total = secs as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

fn phase_label(session: &PlaybackSession) -> String {
    match session.phase {
        PlaybackPhase::Error => session
            .error
            .clone()
            .unwrap_or_else(|| "error".to_string()),
        phase => phase.as_str().to_string(),
    }
}

/// One status line for the playlist widget.
pub fn playlist_line(session: &PlaybackSession) -> String {
    let title = session
        .current
        .as_ref()
        .map(|c| format!("{} — {}", c.title, c.subtitle))
        .unwrap_or_else(|| "no track".to_string());
    let volume = if session.muted {
        "muted".to_string()
    } else {
        format!("vol {:.0}%", session.volume * 100.0)
    };
    format!(
        "[{}] {} | {}/{} | {}",
        phase_label(session),
        title,
        fmt_time(session.position),
        fmt_time(session.duration),
        volume,
    )
}

/// One status line for the live widget, with the current program slot.
pub fn live_line(session: &PlaybackSession, now: i64, program: &[ProgramSlot]) -> String {
    let on_air = match current_slot_index(now, program) {
        Some(idx) => {
            let slot = &program[idx];
            format!("{} ({:.0}%)", slot.title, progress_percent(now, slot))
        }
        None => "no scheduled program".to_string(),
    };
    let stream = session
        .current
        .as_ref()
        .map(|c| format!("{} [{}]", c.title, c.subtitle))
        .unwrap_or_else(|| "no station".to_string());
    let volume = if session.muted {
        "muted".to_string()
    } else {
        format!("vol {:.0}%", session.volume * 100.0)
    };
    format!(
        "[{}] {} | {} | {}",
        phase_label(session),
        stream,
        on_air,
        volume,
    )
}

/// Line shown while the search prompt is active.
pub fn search_line(buffer: &str) -> String {
    format!("search: {buffer}_")
}

/// Redraws the status line in place.
pub fn draw(line: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    stdout.queue(MoveToColumn(0))?;
    stdout.queue(Clear(ClearType::CurrentLine))?;
    stdout.queue(Print(line))?;
    stdout.flush()
}
