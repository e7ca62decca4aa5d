//! # Ondes Schedule Clock
//!
//! Pure wall-clock arithmetic for the live-radio widget: given a fixed daily
//! program grid, compute which slot is on air and how far into it we are.
//!
//! The slot table is an ordered, non-overlapping sequence; both properties
//! are assumed by [`current_slot_index`] and checked by
//! [`slots_are_ordered`] in debug builds and tests.
//!
//! ## Example
//!
//! ```
//! use ondschedule::{current_slot_index, progress_percent, ProgramSlot};
//!
//! let slots = vec![
//!     ProgramSlot::new("slot-6-8", 6 * 3600, 8 * 3600, "Morning"),
//!     ProgramSlot::new("slot-8-10", 8 * 3600, 10 * 3600, "Culture"),
//! ];
//! let now = 9 * 3600;
//! let idx = current_slot_index(now, &slots).unwrap();
//! assert_eq!(idx, 1);
//! assert_eq!(progress_percent(now, &slots[idx]), 50.0);
//! ```

use chrono::{Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

/// One entry of the daily program grid.
///
/// Timestamps are epoch seconds; `start` is inclusive, `end` exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSlot {
    /// Stable identifier, e.g. "slot-6-8"
    pub id: String,
    /// Start of the slot (epoch seconds, inclusive)
    pub start: i64,
    /// End of the slot (epoch seconds, exclusive)
    pub end: i64,
    /// Display title of the program
    pub title: String,
}

impl ProgramSlot {
    /// Creates a slot from its parts.
    pub fn new(
        id: impl Into<String>,
        start: i64,
        end: i64,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            start,
            end,
            title: title.into(),
        }
    }

    /// Duration of the slot in seconds (may be non-positive for degenerate
    /// input; callers treat that as "no progress").
    pub fn duration_secs(&self) -> i64 {
        self.end - self.start
    }

    /// True when `now` falls inside the slot.
    pub fn contains(&self, now: i64) -> bool {
        self.start <= now && now < self.end
    }
}

/// Returns the index of the slot on air at `now`, or `None` when `now`
/// falls outside every slot.
pub fn current_slot_index(now: i64, slots: &[ProgramSlot]) -> Option<usize> {
    debug_assert!(slots_are_ordered(slots));
    slots.iter().position(|slot| slot.contains(now))
}

/// Consumption of `slot` at `now`, as a percentage clamped to `[0, 100]`.
///
/// Returns 0 when the slot duration is non-positive.
pub fn progress_percent(now: i64, slot: &ProgramSlot) -> f64 {
    let span = slot.duration_secs();
    if span <= 0 {
        return 0.0;
    }
    let pct = (now - slot.start) as f64 / span as f64 * 100.0;
    pct.clamp(0.0, 100.0)
}

/// Checks the grid invariant: sorted by start time and non-overlapping.
pub fn slots_are_ordered(slots: &[ProgramSlot]) -> bool {
    slots
        .windows(2)
        .all(|pair| pair[0].start <= pair[0].end && pair[0].end <= pair[1].start)
}

/// Titles of the fixed daily grid, one program every two hours from 06:00.
const PROGRAM_TITLES: [&str; 7] = [
    "Réveil Actu",
    "Matinale Culture",
    "Magazine Société",
    "Midi Infos",
    "Après-midi Musique",
    "Drive Actu",
    "Soir Magazine",
];

/// First slot starts at 06:00 local time; each slot lasts two hours.
const FIRST_SLOT_HOUR: u32 = 6;
const SLOT_HOURS: u32 = 2;

/// Builds the fixed daily grid for `date`, in local time.
///
/// Slots whose local time cannot be resolved (DST gaps) are skipped, which
/// keeps the ordering invariant intact.
pub fn daily_program(date: NaiveDate) -> Vec<ProgramSlot> {
    PROGRAM_TITLES
        .iter()
        .enumerate()
        .filter_map(|(i, title)| {
            let start_hour = FIRST_SLOT_HOUR + i as u32 * SLOT_HOURS;
            let end_hour = start_hour + SLOT_HOURS;
            let start = local_timestamp(date, start_hour)?;
            let end = local_timestamp(date, end_hour)?;
            Some(ProgramSlot::new(
                format!("slot-{}-{}", start_hour, end_hour),
                start,
                end,
                *title,
            ))
        })
        .collect()
}

/// Builds today's grid using the local clock.
pub fn todays_program() -> Vec<ProgramSlot> {
    daily_program(Local::now().date_naive())
}

fn local_timestamp(date: NaiveDate, hour: u32) -> Option<i64> {
    let naive = date.and_hms_opt(hour, 0, 0)?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: i64 = 3600;

    fn two_slots() -> Vec<ProgramSlot> {
        vec![
            ProgramSlot::new("x", 6 * HOUR, 8 * HOUR, "X"),
            ProgramSlot::new("y", 8 * HOUR, 10 * HOUR, "Y"),
        ]
    }

    #[test]
    fn test_current_slot_inside() {
        let slots = two_slots();
        let idx = current_slot_index(9 * HOUR, &slots);
        assert_eq!(idx, Some(1));
        assert_eq!(slots[1].title, "Y");
    }

    #[test]
    fn test_current_slot_outside() {
        let slots = two_slots();
        assert_eq!(current_slot_index(11 * HOUR, &slots), None);
        assert_eq!(current_slot_index(5 * HOUR, &slots), None);
    }

    #[test]
    fn test_slot_boundaries_half_open() {
        let slots = two_slots();
        // start is inclusive, end exclusive: 8h belongs to Y, not X.
        assert_eq!(current_slot_index(8 * HOUR, &slots), Some(1));
        assert_eq!(current_slot_index(10 * HOUR, &slots), None);
    }

    #[test]
    fn test_progress_midpoint() {
        let slots = two_slots();
        assert_eq!(progress_percent(9 * HOUR, &slots[1]), 50.0);
    }

    #[test]
    fn test_progress_clamped() {
        let slot = ProgramSlot::new("x", 6 * HOUR, 8 * HOUR, "X");
        assert_eq!(progress_percent(5 * HOUR, &slot), 0.0);
        assert_eq!(progress_percent(11 * HOUR, &slot), 100.0);
    }

    #[test]
    fn test_progress_degenerate_slot() {
        let slot = ProgramSlot::new("zero", 8 * HOUR, 8 * HOUR, "Zero");
        assert_eq!(progress_percent(8 * HOUR, &slot), 0.0);
        let inverted = ProgramSlot::new("neg", 8 * HOUR, 6 * HOUR, "Neg");
        assert_eq!(progress_percent(7 * HOUR, &inverted), 0.0);
    }

    #[test]
    fn test_daily_program_grid() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let slots = daily_program(date);
        assert_eq!(slots.len(), 7);
        assert!(slots_are_ordered(&slots));
        assert_eq!(slots[0].id, "slot-6-8");
        assert_eq!(slots[0].title, "Réveil Actu");
        assert_eq!(slots[6].id, "slot-18-20");
        // Every slot lasts exactly two hours (no DST transition on this date
        // in most timezones; duration check stays robust by comparing spans).
        for slot in &slots {
            assert!(slot.duration_secs() > 0);
        }
    }

    #[test]
    fn test_ordering_invariant_detects_overlap() {
        let overlapping = vec![
            ProgramSlot::new("a", 0, 2 * HOUR, "A"),
            ProgramSlot::new("b", HOUR, 3 * HOUR, "B"),
        ];
        assert!(!slots_are_ordered(&overlapping));
    }
}
