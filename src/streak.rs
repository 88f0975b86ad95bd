use crate::datekey::days_between;
use crate::models::{GamificationLedger, HeroBadge};
use crate::storage::{load_ledger, save_ledger, KeyValueStore};
use chrono::NaiveDate;
use std::fmt;
use tracing::{info, warn};

/// Points granted for every completed check-in.
pub const FIXED_REWARD: u64 = 10;

/// Streak length from which the dashboard badge is shown as "hot".
const HOT_STREAK: u32 = 5;

/// Which rule fired when a check-in was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    First,
    SameDay,
    NextDay,
    Reset,
    /// `now` is earlier than the last recorded day; the streak is left alone.
    ClockSkew,
}

impl Transition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::SameDay => "same_day",
            Self::NextDay => "next_day",
            Self::Reset => "reset",
            Self::ClockSkew => "clock_skew",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl GamificationLedger {
    pub fn checkin(&self, now: NaiveDate) -> (GamificationLedger, Transition) {
        let (streak, transition) = match self.last_checkin_date {
            None => (1, Transition::First),
            Some(last) => match days_between(last, now) {
                0 => (self.streak, Transition::SameDay),
                1 => (self.streak.saturating_add(1), Transition::NextDay),
                diff if diff > 1 => (1, Transition::Reset),
                _ => (self.streak, Transition::ClockSkew),
            },
        };

        let next = GamificationLedger {
            points: self.points.saturating_add(FIXED_REWARD),
            streak,
            last_checkin_date: Some(now),
        };
        (next, transition)
    }
}

/// Loads the ledger, applies one check-in for `now` and writes it back.
pub fn record_checkin(
    store: &mut impl KeyValueStore,
    now: NaiveDate,
) -> (GamificationLedger, Transition) {
    let current = load_ledger(store);
    let (next, transition) = current.checkin(now);
    if transition == Transition::ClockSkew {
        warn!(
            "check-in dated {now} precedes last check-in {:?}; streak kept at {}",
            current.last_checkin_date, next.streak
        );
    }
    save_ledger(store, &next);

    info!(
        "check-in {transition}: streak {} -> {}, points {} -> {}",
        current.streak, next.streak, current.points, next.points
    );
    (next, transition)
}

pub fn hero_badge(ledger: &GamificationLedger) -> HeroBadge {
    if ledger.is_pristine() {
        return HeroBadge {
            text: format!("+{FIXED_REWARD} points on completion"),
            hot: false,
        };
    }

    let unit = if ledger.streak == 1 { "day" } else { "days" };
    HeroBadge {
        text: format!(
            "Streak: {} {unit} · Points: {}",
            ledger.streak, ledger.points
        ),
        hot: ledger.streak >= HOT_STREAK,
    }
}
