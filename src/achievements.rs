use crate::storage::{KeyValueStore, ACHIEVEMENTS_SHOWN_KEY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

/// Aggregates the achievement rules are checked against. Streaks here come
/// from the server's full history, not from the local ledger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AchievementStats {
    pub total_moods: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub gad7_count: u32,
    pub phq9_count: u32,
    pub trend: f64,
}

pub struct Achievement {
    pub id: &'static str,
    pub icon: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    unlocked: fn(&AchievementStats) -> bool,
}

impl Achievement {
    pub fn is_unlocked(&self, stats: &AchievementStats) -> bool {
        (self.unlocked)(stats)
    }
}

pub const CATALOGUE: &[Achievement] = &[
    Achievement {
        id: "first_mood",
        icon: "🌟",
        name: "First Step",
        description: "Log your first mood",
        unlocked: |s| s.total_moods >= 1,
    },
    Achievement {
        id: "week_streak",
        icon: "🔥",
        name: "On a Roll",
        description: "Keep a 7-day streak",
        unlocked: |s| s.current_streak >= 7,
    },
    Achievement {
        id: "month_streak",
        icon: "💪",
        name: "Unstoppable",
        description: "Keep a 30-day streak",
        unlocked: |s| s.current_streak >= 30,
    },
    Achievement {
        id: "first_gad7",
        icon: "📋",
        name: "Self-Aware",
        description: "Complete your first GAD-7 assessment",
        unlocked: |s| s.gad7_count >= 1,
    },
    Achievement {
        id: "first_phq9",
        icon: "📝",
        name: "Introspective",
        description: "Complete your first PHQ-9 assessment",
        unlocked: |s| s.phq9_count >= 1,
    },
    Achievement {
        id: "both_assessments",
        icon: "🎯",
        name: "Explorer",
        description: "Complete both assessments",
        unlocked: |s| s.gad7_count >= 1 && s.phq9_count >= 1,
    },
    Achievement {
        id: "ten_moods",
        icon: "📊",
        name: "Consistent",
        description: "Log 10 moods",
        unlocked: |s| s.total_moods >= 10,
    },
    Achievement {
        id: "fifty_moods",
        icon: "🏆",
        name: "Dedicated",
        description: "Log 50 moods",
        unlocked: |s| s.total_moods >= 50,
    },
    Achievement {
        id: "five_assessments",
        icon: "🔬",
        name: "Researcher",
        description: "Complete 5 assessments in total",
        unlocked: |s| s.gad7_count + s.phq9_count >= 5,
    },
    Achievement {
        id: "improving",
        icon: "📈",
        name: "Improving",
        description: "Your mood trend is positive",
        unlocked: |s| s.trend > 0.2,
    },
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementStatus {
    pub id: String,
    pub icon: String,
    pub name: String,
    /// Hidden until unlocked.
    pub description: Option<String>,
    pub unlocked: bool,
    pub is_new: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementBoard {
    pub achievements: Vec<AchievementStatus>,
    pub unlocked_count: usize,
    pub total: usize,
}

/// Checks every achievement. Newly unlocked ones are flagged once and added
/// to `shown`.
pub fn evaluate(stats: &AchievementStats, shown: &mut BTreeSet<String>) -> AchievementBoard {
    let achievements: Vec<AchievementStatus> = CATALOGUE
        .iter()
        .map(|achievement| {
            let unlocked = achievement.is_unlocked(stats);
            let is_new = unlocked && shown.insert(achievement.id.to_string());
            AchievementStatus {
                id: achievement.id.to_string(),
                icon: achievement.icon.to_string(),
                name: achievement.name.to_string(),
                description: unlocked.then(|| achievement.description.to_string()),
                unlocked,
                is_new,
            }
        })
        .collect();

    AchievementBoard {
        unlocked_count: achievements.iter().filter(|a| a.unlocked).count(),
        total: achievements.len(),
        achievements,
    }
}

pub fn load_shown(store: &impl KeyValueStore) -> BTreeSet<String> {
    let Some(raw) = store.get(ACHIEVEMENTS_SHOWN_KEY) else {
        return BTreeSet::new();
    };
    serde_json::from_str(&raw).unwrap_or_else(|err| {
        warn!("ignoring malformed {ACHIEVEMENTS_SHOWN_KEY} value: {err}");
        BTreeSet::new()
    })
}

pub fn save_shown(store: &mut impl KeyValueStore, shown: &BTreeSet<String>) {
    match serde_json::to_string(shown) {
        Ok(raw) => store.set(ACHIEVEMENTS_SHOWN_KEY, raw),
        Err(err) => warn!("failed to encode shown achievements: {err}"),
    }
}
