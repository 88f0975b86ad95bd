use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Persisted (points, streak, last check-in day) tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GamificationLedger {
    pub points: u64,
    pub streak: u32,
    pub last_checkin_date: Option<NaiveDate>,
}

impl GamificationLedger {
    pub fn is_pristine(&self) -> bool {
        self.points == 0 && self.streak == 0
    }
}

/// One day's mood log as served by the remote calendar endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDayEntry {
    pub id: serde_json::Value,
    pub score: u8,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub sleep_hours: Option<f64>,
    #[serde(default)]
    pub sleep_quality: Option<u8>,
    #[serde(default)]
    pub tags: Option<String>,
}

impl CalendarDayEntry {
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckinKind {
    Mood,
    Gad7,
    Phq9,
}

impl CheckinKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mood" => Some(Self::Mood),
            "gad7" | "gad-7" => Some(Self::Gad7),
            "phq9" | "phq-9" => Some(Self::Phq9),
            _ => None,
        }
    }
}

/// Body sent upstream when a check-in completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckinEvent {
    pub kind: CheckinKind,
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckinRequest {
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroBadge {
    pub text: String,
    pub hot: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GamificationResponse {
    pub ledger: GamificationLedger,
    pub badge: HeroBadge,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckinResponse {
    pub ledger: GamificationLedger,
    pub badge: HeroBadge,
    pub transition: String,
}
