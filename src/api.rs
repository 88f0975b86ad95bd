use crate::achievements::AchievementStats;
use crate::calendar::{CalendarEntries, CalendarNav};
use crate::models::CheckinEvent;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("unexpected status {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// The remote wellness REST API.
#[async_trait]
pub trait WellnessApi: Send + Sync {
    async fn fetch_month(&self, target: CalendarNav) -> Result<CalendarEntries, ApiError>;

    async fn submit_checkin(&self, event: &CheckinEvent) -> Result<(), ApiError>;

    async fn fetch_stats(&self) -> Result<AchievementStats, ApiError>;
}

#[derive(Debug, Deserialize)]
struct CalendarResponse {
    #[serde(default)]
    entries: Option<CalendarEntries>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct MoodStatsResponse {
    total_entries: u32,
    current_streak: u32,
    longest_streak: u32,
    trend: f64,
}

#[derive(Debug, Clone)]
pub struct HttpWellnessApi {
    client: Client,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl HttpWellnessApi {
    pub fn new(base_url: impl Into<String>, token: Option<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            timeout,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn prepare(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.timeout(self.timeout);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = self
            .prepare(request)
            .send()
            .await
            .map_err(|err| self.classify(err))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status,
            message: error_message(&body).unwrap_or_else(|| format!("Error {}", status.as_u16())),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.client.get(self.url(path))).await?;
        response.json::<T>().await.map_err(|err| {
            if err.is_timeout() {
                ApiError::Timeout(self.timeout)
            } else {
                ApiError::Decode(err.to_string())
            }
        })
    }

    fn classify(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout(self.timeout)
        } else {
            ApiError::Connect(err.to_string())
        }
    }
}

/// Pulls `message` or `error` out of a JSON error body, else the raw text.
fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["message", "error"] {
            if let Some(text) = value.get(field).and_then(|v| v.as_str()) {
                return Some(text.to_string());
            }
        }
    }
    Some(body.to_string())
}

#[async_trait]
impl WellnessApi for HttpWellnessApi {
    async fn fetch_month(&self, target: CalendarNav) -> Result<CalendarEntries, ApiError> {
        let path = format!("/mood/calendar?year={}&month={}", target.year, target.month);
        let body: CalendarResponse = self.get_json(&path).await?;
        let entries = body.entries.unwrap_or_default();
        debug!(
            "fetched {} calendar entries for {}-{:02}",
            entries.len(),
            target.year,
            target.month
        );
        Ok(entries)
    }

    async fn submit_checkin(&self, event: &CheckinEvent) -> Result<(), ApiError> {
        self.send(self.client.post(self.url("/checkins")).json(event))
            .await?;
        Ok(())
    }

    async fn fetch_stats(&self) -> Result<AchievementStats, ApiError> {
        let mood: MoodStatsResponse = self.get_json("/mood/stats?days=365").await?;
        let history: serde_json::Value = self.get_json("/assessments/history").await?;
        let (gad7_count, phq9_count) = count_assessments(&history);

        Ok(AchievementStats {
            total_moods: mood.total_entries,
            current_streak: mood.current_streak,
            longest_streak: mood.longest_streak,
            gad7_count,
            phq9_count,
            trend: mood.trend,
        })
    }
}

fn count_assessments(history: &serde_json::Value) -> (u32, u32) {
    let Some(items) = history.as_array() else {
        return (0, 0);
    };
    items.iter().fold((0, 0), |(gad, phq), item| {
        let kind = item
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if kind.contains("gad") {
            (gad + 1, phq)
        } else if kind.contains("phq") {
            (gad, phq + 1)
        } else {
            (gad, phq)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_message_prefers_json_fields() {
        assert_eq!(error_message(r#"{"message":"nope"}"#).as_deref(), Some("nope"));
        assert_eq!(
            error_message(r#"{"error":"Not authenticated"}"#).as_deref(),
            Some("Not authenticated")
        );
        assert_eq!(error_message("plain text").as_deref(), Some("plain text"));
        assert_eq!(error_message("   "), None);
    }

    #[test]
    fn assessment_history_is_counted_by_type() {
        let history = json!([
            { "type": "GAD7" },
            { "type": "phq-9" },
            { "type": "gad-7" },
            { "type": "other" },
            { "score": 3 }
        ]);
        assert_eq!(count_assessments(&history), (2, 1));
        assert_eq!(count_assessments(&json!({ "items": [] })), (0, 0));
    }

    #[test]
    fn calendar_response_tolerates_missing_entries() {
        let body: CalendarResponse = serde_json::from_value(json!({ "year": 2025 })).unwrap();
        assert!(body.entries.is_none());

        let body: CalendarResponse = serde_json::from_value(json!({
            "entries": {
                "2025-01-02": { "id": 1, "score": 3, "emoji": "😐", "label": "Neutral" }
            }
        }))
        .unwrap();
        assert_eq!(body.entries.unwrap()["2025-01-02"].score, 3);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let api =
            HttpWellnessApi::new("http://localhost:9/api/v1/", None, Duration::from_millis(50));
        assert_eq!(api.url("/checkins"), "http://localhost:9/api/v1/checkins");
    }

    #[tokio::test]
    async fn unreachable_host_is_a_connectivity_error() {
        // Port 9 (discard) is not expected to be listening on loopback.
        let api = HttpWellnessApi::new("http://127.0.0.1:9", None, Duration::from_millis(500));
        let err = api
            .fetch_month(CalendarNav { year: 2025, month: 1 })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Connect(_) | ApiError::Timeout(_)), "{err:?}");
    }

    #[tokio::test]
    async fn slow_upstream_hits_the_request_timeout() {
        let app = axum::Router::new().route(
            "/mood/calendar",
            axum::routing::get(|| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                axum::Json(json!({ "entries": {} }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let timeout = Duration::from_millis(50);
        let api = HttpWellnessApi::new(format!("http://{addr}"), None, timeout);
        let err = api
            .fetch_month(CalendarNav { year: 2025, month: 1 })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Timeout(t) if t == timeout), "{err:?}");
    }
}
