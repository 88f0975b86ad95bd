use axum::{
    extract::Query,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{Datelike, Local};
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct Ledger {
    points: u64,
    streak: u32,
    #[serde(rename = "lastCheckinDate")]
    last_checkin_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Badge {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GamificationResponse {
    ledger: Ledger,
    badge: Badge,
}

#[derive(Debug, Deserialize)]
struct CheckinResponse {
    ledger: Ledger,
    transition: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarView {
    mode: String,
    can_go_next: bool,
    cells: Vec<Value>,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

/// Stand-in for the remote wellness API, served from its own thread so it
/// outlives any single test runtime.
static STUB_API: Lazy<String> = Lazy::new(|| {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub api");
    let port = listener.local_addr().unwrap().port();
    listener.set_nonblocking(true).unwrap();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("stub runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, stub_router()).await.unwrap();
        });
    });
    format!("http://127.0.0.1:{port}")
});

fn today_key() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

fn stub_router() -> Router {
    Router::new()
        .route("/mood/calendar", get(stub_calendar))
        .route("/checkins", post(stub_checkin))
        .route(
            "/mood/stats",
            get(|| async {
                Json(json!({
                    "totalEntries": 3,
                    "currentStreak": 1,
                    "longestStreak": 2,
                    "trend": 0.0
                }))
            }),
        )
        .route(
            "/assessments/history",
            get(|| async { Json(json!([{ "type": "GAD7" }])) }),
        )
}

async fn stub_calendar(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let today = Local::now().date_naive();
    let same_month = params.get("year") == Some(&today.year().to_string())
        && params.get("month") == Some(&today.month().to_string());
    if !same_month {
        return Json(json!({ "entries": {} }));
    }
    let mut entries = serde_json::Map::new();
    entries.insert(
        today_key(),
        json!({ "id": 1, "score": 4, "emoji": "🙂", "label": "Good", "notes": "walked" }),
    );
    Json(json!({ "entries": entries }))
}

async fn stub_checkin(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    // PHQ-9 submissions fail upstream so the error path can be exercised.
    if body["kind"] == "phq9" {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "maintenance" })),
        );
    }
    (StatusCode::CREATED, Json(json!({})))
}

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("mood_ledger_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/gamification")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_mood_ledger"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("WELLNESS_API_URL", STUB_API.as_str())
        .env("API_TIMEOUT_MS", "2000")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn gamification(client: &Client, base_url: &str) -> GamificationResponse {
    client
        .get(format!("{base_url}/api/gamification"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_checkin_pays_points_and_keeps_same_day_streak() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = gamification(&client, &server.base_url).await;

    let first: CheckinResponse = client
        .post(format!("{}/api/checkin", server.base_url))
        .json(&json!({ "kind": "mood" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first.ledger.points, before.ledger.points + 10);
    assert_eq!(first.ledger.streak, 1);
    assert_eq!(first.ledger.last_checkin_date.as_deref(), Some(today_key().as_str()));

    let second: CheckinResponse = client
        .post(format!("{}/api/checkin", server.base_url))
        .json(&json!({ "kind": "gad7" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second.transition, "same_day");
    assert_eq!(second.ledger.points, first.ledger.points + 10);
    assert_eq!(second.ledger.streak, 1);

    let after = gamification(&client, &server.base_url).await;
    assert_eq!(after.ledger.points, second.ledger.points);
    assert!(after.badge.text.starts_with("Streak: 1 day"));
}

#[tokio::test]
async fn http_checkin_rejects_unknown_kind_and_upstream_failure() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = gamification(&client, &server.base_url).await;

    let bad = client
        .post(format!("{}/api/checkin", server.base_url))
        .json(&json!({ "kind": "breathing" }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status(), reqwest::StatusCode::BAD_REQUEST);

    let upstream = client
        .post(format!("{}/api/checkin", server.base_url))
        .json(&json!({ "kind": "phq9" }))
        .send()
        .await
        .unwrap();
    assert_eq!(upstream.status(), reqwest::StatusCode::BAD_GATEWAY);

    let after = gamification(&client, &server.base_url).await;
    assert_eq!(after.ledger.points, before.ledger.points);
    assert_eq!(after.ledger.streak, before.ledger.streak);
}

#[tokio::test]
async fn http_calendar_links_entries_and_blocks_future_months() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let mut view: CalendarView = client
        .get(format!("{}/api/calendar", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    if view.mode == "week" {
        view = client
            .post(format!("{}/api/calendar/toggle", server.base_url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
    }
    assert_eq!(view.mode, "month");
    assert!(!view.can_go_next);

    let today = today_key();
    let linked: Vec<&Value> = view
        .cells
        .iter()
        .filter(|cell| cell["kind"] == "day" && !cell["entry"].is_null())
        .collect();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0]["dateKey"], today.as_str());
    assert_eq!(linked[0]["isToday"], true);

    let after_next: CalendarView = client
        .post(format!("{}/api/calendar/next", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(after_next.cells.len(), view.cells.len());

    let html = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains(&format!(r#"data-date="{today}" data-score="4""#)));
}
