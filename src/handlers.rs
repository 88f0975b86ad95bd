use crate::achievements::{evaluate, load_shown, save_shown, AchievementBoard, AchievementStats};
use crate::calendar::{CalendarNav, CalendarView};
use crate::datekey::format_date_key;
use crate::errors::AppError;
use crate::models::{
    CheckinEvent, CheckinKind, CheckinRequest, CheckinResponse, GamificationResponse,
};
use crate::state::AppState;
use crate::storage::load_ledger;
use crate::streak::{hero_badge, record_checkin};
use crate::ui::render_index;
use axum::{
    extract::State,
    response::{Html, Redirect},
    Form, Json,
};
use chrono::{Local, NaiveDate};
use tracing::{info, warn};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let today = today();

    if let Err(err) = ensure_calendar_loaded(&state).await {
        warn!("rendering calendar without entries: {}", err.message);
    }

    let badge = {
        let store = state.store.lock().await;
        hero_badge(&load_ledger(&*store))
    };
    let calendar = state.calendar.lock().await.view_at(today);
    let achievements = achievement_board(&state).await;

    Html(render_index(
        &format_date_key(today),
        &badge,
        &calendar,
        &achievements,
    ))
}

pub async fn get_gamification(
    State(state): State<AppState>,
) -> Result<Json<GamificationResponse>, AppError> {
    let store = state.store.lock().await;
    let ledger = load_ledger(&*store);
    Ok(Json(GamificationResponse {
        badge: hero_badge(&ledger),
        ledger,
    }))
}

pub async fn checkin(
    State(state): State<AppState>,
    Json(payload): Json<CheckinRequest>,
) -> Result<Json<CheckinResponse>, AppError> {
    let kind = parse_kind(&payload.kind)?;
    let response = apply_checkin(&state, kind).await?;
    Ok(Json(response))
}

pub async fn checkin_form(
    State(state): State<AppState>,
    Form(payload): Form<CheckinRequest>,
) -> Result<Redirect, AppError> {
    let kind = parse_kind(&payload.kind)?;
    apply_checkin(&state, kind).await?;
    Ok(Redirect::to("/"))
}

pub async fn get_calendar(State(state): State<AppState>) -> Result<Json<CalendarView>, AppError> {
    ensure_calendar_loaded(&state).await?;
    let view = state.calendar.lock().await.view_at(today());
    Ok(Json(view))
}

pub async fn calendar_next(State(state): State<AppState>) -> Result<Json<CalendarView>, AppError> {
    navigate(&state, Direction::Next).await?;
    get_calendar(State(state)).await
}

pub async fn calendar_prev(State(state): State<AppState>) -> Result<Json<CalendarView>, AppError> {
    navigate(&state, Direction::Prev).await?;
    get_calendar(State(state)).await
}

pub async fn calendar_toggle(
    State(state): State<AppState>,
) -> Result<Json<CalendarView>, AppError> {
    let mode = state.calendar.lock().await.toggle_mode();
    info!("calendar mode set to {mode:?}");
    get_calendar(State(state)).await
}

pub async fn calendar_next_form(State(state): State<AppState>) -> Result<Redirect, AppError> {
    navigate(&state, Direction::Next).await?;
    Ok(Redirect::to("/"))
}

pub async fn calendar_prev_form(State(state): State<AppState>) -> Result<Redirect, AppError> {
    navigate(&state, Direction::Prev).await?;
    Ok(Redirect::to("/"))
}

pub async fn calendar_toggle_form(State(state): State<AppState>) -> Redirect {
    state.calendar.lock().await.toggle_mode();
    Redirect::to("/")
}

pub async fn get_achievements(
    State(state): State<AppState>,
) -> Result<Json<AchievementBoard>, AppError> {
    Ok(Json(achievement_board(&state).await))
}

fn parse_kind(raw: &str) -> Result<CheckinKind, AppError> {
    CheckinKind::parse(raw)
        .ok_or_else(|| AppError::bad_request("kind must be 'mood', 'gad7' or 'phq9'"))
}

async fn apply_checkin(state: &AppState, kind: CheckinKind) -> Result<CheckinResponse, AppError> {
    let today = today();
    let event = CheckinEvent {
        kind,
        date: format_date_key(today),
    };
    state.api.submit_checkin(&event).await?;

    // The shared store only changes once the new ledger is on disk.
    let (ledger, transition) = {
        let mut store = state.store.lock().await;
        let mut staged = store.clone();
        let outcome = record_checkin(&mut staged, today);
        staged.persist().await?;
        *store = staged;
        outcome
    };

    if kind == CheckinKind::Mood {
        if let Err(err) = refresh_calendar(state).await {
            warn!("calendar refresh after check-in failed: {}", err.message);
        }
    }

    Ok(CheckinResponse {
        badge: hero_badge(&ledger),
        ledger,
        transition: transition.to_string(),
    })
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Next,
    Prev,
}

async fn navigate(state: &AppState, direction: Direction) -> Result<(), AppError> {
    let today = today();
    let moved = {
        let mut calendar = state.calendar.lock().await;
        match direction {
            Direction::Next => calendar.next(today),
            Direction::Prev => calendar.prev(today),
        }
    };
    if moved {
        refresh_calendar(state).await?;
    }
    Ok(())
}

async fn ensure_calendar_loaded(state: &AppState) -> Result<(), AppError> {
    let loaded = {
        let calendar = state.calendar.lock().await;
        calendar.loaded_for == Some(calendar.nav)
    };
    if loaded {
        return Ok(());
    }
    refresh_calendar(state).await
}

/// Fetches the viewed month without holding the lock across the request.
async fn refresh_calendar(state: &AppState) -> Result<(), AppError> {
    let target: CalendarNav = state.calendar.lock().await.nav;
    let entries = state.api.fetch_month(target).await?;
    state.calendar.lock().await.apply_entries(target, entries);
    Ok(())
}

async fn achievement_board(state: &AppState) -> AchievementBoard {
    let stats = match state.api.fetch_stats().await {
        Ok(stats) => stats,
        Err(err) => {
            warn!("achievement stats unavailable: {err}");
            AchievementStats::default()
        }
    };

    let mut store = state.store.lock().await;
    let mut shown = load_shown(&*store);
    let before = shown.len();
    let board = evaluate(&stats, &mut shown);
    if shown.len() != before {
        save_shown(&mut *store, &shown);
        if let Err(err) = store.persist().await {
            warn!("failed to persist shown achievements: {}", err.message);
        }
    }
    board
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
