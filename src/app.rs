use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/checkin", post(handlers::checkin_form))
        .route("/calendar/next", post(handlers::calendar_next_form))
        .route("/calendar/prev", post(handlers::calendar_prev_form))
        .route("/calendar/toggle", post(handlers::calendar_toggle_form))
        .route("/api/gamification", get(handlers::get_gamification))
        .route("/api/checkin", post(handlers::checkin))
        .route("/api/calendar", get(handlers::get_calendar))
        .route("/api/calendar/next", post(handlers::calendar_next))
        .route("/api/calendar/prev", post(handlers::calendar_prev))
        .route("/api/calendar/toggle", post(handlers::calendar_toggle))
        .route("/api/achievements", get(handlers::get_achievements))
        .with_state(state)
}
