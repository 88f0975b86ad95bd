use crate::api::WellnessApi;
use crate::calendar::CalendarState;
use crate::storage::FileStore;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<FileStore>>,
    pub calendar: Arc<Mutex<CalendarState>>,
    pub api: Arc<dyn WellnessApi>,
}

impl AppState {
    pub fn new(store: FileStore, api: Arc<dyn WellnessApi>, today: NaiveDate) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            calendar: Arc::new(Mutex::new(CalendarState::new(today))),
            api,
        }
    }
}
