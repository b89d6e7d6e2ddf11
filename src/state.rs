use crate::sync::SheetClient;
use crate::tracker::HabitTracker;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<HabitTracker<SheetClient>>,
}

impl AppState {
    pub fn new(tracker: HabitTracker<SheetClient>) -> Self {
        Self {
            tracker: Arc::new(tracker),
        }
    }
}
