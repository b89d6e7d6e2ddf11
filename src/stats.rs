use crate::models::Habit;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressSummary {
    pub completed: usize,
    pub total: usize,
    pub percent: f64,
}

impl ProgressSummary {
    pub fn rounded_percent(&self) -> u32 {
        self.percent.round() as u32
    }
}

pub fn build_progress(habits: &[Habit]) -> ProgressSummary {
    let total = habits.len();
    let completed = habits.iter().filter(|habit| habit.completed).count();
    let percent = if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64 * 100.0
    };

    ProgressSummary {
        completed,
        total,
        percent,
    }
}
