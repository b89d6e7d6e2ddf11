use crate::models::Habit;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

/// In-memory habit list.
///
/// Every effective mutation builds a fresh `Vec` and swaps a new `Arc` in, so a
/// snapshot handed out earlier never changes and callers can detect a change with
/// [`Arc::ptr_eq`]. Operations that turn out to be no-ops keep the current snapshot.
#[derive(Debug, Clone, Default)]
pub struct HabitStore {
    habits: Arc<Vec<Habit>>,
}

impl HabitStore {
    pub fn new(habits: Vec<Habit>) -> Self {
        let mut store = Self::default();
        store.replace_all(habits);
        store
    }

    pub fn snapshot(&self) -> Arc<Vec<Habit>> {
        Arc::clone(&self.habits)
    }

    pub fn get(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|habit| habit.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    /// Replaces the whole list. Duplicate ids keep their first occurrence.
    pub fn replace_all(&mut self, habits: Vec<Habit>) {
        let mut seen = HashSet::with_capacity(habits.len());
        let mut unique = Vec::with_capacity(habits.len());
        for habit in habits {
            if seen.insert(habit.id.clone()) {
                unique.push(habit);
            } else {
                warn!(id = %habit.id, "dropping habit with duplicate id");
            }
        }
        self.habits = Arc::new(unique);
    }

    /// Flips `completed` for `id` and returns the new value, or `None` if absent.
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        let current = self.get(id)?.completed;
        self.set_completed(id, !current);
        Some(!current)
    }

    pub fn set_completed(&mut self, id: &str, completed: bool) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.habits = Arc::new(
            self.habits
                .iter()
                .map(|habit| {
                    if habit.id == id {
                        Habit {
                            completed,
                            ..habit.clone()
                        }
                    } else {
                        habit.clone()
                    }
                })
                .collect(),
        );
        true
    }

    /// Replaces name and category of an existing habit, keeping its completion
    /// flag, or appends `habit` when its id is new. Returns `true` on append.
    pub fn upsert(&mut self, habit: Habit) -> bool {
        if !self.contains(&habit.id) {
            let mut next = Vec::with_capacity(self.habits.len() + 1);
            next.extend(self.habits.iter().cloned());
            next.push(habit);
            self.habits = Arc::new(next);
            return true;
        }

        self.habits = Arc::new(
            self.habits
                .iter()
                .map(|existing| {
                    if existing.id == habit.id {
                        Habit {
                            name: habit.name.clone(),
                            category: habit.category.clone(),
                            ..existing.clone()
                        }
                    } else {
                        existing.clone()
                    }
                })
                .collect(),
        );
        false
    }

    pub fn remove(&mut self, id: &str) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.habits = Arc::new(
            self.habits
                .iter()
                .filter(|habit| habit.id != id)
                .cloned()
                .collect(),
        );
        true
    }

    /// Client-side id of the form `h_<millis>`, bumped until unused.
    pub fn fresh_id(&self, now_millis: i64) -> String {
        let mut stamp = now_millis;
        loop {
            let id = format!("h_{stamp}");
            if !self.contains(&id) {
                return id;
            }
            stamp += 1;
        }
    }
}
