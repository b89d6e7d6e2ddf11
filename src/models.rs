use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::stats::ProgressSummary;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub name: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_category"
    )]
    pub category: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl Habit {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: Option<&str>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: normalize_category(category),
            completed: false,
        }
    }

    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or("")
    }
}

/// Name and category as typed into the editor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HabitDraft {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl HabitDraft {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: Some(category.into()),
        }
    }

    pub fn trimmed_name(&self) -> &str {
        self.name.trim()
    }
}

fn deserialize_category<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(normalize_category(raw.as_deref()))
}

pub fn normalize_category(category: Option<&str>) -> Option<String> {
    category
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Remote endpoint settings. `is_configured` holds iff the trimmed URL is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncConfig {
    endpoint_url: String,
    is_configured: bool,
}

impl SyncConfig {
    pub fn from_endpoint(url: &str) -> Self {
        let endpoint_url = url.trim().to_string();
        Self {
            is_configured: !endpoint_url.is_empty(),
            endpoint_url,
        }
    }

    pub fn unconfigured() -> Self {
        Self::default()
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    pub fn is_configured(&self) -> bool {
        self.is_configured
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppStatus {
    Loading,
    Ready,
    Error,
}

pub fn sample_habits() -> Vec<Habit> {
    let mut meditation = Habit::new("m1", "Morning Meditation", Some("Mindfulness"));
    meditation.completed = true;
    vec![
        meditation,
        Habit::new("m2", "Exercise 30 mins", Some("Health")),
        Habit::new("m3", "Read 10 pages", Some("Growth")),
    ]
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackerView {
    pub status: AppStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub configured: bool,
    pub habits: Arc<Vec<Habit>>,
    pub progress: ProgressSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleOutcome {
    pub id: String,
    pub completed: bool,
    /// `None` when no remote endpoint is configured.
    pub synced: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitOutcome {
    pub habit: Habit,
    pub synced: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub removed: bool,
    pub synced: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct HabitForm {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl HabitForm {
    pub fn editing_id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    pub fn draft(&self) -> HabitDraft {
        HabitDraft {
            name: self.name.clone(),
            category: self.category.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConfigRequest {
    #[serde(default)]
    pub endpoint_url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    pub panel: Option<String>,
    pub edit: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_config_is_configured_iff_trimmed_url_non_empty() {
        assert!(!SyncConfig::from_endpoint("").is_configured());
        assert!(!SyncConfig::from_endpoint("   ").is_configured());

        let config = SyncConfig::from_endpoint(" https://script.example/exec\n");
        assert!(config.is_configured());
        assert_eq!(config.endpoint_url(), "https://script.example/exec");
    }

    #[test]
    fn remote_habit_defaults_missing_fields() {
        let habit: Habit =
            serde_json::from_str(r#"{"id":"r1","name":"Stretch","category":"  "}"#).unwrap();
        assert_eq!(habit.category, None);
        assert!(!habit.completed);

        let json = serde_json::to_value(&habit).unwrap();
        assert!(json.get("category").is_none());
    }

    #[test]
    fn form_without_id_is_a_create() {
        let form = HabitForm {
            id: Some("  ".to_string()),
            name: "Walk".to_string(),
            category: None,
        };
        assert_eq!(form.editing_id(), None);
        assert_eq!(form.draft().trimmed_name(), "Walk");
    }
}
