use habit_tracker::errors::SyncError;
use habit_tracker::models::{AppStatus, Habit, HabitDraft, SyncConfig, sample_habits};
use habit_tracker::{HabitRemote, HabitTracker};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Fetch,
    SetCompletion(String, bool),
    Create(String, String, String),
    Update(String, String, String),
    Delete(String),
}

/// Remote that answers every write with `succeed` and records what it was asked.
struct ScriptedRemote {
    succeed: AtomicBool,
    fetch_fails: bool,
    habits: Vec<Habit>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedRemote {
    fn new(succeed: bool) -> Self {
        Self {
            succeed: AtomicBool::new(succeed),
            fetch_fails: false,
            habits: sample_habits(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing_fetch() -> Self {
        Self {
            fetch_fails: true,
            ..Self::new(true)
        }
    }

    fn record(&self, call: Call) -> bool {
        self.calls.lock().unwrap().push(call);
        self.succeed.load(Ordering::SeqCst)
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl HabitRemote for ScriptedRemote {
    async fn fetch_all(&self, _endpoint: &str) -> Result<Vec<Habit>, SyncError> {
        self.calls.lock().unwrap().push(Call::Fetch);
        if self.fetch_fails {
            return Err(SyncError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
        }
        Ok(self.habits.clone())
    }

    async fn set_completion(&self, _endpoint: &str, id: &str, completed: bool) -> bool {
        self.record(Call::SetCompletion(id.to_string(), completed))
    }

    async fn create(&self, _endpoint: &str, habit: &Habit) -> bool {
        self.record(Call::Create(
            habit.id.clone(),
            habit.name.clone(),
            habit.category_label().to_string(),
        ))
    }

    async fn update(&self, _endpoint: &str, id: &str, name: &str, category: &str) -> bool {
        self.record(Call::Update(id.to_string(), name.to_string(), category.to_string()))
    }

    async fn delete(&self, _endpoint: &str, id: &str) -> bool {
        self.record(Call::Delete(id.to_string()))
    }
}

/// Remote whose `set_completion` blocks until the test releases it.
struct GatedRemote {
    result: bool,
    entered: Notify,
    release: Notify,
}

impl GatedRemote {
    fn new(result: bool) -> Self {
        Self {
            result,
            entered: Notify::new(),
            release: Notify::new(),
        }
    }
}

impl HabitRemote for GatedRemote {
    async fn fetch_all(&self, _endpoint: &str) -> Result<Vec<Habit>, SyncError> {
        Ok(sample_habits())
    }

    async fn set_completion(&self, _endpoint: &str, _id: &str, _completed: bool) -> bool {
        self.entered.notify_one();
        self.release.notified().await;
        self.result
    }

    async fn create(&self, _endpoint: &str, _habit: &Habit) -> bool {
        self.result
    }

    async fn update(&self, _endpoint: &str, _id: &str, _name: &str, _category: &str) -> bool {
        self.result
    }

    async fn delete(&self, _endpoint: &str, _id: &str) -> bool {
        self.result
    }
}

/// Remote whose first `fetch_all` blocks until released; later fetches answer at once.
struct SlowFirstFetch {
    first_fails: bool,
    fetches: AtomicUsize,
    entered: Notify,
    release: Notify,
}

impl SlowFirstFetch {
    fn new(first_fails: bool) -> Self {
        Self {
            first_fails,
            fetches: AtomicUsize::new(0),
            entered: Notify::new(),
            release: Notify::new(),
        }
    }
}

impl HabitRemote for SlowFirstFetch {
    async fn fetch_all(&self, _endpoint: &str) -> Result<Vec<Habit>, SyncError> {
        if self.fetches.fetch_add(1, Ordering::SeqCst) > 0 {
            return Ok(vec![Habit::new("n1", "New endpoint habit", None)]);
        }
        self.entered.notify_one();
        self.release.notified().await;
        if self.first_fails {
            Err(SyncError::Status(reqwest::StatusCode::BAD_GATEWAY))
        } else {
            Ok(vec![Habit::new("r1", "Old endpoint habit", None)])
        }
    }

    async fn set_completion(&self, _endpoint: &str, _id: &str, _completed: bool) -> bool {
        true
    }

    async fn create(&self, _endpoint: &str, _habit: &Habit) -> bool {
        true
    }

    async fn update(&self, _endpoint: &str, _id: &str, _name: &str, _category: &str) -> bool {
        true
    }

    async fn delete(&self, _endpoint: &str, _id: &str) -> bool {
        true
    }
}

fn settings_path(tag: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "habit_tracker_tracker_{tag}_{}_{nanos}.json",
        std::process::id()
    ))
}

fn configured() -> SyncConfig {
    SyncConfig::from_endpoint("http://sheet.invalid/exec")
}

async fn loaded<R: HabitRemote>(remote: R, config: SyncConfig, tag: &str) -> HabitTracker<R> {
    let tracker = HabitTracker::new(remote, config, settings_path(tag));
    tracker.load().await.expect("load");
    tracker
}

async fn completed(tracker: &HabitTracker<impl HabitRemote>, id: &str) -> bool {
    tracker.habit(id).await.expect("habit present").completed
}

#[tokio::test]
async fn unconfigured_load_shows_samples_without_fetching() {
    let tracker = loaded(ScriptedRemote::new(true), SyncConfig::unconfigured(), "samples").await;

    let view = tracker.view().await;
    assert_eq!(view.status, AppStatus::Ready);
    assert!(!view.configured);
    assert_eq!(view.habits.len(), 3);
    assert_eq!(view.progress.completed, 1);
    assert_eq!(view.progress.total, 3);
    assert!(tracker.remote().calls().is_empty());
}

#[tokio::test]
async fn configured_load_replaces_list_from_remote() {
    let mut remote = ScriptedRemote::new(true);
    remote.habits = vec![Habit::new("r1", "Stretch", None)];
    let tracker = loaded(remote, configured(), "remote_load").await;

    let habits = tracker.snapshot().await;
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0].id, "r1");
    assert_eq!(tracker.remote().calls(), vec![Call::Fetch]);
}

#[tokio::test]
async fn failed_load_enters_error_and_keeps_list() {
    let tracker = HabitTracker::new(ScriptedRemote::failing_fetch(), configured(), settings_path("fail"));

    assert!(tracker.load().await.is_err());
    let view = tracker.view().await;
    assert_eq!(view.status, AppStatus::Error);
    assert!(view.error.unwrap().contains("500"));
    assert!(view.habits.is_empty());
}

#[tokio::test]
async fn unconfigured_toggle_is_local_only() {
    let tracker = loaded(ScriptedRemote::new(false), SyncConfig::unconfigured(), "local").await;

    let outcome = tracker.toggle("m2").await.unwrap();
    assert!(outcome.completed);
    assert_eq!(outcome.synced, None);
    assert!(completed(&tracker, "m2").await);
    assert!(tracker.remote().calls().is_empty());
}

#[tokio::test]
async fn toggle_unknown_id_sends_nothing() {
    let tracker = loaded(ScriptedRemote::new(true), configured(), "unknown").await;

    assert!(tracker.toggle("missing").await.is_none());
    assert_eq!(tracker.remote().calls(), vec![Call::Fetch]);
}

#[tokio::test]
async fn failing_remote_reverts_every_toggle() {
    let tracker = loaded(ScriptedRemote::new(false), configured(), "revert_seq").await;
    let initial = completed(&tracker, "m1").await;

    for _ in 0..5 {
        let outcome = tracker.toggle("m1").await.unwrap();
        assert_eq!(outcome.synced, Some(false));
        assert_eq!(outcome.completed, initial);
    }
    assert_eq!(completed(&tracker, "m1").await, initial);
}

#[tokio::test]
async fn succeeding_remote_follows_toggle_parity() {
    let tracker = loaded(ScriptedRemote::new(true), configured(), "parity").await;

    for count in 1..=4 {
        let before = completed(&tracker, "m3").await;
        let outcome = tracker.toggle("m3").await.unwrap();
        assert_eq!(outcome.synced, Some(true));
        assert_eq!(outcome.completed, !before);
        assert_eq!(completed(&tracker, "m3").await, count % 2 == 1);
    }

    let sent: Vec<bool> = tracker
        .remote()
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            Call::SetCompletion(_, value) => Some(value),
            _ => None,
        })
        .collect();
    assert_eq!(sent, vec![true, false, true, false]);
}

#[tokio::test]
async fn toggle_m2_stays_completed_on_success() {
    let tracker = Arc::new(loaded(GatedRemote::new(true), configured(), "gate_ok").await);

    let task = tokio::spawn({
        let tracker = Arc::clone(&tracker);
        async move { tracker.toggle("m2").await }
    });

    tracker.remote().entered.notified().await;
    assert!(completed(tracker.as_ref(), "m2").await);

    tracker.remote().release.notify_one();
    let outcome = task.await.unwrap().unwrap();
    assert!(outcome.completed);
    assert!(completed(tracker.as_ref(), "m2").await);
}

#[tokio::test]
async fn toggle_m2_reverts_after_failure_resolves() {
    let tracker = Arc::new(loaded(GatedRemote::new(false), configured(), "gate_fail").await);

    let task = tokio::spawn({
        let tracker = Arc::clone(&tracker);
        async move { tracker.toggle("m2").await }
    });

    tracker.remote().entered.notified().await;
    assert!(completed(tracker.as_ref(), "m2").await, "optimistic flip is visible");

    tracker.remote().release.notify_one();
    let outcome = task.await.unwrap().unwrap();
    assert!(!outcome.completed);
    assert_eq!(outcome.synced, Some(false));
    assert!(!completed(tracker.as_ref(), "m2").await);
}

#[tokio::test]
async fn create_with_blank_name_adds_nothing_and_sends_nothing() {
    let tracker = loaded(ScriptedRemote::new(true), configured(), "blank").await;

    let err = tracker.create(&HabitDraft::new("   ", "Health")).await.unwrap_err();
    assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(tracker.snapshot().await.len(), 3);
    assert_eq!(tracker.remote().calls(), vec![Call::Fetch]);
}

#[tokio::test]
async fn create_appends_and_sends_add() {
    let tracker = loaded(ScriptedRemote::new(true), configured(), "create").await;

    let outcome = tracker
        .create(&HabitDraft::new("Drink Water", " Health "))
        .await
        .unwrap();
    assert!(outcome.habit.id.starts_with("h_"));
    assert!(!outcome.habit.completed);
    assert_eq!(outcome.habit.category.as_deref(), Some("Health"));
    assert_eq!(outcome.synced, Some(true));
    assert_eq!(tracker.snapshot().await.len(), 4);

    let calls = tracker.remote().calls();
    assert_eq!(
        calls.last(),
        Some(&Call::Create(
            outcome.habit.id.clone(),
            "Drink Water".to_string(),
            "Health".to_string()
        ))
    );
}

#[tokio::test]
async fn rapid_creates_get_distinct_ids() {
    let tracker = loaded(ScriptedRemote::new(true), SyncConfig::unconfigured(), "ids").await;

    let first = tracker.create(&HabitDraft::new("One", "")).await.unwrap();
    let second = tracker.create(&HabitDraft::new("Two", "")).await.unwrap();
    assert_ne!(first.habit.id, second.habit.id);
    assert_eq!(first.habit.category, None);
    assert_eq!(tracker.snapshot().await.len(), 5);
}

#[tokio::test]
async fn failed_create_is_kept_locally() {
    let tracker = loaded(ScriptedRemote::new(true), configured(), "create_fail").await;
    tracker.remote().succeed.store(false, Ordering::SeqCst);

    let outcome = tracker.create(&HabitDraft::new("Journal", "")).await.unwrap();
    assert_eq!(outcome.synced, Some(false));
    assert!(tracker.habit(&outcome.habit.id).await.is_some());
}

#[tokio::test]
async fn edit_keeps_completion_and_sends_edit() {
    let tracker = loaded(ScriptedRemote::new(false), configured(), "edit").await;

    let outcome = tracker
        .edit("m1", &HabitDraft::new("Evening Meditation", "Calm"))
        .await
        .unwrap();
    assert_eq!(outcome.synced, Some(false));
    assert!(outcome.habit.completed);

    let habit = tracker.habit("m1").await.unwrap();
    assert_eq!(habit.name, "Evening Meditation");
    assert!(habit.completed);
    assert_eq!(tracker.snapshot().await.len(), 3);
    assert_eq!(
        tracker.remote().calls().last(),
        Some(&Call::Update(
            "m1".to_string(),
            "Evening Meditation".to_string(),
            "Calm".to_string()
        ))
    );
}

#[tokio::test]
async fn edit_rejects_blank_name_and_unknown_id() {
    let tracker = loaded(ScriptedRemote::new(true), configured(), "edit_bad").await;

    let blank = tracker.edit("m1", &HabitDraft::new("", "")).await.unwrap_err();
    assert_eq!(blank.status, axum::http::StatusCode::BAD_REQUEST);

    let missing = tracker
        .edit("nope", &HabitDraft::new("Name", ""))
        .await
        .unwrap_err();
    assert_eq!(missing.status, axum::http::StatusCode::NOT_FOUND);
    assert_eq!(tracker.remote().calls(), vec![Call::Fetch]);
}

#[tokio::test]
async fn delete_removes_locally_even_when_remote_fails() {
    let tracker = loaded(ScriptedRemote::new(false), configured(), "delete").await;

    let outcome = tracker.delete("m2").await;
    assert!(outcome.removed);
    assert_eq!(outcome.synced, Some(false));
    assert_eq!(tracker.snapshot().await.len(), 2);

    let again = tracker.delete("m2").await;
    assert!(!again.removed);
    assert_eq!(tracker.snapshot().await.len(), 2);
}

#[tokio::test]
async fn save_config_persists_and_reloads() {
    let path = settings_path("save");
    let mut remote = ScriptedRemote::new(true);
    remote.habits = vec![Habit::new("r1", "Stretch", Some("Health"))];
    let tracker = HabitTracker::new(remote, SyncConfig::unconfigured(), path.clone());
    tracker.load().await.unwrap();
    assert_eq!(tracker.snapshot().await.len(), 3);

    let view = tracker
        .save_config("  http://sheet.invalid/exec  ")
        .await
        .unwrap();
    assert!(view.configured);
    assert_eq!(view.status, AppStatus::Ready);
    assert_eq!(view.habits.len(), 1);
    assert_eq!(tracker.config().await.endpoint_url(), "http://sheet.invalid/exec");

    let stored = habit_tracker::load_config(&path).await;
    assert_eq!(stored.endpoint_url(), "http://sheet.invalid/exec");
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn load_from_old_endpoint_does_not_override_cleared_config() {
    let path = settings_path("stale_ok");
    let tracker = Arc::new(HabitTracker::new(
        SlowFirstFetch::new(false),
        SyncConfig::from_endpoint("http://old.example/exec"),
        path.clone(),
    ));

    let pending = tokio::spawn({
        let tracker = Arc::clone(&tracker);
        async move { tracker.load().await }
    });
    tracker.remote().entered.notified().await;

    let view = tracker.save_config("").await.unwrap();
    assert!(!view.configured);
    assert_eq!(view.status, AppStatus::Ready);
    assert_eq!(view.habits.len(), 3);

    tracker.remote().release.notify_one();
    pending.await.unwrap().unwrap();

    let view = tracker.view().await;
    assert!(!view.configured);
    assert_eq!(view.status, AppStatus::Ready);
    let ids: Vec<&str> = view.habits.iter().map(|habit| habit.id.as_str()).collect();
    assert_eq!(ids, vec!["m1", "m2", "m3"]);
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn failure_of_superseded_load_keeps_new_endpoint_ready() {
    let path = settings_path("stale_err");
    let tracker = Arc::new(HabitTracker::new(
        SlowFirstFetch::new(true),
        SyncConfig::from_endpoint("http://old.example/exec"),
        path.clone(),
    ));

    let pending = tokio::spawn({
        let tracker = Arc::clone(&tracker);
        async move { tracker.load().await }
    });
    tracker.remote().entered.notified().await;

    let view = tracker.save_config("http://new.example/exec").await.unwrap();
    assert_eq!(view.status, AppStatus::Ready);
    assert_eq!(view.habits[0].id, "n1");

    tracker.remote().release.notify_one();
    assert!(pending.await.unwrap().is_err());

    let view = tracker.view().await;
    assert_eq!(view.status, AppStatus::Ready);
    assert_eq!(view.error, None);
    let ids: Vec<&str> = view.habits.iter().map(|habit| habit.id.as_str()).collect();
    assert_eq!(ids, vec!["n1"]);
    let _ = std::fs::remove_file(path);
}
