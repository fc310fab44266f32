//! # Feature: Goal Store
//!
//! Durable, lock-guarded collection of every user's goals. One coarse async
//! mutex serialises all read-modify-write sequences (command handlers and the
//! reminder scheduler alike). Mutations run on a working copy that replaces
//! the in-memory collection only after it has been written to disk, so memory
//! never gets ahead of the backing file.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Atomic temp-file saves with bounded, retried I/O
//! - 1.0.0: Initial release with JSON backing file

use chrono::{Duration, NaiveDateTime};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tokio::time::{sleep, timeout};
use uuid::Uuid;

use super::codec;
use super::model::{local_now, Goal, UserCollection};
use crate::core::{GoalError, StoreConfig};

/// Base delay between save attempts; multiplied by the attempt number
const SAVE_RETRY_BACKOFF_MS: u64 = 100;

/// A reminder found due during a scheduler scan.
///
/// Carries enough of the goal to find it again after the lock was released,
/// since positions can shift when completed goals are cleared in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueReminder {
    pub user_id: String,
    /// 0-based index at scan time
    pub index: usize,
    pub task: String,
    pub created_at: NaiveDateTime,
}

impl DueReminder {
    fn matches(&self, goal: &Goal) -> bool {
        goal.created_at == self.created_at && goal.task == self.task
    }
}

#[derive(Clone)]
pub struct GoalStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    config: StoreConfig,
    users: Mutex<UserCollection>,
}

impl GoalStore {
    /// Load the backing file and build the store around it
    pub async fn open(config: StoreConfig) -> Self {
        remove_temp_files(&config.path).await;
        let users = load(&config.path).await;
        let goal_count: usize = users.values().map(Vec::len).sum();
        info!(
            "📂 Loaded {} goals for {} users from {}",
            goal_count,
            users.len(),
            config.path.display()
        );
        Self::with_collection(config, users)
    }

    pub fn with_collection(config: StoreConfig, users: UserCollection) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                config,
                users: Mutex::new(users),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.inner.config.path
    }

    /// Append a new goal for `user_id`. `duration_minutes` must already be validated as positive.
    pub async fn add(&self, user_id: &str, task: &str, duration_minutes: u32) -> Result<Goal, GoalError> {
        self.add_at(user_id, task, duration_minutes, local_now()).await
    }

    pub async fn add_at(
        &self,
        user_id: &str,
        task: &str,
        duration_minutes: u32,
        now: NaiveDateTime,
    ) -> Result<Goal, GoalError> {
        let goal = self
            .mutate(|users| {
                let goal = Goal::new(task, duration_minutes, now);
                users
                    .entry(user_id.to_string())
                    .or_default()
                    .push(goal.clone());
                Ok(goal)
            })
            .await?;

        info!("🎯 Added goal for user {user_id}: {} ({} min)", goal.task, goal.duration_minutes);
        Ok(goal)
    }

    /// Ordered goals for a user (empty if the user is unknown)
    pub async fn list(&self, user_id: &str) -> Vec<Goal> {
        let users = self.inner.users.lock().await;
        users.get(user_id).cloned().unwrap_or_default()
    }

    /// Mark the goal at 1-based `position` completed
    pub async fn complete_at(&self, user_id: &str, position: i64) -> Result<Goal, GoalError> {
        self.complete_at_time(user_id, position, local_now()).await
    }

    pub async fn complete_at_time(
        &self,
        user_id: &str,
        position: i64,
        now: NaiveDateTime,
    ) -> Result<Goal, GoalError> {
        let goal = self
            .mutate(|users| {
                let goals = users.get_mut(user_id);
                let len = goals.as_ref().map_or(0, |g| g.len());
                match (goals, position_to_index(position, len)) {
                    (Some(goals), Some(index)) => {
                        let goal = &mut goals[index];
                        goal.complete(now);
                        Ok(goal.clone())
                    }
                    _ => Err(GoalError::InvalidIndex { position, len }),
                }
            })
            .await?;

        info!("🎉 User {user_id} completed goal #{position}: {}", goal.task);
        Ok(goal)
    }

    /// Remove all completed goals for a user, keeping the order of the rest
    pub async fn clear_completed(&self, user_id: &str) -> Result<usize, GoalError> {
        let removed = self
            .mutate(|users| {
                let Some(goals) = users.get_mut(user_id) else {
                    return Ok(0);
                };
                let before = goals.len();
                goals.retain(|g| !g.completed);
                Ok(before - goals.len())
            })
            .await?;

        info!("🧹 Cleared {removed} completed goals for user {user_id}");
        Ok(removed)
    }

    /// Consistent copy of every user's goals
    pub async fn snapshot(&self) -> UserCollection {
        self.inner.users.lock().await.clone()
    }

    /// Copy of one user's goals, `None` if the user has never added one
    pub async fn user_snapshot(&self, user_id: &str) -> Option<Vec<Goal>> {
        self.inner.users.lock().await.get(user_id).cloned()
    }

    /// `(completed, total)` for a user
    pub async fn summary(&self, user_id: &str) -> (usize, usize) {
        let users = self.inner.users.lock().await;
        users.get(user_id).map_or((0, 0), |goals| {
            (goals.iter().filter(|g| g.completed).count(), goals.len())
        })
    }

    /// Completion timestamps of a user's completed goals, in list order
    pub async fn completion_times(&self, user_id: &str) -> Vec<NaiveDateTime> {
        let users = self.inner.users.lock().await;
        users
            .get(user_id)
            .map(|goals| {
                goals
                    .iter()
                    .filter(|g| g.completed)
                    .filter_map(|g| g.completed_at)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Copy out every reminder due at `now`; the lock is released on return
    pub async fn due_reminders(&self, now: NaiveDateTime) -> Vec<DueReminder> {
        let users = self.inner.users.lock().await;
        let mut due = Vec::new();
        for (user_id, goals) in users.iter() {
            for (index, goal) in goals.iter().enumerate() {
                if goal.is_reminder_due(now) {
                    due.push(DueReminder {
                        user_id: user_id.clone(),
                        index,
                        task: goal.task.clone(),
                        created_at: goal.created_at,
                    });
                }
            }
        }
        debug!("Scanned {} users, {} reminders due", users.len(), due.len());
        due
    }

    /// Set `next_reminder_at` for each still-open goal in `due`.
    ///
    /// Goals completed or removed since the scan are skipped. Returns how many were updated.
    pub async fn reschedule(&self, due: &[DueReminder], next_at: NaiveDateTime) -> Result<usize, GoalError> {
        if due.is_empty() {
            return Ok(0);
        }

        self.mutate(|users| {
            let mut updated = 0;
            for reminder in due {
                let Some(goals) = users.get_mut(&reminder.user_id) else {
                    continue;
                };
                let index = match goals.get(reminder.index) {
                    Some(goal) if reminder.matches(goal) => Some(reminder.index),
                    _ => goals.iter().position(|g| reminder.matches(g) && !g.completed),
                };
                if let Some(i) = index {
                    let goal = &mut goals[i];
                    if !goal.completed {
                        goal.next_reminder_at = Some(next_at);
                        updated += 1;
                    }
                }
            }
            Ok(updated)
        })
        .await
    }

    /// Run `f` on a working copy, persist it, then publish it.
    ///
    /// The lock is held for the whole sequence. On any error the in-memory
    /// collection is left untouched.
    async fn mutate<T, F>(&self, f: F) -> Result<T, GoalError>
    where
        F: FnOnce(&mut UserCollection) -> Result<T, GoalError>,
    {
        let mut users = self.inner.users.lock().await;
        let mut working = users.clone();
        let out = f(&mut working)?;
        self.persist(&working).await?;
        *users = working;
        Ok(out)
    }

    async fn persist(&self, users: &UserCollection) -> Result<(), GoalError> {
        let config = &self.inner.config;
        let attempts = config.save_retries.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            let backoff = std::time::Duration::from_millis(SAVE_RETRY_BACKOFF_MS * attempt as u64);
            match timeout(config.io_timeout, save(&config.path, users)).await {
                Ok(Ok(())) => return Ok(()),
                Ok(Err(e)) => last_error = e.to_string(),
                Err(_) => {
                    last_error = format!("save timed out after {:?}", config.io_timeout);
                    // The abandoned write may still be creating its temp file
                    sleep(backoff).await;
                    remove_temp_files(&config.path).await;
                }
            }

            if attempt < attempts {
                warn!(
                    "Save attempt {}/{} for {} failed: {}",
                    attempt,
                    attempts,
                    config.path.display(),
                    last_error
                );
                sleep(backoff).await;
            }
        }

        error!(
            "🚨 Giving up saving goals to {} after {} attempts: {}",
            config.path.display(),
            attempts,
            last_error
        );
        Err(GoalError::Persistence {
            path: config.path.clone(),
            message: last_error,
        })
    }
}

/// 1-based position to index, if it is within `[1, len]`
fn position_to_index(position: i64, len: usize) -> Option<usize> {
    if position >= 1 && (position as u64) <= len as u64 {
        Some(position as usize - 1)
    } else {
        None
    }
}

/// Read the backing file. A missing or unreadable file yields an empty collection;
/// an unparsable one is moved aside first so it is not overwritten by the next save.
/// Individual records that cannot be read are dropped, with the original file
/// copied aside so the next save does not lose them for good.
pub async fn load(path: &Path) -> UserCollection {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No goal file at {}, starting empty", path.display());
            return UserCollection::new();
        }
        Err(e) => {
            warn!("Failed to read {}: {e}. Starting with no goals.", path.display());
            return UserCollection::new();
        }
    };

    match codec::decode(&text) {
        Ok(decoded) => {
            if decoded.skipped > 0 {
                let backup = corrupt_backup_path(path);
                warn!(
                    "Skipped {} unreadable goal records in {}; keeping a copy of the original at {}",
                    decoded.skipped,
                    path.display(),
                    backup.display()
                );
                if let Err(e) = tokio::fs::copy(path, &backup).await {
                    warn!("Failed to copy goal file aside: {e}");
                }
            }
            decoded.users
        }
        Err(e) => {
            let backup = corrupt_backup_path(path);
            warn!(
                "Goal file {} is not valid ({e}); moving it to {} and starting empty",
                path.display(),
                backup.display()
            );
            if let Err(e) = tokio::fs::rename(path, &backup).await {
                warn!("Failed to move corrupt goal file aside: {e}");
            }
            UserCollection::new()
        }
    }
}

/// Write the full collection: temp file in the same directory, fsync, rename over the target.
pub async fn save(path: &Path, users: &UserCollection) -> std::io::Result<()> {
    let text = codec::encode(users)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    let temp_path = temp_path_for(path);
    let result = write_then_rename(&temp_path, path, text.as_bytes()).await;
    if result.is_err() {
        let _ = tokio::fs::remove_file(&temp_path).await;
    }
    result
}

async fn write_then_rename(temp_path: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(temp_path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(temp_path, path).await
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "goals".to_string());
    path.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4().simple()))
}

/// Remove temp files left next to `path` by abandoned saves
async fn remove_temp_files(path: &Path) {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        return;
    };
    let prefix = format!(".{name}.");
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let Ok(mut entries) = tokio::fs::read_dir(&dir).await else {
        return;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if file_name.starts_with(&prefix) && file_name.ends_with(".tmp") {
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => debug!("Removed stale temp file {file_name}"),
                Err(e) => warn!("Failed to remove stale temp file {file_name}: {e}"),
            }
        }
    }
}

fn corrupt_backup_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "goals".to_string());
    let stamp = local_now().format("%Y%m%d%H%M%S");
    path.with_file_name(format!("{name}.corrupt-{stamp}"))
}

/// `now + 1h`, the next reminder after one fires
pub fn next_reminder_after(now: NaiveDateTime) -> NaiveDateTime {
    now + Duration::hours(super::model::REMINDER_INTERVAL_HOURS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn at(day: u32, hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    fn store_in(dir: &TempDir) -> GoalStore {
        GoalStore::with_collection(
            StoreConfig::new(dir.path().join("user_goals.json")),
            UserCollection::new(),
        )
    }

    fn assert_completion_invariant(goals: &[Goal]) {
        for goal in goals {
            assert_eq!(goal.completed, goal.completed_at.is_some());
            if goal.completed {
                assert!(goal.next_reminder_at.is_none());
            }
        }
    }

    #[tokio::test]
    async fn test_add_appends_open_goal() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let goal = store.add("u1", "Read a chapter", 25).await.unwrap();
        let goals = store.list("u1").await;

        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0], goal);
        assert!(!goal.completed);
        assert_eq!(goal.duration_minutes, 25);
        assert_eq!(
            goal.next_reminder_at,
            Some(goal.created_at + Duration::minutes(30))
        );
    }

    #[tokio::test]
    async fn test_add_is_written_through() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.add("u1", "Read", 25).await.unwrap();

        let reloaded = load(store.path()).await;
        assert_eq!(reloaded.get("u1").map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_list_unknown_user_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.list("nobody").await.is_empty());
    }

    #[tokio::test]
    async fn test_complete_valid_position() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.add_at("u1", "A", 10, at(1, 9, 0)).await.unwrap();
        store.add_at("u1", "B", 20, at(1, 9, 5)).await.unwrap();

        let goal = store.complete_at_time("u1", 2, at(1, 12, 0)).await.unwrap();
        assert_eq!(goal.task, "B");
        assert!(goal.completed);
        assert_eq!(goal.completed_at, Some(at(1, 12, 0)));

        let goals = store.list("u1").await;
        assert!(!goals[0].completed);
        assert!(goals[1].completed);
        assert_completion_invariant(&goals);
    }

    #[tokio::test]
    async fn test_complete_out_of_range_leaves_store_unchanged() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.add_at("u1", "A", 10, at(1, 9, 0)).await.unwrap();
        let before = store.list("u1").await;

        for position in [0, -1, 2, 99] {
            let err = store.complete_at("u1", position).await.unwrap_err();
            assert_eq!(err, GoalError::InvalidIndex { position, len: 1 });
        }
        assert_eq!(store.list("u1").await, before);

        let err = store.complete_at("stranger", 1).await.unwrap_err();
        assert_eq!(err, GoalError::InvalidIndex { position: 1, len: 0 });
        assert!(store.snapshot().await.get("stranger").is_none());
    }

    #[tokio::test]
    async fn test_clear_completed_preserves_order_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        for (i, task) in ["A", "B", "C", "D"].iter().enumerate() {
            store.add_at("u1", task, 10, at(1, 9, i as u32)).await.unwrap();
        }
        store.complete_at("u1", 1).await.unwrap();
        store.complete_at("u1", 3).await.unwrap();

        assert_eq!(store.clear_completed("u1").await.unwrap(), 2);
        let tasks: Vec<String> = store.list("u1").await.into_iter().map(|g| g.task).collect();
        assert_eq!(tasks, vec!["B", "D"]);

        assert_eq!(store.clear_completed("u1").await.unwrap(), 0);
        assert_eq!(store.clear_completed("nobody").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_summary_and_completion_times() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.add_at("u1", "A", 10, at(1, 9, 0)).await.unwrap();
        store.add_at("u1", "B", 10, at(1, 9, 1)).await.unwrap();
        store.complete_at_time("u1", 2, at(2, 8, 0)).await.unwrap();

        assert_eq!(store.summary("u1").await, (1, 2));
        assert_eq!(store.summary("nobody").await, (0, 0));
        assert_eq!(store.completion_times("u1").await, vec![at(2, 8, 0)]);
    }

    #[tokio::test]
    async fn test_user_snapshot_distinguishes_unknown_user() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.user_snapshot("u1").await.is_none());

        store.add_at("u1", "A", 10, at(1, 9, 0)).await.unwrap();
        store.complete_at("u1", 1).await.unwrap();
        store.clear_completed("u1").await.unwrap();

        assert_eq!(store.user_snapshot("u1").await, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("goals.json");

        let mut users = UserCollection::new();
        let mut done = Goal::new("Done", 5, at(1, 9, 0));
        done.complete(at(1, 10, 0));
        users.insert("1".to_string(), vec![Goal::new("Open", 15, at(1, 9, 0)), done]);
        users.insert("2".to_string(), vec![]);

        save(&path, &users).await.unwrap();
        let first = tokio::fs::read_to_string(&path).await.unwrap();

        let loaded = load(&path).await;
        assert_eq!(loaded, users);

        save(&path, &loaded).await.unwrap();
        let second = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_save_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("goals.json");
        save(&path, &UserCollection::new()).await.unwrap();
        save(&path, &UserCollection::new()).await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(load(&dir.path().join("absent.json")).await.is_empty());
    }

    #[tokio::test]
    async fn test_load_corrupt_file_is_empty_and_moved_aside() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("goals.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(load(&path).await.is_empty());
        assert!(!path.exists());

        let backups = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".corrupt-"))
            .count();
        assert_eq!(backups, 1);
    }

    #[tokio::test]
    async fn test_load_keeps_good_users_when_one_record_is_bad() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("goals.json");
        let original = r#"{"9": [{"task": "Walk", "duration": 20, "completed": false,
                "created_at": "2024-05-01T09:00:00", "reminder": "2024-05-01T09:30:00"}],
            "10": [{"task": "Nap", "duration": -5, "completed": false,
                "created_at": "2024-05-01T09:00:00", "reminder": "2024-05-01T09:30:00"}]}"#;
        std::fs::write(&path, original).unwrap();

        let users = load(&path).await;
        assert_eq!(users.keys().collect::<Vec<_>>(), vec!["9", "10"]);
        assert_eq!(users["9"][0].task, "Walk");
        assert!(users["10"].is_empty());
        assert!(path.exists());

        let backups: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".corrupt-"))
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(std::fs::read_to_string(backups[0].path()).unwrap(), original);
    }

    #[tokio::test]
    async fn test_saves_keep_user_order_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("goals.json");
        std::fs::write(&path, "{\n    \"9\": [],\n    \"10\": []\n}").unwrap();

        let store = GoalStore::open(StoreConfig::new(&path)).await;
        store.add_at("10", "Swim", 30, at(1, 9, 0)).await.unwrap();
        store.add_at("2", "Row", 30, at(1, 9, 1)).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let nine = text.find("\"9\"").unwrap();
        let ten = text.find("\"10\"").unwrap();
        let two = text.find("\"2\"").unwrap();
        assert!(nine < ten && ten < two, "{text}");
    }

    #[tokio::test]
    async fn test_timed_out_save_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("goals.json");
        let mut config = StoreConfig::new(&path);
        config.io_timeout = std::time::Duration::ZERO;
        config.save_retries = 1;
        let store = GoalStore::with_collection(config, UserCollection::new());

        let err = store.add("u1", "Read", 10).await.unwrap_err();
        assert!(err.is_persistence());
        assert!(store.list("u1").await.is_empty());
        assert!(!path.exists());

        let leftovers = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_open_removes_stale_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("goals.json");
        let stale = dir.path().join(".goals.json.0123abcd.tmp");
        let unrelated = dir.path().join(".other.json.0123abcd.tmp");
        std::fs::write(&stale, "{").unwrap();
        std::fs::write(&unrelated, "{").unwrap();

        GoalStore::open(StoreConfig::new(&path)).await;

        assert!(!stale.exists());
        assert!(unrelated.exists());
    }

    #[tokio::test]
    async fn test_open_loads_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("goals.json");
        std::fs::write(
            &path,
            r#"{"9": [{"task": "Walk", "duration": 20, "completed": false,
                "created_at": "2024-05-01T09:00:00", "reminder": "2024-05-01T09:30:00"}]}"#,
        )
        .unwrap();

        let store = GoalStore::open(StoreConfig::new(&path)).await;
        let goals = store.list("9").await;
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].task, "Walk");
    }

    #[tokio::test]
    async fn test_failed_save_reports_and_keeps_memory_durable() {
        let dir = TempDir::new().unwrap();
        let mut config = StoreConfig::new(dir.path().join("missing_dir").join("goals.json"));
        config.save_retries = 2;
        let store = GoalStore::with_collection(config, UserCollection::new());

        let err = store.add("u1", "Read", 10).await.unwrap_err();
        assert!(err.is_persistence());
        assert!(store.list("u1").await.is_empty());
    }

    #[tokio::test]
    async fn test_due_reminders_and_reschedule() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.add_at("u1", "A", 10, at(1, 9, 0)).await.unwrap();
        store.add_at("u2", "B", 10, at(1, 9, 45)).await.unwrap();

        let now = at(1, 10, 0);
        let due = store.due_reminders(now).await;
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].user_id, "u1");

        let updated = store.reschedule(&due, next_reminder_after(now)).await.unwrap();
        assert_eq!(updated, 1);
        assert_eq!(store.list("u1").await[0].next_reminder_at, Some(at(1, 11, 0)));
        assert_eq!(store.list("u2").await[0].next_reminder_at, Some(at(1, 10, 15)));
    }

    #[tokio::test]
    async fn test_reschedule_skips_goal_completed_after_scan() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.add_at("u1", "A", 10, at(1, 9, 0)).await.unwrap();

        let now = at(1, 10, 0);
        let due = store.due_reminders(now).await;
        store.complete_at_time("u1", 1, now).await.unwrap();

        assert_eq!(store.reschedule(&due, next_reminder_after(now)).await.unwrap(), 0);
        let goals = store.list("u1").await;
        assert!(goals[0].completed);
        assert!(goals[0].next_reminder_at.is_none());
        assert_completion_invariant(&goals);
    }

    #[tokio::test]
    async fn test_reschedule_follows_renumbered_goal() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.add_at("u1", "Done", 10, at(1, 8, 0)).await.unwrap();
        store.add_at("u1", "Open", 10, at(1, 9, 0)).await.unwrap();
        store.complete_at_time("u1", 1, at(1, 8, 30)).await.unwrap();

        let now = at(1, 10, 0);
        let due = store.due_reminders(now).await;
        assert_eq!(due[0].index, 1);

        store.clear_completed("u1").await.unwrap();
        assert_eq!(store.reschedule(&due, next_reminder_after(now)).await.unwrap(), 1);

        let goals = store.list("u1").await;
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].next_reminder_at, Some(at(1, 11, 0)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_are_never_lost() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            let user = if i % 2 == 0 { "alice" } else { "bob" };
            handles.push(tokio::spawn(async move {
                store.add(user, &format!("goal {i}"), 5).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.list("alice").await.len(), 10);
        assert_eq!(store.list("bob").await.len(), 10);

        let on_disk = load(store.path()).await;
        assert_eq!(on_disk.get("alice").map(Vec::len), Some(10));
        assert_eq!(on_disk.get("bob").map(Vec::len), Some(10));
    }

    #[test]
    fn test_position_to_index() {
        assert_eq!(position_to_index(1, 3), Some(0));
        assert_eq!(position_to_index(3, 3), Some(2));
        assert_eq!(position_to_index(4, 3), None);
        assert_eq!(position_to_index(0, 3), None);
        assert_eq!(position_to_index(-2, 3), None);
        assert_eq!(position_to_index(1, 0), None);
    }
}
