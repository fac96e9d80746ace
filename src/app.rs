use crate::domain::dossier::{self, NodePath};
use crate::domain::{AppData, Goal, Intent, Task, TaskDraft, Vision};
use crate::error::{AppError, AppResult, SyncError, ValidationError};
use crate::persistence::LocalStore;
use crate::sync::{ContentStore, FetchOutcome, SaveOutcome, SyncClient, SyncConfig, SyncConfigPatch};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// A mutation intent against the document
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SubmitTask { intent: Intent, draft: TaskDraft },
    ToggleTask(String),
    SetActualTime { id: String, hours: Option<f64> },
    DeleteTask(String),
    SubmitVision { intent: Intent, text: String, timeline: String },
    DeleteVision(String),
    SubmitGoal { intent: Intent, title: String, timeline: String, plans: Vec<String> },
    DeleteGoal(String),
    SubmitCategory { intent: Intent, name: String },
    DeleteCategory(String),
    SubmitItem { category_id: String, intent: Intent, name: String },
    DeleteItem { category_id: String, item_id: String },
    SubmitSubItem { category_id: String, item_id: String, intent: Intent, heading: String, value: String },
    DeleteSubItem { category_id: String, item_id: String, sub_item_id: String },
    /// Replace everything, e.g. with a fetched remote copy
    ReplaceDocument(AppData),
    MarkSynced(DateTime<Utc>),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::SubmitTask { .. } => "submit_task",
            Self::ToggleTask(_) => "toggle_task",
            Self::SetActualTime { .. } => "set_actual_time",
            Self::DeleteTask(_) => "delete_task",
            Self::SubmitVision { .. } => "submit_vision",
            Self::DeleteVision(_) => "delete_vision",
            Self::SubmitGoal { .. } => "submit_goal",
            Self::DeleteGoal(_) => "delete_goal",
            Self::SubmitCategory { .. } => "submit_category",
            Self::DeleteCategory(_) => "delete_category",
            Self::SubmitItem { .. } => "submit_item",
            Self::DeleteItem { .. } => "delete_item",
            Self::SubmitSubItem { .. } => "submit_sub_item",
            Self::DeleteSubItem { .. } => "delete_sub_item",
            Self::ReplaceDocument(_) => "replace_document",
            Self::MarkSynced(_) => "mark_synced",
        }
    }
}

/// Replace the element with `id` by `f(element)`, failing if there is none
fn replace_by_id<T, F>(items: &[T], kind: &'static str, id: &str, key: fn(&T) -> &str, f: F) -> Result<Vec<T>, ValidationError>
where
    T: Clone,
    F: FnOnce(&T) -> Result<T, ValidationError>,
{
    let target = items
        .iter()
        .find(|item| key(item) == id)
        .ok_or_else(|| ValidationError::unknown(kind, id))?;
    let replacement = f(target)?;
    Ok(items
        .iter()
        .map(|item| if key(item) == id { replacement.clone() } else { item.clone() })
        .collect())
}

fn remove_by_id<T: Clone>(items: &[T], kind: &'static str, id: &str, key: fn(&T) -> &str) -> Result<Vec<T>, ValidationError> {
    if !items.iter().any(|item| key(item) == id) {
        return Err(ValidationError::unknown(kind, id));
    }
    Ok(items.iter().filter(|item| key(item) != id).cloned().collect())
}

fn task_id(t: &Task) -> &str {
    &t.id
}

fn vision_id(v: &Vision) -> &str {
    &v.id
}

fn goal_id(g: &Goal) -> &str {
    &g.id
}

/// Apply one command, producing the next document. The input is never modified.
pub fn apply(data: &AppData, command: Command, categories: &[String], now: DateTime<Utc>) -> Result<AppData, ValidationError> {
    let mut next = data.clone();
    match command {
        Command::SubmitTask { intent: Intent::Create, draft } => {
            next.tasks.push(Task::create(draft, categories, now)?);
        }
        Command::SubmitTask { intent: Intent::Edit(id), draft } => {
            next.tasks = replace_by_id(&data.tasks, "task", &id, task_id, |t| t.edited(draft, categories))?;
        }
        Command::ToggleTask(id) => {
            next.tasks = replace_by_id(&data.tasks, "task", &id, task_id, |t| Ok(t.toggled(now)))?;
        }
        Command::SetActualTime { id, hours } => {
            next.tasks = replace_by_id(&data.tasks, "task", &id, task_id, |t| t.with_actual_time(hours))?;
        }
        Command::DeleteTask(id) => {
            next.tasks = remove_by_id(&data.tasks, "task", &id, task_id)?;
        }
        Command::SubmitVision { intent: Intent::Create, text, timeline } => {
            next.visions.push(Vision::create(&text, &timeline)?);
        }
        Command::SubmitVision { intent: Intent::Edit(id), text, timeline } => {
            next.visions = replace_by_id(&data.visions, "vision", &id, vision_id, |v| v.edited(&text, &timeline))?;
        }
        Command::DeleteVision(id) => {
            next.visions = remove_by_id(&data.visions, "vision", &id, vision_id)?;
        }
        Command::SubmitGoal { intent: Intent::Create, title, timeline, plans } => {
            next.goals.push(Goal::create(&title, &timeline, plans)?);
        }
        Command::SubmitGoal { intent: Intent::Edit(id), title, timeline, plans } => {
            next.goals = replace_by_id(&data.goals, "goal", &id, goal_id, |g| g.edited(&title, &timeline, plans))?;
        }
        Command::DeleteGoal(id) => {
            next.goals = remove_by_id(&data.goals, "goal", &id, goal_id)?;
        }
        Command::SubmitCategory { intent, name } => {
            next.personal_categories = match intent {
                Intent::Create => dossier::add_category(&data.personal_categories, &name)?,
                Intent::Edit(id) => dossier::rename_category(&data.personal_categories, &id, &name)?,
            };
        }
        Command::DeleteCategory(id) => {
            next.personal_categories = dossier::remove(&data.personal_categories, NodePath::Category(&id))?;
        }
        Command::SubmitItem { category_id, intent, name } => {
            next.personal_categories = match intent {
                Intent::Create => dossier::add_item(&data.personal_categories, &category_id, &name)?,
                Intent::Edit(id) => dossier::rename_item(&data.personal_categories, &category_id, &id, &name)?,
            };
        }
        Command::DeleteItem { category_id, item_id } => {
            next.personal_categories = dossier::remove(
                &data.personal_categories,
                NodePath::Item { category: &category_id, item: &item_id },
            )?;
        }
        Command::SubmitSubItem { category_id, item_id, intent, heading, value } => {
            next.personal_categories = match intent {
                Intent::Create => {
                    dossier::add_sub_item(&data.personal_categories, &category_id, &item_id, &heading, &value)?
                }
                Intent::Edit(id) => dossier::edit_sub_item(
                    &data.personal_categories,
                    &category_id,
                    &item_id,
                    &id,
                    &heading,
                    &value,
                )?,
            };
        }
        Command::DeleteSubItem { category_id, item_id, sub_item_id } => {
            next.personal_categories = dossier::remove(
                &data.personal_categories,
                NodePath::SubItem { category: &category_id, item: &item_id, sub_item: &sub_item_id },
            )?;
        }
        Command::ReplaceDocument(document) => {
            next = document.normalized();
        }
        Command::MarkSynced(at) => {
            next.last_sync = Some(at);
        }
    }
    Ok(next)
}

/// Expand a unique id prefix into the full id
pub fn resolve_prefix<'a, I>(kind: &'static str, ids: I, prefix: &str) -> Result<String, ValidationError>
where
    I: IntoIterator<Item = &'a str>,
{
    let prefix = prefix.trim();
    let mut matches = ids.into_iter().filter(|id| id.starts_with(prefix));
    let first = matches.next().ok_or_else(|| ValidationError::unknown(kind, prefix))?;
    if *first == *prefix {
        return Ok(first.to_string());
    }
    match matches.next() {
        None => Ok(first.to_string()),
        Some(_) => Err(ValidationError::AmbiguousId {
            kind,
            prefix: prefix.to_string(),
        }),
    }
}

/// Snapshot handed out while a sync is outstanding
#[derive(Debug, Clone)]
pub struct SyncTicket {
    pub config: SyncConfig,
    pub snapshot: AppData,
}

/// Owns the document and the sync configuration, and writes both through to the
/// local store after every change.
pub struct AppState {
    data: AppData,
    config: SyncConfig,
    token_override: Option<String>,
    store: LocalStore,
    categories: Vec<String>,
    sync_in_flight: bool,
}

impl AppState {
    pub fn load(store: LocalStore, categories: Vec<String>, token_override: Option<String>) -> Self {
        let data = store.load_data();
        let config = store.load_config();
        debug!(
            dir = %store.dir().display(),
            tasks = data.tasks.len(),
            configured = config.is_configured(),
            "state loaded"
        );
        Self {
            data,
            config,
            token_override,
            store,
            categories,
            sync_in_flight: false,
        }
    }

    pub fn data(&self) -> &AppData {
        &self.data
    }

    /// Stored configuration, without any environment override
    pub fn stored_config(&self) -> &SyncConfig {
        &self.config
    }

    /// Configuration used for sync, with the environment token applied
    pub fn effective_config(&self) -> SyncConfig {
        self.config.clone().with_token_override(self.token_override.clone())
    }

    #[cfg(test)]
    pub fn is_syncing(&self) -> bool {
        self.sync_in_flight
    }

    pub fn dispatch(&mut self, command: Command) -> AppResult<()> {
        self.dispatch_at(command, Utc::now())
    }

    /// Apply a command and persist. A persistence failure is reported but the
    /// new document stays in memory.
    pub fn dispatch_at(&mut self, command: Command, now: DateTime<Utc>) -> AppResult<()> {
        let name = command.name();
        let next = apply(&self.data, command, &self.categories, now)?;
        self.data = next;
        info!(command = name, "document updated");

        if let Err(e) = self.store.save_data(&self.data) {
            warn!(command = name, error = %e, "document not persisted");
            return Err(AppError::Persistence(e));
        }
        Ok(())
    }

    pub fn update_config(&mut self, patch: SyncConfigPatch) -> AppResult<()> {
        self.config = self.config.patched(patch);
        info!(config = ?self.config, "sync configuration updated");
        if let Err(e) = self.store.save_config(&self.config) {
            warn!(error = %e, "sync configuration not persisted");
            return Err(AppError::Persistence(e));
        }
        Ok(())
    }

    /// Mark a sync as outstanding and snapshot what it should send.
    /// Fails with [`SyncError::Busy`] while another one is in progress.
    pub fn begin_sync(&mut self) -> Result<SyncTicket, SyncError> {
        if self.sync_in_flight {
            return Err(SyncError::Busy);
        }
        self.sync_in_flight = true;
        Ok(SyncTicket {
            config: self.effective_config(),
            snapshot: self.data.clone(),
        })
    }

    /// Close a save started with [`begin_sync`](Self::begin_sync), stamping `last_sync` on success
    pub fn finish_push(&mut self, result: Result<SaveOutcome, SyncError>) -> AppResult<SaveOutcome> {
        self.sync_in_flight = false;
        let outcome = result?;
        if let SaveOutcome::Saved { synced_at, .. } = &outcome {
            self.dispatch_at(Command::MarkSynced(*synced_at), *synced_at)?;
        }
        Ok(outcome)
    }

    /// Close a fetch started with [`begin_sync`](Self::begin_sync), replacing local data on success
    pub fn finish_pull(&mut self, result: Result<FetchOutcome, SyncError>) -> AppResult<FetchOutcome> {
        self.sync_in_flight = false;
        let outcome = result?;
        if let FetchOutcome::Fetched(remote) = &outcome {
            self.dispatch(Command::ReplaceDocument(remote.clone()))?;
        }
        Ok(outcome)
    }

    /// Upload the current document
    pub async fn push<S: ContentStore>(&mut self, client: &SyncClient<S>, now: DateTime<Utc>) -> AppResult<SaveOutcome> {
        let ticket = self.begin_sync()?;
        let result = client.save(&ticket.config, &ticket.snapshot, now).await;
        self.finish_push(result)
    }

    /// Replace the current document with the remote copy
    pub async fn pull<S: ContentStore>(&mut self, client: &SyncClient<S>) -> AppResult<FetchOutcome> {
        let ticket = self.begin_sync()?;
        let result = client.fetch(&ticket.config).await;
        self.finish_pull(result)
    }

    pub fn resolve_task(&self, prefix: &str) -> Result<String, ValidationError> {
        resolve_prefix("task", self.data.tasks.iter().map(|t| t.id.as_str()), prefix)
    }

    pub fn resolve_vision(&self, prefix: &str) -> Result<String, ValidationError> {
        resolve_prefix("vision", self.data.visions.iter().map(|v| v.id.as_str()), prefix)
    }

    pub fn resolve_goal(&self, prefix: &str) -> Result<String, ValidationError> {
        resolve_prefix("goal", self.data.goals.iter().map(|g| g.id.as_str()), prefix)
    }

    pub fn resolve_category(&self, prefix: &str) -> Result<String, ValidationError> {
        resolve_prefix(
            "category",
            self.data.personal_categories.iter().map(|c| c.id.as_str()),
            prefix,
        )
    }

    pub fn resolve_item(&self, category_id: &str, prefix: &str) -> Result<String, ValidationError> {
        let category = self
            .data
            .personal_categories
            .iter()
            .find(|c| c.id == category_id)
            .ok_or_else(|| ValidationError::unknown("category", category_id))?;
        resolve_prefix("item", category.items.iter().map(|i| i.id.as_str()), prefix)
    }

    pub fn resolve_sub_item(&self, category_id: &str, item_id: &str, prefix: &str) -> Result<String, ValidationError> {
        let item = self
            .data
            .personal_categories
            .iter()
            .find(|c| c.id == category_id)
            .and_then(|c| c.items.iter().find(|i| i.id == item_id))
            .ok_or_else(|| ValidationError::unknown("item", item_id))?;
        resolve_prefix("detail", item.sub_items.iter().map(|s| s.id.as_str()), prefix)
    }
}
