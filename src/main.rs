mod app;
mod domain;
mod error;
mod persistence;
mod sync;

use anyhow::{Context, Result};
use app::{AppState, Command};
use chrono::{DateTime, Local, Utc};
use clap::{Args, Parser, Subcommand};
use domain::dossier::export_text;
use domain::task::EstimatedTime;
use domain::timestamp::parse_timestamp;
use domain::views::{deadline_label, status_badge};
use domain::{display_order, notification_set, Intent, Summary, Task, TaskDraft, TimeSavingPotential, DEFAULT_CATEGORIES};
use persistence::{init_local_dir, resolve_data_dir, LocalStore};
use std::path::PathBuf;
use sync::config::TOKEN_ENV;
use sync::{FetchOutcome, HttpContentStore, SaveOutcome, SyncClient, SyncConfigPatch};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pulse")]
#[command(version, about = "Personal tasks, visions, goals and a private dossier, synced to a GitHub file", long_about = None)]
struct Cli {
    /// Data directory (defaults to a local .pulse, then ~/.pulse)
    #[arg(long, global = true, env = "PULSE_DIR")]
    dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Extra task categories, comma separated
    #[arg(long, global = true, env = "PULSE_CATEGORIES", value_delimiter = ',')]
    category_extra: Vec<String>,

    /// GitHub token for this run only; never written to the config file
    #[arg(long, global = true, env = TOKEN_ENV, hide_env_values = true)]
    github_token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .pulse directory in the current directory
    Init,
    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommand),
    /// Show tasks that are overdue, due within a day, or serious
    Notify,
    /// Manage visions
    #[command(subcommand)]
    Vision(VisionCommand),
    /// Manage goals
    #[command(subcommand)]
    Goal(GoalCommand),
    /// Manage the personal dossier
    #[command(subcommand)]
    Dossier(DossierCommand),
    /// Remote backup to a file in a GitHub repository
    #[command(subcommand)]
    Sync(SyncCommand),
    /// Headline counts
    Summary,
}

#[derive(Args)]
struct TaskFields {
    #[arg(long)]
    probable: Option<String>,
    #[arg(long)]
    days: Option<u32>,
    #[arg(long)]
    hours: Option<u32>,
    #[arg(long)]
    minutes: Option<u32>,
    /// 1 to 5
    #[arg(long)]
    urgency: Option<i64>,
    /// 1 to 5
    #[arg(long)]
    importance: Option<i64>,
    /// "very much", "not much" or "may not save"
    #[arg(long)]
    time_saving: Option<String>,
    #[arg(long)]
    serious: Option<bool>,
}

#[derive(Subcommand)]
enum TaskCommand {
    Add {
        title: String,
        /// Deadline, RFC 3339 or YYYY-MM-DDTHH:MM in local time
        #[arg(long)]
        deadline: String,
        #[arg(long, default_value = "Work")]
        category: String,
        #[command(flatten)]
        fields: TaskFields,
    },
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        deadline: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Flip between pending and completed
    Toggle { id: String },
    Delete { id: String },
    /// Record hours actually spent on a completed task (omit to clear)
    Actual { id: String, hours: Option<f64> },
    List,
}

#[derive(Subcommand)]
enum VisionCommand {
    Add {
        text: String,
        #[arg(long, default_value = "")]
        timeline: String,
    },
    Edit {
        id: String,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        timeline: Option<String>,
    },
    Delete { id: String },
    List,
}

#[derive(Subcommand)]
enum GoalCommand {
    Add {
        title: String,
        #[arg(long, default_value = "")]
        timeline: String,
        /// One plan per flag, or several separated by newlines
        #[arg(long = "plan")]
        plans: Vec<String>,
    },
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        timeline: Option<String>,
        /// Replaces all plans when given
        #[arg(long = "plan")]
        plans: Vec<String>,
    },
    Delete { id: String },
    List,
}

#[derive(Subcommand)]
enum DossierCommand {
    CategoryAdd { name: String },
    CategoryRename { category: String, name: String },
    CategoryDelete { category: String },
    ItemAdd { category: String, name: String },
    ItemRename { category: String, item: String, name: String },
    ItemDelete { category: String, item: String },
    DetailAdd { category: String, item: String, heading: String, value: String },
    DetailEdit { category: String, item: String, detail: String, heading: String, value: String },
    DetailDelete { category: String, item: String, detail: String },
    Show,
    /// Print the plain-text export
    Export,
}

#[derive(Subcommand)]
enum SyncCommand {
    /// Set any of the connection fields
    Configure {
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        owner: Option<String>,
        #[arg(long)]
        repo: Option<String>,
        #[arg(long)]
        path: Option<String>,
        #[arg(long)]
        api_base: Option<String>,
    },
    /// Upload local data, overwriting the remote file
    Push,
    /// Replace local data with the remote file
    Pull,
    Status,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Init = cli.command {
        let current_dir = std::env::current_dir().context("Could not determine current directory")?;
        let dir = init_local_dir(&current_dir)?;
        println!("Initialized pulse directory: {}", dir.display());
        println!();
        println!("Pulse will now use this local directory for its data.");
        return Ok(());
    }

    let dir = resolve_data_dir(cli.dir.as_deref())?;
    let mut categories: Vec<String> = DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect();
    for extra in cli.category_extra.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
        if !categories.iter().any(|c| c == extra) {
            categories.push(extra.to_string());
        }
    }
    let mut app = AppState::load(LocalStore::new(dir), categories, cli.github_token);

    match cli.command {
        Commands::Init => Ok(()),
        Commands::Task(command) => run_task(&mut app, command),
        Commands::Notify => {
            print_notifications(&app, Utc::now());
            Ok(())
        }
        Commands::Vision(command) => run_vision(&mut app, command),
        Commands::Goal(command) => run_goal(&mut app, command),
        Commands::Dossier(command) => run_dossier(&mut app, command),
        Commands::Sync(command) => run_sync(&mut app, command).await,
        Commands::Summary => {
            print_summary(&app, Utc::now());
            Ok(())
        }
    }
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>> {
    parse_timestamp(raw).with_context(|| format!("Invalid date/time '{}'. Use RFC 3339 or YYYY-MM-DDTHH:MM", raw))
}

fn parse_time_saving(raw: &str) -> Result<TimeSavingPotential> {
    TimeSavingPotential::from_label(raw)
        .with_context(|| format!("Invalid time saving '{}'. Use very-much, not-much or may-not-save", raw))
}

/// Overlay the given fields onto a draft
fn apply_fields(mut draft: TaskDraft, fields: TaskFields) -> Result<TaskDraft> {
    if let Some(probable) = fields.probable {
        draft.probable_completion = Some(parse_time(&probable)?);
    }
    let estimate = draft.estimated_time;
    draft.estimated_time = EstimatedTime::new(
        fields.days.unwrap_or(estimate.days),
        fields.hours.unwrap_or(estimate.hours),
        fields.minutes.unwrap_or(estimate.minutes),
    );
    if let Some(urgency) = fields.urgency {
        draft.urgency = urgency;
    }
    if let Some(importance) = fields.importance {
        draft.importance = importance;
    }
    if let Some(time_saving) = fields.time_saving {
        draft.time_saving = parse_time_saving(&time_saving)?;
    }
    if let Some(serious) = fields.serious {
        draft.is_serious = serious;
    }
    Ok(draft)
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn local(time: &DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn print_task(task: &Task, now: DateTime<Utc>) {
    let mut line = format!(
        "{}  {:<10} {}  [{}] due {}  est {}  u{} i{}  saves {}",
        short_id(&task.id),
        status_badge(task),
        task.title,
        task.category,
        local(&task.deadline),
        task.estimated_time.formatted(),
        task.urgency,
        task.importance,
        task.time_saving.label(),
    );
    if task.probable_completion() != task.deadline {
        line.push_str(&format!("  likely {}", local(&task.probable_completion())));
    }
    if let Some(label) = deadline_label(task, now) {
        line.push_str(&format!("  ({})", label));
    }
    if let Some(hours) = task.actual_time_taken {
        line.push_str(&format!("  took {}h", hours));
    }
    println!("{}", line);
}

fn run_task(app: &mut AppState, command: TaskCommand) -> Result<()> {
    match command {
        TaskCommand::Add { title, deadline, category, fields } => {
            let draft = apply_fields(TaskDraft::new(title, category, parse_time(&deadline)?), fields)?;
            app.dispatch(Command::SubmitTask { intent: Intent::Create, draft })?;
            if let Some(task) = app.data().tasks.last() {
                println!("Added task {}", short_id(&task.id));
            }
        }
        TaskCommand::Edit { id, title, category, deadline, fields } => {
            let id = app.resolve_task(&id)?;
            let task = app
                .data()
                .find_task(&id)
                .with_context(|| format!("Task {} disappeared", id))?;
            let mut draft = TaskDraft::from_task(task);
            if let Some(title) = title {
                draft.title = title;
            }
            if let Some(category) = category {
                draft.category = category;
            }
            if let Some(deadline) = deadline {
                draft.deadline = parse_time(&deadline)?;
            }
            let draft = apply_fields(draft, fields)?;
            app.dispatch(Command::SubmitTask { intent: Intent::Edit(id.clone()), draft })?;
            println!("Updated task {}", short_id(&id));
        }
        TaskCommand::Toggle { id } => {
            let id = app.resolve_task(&id)?;
            app.dispatch(Command::ToggleTask(id.clone()))?;
            if let Some(task) = app.data().find_task(&id) {
                println!("Task {} is now {}", short_id(&id), task.status.as_str());
            }
        }
        TaskCommand::Delete { id } => {
            let id = app.resolve_task(&id)?;
            app.dispatch(Command::DeleteTask(id.clone()))?;
            println!("Deleted task {}", short_id(&id));
        }
        TaskCommand::Actual { id, hours } => {
            let id = app.resolve_task(&id)?;
            app.dispatch(Command::SetActualTime { id: id.clone(), hours })?;
            println!("Recorded actual time for task {}", short_id(&id));
        }
        TaskCommand::List => {
            let now = Utc::now();
            let ordered = display_order(&app.data().tasks);
            if ordered.is_empty() {
                println!("No tasks.");
            }
            for task in ordered {
                print_task(task, now);
            }
        }
    }
    Ok(())
}

fn print_notifications(app: &AppState, now: DateTime<Utc>) {
    let notifications = notification_set(&app.data().tasks, now);
    if notifications.is_empty() {
        println!("Nothing needs attention.");
        return;
    }
    for notification in notifications {
        println!(
            "[{}] {}  due {}  ({})",
            notification.kind.label(),
            notification.task.title,
            local(&notification.task.deadline),
            short_id(&notification.task.id),
        );
    }
}

fn run_vision(app: &mut AppState, command: VisionCommand) -> Result<()> {
    match command {
        VisionCommand::Add { text, timeline } => {
            app.dispatch(Command::SubmitVision { intent: Intent::Create, text, timeline })?;
            println!("Added vision");
        }
        VisionCommand::Edit { id, text, timeline } => {
            let id = app.resolve_vision(&id)?;
            let current = app
                .data()
                .visions
                .iter()
                .find(|v| v.id == id)
                .cloned()
                .with_context(|| format!("Vision {} disappeared", id))?;
            app.dispatch(Command::SubmitVision {
                intent: Intent::Edit(id.clone()),
                text: text.unwrap_or(current.text),
                timeline: timeline.unwrap_or(current.timeline),
            })?;
            println!("Updated vision {}", short_id(&id));
        }
        VisionCommand::Delete { id } => {
            let id = app.resolve_vision(&id)?;
            app.dispatch(Command::DeleteVision(id.clone()))?;
            println!("Deleted vision {}", short_id(&id));
        }
        VisionCommand::List => {
            for vision in &app.data().visions {
                println!("{}  {}  ({})", short_id(&vision.id), vision.text, vision.timeline);
            }
        }
    }
    Ok(())
}

fn run_goal(app: &mut AppState, command: GoalCommand) -> Result<()> {
    match command {
        GoalCommand::Add { title, timeline, plans } => {
            app.dispatch(Command::SubmitGoal { intent: Intent::Create, title, timeline, plans })?;
            println!("Added goal");
        }
        GoalCommand::Edit { id, title, timeline, plans } => {
            let id = app.resolve_goal(&id)?;
            let current = app
                .data()
                .goals
                .iter()
                .find(|g| g.id == id)
                .cloned()
                .with_context(|| format!("Goal {} disappeared", id))?;
            app.dispatch(Command::SubmitGoal {
                intent: Intent::Edit(id.clone()),
                title: title.unwrap_or(current.title),
                timeline: timeline.unwrap_or(current.timeline),
                plans: if plans.is_empty() { current.plans } else { plans },
            })?;
            println!("Updated goal {}", short_id(&id));
        }
        GoalCommand::Delete { id } => {
            let id = app.resolve_goal(&id)?;
            app.dispatch(Command::DeleteGoal(id.clone()))?;
            println!("Deleted goal {}", short_id(&id));
        }
        GoalCommand::List => {
            for goal in &app.data().goals {
                println!("{}  {}  ({})", short_id(&goal.id), goal.title, goal.timeline);
                for plan in &goal.plans {
                    println!("    - {}", plan);
                }
            }
        }
    }
    Ok(())
}

fn run_dossier(app: &mut AppState, command: DossierCommand) -> Result<()> {
    match command {
        DossierCommand::CategoryAdd { name } => {
            app.dispatch(Command::SubmitCategory { intent: Intent::Create, name })?;
        }
        DossierCommand::CategoryRename { category, name } => {
            let id = app.resolve_category(&category)?;
            app.dispatch(Command::SubmitCategory { intent: Intent::Edit(id), name })?;
        }
        DossierCommand::CategoryDelete { category } => {
            let id = app.resolve_category(&category)?;
            app.dispatch(Command::DeleteCategory(id))?;
        }
        DossierCommand::ItemAdd { category, name } => {
            let category_id = app.resolve_category(&category)?;
            app.dispatch(Command::SubmitItem { category_id, intent: Intent::Create, name })?;
        }
        DossierCommand::ItemRename { category, item, name } => {
            let category_id = app.resolve_category(&category)?;
            let item_id = app.resolve_item(&category_id, &item)?;
            app.dispatch(Command::SubmitItem { category_id, intent: Intent::Edit(item_id), name })?;
        }
        DossierCommand::ItemDelete { category, item } => {
            let category_id = app.resolve_category(&category)?;
            let item_id = app.resolve_item(&category_id, &item)?;
            app.dispatch(Command::DeleteItem { category_id, item_id })?;
        }
        DossierCommand::DetailAdd { category, item, heading, value } => {
            let category_id = app.resolve_category(&category)?;
            let item_id = app.resolve_item(&category_id, &item)?;
            app.dispatch(Command::SubmitSubItem {
                category_id,
                item_id,
                intent: Intent::Create,
                heading,
                value,
            })?;
        }
        DossierCommand::DetailEdit { category, item, detail, heading, value } => {
            let category_id = app.resolve_category(&category)?;
            let item_id = app.resolve_item(&category_id, &item)?;
            let sub_item_id = app.resolve_sub_item(&category_id, &item_id, &detail)?;
            app.dispatch(Command::SubmitSubItem {
                category_id,
                item_id,
                intent: Intent::Edit(sub_item_id),
                heading,
                value,
            })?;
        }
        DossierCommand::DetailDelete { category, item, detail } => {
            let category_id = app.resolve_category(&category)?;
            let item_id = app.resolve_item(&category_id, &item)?;
            let sub_item_id = app.resolve_sub_item(&category_id, &item_id, &detail)?;
            app.dispatch(Command::DeleteSubItem { category_id, item_id, sub_item_id })?;
        }
        DossierCommand::Show => {
            for category in &app.data().personal_categories {
                println!("{}  {}", short_id(&category.id), category.name);
                for item in &category.items {
                    println!("  {}  {}", short_id(&item.id), item.name);
                    for sub_item in &item.sub_items {
                        println!("    {}  {}: {}", short_id(&sub_item.id), sub_item.heading, sub_item.value);
                    }
                }
            }
        }
        DossierCommand::Export => {
            print!("{}", export_text(&app.data().personal_categories));
        }
    }
    Ok(())
}

async fn run_sync(app: &mut AppState, command: SyncCommand) -> Result<()> {
    match command {
        SyncCommand::Configure { token, owner, repo, path, api_base } => {
            app.update_config(SyncConfigPatch { token, owner, repo, path, api_base })?;
            println!("Sync configuration saved");
        }
        SyncCommand::Push => {
            let client = SyncClient::new(HttpContentStore::new()?);
            match app.push(&client, Utc::now()).await? {
                SaveOutcome::Saved { synced_at, .. } => println!("Synced at {}", local(&synced_at)),
                SaveOutcome::NotConfigured => println!("Sync is not configured. Run 'pulse sync configure' first."),
            }
        }
        SyncCommand::Pull => {
            let client = SyncClient::new(HttpContentStore::new()?);
            match app.pull(&client).await? {
                FetchOutcome::Fetched(data) => println!("Fetched {} tasks from remote", data.tasks.len()),
                FetchOutcome::NotConfigured => println!("Sync is not configured. Run 'pulse sync configure' first."),
            }
        }
        SyncCommand::Status => {
            let config = app.effective_config();
            println!("{:?}", config);
            println!("Configured: {}", if config.is_configured() { "yes" } else { "no" });
            if config.token != app.stored_config().token {
                println!("Token taken from {}", TOKEN_ENV);
            }
            match app.data().last_sync {
                Some(at) => println!("Last sync: {}", local(&at)),
                None => println!("Last sync: never"),
            }
        }
    }
    Ok(())
}

fn print_summary(app: &AppState, now: DateTime<Utc>) {
    let summary = Summary::of(app.data(), now);
    println!("Pending:   {} ({} overdue, {} serious)", summary.pending, summary.overdue, summary.serious_pending);
    println!("Completed: {}", summary.completed);
    println!("Visions:   {}", summary.visions);
    println!("Goals:     {}", summary.goals);
    println!("Dossier:   {} entries", summary.dossier_entries);
    match summary.last_sync {
        Some(at) => println!("Last sync: {}", local(&at)),
        None => println!("Last sync: never"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_task_add_requires_deadline() {
        let err = Cli::try_parse_from(["pulse", "task", "add", "No deadline"]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let cli = Cli::try_parse_from(["pulse", "task", "add", "Report", "--deadline", "2030-01-01T10:00"]).unwrap();
        match cli.command {
            Commands::Task(TaskCommand::Add { title, deadline, category, .. }) => {
                assert_eq!(title, "Report");
                assert_eq!(deadline, "2030-01-01T10:00");
                assert_eq!(category, "Work");
            }
            _ => panic!("expected task add"),
        }
    }

    #[test]
    fn test_task_edit_deadline_is_optional() {
        let cli = Cli::try_parse_from(["pulse", "task", "edit", "abc", "--title", "New"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Task(TaskCommand::Edit { deadline: None, .. })
        ));
    }

    #[test]
    fn test_github_token_flag() {
        let cli = Cli::try_parse_from(["pulse", "--github-token", "ghp_x", "sync", "status"]).unwrap();
        assert_eq!(cli.github_token.as_deref(), Some("ghp_x"));
    }

    #[test]
    fn test_help_hides_token_value() {
        let help = Cli::command().render_long_help().to_string();
        assert!(help.contains(TOKEN_ENV));
        assert!(!help.contains("ghp_"));
    }
}
