use std::io::Write;

use anyhow::{Context, anyhow};
use chrono::{Local, NaiveDate};
use taskdeck_client::{
    FormError, ManualScheme, PreferenceStore, TaskApi, TaskForm, TaskListController,
    ThemeResolver, check_health,
};
use taskdeck_shared::{TaskDraft, TaskId, ThemePreference, ViewFilter};
use tracing::{debug, info, instrument};

use crate::cli::Command;
use crate::render::Renderer;

/// Everything a command needs, built once per invocation.
pub struct Session<A, P> {
    pub api: A,
    pub theme: ThemeResolver<P, ManualScheme>,
    pub renderer: Renderer,
    pub today: NaiveDate,
}

impl<A, P> Session<A, P>
where
    A: TaskApi,
    P: PreferenceStore + 'static,
{
    pub fn new(api: A, theme: ThemeResolver<P, ManualScheme>, renderer: Renderer) -> Self {
        Self {
            api,
            theme,
            renderer,
            today: Local::now().date_naive(),
        }
    }
}

#[instrument(skip(session, out))]
pub async fn dispatch<A, P, W>(
    session: &mut Session<A, P>,
    command: Command,
    out: &mut W,
) -> anyhow::Result<()>
where
    A: TaskApi,
    P: PreferenceStore + 'static,
    W: Write,
{
    match command {
        Command::List { view } => cmd_list(session, view, out).await,
        Command::Add {
            header,
            description,
            difficulty,
            due_date,
        } => {
            let draft = TaskDraft {
                header,
                description,
                difficulty,
                due_date,
            };
            cmd_add(session, draft, out).await
        }
        Command::Info { id } => cmd_info(session, &id, out).await,
        Command::Edit {
            id,
            header,
            description,
            difficulty,
            due_date,
        } => {
            let changes = DraftChanges {
                header,
                description,
                difficulty,
                due_date,
            };
            cmd_edit(session, &id, changes, out).await
        }
        Command::Done { id } => {
            session
                .api
                .complete(&id)
                .await
                .map_err(|err| anyhow!("Failed to update task: {}", err.user_message()))?;
            session
                .renderer
                .print_message(out, &format!("Completed task {id}."))
        }
        Command::Undo { id } => {
            session
                .api
                .uncomplete(&id)
                .await
                .map_err(|err| anyhow!("Failed to update task: {}", err.user_message()))?;
            session
                .renderer
                .print_message(out, &format!("Reopened task {id}."))
        }
        Command::Delete { id } => {
            session
                .api
                .delete(&id)
                .await
                .map_err(|err| anyhow!("Failed to delete task: {}", err.user_message()))?;
            session
                .renderer
                .print_message(out, &format!("Deleted task {id}."))
        }
        Command::Health => cmd_health(session, out).await,
        Command::Theme { preference } => cmd_theme(session, preference, out),
    }
}

async fn cmd_list<A, P, W>(
    session: &mut Session<A, P>,
    view: ViewFilter,
    out: &mut W,
) -> anyhow::Result<()>
where
    A: TaskApi,
    P: PreferenceStore + 'static,
    W: Write,
{
    let mut list = TaskListController::new(&session.api);
    list.set_filter(view).await;

    let state = list.state();
    if let Some(error) = state.error() {
        return Err(anyhow!("{error}"));
    }

    debug!(view = %view, count = state.tasks().len(), "rendering task list");
    session
        .renderer
        .print_task_table(out, state.heading(), state.tasks(), session.today)
}

async fn cmd_add<A, P, W>(
    session: &mut Session<A, P>,
    draft: TaskDraft,
    out: &mut W,
) -> anyhow::Result<()>
where
    A: TaskApi,
    P: PreferenceStore + 'static,
    W: Write,
{
    let mut form = TaskForm::new();
    form.set_header(draft.header);
    form.set_description(draft.description);
    form.set_difficulty(draft.difficulty);
    form.set_due_date(draft.due_date);

    let created = form
        .submit(&session.api, || info!("task added"))
        .await
        .map_err(|err| match err {
            FormError::Validation(err) => anyhow!(err),
            FormError::Api(err) => anyhow!("Failed to create task: {}", err.user_message()),
        })?;

    let message = match created {
        Some(task) => format!("Created task {}.", task.id),
        None => "Created task.".to_string(),
    };
    session.renderer.print_message(out, &message)
}

async fn cmd_info<A, P, W>(session: &mut Session<A, P>, id: &TaskId, out: &mut W) -> anyhow::Result<()>
where
    A: TaskApi,
    P: PreferenceStore + 'static,
    W: Write,
{
    let task = session
        .api
        .get(id)
        .await
        .with_context(|| format!("failed to load task {id}"))?;
    session.renderer.print_task_info(out, &task)
}

/// Fields given to `edit`; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftChanges {
    pub header: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<i64>,
    pub due_date: Option<String>,
}

impl DraftChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(self, draft: &mut TaskDraft) {
        if let Some(header) = self.header {
            draft.header = header;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(difficulty) = self.difficulty {
            draft.difficulty = difficulty;
        }
        if let Some(due_date) = self.due_date {
            draft.due_date = due_date;
        }
    }
}

async fn cmd_edit<A, P, W>(
    session: &mut Session<A, P>,
    id: &TaskId,
    changes: DraftChanges,
    out: &mut W,
) -> anyhow::Result<()>
where
    A: TaskApi,
    P: PreferenceStore + 'static,
    W: Write,
{
    if changes.is_empty() {
        return Err(anyhow!("nothing to change; pass at least one field"));
    }

    let task = session
        .api
        .get(id)
        .await
        .with_context(|| format!("failed to load task {id}"))?;

    let mut draft = TaskDraft::from_task(&task);
    changes.apply_to(&mut draft);
    draft.validate()?;

    session
        .api
        .update(id, &draft)
        .await
        .map_err(|err| anyhow!("Failed to update task: {}", err.user_message()))?;
    session
        .renderer
        .print_message(out, &format!("Updated task {id}."))
}

async fn cmd_health<A, P, W>(session: &mut Session<A, P>, out: &mut W) -> anyhow::Result<()>
where
    A: TaskApi,
    P: PreferenceStore + 'static,
    W: Write,
{
    let health = check_health(&session.api).await;
    if !health.is_connected() {
        return Err(anyhow!(health.message()));
    }
    session.renderer.print_message(out, &health.message())
}

fn cmd_theme<A, P, W>(
    session: &mut Session<A, P>,
    preference: Option<ThemePreference>,
    out: &mut W,
) -> anyhow::Result<()>
where
    A: TaskApi,
    P: PreferenceStore + 'static,
    W: Write,
{
    if let Some(preference) = preference {
        session.theme.set_preference(preference);
        info!(%preference, "theme preference updated");
    }
    session.renderer.print_theme(out, session.theme.snapshot())
}
