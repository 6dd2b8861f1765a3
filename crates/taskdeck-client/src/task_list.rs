use taskdeck_shared::{Task, TaskId, ViewFilter};
use tracing::{debug, error, warn};

use crate::api::{TaskApi, TaskListBody};
use crate::error::{ApiError, ApiResult, FailureKind};

pub const MALFORMED_LIST_MESSAGE: &str = "Received invalid data format from server";
pub const EMPTY_LIST_MESSAGE: &str = "No tasks found. Add some tasks to get started!";

/// Identifies one issued fetch. Tokens grow monotonically per state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub token: u64,
    pub filter: ViewFilter,
}

/// View state of the task list.
///
/// Every filter selection and every change notification issues exactly one
/// fetch ticket; the caller runs the matching API call and feeds the result
/// back through [`TaskListState::apply`]. Overlapping fetches are not
/// cancelled and the last one to resolve wins, unless stale discarding is
/// switched on.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskListState {
    filter: ViewFilter,
    revision: u64,
    tasks: Vec<Task>,
    error: Option<String>,
    in_flight: usize,
    issued: u64,
    last_applied: Option<u64>,
    discard_stale: bool,
}

impl TaskListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops results whose ticket is older than the newest one issued.
    /// Off by default, where the last response to resolve wins; neither
    /// presentation layer turns it on.
    pub fn with_stale_discard(mut self, discard_stale: bool) -> Self {
        self.discard_stale = discard_stale;
        self
    }

    pub fn filter(&self) -> ViewFilter {
        self.filter
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn last_applied(&self) -> Option<u64> {
        self.last_applied
    }

    pub fn heading(&self) -> &'static str {
        self.filter.heading()
    }

    /// Re-selecting the current filter also fetches, which doubles as the
    /// retry action.
    pub fn set_filter(&mut self, filter: ViewFilter) -> FetchTicket {
        self.filter = filter;
        self.issue()
    }

    pub fn notify_changed(&mut self) -> FetchTicket {
        self.revision += 1;
        self.issue()
    }

    fn issue(&mut self) -> FetchTicket {
        self.issued += 1;
        self.in_flight += 1;
        self.error = None;
        let ticket = FetchTicket {
            token: self.issued,
            filter: self.filter,
        };
        debug!(
            token = ticket.token,
            filter = %ticket.filter,
            revision = self.revision,
            "issued task list fetch"
        );
        ticket
    }

    /// Returns whether the result was applied.
    pub fn apply(&mut self, ticket: FetchTicket, result: ApiResult<TaskListBody>) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);

        if self.discard_stale && ticket.token != self.issued {
            debug!(
                token = ticket.token,
                latest = self.issued,
                "discarding stale task list response"
            );
            return false;
        }

        match result.and_then(TaskListBody::into_tasks) {
            Ok(tasks) => {
                debug!(
                    token = ticket.token,
                    filter = %ticket.filter,
                    count = tasks.len(),
                    "task list replaced"
                );
                self.tasks = tasks;
                self.error = None;
            }
            Err(err) if err.kind() == FailureKind::MalformedResponse => {
                warn!(token = ticket.token, error = %err, "task list payload malformed");
                self.tasks = Vec::new();
                self.error = Some(MALFORMED_LIST_MESSAGE.to_string());
            }
            Err(err) => {
                error!(token = ticket.token, error = %err, "task list fetch failed");
                self.error = Some(format!("Failed to load tasks: {}", err.user_message()));
            }
        }

        self.last_applied = Some(ticket.token);
        true
    }

    /// Records a failed per-task action without touching the collection.
    pub fn report_action_failure(&mut self, action: &str, err: &ApiError) {
        error!(action, error = %err, "task action failed");
        self.error = Some(format!("Failed to {action} task: {}", err.user_message()));
    }
}

/// Drives a [`TaskListState`] against a [`TaskApi`], awaiting each fetch
/// before returning.
pub struct TaskListController<A> {
    api: A,
    state: TaskListState,
}

impl<A: TaskApi> TaskListController<A> {
    pub fn new(api: A) -> Self {
        Self::with_state(api, TaskListState::new())
    }

    pub fn with_state(api: A, state: TaskListState) -> Self {
        Self { api, state }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> &TaskListState {
        &self.state
    }

    pub fn tasks(&self) -> &[Task] {
        self.state.tasks()
    }

    pub async fn set_filter(&mut self, filter: ViewFilter) {
        let ticket = self.state.set_filter(filter);
        self.run(ticket).await;
    }

    pub async fn notify_changed(&mut self) {
        let ticket = self.state.notify_changed();
        self.run(ticket).await;
    }

    /// Completes an open task or reopens a completed one, then refetches.
    pub async fn toggle_completed(&mut self, task: &Task) -> ApiResult<()> {
        let result = if task.completed {
            self.api.uncomplete(&task.id).await
        } else {
            self.api.complete(&task.id).await
        };
        self.after_action("update", result).await
    }

    pub async fn delete(&mut self, id: &TaskId) -> ApiResult<()> {
        let result = self.api.delete(id).await;
        self.after_action("delete", result).await
    }

    async fn after_action(&mut self, action: &str, result: ApiResult<()>) -> ApiResult<()> {
        match result {
            Ok(()) => {
                self.notify_changed().await;
                Ok(())
            }
            Err(err) => {
                self.state.report_action_failure(action, &err);
                Err(err)
            }
        }
    }

    async fn run(&mut self, ticket: FetchTicket) {
        let result = self.api.list(ticket.filter).await;
        self.state.apply(ticket, result);
    }
}
