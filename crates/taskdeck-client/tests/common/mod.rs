#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use serde_json::Value;
use taskdeck_client::{ApiError, ApiResult, TaskApi, TaskListBody};
use taskdeck_shared::{HealthStatus, Task, TaskDraft, TaskId};

/// In-memory stand-in for the task service.
#[derive(Default)]
pub struct FakeTaskService {
    tasks: RefCell<Vec<Task>>,
    next_id: Cell<u64>,
    calls: RefCell<Vec<String>>,
    failures: RefCell<Vec<ApiError>>,
    list_override: RefCell<Option<Value>>,
    health_status: RefCell<Option<String>>,
    pub echo_created: bool,
}

impl FakeTaskService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let next = tasks
            .iter()
            .filter_map(|task| match task.id {
                TaskId::Number(id) => Some(id),
                TaskId::Text(_) => None,
            })
            .max()
            .unwrap_or(0);
        let service = Self::new();
        service.next_id.set(next);
        *service.tasks.borrow_mut() = tasks;
        service
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.borrow().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// The next call fails with `err` instead of touching the data.
    pub fn fail_next(&self, err: ApiError) {
        self.failures.borrow_mut().push(err);
    }

    /// List calls return `body` verbatim until cleared.
    pub fn override_lists(&self, body: Option<Value>) {
        *self.list_override.borrow_mut() = body;
    }

    pub fn set_health_status(&self, status: &str) {
        *self.health_status.borrow_mut() = Some(status.to_string());
    }

    fn record(&self, call: String) -> ApiResult<()> {
        self.calls.borrow_mut().push(call);
        let mut failures = self.failures.borrow_mut();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures.remove(0))
        }
    }

    fn listing(&self, keep: impl Fn(&Task) -> bool) -> TaskListBody {
        if let Some(body) = self.list_override.borrow().clone() {
            return TaskListBody::new(body);
        }
        let tasks: Vec<Task> = self
            .tasks
            .borrow()
            .iter()
            .filter(|task| keep(task))
            .cloned()
            .collect();
        TaskListBody::from_tasks(&tasks)
    }

    fn not_found(id: &TaskId) -> ApiError {
        ApiError::Service {
            status: 404,
            body: format!(r#"{{"error":"Task {id} not found"}}"#),
        }
    }

    fn set_completed(&self, id: &TaskId, completed: bool) -> ApiResult<()> {
        let mut tasks = self.tasks.borrow_mut();
        let task = tasks
            .iter_mut()
            .find(|task| &task.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        task.completed = completed;
        Ok(())
    }
}

pub fn task(id: u64, header: &str, difficulty: i64, completed: bool) -> Task {
    Task {
        id: id.into(),
        header: header.to_string(),
        description: String::new(),
        difficulty,
        due_date: None,
        completed,
    }
}

impl TaskApi for FakeTaskService {
    async fn list_all(&self) -> ApiResult<TaskListBody> {
        self.record("list_all".to_string())?;
        Ok(self.listing(|_| true))
    }

    async fn list_prioritized(&self) -> ApiResult<TaskListBody> {
        self.record("list_prioritized".to_string())?;
        if self.list_override.borrow().is_some() {
            return Ok(self.listing(|_| true));
        }
        let mut open: Vec<Task> = self
            .tasks
            .borrow()
            .iter()
            .filter(|task| !task.completed)
            .cloned()
            .collect();
        open.sort_by(|a, b| b.difficulty.cmp(&a.difficulty));
        Ok(TaskListBody::from_tasks(&open))
    }

    async fn list_completed(&self) -> ApiResult<TaskListBody> {
        self.record("list_completed".to_string())?;
        Ok(self.listing(|task| task.completed))
    }

    async fn get(&self, id: &TaskId) -> ApiResult<Task> {
        self.record(format!("get {id}"))?;
        self.tasks
            .borrow()
            .iter()
            .find(|task| &task.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn create(&self, draft: &TaskDraft) -> ApiResult<Option<Task>> {
        self.record(format!("create {}", draft.header))?;
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let created = Task {
            id: id.into(),
            header: draft.header.clone(),
            description: draft.description.clone(),
            difficulty: draft.difficulty,
            due_date: Some(draft.due_date.clone()).filter(|due| !due.is_empty()),
            completed: false,
        };
        self.tasks.borrow_mut().push(created.clone());
        Ok(self.echo_created.then_some(created))
    }

    async fn update(&self, id: &TaskId, draft: &TaskDraft) -> ApiResult<Option<Task>> {
        self.record(format!("update {id}"))?;
        let mut tasks = self.tasks.borrow_mut();
        let task = tasks
            .iter_mut()
            .find(|task| &task.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        task.header = draft.header.clone();
        task.description = draft.description.clone();
        task.difficulty = draft.difficulty;
        task.due_date = Some(draft.due_date.clone()).filter(|due| !due.is_empty());
        Ok(None)
    }

    async fn delete(&self, id: &TaskId) -> ApiResult<()> {
        self.record(format!("delete {id}"))?;
        let mut tasks = self.tasks.borrow_mut();
        let before = tasks.len();
        tasks.retain(|task| &task.id != id);
        if tasks.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    async fn complete(&self, id: &TaskId) -> ApiResult<()> {
        self.record(format!("complete {id}"))?;
        self.set_completed(id, true)
    }

    async fn uncomplete(&self, id: &TaskId) -> ApiResult<()> {
        self.record(format!("uncomplete {id}"))?;
        self.set_completed(id, false)
    }

    async fn health(&self) -> ApiResult<HealthStatus> {
        self.record("health".to_string())?;
        Ok(HealthStatus {
            status: self
                .health_status
                .borrow()
                .clone()
                .unwrap_or_else(|| "ok".to_string()),
            timestamp: Some(1_700_000_000_000),
        })
    }
}
