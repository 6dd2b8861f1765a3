use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use taskdeck_shared::{HealthStatus, Task, TaskDraft, TaskId, ViewFilter};
use tracing::{debug, error, instrument, warn};

use crate::error::{ApiError, ApiResult};

/// Operations offered by the remote task service. Each call performs exactly
/// one request; nothing is retried, deduplicated or timed out here.
#[allow(async_fn_in_trait)]
pub trait TaskApi {
    async fn list_all(&self) -> ApiResult<TaskListBody>;
    async fn list_prioritized(&self) -> ApiResult<TaskListBody>;
    async fn list_completed(&self) -> ApiResult<TaskListBody>;
    async fn get(&self, id: &TaskId) -> ApiResult<Task>;
    /// The reference service answers `201` with an empty body, so the created
    /// task is only returned when the service echoes it.
    async fn create(&self, draft: &TaskDraft) -> ApiResult<Option<Task>>;
    async fn update(&self, id: &TaskId, draft: &TaskDraft) -> ApiResult<Option<Task>>;
    async fn delete(&self, id: &TaskId) -> ApiResult<()>;
    async fn complete(&self, id: &TaskId) -> ApiResult<()>;
    async fn uncomplete(&self, id: &TaskId) -> ApiResult<()>;
    async fn health(&self) -> ApiResult<HealthStatus>;

    async fn list(&self, filter: ViewFilter) -> ApiResult<TaskListBody> {
        match filter {
            ViewFilter::All => self.list_all().await,
            ViewFilter::Prioritized => self.list_prioritized().await,
            ViewFilter::Completed => self.list_completed().await,
        }
    }
}

impl<T: TaskApi> TaskApi for &T {
    async fn list_all(&self) -> ApiResult<TaskListBody> {
        (**self).list_all().await
    }

    async fn list_prioritized(&self) -> ApiResult<TaskListBody> {
        (**self).list_prioritized().await
    }

    async fn list_completed(&self) -> ApiResult<TaskListBody> {
        (**self).list_completed().await
    }

    async fn get(&self, id: &TaskId) -> ApiResult<Task> {
        (**self).get(id).await
    }

    async fn create(&self, draft: &TaskDraft) -> ApiResult<Option<Task>> {
        (**self).create(draft).await
    }

    async fn update(&self, id: &TaskId, draft: &TaskDraft) -> ApiResult<Option<Task>> {
        (**self).update(id, draft).await
    }

    async fn delete(&self, id: &TaskId) -> ApiResult<()> {
        (**self).delete(id).await
    }

    async fn complete(&self, id: &TaskId) -> ApiResult<()> {
        (**self).complete(id).await
    }

    async fn uncomplete(&self, id: &TaskId) -> ApiResult<()> {
        (**self).uncomplete(id).await
    }

    async fn health(&self) -> ApiResult<HealthStatus> {
        (**self).health().await
    }
}

/// Undecoded body of a list response. The `{tasks: [...]}` shape is checked
/// by whoever consumes it, so a missing field degrades instead of failing the
/// request.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskListBody(Value);

impl TaskListBody {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn from_tasks(tasks: &[Task]) -> Self {
        Self(serde_json::json!({ "tasks": tasks }))
    }

    pub fn into_tasks(self) -> ApiResult<Vec<Task>> {
        let Value::Object(mut body) = self.0 else {
            return Err(ApiError::MalformedResponse(
                "expected a JSON object".to_string(),
            ));
        };

        match body.remove("tasks") {
            None | Some(Value::Null) => Err(ApiError::MalformedResponse(
                "missing `tasks` field".to_string(),
            )),
            Some(tasks) => serde_json::from_value(tasks)
                .map_err(|err| ApiError::MalformedResponse(format!("invalid `tasks`: {err}"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    http: Client,
    base: Url,
    health_url: String,
}

impl HttpTaskApi {
    /// `base_url` is the API prefix (for example `http://localhost:8080/api`).
    /// The health probe lives at the service root, outside that prefix.
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, url::ParseError> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
        }
        let health_url = base.join("/health")?.to_string();

        Ok(Self {
            http,
            base,
            health_url,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    pub fn health_url(&self) -> &str {
        &self.health_url
    }

    fn endpoint(&self, segments: &[&str]) -> String {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.to_string()
    }

    fn task_endpoint(&self, id: &TaskId, action: Option<&str>) -> String {
        let id = id.to_string();
        match action {
            Some(action) => self.endpoint(&["tasks", &id, action]),
            None => self.endpoint(&["tasks", &id]),
        }
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http.request(method, url)
    }

    async fn send(&self, method: Method, url: &str, request: RequestBuilder) -> ApiResult<Response> {
        debug!(%method, url, "sending request");

        let response = request.send().await.map_err(|err| {
            error!(%method, url, error = %err, "no response received");
            ApiError::Transport(err.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(err) => {
                    warn!(%method, url, error = %err, "failed reading error body");
                    String::new()
                }
            };
            error!(
                %method,
                url,
                status = status.as_u16(),
                body = %body,
                "service responded with an error status"
            );
            return Err(ApiError::Service {
                status: status.as_u16(),
                body,
            });
        }

        debug!(%method, url, status = status.as_u16(), "response received");
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let response = self
            .send(Method::GET, url, self.request(Method::GET, url))
            .await?;
        decode_json(url, response).await
    }

    async fn send_draft(
        &self,
        method: Method,
        url: &str,
        draft: &TaskDraft,
    ) -> ApiResult<Option<Task>> {
        let response = self
            .send(method.clone(), url, self.request(method, url).json(draft))
            .await?;
        decode_optional_json(url, response).await
    }

    async fn post_empty(&self, url: &str) -> ApiResult<()> {
        self.send(Method::POST, url, self.request(Method::POST, url))
            .await?;
        Ok(())
    }
}

impl TaskApi for HttpTaskApi {
    #[instrument(skip(self))]
    async fn list_all(&self) -> ApiResult<TaskListBody> {
        self.get_json(&self.endpoint(&["tasks"]))
            .await
            .map(TaskListBody::new)
    }

    #[instrument(skip(self))]
    async fn list_prioritized(&self) -> ApiResult<TaskListBody> {
        self.get_json(&self.endpoint(&["tasks", "prioritized"]))
            .await
            .map(TaskListBody::new)
    }

    #[instrument(skip(self))]
    async fn list_completed(&self) -> ApiResult<TaskListBody> {
        self.get_json(&self.endpoint(&["tasks", "completed"]))
            .await
            .map(TaskListBody::new)
    }

    #[instrument(skip(self, id), fields(id = %id))]
    async fn get(&self, id: &TaskId) -> ApiResult<Task> {
        self.get_json(&self.task_endpoint(id, None)).await
    }

    #[instrument(skip(self, draft), fields(header_len = draft.header.len(), difficulty = draft.difficulty))]
    async fn create(&self, draft: &TaskDraft) -> ApiResult<Option<Task>> {
        self.send_draft(Method::POST, &self.endpoint(&["tasks"]), draft)
            .await
    }

    #[instrument(skip(self, id, draft), fields(id = %id))]
    async fn update(&self, id: &TaskId, draft: &TaskDraft) -> ApiResult<Option<Task>> {
        self.send_draft(Method::PUT, &self.task_endpoint(id, None), draft)
            .await
    }

    #[instrument(skip(self, id), fields(id = %id))]
    async fn delete(&self, id: &TaskId) -> ApiResult<()> {
        let url = self.task_endpoint(id, None);
        self.send(Method::DELETE, &url, self.request(Method::DELETE, &url))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, id), fields(id = %id))]
    async fn complete(&self, id: &TaskId) -> ApiResult<()> {
        self.post_empty(&self.task_endpoint(id, Some("complete"))).await
    }

    #[instrument(skip(self, id), fields(id = %id))]
    async fn uncomplete(&self, id: &TaskId) -> ApiResult<()> {
        self.post_empty(&self.task_endpoint(id, Some("uncomplete")))
            .await
    }

    #[instrument(skip(self))]
    async fn health(&self) -> ApiResult<HealthStatus> {
        self.get_json(&self.health_url).await
    }
}

async fn read_body(url: &str, response: Response) -> ApiResult<String> {
    response.text().await.map_err(|err| {
        error!(url, error = %err, "failed reading response body");
        ApiError::Transport(err.to_string())
    })
}

async fn decode_json<T: DeserializeOwned>(url: &str, response: Response) -> ApiResult<T> {
    let body = read_body(url, response).await?;
    serde_json::from_str(&body).map_err(|err| {
        error!(url, error = %err, body = %body, "response payload did not decode");
        ApiError::MalformedResponse(err.to_string())
    })
}

async fn decode_optional_json<T: DeserializeOwned>(
    url: &str,
    response: Response,
) -> ApiResult<Option<T>> {
    let body = read_body(url, response).await?;
    if body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&body).map(Some).map_err(|err| {
        error!(url, error = %err, body = %body, "response payload did not decode");
        ApiError::MalformedResponse(err.to_string())
    })
}
