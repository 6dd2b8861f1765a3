use taskdeck_shared::{DraftError, Task, TaskDraft};
use tracing::{debug, error, info, warn};

use crate::api::TaskApi;
use crate::error::{ApiError, FormError};

pub const CREATE_FAILED_MESSAGE: &str = "Failed to create task";

/// Draft fields for a new task plus the visible error and submit flag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskForm {
    draft: TaskDraft,
    /// Last difficulty text that did not parse; blocks submission until
    /// replaced.
    unparsed_difficulty: Option<String>,
    error: Option<String>,
    submitting: bool,
}

impl TaskForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &TaskDraft {
        &self.draft
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn set_header(&mut self, header: impl Into<String>) {
        self.draft.header = header.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.description = description.into();
    }

    pub fn set_difficulty(&mut self, difficulty: i64) {
        self.draft.difficulty = difficulty;
        self.unparsed_difficulty = None;
    }

    /// Text that is not an integer is kept as typed and fails validation on
    /// submit.
    pub fn set_difficulty_input(&mut self, raw: &str) {
        match raw.trim().parse() {
            Ok(difficulty) => self.set_difficulty(difficulty),
            Err(_) => {
                debug!(input = raw, "difficulty input is not a number");
                self.unparsed_difficulty = Some(raw.to_string());
            }
        }
    }

    /// The difficulty as the input field should show it.
    pub fn difficulty_input(&self) -> String {
        match &self.unparsed_difficulty {
            Some(raw) => raw.clone(),
            None => self.draft.difficulty.to_string(),
        }
    }

    pub fn set_due_date(&mut self, due_date: impl Into<String>) {
        self.draft.due_date = due_date.into();
    }

    /// Validates and hands out the draft to send. On a validation failure the
    /// error is recorded and nothing should be sent.
    pub fn begin_submit(&mut self) -> Result<TaskDraft, FormError> {
        if let Err(err) = self.validate() {
            warn!(error = %err, "task draft rejected");
            self.error = Some(err.to_string());
            return Err(err.into());
        }

        self.error = None;
        self.submitting = true;
        Ok(self.draft.clone())
    }

    /// Resets the draft on success; keeps it for correction on failure.
    pub fn finish_submit<T>(&mut self, result: Result<T, ApiError>) -> Result<T, FormError> {
        self.submitting = false;
        match result {
            Ok(value) => {
                info!("task created");
                self.draft = TaskDraft::default();
                self.unparsed_difficulty = None;
                self.error = None;
                Ok(value)
            }
            Err(err) => {
                error!(error = %err, "task creation failed");
                self.error = Some(CREATE_FAILED_MESSAGE.to_string());
                Err(err.into())
            }
        }
    }

    fn validate(&self) -> Result<(), DraftError> {
        match (self.draft.validate(), &self.unparsed_difficulty) {
            (Err(DraftError::MissingHeader), _) => Err(DraftError::MissingHeader),
            (_, Some(raw)) => Err(DraftError::InvalidDifficulty(raw.clone())),
            (result, None) => result,
        }
    }

    /// Runs the whole submission against `api`, invoking `on_added` only
    /// after the service accepted the task.
    pub async fn submit<A, F>(&mut self, api: &A, on_added: F) -> Result<Option<Task>, FormError>
    where
        A: TaskApi,
        F: FnOnce(),
    {
        let draft = self.begin_submit()?;
        let created = self.finish_submit(api.create(&draft).await)?;
        on_added();
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failure_records_message_and_keeps_draft() {
        let mut form = TaskForm::new();
        form.set_description("no title yet");
        form.set_difficulty(9);

        assert_eq!(
            form.begin_submit(),
            Err(FormError::Validation(DraftError::MissingHeader))
        );
        assert_eq!(form.error(), Some("Task title is required"));
        assert!(!form.is_submitting());

        form.set_header("Title");
        assert_eq!(
            form.begin_submit(),
            Err(FormError::Validation(DraftError::DifficultyOutOfRange(9)))
        );
        assert_eq!(form.error(), Some("Difficulty must be between 1 and 5"));
        assert_eq!(form.draft().description, "no title yet");
    }

    #[test]
    fn difficulty_input_parses_integers() {
        let mut form = TaskForm::new();
        form.set_difficulty_input(" 5 ");
        assert_eq!(form.draft().difficulty, 5);
        assert_eq!(form.difficulty_input(), "5");
    }

    #[test]
    fn unparsable_difficulty_blocks_submit() {
        for raw in ["", "five"] {
            let mut form = TaskForm::new();
            form.set_header("Title");
            form.set_difficulty_input(raw);

            assert_eq!(form.difficulty_input(), raw);
            assert_eq!(
                form.begin_submit(),
                Err(FormError::Validation(DraftError::InvalidDifficulty(
                    raw.to_string()
                )))
            );
            assert_eq!(form.error(), Some("Difficulty must be between 1 and 5"));
            assert!(!form.is_submitting());

            form.set_difficulty_input("2");
            assert_eq!(form.begin_submit().map(|draft| draft.difficulty), Ok(2));
        }
    }

    #[test]
    fn missing_header_reported_before_bad_difficulty() {
        let mut form = TaskForm::new();
        form.set_difficulty_input("");
        assert_eq!(
            form.begin_submit(),
            Err(FormError::Validation(DraftError::MissingHeader))
        );
    }

    #[test]
    fn finish_submit_resets_only_on_success() {
        let mut form = TaskForm::new();
        form.set_header("Keep me");
        form.begin_submit().expect("draft is valid");
        assert!(form.is_submitting());

        let failed = form.finish_submit::<()>(Err(ApiError::Service {
            status: 500,
            body: String::new(),
        }));
        assert!(matches!(failed, Err(FormError::Api(_))));
        assert_eq!(form.error(), Some(CREATE_FAILED_MESSAGE));
        assert_eq!(form.draft().header, "Keep me");

        form.begin_submit().expect("draft is valid");
        form.finish_submit(Ok(())).expect("accepted");
        assert_eq!(form.draft(), &TaskDraft::default());
        assert_eq!(form.error(), None);
        assert!(!form.is_submitting());
    }
}
