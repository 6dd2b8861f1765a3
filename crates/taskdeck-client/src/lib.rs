//! Client-side logic for the taskdeck task service: the HTTP API client and
//! the controllers behind every presentation layer. Nothing here touches a
//! DOM or a terminal; presentation crates drive these types and render their
//! state.

pub mod api;
pub mod error;
pub mod health;
pub mod task_form;
pub mod task_list;
pub mod theme;

pub use api::{HttpTaskApi, TaskApi, TaskListBody};
pub use error::{ApiError, ApiResult, FailureKind, FormError};
pub use health::{ApiHealth, check_health};
pub use task_form::TaskForm;
pub use task_list::{FetchTicket, TaskListController, TaskListState};
pub use theme::{
    ManualScheme, MemoryPreferenceStore, PreferenceStore, SystemScheme, ThemeResolver,
    ThemeSnapshot,
};
