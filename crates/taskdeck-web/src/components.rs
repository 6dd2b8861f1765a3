mod api_status;
mod task_form;
mod task_item;
mod task_list;
mod theme_toggle;

pub use api_status::ApiStatus;
pub use task_form::TaskFormPanel;
pub use task_item::TaskItem;
pub use task_list::TaskListView;
pub use theme_toggle::ThemeToggle;
