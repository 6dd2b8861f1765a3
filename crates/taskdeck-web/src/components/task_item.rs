use taskdeck_shared::{
  Task,
  TaskId
};
use yew::{
  Callback,
  Html,
  Properties,
  classes,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct TaskItemProps {
  pub task:      Task,
  pub on_toggle: Callback<Task>,
  pub on_delete: Callback<TaskId>
}

#[function_component(TaskItem)]
pub fn task_item(
  props: &TaskItemProps
) -> Html {
  let task = &props.task;
  let on_toggle = {
    let on_toggle =
      props.on_toggle.clone();
    let task = task.clone();
    move |_| on_toggle.emit(task.clone())
  };
  let on_delete = {
    let on_delete =
      props.on_delete.clone();
    let id = task.id.clone();
    move |_| on_delete.emit(id.clone())
  };

  let toggle_label = if task.completed {
    "Undo"
  } else {
    "Complete"
  };

  html! {
      <div class={classes!("task-item", task.completed.then_some("completed"))}>
          <div class="task-body">
              <h3 class="task-header">{ &task.header }</h3>
              <p class="task-description">{ &task.description }</p>
              <div class="task-meta">
                  <span>{ format!("Difficulty: {} | ", task.difficulty) }</span>
                  {
                      match task.due_date.as_deref() {
                          | Some(due) => html! { <span>{ format!("Due: {due}") }</span> },
                          | None => html! {}
                      }
                  }
              </div>
          </div>
          <div class="task-actions">
              <button
                  class={classes!("btn", if task.completed { "secondary" } else { "success" })}
                  onclick={on_toggle}
              >
                  { toggle_label }
              </button>
              <button class="btn danger" onclick={on_delete}>{ "Delete" }</button>
          </div>
      </div>
  }
}
