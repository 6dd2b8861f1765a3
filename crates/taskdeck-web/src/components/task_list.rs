use taskdeck_client::task_list::EMPTY_LIST_MESSAGE;
use taskdeck_shared::ViewFilter;
use yew::{
  Html,
  Properties,
  classes,
  function_component,
  html
};

use super::TaskItem;
use crate::app::TaskListHandle;

#[derive(Properties, PartialEq)]
pub struct TaskListViewProps {
  pub list: TaskListHandle
}

#[function_component(TaskListView)]
pub fn task_list_view(
  props: &TaskListViewProps
) -> Html {
  let state = &props.list.state;
  let active = state.filter();

  let view_button = |filter: ViewFilter| {
    let select =
      props.list.select_filter.clone();
    html! {
        <button
            class={classes!("btn", "view", (filter == active).then_some("active"))}
            onclick={move |_| select.emit(filter)}
        >
            { filter.label() }
        </button>
    }
  };

  let body = if state.is_loading()
    && state.tasks().is_empty()
  {
    html! { <div class="list-note">{ "Loading tasks..." }</div> }
  } else if state.tasks().is_empty()
    && state.error().is_none()
  {
    html! { <div class="list-note">{ EMPTY_LIST_MESSAGE }</div> }
  } else {
    html! {
        <div class="task-items">
            {
                for state.tasks().iter().cloned().map(|task| html! {
                    <TaskItem
                        key={task.id.to_string()}
                        task={task}
                        on_toggle={props.list.toggle.clone()}
                        on_delete={props.list.delete.clone()}
                    />
                })
            }
        </div>
    }
  };

  html! {
      <section class={classes!("task-list", state.is_loading().then_some("loading"))}>
          <div class="list-header">
              <h2>{ state.heading() }</h2>
              <div class="view-switcher">
                  { for ViewFilter::ALL.into_iter().map(view_button) }
              </div>
          </div>
          {
              match state.error() {
                  | Some(error) => html! { <div class="error">{ error }</div> },
                  | None => html! {}
              }
          }
          { body }
      </section>
  }
}
