use std::cell::RefCell;
use std::rc::Rc;

use taskdeck_client::{
  FetchTicket,
  TaskApi,
  TaskListState
};
use taskdeck_shared::{
  Task,
  TaskId,
  ViewFilter
};
use yew::{
  Callback,
  hook,
  use_effect_with,
  use_force_update,
  use_mut_ref
};

use crate::api::ApiHandle;

/// Rendered view of the list state plus
/// the actions that change it.
#[derive(Clone, PartialEq)]
pub struct TaskListHandle {
  pub state:          TaskListState,
  pub select_filter:  Callback<ViewFilter>,
  pub notify_changed: Callback<()>,
  pub toggle:         Callback<Task>,
  pub delete:         Callback<TaskId>
}

enum Trigger {
  Select(ViewFilter),
  Changed
}

fn start_fetch(
  api: ApiHandle,
  state: Rc<RefCell<TaskListState>>,
  rerender: Callback<()>,
  trigger: Trigger
) {
  let ticket: FetchTicket = {
    let mut state = state.borrow_mut();
    match trigger {
      | Trigger::Select(filter) => {
        state.set_filter(filter)
      }
      | Trigger::Changed => {
        state.notify_changed()
      }
    }
  };
  rerender.emit(());

  wasm_bindgen_futures::spawn_local(
    async move {
      tracing::info!(token = ticket.token, filter = %ticket.filter, "refreshing task list");
      let result =
        api.list(ticket.filter).await;
      state
        .borrow_mut()
        .apply(ticket, result);
      rerender.emit(());
    }
  );
}

#[hook]
pub fn use_task_list(
  api: ApiHandle
) -> TaskListHandle {
  let state =
    use_mut_ref(TaskListState::new);
  let force_update = use_force_update();
  let rerender = Callback::from(
    move |()| force_update.force_update()
  );

  let select_filter = {
    let api = api.clone();
    let state = state.clone();
    let rerender = rerender.clone();
    Callback::from(
      move |filter: ViewFilter| {
        start_fetch(
          api.clone(),
          state.clone(),
          rerender.clone(),
          Trigger::Select(filter)
        )
      }
    )
  };

  let notify_changed = {
    let api = api.clone();
    let state = state.clone();
    let rerender = rerender.clone();
    Callback::from(move |()| {
      start_fetch(
        api.clone(),
        state.clone(),
        rerender.clone(),
        Trigger::Changed
      )
    })
  };

  {
    let select_filter =
      select_filter.clone();
    use_effect_with((), move |_| {
      select_filter
        .emit(ViewFilter::default());
      || ()
    });
  }

  let toggle = {
    let api = api.clone();
    let state = state.clone();
    let rerender = rerender.clone();
    let notify_changed =
      notify_changed.clone();
    Callback::from(move |task: Task| {
      let api = api.clone();
      let state = state.clone();
      let rerender = rerender.clone();
      let notify_changed =
        notify_changed.clone();
      wasm_bindgen_futures::spawn_local(
        async move {
          let result = if task.completed
          {
            api.uncomplete(&task.id).await
          } else {
            api.complete(&task.id).await
          };
          match result {
            | Ok(()) => {
              notify_changed.emit(())
            }
            | Err(err) => {
              state
                .borrow_mut()
                .report_action_failure(
                  "update", &err
                );
              rerender.emit(());
            }
          }
        }
      );
    })
  };

  let delete = {
    let state = state.clone();
    let rerender = rerender.clone();
    let notify_changed =
      notify_changed.clone();
    Callback::from(move |id: TaskId| {
      let api = api.clone();
      let state = state.clone();
      let rerender = rerender.clone();
      let notify_changed =
        notify_changed.clone();
      wasm_bindgen_futures::spawn_local(
        async move {
          match api.delete(&id).await {
            | Ok(()) => {
              notify_changed.emit(())
            }
            | Err(err) => {
              state
                .borrow_mut()
                .report_action_failure(
                  "delete", &err
                );
              rerender.emit(());
            }
          }
        }
      );
    })
  };

  TaskListHandle {
    state: state.borrow().clone(),
    select_filter,
    notify_changed,
    toggle,
    delete
  }
}
