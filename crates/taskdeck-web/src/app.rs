mod list;
mod storage;
mod theme;

use taskdeck_client::{
  ApiHealth,
  check_health
};
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html,
  use_effect_with,
  use_state
};

pub use self::list::{
  TaskListHandle,
  use_task_list
};
pub use self::theme::{
  ThemeProvider,
  use_theme
};
use crate::api::{
  self,
  ApiHandle
};
use crate::components::{
  ApiStatus,
  TaskFormPanel,
  TaskListView,
  ThemeToggle
};

#[function_component(App)]
pub fn app() -> Html {
  let api = use_state(api::connect);

  let body = match &*api {
    | Ok(api) => {
      html! { <Workspace api={api.clone()} /> }
    }
    | Err(err) => {
      tracing::error!(error = %err, "cannot reach task service");
      html! {
          <div class="api-status failed">
              { ApiHealth::Failed(err.clone()).message() }
          </div>
      }
    }
  };

  html! {
      <ThemeProvider>
          <div class="app">
              <header class="app-header">
                  <h1>{ "Todo List App" }</h1>
                  <p class="subtitle">{ "Manage your tasks efficiently" }</p>
                  <ThemeToggle />
              </header>
              { body }
          </div>
      </ThemeProvider>
  }
}

#[derive(Properties, PartialEq)]
struct WorkspaceProps {
  api: ApiHandle
}

#[function_component(Workspace)]
fn workspace(
  props: &WorkspaceProps
) -> Html {
  let health =
    use_state(ApiHealth::default);
  let list =
    use_task_list(props.api.clone());

  let check = {
    let api = props.api.clone();
    let health = health.clone();
    Callback::from(move |()| {
      let api = api.clone();
      let health = health.clone();
      health.set(ApiHealth::Checking);
      wasm_bindgen_futures::spawn_local(
        async move {
          health.set(
            check_health(&*api).await
          );
        }
      );
    })
  };

  {
    let check = check.clone();
    use_effect_with((), move |_| {
      check.emit(());
      || ()
    });
  }

  html! {
      <>
          <ApiStatus health={(*health).clone()} on_retry={check} />
          <main>
              <TaskFormPanel api={props.api.clone()} on_added={list.notify_changed.clone()} />
              <TaskListView list={list} />
          </main>
      </>
  }
}
