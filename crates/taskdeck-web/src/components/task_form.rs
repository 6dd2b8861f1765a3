use std::cell::RefCell;
use std::rc::Rc;

use taskdeck_client::{
  TaskApi,
  TaskForm
};
use yew::{
  Callback,
  Html,
  Properties,
  TargetCast,
  function_component,
  html,
  use_force_update,
  use_mut_ref
};

use crate::api::ApiHandle;

#[derive(Properties, PartialEq)]
pub struct TaskFormPanelProps {
  pub api:      ApiHandle,
  pub on_added: Callback<()>
}

#[function_component(TaskFormPanel)]
pub fn task_form_panel(
  props: &TaskFormPanelProps
) -> Html {
  let form = use_mut_ref(TaskForm::new);
  let force_update = use_force_update();

  let edit = |apply: fn(
    &mut TaskForm,
    String
  )| {
    let form = form.clone();
    let force_update =
      force_update.clone();
    Callback::from(
      move |value: String| {
        apply(
          &mut form.borrow_mut(),
          value
        );
        force_update.force_update();
      }
    )
  };

  let set_header = edit(|form, value| {
    form.set_header(value)
  });
  let set_description =
    edit(|form, value| {
      form.set_description(value)
    });
  let set_difficulty =
    edit(|form, value| {
      form.set_difficulty_input(&value)
    });
  let set_due_date = edit(|form, value| {
    form.set_due_date(value)
  });

  let on_submit = {
    let form = form.clone();
    let force_update =
      force_update.clone();
    let api = props.api.clone();
    let on_added =
      props.on_added.clone();
    move |e: web_sys::SubmitEvent| {
      e.prevent_default();
      submit(
        form.clone(),
        api.clone(),
        on_added.clone(),
        force_update.clone()
      );
    }
  };

  let view = form.borrow().clone();
  let draft = view.draft();

  html! {
      <div class="task-form">
          <h2>{ "Add New Task" }</h2>
          {
              match view.error() {
                  | Some(error) => html! { <div class="error">{ error }</div> },
                  | None => html! {}
              }
          }
          <form onsubmit={on_submit}>
              <div class="field">
                  <label for="header">{ "Task Title *" }</label>
                  <input
                      id="header"
                      type="text"
                      value={draft.header.clone()}
                      oninput={move |e: web_sys::InputEvent| {
                          let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                          set_header.emit(input.value());
                      }}
                  />
              </div>
              <div class="field">
                  <label for="description">{ "Description" }</label>
                  <textarea
                      id="description"
                      rows="3"
                      value={draft.description.clone()}
                      oninput={move |e: web_sys::InputEvent| {
                          let input: web_sys::HtmlTextAreaElement = e.target_unchecked_into();
                          set_description.emit(input.value());
                      }}
                  />
              </div>
              <div class="field-row">
                  <div class="field">
                      <label for="difficulty">{ "Difficulty (1-5)" }</label>
                      <input
                          id="difficulty"
                          type="number"
                          min="1"
                          max="5"
                          value={view.difficulty_input()}
                          oninput={move |e: web_sys::InputEvent| {
                              let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                              set_difficulty.emit(input.value());
                          }}
                      />
                  </div>
                  <div class="field">
                      <label for="dueDate">{ "Due Date" }</label>
                      <input
                          id="dueDate"
                          type="date"
                          value={draft.due_date.clone()}
                          oninput={move |e: web_sys::InputEvent| {
                              let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                              set_due_date.emit(input.value());
                          }}
                      />
                  </div>
              </div>
              <button class="btn primary" type="submit" disabled={view.is_submitting()}>
                  { if view.is_submitting() { "Adding..." } else { "Add Task" } }
              </button>
          </form>
      </div>
  }
}

fn submit(
  form: Rc<RefCell<TaskForm>>,
  api: ApiHandle,
  on_added: Callback<()>,
  force_update: yew::functional::UseForceUpdateHandle
) {
  let draft =
    form.borrow_mut().begin_submit();
  force_update.force_update();
  let Ok(draft) = draft else {
    return;
  };

  wasm_bindgen_futures::spawn_local(
    async move {
      let result =
        api.create(&draft).await;
      let outcome = form
        .borrow_mut()
        .finish_submit(result);
      if outcome.is_ok() {
        on_added.emit(());
      }
      force_update.force_update();
    }
  );
}
