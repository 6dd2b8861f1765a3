use std::str::FromStr;

use taskdeck_shared::ThemePreference;
use yew::{
  Html,
  TargetCast,
  function_component,
  html
};

use crate::app::use_theme;

#[function_component(ThemeToggle)]
pub fn theme_toggle() -> Html {
  let Some(theme) = use_theme() else {
    tracing::warn!(
      "theme toggle rendered outside \
       ThemeProvider"
    );
    return html! {};
  };

  let current = theme.snapshot.preference;
  let set_preference =
    theme.set_preference.clone();
  let on_change =
    move |e: web_sys::Event| {
      let select: web_sys::HtmlSelectElement =
        e.target_unchecked_into();
      match ThemePreference::from_str(
        &select.value()
      ) {
        | Ok(preference) => {
          set_preference.emit(preference)
        }
        | Err(err) => {
          tracing::warn!(error = %err, "ignoring theme selection")
        }
      }
    };

  html! {
      <div class="theme-toggle">
          <label for="theme-select">{ "Theme:" }</label>
          <select id="theme-select" onchange={on_change}>
              {
                  for ThemePreference::ALL.into_iter().map(|preference| html! {
                      <option
                          value={preference.as_str()}
                          selected={preference == current}
                      >
                          { preference.label() }
                      </option>
                  })
              }
          </select>
          <span class="theme-effective">{ theme.snapshot.effective.as_str() }</span>
      </div>
  }
}
