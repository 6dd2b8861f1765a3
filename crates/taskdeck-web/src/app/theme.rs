use taskdeck_client::theme::load_preference;
use taskdeck_client::{
  SystemScheme,
  ThemeResolver,
  ThemeSnapshot
};
use taskdeck_shared::{
  ThemePreference,
  resolve_theme
};
use yew::{
  Callback,
  ContextProvider,
  Html,
  Properties,
  function_component,
  hook,
  html,
  use_callback,
  use_context,
  use_effect_with,
  use_mut_ref,
  use_state
};

use super::storage::{
  LocalStorageStore,
  MediaQueryScheme,
  apply_theme
};

type BrowserResolver = ThemeResolver<
  LocalStorageStore,
  MediaQueryScheme
>;

/// What the provider hands to every
/// component below it.
#[derive(Clone, PartialEq)]
pub struct ThemeContext {
  pub snapshot:       ThemeSnapshot,
  pub set_preference:
    Callback<ThemePreference>
}

#[derive(Properties, PartialEq)]
pub struct ThemeProviderProps {
  #[prop_or_default]
  pub children: Html
}

#[function_component(ThemeProvider)]
pub fn theme_provider(
  props: &ThemeProviderProps
) -> Html {
  let snapshot = use_state(|| {
    let preference =
      load_preference(&LocalStorageStore);
    let system =
      MediaQueryScheme::new().current();
    ThemeSnapshot {
      preference,
      effective: resolve_theme(
        preference, system
      )
    }
  });
  let resolver = use_mut_ref(|| {
    None::<BrowserResolver>
  });

  {
    let snapshot = snapshot.setter();
    let resolver = resolver.clone();
    use_effect_with((), move |_| {
      *resolver.borrow_mut() =
        Some(ThemeResolver::new(
          LocalStorageStore,
          MediaQueryScheme::new(),
          move |next| {
            apply_theme(next);
            snapshot.set(next);
          }
        ));
      tracing::debug!(
        "theme resolver mounted"
      );

      move || {
        resolver.borrow_mut().take();
        tracing::debug!(
          "theme resolver released"
        );
      }
    });
  }

  let set_preference = {
    let resolver = resolver.clone();
    use_callback(
      (),
      move |preference: ThemePreference,
            _| {
        match resolver
          .borrow_mut()
          .as_mut()
        {
          | Some(resolver) => {
            resolver
              .set_preference(preference)
          }
          | None => {
            tracing::warn!(%preference, "theme resolver not mounted")
          }
        }
      }
    )
  };

  let context = ThemeContext {
    snapshot: *snapshot,
    set_preference
  };

  html! {
      <ContextProvider<ThemeContext> context={context}>
          { props.children.clone() }
      </ContextProvider<ThemeContext>>
  }
}

#[hook]
pub fn use_theme() -> Option<ThemeContext>
{
  use_context::<ThemeContext>()
}
