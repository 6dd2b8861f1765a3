use std::rc::Rc;

use gloo::events::EventListener;
use taskdeck_client::{
  PreferenceStore,
  SystemScheme,
  ThemeSnapshot
};
use taskdeck_shared::EffectiveTheme;
use web_sys::MediaQueryList;

const DARK_SCHEME_QUERY: &str =
  "(prefers-color-scheme: dark)";

fn local_storage()
-> Option<web_sys::Storage> {
  web_sys::window().and_then(|window| {
    window
      .local_storage()
      .ok()
      .flatten()
  })
}

/// `window.localStorage`; a missing or
/// blocked storage reads as empty and
/// drops writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageStore;

impl PreferenceStore
  for LocalStorageStore
{
  fn load(
    &self,
    key: &str
  ) -> Option<String> {
    local_storage().and_then(|storage| {
      storage
        .get_item(key)
        .ok()
        .flatten()
    })
  }

  fn store(
    &self,
    key: &str,
    value: &str
  ) {
    match local_storage() {
      | Some(storage) => {
        if let Err(err) =
          storage.set_item(key, value)
        {
          tracing::warn!(key, error = ?err, "failed to persist preference");
        }
      }
      | None => {
        tracing::warn!(
          key,
          "local storage unavailable"
        );
      }
    }
  }
}

/// The `prefers-color-scheme` media
/// query.
#[derive(Clone, Default)]
pub struct MediaQueryScheme {
  query: Option<MediaQueryList>
}

impl MediaQueryScheme {
  pub fn new() -> Self {
    let query =
      web_sys::window().and_then(
        |window| {
          window
            .match_media(
              DARK_SCHEME_QUERY
            )
            .ok()
            .flatten()
        }
      );
    if query.is_none() {
      tracing::warn!(
        "matchMedia unavailable; \
         assuming light system scheme"
      );
    }
    Self {
      query
    }
  }
}

/// Dropping it removes the `change`
/// listener.
pub struct MediaQuerySubscription {
  _listener: Option<EventListener>
}

impl SystemScheme
  for MediaQueryScheme
{
  type Subscription =
    MediaQuerySubscription;

  fn current(&self) -> EffectiveTheme {
    EffectiveTheme::from_prefers_dark(
      self
        .query
        .as_ref()
        .is_some_and(|query| {
          query.matches()
        })
    )
  }

  fn subscribe(
    &self,
    on_change: Rc<
      dyn Fn(EffectiveTheme)
    >
  ) -> MediaQuerySubscription {
    let listener =
      self.query.as_ref().map(|query| {
        let watched = query.clone();
        EventListener::new(
          query,
          "change",
          move |_event| {
            let theme = EffectiveTheme::from_prefers_dark(
              watched.matches()
            );
            tracing::debug!(%theme, "system color scheme changed");
            on_change(theme);
          }
        )
      });

    MediaQuerySubscription {
      _listener: listener
    }
  }
}

/// Reflects the effective theme on the
/// document root, where the style
/// sheet picks it up.
pub fn apply_theme(
  snapshot: ThemeSnapshot
) {
  let root = web_sys::window()
    .and_then(|window| {
      window.document()
    })
    .and_then(|document| {
      document.document_element()
    });

  let Some(root) = root else {
    tracing::warn!(
      "no document root to theme"
    );
    return;
  };

  for (name, value) in [
    (
      "data-theme",
      snapshot.effective.as_str()
    ),
    (
      "data-theme-preference",
      snapshot.preference.as_str()
    )
  ] {
    if let Err(err) =
      root.set_attribute(name, value)
    {
      tracing::warn!(attribute = name, error = ?err, "failed to apply theme");
    }
  }
}
