use std::ops::Deref;
use std::rc::Rc;

use taskdeck_client::HttpTaskApi;

/// Shared handle to the task service
/// client, compared by identity so it
/// can travel through props and
/// context.
#[derive(Clone)]
pub struct ApiHandle(Rc<HttpTaskApi>);

impl PartialEq for ApiHandle {
  fn eq(
    &self,
    other: &Self
  ) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }
}

impl Deref for ApiHandle {
  type Target = HttpTaskApi;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

/// The service is reached through the
/// page's own origin: `<origin>/api`,
/// with health at `<origin>/health`.
pub fn connect()
-> Result<ApiHandle, String> {
  let origin = web_sys::window()
    .ok_or_else(|| {
      "no window available".to_string()
    })?
    .location()
    .origin()
    .map_err(|err| {
      format!(
        "cannot read page origin: \
         {err:?}"
      )
    })?;

  let base = format!("{origin}/api");
  let api = HttpTaskApi::new(&base)
    .map_err(|err| {
      format!(
        "invalid api base {base}: {err}"
      )
    })?;

  tracing::info!(
    api = %api.base_url(),
    health = %api.health_url(),
    "task service client ready"
  );
  Ok(ApiHandle(Rc::new(api)))
}
