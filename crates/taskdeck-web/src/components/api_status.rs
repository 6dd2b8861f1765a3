use taskdeck_client::ApiHealth;
use yew::{
  Callback,
  Html,
  Properties,
  classes,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct ApiStatusProps {
  pub health:   ApiHealth,
  pub on_retry: Callback<()>
}

#[function_component(ApiStatus)]
pub fn api_status(
  props: &ApiStatusProps
) -> Html {
  let state_class = match props.health {
    | ApiHealth::Checking => "checking",
    | ApiHealth::Connected => {
      "connected"
    }
    | ApiHealth::Unexpected
    | ApiHealth::Failed(_) => "failed"
  };
  let on_retry = props.on_retry.clone();

  html! {
      <div class={classes!("api-status", state_class)} role="status">
          { props.health.message() }
          {
              if props.health.can_retry() {
                  html! {
                      <button class="btn retry" onclick={move |_| on_retry.emit(())}>
                          { "Retry" }
                      </button>
                  }
              } else {
                  html! {}
              }
          }
      </div>
  }
}
