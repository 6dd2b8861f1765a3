pub mod cli;
pub mod commands;
pub mod config;
pub mod prefs;
pub mod render;
pub mod terminal;

use std::ffi::OsString;
use std::io;

use anyhow::Context;
use clap::Parser;
use taskdeck_client::{
  HttpTaskApi,
  ThemeResolver
};
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting taskdeck CLI"
  );
  debug!(?pre.rc_overrides, "preprocessed rc overrides");

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  );

  let data_dir =
    config::resolve_data_dir(
      &cfg,
      cli.data.as_deref()
    )
    .context(
      "failed to resolve data \
       directory"
    )?;

  let prefs =
    prefs::PreferenceFile::open(
      &data_dir
    )
    .with_context(|| {
      format!(
        "failed to open preferences \
         at {}",
        data_dir.display()
      )
    })?;

  let renderer =
    render::Renderer::new(&cfg)?;
  let theme_cell =
    renderer.theme_handle();
  let scheme =
    terminal::system_scheme(&cfg)?;
  let theme = ThemeResolver::new(
    prefs,
    scheme,
    move |snapshot| {
      debug!(
        preference = %snapshot.preference,
        effective = %snapshot.effective,
        "applying terminal theme"
      );
      theme_cell.set(snapshot.effective);
    }
  );

  let api_url = cfg.api_url();
  let api = HttpTaskApi::new(&api_url)
    .with_context(|| {
      format!(
        "invalid api.url: {api_url}"
      )
    })?;
  info!(api = %api.base_url(), "using task service");

  let runtime =
    tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .context(
        "failed to start async \
         runtime"
      )?;

  let mut session =
    commands::Session::new(
      api, theme, renderer
    );
  let command =
    cli.command.unwrap_or_default();
  let mut out = io::stdout().lock();

  runtime.block_on(
    commands::dispatch(
      &mut session,
      command,
      &mut out
    )
  )?;

  info!("done");
  Ok(())
}
