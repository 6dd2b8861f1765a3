use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser, Subcommand};
use taskdeck_shared::{DEFAULT_DIFFICULTY, TaskId, ThemePreference, ViewFilter};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct PreprocessedArgs {
    pub cleaned_args: Vec<OsString>,
    pub rc_overrides: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "taskdeck",
    version,
    about = "Taskdeck: terminal client for the task service",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    #[arg(long = "data")]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show tasks for one view (the default command).
    List {
        #[arg(long, default_value = "all")]
        view: ViewFilter,
    },
    /// Create a task.
    Add {
        header: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value_t = DEFAULT_DIFFICULTY)]
        difficulty: i64,
        #[arg(long = "due", default_value = "")]
        due_date: String,
    },
    Info {
        id: TaskId,
    },
    /// Change fields of an existing task; omitted fields keep their value.
    Edit {
        id: TaskId,
        #[arg(long)]
        header: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        difficulty: Option<i64>,
        #[arg(long = "due")]
        due_date: Option<String>,
    },
    Done {
        id: TaskId,
    },
    Undo {
        id: TaskId,
    },
    Delete {
        id: TaskId,
    },
    /// Probe the task service.
    Health,
    /// Print the theme, or set the preference when one is given.
    Theme {
        preference: Option<ThemePreference>,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::List {
            view: ViewFilter::All,
        }
    }
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

/// Pulls positional `rc.key=value` / `rc.key:value` tokens out of the
/// argument list so clap never sees them.
#[tracing::instrument(skip_all)]
pub fn preprocess_args(raw: &[OsString]) -> anyhow::Result<PreprocessedArgs> {
    let mut cleaned = Vec::with_capacity(raw.len());
    let mut overrides: Vec<(String, String)> = Vec::new();

    let mut iter = raw.iter().cloned();
    if let Some(bin) = iter.next() {
        cleaned.push(bin);
    }

    for arg in iter {
        let s = arg.to_string_lossy();
        if let Some(rest) = s.strip_prefix("rc.") {
            let parsed = rest.split_once('=').or_else(|| rest.split_once(':'));

            if let Some((k, v)) = parsed {
                if k.trim().is_empty() {
                    return Err(anyhow!("empty key in override: {s}"));
                }
                debug!(key = %k, value = %v, "captured positional rc override");
                overrides.push((format!("rc.{}", k.trim()), v.trim().to_string()));
                continue;
            }
        }

        cleaned.push(arg);
    }

    Ok(PreprocessedArgs {
        cleaned_args: cleaned,
        rc_overrides: overrides,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(tokens: &[&str]) -> Vec<OsString> {
        tokens.iter().map(OsString::from).collect()
    }

    #[test]
    fn positional_overrides_are_extracted() {
        let pre = preprocess_args(&args(&[
            "taskdeck",
            "rc.color=off",
            "list",
            "rc.api.url:http://h/api",
        ]))
        .expect("preprocess");

        assert_eq!(pre.cleaned_args, args(&["taskdeck", "list"]));
        assert_eq!(
            pre.rc_overrides,
            vec![
                ("rc.color".to_string(), "off".to_string()),
                ("rc.api.url".to_string(), "http://h/api".to_string()),
            ]
        );
    }

    #[test]
    fn subcommands_parse_typed_arguments() {
        let cli = GlobalCli::try_parse_from(["taskdeck", "-vv", "list", "--view", "completed"])
            .expect("parse list");
        assert_eq!(cli.verbose, 2);
        assert_eq!(
            cli.command,
            Some(Command::List {
                view: ViewFilter::Completed
            })
        );

        let cli = GlobalCli::try_parse_from(["taskdeck", "add", "Buy milk", "--difficulty", "2"])
            .expect("parse add");
        assert_eq!(
            cli.command,
            Some(Command::Add {
                header: "Buy milk".to_string(),
                description: String::new(),
                difficulty: 2,
                due_date: String::new(),
            })
        );

        assert!(GlobalCli::try_parse_from(["taskdeck", "theme", "sepia"]).is_err());
        assert!(GlobalCli::try_parse_from(["taskdeck", "list", "--view", "later"]).is_err());
    }
}
