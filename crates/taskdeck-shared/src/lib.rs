use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{
  Deserialize,
  Deserializer,
  Serialize
};
use thiserror::Error;

pub const THEME_STORAGE_KEY: &str =
  "taskdeck.theme";

pub const DIFFICULTY_RANGE:
  RangeInclusive<i64> = 1..=5;

pub const DEFAULT_DIFFICULTY: i64 = 3;

/// Identifier assigned by the task
/// service. Numeric on the reference
/// backend, but treated as opaque.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
)]
#[serde(untagged)]
pub enum TaskId {
  Number(u64),
  Text(String)
}

impl fmt::Display for TaskId {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    match self {
      | Self::Number(value) => {
        write!(f, "{value}")
      }
      | Self::Text(value) => {
        f.write_str(value)
      }
    }
  }
}

impl FromStr for TaskId {
  type Err = std::convert::Infallible;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    let trimmed = s.trim();
    Ok(match trimmed.parse::<u64>() {
      | Ok(value) => Self::Number(value),
      | Err(_) => {
        Self::Text(trimmed.to_string())
      }
    })
  }
}

impl From<u64> for TaskId {
  fn from(value: u64) -> Self {
    Self::Number(value)
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct Task {
  pub id:          TaskId,
  #[serde(default)]
  pub header:      String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub difficulty:  i64,
  #[serde(
    rename = "dueDate",
    default,
    deserialize_with = "blank_as_none",
    skip_serializing_if = "Option::is_none"
  )]
  pub due_date:    Option<String>,
  #[serde(default)]
  pub completed:   bool
}

fn blank_as_none<'de, D>(
  deserializer: D
) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>
{
  let raw =
    Option::<String>::deserialize(
      deserializer
    )?;
  Ok(raw.filter(|value| {
    !value.trim().is_empty()
  }))
}

/// In-progress field values for a task
/// that has not been saved yet.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
  pub header:      String,
  pub description: String,
  pub difficulty:  i64,
  pub due_date:    String
}

impl Default for TaskDraft {
  fn default() -> Self {
    Self {
      header:      String::new(),
      description: String::new(),
      difficulty:  DEFAULT_DIFFICULTY,
      due_date:    String::new()
    }
  }
}

impl TaskDraft {
  pub fn from_task(task: &Task) -> Self {
    Self {
      header:      task.header.clone(),
      description: task
        .description
        .clone(),
      difficulty:  task.difficulty,
      due_date:    task
        .due_date
        .clone()
        .unwrap_or_default()
    }
  }

  /// Checks run in order; the first
  /// failure is reported.
  pub fn validate(
    &self
  ) -> Result<(), DraftError> {
    if self.header.is_empty() {
      return Err(
        DraftError::MissingHeader
      );
    }

    if !DIFFICULTY_RANGE
      .contains(&self.difficulty)
    {
      return Err(
        DraftError::DifficultyOutOfRange(
          self.difficulty
        )
      );
    }

    Ok(())
  }
}

#[derive(
  Debug, Clone, PartialEq, Eq, Error,
)]
pub enum DraftError {
  #[error("Task title is required")]
  MissingHeader,
  #[error(
    "Difficulty must be between 1 and 5"
  )]
  DifficultyOutOfRange(i64),
  /// Difficulty text that is not an
  /// integer, blank included.
  #[error(
    "Difficulty must be between 1 and 5"
  )]
  InvalidDifficulty(String)
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct HealthStatus {
  pub status:    String,
  #[serde(default)]
  pub timestamp: Option<i64>
}

impl HealthStatus {
  pub fn is_ok(&self) -> bool {
    self.status == "ok"
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
  Light,
  Dark,
  #[default]
  System
}

impl ThemePreference {
  pub const ALL: [Self; 3] = [
    Self::Light,
    Self::Dark,
    Self::System
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      | Self::Light => "light",
      | Self::Dark => "dark",
      | Self::System => "system"
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | Self::Light => "Light",
      | Self::Dark => "Dark",
      | Self::System => "System"
    }
  }
}

impl fmt::Display for ThemePreference {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(
  Debug, Clone, PartialEq, Eq, Error,
)]
#[error("unknown theme preference: {0}")]
pub struct UnknownThemePreference(
  pub String
);

impl FromStr for ThemePreference {
  type Err = UnknownThemePreference;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "light" => Ok(Self::Light),
      | "dark" => Ok(Self::Dark),
      | "system" => Ok(Self::System),
      | _ => {
        Err(UnknownThemePreference(
          s.to_string()
        ))
      }
    }
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveTheme {
  #[default]
  Light,
  Dark
}

impl EffectiveTheme {
  pub fn from_prefers_dark(
    prefers_dark: bool
  ) -> Self {
    if prefers_dark {
      Self::Dark
    } else {
      Self::Light
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      | Self::Light => "light",
      | Self::Dark => "dark"
    }
  }
}

impl fmt::Display for EffectiveTheme {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// `system` follows the OS signal;
/// explicit choices ignore it.
pub fn resolve_theme(
  preference: ThemePreference,
  system: EffectiveTheme
) -> EffectiveTheme {
  match preference {
    | ThemePreference::Light => {
      EffectiveTheme::Light
    }
    | ThemePreference::Dark => {
      EffectiveTheme::Dark
    }
    | ThemePreference::System => system
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ViewFilter {
  #[default]
  All,
  Prioritized,
  Completed
}

impl ViewFilter {
  pub const ALL: [Self; 3] = [
    Self::All,
    Self::Prioritized,
    Self::Completed
  ];

  pub fn as_key(self) -> &'static str {
    match self {
      | Self::All => "all",
      | Self::Prioritized => {
        "prioritized"
      }
      | Self::Completed => "completed"
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | Self::All => "All",
      | Self::Prioritized => {
        "Prioritized"
      }
      | Self::Completed => "Completed"
    }
  }

  pub fn heading(
    self
  ) -> &'static str {
    match self {
      | Self::All => "All Tasks",
      | Self::Prioritized => {
        "Prioritized Tasks"
      }
      | Self::Completed => {
        "Completed Tasks"
      }
    }
  }
}

impl fmt::Display for ViewFilter {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_key())
  }
}

#[derive(
  Debug, Clone, PartialEq, Eq, Error,
)]
#[error("unknown view filter: {0}")]
pub struct UnknownViewFilter(
  pub String
);

impl FromStr for ViewFilter {
  type Err = UnknownViewFilter;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|filter| {
        filter
          .as_key()
          .eq_ignore_ascii_case(s.trim())
      })
      .ok_or_else(|| {
        UnknownViewFilter(s.to_string())
      })
  }
}
