use std::cell::Cell;
use std::io::{self, IsTerminal, Write};
use std::rc::Rc;

use chrono::NaiveDate;
use taskdeck_client::ThemeSnapshot;
use taskdeck_client::task_list::EMPTY_LIST_MESSAGE;
use taskdeck_shared::{EffectiveTheme, Task};
use unicode_width::UnicodeWidthStr;

use crate::config::Config;

const DUE_FORMAT: &str = "%Y-%m-%d";

/// ANSI codes per effective theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Palette {
    heading: &'static str,
    id: &'static str,
    done: &'static str,
    overdue: &'static str,
    muted: &'static str,
}

impl Palette {
    fn for_theme(theme: EffectiveTheme) -> Self {
        match theme {
            EffectiveTheme::Light => Self {
                heading: "1;35",
                id: "34",
                done: "32",
                overdue: "31",
                muted: "90",
            },
            EffectiveTheme::Dark => Self {
                heading: "1;96",
                id: "94",
                done: "92",
                overdue: "91",
                muted: "37",
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    theme: Rc<Cell<EffectiveTheme>>,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color = cfg.get_bool("color")?.unwrap_or(true);
        Ok(Self::with_color(color && io::stdout().is_terminal()))
    }

    pub fn with_color(color: bool) -> Self {
        Self {
            color,
            theme: Rc::new(Cell::new(EffectiveTheme::default())),
        }
    }

    /// Shared cell the theme resolver writes the effective theme into.
    pub fn theme_handle(&self) -> Rc<Cell<EffectiveTheme>> {
        Rc::clone(&self.theme)
    }

    pub fn theme(&self) -> EffectiveTheme {
        self.theme.get()
    }

    #[tracing::instrument(skip(self, out, tasks))]
    pub fn print_task_table<W: Write>(
        &self,
        out: &mut W,
        heading: &str,
        tasks: &[Task],
        today: NaiveDate,
    ) -> anyhow::Result<()> {
        let palette = self.palette();
        writeln!(out, "{}", self.paint(heading, palette.heading))?;

        if tasks.is_empty() {
            writeln!(out, "{}", self.paint(EMPTY_LIST_MESSAGE, palette.muted))?;
            return Ok(());
        }

        let headers = vec![
            "ID".to_string(),
            "Done".to_string(),
            "Difficulty".to_string(),
            "Due".to_string(),
            "Title".to_string(),
        ];

        let mut rows = Vec::with_capacity(tasks.len());
        for task in tasks {
            let id = self.paint(&task.id.to_string(), palette.id);
            let done = if task.completed {
                self.paint("yes", palette.done)
            } else {
                String::new()
            };

            let due = task.due_date.clone().unwrap_or_default();
            let due = if is_overdue(task, today) {
                self.paint(&due, palette.overdue)
            } else {
                due
            };

            rows.push(vec![
                id,
                done,
                task.difficulty.to_string(),
                due,
                task.header.clone(),
            ]);
        }

        write_table(out, headers, rows)
    }

    #[tracing::instrument(skip(self, out, task))]
    pub fn print_task_info<W: Write>(&self, out: &mut W, task: &Task) -> anyhow::Result<()> {
        writeln!(out, "id          {}", self.paint(&task.id.to_string(), self.palette().id))?;
        writeln!(out, "title       {}", task.header)?;
        writeln!(out, "description {}", task.description)?;
        writeln!(out, "difficulty  {}", task.difficulty)?;
        writeln!(out, "due         {}", task.due_date.as_deref().unwrap_or("-"))?;
        writeln!(out, "completed   {}", if task.completed { "yes" } else { "no" })?;
        Ok(())
    }

    pub fn print_theme<W: Write>(&self, out: &mut W, snapshot: ThemeSnapshot) -> anyhow::Result<()> {
        writeln!(out, "preference  {}", snapshot.preference)?;
        writeln!(out, "effective   {}", snapshot.effective)?;
        Ok(())
    }

    pub fn print_message<W: Write>(&self, out: &mut W, message: &str) -> anyhow::Result<()> {
        writeln!(out, "{message}")?;
        Ok(())
    }

    fn palette(&self) -> Palette {
        Palette::for_theme(self.theme.get())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || text.is_empty() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

/// Open tasks whose due date lies before `today`. Unparsable dates never
/// count as overdue.
pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    if task.completed {
        return false;
    }
    task.due_date
        .as_deref()
        .and_then(|due| NaiveDate::parse_from_str(due.trim(), DUE_FORMAT).ok())
        .is_some_and(|due| due < today)
}

fn write_table<W: Write>(
    writer: &mut W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    let header_line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| format!("{header:width$}"))
        .collect();
    writeln!(writer, "{}", header_line.join(" ").trim_end())?;

    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    writeln!(writer, "{}", rule.join(" "))?;

    for row in rows {
        let mut line = String::new();
        for (idx, cell) in row.iter().enumerate() {
            if idx > 0 {
                line.push(' ');
            }
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            line.push_str(cell);
            line.push_str(&" ".repeat(widths[idx].saturating_sub(visible_width)));
        }
        writeln!(writer, "{}", line.trim_end())?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
