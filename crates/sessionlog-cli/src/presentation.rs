use chrono::Local;
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use sessionlog_types::{DiagnosticEvent, LogLevel, ResolvedContent};
use std::fmt;

/// Colors only when stdout is an interactive terminal
pub fn use_color() -> bool {
    std::io::stdout().is_terminal()
}

/// One event per line: `[time] LEVEL name (category) details`
pub struct EventLine<'a> {
    pub event: &'a DiagnosticEvent,
    pub color: bool,
}

impl fmt::Display for EventLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let event = self.event;
        let time = format!(
            "[{}]",
            event.created.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        );
        let level = format!("{:<7}", event.level.as_str().to_uppercase());

        if self.color {
            write!(f, "{} {} ", time.dimmed(), colored_level(event.level, &level))?;
        } else {
            write!(f, "{} {} ", time, level)?;
        }

        write!(f, "{}", event.name)?;
        if let Some(category) = &event.category {
            write!(f, " ({})", category)?;
        }
        if let Some(id) = &event.id {
            write!(f, " #{}", id)?;
        }
        if let Some(details) = &event.details {
            write!(f, " {}", details)?;
        }
        Ok(())
    }
}

fn colored_level(level: LogLevel, text: &str) -> String {
    match level {
        LogLevel::Error => text.red().bold().to_string(),
        LogLevel::Warning => text.yellow().to_string(),
        LogLevel::Info => text.green().to_string(),
        LogLevel::Debug | LogLevel::Trace => text.dimmed().to_string(),
    }
}

/// Multi-line rendering of resolved content
pub struct ResolvedView<'a> {
    pub content: &'a ResolvedContent,
}

impl fmt::Display for ResolvedView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.content {
            ResolvedContent::Text { value } => writeln!(f, "{}", value),
            ResolvedContent::FileList { files } => {
                for file in files {
                    match &file.status {
                        Some(status) => writeln!(f, "{}  {}", status, file.path)?,
                        None => writeln!(f, "{}", file.path)?,
                    }
                }
                Ok(())
            }
            ResolvedContent::Message { sections } => {
                for section in sections {
                    writeln!(f, "## {}", section.name)?;
                    writeln!(f, "{}", section.content)?;
                }
                Ok(())
            }
            ResolvedContent::Json { value } => {
                let pretty = serde_json::to_string_pretty(value).map_err(|_| fmt::Error)?;
                writeln!(f, "{}", pretty)
            }
        }
    }
}
