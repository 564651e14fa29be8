use std::io::Write;
use std::sync::LazyLock;

use chrono::NaiveDate;
use clap::Parser;
use regex::Regex;
use serde::Serialize;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::model::clock::Clock;
use crate::model::task::{TaskDraft, TaskPatch};
use crate::ops::store::{Change, Subscription, TaskStore};
use crate::ops::task_ops::TaskError;
use crate::ops::view;

/// Error type for a single shell line
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// clap's rendered message, already prefixed with `error:`
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error("positions start at 1")]
    ZeroPosition,
    #[error("line is not valid UTF-8")]
    InvalidUtf8,
    #[error("could not write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ShellError {
    /// Text for stderr
    pub fn render(&self) -> String {
        match self {
            ShellError::Usage(msg) => msg.trim_end().to_string(),
            other => format!("error: {}", other),
        }
    }
}

/// Whether the shell should keep reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

// ---------------------------------------------------------------------------
// Tokenizing
// ---------------------------------------------------------------------------

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]*)"|'([^']*)'|(\S+)"#).expect("word pattern is valid"));

/// Decode one raw input line. Bad bytes fail that line only.
pub fn decode_line(raw: &[u8]) -> Result<&str, ShellError> {
    std::str::from_utf8(raw).map_err(|_| ShellError::InvalidUtf8)
}

/// Split a line into words. Double or single quotes group words; a line
/// whose first non-blank character is `#` is a comment.
pub fn tokenize(line: &str) -> Vec<String> {
    if line.trim_start().starts_with('#') {
        return Vec::new();
    }
    WORD_RE
        .captures_iter(line)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| m.as_str().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A store plus the state needed to render it: the clock and output mode.
///
/// Mutations are confirmed from the store's change feed rather than from
/// the command that caused them.
pub struct Session {
    store: TaskStore,
    clock: Box<dyn Clock>,
    json: bool,
    changes: Subscription,
}

impl Session {
    pub fn new(mut store: TaskStore, clock: Box<dyn Clock>, json: bool) -> Self {
        let changes = store.subscribe();
        Session {
            store,
            clock,
            json,
            changes,
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Parse and run one line, writing its output to `out`.
    pub fn execute(&mut self, line: &str, out: &mut dyn Write) -> Result<Flow, ShellError> {
        let words = tokenize(line);
        if words.is_empty() {
            return Ok(Flow::Continue);
        }
        let parsed = match ShellLine::try_parse_from(&words) {
            Ok(parsed) => parsed,
            Err(e) => match e.kind() {
                clap::error::ErrorKind::DisplayHelp
                | clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                    write!(out, "{}", e.render())?;
                    return Ok(Flow::Continue);
                }
                _ => return Err(ShellError::Usage(e.render().to_string())),
            },
        };
        tracing::debug!(line, "shell command");
        let flow = self.run(parsed.command, out)?;
        self.report_changes(out)?;
        Ok(flow)
    }

    fn run(&mut self, command: ShellCommand, out: &mut dyn Write) -> Result<Flow, ShellError> {
        // Sampled per command: overdue status follows the clock, not the session start.
        let today = self.clock.today();
        match command {
            ShellCommand::Add(args) => {
                let draft = TaskDraft::new(
                    args.title.join(" "),
                    args.desc.unwrap_or_default(),
                    args.due.unwrap_or(today),
                );
                self.store.add(draft)?;
            }
            ShellCommand::Edit(args) => {
                let mut patch = TaskPatch {
                    title: args.title,
                    description: args.desc,
                    due_date: args.due,
                    completed: None,
                };
                if args.done {
                    patch.completed = Some(true);
                } else if args.pending {
                    patch.completed = Some(false);
                }
                self.store.edit(args.id, patch)?;
            }
            ShellCommand::Rm(args) => {
                self.store.delete(args.id)?;
            }
            ShellCommand::Toggle(args) => {
                self.store.toggle_complete(args.id)?;
            }
            ShellCommand::Filter(args) => {
                self.store.set_filter(&args.name)?;
            }
            ShellCommand::List(args) => {
                let filter = args.filter.unwrap_or(self.store.filter());
                let searched = view::by_search(self.store.tasks(), args.search.as_deref().unwrap_or(""));
                let tasks = view::by_filter(searched, filter, today);
                if self.json {
                    let items: Vec<TaskJson> = tasks.iter().map(|t| task_to_json(t, today)).collect();
                    self.emit(out, &items)?;
                } else {
                    write_lines(out, &format_task_list(&tasks, today))?;
                }
            }
            ShellCommand::Show(args) => {
                let task = self.store.require(args.id)?;
                if self.json {
                    self.emit(out, &task_to_json(task, today))?;
                } else {
                    write_lines(out, &format_task_detail(task, today))?;
                }
            }
            ShellCommand::Search(args) => {
                let tasks = view::by_search(self.store.tasks(), &args.query.join(" "));
                if self.json {
                    let items: Vec<TaskJson> = tasks.iter().map(|t| task_to_json(t, today)).collect();
                    self.emit(out, &items)?;
                } else {
                    write_lines(out, &format_task_list(&tasks, today))?;
                }
            }
            ShellCommand::Stats => {
                let stats = view::stats(self.store.tasks(), today);
                if self.json {
                    self.emit(out, &stats_to_json(&stats))?;
                } else {
                    writeln!(out, "{}", format_stats(&stats))?;
                }
            }
            ShellCommand::Dash(args) => self.write_dashboard(&args.query.join(" "), today, out)?,
            ShellCommand::Mv(args) => {
                let from = args.from.checked_sub(1).ok_or(ShellError::ZeroPosition)?;
                let to = args.to.checked_sub(1).ok_or(ShellError::ZeroPosition)?;
                let query = args.search.unwrap_or_default();
                self.store.move_in_view(&query, from, to)?;
            }
            ShellCommand::Order(args) => {
                self.store.reorder(&args.ids)?;
            }
            ShellCommand::Version => {
                if self.json {
                    self.emit(out, &serde_json::json!({ "version": self.store.version() }))?;
                } else {
                    writeln!(out, "{}", self.store.version())?;
                }
            }
            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn write_dashboard(&self, query: &str, today: NaiveDate, out: &mut dyn Write) -> Result<(), ShellError> {
        let dash = view::dashboard(self.store.tasks(), query, today);
        if self.json {
            self.emit(out, &dashboard_to_json(&dash, today))
        } else {
            write_lines(out, &format_dashboard(&dash, today))
        }
    }

    /// Confirm every change the last command published.
    fn report_changes(&self, out: &mut dyn Write) -> Result<(), ShellError> {
        for change in self.changes.poll() {
            self.write_change(&change, out)?;
        }
        Ok(())
    }

    fn write_change(&self, change: &Change, out: &mut dyn Write) -> Result<(), ShellError> {
        if self.json {
            self.emit(out, &change_to_json(change))
        } else {
            writeln!(out, "{}", format_change(change))?;
            Ok(())
        }
    }

    fn emit<T: Serialize>(&self, out: &mut dyn Write, value: &T) -> Result<(), ShellError> {
        writeln!(out, "{}", serde_json::to_string(value)?)?;
        Ok(())
    }
}

fn write_lines(out: &mut dyn Write, lines: &[String]) -> Result<(), ShellError> {
    for line in lines {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::clock::FixedClock;
    use crate::model::filter::Filter;
    use crate::model::task::TaskId;
    use crate::ops::task_ops::ReorderError;
    use pretty_assertions::assert_eq;

    fn session(json: bool) -> Session {
        let today = NaiveDate::from_ymd_opt(2024, 12, 7).unwrap();
        Session::new(TaskStore::seeded(), Box::new(FixedClock(today)), json)
    }

    fn run(session: &mut Session, line: &str) -> String {
        let mut out = Vec::new();
        session.execute(line, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn titles(session: &Session) -> Vec<String> {
        session.store().tasks().map(|t| t.title.clone()).collect()
    }

    // --- tokenizer ---

    #[test]
    fn test_tokenize_quotes_and_words() {
        assert_eq!(
            tokenize(r#"add "Buy milk" --desc 'two litres' --due 2024-12-20"#),
            vec!["add", "Buy milk", "--desc", "two litres", "--due", "2024-12-20"]
        );
        assert_eq!(tokenize("  list   --filter pending "), vec!["list", "--filter", "pending"]);
        assert_eq!(tokenize(r#"add """#), vec!["add", ""]);
    }

    #[test]
    fn test_tokenize_comments_and_blank() {
        assert!(tokenize("   # a comment").is_empty());
        assert!(tokenize("").is_empty());
        assert_eq!(tokenize("add Fix #42"), vec!["add", "Fix", "#42"]);
    }

    #[test]
    fn test_decode_line() {
        assert_eq!(decode_line(b"toggle 1\n").unwrap(), "toggle 1\n");
        let err = decode_line(b"add caf\xff\n").unwrap_err();
        assert!(matches!(err, ShellError::InvalidUtf8));
        assert_eq!(err.render(), "error: line is not valid UTF-8");
    }

    // --- commands ---

    #[test]
    fn test_add_then_list() {
        let mut s = session(false);
        assert_eq!(run(&mut s, "add Water the plants --due 2024-12-20"), "added T-003\n");
        let listing = run(&mut s, "list --filter pending");
        assert_eq!(listing.lines().count(), 3);
        assert!(listing.lines().last().unwrap().contains("Water the plants"));
    }

    #[test]
    fn test_add_defaults_due_to_today() {
        let mut s = session(false);
        run(&mut s, "add Call mom");
        let task = s.store().get(TaskId::new(3)).unwrap();
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 12, 7).unwrap());
        assert!(!task.is_overdue(NaiveDate::from_ymd_opt(2024, 12, 7).unwrap()));
    }

    #[test]
    fn test_toggle_and_overdue_views() {
        let mut s = session(false);
        let overdue = run(&mut s, "list --filter overdue");
        assert!(overdue.contains("T-001"));
        assert!(!overdue.contains("T-002"));

        assert_eq!(run(&mut s, "toggle T-001"), "T-001 is now completed\n");
        assert_eq!(run(&mut s, "list --filter overdue"), "(no tasks)\n");
        assert!(run(&mut s, "list --filter completed").contains("T-001"));
    }

    #[test]
    fn test_filter_command_sets_default_view() {
        let mut s = session(false);
        run(&mut s, "toggle 2");
        assert_eq!(run(&mut s, "filter completed"), "filter set to completed\n");
        assert_eq!(s.store().filter(), Filter::Completed);
        let listing = run(&mut s, "list");
        assert_eq!(listing.lines().count(), 1);
        assert!(listing.contains("T-002"));
    }

    #[test]
    fn test_errors_leave_store_untouched() {
        let mut s = session(false);
        let mut out = Vec::new();
        let before = s.store().snapshot();

        let err = s.execute("filter someday", &mut out).unwrap_err();
        assert_eq!(
            err.render(),
            "error: unknown filter 'someday' (expected: all, completed, pending, overdue)"
        );
        let err = s.execute("rm T-009", &mut out).unwrap_err();
        assert!(matches!(err, ShellError::Task(TaskError::NotFound(_))));
        let err = s.execute("order 2", &mut out).unwrap_err();
        assert!(matches!(
            err,
            ShellError::Task(TaskError::InvalidReorder(ReorderError::Missing(_)))
        ));
        let err = s.execute("edit 1 --title ''", &mut out).unwrap_err();
        assert!(matches!(err, ShellError::Task(TaskError::EmptyTitle)));

        assert!(out.is_empty());
        assert_eq!(s.store().snapshot(), before);
    }

    #[test]
    fn test_usage_error_is_rendered_by_clap() {
        let mut s = session(false);
        let err = s.execute("frobnicate", &mut Vec::new()).unwrap_err();
        assert!(matches!(err, ShellError::Usage(_)));
        assert!(err.render().starts_with("error:"));
    }

    #[test]
    fn test_mv_within_search_keeps_other_tasks() {
        let mut s = session(false);
        run(&mut s, "add Prepare slides");
        run(&mut s, "add Book flights");
        run(&mut s, "add Prepare budget");
        // "prepare" view: [Prepare for Exam, Prepare slides, Prepare budget]
        assert_eq!(run(&mut s, "mv 3 1 --search prepare"), "order updated\n");
        assert_eq!(
            titles(&s),
            vec![
                "Complete Project Report",
                "Prepare budget",
                "Prepare for Exam",
                "Book flights",
                "Prepare slides",
            ]
        );
        assert!(matches!(
            s.execute("mv 0 1", &mut Vec::new()),
            Err(ShellError::ZeroPosition)
        ));
    }

    #[test]
    fn test_dashboard_and_stats() {
        let mut s = session(false);
        assert_eq!(run(&mut s, "stats"), "total 2  completed 0  pending 2  overdue 1\n");
        let dash = run(&mut s, "dash exam");
        assert!(dash.starts_with("total 2  completed 0  pending 2  overdue 1\nsearch: exam\n"));
        assert!(dash.contains("  1. [ ] T-002"));
        assert!(!dash.contains("T-001"));
    }

    #[test]
    fn test_json_mode() {
        let mut s = session(true);
        assert_eq!(
            run(&mut s, "add \"Buy milk\""),
            "{\"action\":\"added\",\"id\":\"T-003\",\"version\":1}\n"
        );
        let stats: serde_json::Value = serde_json::from_str(&run(&mut s, "stats")).unwrap();
        assert_eq!(stats["total"], 3);
        assert_eq!(stats["overdue"], 1);
        let listed: serde_json::Value = serde_json::from_str(&run(&mut s, "list")).unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 3);
        assert_eq!(listed[2]["title"], "Buy milk");
    }

    #[test]
    fn test_quit_and_version() {
        let mut s = session(false);
        assert_eq!(run(&mut s, "version"), "0\n");
        run(&mut s, "toggle 1");
        assert_eq!(run(&mut s, "version"), "1\n");
        assert_eq!(s.execute("quit", &mut Vec::new()).unwrap(), Flow::Quit);
        assert_eq!(s.execute("# nothing", &mut Vec::new()).unwrap(), Flow::Continue);
    }
}
