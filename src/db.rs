//! SQLite-backed task store and small formatting utilities.
//!
//! The `Store` owns the single `rusqlite::Connection` used by the process.
//! Every mutating call commits immediately; there is no batching and no
//! rollback. Callers reload whatever they display after each mutation.

use std::path::Path;

use chrono::{Datelike, Local, NaiveDate, TimeDelta};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::error::StoreError;
use crate::task::{Tag, Task, Topic};

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS topics (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS tasks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL CHECK (length(trim(name)) > 0),
        description TEXT NOT NULL DEFAULT '',
        due_date TEXT,
        should_notify INTEGER NOT NULL DEFAULT 0,
        topic_id INTEGER,
        is_done INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY (topic_id) REFERENCES topics (id) ON DELETE SET NULL
    );

    CREATE TABLE IF NOT EXISTS tags (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS task_tags (
        task_id INTEGER NOT NULL,
        tag_id INTEGER NOT NULL,
        PRIMARY KEY (task_id, tag_id),
        FOREIGN KEY (task_id) REFERENCES tasks (id) ON DELETE CASCADE,
        FOREIGN KEY (tag_id) REFERENCES tags (id) ON DELETE CASCADE
    );
";

const SELECT_TASKS: &str = "SELECT id, name, description, due_date, should_notify, topic_id, is_done
    FROM tasks ORDER BY id";
const SELECT_TASK: &str = "SELECT id, name, description, due_date, should_notify, topic_id, is_done
    FROM tasks WHERE id = ?1";
const INSERT_TASK: &str = "INSERT INTO tasks (name, description, due_date, should_notify, topic_id, is_done)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const UPDATE_TASK: &str = "UPDATE tasks
    SET name = ?1, description = ?2, due_date = ?3, should_notify = ?4, topic_id = ?5, is_done = ?6
    WHERE id = ?7";
const DELETE_TASK: &str = "DELETE FROM tasks WHERE id = ?1";

/// Durable store for tasks, tags and topics.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database file and make sure the schema exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        debug!(path = %path.display(), "opening task store");
        Self::init(Connection::open(path)?)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Store { conn })
    }

    /// All tasks in creation order.
    pub fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let mut stmt = self.conn.prepare(SELECT_TASKS)?;
        let tasks = stmt
            .query_map([], task_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = tasks.len(), "listed tasks");
        Ok(tasks)
    }

    pub fn get_task(&self, id: i64) -> Result<Option<Task>, StoreError> {
        let task = self
            .conn
            .query_row(SELECT_TASK, params![id], task_from_row)
            .optional()?;
        Ok(task)
    }

    /// Insert a new task and return the ID the database assigned.
    ///
    /// Any ID already set on `draft` is ignored.
    pub fn create_task(&self, draft: &Task) -> Result<i64, StoreError> {
        self.conn.execute(
            INSERT_TASK,
            params![
                draft.name,
                draft.description,
                draft.due_date,
                draft.should_notify,
                draft.topic_id,
                draft.is_done
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, name = %draft.name, "created task");
        Ok(id)
    }

    /// Overwrite every column of the row matching `task.id`.
    ///
    /// Updating an ID that no longer exists is a silent no-op.
    pub fn update_task(&self, task: &Task) -> Result<(), StoreError> {
        let affected = self.conn.execute(
            UPDATE_TASK,
            params![
                task.name,
                task.description,
                task.due_date,
                task.should_notify,
                task.topic_id,
                task.is_done,
                task.id
            ],
        )?;
        debug!(id = task.id, affected, "updated task");
        Ok(())
    }

    /// Delete a task. Deleting a missing ID is not an error.
    pub fn delete_task(&self, id: i64) -> Result<(), StoreError> {
        let affected = self.conn.execute(DELETE_TASK, params![id])?;
        debug!(id, affected, "deleted task");
        Ok(())
    }

    pub fn list_tags(&self) -> Result<Vec<Tag>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM tags ORDER BY id")?;
        let tags = stmt
            .query_map([], |row| Ok(Tag { id: row.get(0)?, name: row.get(1)? }))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    pub fn create_tag(&self, name: &str) -> Result<i64, StoreError> {
        self.conn.execute("INSERT INTO tags (name) VALUES (?1)", params![name])?;
        let id = self.conn.last_insert_rowid();
        debug!(id, name, "created tag");
        Ok(id)
    }

    pub fn get_tag(&self, id: i64) -> Result<Option<Tag>, StoreError> {
        let tag = self
            .conn
            .query_row("SELECT id, name FROM tags WHERE id = ?1", params![id], |row| {
                Ok(Tag { id: row.get(0)?, name: row.get(1)? })
            })
            .optional()?;
        Ok(tag)
    }

    pub fn rename_tag(&self, id: i64, name: &str) -> Result<(), StoreError> {
        self.conn.execute("UPDATE tags SET name = ?1 WHERE id = ?2", params![name, id])?;
        Ok(())
    }

    /// Delete a tag; its task associations go with it.
    pub fn delete_tag(&self, id: i64) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM tags WHERE id = ?1", params![id])?;
        debug!(id, "deleted tag");
        Ok(())
    }

    /// Associate a tag with a task. Attaching twice is harmless.
    pub fn attach_tag(&self, task_id: i64, tag_id: i64) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO task_tags (task_id, tag_id) VALUES (?1, ?2)",
            params![task_id, tag_id],
        )?;
        Ok(())
    }

    pub fn detach_tag(&self, task_id: i64, tag_id: i64) -> Result<(), StoreError> {
        self.conn.execute(
            "DELETE FROM task_tags WHERE task_id = ?1 AND tag_id = ?2",
            params![task_id, tag_id],
        )?;
        Ok(())
    }

    /// Tags attached to a task, by tag ID.
    pub fn task_tags(&self, task_id: i64) -> Result<Vec<Tag>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.name FROM tags t
             JOIN task_tags tt ON tt.tag_id = t.id
             WHERE tt.task_id = ?1 ORDER BY t.id",
        )?;
        let tags = stmt
            .query_map(params![task_id], |row| Ok(Tag { id: row.get(0)?, name: row.get(1)? }))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    pub fn list_topics(&self) -> Result<Vec<Topic>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM topics ORDER BY id")?;
        let topics = stmt
            .query_map([], |row| Ok(Topic { id: row.get(0)?, name: row.get(1)? }))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(topics)
    }

    pub fn get_topic(&self, id: i64) -> Result<Option<Topic>, StoreError> {
        let topic = self
            .conn
            .query_row("SELECT id, name FROM topics WHERE id = ?1", params![id], |row| {
                Ok(Topic { id: row.get(0)?, name: row.get(1)? })
            })
            .optional()?;
        Ok(topic)
    }

    pub fn find_topic(&self, name: &str) -> Result<Option<Topic>, StoreError> {
        let topic = self
            .conn
            .query_row("SELECT id, name FROM topics WHERE name = ?1", params![name], |row| {
                Ok(Topic { id: row.get(0)?, name: row.get(1)? })
            })
            .optional()?;
        Ok(topic)
    }

    pub fn create_topic(&self, name: &str) -> Result<i64, StoreError> {
        self.conn.execute("INSERT INTO topics (name) VALUES (?1)", params![name])?;
        let id = self.conn.last_insert_rowid();
        debug!(id, name, "created topic");
        Ok(id)
    }

    pub fn rename_topic(&self, id: i64, name: &str) -> Result<(), StoreError> {
        self.conn.execute("UPDATE topics SET name = ?1 WHERE id = ?2", params![name, id])?;
        Ok(())
    }

    /// Delete a topic. Tasks that referenced it keep existing with no topic.
    pub fn delete_topic(&self, id: i64) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM topics WHERE id = ?1", params![id])?;
        debug!(id, "deleted topic");
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        due_date: row.get(3)?,
        should_notify: row.get::<_, Option<bool>>(4)?.unwrap_or(false),
        topic_id: row.get(5)?,
        is_done: row.get::<_, Option<bool>>(6)?.unwrap_or(false),
    })
}

/// Parse human-readable due date input relative to the local date.
///
/// Supports "today", "tomorrow", "yesterday", weekday names ("fri",
/// "next monday"), "end of week", "in 3d" / "in 2w", and `YYYY-MM-DD`.
pub fn parse_due_input(s: &str) -> Option<NaiveDate> {
    parse_due_input_from(s, Local::now().date_naive())
}

/// Same as [`parse_due_input`] with an explicit reference date.
pub fn parse_due_input_from(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return shift_days(today, 1),
        "yesterday" => return shift_days(today, -1),
        "end of week" | "eow" => {
            let to_sunday = 6 - today.weekday().num_days_from_monday() as i64;
            return shift_days(today, to_sunday);
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        let rest = rest.trim();
        if let Some(n) = rest.strip_suffix('d').and_then(|n| n.trim().parse::<i64>().ok()) {
            return shift_days(today, n);
        }
        if let Some(n) = rest.strip_suffix('w').and_then(|n| n.trim().parse::<i64>().ok()) {
            return TimeDelta::try_weeks(n).and_then(|delta| today.checked_add_signed(delta));
        }
    }

    let (next_week, day) = match s.strip_prefix("next ") {
        Some(day) => (true, day),
        None => (false, s.strip_prefix("this ").unwrap_or(&s)),
    };
    if let Some(target) = weekday_index(day) {
        let current = today.weekday().num_days_from_monday() as i64;
        let mut ahead = (target + 7 - current) % 7;
        if next_week {
            ahead += 7;
        }
        return shift_days(today, ahead);
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// `today` moved by `n` days, or `None` when the result is out of range.
fn shift_days(today: NaiveDate, n: i64) -> Option<NaiveDate> {
    TimeDelta::try_days(n).and_then(|delta| today.checked_add_signed(delta))
}

fn weekday_index(name: &str) -> Option<i64> {
    const DAYS: [(&str, &str); 7] = [
        ("monday", "mon"),
        ("tuesday", "tue"),
        ("wednesday", "wed"),
        ("thursday", "thu"),
        ("friday", "fri"),
        ("saturday", "sat"),
        ("sunday", "sun"),
    ];
    DAYS.iter()
        .position(|(long, short)| name == *long || name == *short)
        .map(|i| i as i64)
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<NaiveDate>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => {
            let days = (d - today).num_days();
            match days {
                0 => "today".into(),
                1 => "tomorrow".into(),
                n if n > 1 => format!("in {}d", n),
                n => format!("{}d late", -n),
            }
        }
    }
}

/// Print tasks as a plain table for the command line.
pub fn print_table(tasks: &[Task], topics: &[Topic]) {
    println!("{:<5} {:<6} {:<10} {:<14} {}", "ID", "Done", "Due", "Topic", "Name");
    let today = Local::now().date_naive();
    for t in tasks {
        let topic = t
            .topic_id
            .and_then(|id| topics.iter().find(|topic| topic.id == id))
            .map(|topic| topic.name.as_str())
            .unwrap_or("-");
        println!(
            "{:<5} {:<6} {:<10} {:<14} {}",
            t.id,
            if t.is_done { "[x]" } else { "[ ]" },
            format_due_relative(t.due_date, today),
            truncate(topic, 14),
            t.name
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
