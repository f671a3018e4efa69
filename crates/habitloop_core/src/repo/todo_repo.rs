//! To-do repository contract and SQLite implementation.

use crate::model::todo::{TodoId, TodoItem};
use crate::repo::{bool_to_int, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const TODO_SELECT_SQL: &str = "SELECT uuid, title, is_completed, created_at FROM todos";

/// Data-access interface for to-do items.
pub trait TodoRepository {
    fn create_todo(&self, item: &TodoItem) -> RepoResult<TodoId>;
    fn update_todo(&self, item: &TodoItem) -> RepoResult<()>;
    fn get_todo(&self, id: TodoId) -> RepoResult<Option<TodoItem>>;
    /// Items ordered by creation time, then id.
    fn list_todos(&self) -> RepoResult<Vec<TodoItem>>;
    fn delete_todo(&self, id: TodoId) -> RepoResult<()>;
}

/// SQLite-backed to-do repository.
pub struct SqliteTodoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTodoRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TodoRepository for SqliteTodoRepository<'_> {
    fn create_todo(&self, item: &TodoItem) -> RepoResult<TodoId> {
        item.validate()?;
        self.conn.execute(
            "INSERT INTO todos (uuid, title, is_completed, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                item.id.to_string(),
                item.title.trim(),
                bool_to_int(item.is_completed),
                item.created_at_ms,
            ],
        )?;
        Ok(item.id)
    }

    fn update_todo(&self, item: &TodoItem) -> RepoResult<()> {
        item.validate()?;
        let changed = self.conn.execute(
            "UPDATE todos
             SET
                title = ?1,
                is_completed = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?3;",
            params![
                item.title.trim(),
                bool_to_int(item.is_completed),
                item.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(item.id));
        }
        Ok(())
    }

    fn get_todo(&self, id: TodoId) -> RepoResult<Option<TodoItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TODO_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_todo_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_todos(&self) -> RepoResult<Vec<TodoItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TODO_SELECT_SQL} ORDER BY created_at ASC, uuid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_todo_row(row)?);
        }
        Ok(items)
    }

    fn delete_todo(&self, id: TodoId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM todos WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_todo_row(row: &Row<'_>) -> RepoResult<TodoItem> {
    let uuid_text: String = row.get("uuid")?;
    let is_completed = match row.get::<_, i64>("is_completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_completed value `{other}` in todos.is_completed"
            )));
        }
    };

    let item = TodoItem {
        id: parse_uuid(&uuid_text, "todos.uuid")?,
        title: row.get("title")?,
        is_completed,
        created_at_ms: row.get("created_at")?,
    };
    item.validate()?;
    Ok(item)
}
