use crate::{
    Bin, BulkError, ItemStore, Result, Task, Thoughtmark, ThoughtmarkPatch,
};
use rusqlite::{Connection, OptionalExtension, Row};
use std::path::Path;

/// An [`ItemStore`] backed by a SQLite database file.
pub struct SqliteItemStore {
    conn: Connection,
}

impl SqliteItemStore {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    /// Opens an in-memory database, mainly for tests and previews.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Validate database structure
        let table_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master
             WHERE type='table'
             AND name IN ('thoughtmarks', 'tasks', 'bins')",
            [],
            |row| row.get(0),
        )?;

        if table_count != 3 {
            return Err(BulkError::Store(
                "Not a valid Thoughtmarks database".to_string(),
            ));
        }

        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn insert_thoughtmark(&self, thoughtmark: &Thoughtmark) -> Result<()> {
        self.conn.execute(
            "INSERT INTO thoughtmarks (id, title, content, tags_json, bin_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            rusqlite::params![
                thoughtmark.id,
                thoughtmark.title,
                thoughtmark.content,
                serde_json::to_string(&thoughtmark.tags)?,
                thoughtmark.bin_id,
                thoughtmark.created_at,
                thoughtmark.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn insert_task(&self, task: &Task) -> Result<()> {
        self.conn.execute(
            "INSERT INTO tasks (id, title, is_completed) VALUES (?, ?, ?)",
            rusqlite::params![task.id, task.title, task.is_completed],
        )?;
        Ok(())
    }

    pub fn insert_bin(&self, bin: &Bin) -> Result<()> {
        self.conn.execute(
            "INSERT INTO bins (id, name) VALUES (?, ?)",
            rusqlite::params![bin.id, bin.name],
        )?;
        Ok(())
    }

    pub fn list_thoughtmarks(&self) -> Result<Vec<Thoughtmark>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, content, tags_json, bin_id, created_at, updated_at
             FROM thoughtmarks ORDER BY created_at, id",
        )?;
        let rows = stmt
            .query_map([], map_thoughtmark_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(into_thoughtmark).collect()
    }

    pub fn count(&self, table: CountTable) -> Result<usize> {
        let sql = match table {
            CountTable::Thoughtmarks => "SELECT COUNT(*) FROM thoughtmarks",
            CountTable::Tasks => "SELECT COUNT(*) FROM tasks",
            CountTable::Bins => "SELECT COUNT(*) FROM bins",
        };
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        usize::try_from(count).map_err(|_| BulkError::Store(format!("Invalid row count: {count}")))
    }

    fn delete_row(&mut self, sql: &str, kind: &'static str, id: &str) -> Result<()> {
        self.conn.execute(sql, rusqlite::params![id])?;

        // DELETE silently affects zero rows for an unknown ID.
        if self.conn.changes() == 0 {
            return Err(BulkError::ItemNotFound {
                kind,
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

/// Tables [`SqliteItemStore::count`] can report on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountTable {
    Thoughtmarks,
    Tasks,
    Bins,
}

type ThoughtmarkRow = (String, String, String, String, Option<String>, i64, i64);

fn map_thoughtmark_row(row: &Row<'_>) -> rusqlite::Result<ThoughtmarkRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn into_thoughtmark(row: ThoughtmarkRow) -> Result<Thoughtmark> {
    let (id, title, content, tags_json, bin_id, created_at, updated_at) = row;
    Ok(Thoughtmark {
        id,
        title,
        content,
        tags: serde_json::from_str(&tags_json)?,
        bin_id,
        created_at,
        updated_at,
    })
}

impl ItemStore for SqliteItemStore {
    fn thoughtmark(&self, id: &str) -> Result<Option<Thoughtmark>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, title, content, tags_json, bin_id, created_at, updated_at
                 FROM thoughtmarks WHERE id = ?1",
                rusqlite::params![id],
                map_thoughtmark_row,
            )
            .optional()?;
        row.map(into_thoughtmark).transpose()
    }

    fn update_thoughtmark(&mut self, id: &str, patch: ThoughtmarkPatch) -> Result<()> {
        let mut thoughtmark = self.thoughtmark(id)?.ok_or_else(|| BulkError::ItemNotFound {
            kind: "Thoughtmark",
            id: id.to_string(),
        })?;
        thoughtmark.apply(patch);

        self.conn.execute(
            "UPDATE thoughtmarks SET tags_json = ?1, bin_id = ?2, updated_at = ?3 WHERE id = ?4",
            rusqlite::params![
                serde_json::to_string(&thoughtmark.tags)?,
                thoughtmark.bin_id,
                thoughtmark.updated_at,
                id,
            ],
        )?;
        Ok(())
    }

    fn delete_thoughtmark(&mut self, id: &str) -> Result<()> {
        self.delete_row("DELETE FROM thoughtmarks WHERE id = ?1", "Thoughtmark", id)
    }

    fn delete_task(&mut self, id: &str) -> Result<()> {
        self.delete_row("DELETE FROM tasks WHERE id = ?1", "Task", id)
    }

    fn delete_bin(&mut self, id: &str) -> Result<()> {
        self.delete_row("DELETE FROM bins WHERE id = ?1", "Bin", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_create_storage() {
        let temp = NamedTempFile::new().unwrap();
        let store = SqliteItemStore::create(temp.path()).unwrap();

        // Verify tables exist
        let tables: Vec<String> = store
            .connection()
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();

        assert!(tables.contains(&"thoughtmarks".to_string()));
        assert!(tables.contains(&"tasks".to_string()));
        assert!(tables.contains(&"bins".to_string()));
    }

    #[test]
    fn test_open_existing_storage() {
        let temp = NamedTempFile::new().unwrap();
        {
            let store = SqliteItemStore::create(temp.path()).unwrap();
            store
                .insert_thoughtmark(&Thoughtmark::new("tm-1", "Kept").with_tags(["a"]))
                .unwrap();
        }

        let store = SqliteItemStore::open(temp.path()).unwrap();
        let tm = store.thoughtmark("tm-1").unwrap().unwrap();
        assert_eq!(tm.title, "Kept");
        assert_eq!(tm.tags, vec!["a".to_string()]);
    }

    #[test]
    fn test_open_invalid_database() {
        let temp = NamedTempFile::new().unwrap();

        // Create empty file (not a valid Thoughtmarks DB)
        std::fs::write(temp.path(), "not a database").unwrap();

        let result = SqliteItemStore::open(temp.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_open_rejects_foreign_schema() {
        let temp = NamedTempFile::new().unwrap();
        {
            let conn = Connection::open(temp.path()).unwrap();
            conn.execute("CREATE TABLE notes (id TEXT PRIMARY KEY)", []).unwrap();
        }

        let err = SqliteItemStore::open(temp.path()).err().unwrap();
        assert!(matches!(err, BulkError::Store(_)));
    }

    #[test]
    fn test_update_thoughtmark_persists_patch() {
        let mut store = SqliteItemStore::in_memory().unwrap();
        store.insert_thoughtmark(&Thoughtmark::new("tm-1", "One")).unwrap();

        store
            .update_thoughtmark(
                "tm-1",
                ThoughtmarkPatch {
                    bin_id: Some("bin-9".to_string()),
                    tags: Some(vec!["x".to_string(), "y".to_string()]),
                },
            )
            .unwrap();

        let tm = store.thoughtmark("tm-1").unwrap().unwrap();
        assert_eq!(tm.bin_id.as_deref(), Some("bin-9"));
        assert_eq!(tm.tags, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_delete_missing_row_is_not_found() {
        let mut store = SqliteItemStore::in_memory().unwrap();
        store
            .insert_task(&Task {
                id: "task-1".to_string(),
                title: "Water plants".to_string(),
                is_completed: false,
            })
            .unwrap();

        store.delete_task("task-1").unwrap();
        assert_eq!(store.count(CountTable::Tasks).unwrap(), 0);

        let err = store.delete_task("task-1").unwrap_err();
        assert_eq!(err.to_string(), "Task not found: task-1");
    }

    #[test]
    fn test_list_thoughtmarks() {
        let store = SqliteItemStore::in_memory().unwrap();
        store.insert_thoughtmark(&Thoughtmark::new("a", "A")).unwrap();
        store.insert_thoughtmark(&Thoughtmark::new("b", "B")).unwrap();
        store
            .insert_bin(&Bin {
                id: "bin-1".to_string(),
                name: "Inbox".to_string(),
            })
            .unwrap();

        assert_eq!(store.list_thoughtmarks().unwrap().len(), 2);
        assert_eq!(store.count(CountTable::Bins).unwrap(), 1);
    }
}
