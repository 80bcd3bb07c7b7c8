use crate::models::{LabelRow, NoteRow, UserRow};
use crate::Database;
use anyhow::Result;
use rusqlite::{Connection, Row};

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, password, first_name, last_name, email, is_verified)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0)",
                (username, password_hash, first_name, last_name, email),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username = ?1", &[&username]))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", &[&id]))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email = ?1", &[&email]))
    }

    /// Idempotent: flipping an already-verified account is a no-op.
    pub fn mark_verified(&self, user_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("UPDATE users SET is_verified = 1 WHERE id = ?1", [user_id])?;
            Ok(())
        })
    }

    pub fn set_password(&self, user_id: i64, password_hash: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET password = ?1 WHERE id = ?2",
                rusqlite::params![password_hash, user_id],
            )?;
            Ok(())
        })
    }

    // -- Notes --

    #[allow(clippy::too_many_arguments)]
    pub fn insert_note(
        &self,
        user_id: i64,
        title: &str,
        description: &str,
        color: &str,
        reminder: Option<&str>,
        is_archive: bool,
        is_trash: bool,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO notes (title, description, color, reminder, is_archive, is_trash, user_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![title, description, color, reminder, is_archive, is_trash, user_id],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// A note owned by someone else is indistinguishable from a missing one.
    pub fn get_note(&self, user_id: i64, note_id: i64) -> Result<Option<NoteRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, description, color, reminder, is_archive, is_trash, user_id
                 FROM notes WHERE id = ?1 AND user_id = ?2",
            )?;
            let row = stmt
                .query_row([note_id, user_id], map_note_row)
                .optional()?;
            Ok(row)
        })
    }

    pub fn list_notes_active(&self, user_id: i64) -> Result<Vec<NoteRow>> {
        self.with_conn(|conn| query_notes(conn, user_id, "is_archive = 0 AND is_trash = 0"))
    }

    /// Archived and not trashed; a trashed note leaves this list.
    pub fn list_notes_archived(&self, user_id: i64) -> Result<Vec<NoteRow>> {
        self.with_conn(|conn| query_notes(conn, user_id, "is_archive = 1 AND is_trash = 0"))
    }

    /// Trashed, regardless of the archive flag.
    pub fn list_notes_trashed(&self, user_id: i64) -> Result<Vec<NoteRow>> {
        self.with_conn(|conn| query_notes(conn, user_id, "is_trash = 1"))
    }

    pub fn update_note(
        &self,
        user_id: i64,
        note_id: i64,
        title: &str,
        description: &str,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE notes SET title = ?1, description = ?2 WHERE id = ?3 AND user_id = ?4",
                rusqlite::params![title, description, note_id, user_id],
            )?;
            Ok(changed == 1)
        })
    }

    pub fn set_note_archive(&self, user_id: i64, note_id: i64, archive: bool) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE notes SET is_archive = ?1 WHERE id = ?2 AND user_id = ?3",
                rusqlite::params![archive, note_id, user_id],
            )?;
            Ok(changed == 1)
        })
    }

    pub fn set_note_trash(&self, user_id: i64, note_id: i64, trash: bool) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE notes SET is_trash = ?1 WHERE id = ?2 AND user_id = ?3",
                rusqlite::params![trash, note_id, user_id],
            )?;
            Ok(changed == 1)
        })
    }

    /// Removes the note and its label edges in one transaction.
    pub fn delete_note(&self, user_id: i64, note_id: i64) -> Result<bool> {
        self.with_txn(|txn| {
            let owned: Option<i64> = txn
                .query_row(
                    "SELECT id FROM notes WHERE id = ?1 AND user_id = ?2",
                    [note_id, user_id],
                    |row| row.get(0),
                )
                .optional()?;
            if owned.is_none() {
                return Ok(false);
            }

            txn.execute("DELETE FROM note_labels WHERE note_id = ?1", [note_id])?;
            txn.execute("DELETE FROM notes WHERE id = ?1", [note_id])?;
            Ok(true)
        })
    }

    // -- Labels --

    pub fn insert_label(&self, user_id: i64, name: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO labels (name, user_id) VALUES (?1, ?2)",
                rusqlite::params![name, user_id],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_label(&self, user_id: i64, label_id: i64) -> Result<Option<LabelRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, user_id FROM labels WHERE id = ?1 AND user_id = ?2",
            )?;
            let row = stmt
                .query_row([label_id, user_id], map_label_row)
                .optional()?;
            Ok(row)
        })
    }

    pub fn list_labels(&self, user_id: i64) -> Result<Vec<LabelRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, user_id FROM labels WHERE user_id = ?1 ORDER BY id",
            )?;
            let rows = stmt
                .query_map([user_id], map_label_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_label(&self, user_id: i64, label_id: i64, name: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE labels SET name = ?1 WHERE id = ?2 AND user_id = ?3",
                rusqlite::params![name, label_id, user_id],
            )?;
            Ok(changed == 1)
        })
    }

    /// Removes the label and its note edges in one transaction.
    pub fn delete_label(&self, user_id: i64, label_id: i64) -> Result<bool> {
        self.with_txn(|txn| {
            let owned: Option<i64> = txn
                .query_row(
                    "SELECT id FROM labels WHERE id = ?1 AND user_id = ?2",
                    [label_id, user_id],
                    |row| row.get(0),
                )
                .optional()?;
            if owned.is_none() {
                return Ok(false);
            }

            txn.execute("DELETE FROM note_labels WHERE label_id = ?1", [label_id])?;
            txn.execute("DELETE FROM labels WHERE id = ?1", [label_id])?;
            Ok(true)
        })
    }

    // -- Note-label associations --

    /// Returns false when the edge already exists.
    pub fn attach_label(&self, note_id: i64, label_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "INSERT OR IGNORE INTO note_labels (note_id, label_id) VALUES (?1, ?2)",
                [note_id, label_id],
            )?;
            Ok(changed == 1)
        })
    }

    /// Returns false when the edge was not present.
    pub fn detach_label(&self, note_id: i64, label_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM note_labels WHERE note_id = ?1 AND label_id = ?2",
                [note_id, label_id],
            )?;
            Ok(changed == 1)
        })
    }

    pub fn labels_for_note(&self, note_id: i64) -> Result<Vec<LabelRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT l.id, l.name, l.user_id
                 FROM labels l
                 JOIN note_labels nl ON nl.label_id = l.id
                 WHERE nl.note_id = ?1
                 ORDER BY l.id",
            )?;
            let rows = stmt
                .query_map([note_id], map_label_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Batch-fetch label edges for a set of note ids.
    pub fn labels_for_notes(&self, note_ids: &[i64]) -> Result<Vec<(i64, LabelRow)>> {
        if note_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> = (1..=note_ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT nl.note_id, l.id, l.name, l.user_id
                 FROM labels l
                 JOIN note_labels nl ON nl.label_id = l.id
                 WHERE nl.note_id IN ({})",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn rusqlite::types::ToSql> = note_ids
                .iter()
                .map(|id| id as &dyn rusqlite::types::ToSql)
                .collect();

            let rows = stmt
                .query_map(params.as_slice(), |row| {
                    Ok((
                        row.get(0)?,
                        LabelRow {
                            id: row.get(1)?,
                            name: row.get(2)?,
                            user_id: row.get(3)?,
                        },
                    ))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn query_user(
    conn: &Connection,
    filter: &str,
    params: &[&dyn rusqlite::types::ToSql],
) -> Result<Option<UserRow>> {
    let sql = format!(
        "SELECT id, username, password, first_name, last_name, email, is_verified
         FROM users WHERE {filter}"
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row(params, |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
                first_name: row.get(3)?,
                last_name: row.get(4)?,
                email: row.get(5)?,
                is_verified: row.get(6)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_notes(conn: &Connection, user_id: i64, filter: &str) -> Result<Vec<NoteRow>> {
    let sql = format!(
        "SELECT id, title, description, color, reminder, is_archive, is_trash, user_id
         FROM notes WHERE user_id = ?1 AND {filter} ORDER BY id"
    );
    let mut stmt = conn.prepare(&sql)?;

    let rows = stmt
        .query_map([user_id], map_note_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn map_note_row(row: &Row<'_>) -> rusqlite::Result<NoteRow> {
    Ok(NoteRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        color: row.get(3)?,
        reminder: row.get(4)?,
        is_archive: row.get(5)?,
        is_trash: row.get(6)?,
        user_id: row.get(7)?,
    })
}

fn map_label_row(row: &Row<'_>) -> rusqlite::Result<LabelRow> {
    Ok(LabelRow {
        id: row.get(0)?,
        name: row.get(1)?,
        user_id: row.get(2)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
