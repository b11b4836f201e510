//! SQLite-backed relational adapter: one `materials` table.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Row, params};
use uuid::Uuid;

use crate::{
    material::Material,
    types::{MaterialId, Timestamp, format_timestamp, parse_timestamp},
};

use super::{MaterialBackend, PersistResult};

const SELECT_COLUMNS: &str = "SELECT id, name, description, quantity, minimumQuantity, unit, category, createdAt, updatedAt FROM materials";

/// SQLite implementation of [`crate::persist::MaterialBackend`].
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Opens or creates a database file at `path`.
    ///
    /// Enables WAL mode and sets `synchronous=NORMAL`. The table is created by
    /// [`MaterialBackend::initialize`].
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(Self { conn })
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> PersistResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Number of rows in the table.
    pub fn count(&self) -> PersistResult<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM materials", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

impl MaterialBackend for SqliteBackend {
    fn initialize(&mut self) -> PersistResult<()> {
        self.conn.execute_batch(include_str!("schema.sql"))?;
        Ok(())
    }

    fn load_all(&self) -> PersistResult<Vec<Material>> {
        let mut stmt = self.conn.prepare(SELECT_COLUMNS)?;
        let rows = stmt.query_map([], material_from_row)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn get(&self, id: MaterialId) -> PersistResult<Option<Material>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        let found = self
            .conn
            .query_row(&sql, params![id.to_string()], material_from_row)
            .optional()?;
        Ok(found)
    }

    fn insert(&mut self, material: &Material) -> PersistResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO materials(id, name, description, quantity, minimumQuantity, unit, category, createdAt, updatedAt)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                material.id.to_string(),
                material.name,
                material.description,
                material.quantity,
                material.minimum_quantity,
                material.unit,
                material.category,
                format_timestamp(&material.created_at),
                format_timestamp(&material.updated_at),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn update(&mut self, material: &Material) -> PersistResult<bool> {
        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "UPDATE materials
             SET name = ?1, description = ?2, quantity = ?3, minimumQuantity = ?4, unit = ?5, category = ?6, updatedAt = ?7
             WHERE id = ?8",
            params![
                material.name,
                material.description,
                material.quantity,
                material.minimum_quantity,
                material.unit,
                material.category,
                format_timestamp(&material.updated_at),
                material.id.to_string(),
            ],
        )?;
        tx.commit()?;
        Ok(changed > 0)
    }

    fn delete(&mut self, id: MaterialId) -> PersistResult<bool> {
        let tx = self.conn.transaction()?;
        let changed = tx.execute("DELETE FROM materials WHERE id = ?1", params![id.to_string()])?;
        tx.commit()?;
        Ok(changed > 0)
    }

    fn set_quantity(
        &mut self,
        id: MaterialId,
        quantity: i64,
        updated_at: Timestamp,
    ) -> PersistResult<bool> {
        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "UPDATE materials SET quantity = ?1, updatedAt = ?2 WHERE id = ?3",
            params![quantity, format_timestamp(&updated_at), id.to_string()],
        )?;
        tx.commit()?;
        Ok(changed > 0)
    }
}

fn material_from_row(row: &Row<'_>) -> rusqlite::Result<Material> {
    let id: String = row.get(0)?;
    let created_at: String = row.get(7)?;
    let updated_at: String = row.get(8)?;
    Ok(Material {
        id: Uuid::parse_str(&id).map_err(|e| conversion_failure(0, e))?,
        name: row.get(1)?,
        description: row.get(2)?,
        quantity: row.get(3)?,
        minimum_quantity: row.get(4)?,
        unit: row.get(5)?,
        category: row.get(6)?,
        created_at: parse_timestamp(&created_at).map_err(|e| conversion_failure(7, e))?,
        updated_at: parse_timestamp(&updated_at).map_err(|e| conversion_failure(8, e))?,
    })
}

fn conversion_failure<E>(column: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
}
