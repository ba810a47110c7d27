use crate::error::{AppError, Result};
use crate::models::{CategorySchema, Dataset, MessageRecord};
use rusqlite::{params_from_iter, types::Value, Connection};
use std::path::Path;
use tracing::{debug, info};

/// Columns every table starts with; everything after them is a category.
pub const FIXED_COLUMNS: [&str; 4] = ["id", "message", "original", "genre"];

/// SQLite-backed single-table store for the cleaned dataset
pub struct SqliteStore {
    conn: Connection,
    table: String,
}

impl SqliteStore {
    /// Open (or create) the database file
    pub fn open(path: &Path, table: impl Into<String>) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "SQLite database opened");

        Ok(Self {
            conn,
            table: table.into(),
        })
    }

    /// In-memory store (for testing)
    pub fn open_in_memory(table: impl Into<String>) -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
            table: table.into(),
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Column names of the table in declaration order; empty when the table is missing
    pub fn columns(&self) -> Result<Vec<String>> {
        let sql = format!("PRAGMA table_info({})", quote_ident(&self.table));
        let mut stmt = self.conn.prepare(&sql)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names)
    }

    pub fn table_exists(&self) -> Result<bool> {
        Ok(!self.columns()?.is_empty())
    }

    /// Drop any existing table of the same name and write the dataset.
    ///
    /// Runs in a single transaction. Returns the number of rows written.
    pub fn replace_dataset(&mut self, dataset: &Dataset) -> Result<usize> {
        dataset.validate()?;
        for name in dataset.schema.iter() {
            if FIXED_COLUMNS.iter().any(|c| c.eq_ignore_ascii_case(name)) {
                return Err(AppError::Validation(format!(
                    "Category '{}' collides with a fixed column",
                    name
                )));
            }
        }

        let table = quote_ident(&self.table);
        let mut column_defs = vec![
            format!("{} INTEGER", quote_ident("id")),
            format!("{} TEXT", quote_ident("message")),
            format!("{} TEXT", quote_ident("original")),
            format!("{} TEXT", quote_ident("genre")),
        ];
        column_defs.extend(
            dataset
                .schema
                .iter()
                .map(|name| format!("{} INTEGER", quote_ident(name))),
        );

        let placeholders = (1..=column_defs.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let insert_sql = format!("INSERT INTO {} VALUES ({})", table, placeholders);

        let tx = self.conn.transaction()?;
        tx.execute(&format!("DROP TABLE IF EXISTS {}", table), [])?;
        tx.execute(
            &format!("CREATE TABLE {} ({})", table, column_defs.join(", ")),
            [],
        )?;

        {
            let mut stmt = tx.prepare(&insert_sql)?;
            for record in &dataset.records {
                let mut values = Vec::with_capacity(FIXED_COLUMNS.len() + record.flags.len());
                values.push(Value::Integer(record.id));
                values.push(Value::Text(record.message.clone()));
                values.push(
                    record
                        .original
                        .clone()
                        .map(Value::Text)
                        .unwrap_or(Value::Null),
                );
                values.push(Value::Text(record.genre.clone()));
                values.extend(record.flags.iter().map(|&f| Value::Integer(i64::from(f))));

                stmt.execute(params_from_iter(values))?;
            }
        }
        tx.commit()?;

        info!(
            table = %self.table,
            rows = dataset.len(),
            categories = dataset.schema.len(),
            "Table replaced"
        );

        Ok(dataset.len())
    }

    /// Read the whole table back. The schema comes from the column list.
    pub fn load_dataset(&self) -> Result<Dataset> {
        let columns = self.columns()?;
        if columns.is_empty() {
            return Err(AppError::NotFound(format!("Table '{}'", self.table)));
        }

        let prefix: Vec<&str> = columns.iter().take(FIXED_COLUMNS.len()).map(String::as_str).collect();
        if prefix != FIXED_COLUMNS {
            return Err(AppError::Validation(format!(
                "Table '{}' must start with columns {:?}, found {:?}",
                self.table, FIXED_COLUMNS, prefix
            )));
        }

        let schema = CategorySchema::new(columns[FIXED_COLUMNS.len()..].to_vec())?;
        let n_categories = schema.len();

        let sql = format!("SELECT * FROM {} ORDER BY rowid", quote_ident(&self.table));
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            let mut flags = Vec::with_capacity(n_categories);
            for idx in 0..n_categories {
                let value: i64 = row.get(FIXED_COLUMNS.len() + idx)?;
                flags.push(u8::try_from(value).unwrap_or(u8::MAX));
            }
            Ok(MessageRecord {
                id: row.get(0)?,
                message: row.get(1)?,
                original: row.get(2)?,
                genre: row.get(3)?,
                flags,
            })
        })?;

        let records = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        debug!(table = %self.table, rows = records.len(), "Table loaded");

        Dataset::new(schema, records)
    }
}

/// Quote an SQL identifier
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
