//! Document Store
//!
//! A single-table document collection over an in-memory [`SqliteEngine`].
//!
//! ## Responsibilities
//! - Hydrate the engine from the loader once, falling back to empty
//! - Keep the `(id TEXT, data TEXT)` table in place
//! - Encode documents on the way in and decode them on the way out
//! - Enforce id uniqueness on insert
//! - Flush a full engine image to the writer after every mutation
//!
//! ## Lifecycle
//! ```text
//!   new() ──► Uninitialized ──load()──► Ready
//!                   │                     │
//!          every op but load         load() is a no-op
//!          fails with NotReady
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::types::Value as SqlValue;
use rusqlite::Row;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::codec;
use crate::config::StoreConfig;
use crate::engine::{to_sql_value, ExecOutcome, SqliteEngine};
use crate::error::{DocStoreError, Result};
use crate::hooks::{Loader, Writer};
use crate::id::IdGenerator;

/// Draws of the id generator before a collision is reported
const MAX_ID_ATTEMPTS: usize = 8;

/// Result of [`DocumentStore::get`]
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Every row in engine order; undecodable rows keep their slot as `None`
    All(Vec<Option<Value>>),

    /// Decoded data of the first row matching the filter
    One(Value),

    /// The filter matched nothing, or the first match did not decode
    Absent,
}

impl Lookup {
    /// True for [`Lookup::Absent`]
    pub fn is_absent(&self) -> bool {
        matches!(self, Lookup::Absent)
    }

    /// The single matched document, if this is a filtered hit
    pub fn into_one(self) -> Option<Value> {
        match self {
            Lookup::One(value) => Some(value),
            _ => None,
        }
    }

    /// The full table, if this is an unfiltered read
    pub fn into_all(self) -> Option<Vec<Option<Value>>> {
        match self {
            Lookup::All(values) => Some(values),
            _ => None,
        }
    }
}

/// Result of a successful insert
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertOutcome {
    /// The id the document was stored under
    pub id: String,

    /// The document exactly as given
    pub data: Value,

    /// Engine outcome of the INSERT
    #[serde(flatten)]
    pub outcome: ExecOutcome,
}

/// Result of a save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// No writer is configured
    Skipped,

    /// The writer accepted an image of this many bytes
    Written { bytes: usize },
}

enum State {
    Uninitialized,
    Ready(SqliteEngine),
}

/// How a mutating statement binds its parameters
enum Bind<'a> {
    Named(Option<&'a Map<String, Value>>),
    Positional(&'a [SqlValue]),
}

/// A document collection backed by one table
///
/// ## Concurrency
/// All engine access goes through one mutex, held for the whole operation
/// including hook calls. Insert's existence check and write therefore run
/// as one unit. Hooks must not call back into the same store.
pub struct DocumentStore {
    /// Table name, fixed at construction
    name: String,

    loader: Option<Arc<dyn Loader>>,
    writer: Option<Arc<dyn Writer>>,
    id_generator: Arc<dyn IdGenerator>,

    state: Mutex<State>,
}

impl DocumentStore {
    /// Create an unloaded store
    pub fn new(config: StoreConfig) -> Self {
        Self {
            name: config.name,
            loader: config.loader,
            writer: config.writer,
            id_generator: config.id_generator,
            state: Mutex::new(State::Uninitialized),
        }
    }

    /// Create a store and load it
    pub fn open(config: StoreConfig) -> Result<Self> {
        let store = Self::new(config);
        store.load()?;
        Ok(store)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Hydrate the engine and ensure the table exists
    ///
    /// Loader failures and unusable images are logged and replaced by an
    /// empty database. Creating the table goes through the mutation path,
    /// so a configured writer receives one image. Calling this on a loaded
    /// store does nothing.
    pub fn load(&self) -> Result<()> {
        let mut state = self.state.lock();
        if let State::Ready(_) = *state {
            tracing::trace!("Store '{}' already loaded", self.name);
            return Ok(());
        }

        let engine = match self.hydrate() {
            Some(engine) => engine,
            None => SqliteEngine::open_in_memory()?,
        };
        *state = State::Ready(engine);

        let engine = ready(&state)?;
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (id TEXT, data TEXT)",
            self.name
        );
        self.apply(engine, &sql, Bind::Named(None))?;

        tracing::debug!("Store '{}' loaded", self.name);
        Ok(())
    }

    /// Whether `load()` has completed
    pub fn is_ready(&self) -> bool {
        matches!(*self.state.lock(), State::Ready(_))
    }

    /// Name of the backing table
    pub fn name(&self) -> &str {
        &self.name
    }

    fn hydrate(&self) -> Option<SqliteEngine> {
        let loader = self.loader.as_ref()?;

        let image = match loader.load() {
            Ok(Some(image)) if !image.is_empty() => image,
            Ok(_) => {
                tracing::debug!("No saved image for '{}', starting empty", self.name);
                return None;
            }
            Err(e) => {
                tracing::warn!("Loader failed for '{}', starting empty: {}", self.name, e);
                return None;
            }
        };

        match SqliteEngine::from_snapshot(&image) {
            Ok(engine) => {
                tracing::debug!("Hydrated '{}' from {} byte image", self.name, image.len());
                Some(engine)
            }
            Err(e) => {
                tracing::warn!("Discarding unusable image for '{}': {}", self.name, e);
                None
            }
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Run a raw statement with named parameters, then save
    ///
    /// Parameters are written `:name`, `@name` or `$name` in the statement
    /// and looked up by bare name in `params`.
    #[doc(alias = "e")]
    pub fn execute(&self, sql: &str, params: Option<&Map<String, Value>>) -> Result<ExecOutcome> {
        let state = self.state.lock();
        let engine = ready(&state)?;
        self.apply(engine, sql, Bind::Named(params))
    }

    /// Read documents
    ///
    /// Without a filter (or with an empty one) every row is returned. With
    /// a filter, each entry becomes an equality condition and only the
    /// first matching row is returned.
    pub fn get(&self, filter: Option<&Map<String, Value>>) -> Result<Lookup> {
        let state = self.state.lock();
        let engine = ready(&state)?;

        let filter = match filter {
            Some(filter) if !filter.is_empty() => filter,
            _ => {
                let sql = format!("SELECT data FROM {}", self.name);
                return Ok(Lookup::All(engine.query(&sql, &[], decode_data)?));
            }
        };

        let (clause, params) = where_clause(filter)?;
        let sql = format!("SELECT data FROM {} WHERE {} LIMIT 1", self.name, clause);
        tracing::trace!("Query on '{}': {}", self.name, clause);

        match engine.query(&sql, &params, decode_data)?.pop() {
            Some(Some(value)) => Ok(Lookup::One(value)),
            _ => Ok(Lookup::Absent),
        }
    }

    /// Fetch one document by id
    pub fn get_by_id(&self, id: &str) -> Result<Option<Value>> {
        let mut filter = Map::new();
        filter.insert("id".to_string(), Value::String(id.to_string()));
        Ok(self.get(Some(&filter))?.into_one())
    }

    /// Fetch every document in engine order
    pub fn all(&self) -> Result<Vec<Option<Value>>> {
        Ok(self.get(None)?.into_all().unwrap_or_default())
    }

    /// Store a new document
    ///
    /// A truthy `id` field (non-empty string or non-zero number) is used as
    /// the id; otherwise one is generated. The document is stored as given,
    /// without a generated id being added to it.
    pub fn insert(&self, document: &Value) -> Result<InsertOutcome> {
        let fields = match document.as_object() {
            Some(fields) if !fields.is_empty() => fields,
            Some(_) => {
                return Err(DocStoreError::InvalidInput(
                    "cannot insert an empty object".to_string(),
                ))
            }
            None => {
                return Err(DocStoreError::InvalidInput(format!(
                    "document must be a JSON object, got {}",
                    document
                )))
            }
        };

        let state = self.state.lock();
        let engine = ready(&state)?;

        let id = match supplied_id(fields.get("id"))? {
            Some(id) => {
                if self.contains(engine, &id)? {
                    return Err(DocStoreError::DuplicateId(id));
                }
                id
            }
            None => self.fresh_id(engine)?,
        };

        let data = codec::encode(document)
            .map(SqlValue::Text)
            .unwrap_or(SqlValue::Null);
        let sql = format!("INSERT INTO {} (id, data) VALUES (?1, ?2)", self.name);
        let outcome = self.apply(
            engine,
            &sql,
            Bind::Positional(&[SqlValue::Text(id.clone()), data]),
        )?;

        tracing::debug!("Inserted '{}' into '{}'", id, self.name);
        Ok(InsertOutcome {
            id,
            data: document.clone(),
            outcome,
        })
    }

    /// Remove a document by id
    ///
    /// Deleting an id that does not exist is not an error and still saves.
    /// Returns `true` once the id no longer resolves.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let state = self.state.lock();
        let engine = ready(&state)?;

        let sql = format!("DELETE FROM {} WHERE id = ?1", self.name);
        let outcome = self.apply(
            engine,
            &sql,
            Bind::Positional(&[SqlValue::Text(id.to_string())]),
        )?;

        if self.contains(engine, id)? {
            return Err(DocStoreError::DeleteFailed(id.to_string()));
        }

        tracing::debug!("Deleted '{}' from '{}' ({} rows)", id, self.name, outcome.changes);
        Ok(true)
    }

    /// Serialize the full engine state
    pub fn raw(&self) -> Result<Vec<u8>> {
        let state = self.state.lock();
        ready(&state)?.snapshot()
    }

    /// Hand the full engine state to the writer
    pub fn save(&self) -> Result<SaveOutcome> {
        let state = self.state.lock();
        let engine = ready(&state)?;
        self.save_engine(engine)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Run a mutating statement and save. Every mutation goes through here.
    fn apply(&self, engine: &SqliteEngine, sql: &str, bind: Bind<'_>) -> Result<ExecOutcome> {
        let outcome = match bind {
            Bind::Named(params) => engine.execute_named(sql, params)?,
            Bind::Positional(params) => engine.execute(sql, params)?,
        };
        self.save_engine(engine)?;
        Ok(outcome)
    }

    fn save_engine(&self, engine: &SqliteEngine) -> Result<SaveOutcome> {
        let Some(writer) = &self.writer else {
            return Ok(SaveOutcome::Skipped);
        };

        let image = engine.snapshot()?;
        writer.write(&image)?;

        tracing::trace!("Saved '{}' ({} bytes)", self.name, image.len());
        Ok(SaveOutcome::Written { bytes: image.len() })
    }

    fn contains(&self, engine: &SqliteEngine, id: &str) -> Result<bool> {
        let sql = format!("SELECT 1 FROM {} WHERE id = ?1 LIMIT 1", self.name);
        let rows = engine.query(&sql, &[SqlValue::Text(id.to_string())], |_| Ok(()))?;
        Ok(!rows.is_empty())
    }

    fn fresh_id(&self, engine: &SqliteEngine) -> Result<String> {
        let mut last = String::new();
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.id_generator.generate();
            if !id.is_empty() && !self.contains(engine, &id)? {
                return Ok(id);
            }
            tracing::debug!("Generated id '{}' already taken in '{}'", id, self.name);
            last = id;
        }
        Err(DocStoreError::DuplicateId(last))
    }
}

fn ready(state: &State) -> Result<&SqliteEngine> {
    match state {
        State::Ready(engine) => Ok(engine),
        State::Uninitialized => Err(DocStoreError::NotReady),
    }
}

fn decode_data(row: &Row<'_>) -> Result<Option<Value>> {
    Ok(codec::decode_cell(row.get_ref(0)?))
}

/// Resolve a caller-supplied id; `None` means one should be generated
fn supplied_id(value: Option<&Value>) -> Result<Option<String>> {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Ok(None),
        Some(Value::Number(n)) => Ok(Some(number_id(n))),
        Some(other) => Err(DocStoreError::InvalidInput(format!(
            "id must be a string or number, got {}",
            other
        ))),
    }
}

/// Render a numeric id; whole floats drop their fraction so `1.0` and `1`
/// resolve to the same id
fn number_id(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            (f as i64).to_string()
        }
        _ => n.to_string(),
    }
}

/// Build `k1 = ? AND k2 = ?` with positional values
fn where_clause(filter: &Map<String, Value>) -> Result<(String, Vec<SqlValue>)> {
    let mut conditions = Vec::with_capacity(filter.len());
    let mut params = Vec::with_capacity(filter.len());

    for (key, value) in filter {
        if !is_identifier(key) {
            return Err(DocStoreError::InvalidInput(format!(
                "filter key '{}' is not a column name",
                key
            )));
        }
        conditions.push(format!("{} = ?", key));
        params.push(to_sql_value(value));
    }

    Ok((conditions.join(" AND "), params))
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
