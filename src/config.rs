//! Configuration for a document store
//!
//! One store owns one table; the config names it and wires in the
//! persistence hooks and id generator.

use std::fmt;
use std::sync::Arc;

use crate::error::{DocStoreError, Result};
use crate::hooks::{Loader, Writer};
use crate::id::{IdGenerator, RandomIds};

/// Configuration for a [`DocumentStore`](crate::DocumentStore)
#[derive(Clone)]
pub struct StoreConfig {
    // -------------------------------------------------------------------------
    // Table Configuration
    // -------------------------------------------------------------------------
    /// Name of the single table backing the store
    ///
    /// Interpolated into statement text as-is. Never pass untrusted input.
    pub name: String,

    // -------------------------------------------------------------------------
    // Persistence Configuration
    // -------------------------------------------------------------------------
    /// Invoked once on `load()` to hydrate the engine
    pub loader: Option<Arc<dyn Loader>>,

    /// Invoked with the full engine image after every mutation
    pub writer: Option<Arc<dyn Writer>>,

    // -------------------------------------------------------------------------
    // Identity Configuration
    // -------------------------------------------------------------------------
    /// Generates ids for documents inserted without one
    pub id_generator: Arc<dyn IdGenerator>,
}

impl StoreConfig {
    /// Config for `name` with no hooks and random 4-byte ids
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            loader: None,
            writer: None,
            id_generator: Arc::new(RandomIds::default()),
        }
    }

    /// Create a new config builder
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("name", &self.name)
            .field("loader", &self.loader.is_some())
            .field("writer", &self.writer.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for StoreConfig
#[derive(Default)]
pub struct StoreConfigBuilder {
    name: Option<String>,
    loader: Option<Arc<dyn Loader>>,
    writer: Option<Arc<dyn Writer>>,
    id_generator: Option<Arc<dyn IdGenerator>>,
}

impl StoreConfigBuilder {
    /// Set the table name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the hydration hook
    pub fn loader<L: Loader + 'static>(mut self, loader: L) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    /// Set the save hook
    pub fn writer<W: Writer + 'static>(mut self, writer: W) -> Self {
        self.writer = Some(Arc::new(writer));
        self
    }

    /// Use one object as both loader and writer
    pub fn sink<S: Loader + Writer + 'static>(mut self, sink: S) -> Self {
        let sink = Arc::new(sink);
        self.loader = Some(sink.clone() as Arc<dyn Loader>);
        self.writer = Some(sink as Arc<dyn Writer>);
        self
    }

    /// Set the id generator
    pub fn id_generator<G: IdGenerator + 'static>(mut self, generator: G) -> Self {
        self.id_generator = Some(Arc::new(generator));
        self
    }

    /// Build the config, rejecting a missing or empty table name
    pub fn build(self) -> Result<StoreConfig> {
        let name = match self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => {
                return Err(DocStoreError::Config(
                    "table name must not be empty".to_string(),
                ))
            }
        };

        Ok(StoreConfig {
            name,
            loader: self.loader,
            writer: self.writer,
            id_generator: self
                .id_generator
                .unwrap_or_else(|| Arc::new(RandomIds::default())),
        })
    }
}
