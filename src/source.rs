//! Upstream "fetch a collection snapshot" capability.
//!
//! The cache's only dependency on the rest of the system: a read-only fetch
//! of one named collection, returning raw JSON rows. `Ok(None)` is a
//! not-found/empty answer and is treated exactly like an empty list by the
//! loader; only genuine transport or decode failures surface as errors, and
//! those are contained per collection during a warm.

use std::future::Future;
use std::io;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

use crate::model::Collection;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path}: expected a JSON array of records")]
    Shape { path: PathBuf },
    #[error("upstream: {0}")]
    Upstream(String),
}

pub trait CollectionSource: Send + Sync {
    fn fetch(
        &self,
        collection: Collection,
    ) -> impl Future<Output = Result<Option<Vec<Value>>, SourceError>> + Send;
}

/// Snapshot source reading `<root>/<collection>.json` files.
///
/// Backs the `bss` binary and the test fixtures; production embedders inject
/// their own [`CollectionSource`] over the hosted database.
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    root: PathBuf,
}

impl JsonDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl CollectionSource for JsonDirSource {
    async fn fetch(&self, collection: Collection) -> Result<Option<Vec<Value>>, SourceError> {
        let path = self.root.join(format!("{}.json", collection.name()));
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SourceError::Io { path, source: e }),
        };
        let value: Value = serde_json::from_slice(&bytes).map_err(|e| SourceError::Decode {
            path: path.clone(),
            source: e,
        })?;
        match value {
            Value::Array(rows) => Ok(Some(rows)),
            Value::Null => Ok(None),
            _ => Err(SourceError::Shape { path }),
        }
    }
}
