//! Object-storage notifications, routed by the folder of the object key.
//!
//! ```text
//! uploads/2024/report.csv  → /uploads/2024
//! report.csv               → /
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::response::{Ack, BoxResponse};
use crate::routing::router::EventRouter;
use crate::routing::table::RouteTable;
use crate::routing::types::{EventSource, InputError, RouterError, RouterResult};
use crate::sources::{optional_str, record, required_str};

/// View over the first record of an S3 notification.
#[derive(Debug, Clone, Copy)]
pub struct StorageInput<'e> {
    event: &'e Value,
    record: &'e Value,
    key: &'e str,
}

impl<'e> StorageInput<'e> {
    pub fn parse(event: &'e Value) -> Result<Self, InputError> {
        let record = record(event)?;
        let key = required_str(record, &["s3", "object", "key"], "s3.object.key")?;
        Ok(Self { event, record, key })
    }

    /// Full object key, e.g. `uploads/2024/report.csv`.
    pub fn object_key_path(&self) -> &'e str {
        self.key
    }

    /// Last segment of the object key, e.g. `report.csv`.
    pub fn object_key(&self) -> &'e str {
        self.key.rsplit('/').next().unwrap_or(self.key)
    }

    /// Folder of the object key; the route key.
    pub fn folder(&self) -> String {
        folder_of(self.key)
    }

    pub fn bucket(&self) -> Option<&'e str> {
        optional_str(self.record, &["s3", "bucket", "name"])
    }

    /// Notification type, e.g. `ObjectCreated:Put`.
    pub fn event_name(&self) -> Option<&'e str> {
        optional_str(self.record, &["eventName"])
    }

    pub fn size(&self) -> Option<u64> {
        self.record.get("s3")?.get("object")?.get("size")?.as_u64()
    }

    pub fn event(&self) -> &'e Value {
        self.event
    }
}

/// Strip the last path segment, prefix `/`, drop trailing slashes.
fn folder_of(key: &str) -> String {
    let dir = key.rfind('/').map_or("", |end| &key[..end]);
    let dir = dir.trim_matches('/');
    if dir.is_empty() {
        "/".to_string()
    } else {
        format!("/{dir}")
    }
}

pub type StorageHandler = Arc<dyn Fn(&StorageInput<'_>) -> Ack + Send + Sync>;

/// Routes S3 notifications to handlers by object folder.
#[derive(Clone)]
pub struct StorageRouter {
    routes: RouteTable<StorageHandler>,
}

impl StorageRouter {
    pub fn new() -> Self {
        Self {
            routes: RouteTable::new(EventSource::Storage),
        }
    }

    /// Register the handler for a folder such as `/uploads`.
    pub fn on<F>(mut self, folder: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&StorageInput<'_>) -> Ack + Send + Sync + 'static,
    {
        self.routes.insert(folder, Arc::new(handler));
        self
    }

    pub fn keys(&self) -> Vec<&str> {
        self.routes.keys()
    }

    pub fn dispatch(&self, event: &Value) -> RouterResult<Ack> {
        let input =
            StorageInput::parse(event).map_err(RouterError::malformed(EventSource::Storage))?;
        let folder = input.folder();
        let handler = self.routes.resolve(&folder)?;
        tracing::debug!(
            folder = %folder,
            object_key = %input.object_key_path(),
            "Dispatching storage route"
        );
        Ok(handler(&input))
    }
}

impl Default for StorageRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRouter for StorageRouter {
    fn route(&self, event: &Value) -> RouterResult<BoxResponse> {
        self.dispatch(event).map(|ack| Box::new(ack) as BoxResponse)
    }
}

impl fmt::Debug for StorageRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageRouter")
            .field("routes", &self.routes.keys())
            .finish()
    }
}
