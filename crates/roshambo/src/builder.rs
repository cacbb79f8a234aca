//! Entry point: configures the store and engine and wires them up.

use roshambo_engine::{Pool, UpdateReceiver, DEFAULT_QUEUE_CAPACITY};
use roshambo_store::Store;

use crate::RoshamboError;

/// Marker type carrying the builder constructor, mirroring how the
/// engine is referred to in prose: "a Roshambo instance" is a [`Pool`]
/// plus the receiver end of its update queue.
pub struct Roshambo;

impl Roshambo {
    /// Creates a new builder with default settings.
    pub fn builder() -> RoshamboBuilder {
        RoshamboBuilder::new()
    }
}

/// Builder for the session core.
///
/// # Example
///
/// ```rust,no_run
/// use roshambo::Roshambo;
///
/// # async fn demo() -> Result<(), roshambo::RoshamboError> {
/// let (pool, updates) = Roshambo::builder()
///     .database_path("roshambo.db")
///     .queue_capacity(256)
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct RoshamboBuilder {
    database_path: Option<String>,
    queue_capacity: usize,
}

impl RoshamboBuilder {
    /// Creates a builder with an in-memory database and the default
    /// queue capacity.
    pub fn new() -> Self {
        Self {
            database_path: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    /// Sets the SQLite database file, created if missing. Without this
    /// the core runs on a private in-memory database that vanishes on
    /// shutdown.
    pub fn database_path(mut self, path: impl Into<String>) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Sets the notification queue depth. Updates beyond it are
    /// dropped while the consumer lags.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Opens the store, runs the schema migration, and builds the
    /// engine over it.
    pub async fn build(self) -> Result<(Pool, UpdateReceiver), RoshamboError> {
        let store = match &self.database_path {
            Some(path) => Store::open(path).await?,
            None => Store::open_in_memory().await?,
        };
        tracing::info!(
            persistent = self.database_path.is_some(),
            queue_capacity = self.queue_capacity,
            "session core ready"
        );
        Ok(Pool::with_queue_capacity(store, self.queue_capacity))
    }
}

impl Default for RoshamboBuilder {
    fn default() -> Self {
        Self::new()
    }
}
