//! Shared application state.

use std::sync::Arc;

use chrono::Local;
use tracing::info;

use fyle_core::{CategoryCatalog, FyleConfig, Result};
use fyle_ingest::Ingester;
use fyle_remind::{MemorySink, ReminderPlanner, ReminderScheduler};
use fyle_share::ShareExchange;
use fyle_store::SqliteStore;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: FyleConfig,
    pub store: SqliteStore,
    pub catalog: CategoryCatalog,
    pub sink: Arc<MemorySink>,
    pub reminders: ReminderScheduler<Local>,
}

impl AppState {
    /// Build state around an opened store, seeding the builtin catalog.
    pub fn new(config: FyleConfig, store: SqliteStore) -> Result<Self> {
        let catalog = CategoryCatalog::builtin();
        let seeded = store.seed_catalog(&catalog)?;
        if seeded > 0 {
            info!("Seeded {} categories", seeded);
        }

        let sink = Arc::new(MemorySink::new());
        let planner = ReminderPlanner::new(Local, config.reminder_hour);
        let reminders = ReminderScheduler::new(planner, sink.clone());

        Ok(Self {
            config,
            store,
            catalog,
            sink,
            reminders,
        })
    }

    pub fn ingester(&self) -> Ingester<'_> {
        Ingester::new(&self.store, &self.catalog, &self.config.extractor)
    }

    pub fn exchange(&self) -> ShareExchange<'_> {
        ShareExchange::new(&self.store)
    }
}
