//! App Context

use std::sync::Arc;

use sqlx::migrate::MigrateError;
use thiserror::Error;

use crate::{
    database::{self, Db},
    domain::{
        carts::{CartsService, PgCartsService},
        lifecycle::{LifecycleService, PgLifecycleService, batch::BatchProcessor},
        products::{ProductsService, PgProductsService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migration(#[source] MigrateError),
}

#[derive(Clone)]
pub struct AppContext {
    pub carts: Arc<dyn CartsService>,
    pub products: Arc<dyn ProductsService>,
    pub lifecycle: Arc<dyn LifecycleService>,
}

impl AppContext {
    /// Build application context from a database URL, applying pending migrations.
    ///
    /// `batch_size` is the number of carts each lifecycle chunk processes.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection or migrating it fails.
    pub async fn from_database_url(url: &str, batch_size: usize) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        database::migrate(&pool)
            .await
            .map_err(AppInitError::Migration)?;

        Ok(Self::from_db(Db::new(pool), batch_size))
    }

    #[must_use]
    pub fn from_db(db: Db, batch_size: usize) -> Self {
        let processor = BatchProcessor::new(db.clone()).with_batch_size(batch_size);

        Self {
            carts: Arc::new(PgCartsService::new(db.clone())),
            products: Arc::new(PgProductsService::new(db)),
            lifecycle: Arc::new(PgLifecycleService::with_processor(processor)),
        }
    }
}
