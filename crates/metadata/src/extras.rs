//! Lookaside cache for derived per-title fields.
//!
//! Callers follow lookup, then derive on a miss, then upsert on success. Entries
//! never expire. Two requests racing on the same id may both derive; the later
//! upsert wins.

use marquee_core::config::Config;
use marquee_db::repo::extras::{self, ExtrasFields, ExtrasRecord};
use sqlx::SqlitePool;

use crate::MetadataError;

#[derive(Clone)]
pub struct ExtrasCache {
    pool: SqlitePool,
}

impl ExtrasCache {
    /// Connect to the configured store and bring its schema up to date.
    pub async fn open(config: &Config) -> Result<Self, MetadataError> {
        let pool = marquee_db::connect(&config.db_path).await?;
        marquee_db::migrate::run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Stored record for `tmdb_id`, if any. Never derives anything.
    pub async fn lookup(&self, tmdb_id: i64) -> Result<Option<ExtrasRecord>, MetadataError> {
        Ok(extras::lookup(&self.pool, tmdb_id).await?)
    }

    pub async fn upsert(
        &self,
        tmdb_id: i64,
        fields: &ExtrasFields,
    ) -> Result<ExtrasRecord, MetadataError> {
        Ok(extras::upsert(&self.pool, tmdb_id, fields).await?)
    }
}
