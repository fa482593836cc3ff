//! PostgreSQL-backed identity store.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use super::{
    IdentityStore,
    errors::{Result, StoreError},
    models::IdentityRecord,
};

pub struct PostgresIdentityStore {
    pool: PgPool,
}

impl PostgresIdentityStore {
    /// Connect to the database and run pending migrations
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        crate::migrator().run(&pool).await.map_err(anyhow::Error::from)?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PostgresIdentityStore {
    #[instrument(skip(self), err)]
    async fn find_history(&self, email: &str) -> Result<Vec<IdentityRecord>> {
        let records = sqlx::query_as::<_, IdentityRecord>(
            r#"
            SELECT email, version_stamp, password_hash, name, profile_image_url, created_at
            FROM identities
            WHERE email = $1
            ORDER BY version_stamp DESC
            "#,
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)?;

        Ok(records)
    }

    #[instrument(skip(self, record), fields(email = %record.email, version_stamp = %record.version_stamp), err)]
    async fn put(&self, record: IdentityRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO identities (email, version_stamp, password_hash, name, profile_image_url, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (email, version_stamp) DO UPDATE SET
                password_hash = EXCLUDED.password_hash,
                name = EXCLUDED.name,
                profile_image_url = EXCLUDED.profile_image_url
            "#,
        )
        .bind(&record.email)
        .bind(&record.version_stamp)
        .bind(&record.password_hash)
        .bind(&record.name)
        .bind(&record.profile_image_url)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;

        Ok(())
    }
}
