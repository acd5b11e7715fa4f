use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the tables on startup when they do not exist yet. Idempotent, so
/// a restart against a populated database is a no-op.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS providers (
            id UUID PRIMARY KEY,
            external_id TEXT UNIQUE,
            email TEXT UNIQUE,
            phone TEXT UNIQUE,
            name TEXT,
            picture TEXT,
            verified BOOLEAN NOT NULL DEFAULT FALSE,
            company_name TEXT,
            tech_stack TEXT[] NOT NULL DEFAULT '{}',
            pricing_model TEXT,
            base_rate DOUBLE PRECISION,
            profile JSONB,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rfps (
            id UUID PRIMARY KEY,
            client_name TEXT NOT NULL,
            raw_text TEXT,
            budget DOUBLE PRECISION,
            deadline TIMESTAMPTZ,
            requirements TEXT[] NOT NULL DEFAULT '{}',
            status TEXT NOT NULL DEFAULT 'Uploaded',
            proposal JSONB,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema ensured");
    Ok(())
}
