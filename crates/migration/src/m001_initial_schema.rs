use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m001_initial_schema"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // tables are created in foreign-key dependency order
        manager.get_connection().execute_unprepared(UP_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(DOWN_SQL)
            .await?;
        Ok(())
    }
}

const UP_SQL: &str = "
CREATE TABLE IF NOT EXISTS companies (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL COLLATE NOCASE UNIQUE,
    domain TEXT,
    website TEXT,
    headline TEXT,
    number_of_employees INTEGER,
    funding INTEGER,
    funding_stage TEXT,
    country TEXT,
    city TEXT,
    industry TEXT,
    linkedin_url TEXT,
    enriched_at TEXT,
    competitive_landscape TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_companies_domain ON companies(domain);

CREATE TABLE IF NOT EXISTS industries (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL COLLATE NOCASE UNIQUE,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS company_industries (
    company_id TEXT NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    industry_id TEXT NOT NULL REFERENCES industries(id) ON DELETE CASCADE,
    PRIMARY KEY (company_id, industry_id)
);

CREATE TABLE IF NOT EXISTS company_competitors (
    company_id TEXT NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    competitor_id TEXT NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    PRIMARY KEY (company_id, competitor_id),
    CHECK (company_id <> competitor_id)
);
CREATE INDEX IF NOT EXISTS idx_company_competitors_competitor ON company_competitors(competitor_id);

CREATE TABLE IF NOT EXISTS company_snapshots (
    id TEXT PRIMARY KEY NOT NULL,
    company_id TEXT NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    competitor_id TEXT NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    data TEXT NOT NULL,
    created_at TEXT NOT NULL,
    CHECK (company_id <> competitor_id)
);
CREATE INDEX IF NOT EXISTS idx_company_snapshots_pair ON company_snapshots(company_id, competitor_id, created_at DESC);

CREATE TABLE IF NOT EXISTS company_signals (
    id TEXT PRIMARY KEY NOT NULL,
    company_id TEXT NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    competitor_id TEXT NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    signal_type TEXT NOT NULL,
    category TEXT NOT NULL CHECK (category IN ('hiring', 'product', 'funding')),
    severity TEXT NOT NULL CHECK (severity IN ('low', 'medium', 'high')),
    message TEXT NOT NULL,
    details TEXT,
    is_new INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    CHECK (company_id <> competitor_id)
);
CREATE INDEX IF NOT EXISTS idx_company_signals_company ON company_signals(company_id, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_company_signals_unread ON company_signals(company_id, is_new);

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY NOT NULL,
    email TEXT NOT NULL COLLATE NOCASE UNIQUE,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    role TEXT,
    company_id TEXT REFERENCES companies(id) ON DELETE SET NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_users_company ON users(company_id);

CREATE TABLE IF NOT EXISTS market_positionings (
    company_id TEXT PRIMARY KEY NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    value_proposition TEXT NOT NULL,
    competitive_edge TEXT NOT NULL,
    brand_perception TEXT NOT NULL,
    key_segments TEXT NOT NULL,
    weaknesses TEXT NOT NULL,
    opportunity_areas TEXT NOT NULL,
    summary TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS enrichment_usage (
    id TEXT PRIMARY KEY NOT NULL,
    company_id TEXT REFERENCES companies(id) ON DELETE SET NULL,
    endpoint TEXT NOT NULL,
    domain TEXT NOT NULL,
    credits INTEGER NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_enrichment_usage_company ON enrichment_usage(company_id);
";

const DOWN_SQL: &str = "
DROP TABLE IF EXISTS enrichment_usage;
DROP TABLE IF EXISTS market_positionings;
DROP TABLE IF EXISTS users;
DROP TABLE IF EXISTS company_signals;
DROP TABLE IF EXISTS company_snapshots;
DROP TABLE IF EXISTS company_competitors;
DROP TABLE IF EXISTS company_industries;
DROP TABLE IF EXISTS industries;
DROP TABLE IF EXISTS companies;
";
