use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use std::path::Path;

use crate::error::Result;

pub mod company;
pub mod competitor;
pub mod positioning;
pub mod signal;
pub mod snapshot;
pub mod usage;
pub mod user;

pub use usage::UsageEndpoint;

/// 统一访问层：公司、竞品、快照、信号与用户数据。
///
/// 所有方法均为 `async fn`，底层使用 SeaORM + SQLite。
pub struct IntelStore {
    pub(crate) db: DatabaseConnection,
}

impl IntelStore {
    /// 连接数据库并执行迁移。
    ///
    /// - `db_url`：完整连接 URL，例如 `sqlite:///var/lib/rivalwatch/rivalwatch.db?mode=rwc`
    /// - `data_dir`：本地数据目录，SQLite 文件默认放在这里
    pub async fn new(db_url: &str, data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;

        let mut options = ConnectOptions::new(db_url.to_owned());
        options.sqlx_logging(false);
        let db = Database::connect(options).await?;

        if db_url.starts_with("sqlite:") {
            db.execute_unprepared("PRAGMA journal_mode=WAL;").await?;
        }

        Migrator::up(&db, None).await?;
        tracing::info!(db_url = %db_url, "Initialized intel store");

        Ok(Self { db })
    }

    /// Default SQLite URL for a file inside `data_dir`.
    pub fn sqlite_url(data_dir: &Path) -> String {
        format!(
            "sqlite://{}?mode=rwc",
            data_dir.join("rivalwatch.db").display()
        )
    }

    pub(crate) fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Cheap liveness probe used by the health endpoint.
    pub async fn ping(&self) -> Result<()> {
        self.db.ping().await?;
        Ok(())
    }
}
