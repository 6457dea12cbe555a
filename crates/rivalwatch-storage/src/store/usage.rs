use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QuerySelect};

use crate::entities::enrichment_usage::{self, Column, Entity};
use crate::error::Result;
use crate::store::IntelStore;

/// Paid provider endpoint a credit charge belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageEndpoint {
    Enrich,
    Similar,
}

impl UsageEndpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enrich => "enrich",
            Self::Similar => "similar",
        }
    }
}

impl IntelStore {
    /// Appends a credit charge to the ledger. Zero-credit calls are not
    /// recorded.
    pub async fn record_usage(
        &self,
        company_id: Option<&str>,
        endpoint: UsageEndpoint,
        domain: &str,
        credits: i64,
    ) -> Result<()> {
        if credits <= 0 {
            return Ok(());
        }
        enrichment_usage::ActiveModel {
            id: Set(rivalwatch_common::id::next_id()),
            company_id: Set(company_id.map(str::to_owned)),
            endpoint: Set(endpoint.as_str().to_owned()),
            domain: Set(domain.to_owned()),
            credits: Set(credits),
            created_at: Set(Utc::now().fixed_offset()),
        }
        .insert(self.db())
        .await?;
        tracing::info!(
            endpoint = endpoint.as_str(),
            domain = %domain,
            credits,
            "Recorded enrichment credits"
        );
        Ok(())
    }

    /// Credits charged on behalf of one company.
    pub async fn credits_for_company(&self, company_id: &str) -> Result<i64> {
        let rows: Vec<i64> = Entity::find()
            .select_only()
            .column(Column::Credits)
            .filter(Column::CompanyId.eq(company_id))
            .into_tuple()
            .all(self.db())
            .await?;
        Ok(rows.into_iter().sum())
    }

    pub async fn total_credits(&self) -> Result<i64> {
        let rows: Vec<i64> = Entity::find()
            .select_only()
            .column(Column::Credits)
            .into_tuple()
            .all(self.db())
            .await?;
        Ok(rows.into_iter().sum())
    }
}
