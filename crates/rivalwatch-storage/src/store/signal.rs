use chrono::Utc;
use rivalwatch_common::types::{Signal, SignalCategory, UnreadCounts};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::entities::company_signal::{self, Column, Entity};
use crate::error::{Result, StorageError};
use crate::store::IntelStore;

pub(crate) fn to_signal(m: company_signal::Model) -> Result<Signal> {
    let category = m
        .category
        .parse()
        .map_err(|_| StorageError::UnexpectedValue {
            column: "category",
            value: m.category.clone(),
        })?;
    let severity = m
        .severity
        .parse()
        .map_err(|_| StorageError::UnexpectedValue {
            column: "severity",
            value: m.severity.clone(),
        })?;
    let details = m.details.as_deref().map(serde_json::from_str).transpose()?;

    Ok(Signal {
        id: m.id,
        company_id: m.company_id,
        competitor_id: m.competitor_id,
        signal_type: m.signal_type,
        category,
        severity,
        message: m.message,
        details,
        is_new: m.is_new,
        created_at: m.created_at.with_timezone(&Utc),
    })
}

impl IntelStore {
    /// Signals for a company, newest first, optionally restricted to one
    /// category.
    pub async fn list_signals(
        &self,
        company_id: &str,
        category: Option<SignalCategory>,
        limit: u64,
    ) -> Result<Vec<Signal>> {
        let mut query = Entity::find().filter(Column::CompanyId.eq(company_id));
        if let Some(category) = category {
            query = query.filter(Column::Category.eq(category.as_str()));
        }
        let models = query
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .limit(limit)
            .all(self.db())
            .await?;
        models.into_iter().map(to_signal).collect()
    }

    pub async fn list_competitor_signals(
        &self,
        company_id: &str,
        competitor_id: &str,
        limit: u64,
    ) -> Result<Vec<Signal>> {
        let models = Entity::find()
            .filter(Column::CompanyId.eq(company_id))
            .filter(Column::CompetitorId.eq(competitor_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .limit(limit)
            .all(self.db())
            .await?;
        models.into_iter().map(to_signal).collect()
    }

    /// Unread (`is_new`) signal counts grouped by category.
    pub async fn count_unread_signals(&self, company_id: &str) -> Result<UnreadCounts> {
        let categories: Vec<String> = Entity::find()
            .select_only()
            .column(Column::Category)
            .filter(Column::CompanyId.eq(company_id))
            .filter(Column::IsNew.eq(true))
            .into_tuple()
            .all(self.db())
            .await?;

        let mut counts = UnreadCounts::default();
        for raw in categories {
            match raw.parse::<SignalCategory>() {
                Ok(category) => counts.add(category, 1),
                Err(e) => tracing::warn!(error = %e, "Skipping signal with unknown category"),
            }
        }
        Ok(counts)
    }

    /// Flips `is_new` to false for the company's unread signals. Returns the
    /// number of signals that changed.
    pub async fn mark_signals_read(
        &self,
        company_id: &str,
        category: Option<SignalCategory>,
    ) -> Result<u64> {
        let mut update = Entity::update_many()
            .col_expr(Column::IsNew, Expr::value(false))
            .filter(Column::CompanyId.eq(company_id))
            .filter(Column::IsNew.eq(true));
        if let Some(category) = category {
            update = update.filter(Column::Category.eq(category.as_str()));
        }
        let res = update.exec(self.db()).await?;
        Ok(res.rows_affected)
    }
}
