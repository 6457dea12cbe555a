use chrono::Utc;
use rivalwatch_common::types::{Signal, SignalDraft, Snapshot};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use serde_json::Value;

use crate::entities::{company_signal, company_snapshot};
use crate::error::{Result, StorageError};
use crate::store::signal::to_signal;
use crate::store::IntelStore;

fn to_snapshot(m: company_snapshot::Model) -> Result<Snapshot> {
    Ok(Snapshot {
        data: serde_json::from_str(&m.data)?,
        id: m.id,
        company_id: m.company_id,
        competitor_id: m.competitor_id,
        created_at: m.created_at.with_timezone(&Utc),
    })
}

async fn latest_on<C: ConnectionTrait>(
    db: &C,
    company_id: &str,
    competitor_id: &str,
) -> Result<Option<Snapshot>> {
    let model = company_snapshot::Entity::find()
        .filter(company_snapshot::Column::CompanyId.eq(company_id))
        .filter(company_snapshot::Column::CompetitorId.eq(competitor_id))
        .order_by_desc(company_snapshot::Column::CreatedAt)
        .order_by_desc(company_snapshot::Column::Id)
        .one(db)
        .await?;
    model.map(to_snapshot).transpose()
}

impl IntelStore {
    /// Most recent snapshot of `competitor_id` captured for `company_id`.
    pub async fn latest_snapshot(
        &self,
        company_id: &str,
        competitor_id: &str,
    ) -> Result<Option<Snapshot>> {
        latest_on(self.db(), company_id, competitor_id).await
    }

    /// All snapshots of a competitor, oldest first.
    pub async fn list_snapshots(&self, company_id: &str, competitor_id: &str) -> Result<Vec<Snapshot>> {
        let models = company_snapshot::Entity::find()
            .filter(company_snapshot::Column::CompanyId.eq(company_id))
            .filter(company_snapshot::Column::CompetitorId.eq(competitor_id))
            .order_by_asc(company_snapshot::Column::CreatedAt)
            .order_by_asc(company_snapshot::Column::Id)
            .all(self.db())
            .await?;
        models.into_iter().map(to_snapshot).collect()
    }

    /// Appends a snapshot and persists the signals derived from it, in one
    /// transaction.
    ///
    /// `derive` receives the immediately preceding snapshot document (if
    /// any) and the new one. It runs exactly once per captured snapshot, so
    /// a pair of snapshots can never emit signals twice.
    pub async fn capture_snapshot<F>(
        &self,
        company_id: &str,
        competitor_id: &str,
        data: Value,
        derive: F,
    ) -> Result<(Snapshot, Vec<Signal>)>
    where
        F: FnOnce(Option<&Value>, &Value) -> Vec<SignalDraft>,
    {
        if company_id == competitor_id {
            return Err(StorageError::Invalid {
                entity: "company_snapshot",
                reason: "snapshots are only captured for competitors".to_string(),
            });
        }

        let txn = self.db().begin().await?;

        let previous = latest_on(&txn, company_id, competitor_id).await?;
        let now = Utc::now().fixed_offset();
        let model = company_snapshot::ActiveModel {
            id: Set(rivalwatch_common::id::next_id()),
            company_id: Set(company_id.to_owned()),
            competitor_id: Set(competitor_id.to_owned()),
            data: Set(serde_json::to_string(&data)?),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let drafts = derive(previous.as_ref().map(|s| &s.data), &data);
        let mut signals = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let details = draft.details.as_ref().map(serde_json::to_string).transpose()?;
            let row = company_signal::ActiveModel {
                id: Set(rivalwatch_common::id::next_id()),
                company_id: Set(draft.company_id),
                competitor_id: Set(draft.competitor_id),
                signal_type: Set(draft.signal_type),
                category: Set(draft.category.as_str().to_owned()),
                severity: Set(draft.severity.as_str().to_owned()),
                message: Set(draft.message),
                details: Set(details),
                is_new: Set(true),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
            signals.push(to_signal(row)?);
        }

        txn.commit().await?;

        tracing::debug!(
            company_id = %company_id,
            competitor_id = %competitor_id,
            baseline = previous.is_none(),
            signals = signals.len(),
            "Captured competitor snapshot"
        );

        Ok((to_snapshot(model)?, signals))
    }
}
