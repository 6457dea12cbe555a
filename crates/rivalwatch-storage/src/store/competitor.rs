use chrono::Utc;
use rivalwatch_common::types::Company;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};

use crate::entities::{company, company_competitor};
use crate::error::{Result, StorageError};
use crate::store::company::load_company;
use crate::store::IntelStore;

impl IntelStore {
    /// Links `competitor_id` as a competitor of `company_id`.
    ///
    /// Returns `false` when the pair already exists. A company can never be
    /// its own competitor.
    pub async fn link_competitor(&self, company_id: &str, competitor_id: &str) -> Result<bool> {
        if company_id == competitor_id {
            return Err(StorageError::Invalid {
                entity: "company_competitor",
                reason: "a company cannot be its own competitor".to_string(),
            });
        }
        if self.is_competitor(company_id, competitor_id).await? {
            return Ok(false);
        }

        let inserted = company_competitor::Entity::insert(company_competitor::ActiveModel {
            company_id: Set(company_id.to_owned()),
            competitor_id: Set(competitor_id.to_owned()),
            created_at: Set(Utc::now().fixed_offset()),
        })
        .on_conflict(
            OnConflict::columns([
                company_competitor::Column::CompanyId,
                company_competitor::Column::CompetitorId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(self.db())
        .await?;
        Ok(inserted > 0)
    }

    pub async fn is_competitor(&self, company_id: &str, competitor_id: &str) -> Result<bool> {
        let found = company_competitor::Entity::find_by_id((
            company_id.to_owned(),
            competitor_id.to_owned(),
        ))
        .one(self.db())
        .await?;
        Ok(found.is_some())
    }

    /// Competitors of a company, ordered by name.
    pub async fn list_competitors(&self, company_id: &str) -> Result<Vec<Company>> {
        let links = company_competitor::Entity::find()
            .filter(company_competitor::Column::CompanyId.eq(company_id))
            .all(self.db())
            .await?;
        if links.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = links.into_iter().map(|l| l.competitor_id).collect();
        let models = company::Entity::find()
            .filter(company::Column::Id.is_in(ids))
            .order_by_asc(company::Column::Name)
            .all(self.db())
            .await?;

        let mut out = Vec::with_capacity(models.len());
        for m in models {
            out.push(load_company(self.db(), m).await?);
        }
        Ok(out)
    }

    /// Drops every competitor link of `company_id`. Snapshots and signals
    /// are kept. Returns the number of links removed.
    pub async fn unlink_all_competitors(&self, company_id: &str) -> Result<u64> {
        let deleted = company_competitor::Entity::delete_many()
            .filter(company_competitor::Column::CompanyId.eq(company_id))
            .exec(self.db())
            .await?;
        Ok(deleted.rows_affected)
    }

    pub async fn count_competitors(&self, company_id: &str) -> Result<u64> {
        let count = company_competitor::Entity::find()
            .filter(company_competitor::Column::CompanyId.eq(company_id))
            .count(self.db())
            .await?;
        Ok(count)
    }
}
