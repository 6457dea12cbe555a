use chrono::Utc;
use rivalwatch_common::types::Company;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder,
};
use std::collections::BTreeSet;

use crate::entities::{company, company_industry, industry};
use crate::error::{Result, StorageError};
use crate::store::IntelStore;

pub(crate) fn to_company(m: company::Model, industries: Vec<String>) -> Company {
    Company {
        id: m.id,
        name: m.name,
        domain: m.domain,
        website: m.website,
        headline: m.headline,
        number_of_employees: m.number_of_employees,
        funding: m.funding,
        funding_stage: m.funding_stage,
        country: m.country,
        city: m.city,
        industry: m.industry,
        linkedin_url: m.linkedin_url,
        enriched_at: m.enriched_at.map(|t| t.with_timezone(&Utc)),
        competitive_landscape: m.competitive_landscape,
        industries,
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    }
}

pub(crate) async fn industries_of<C: ConnectionTrait>(db: &C, company_id: &str) -> Result<Vec<String>> {
    let links = company_industry::Entity::find()
        .filter(company_industry::Column::CompanyId.eq(company_id))
        .all(db)
        .await?;
    if links.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<String> = links.into_iter().map(|l| l.industry_id).collect();
    let rows = industry::Entity::find()
        .filter(industry::Column::Id.is_in(ids))
        .order_by_asc(industry::Column::Name)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|r| r.name).collect())
}

pub(crate) async fn load_company<C: ConnectionTrait>(db: &C, m: company::Model) -> Result<Company> {
    let industries = industries_of(db, &m.id).await?;
    Ok(to_company(m, industries))
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

impl IntelStore {
    pub async fn get_company(&self, id: &str) -> Result<Option<Company>> {
        match company::Entity::find_by_id(id).one(self.db()).await? {
            Some(m) => Ok(Some(load_company(self.db(), m).await?)),
            None => Ok(None),
        }
    }

    /// Looks a company up by name. The column is `COLLATE NOCASE`, so
    /// "acme" finds "Acme".
    pub async fn find_company_by_name(&self, name: &str) -> Result<Option<Company>> {
        let model = company::Entity::find()
            .filter(company::Column::Name.eq(name.trim()))
            .one(self.db())
            .await?;
        match model {
            Some(m) => Ok(Some(load_company(self.db(), m).await?)),
            None => Ok(None),
        }
    }

    pub async fn find_company_by_domain(&self, domain: &str) -> Result<Option<Company>> {
        let model = company::Entity::find()
            .filter(company::Column::Domain.eq(domain))
            .order_by_asc(company::Column::CreatedAt)
            .one(self.db())
            .await?;
        match model {
            Some(m) => Ok(Some(load_company(self.db(), m).await?)),
            None => Ok(None),
        }
    }

    /// Inserts a new company. Fails with [`StorageError::Invalid`] when the
    /// name is empty or already taken.
    pub async fn create_company(&self, name: &str, domain: Option<&str>) -> Result<Company> {
        let name = name.trim();
        if blank(name) {
            return Err(StorageError::Invalid {
                entity: "company",
                reason: "name must not be empty".to_string(),
            });
        }
        if self.find_company_by_name(name).await?.is_some() {
            return Err(StorageError::Invalid {
                entity: "company",
                reason: format!("name '{name}' already exists"),
            });
        }

        let id = rivalwatch_common::id::next_id();
        let now = Utc::now().fixed_offset();
        let am = company::ActiveModel {
            id: Set(id),
            name: Set(name.to_owned()),
            domain: Set(domain.map(str::to_owned)),
            website: Set(None),
            headline: Set(None),
            number_of_employees: Set(None),
            funding: Set(None),
            funding_stage: Set(None),
            country: Set(None),
            city: Set(None),
            industry: Set(None),
            linkedin_url: Set(None),
            enriched_at: Set(None),
            competitive_landscape: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let model = am.insert(self.db()).await?;
        tracing::debug!(company_id = %model.id, name = %model.name, "Created company");
        Ok(to_company(model, Vec::new()))
    }

    /// Persists every scalar field of `company`. Industries are managed
    /// separately through [`IntelStore::add_company_industries`].
    pub async fn update_company(&self, company: &Company) -> Result<Company> {
        let existing = company::Entity::find_by_id(company.id.as_str())
            .one(self.db())
            .await?
            .ok_or_else(|| StorageError::NotFound {
                entity: "company",
                id: company.id.clone(),
            })?;

        let mut active: company::ActiveModel = existing.into();
        active.name = Set(company.name.clone());
        active.domain = Set(company.domain.clone());
        active.website = Set(company.website.clone());
        active.headline = Set(company.headline.clone());
        active.number_of_employees = Set(company.number_of_employees);
        active.funding = Set(company.funding);
        active.funding_stage = Set(company.funding_stage.clone());
        active.country = Set(company.country.clone());
        active.city = Set(company.city.clone());
        active.industry = Set(company.industry.clone());
        active.linkedin_url = Set(company.linkedin_url.clone());
        active.enriched_at = Set(company.enriched_at.map(|t| t.fixed_offset()));
        active.competitive_landscape = Set(company.competitive_landscape.clone());
        active.updated_at = Set(Utc::now().fixed_offset());
        let model = active.update(self.db()).await?;

        load_company(self.db(), model).await
    }

    pub async fn set_competitive_landscape(&self, company_id: &str, text: &str) -> Result<()> {
        let existing = company::Entity::find_by_id(company_id)
            .one(self.db())
            .await?
            .ok_or_else(|| StorageError::NotFound {
                entity: "company",
                id: company_id.to_owned(),
            })?;
        let mut active: company::ActiveModel = existing.into();
        active.competitive_landscape = Set(Some(text.to_owned()));
        active.updated_at = Set(Utc::now().fixed_offset());
        active.update(self.db()).await?;
        Ok(())
    }

    /// Adds industry labels to a company's set. Existing links are kept;
    /// returns how many links were newly created.
    pub async fn add_company_industries(&self, company_id: &str, names: &[String]) -> Result<usize> {
        let wanted: BTreeSet<String> = names
            .iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        if wanted.is_empty() {
            return Ok(0);
        }

        let existing: BTreeSet<String> = industries_of(self.db(), company_id)
            .await?
            .into_iter()
            .map(|n| n.to_lowercase())
            .collect();

        let mut added = 0;
        for name in wanted {
            if existing.contains(&name.to_lowercase()) {
                continue;
            }
            let industry_id = self.ensure_industry(&name).await?;
            company_industry::Entity::insert(company_industry::ActiveModel {
                company_id: Set(company_id.to_owned()),
                industry_id: Set(industry_id),
            })
            .on_conflict(
                OnConflict::columns([
                    company_industry::Column::CompanyId,
                    company_industry::Column::IndustryId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.db())
            .await?;
            added += 1;
        }
        Ok(added)
    }

    async fn ensure_industry(&self, name: &str) -> Result<String> {
        if let Some(found) = industry::Entity::find()
            .filter(industry::Column::Name.eq(name))
            .one(self.db())
            .await?
        {
            return Ok(found.id);
        }
        let am = industry::ActiveModel {
            id: Set(rivalwatch_common::id::next_id()),
            name: Set(name.to_owned()),
            created_at: Set(Utc::now().fixed_offset()),
        };
        Ok(am.insert(self.db()).await?.id)
    }

    pub async fn delete_company(&self, id: &str) -> Result<bool> {
        let res = company::Entity::delete_by_id(id).exec(self.db()).await?;
        Ok(res.rows_affected > 0)
    }
}
