use chrono::Utc;
use rivalwatch_common::types::MarketPositioning;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait};

use crate::entities::market_positioning::{self, Entity};
use crate::error::Result;
use crate::store::IntelStore;

impl IntelStore {
    pub async fn get_market_positioning(&self, company_id: &str) -> Result<Option<MarketPositioning>> {
        let model = Entity::find_by_id(company_id).one(self.db()).await?;
        Ok(model.map(|m| MarketPositioning {
            value_proposition: m.value_proposition,
            competitive_edge: m.competitive_edge,
            brand_perception: m.brand_perception,
            key_segments: m.key_segments,
            weaknesses: m.weaknesses,
            opportunity_areas: m.opportunity_areas,
            summary: m.summary,
        }))
    }

    /// Inserts or replaces the cached analysis for a company.
    pub async fn save_market_positioning(
        &self,
        company_id: &str,
        positioning: &MarketPositioning,
    ) -> Result<()> {
        let now = Utc::now().fixed_offset();
        let existing = Entity::find_by_id(company_id).one(self.db()).await?;

        let is_new = existing.is_none();
        let mut am = match existing {
            Some(m) => m.into(),
            None => market_positioning::ActiveModel {
                company_id: Set(company_id.to_owned()),
                created_at: Set(now),
                ..Default::default()
            },
        };
        am.value_proposition = Set(positioning.value_proposition.clone());
        am.competitive_edge = Set(positioning.competitive_edge.clone());
        am.brand_perception = Set(positioning.brand_perception.clone());
        am.key_segments = Set(positioning.key_segments.clone());
        am.weaknesses = Set(positioning.weaknesses.clone());
        am.opportunity_areas = Set(positioning.opportunity_areas.clone());
        am.summary = Set(positioning.summary.clone());
        am.updated_at = Set(now);
        if is_new {
            am.insert(self.db()).await?;
        } else {
            am.update(self.db()).await?;
        }
        Ok(())
    }
}
