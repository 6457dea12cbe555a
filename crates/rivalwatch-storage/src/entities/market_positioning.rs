use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "market_positionings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub company_id: String,
    #[sea_orm(column_type = "Text")]
    pub value_proposition: String,
    #[sea_orm(column_type = "Text")]
    pub competitive_edge: String,
    #[sea_orm(column_type = "Text")]
    pub brand_perception: String,
    #[sea_orm(column_type = "Text")]
    pub key_segments: String,
    #[sea_orm(column_type = "Text")]
    pub weaknesses: String,
    #[sea_orm(column_type = "Text")]
    pub opportunity_areas: String,
    #[sea_orm(column_type = "Text")]
    pub summary: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
