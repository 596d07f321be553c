use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "mood_logs")]
#[schema(as = MoodLog)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    /// Шкала 1..=10
    pub mood_score: i16,
    pub energy_level: Option<i16>,
    pub notes: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    pub logged_at: DateTimeUtc,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
