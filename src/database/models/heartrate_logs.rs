use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "heartrate_logs")]
#[schema(as = HeartRateLog)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub bpm: i16,
    /// resting | active | exercise
    pub context: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    pub measured_at: DateTimeUtc,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
