use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "food_logs")]
#[schema(as = FoodLog)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub food_name: String,
    /// breakfast | lunch | dinner | snack
    pub meal_type: String,
    pub calories: i32,
    pub protein_g: Option<f32>,
    pub carbs_g: Option<f32>,
    pub fat_g: Option<f32>,
    pub notes: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    pub logged_at: DateTimeUtc,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
