use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Dietary preference record, one row per owner. The list-valued fields are
/// stored as JSON arrays of strings.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_preferences")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub owner_id: String,
    pub email: String,
    #[sea_orm(column_type = "Json")]
    pub dietary_restrictions: Json,
    #[sea_orm(column_type = "Json")]
    pub cuisine_preferences: Json,
    pub health_conscious: bool,
    #[sea_orm(column_type = "Json")]
    pub allergies: Json,
    #[sea_orm(column_type = "Json")]
    pub medical_conditions: Json,
    pub spice_level: SpiceLevel,
    pub has_completed_preferences: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
pub enum SpiceLevel {
    #[sea_orm(string_value = "mild")]
    Mild,
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "spicy")]
    Spicy,
}

impl Default for SpiceLevel {
    fn default() -> Self {
        SpiceLevel::Medium
    }
}
