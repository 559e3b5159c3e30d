use crate::{
    entities::{
        user_preference::{self, SpiceLevel},
        UserPreference,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

/// Dietary preference profiles, one per owner, upserted as a whole.
#[derive(Clone)]
pub struct PreferenceService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SavePreferencesInput {
    #[validate(length(min = 1))]
    pub owner_id: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default)]
    pub cuisine_preferences: Vec<String>,
    #[serde(default)]
    pub health_conscious: bool,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub medical_conditions: Vec<String>,
    #[serde(default)]
    pub spice_level: SpiceLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferencesResponse {
    pub owner_id: String,
    pub email: String,
    pub dietary_restrictions: Vec<String>,
    pub cuisine_preferences: Vec<String>,
    pub health_conscious: bool,
    pub allergies: Vec<String>,
    pub medical_conditions: Vec<String>,
    pub spice_level: SpiceLevel,
    pub has_completed_preferences: bool,
    pub updated_at: DateTime<Utc>,
}

/// Completion probe shape; never 404s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferencesCheck {
    pub has_completed_preferences: bool,
}

fn string_list(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

impl From<user_preference::Model> for PreferencesResponse {
    fn from(model: user_preference::Model) -> Self {
        Self {
            owner_id: model.owner_id,
            email: model.email,
            dietary_restrictions: string_list(&model.dietary_restrictions),
            cuisine_preferences: string_list(&model.cuisine_preferences),
            health_conscious: model.health_conscious,
            allergies: string_list(&model.allergies),
            medical_conditions: string_list(&model.medical_conditions),
            spice_level: model.spice_level,
            has_completed_preferences: model.has_completed_preferences,
            updated_at: model.updated_at,
        }
    }
}

impl PreferenceService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Creates or replaces the owner's preference profile and marks it
    /// completed.
    #[instrument(skip(self, input), fields(owner_id = %input.owner_id))]
    pub async fn save_preferences(
        &self,
        input: SavePreferencesInput,
    ) -> Result<PreferencesResponse, ServiceError> {
        let existing = UserPreference::find()
            .filter(user_preference::Column::OwnerId.eq(input.owner_id.as_str()))
            .one(&*self.db)
            .await?;

        let owner_id = input.owner_id.clone();
        let now = Utc::now();

        let saved = match existing {
            Some(model) => {
                let mut active: user_preference::ActiveModel = model.into();
                active.email = Set(input.email);
                active.dietary_restrictions = Set(serde_json::json!(input.dietary_restrictions));
                active.cuisine_preferences = Set(serde_json::json!(input.cuisine_preferences));
                active.health_conscious = Set(input.health_conscious);
                active.allergies = Set(serde_json::json!(input.allergies));
                active.medical_conditions = Set(serde_json::json!(input.medical_conditions));
                active.spice_level = Set(input.spice_level);
                active.has_completed_preferences = Set(true);
                active.updated_at = Set(now);
                active.update(&*self.db).await?
            }
            None => {
                let active = user_preference::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    owner_id: Set(input.owner_id),
                    email: Set(input.email),
                    dietary_restrictions: Set(serde_json::json!(input.dietary_restrictions)),
                    cuisine_preferences: Set(serde_json::json!(input.cuisine_preferences)),
                    health_conscious: Set(input.health_conscious),
                    allergies: Set(serde_json::json!(input.allergies)),
                    medical_conditions: Set(serde_json::json!(input.medical_conditions)),
                    spice_level: Set(input.spice_level),
                    has_completed_preferences: Set(true),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                active.insert(&*self.db).await?
            }
        };

        self.event_sender
            .send_or_log(Event::PreferencesSaved(owner_id.clone()))
            .await;

        info!("Saved preferences for owner {}", owner_id);
        Ok(saved.into())
    }

    #[instrument(skip(self))]
    pub async fn get_preferences(
        &self,
        owner_id: &str,
    ) -> Result<PreferencesResponse, ServiceError> {
        UserPreference::find()
            .filter(user_preference::Column::OwnerId.eq(owner_id))
            .one(&*self.db)
            .await?
            .map(PreferencesResponse::from)
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Preferences for owner {} not found", owner_id))
            })
    }

    /// Reports whether the owner has completed the preference flow. Unknown
    /// owners report `false` rather than an error.
    #[instrument(skip(self))]
    pub async fn check_preferences(&self, owner_id: &str) -> Result<PreferencesCheck, ServiceError> {
        let completed = UserPreference::find()
            .filter(user_preference::Column::OwnerId.eq(owner_id))
            .one(&*self.db)
            .await?
            .map(|model| model.has_completed_preferences)
            .unwrap_or(false);

        Ok(PreferencesCheck {
            has_completed_preferences: completed,
        })
    }
}
