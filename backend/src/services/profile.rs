//! Farmer profile service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{ensure_within, FarmerId, FarmerProfile, MAX_FARM_SIZE_ACRES};
use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Farmer profile service
#[derive(Clone)]
pub struct ProfileService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    farmer_id: String,
    first_name: String,
    last_name: String,
    farm_name: Option<String>,
    farm_size_acres: Option<Decimal>,
    region: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for FarmerProfile {
    fn from(row: ProfileRow) -> Self {
        FarmerProfile {
            farmer_id: FarmerId::new(row.farmer_id),
            first_name: row.first_name,
            last_name: row.last_name,
            farm_name: row.farm_name,
            farm_size_acres: row.farm_size_acres,
            region: row.region,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating a profile
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProfileInput {
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub last_name: String,
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    pub farm_name: Option<String>,
    pub farm_size_acres: Option<Decimal>,
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub region: Option<String>,
}

/// Input for updating a profile
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub last_name: Option<String>,
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    pub farm_name: Option<String>,
    pub farm_size_acres: Option<Decimal>,
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub region: Option<String>,
}

fn check_farm_size(size: Option<Decimal>) -> AppResult<()> {
    if let Some(size) = size {
        ensure_within("farm_size_acres", size, Decimal::ZERO, MAX_FARM_SIZE_ACRES)?;
    }
    Ok(())
}

const PROFILE_COLUMNS: &str =
    "farmer_id, first_name, last_name, farm_name, farm_size_acres, region, created_at, updated_at";

impl ProfileService {
    /// Create a new ProfileService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn get_profile(&self, farmer_id: &FarmerId) -> AppResult<FarmerProfile> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {} FROM farmer_profiles WHERE farmer_id = $1",
            PROFILE_COLUMNS
        ))
        .bind(farmer_id.as_str())
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Farmer profile".to_string()))?;

        Ok(row.into())
    }

    /// Create the farmer's profile. A farmer has at most one.
    pub async fn create_profile(
        &self,
        farmer_id: &FarmerId,
        input: CreateProfileInput,
    ) -> AppResult<FarmerProfile> {
        input.validate()?;
        check_farm_size(input.farm_size_acres)?;

        let result = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            INSERT INTO farmer_profiles (farmer_id, first_name, last_name, farm_name, farm_size_acres, region)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(farmer_id.as_str())
        .bind(input.first_name.trim())
        .bind(input.last_name.trim())
        .bind(&input.farm_name)
        .bind(input.farm_size_acres)
        .bind(&input.region)
        .fetch_one(&self.db)
        .await;

        match result {
            Ok(row) => {
                tracing::info!(farmer_id = %farmer_id, "Farmer profile created");
                Ok(row.into())
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AppError::Conflict {
                    resource: "profile".to_string(),
                    message: "A profile already exists for this farmer".to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn update_profile(
        &self,
        farmer_id: &FarmerId,
        input: UpdateProfileInput,
    ) -> AppResult<FarmerProfile> {
        input.validate()?;
        check_farm_size(input.farm_size_acres)?;

        let existing = self.get_profile(farmer_id).await?;

        let first_name = input
            .first_name
            .map(|n| n.trim().to_string())
            .unwrap_or(existing.first_name);
        let last_name = input
            .last_name
            .map(|n| n.trim().to_string())
            .unwrap_or(existing.last_name);
        let farm_name = input.farm_name.or(existing.farm_name);
        let farm_size_acres = input.farm_size_acres.or(existing.farm_size_acres);
        let region = input.region.or(existing.region);

        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            UPDATE farmer_profiles SET
                first_name = $2, last_name = $3, farm_name = $4,
                farm_size_acres = $5, region = $6, updated_at = NOW()
            WHERE farmer_id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(farmer_id.as_str())
        .bind(first_name)
        .bind(last_name)
        .bind(farm_name)
        .bind(farm_size_acres)
        .bind(region)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Farmer profile".to_string()))?;

        Ok(row.into())
    }
}
