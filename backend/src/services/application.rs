//! Credit application service
//!
//! Farmers file loan applications and can list, edit or withdraw their own.
//! Every query is scoped to the calling farmer. Approval and rejection are
//! lender decisions and cannot be set through this service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    ensure_within, validate_loan_amount, ApplicationStatus, CreditApplication, FarmerId,
    MAX_FARM_SIZE_ACRES,
};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::store::StoreError;

/// Credit application service
#[derive(Clone)]
pub struct ApplicationService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct ApplicationRow {
    id: Uuid,
    farmer_id: String,
    loan_amount: Decimal,
    loan_purpose: String,
    loan_term: i32,
    loan_description: Option<String>,
    farm_name: Option<String>,
    farm_size: Option<Decimal>,
    farm_location: Option<String>,
    primary_crop: Option<String>,
    farming_experience: Option<i32>,
    previous_yield: Option<Decimal>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for CreditApplication {
    type Error = AppError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<ApplicationStatus>().map_err(|_| {
            AppError::Persistence(StoreError::Corrupt(format!(
                "application {} has unknown status '{}'",
                row.id, row.status
            )))
        })?;

        Ok(CreditApplication {
            id: row.id,
            farmer_id: FarmerId::new(row.farmer_id),
            loan_amount: row.loan_amount,
            loan_purpose: row.loan_purpose,
            loan_term: row.loan_term,
            loan_description: row.loan_description,
            farm_name: row.farm_name,
            farm_size: row.farm_size,
            farm_location: row.farm_location,
            primary_crop: row.primary_crop,
            farming_experience: row.farming_experience,
            previous_yield: row.previous_yield,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Input for filing an application
#[derive(Debug, Deserialize, Validate)]
pub struct CreateApplicationInput {
    pub loan_amount: Decimal,
    #[validate(length(min = 1, max = 200, message = "must be 1 to 200 characters"))]
    pub loan_purpose: String,
    #[validate(range(min = 1, max = 600, message = "must be between 1 and 600 months"))]
    pub loan_term: i32,
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub loan_description: Option<String>,
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    pub farm_name: Option<String>,
    pub farm_size: Option<Decimal>,
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    pub farm_location: Option<String>,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub primary_crop: Option<String>,
    #[validate(range(min = 0, max = 100, message = "must be between 0 and 100 years"))]
    pub farming_experience: Option<i32>,
    pub previous_yield: Option<Decimal>,
}

impl CreateApplicationInput {
    fn check(&self) -> AppResult<()> {
        self.validate()?;
        if self.loan_purpose.trim().is_empty() {
            return Err(AppError::Validation {
                field: "loan_purpose".to_string(),
                message: "is required".to_string(),
            });
        }
        validate_loan_amount(self.loan_amount)?;
        check_measurements(self.farm_size, self.previous_yield)
    }
}

/// Farm size and yield share the `NUMERIC(12, 2)` column bound
fn check_measurements(farm_size: Option<Decimal>, previous_yield: Option<Decimal>) -> AppResult<()> {
    if let Some(size) = farm_size {
        ensure_within("farm_size", size, Decimal::ZERO, MAX_FARM_SIZE_ACRES)?;
    }
    if let Some(yield_tons) = previous_yield {
        ensure_within("previous_yield", yield_tons, Decimal::ZERO, MAX_FARM_SIZE_ACRES)?;
    }
    Ok(())
}

/// Reject status changes the applicant is not allowed to make
fn check_status_change(
    current: ApplicationStatus,
    requested: Option<ApplicationStatus>,
) -> AppResult<ApplicationStatus> {
    let next = requested.unwrap_or(current);
    if current.is_final() {
        return Err(AppError::InvalidStateTransition(format!(
            "application is already {}",
            current
        )));
    }
    if !current.applicant_can_move_to(next) {
        return Err(AppError::InvalidStateTransition(format!(
            "applications cannot be marked {} by the applicant",
            next
        )));
    }
    Ok(next)
}

/// Partial update of an application
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateApplicationInput {
    pub loan_amount: Option<Decimal>,
    #[validate(length(min = 1, max = 200, message = "must be 1 to 200 characters"))]
    pub loan_purpose: Option<String>,
    #[validate(range(min = 1, max = 600, message = "must be between 1 and 600 months"))]
    pub loan_term: Option<i32>,
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub loan_description: Option<String>,
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    pub farm_name: Option<String>,
    pub farm_size: Option<Decimal>,
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    pub farm_location: Option<String>,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub primary_crop: Option<String>,
    #[validate(range(min = 0, max = 100, message = "must be between 0 and 100 years"))]
    pub farming_experience: Option<i32>,
    pub previous_yield: Option<Decimal>,
    pub status: Option<ApplicationStatus>,
}

impl UpdateApplicationInput {
    fn check(&self) -> AppResult<()> {
        self.validate()?;
        if matches!(&self.loan_purpose, Some(purpose) if purpose.trim().is_empty()) {
            return Err(AppError::Validation {
                field: "loan_purpose".to_string(),
                message: "is required".to_string(),
            });
        }
        if let Some(status) = self.status.filter(|s| s.is_final()) {
            return Err(AppError::InvalidStateTransition(format!(
                "applications cannot be marked {} by the applicant",
                status
            )));
        }
        if let Some(amount) = self.loan_amount {
            validate_loan_amount(amount)?;
        }
        check_measurements(self.farm_size, self.previous_yield)
    }
}

const APPLICATION_COLUMNS: &str = "id, farmer_id, loan_amount, loan_purpose, loan_term, \
     loan_description, farm_name, farm_size, farm_location, primary_crop, \
     farming_experience, previous_yield, status, created_at, updated_at";

impl ApplicationService {
    /// Create a new ApplicationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// All applications of a farmer, newest first
    pub async fn list_applications(&self, farmer_id: &FarmerId) -> AppResult<Vec<CreditApplication>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {} FROM credit_applications WHERE farmer_id = $1 ORDER BY created_at DESC",
            APPLICATION_COLUMNS
        ))
        .bind(farmer_id.as_str())
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(CreditApplication::try_from).collect()
    }

    pub async fn get_application(
        &self,
        farmer_id: &FarmerId,
        application_id: Uuid,
    ) -> AppResult<CreditApplication> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {} FROM credit_applications WHERE id = $1 AND farmer_id = $2",
            APPLICATION_COLUMNS
        ))
        .bind(application_id)
        .bind(farmer_id.as_str())
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Credit application".to_string()))?;

        row.try_into()
    }

    /// File a new application in `pending` status
    pub async fn create_application(
        &self,
        farmer_id: &FarmerId,
        input: CreateApplicationInput,
    ) -> AppResult<CreditApplication> {
        input.check()?;

        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            INSERT INTO credit_applications (
                id, farmer_id, loan_amount, loan_purpose, loan_term, loan_description,
                farm_name, farm_size, farm_location, primary_crop, farming_experience,
                previous_yield, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(farmer_id.as_str())
        .bind(input.loan_amount)
        .bind(input.loan_purpose.trim())
        .bind(input.loan_term)
        .bind(&input.loan_description)
        .bind(&input.farm_name)
        .bind(input.farm_size)
        .bind(&input.farm_location)
        .bind(&input.primary_crop)
        .bind(input.farming_experience)
        .bind(input.previous_yield)
        .bind(ApplicationStatus::Pending.as_str())
        .fetch_one(&self.db)
        .await?;

        let application = CreditApplication::try_from(row)?;
        tracing::info!(
            farmer_id = %farmer_id,
            application_id = %application.id,
            "Credit application filed"
        );
        Ok(application)
    }

    /// Apply a partial update. Decided applications are read-only, and the
    /// applicant may only move between pending and under review.
    pub async fn update_application(
        &self,
        farmer_id: &FarmerId,
        application_id: Uuid,
        input: UpdateApplicationInput,
    ) -> AppResult<CreditApplication> {
        input.check()?;

        let existing = self.get_application(farmer_id, application_id).await?;
        let status = check_status_change(existing.status, input.status)?;

        let loan_amount = input.loan_amount.unwrap_or(existing.loan_amount);
        let loan_purpose = input
            .loan_purpose
            .map(|p| p.trim().to_string())
            .unwrap_or(existing.loan_purpose);
        let loan_term = input.loan_term.unwrap_or(existing.loan_term);
        let loan_description = input.loan_description.or(existing.loan_description);
        let farm_name = input.farm_name.or(existing.farm_name);
        let farm_size = input.farm_size.or(existing.farm_size);
        let farm_location = input.farm_location.or(existing.farm_location);
        let primary_crop = input.primary_crop.or(existing.primary_crop);
        let farming_experience = input.farming_experience.or(existing.farming_experience);
        let previous_yield = input.previous_yield.or(existing.previous_yield);

        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            UPDATE credit_applications SET
                loan_amount = $3, loan_purpose = $4, loan_term = $5, loan_description = $6,
                farm_name = $7, farm_size = $8, farm_location = $9, primary_crop = $10,
                farming_experience = $11, previous_yield = $12, status = $13,
                updated_at = NOW()
            WHERE id = $1 AND farmer_id = $2
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        ))
        .bind(application_id)
        .bind(farmer_id.as_str())
        .bind(loan_amount)
        .bind(loan_purpose)
        .bind(loan_term)
        .bind(loan_description)
        .bind(farm_name)
        .bind(farm_size)
        .bind(farm_location)
        .bind(primary_crop)
        .bind(farming_experience)
        .bind(previous_yield)
        .bind(status.as_str())
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Credit application".to_string()))?;

        row.try_into()
    }

    /// Withdraw an application
    pub async fn delete_application(&self, farmer_id: &FarmerId, application_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM credit_applications WHERE id = $1 AND farmer_id = $2")
            .bind(application_id)
            .bind(farmer_id.as_str())
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Credit application".to_string()));
        }

        tracing::info!(farmer_id = %farmer_id, application_id = %application_id, "Credit application withdrawn");
        Ok(())
    }
}
