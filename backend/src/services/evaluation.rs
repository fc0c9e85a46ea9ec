//! Evaluation storage service
//!
//! Records are scored by the shared core before they are written and are
//! immutable afterwards, apart from the favorite flag. Every query is scoped
//! to the owning user.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    score_new_evaluation, CupEvaluation, Evaluation, EvaluationSummary, NewEvaluation,
    PaginatedResponse, Pagination, PaginationMeta, RoastLevel,
};
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Largest page a client may request
const MAX_PER_PAGE: u32 = 100;

/// Evaluation service for creating, listing and deleting tasting records
#[derive(Clone)]
pub struct EvaluationService {
    db: PgPool,
}

/// Database row for an evaluation
#[derive(Debug, sqlx::FromRow)]
struct EvaluationRow {
    id: Uuid,
    owner_id: Uuid,
    coffee_name: String,
    roast_level: String,
    water_temperature: String,
    cups: Json<Vec<CupEvaluation>>,
    overall_score: Decimal,
    notes: String,
    is_favorite: bool,
    created_at: DateTime<Utc>,
}

/// Database row for the history list
#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    id: Uuid,
    coffee_name: String,
    roast_level: String,
    overall_score: Decimal,
    cup_count: i32,
    created_at: DateTime<Utc>,
    is_favorite: bool,
}

/// History list filter
#[derive(Debug, Default, Deserialize)]
pub struct EvaluationFilter {
    #[serde(default)]
    pub favorites_only: bool,
    pub roast_level: Option<RoastLevel>,
    /// Case-insensitive substring of the coffee name
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl EvaluationFilter {
    fn pagination(&self) -> Pagination {
        let defaults = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(defaults.page).max(1),
            per_page: self
                .per_page
                .unwrap_or(defaults.per_page)
                .clamp(1, MAX_PER_PAGE),
        }
    }

    /// ILIKE pattern for the search term, with wildcards in the term escaped
    fn search_pattern(&self) -> Option<String> {
        let term = self.search.as_deref()?.trim();
        if term.is_empty() {
            return None;
        }
        let escaped = term
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        Some(format!("%{}%", escaped))
    }

    fn push_conditions(&self, query: &mut QueryBuilder<'_, Postgres>, owner_id: Uuid) {
        query.push(" WHERE owner_id = ").push_bind(owner_id);
        if self.favorites_only {
            query.push(" AND is_favorite");
        }
        if let Some(level) = self.roast_level {
            query.push(" AND roast_level = ").push_bind(level.as_str());
        }
        if let Some(pattern) = self.search_pattern() {
            query.push(" AND coffee_name ILIKE ").push_bind(pattern);
        }
    }
}

const EVALUATION_COLUMNS: &str = "id, owner_id, coffee_name, roast_level, water_temperature, \
     cups, overall_score, notes, is_favorite, created_at";

impl EvaluationService {
    /// Create a new EvaluationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Score and store a submitted evaluation
    pub async fn create(&self, owner_id: Uuid, input: NewEvaluation) -> AppResult<Evaluation> {
        let existing = sqlx::query_scalar::<_, String>(
            "SELECT coffee_name FROM evaluations WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;

        let evaluation = score_for_owner(owner_id, input, &existing, Utc::now())?;

        sqlx::query(
            r#"
            INSERT INTO evaluations (
                id, owner_id, coffee_name, roast_level, water_temperature,
                cups, overall_score, notes, is_favorite, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(evaluation.id)
        .bind(evaluation.owner_id)
        .bind(&evaluation.coffee_name)
        .bind(evaluation.roast_level.as_str())
        .bind(&evaluation.water_temperature)
        .bind(Json(&evaluation.cups))
        .bind(evaluation.overall_score)
        .bind(&evaluation.notes)
        .bind(evaluation.is_favorite)
        .bind(evaluation.created_at)
        .execute(&self.db)
        .await
        .map_err(|e| insert_error(e, &evaluation.coffee_name))?;

        tracing::info!(
            evaluation_id = %evaluation.id,
            cups = evaluation.cups.len(),
            overall_score = %evaluation.overall_score,
            "Evaluation created"
        );

        Ok(evaluation)
    }

    /// List evaluations newest first
    pub async fn list(
        &self,
        owner_id: Uuid,
        filter: &EvaluationFilter,
    ) -> AppResult<PaginatedResponse<EvaluationSummary>> {
        let pagination = filter.pagination();

        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM evaluations");
        filter.push_conditions(&mut count_query, owner_id);
        let total_items: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.db)
            .await?;

        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT id, coffee_name, roast_level, overall_score, \
             jsonb_array_length(cups) AS cup_count, created_at, is_favorite \
             FROM evaluations",
        );
        filter.push_conditions(&mut query, owner_id);
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(i64::from(pagination.per_page))
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows = query
            .build_query_as::<SummaryRow>()
            .fetch_all(&self.db)
            .await?;

        let data = rows
            .into_iter()
            .map(row_to_summary)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PaginatedResponse {
            data,
            pagination: PaginationMeta::new(&pagination, total_items.max(0) as u64),
        })
    }

    /// Get a single evaluation
    pub async fn get(&self, owner_id: Uuid, evaluation_id: Uuid) -> AppResult<Evaluation> {
        let row = sqlx::query_as::<_, EvaluationRow>(&format!(
            "SELECT {} FROM evaluations WHERE id = $1 AND owner_id = $2",
            EVALUATION_COLUMNS
        ))
        .bind(evaluation_id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Evaluation".to_string()))?;

        row_to_evaluation(row)
    }

    /// Delete an evaluation and its cups
    pub async fn delete(&self, owner_id: Uuid, evaluation_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM evaluations WHERE id = $1 AND owner_id = $2")
            .bind(evaluation_id)
            .bind(owner_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Evaluation".to_string()));
        }

        tracing::info!(%evaluation_id, "Evaluation deleted");
        Ok(())
    }

    /// Flip the favorite flag
    pub async fn toggle_favorite(
        &self,
        owner_id: Uuid,
        evaluation_id: Uuid,
    ) -> AppResult<Evaluation> {
        let row = sqlx::query_as::<_, EvaluationRow>(&format!(
            "UPDATE evaluations SET is_favorite = NOT is_favorite \
             WHERE id = $1 AND owner_id = $2 RETURNING {}",
            EVALUATION_COLUMNS
        ))
        .bind(evaluation_id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Evaluation".to_string()))?;

        row_to_evaluation(row)
    }
}

/// Score a submission against the names the owner already uses
fn score_for_owner(
    owner_id: Uuid,
    input: NewEvaluation,
    existing: &[String],
    now: DateTime<Utc>,
) -> AppResult<Evaluation> {
    let evaluation =
        score_new_evaluation(input, owner_id, existing.iter().map(String::as_str), now)?;
    Ok(evaluation)
}

fn insert_error(err: sqlx::Error, coffee_name: &str) -> AppError {
    match err {
        // Lost a race with a concurrent insert of the same name
        sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::DuplicateEntry {
            field: "coffee_name".to_string(),
            value: coffee_name.to_string(),
        },
        e => AppError::DatabaseError(e),
    }
}

fn parse_roast_level(value: &str) -> AppResult<RoastLevel> {
    RoastLevel::from_str(value)
        .ok_or_else(|| AppError::Internal(format!("Unknown roast level in storage: {}", value)))
}

/// Convert database row to Evaluation
fn row_to_evaluation(row: EvaluationRow) -> AppResult<Evaluation> {
    Ok(Evaluation {
        id: row.id,
        owner_id: row.owner_id,
        coffee_name: row.coffee_name,
        roast_level: parse_roast_level(&row.roast_level)?,
        water_temperature: row.water_temperature,
        cups: row.cups.0,
        overall_score: row.overall_score,
        notes: row.notes,
        created_at: row.created_at,
        is_favorite: row.is_favorite,
    })
}

fn row_to_summary(row: SummaryRow) -> AppResult<EvaluationSummary> {
    Ok(EvaluationSummary {
        id: row.id,
        coffee_name: row.coffee_name,
        roast_level: parse_roast_level(&row.roast_level)?,
        overall_score: row.overall_score,
        cup_count: row.cup_count.max(0) as usize,
        created_at: row.created_at,
        is_favorite: row.is_favorite,
    })
}
