/// Job Routes
///
/// Job CRUD plus filtered listing. Creating, updating, or deleting a job
/// requires being the owning company's owner or one of its recruiters.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::Claims;
use crate::error::{AppError, DatabaseError, ErrorContext, ValidationError};
use crate::pagination::{Paginated, Pagination};
use crate::routes::companies::{fetch_company, CompanyRecord};

/// Job row as stored
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct JobRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub company_id: Uuid,
    pub location: String,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub status_id: String,
    pub type_id: String,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
    pub company_id: Uuid,
    pub location: String,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub status_id: String,
    pub type_id: String,
    pub skills: Option<Vec<String>>,
}

#[derive(Deserialize)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub status_id: Option<String>,
    pub type_id: Option<String>,
    pub skills: Option<Vec<String>>,
}

#[derive(Deserialize)]
pub struct JobListQuery {
    /// Comma-separated job ids
    pub ids: Option<String>,
    pub company_id: Option<Uuid>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

const JOB_COLUMNS: &str = "id, title, description, company_id, location, salary_min, salary_max, status_id, type_id, skills, created_at, updated_at";

fn job_not_found() -> AppError {
    AppError::Database(DatabaseError::NotFound("Job not found".to_string()))
}

fn can_manage_jobs(company: &CompanyRecord, user_id: Uuid) -> bool {
    company.owner_id == user_id || company.recruiter_ids.contains(&user_id)
}

async fn fetch_job(pool: &PgPool, id: Uuid) -> Result<Option<JobRecord>, AppError> {
    let job = sqlx::query_as::<_, JobRecord>(&format!(
        "SELECT {} FROM jobs WHERE id = $1",
        JOB_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(job)
}

/// POST /api/jobs
///
/// Create a job posting for a company.
///
/// # Errors
/// - 403: Requester is neither owner nor recruiter of the company
/// - 404: Company not found
pub async fn create_job(
    claims: web::ReqData<Claims>,
    form: web::Json<CreateJobRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("job_creation");
    let requester_id = claims.user_id()?;

    let company = fetch_company(pool.get_ref(), form.company_id)
        .await?
        .ok_or_else(|| {
            AppError::Database(DatabaseError::NotFound("Company not found".to_string()))
        })?;

    if !can_manage_jobs(&company, requester_id) {
        return Err(AppError::Forbidden(
            "You are not allowed to create jobs for this company".to_string(),
        ));
    }

    let now = Utc::now();
    let job = sqlx::query_as::<_, JobRecord>(&format!(
        r#"
        INSERT INTO jobs (id, title, description, company_id, location, salary_min, salary_max, status_id, type_id, skills, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
        RETURNING {}
        "#,
        JOB_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&form.title)
    .bind(&form.description)
    .bind(form.company_id)
    .bind(&form.location)
    .bind(form.salary_min)
    .bind(form.salary_max)
    .bind(&form.status_id)
    .bind(&form.type_id)
    .bind(form.skills.clone().unwrap_or_default())
    .bind(now)
    .fetch_one(pool.get_ref())
    .await?;

    tracing::info!(
        request_id = %context.request_id,
        job_id = %job.id,
        company_id = %form.company_id,
        "Job created successfully"
    );

    Ok(HttpResponse::Created().json(job))
}

/// GET /api/jobs
///
/// List jobs with optional id/company filters and pagination.
///
/// # Errors
/// - 400: Malformed id in the `ids` filter
pub async fn list_jobs(
    query: web::Query<JobListQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let pagination = Pagination::from_query(query.page, query.page_size);

    let ids: Option<Vec<Uuid>> = match &query.ids {
        Some(raw) => Some(
            raw.split(',')
                .map(|id| {
                    Uuid::parse_str(id.trim()).map_err(|_| {
                        AppError::Validation(ValidationError::InvalidFormat("ids".to_string()))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
        ),
        None => None,
    };

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM jobs
        WHERE ($1::uuid[] IS NULL OR id = ANY($1))
          AND ($2::uuid IS NULL OR company_id = $2)
        "#,
    )
    .bind(&ids)
    .bind(query.company_id)
    .fetch_one(pool.get_ref())
    .await?;

    let jobs = sqlx::query_as::<_, JobRecord>(&format!(
        r#"
        SELECT {} FROM jobs
        WHERE ($1::uuid[] IS NULL OR id = ANY($1))
          AND ($2::uuid IS NULL OR company_id = $2)
        ORDER BY created_at DESC
        OFFSET $3 LIMIT $4
        "#,
        JOB_COLUMNS
    ))
    .bind(&ids)
    .bind(query.company_id)
    .bind(pagination.offset())
    .bind(pagination.limit())
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(Paginated::new(jobs, total, pagination)))
}

/// GET /api/jobs/{id}
///
/// # Errors
/// - 404: Job not found, or the company that posted it is gone
pub async fn get_job(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let job = fetch_job(pool.get_ref(), path.into_inner())
        .await?
        .ok_or_else(job_not_found)?;

    fetch_company(pool.get_ref(), job.company_id)
        .await?
        .ok_or_else(|| {
            AppError::Database(DatabaseError::NotFound(
                "Company that posted the job not found".to_string(),
            ))
        })?;

    Ok(HttpResponse::Ok().json(job))
}

/// PATCH /api/jobs/{id}
///
/// # Errors
/// - 403: Requester is neither owner nor recruiter of the company
/// - 404: Job or company not found
pub async fn update_job(
    claims: web::ReqData<Claims>,
    path: web::Path<Uuid>,
    form: web::Json<UpdateJobRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("job_update");
    let requester_id = claims.user_id()?;
    let job_id = path.into_inner();

    let job = fetch_job(pool.get_ref(), job_id)
        .await?
        .ok_or_else(job_not_found)?;

    let company = fetch_company(pool.get_ref(), job.company_id)
        .await?
        .ok_or_else(|| {
            AppError::Database(DatabaseError::NotFound("Company not found".to_string()))
        })?;

    if !can_manage_jobs(&company, requester_id) {
        return Err(AppError::Forbidden(
            "You are not allowed to update this job".to_string(),
        ));
    }

    let updated = sqlx::query_as::<_, JobRecord>(&format!(
        r#"
        UPDATE jobs
        SET title = COALESCE($2, title),
            description = COALESCE($3, description),
            location = COALESCE($4, location),
            salary_min = COALESCE($5, salary_min),
            salary_max = COALESCE($6, salary_max),
            status_id = COALESCE($7, status_id),
            type_id = COALESCE($8, type_id),
            skills = COALESCE($9, skills),
            updated_at = $10
        WHERE id = $1
        RETURNING {}
        "#,
        JOB_COLUMNS
    ))
    .bind(job_id)
    .bind(&form.title)
    .bind(&form.description)
    .bind(&form.location)
    .bind(form.salary_min)
    .bind(form.salary_max)
    .bind(&form.status_id)
    .bind(&form.type_id)
    .bind(&form.skills)
    .bind(Utc::now())
    .fetch_one(pool.get_ref())
    .await?;

    tracing::info!(
        request_id = %context.request_id,
        job_id = %job_id,
        "Job updated successfully"
    );

    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /api/jobs/{id}
///
/// Delete a job posting; returns the deleted entity.
///
/// # Errors
/// - 403: Requester is neither owner nor recruiter of the company
/// - 404: Job or company not found
pub async fn delete_job(
    claims: web::ReqData<Claims>,
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("job_deletion");
    let requester_id = claims.user_id()?;
    let job_id = path.into_inner();

    let job = fetch_job(pool.get_ref(), job_id)
        .await?
        .ok_or_else(job_not_found)?;

    let company = fetch_company(pool.get_ref(), job.company_id)
        .await?
        .ok_or_else(|| {
            AppError::Database(DatabaseError::NotFound("Company not found".to_string()))
        })?;

    if !can_manage_jobs(&company, requester_id) {
        return Err(AppError::Forbidden(
            "You are not allowed to delete this job".to_string(),
        ));
    }

    let deleted = sqlx::query_as::<_, JobRecord>(&format!(
        "DELETE FROM jobs WHERE id = $1 RETURNING {}",
        JOB_COLUMNS
    ))
    .bind(job_id)
    .fetch_one(pool.get_ref())
    .await?;

    tracing::info!(
        request_id = %context.request_id,
        job_id = %job_id,
        "Job deleted successfully"
    );

    Ok(HttpResponse::Ok().json(deleted))
}
