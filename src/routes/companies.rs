/// Company Routes
///
/// Company CRUD plus recruiter membership management. Mutating operations
/// are restricted to the company owner; creation requires the employer
/// role and at most one company per owner.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::Claims;
use crate::error::{AppError, DatabaseError, ErrorContext};
use crate::pagination::{Paginated, Pagination};
use crate::users::EMPLOYER_ROLE_ID;
use crate::validators::is_valid_name;

/// Company row as stored
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CompanyRecord {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub owner_id: Uuid,
    pub recruiter_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Deserialize)]
pub struct CompanyListQuery {
    pub name: Option<String>,
    pub owner_id: Option<Uuid>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Deserialize)]
pub struct AddRecruiterRequest {
    pub user_id: Uuid,
}

const COMPANY_COLUMNS: &str =
    "id, name, description, website, logo_url, owner_id, recruiter_ids, created_at, updated_at";

pub(crate) async fn fetch_company(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<CompanyRecord>, AppError> {
    let company = sqlx::query_as::<_, CompanyRecord>(&format!(
        "SELECT {} FROM companies WHERE id = $1",
        COMPANY_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(company)
}

fn company_not_found() -> AppError {
    AppError::Database(DatabaseError::NotFound("Company not found".to_string()))
}

/// POST /api/companies
///
/// Create a company owned by the requester.
///
/// # Errors
/// - 403: Requester does not have the employer role
/// - 409: Owner already has a company
pub async fn create_company(
    claims: web::ReqData<Claims>,
    form: web::Json<CreateCompanyRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("company_creation");
    let owner_id = claims.user_id()?;

    let name = is_valid_name(&form.name)?;

    let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM companies WHERE owner_id = $1")
        .bind(owner_id)
        .fetch_optional(pool.get_ref())
        .await?;
    if existing.is_some() {
        return Err(AppError::Database(DatabaseError::UniqueConstraintViolation(
            "Owner already has a company".to_string(),
        )));
    }

    let role_id = sqlx::query_scalar::<_, i32>("SELECT role_id FROM users WHERE id = $1")
        .bind(owner_id)
        .fetch_optional(pool.get_ref())
        .await?;
    if role_id != Some(EMPLOYER_ROLE_ID) {
        return Err(AppError::Forbidden(
            "User must have employer role to create company".to_string(),
        ));
    }

    let now = Utc::now();
    let company = sqlx::query_as::<_, CompanyRecord>(&format!(
        r#"
        INSERT INTO companies (id, name, description, website, logo_url, owner_id, recruiter_ids, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, '{{}}', $7, $7)
        RETURNING {}
        "#,
        COMPANY_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&name)
    .bind(&form.description)
    .bind(&form.website)
    .bind(&form.logo_url)
    .bind(owner_id)
    .bind(now)
    .fetch_one(pool.get_ref())
    .await?;

    tracing::info!(
        request_id = %context.request_id,
        company_id = %company.id,
        owner_id = %owner_id,
        "Company created successfully"
    );

    Ok(HttpResponse::Created().json(company))
}

/// GET /api/companies
///
/// List companies with optional name/owner filters and pagination.
pub async fn list_companies(
    query: web::Query<CompanyListQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let pagination = Pagination::from_query(query.page, query.page_size);

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM companies
        WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
          AND ($2::uuid IS NULL OR owner_id = $2)
        "#,
    )
    .bind(&query.name)
    .bind(query.owner_id)
    .fetch_one(pool.get_ref())
    .await?;

    let companies = sqlx::query_as::<_, CompanyRecord>(&format!(
        r#"
        SELECT {} FROM companies
        WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
          AND ($2::uuid IS NULL OR owner_id = $2)
        ORDER BY created_at DESC
        OFFSET $3 LIMIT $4
        "#,
        COMPANY_COLUMNS
    ))
    .bind(&query.name)
    .bind(query.owner_id)
    .bind(pagination.offset())
    .bind(pagination.limit())
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(Paginated::new(companies, total, pagination)))
}

/// GET /api/companies/{id}
pub async fn get_company(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let company = fetch_company(pool.get_ref(), path.into_inner())
        .await?
        .ok_or_else(company_not_found)?;

    Ok(HttpResponse::Ok().json(company))
}

/// PATCH /api/companies/{id}
///
/// # Errors
/// - 403: Requester is not the owner
/// - 404: Company not found
pub async fn update_company(
    claims: web::ReqData<Claims>,
    path: web::Path<Uuid>,
    form: web::Json<UpdateCompanyRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("company_update");
    let requester_id = claims.user_id()?;
    let company_id = path.into_inner();

    let company = fetch_company(pool.get_ref(), company_id)
        .await?
        .ok_or_else(company_not_found)?;

    if company.owner_id != requester_id {
        return Err(AppError::Forbidden(
            "Only owner can update company".to_string(),
        ));
    }

    let name = match &form.name {
        Some(name) => is_valid_name(name)?,
        None => company.name.clone(),
    };

    let updated = sqlx::query_as::<_, CompanyRecord>(&format!(
        r#"
        UPDATE companies
        SET name = $2,
            description = COALESCE($3, description),
            website = COALESCE($4, website),
            logo_url = COALESCE($5, logo_url),
            updated_at = $6
        WHERE id = $1
        RETURNING {}
        "#,
        COMPANY_COLUMNS
    ))
    .bind(company_id)
    .bind(&name)
    .bind(&form.description)
    .bind(&form.website)
    .bind(&form.logo_url)
    .bind(Utc::now())
    .fetch_one(pool.get_ref())
    .await?;

    tracing::info!(
        request_id = %context.request_id,
        company_id = %company_id,
        "Company updated successfully"
    );

    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /api/companies/{id}
///
/// Delete a company; returns the deleted entity.
///
/// # Errors
/// - 403: Requester is not the owner
/// - 404: Company not found
pub async fn delete_company(
    claims: web::ReqData<Claims>,
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("company_deletion");
    let requester_id = claims.user_id()?;
    let company_id = path.into_inner();

    let company = fetch_company(pool.get_ref(), company_id)
        .await?
        .ok_or_else(company_not_found)?;

    if company.owner_id != requester_id {
        return Err(AppError::Forbidden(
            "Only owner can delete company".to_string(),
        ));
    }

    let deleted = sqlx::query_as::<_, CompanyRecord>(&format!(
        "DELETE FROM companies WHERE id = $1 RETURNING {}",
        COMPANY_COLUMNS
    ))
    .bind(company_id)
    .fetch_one(pool.get_ref())
    .await?;

    tracing::info!(
        request_id = %context.request_id,
        company_id = %company_id,
        "Company deleted successfully"
    );

    Ok(HttpResponse::Ok().json(deleted))
}

/// POST /api/companies/{id}/recruiters
///
/// Add a recruiter to the company. Adding an existing member is a no-op.
///
/// # Errors
/// - 403: Requester is not the owner
/// - 404: Company not found
pub async fn add_recruiter(
    claims: web::ReqData<Claims>,
    path: web::Path<Uuid>,
    form: web::Json<AddRecruiterRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let requester_id = claims.user_id()?;
    let company_id = path.into_inner();

    let company = fetch_company(pool.get_ref(), company_id)
        .await?
        .ok_or_else(company_not_found)?;

    if company.owner_id != requester_id {
        return Err(AppError::Forbidden(
            "Only owner can add recruiters".to_string(),
        ));
    }

    if company.recruiter_ids.contains(&form.user_id) {
        return Ok(HttpResponse::Ok().json(company));
    }

    let updated = sqlx::query_as::<_, CompanyRecord>(&format!(
        r#"
        UPDATE companies
        SET recruiter_ids = array_append(recruiter_ids, $2), updated_at = $3
        WHERE id = $1
        RETURNING {}
        "#,
        COMPANY_COLUMNS
    ))
    .bind(company_id)
    .bind(form.user_id)
    .bind(Utc::now())
    .fetch_one(pool.get_ref())
    .await?;

    tracing::info!(
        company_id = %company_id,
        recruiter_id = %form.user_id,
        "Recruiter added"
    );

    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /api/companies/{id}/recruiters/{user_id}
///
/// Remove a recruiter from the company. Removing a non-member is a no-op.
///
/// # Errors
/// - 403: Requester is not the owner
/// - 404: Company not found
pub async fn remove_recruiter(
    claims: web::ReqData<Claims>,
    path: web::Path<(Uuid, Uuid)>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let requester_id = claims.user_id()?;
    let (company_id, user_id) = path.into_inner();

    let company = fetch_company(pool.get_ref(), company_id)
        .await?
        .ok_or_else(company_not_found)?;

    if company.owner_id != requester_id {
        return Err(AppError::Forbidden(
            "Only owner can remove recruiters".to_string(),
        ));
    }

    let updated = sqlx::query_as::<_, CompanyRecord>(&format!(
        r#"
        UPDATE companies
        SET recruiter_ids = array_remove(recruiter_ids, $2), updated_at = $3
        WHERE id = $1
        RETURNING {}
        "#,
        COMPANY_COLUMNS
    ))
    .bind(company_id)
    .bind(user_id)
    .bind(Utc::now())
    .fetch_one(pool.get_ref())
    .await?;

    tracing::info!(
        company_id = %company_id,
        recruiter_id = %user_id,
        "Recruiter removed"
    );

    Ok(HttpResponse::Ok().json(updated))
}
