use crate::auth::Claims;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use roost_core::identity::{
    Employee, EmployeeError, EmployeeFilter, EmployeeRole, EmployeeStatus, EmployeeUpdate,
    NewEmployee,
};
use roost_inventory::{import_seats, ImportReport, Seat};
use roost_shared::pii::Masked;
use roost_shared::{PageParams, Paginated};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/seats", get(list_seats).post(create_seat))
        .route("/v1/admin/seats/bulk-upload", post(bulk_upload_seats))
        .route(
            "/v1/admin/seats/{id}",
            patch(update_seat).delete(delete_seat),
        )
        .route(
            "/v1/admin/employees",
            get(list_employees).post(create_employee),
        )
        .route(
            "/v1/admin/employees/bulk-upload",
            post(bulk_upload_employees),
        )
        .route(
            "/v1/admin/employees/{id}",
            patch(update_employee).delete(delete_employee),
        )
        .route("/v1/admin/dashboard/metrics", get(dashboard_metrics))
}

// ============================================================================
// Seats
// ============================================================================

#[derive(Debug, Deserialize)]
struct ListQuery {
    page: Option<u32>,
    page_size: Option<u32>,
    search: Option<String>,
}

/// GET /v1/admin/seats
async fn list_seats(
    State(state): State<AppState>,
    claims: Claims,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<Seat>>, AppError> {
    claims.require_admin()?;

    let page = page_params(query.page, query.page_size);
    let seats = state.seats.list(query.search.as_deref(), page).await?;
    Ok(Json(seats))
}

#[derive(Debug, Deserialize)]
struct SeatPayload {
    seat_number: String,
}

/// POST /v1/admin/seats
async fn create_seat(
    State(state): State<AppState>,
    claims: Claims,
    Json(req): Json<SeatPayload>,
) -> Result<(StatusCode, Json<Seat>), AppError> {
    claims.require_admin()?;

    let seat = state.seats.create(&req.seat_number).await?;
    Ok((StatusCode::CREATED, Json(seat)))
}

/// PATCH /v1/admin/seats/{id}
async fn update_seat(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<Uuid>,
    Json(req): Json<SeatPayload>,
) -> Result<Json<Seat>, AppError> {
    claims.require_admin()?;

    let seat = state.seats.update(id, &req.seat_number).await?;
    Ok(Json(seat))
}

#[derive(Debug, Serialize)]
struct DeleteSeatResponse {
    message: String,
    seat_id: Uuid,
}

/// DELETE /v1/admin/seats/{id}
/// Soft delete; the seat leaves future availability but historic bookings
/// keep their reference.
async fn delete_seat(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteSeatResponse>, AppError> {
    claims.require_admin()?;

    let seat = state.seats.soft_delete(id).await?;
    Ok(Json(DeleteSeatResponse {
        message: "Seat deleted".to_string(),
        seat_id: seat.id,
    }))
}

#[derive(Debug, Deserialize)]
struct BulkSeatUpload {
    seat_numbers: Vec<String>,
}

/// POST /v1/admin/seats/bulk-upload
/// The upload collaborator has already split the file into raw rows.
async fn bulk_upload_seats(
    State(state): State<AppState>,
    claims: Claims,
    Json(req): Json<BulkSeatUpload>,
) -> Result<Json<ImportReport>, AppError> {
    claims.require_admin()?;

    let report = import_seats(state.seats.as_ref(), req.seat_numbers).await;
    Ok(Json(report))
}

// ============================================================================
// Employees
// ============================================================================

#[derive(Debug, Deserialize)]
struct ListEmployeesQuery {
    page: Option<u32>,
    page_size: Option<u32>,
    search: Option<String>,
    role: Option<EmployeeRole>,
    status: Option<EmployeeStatus>,
}

#[derive(Debug, Serialize)]
struct EmployeeResponse {
    id: Uuid,
    badge: String,
    name: String,
    email: Masked<String>,
    role: EmployeeRole,
    status: EmployeeStatus,
    created_at: DateTime<Utc>,
}

impl From<Employee> for EmployeeResponse {
    fn from(employee: Employee) -> Self {
        Self {
            id: employee.id,
            badge: employee.badge,
            name: employee.name,
            email: Masked(employee.email),
            role: employee.role,
            status: employee.status,
            created_at: employee.created_at,
        }
    }
}

/// GET /v1/admin/employees
async fn list_employees(
    State(state): State<AppState>,
    claims: Claims,
    Query(query): Query<ListEmployeesQuery>,
) -> Result<Json<Paginated<EmployeeResponse>>, AppError> {
    claims.require_admin()?;

    let filter = EmployeeFilter {
        search: query.search,
        role: query.role,
        status: query.status,
    };
    let page = page_params(query.page, query.page_size);
    let employees = state.employees.list(&filter, page).await?;
    Ok(Json(employees.map(EmployeeResponse::from)))
}

#[derive(Debug, Deserialize)]
struct CreateEmployeeRequest {
    badge: String,
    name: String,
    email: String,
    role: Option<EmployeeRole>,
}

impl From<CreateEmployeeRequest> for NewEmployee {
    fn from(req: CreateEmployeeRequest) -> Self {
        NewEmployee {
            badge: req.badge,
            name: req.name,
            email: req.email,
            role: req.role.unwrap_or(EmployeeRole::Employee),
        }
    }
}

/// POST /v1/admin/employees
async fn create_employee(
    State(state): State<AppState>,
    claims: Claims,
    Json(req): Json<CreateEmployeeRequest>,
) -> Result<(StatusCode, Json<EmployeeResponse>), AppError> {
    claims.require_admin()?;

    let employee = state.employees.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(employee.into())))
}

#[derive(Debug, Deserialize)]
struct UpdateEmployeeRequest {
    name: Option<String>,
    email: Option<String>,
    role: Option<EmployeeRole>,
    status: Option<EmployeeStatus>,
}

/// PATCH /v1/admin/employees/{id}
async fn update_employee(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateEmployeeRequest>,
) -> Result<Json<EmployeeResponse>, AppError> {
    claims.require_admin()?;

    let update = EmployeeUpdate {
        name: req.name,
        email: req.email,
        role: req.role,
        status: req.status,
    };
    let employee = state.employees.update(id, update).await?;
    Ok(Json(employee.into()))
}

#[derive(Debug, Serialize)]
struct DeleteEmployeeResponse {
    message: String,
}

/// DELETE /v1/admin/employees/{id}
/// Deactivation, not removal; booking history stays reportable.
async fn delete_employee(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteEmployeeResponse>, AppError> {
    claims.require_admin()?;

    state.employees.deactivate(id).await?;
    Ok(Json(DeleteEmployeeResponse {
        message: "Employee deactivated".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
struct BulkEmployeeUpload {
    employees: Vec<CreateEmployeeRequest>,
}

/// POST /v1/admin/employees/bulk-upload
/// Same row-level isolation as the seat import.
async fn bulk_upload_employees(
    State(state): State<AppState>,
    claims: Claims,
    Json(req): Json<BulkEmployeeUpload>,
) -> Result<Json<ImportReport>, AppError> {
    claims.require_admin()?;

    let mut report = ImportReport::default();
    for row in req.employees {
        let badge = row.badge.clone();
        match state.employees.create(row.into()).await {
            Ok(_) => report.note_created(),
            Err(EmployeeError::DuplicateBadge(badge)) => {
                warn!(%badge, "bulk import: duplicate badge skipped");
                report.note_skipped_duplicate();
            }
            Err(err) => {
                warn!(%badge, error = %err, "bulk import: employee row failed");
                report.note_failed();
            }
        }
    }
    Ok(Json(report))
}

// ============================================================================
// Dashboard
// ============================================================================

#[derive(Debug, Serialize)]
struct DashboardMetrics {
    total_employees: u64,
    active_employees: u64,
    inactive_employees: u64,
    total_seats: u64,
    today_bookings: u64,
    today_checked_in: u64,
    today_confirmed: u64,
}

/// GET /v1/admin/dashboard/metrics
async fn dashboard_metrics(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<DashboardMetrics>, AppError> {
    claims.require_admin()?;

    let employees = state.employees.count_by_status().await?;
    let total_seats = state.seats.count_active().await?;
    let today = state.clock.local_now().date();
    let stats = state.manager.ledger().stats_for_date(today).await?;

    Ok(Json(DashboardMetrics {
        total_employees: employees.active + employees.inactive,
        active_employees: employees.active,
        inactive_employees: employees.inactive,
        total_seats,
        today_bookings: stats.total,
        today_checked_in: stats.checked_in,
        today_confirmed: stats.confirmed,
    }))
}

fn page_params(page: Option<u32>, page_size: Option<u32>) -> PageParams {
    PageParams::new(
        page.unwrap_or(1),
        page_size.unwrap_or(roost_shared::pagination::DEFAULT_PAGE_SIZE),
    )
}
