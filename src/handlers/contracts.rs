use actix_web::{HttpResponse, Responder, ResponseError, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::config::ScheduleConfig;
use crate::db::contracts as contract_db;
use crate::models::contracts::{
    CancelContract, CompleteContract, ConfirmContract, ContractListQuery, CreateContract,
    UpdateContract, ValidateSchedule,
};

/// GET /api/contracts: filtered, paginated list of active contracts.
pub async fn get_contracts(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<ScheduleConfig>,
    query: web::Query<ContractListQuery>,
) -> impl Responder {
    let today = config.local_now().date();

    match contract_db::list_contracts(db.get_ref(), &query, today).await {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(e) => e.error_response(),
    }
}

/// GET /api/contracts/upcoming: booked contracts from today on.
pub async fn get_upcoming_contracts(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<ScheduleConfig>,
) -> impl Responder {
    let today = config.local_now().date();

    match contract_db::upcoming_contracts(db.get_ref(), today).await {
        Ok(contracts) => HttpResponse::Ok().json(contracts),
        Err(e) => e.error_response(),
    }
}

/// GET /api/contracts/statistics
pub async fn get_statistics(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<ScheduleConfig>,
) -> impl Responder {
    let today = config.local_now().date();

    match contract_db::contract_statistics(db.get_ref(), today).await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => e.error_response(),
    }
}

/// POST /api/contracts/validate_schedule: dry-run conflict check, nothing is written.
pub async fn validate_schedule(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<ScheduleConfig>,
    body: web::Json<ValidateSchedule>,
) -> impl Responder {
    let body = body.into_inner();

    match contract_db::validate_schedule(
        db.get_ref(),
        body.event_date,
        body.start_time,
        body.end_time,
        body.contract_id,
        **config,
    )
    .await
    {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => e.error_response(),
    }
}

/// POST /api/contracts
pub async fn create_contract(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<ScheduleConfig>,
    body: web::Json<CreateContract>,
) -> impl Responder {
    tracing::debug!(actor = user.0.actor(), "Creating contract");

    match contract_db::create_contract(db.get_ref(), body.into_inner(), **config).await {
        Ok(contract) => HttpResponse::Created().json(contract),
        Err(e) => e.error_response(),
    }
}

/// GET /api/contracts/{id}
pub async fn get_contract(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<ScheduleConfig>,
    path: web::Path<Uuid>,
) -> impl Responder {
    match contract_db::get_contract(db.get_ref(), path.into_inner(), **config).await {
        Ok(contract) => HttpResponse::Ok().json(contract),
        Err(e) => e.error_response(),
    }
}

/// PUT / PATCH /api/contracts/{id}: partial update; computed fields are re-derived.
pub async fn update_contract(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<ScheduleConfig>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateContract>,
) -> impl Responder {
    let id = path.into_inner();
    tracing::debug!(actor = user.0.actor(), %id, "Updating contract");

    match contract_db::update_contract(db.get_ref(), id, body.into_inner(), **config).await {
        Ok(contract) => HttpResponse::Ok().json(contract),
        Err(e) => e.error_response(),
    }
}

/// DELETE /api/contracts/{id}: soft delete.
pub async fn delete_contract(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let id = path.into_inner();
    tracing::debug!(actor = user.0.actor(), %id, "Deleting contract");

    match contract_db::delete_contract(db.get_ref(), id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.error_response(),
    }
}

/// POST /api/contracts/{id}/restore
pub async fn restore_contract(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<ScheduleConfig>,
    path: web::Path<Uuid>,
) -> impl Responder {
    match contract_db::restore_contract(db.get_ref(), path.into_inner(), **config).await {
        Ok(contract) => HttpResponse::Ok().json(contract),
        Err(e) => e.error_response(),
    }
}

/// POST /api/contracts/{id}/confirm: record the advance and confirm.
pub async fn confirm_contract(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<ScheduleConfig>,
    path: web::Path<Uuid>,
    body: web::Json<ConfirmContract>,
) -> impl Responder {
    match contract_db::confirm_contract(db.get_ref(), path.into_inner(), body.into_inner(), **config)
        .await
    {
        Ok(contract) => HttpResponse::Ok().json(contract),
        Err(e) => e.error_response(),
    }
}

/// POST /api/contracts/{id}/cancel
pub async fn cancel_contract(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<ScheduleConfig>,
    path: web::Path<Uuid>,
    body: web::Json<CancelContract>,
) -> impl Responder {
    match contract_db::cancel_contract(db.get_ref(), path.into_inner(), body.into_inner(), **config)
        .await
    {
        Ok(contract) => HttpResponse::Ok().json(contract),
        Err(e) => e.error_response(),
    }
}

/// POST /api/contracts/{id}/start
pub async fn start_contract(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<ScheduleConfig>,
    path: web::Path<Uuid>,
) -> impl Responder {
    match contract_db::start_contract(db.get_ref(), path.into_inner(), **config).await {
        Ok(contract) => HttpResponse::Ok().json(contract),
        Err(e) => e.error_response(),
    }
}

/// POST /api/contracts/{id}/complete: the body is optional.
pub async fn complete_contract(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<ScheduleConfig>,
    path: web::Path<Uuid>,
    body: Option<web::Json<CompleteContract>>,
) -> impl Responder {
    let input = body.map(web::Json::into_inner).unwrap_or_default();

    match contract_db::complete_contract(db.get_ref(), path.into_inner(), input, **config).await {
        Ok(contract) => HttpResponse::Ok().json(contract),
        Err(e) => e.error_response(),
    }
}

/// GET /api/contracts/{id}/validate_schedule: re-check a stored contract.
pub async fn validate_contract_schedule(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<ScheduleConfig>,
    path: web::Path<Uuid>,
) -> impl Responder {
    match contract_db::validate_contract_schedule(db.get_ref(), path.into_inner(), **config).await
    {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => e.error_response(),
    }
}
