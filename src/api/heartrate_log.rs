use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::prelude::DateTimeUtc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    api::{helpers, validation},
    app_state::AppState,
    database::models::heartrate_logs,
    errors::AppError,
};

const CONTEXTS: &[&str] = &["resting", "active", "exercise"];

// --- DTOs (Data Transfer Objects) ---

#[derive(Deserialize, ToSchema, Clone)]
pub struct CreateHeartRateLogDto {
    pub user_id: i64,
    pub bpm: i16,
    /// resting | active | exercise
    pub context: Option<String>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub measured_at: Option<DateTimeUtc>,
}

#[derive(Deserialize, ToSchema, Clone)]
pub struct UpdateHeartRateLogDto {
    pub bpm: i16,
    pub context: Option<String>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub measured_at: Option<DateTimeUtc>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    user_id: Option<i64>,
}

fn validate_entry(bpm: i16, context: Option<&str>) -> Result<(), AppError> {
    if !validation::bpm_in_range(bpm) {
        return Err(AppError::InvalidInput(
            "bpm must be between 20 and 300".to_string(),
        ));
    }
    if let Some(context) = context {
        if !validation::one_of(context, CONTEXTS) {
            return Err(AppError::InvalidInput(format!(
                "context must be one of {:?}",
                CONTEXTS
            )));
        }
    }
    Ok(())
}

// --- Route Handlers ---

#[utoipa::path(
    get,
    path = "/heartratelog",
    tag = "Heart Rate Log",
    params(
        ("user_id" = Option<i64>, Query, description = "Filter entries by user")
    ),
    responses(
        (status = 200, description = "List heart rate log entries", body = [heartrate_logs::Model])
    )
)]
#[get("")]
pub async fn get_heartrate_logs(
    data: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let mut select =
        heartrate_logs::Entity::find().order_by_desc(heartrate_logs::Column::MeasuredAt);
    if let Some(user_id) = query.user_id {
        select = select.filter(heartrate_logs::Column::UserId.eq(user_id));
    }
    let entries = select.all(&data.db).await?;
    Ok(HttpResponse::Ok().json(entries))
}

#[utoipa::path(
    get,
    path = "/heartratelog/{id}",
    tag = "Heart Rate Log",
    params(
        ("id" = i64, Path, description = "Heart rate log entry ID")
    ),
    responses(
        (status = 200, description = "Entry found", body = heartrate_logs::Model),
        (status = 404, description = "Entry not found")
    )
)]
#[get("/{id}")]
pub async fn get_heartrate_log_by_id(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let entry_id = path.into_inner();
    let entry = heartrate_logs::Entity::find_by_id(entry_id)
        .one(&data.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Heart rate log entry with id {} not found",
                entry_id
            ))
        })?;

    Ok(HttpResponse::Ok().json(entry))
}

#[utoipa::path(
    post,
    path = "/heartratelog",
    tag = "Heart Rate Log",
    request_body = CreateHeartRateLogDto,
    responses(
        (status = 201, description = "Entry created successfully", body = heartrate_logs::Model),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Referenced user not found")
    )
)]
#[post("")]
pub async fn create_heartrate_log(
    data: web::Data<AppState>,
    body: web::Json<CreateHeartRateLogDto>,
) -> Result<HttpResponse, AppError> {
    validate_entry(body.bpm, body.context.as_deref())?;
    helpers::ensure_user_exists(body.user_id, &data.db).await?;

    let entry = heartrate_logs::ActiveModel {
        user_id: Set(body.user_id),
        bpm: Set(body.bpm),
        context: Set(body.context.clone()),
        measured_at: Set(body.measured_at.unwrap_or_else(chrono::Utc::now)),
        created_at: Set(Some(chrono::Utc::now())),
        ..Default::default()
    };

    let created_entry = entry.insert(&data.db).await?;
    Ok(HttpResponse::Created().json(created_entry))
}

#[utoipa::path(
    put,
    path = "/heartratelog/{id}",
    tag = "Heart Rate Log",
    params(
        ("id" = i64, Path, description = "Heart rate log entry ID")
    ),
    request_body = UpdateHeartRateLogDto,
    responses(
        (status = 200, description = "Entry updated successfully", body = heartrate_logs::Model),
        (status = 404, description = "Entry not found")
    )
)]
#[put("/{id}")]
pub async fn update_heartrate_log(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<UpdateHeartRateLogDto>,
) -> Result<HttpResponse, AppError> {
    validate_entry(body.bpm, body.context.as_deref())?;

    let entry_id = path.into_inner();
    let entry_to_update = heartrate_logs::Entity::find_by_id(entry_id)
        .one(&data.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Heart rate log entry with id {} not found",
                entry_id
            ))
        })?;

    let mut active_model = entry_to_update.into_active_model();
    active_model.bpm = Set(body.bpm);
    active_model.context = Set(body.context.clone());
    if let Some(measured_at) = body.measured_at {
        active_model.measured_at = Set(measured_at);
    }

    let updated_entry = active_model.update(&data.db).await?;
    Ok(HttpResponse::Ok().json(updated_entry))
}

#[utoipa::path(
    delete,
    path = "/heartratelog/{id}",
    tag = "Heart Rate Log",
    params(
        ("id" = i64, Path, description = "Heart rate log entry ID")
    ),
    responses(
        (status = 204, description = "Entry deleted successfully"),
        (status = 404, description = "Entry not found")
    )
)]
#[delete("/{id}")]
pub async fn delete_heartrate_log(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let entry_id = path.into_inner();
    let entry_to_delete = heartrate_logs::Entity::find_by_id(entry_id)
        .one(&data.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Heart rate log entry with id {} not found",
                entry_id
            ))
        })?;

    entry_to_delete.into_active_model().delete(&data.db).await?;

    Ok(HttpResponse::NoContent().finish())
}

// Функция для регистрации всех маршрутов этого модуля
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_heartrate_logs)
        .service(get_heartrate_log_by_id)
        .service(create_heartrate_log)
        .service(update_heartrate_log)
        .service(delete_heartrate_log);
}
