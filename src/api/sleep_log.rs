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
    database::models::sleep_logs,
    errors::AppError,
};

const MAX_NOTES_LEN: usize = 1000;

// --- DTOs (Data Transfer Objects) ---

#[derive(Deserialize, ToSchema, Clone)]
pub struct CreateSleepLogDto {
    pub user_id: i64,
    #[schema(value_type = String, format = DateTime)]
    pub sleep_start: DateTimeUtc,
    #[schema(value_type = String, format = DateTime)]
    pub sleep_end: DateTimeUtc,
    pub quality_score: Option<i16>,
    pub notes: Option<String>,
}

#[derive(Deserialize, ToSchema, Clone)]
pub struct UpdateSleepLogDto {
    #[schema(value_type = String, format = DateTime)]
    pub sleep_start: DateTimeUtc,
    #[schema(value_type = String, format = DateTime)]
    pub sleep_end: DateTimeUtc,
    pub quality_score: Option<i16>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    user_id: Option<i64>,
}

fn validate_entry(
    sleep_start: DateTimeUtc,
    sleep_end: DateTimeUtc,
    quality_score: Option<i16>,
    notes: Option<&str>,
) -> Result<(), AppError> {
    if sleep_end <= sleep_start {
        return Err(AppError::InvalidInput(
            "sleep_end must be after sleep_start".to_string(),
        ));
    }
    if let Some(score) = quality_score {
        if !validation::score_in_range(score) {
            return Err(AppError::InvalidInput(
                "quality_score must be between 1 and 10".to_string(),
            ));
        }
    }
    if let Some(notes) = notes {
        if !validation::ensure_max_len(notes, MAX_NOTES_LEN) {
            return Err(AppError::InvalidInput(format!(
                "notes must be at most {} characters",
                MAX_NOTES_LEN
            )));
        }
    }
    Ok(())
}

// --- Route Handlers ---

#[utoipa::path(
    get,
    path = "/sleeplog",
    tag = "Sleep Log",
    params(
        ("user_id" = Option<i64>, Query, description = "Filter entries by user")
    ),
    responses(
        (status = 200, description = "List sleep log entries", body = [sleep_logs::Model])
    )
)]
#[get("")]
pub async fn get_sleep_logs(
    data: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let mut select = sleep_logs::Entity::find().order_by_desc(sleep_logs::Column::SleepStart);
    if let Some(user_id) = query.user_id {
        select = select.filter(sleep_logs::Column::UserId.eq(user_id));
    }
    let entries = select.all(&data.db).await?;
    Ok(HttpResponse::Ok().json(entries))
}

#[utoipa::path(
    get,
    path = "/sleeplog/{id}",
    tag = "Sleep Log",
    params(
        ("id" = i64, Path, description = "Sleep log entry ID")
    ),
    responses(
        (status = 200, description = "Entry found", body = sleep_logs::Model),
        (status = 404, description = "Entry not found")
    )
)]
#[get("/{id}")]
pub async fn get_sleep_log_by_id(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let entry_id = path.into_inner();
    let entry = sleep_logs::Entity::find_by_id(entry_id)
        .one(&data.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Sleep log entry with id {} not found", entry_id))
        })?;

    Ok(HttpResponse::Ok().json(entry))
}

#[utoipa::path(
    post,
    path = "/sleeplog",
    tag = "Sleep Log",
    request_body = CreateSleepLogDto,
    responses(
        (status = 201, description = "Entry created successfully", body = sleep_logs::Model),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Referenced user not found")
    )
)]
#[post("")]
pub async fn create_sleep_log(
    data: web::Data<AppState>,
    body: web::Json<CreateSleepLogDto>,
) -> Result<HttpResponse, AppError> {
    validate_entry(
        body.sleep_start,
        body.sleep_end,
        body.quality_score,
        body.notes.as_deref(),
    )?;
    helpers::ensure_user_exists(body.user_id, &data.db).await?;

    let entry = sleep_logs::ActiveModel {
        user_id: Set(body.user_id),
        sleep_start: Set(body.sleep_start),
        sleep_end: Set(body.sleep_end),
        quality_score: Set(body.quality_score),
        notes: Set(body.notes.clone()),
        created_at: Set(Some(chrono::Utc::now())),
        ..Default::default()
    };

    let created_entry = entry.insert(&data.db).await?;
    Ok(HttpResponse::Created().json(created_entry))
}

#[utoipa::path(
    put,
    path = "/sleeplog/{id}",
    tag = "Sleep Log",
    params(
        ("id" = i64, Path, description = "Sleep log entry ID")
    ),
    request_body = UpdateSleepLogDto,
    responses(
        (status = 200, description = "Entry updated successfully", body = sleep_logs::Model),
        (status = 404, description = "Entry not found")
    )
)]
#[put("/{id}")]
pub async fn update_sleep_log(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<UpdateSleepLogDto>,
) -> Result<HttpResponse, AppError> {
    validate_entry(
        body.sleep_start,
        body.sleep_end,
        body.quality_score,
        body.notes.as_deref(),
    )?;

    let entry_id = path.into_inner();
    let entry_to_update = sleep_logs::Entity::find_by_id(entry_id)
        .one(&data.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Sleep log entry with id {} not found", entry_id))
        })?;

    let mut active_model = entry_to_update.into_active_model();
    active_model.sleep_start = Set(body.sleep_start);
    active_model.sleep_end = Set(body.sleep_end);
    active_model.quality_score = Set(body.quality_score);
    active_model.notes = Set(body.notes.clone());

    let updated_entry = active_model.update(&data.db).await?;
    Ok(HttpResponse::Ok().json(updated_entry))
}

#[utoipa::path(
    delete,
    path = "/sleeplog/{id}",
    tag = "Sleep Log",
    params(
        ("id" = i64, Path, description = "Sleep log entry ID")
    ),
    responses(
        (status = 204, description = "Entry deleted successfully"),
        (status = 404, description = "Entry not found")
    )
)]
#[delete("/{id}")]
pub async fn delete_sleep_log(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let entry_id = path.into_inner();
    let entry_to_delete = sleep_logs::Entity::find_by_id(entry_id)
        .one(&data.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Sleep log entry with id {} not found", entry_id))
        })?;

    entry_to_delete.into_active_model().delete(&data.db).await?;

    Ok(HttpResponse::NoContent().finish())
}

// Функция для регистрации всех маршрутов этого модуля
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_sleep_logs)
        .service(get_sleep_log_by_id)
        .service(create_sleep_log)
        .service(update_sleep_log)
        .service(delete_sleep_log);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn interval_must_be_positive() {
        let start = chrono::Utc.with_ymd_and_hms(2026, 8, 6, 23, 0, 0).unwrap();
        let end = chrono::Utc.with_ymd_and_hms(2026, 8, 7, 7, 0, 0).unwrap();
        assert!(validate_entry(start, end, Some(8), None).is_ok());
        // конец раньше начала
        assert!(validate_entry(end, start, None, None).is_err());
        assert!(validate_entry(start, start, None, None).is_err());
    }
}
