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
    database::models::mood_logs,
    errors::AppError,
};

const MAX_NOTES_LEN: usize = 1000;

// --- DTOs (Data Transfer Objects) ---

#[derive(Deserialize, ToSchema, Clone)]
pub struct CreateMoodLogDto {
    pub user_id: i64,
    /// Шкала 1..=10
    pub mood_score: i16,
    pub energy_level: Option<i16>,
    pub notes: Option<String>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub logged_at: Option<DateTimeUtc>,
}

#[derive(Deserialize, ToSchema, Clone)]
pub struct UpdateMoodLogDto {
    pub mood_score: i16,
    pub energy_level: Option<i16>,
    pub notes: Option<String>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub logged_at: Option<DateTimeUtc>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    user_id: Option<i64>,
}

fn validate_entry(
    mood_score: i16,
    energy_level: Option<i16>,
    notes: Option<&str>,
) -> Result<(), AppError> {
    if !validation::score_in_range(mood_score) {
        return Err(AppError::InvalidInput(
            "mood_score must be between 1 and 10".to_string(),
        ));
    }
    if let Some(level) = energy_level {
        if !validation::score_in_range(level) {
            return Err(AppError::InvalidInput(
                "energy_level must be between 1 and 10".to_string(),
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
    path = "/moodlog",
    tag = "Mood Log",
    params(
        ("user_id" = Option<i64>, Query, description = "Filter entries by user")
    ),
    responses(
        (status = 200, description = "List mood log entries", body = [mood_logs::Model])
    )
)]
#[get("")]
pub async fn get_mood_logs(
    data: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let mut select = mood_logs::Entity::find().order_by_desc(mood_logs::Column::LoggedAt);
    if let Some(user_id) = query.user_id {
        select = select.filter(mood_logs::Column::UserId.eq(user_id));
    }
    let entries = select.all(&data.db).await?;
    Ok(HttpResponse::Ok().json(entries))
}

#[utoipa::path(
    get,
    path = "/moodlog/{id}",
    tag = "Mood Log",
    params(
        ("id" = i64, Path, description = "Mood log entry ID")
    ),
    responses(
        (status = 200, description = "Entry found", body = mood_logs::Model),
        (status = 404, description = "Entry not found")
    )
)]
#[get("/{id}")]
pub async fn get_mood_log_by_id(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let entry_id = path.into_inner();
    let entry = mood_logs::Entity::find_by_id(entry_id)
        .one(&data.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Mood log entry with id {} not found", entry_id))
        })?;

    Ok(HttpResponse::Ok().json(entry))
}

#[utoipa::path(
    post,
    path = "/moodlog",
    tag = "Mood Log",
    request_body = CreateMoodLogDto,
    responses(
        (status = 201, description = "Entry created successfully", body = mood_logs::Model),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Referenced user not found")
    )
)]
#[post("")]
pub async fn create_mood_log(
    data: web::Data<AppState>,
    body: web::Json<CreateMoodLogDto>,
) -> Result<HttpResponse, AppError> {
    validate_entry(body.mood_score, body.energy_level, body.notes.as_deref())?;
    helpers::ensure_user_exists(body.user_id, &data.db).await?;

    let entry = mood_logs::ActiveModel {
        user_id: Set(body.user_id),
        mood_score: Set(body.mood_score),
        energy_level: Set(body.energy_level),
        notes: Set(body.notes.clone()),
        logged_at: Set(body.logged_at.unwrap_or_else(chrono::Utc::now)),
        created_at: Set(Some(chrono::Utc::now())),
        ..Default::default()
    };

    let created_entry = entry.insert(&data.db).await?;
    Ok(HttpResponse::Created().json(created_entry))
}

#[utoipa::path(
    put,
    path = "/moodlog/{id}",
    tag = "Mood Log",
    params(
        ("id" = i64, Path, description = "Mood log entry ID")
    ),
    request_body = UpdateMoodLogDto,
    responses(
        (status = 200, description = "Entry updated successfully", body = mood_logs::Model),
        (status = 404, description = "Entry not found")
    )
)]
#[put("/{id}")]
pub async fn update_mood_log(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<UpdateMoodLogDto>,
) -> Result<HttpResponse, AppError> {
    validate_entry(body.mood_score, body.energy_level, body.notes.as_deref())?;

    let entry_id = path.into_inner();
    let entry_to_update = mood_logs::Entity::find_by_id(entry_id)
        .one(&data.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Mood log entry with id {} not found", entry_id))
        })?;

    let mut active_model = entry_to_update.into_active_model();
    active_model.mood_score = Set(body.mood_score);
    active_model.energy_level = Set(body.energy_level);
    active_model.notes = Set(body.notes.clone());
    if let Some(logged_at) = body.logged_at {
        active_model.logged_at = Set(logged_at);
    }

    let updated_entry = active_model.update(&data.db).await?;
    Ok(HttpResponse::Ok().json(updated_entry))
}

#[utoipa::path(
    delete,
    path = "/moodlog/{id}",
    tag = "Mood Log",
    params(
        ("id" = i64, Path, description = "Mood log entry ID")
    ),
    responses(
        (status = 204, description = "Entry deleted successfully"),
        (status = 404, description = "Entry not found")
    )
)]
#[delete("/{id}")]
pub async fn delete_mood_log(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let entry_id = path.into_inner();
    let entry_to_delete = mood_logs::Entity::find_by_id(entry_id)
        .one(&data.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Mood log entry with id {} not found", entry_id))
        })?;

    entry_to_delete.into_active_model().delete(&data.db).await?;

    Ok(HttpResponse::NoContent().finish())
}

// Функция для регистрации всех маршрутов этого модуля
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_mood_logs)
        .service(get_mood_log_by_id)
        .service(create_mood_log)
        .service(update_mood_log)
        .service(delete_mood_log);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_outside_scale_are_rejected() {
        assert!(validate_entry(0, None, None).is_err());
        assert!(validate_entry(11, None, None).is_err());
        assert!(validate_entry(5, Some(0), None).is_err());
        assert!(validate_entry(5, Some(7), None).is_ok());
    }

    #[test]
    fn oversized_notes_are_rejected() {
        let notes = "x".repeat(MAX_NOTES_LEN + 1);
        assert!(validate_entry(5, None, Some(&notes)).is_err());
    }
}
