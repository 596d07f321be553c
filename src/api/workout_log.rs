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
    database::models::workout_logs,
    errors::AppError,
};

const INTENSITIES: &[&str] = &["low", "moderate", "high"];
const MAX_NOTES_LEN: usize = 1000;

// --- DTOs (Data Transfer Objects) ---

#[derive(Deserialize, ToSchema, Clone)]
pub struct CreateWorkoutLogDto {
    pub user_id: i64,
    pub workout_type: String,
    pub duration_min: i32,
    pub calories_burned: Option<i32>,
    /// low | moderate | high
    pub intensity: Option<String>,
    pub notes: Option<String>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub logged_at: Option<DateTimeUtc>,
}

#[derive(Deserialize, ToSchema, Clone)]
pub struct UpdateWorkoutLogDto {
    pub workout_type: String,
    pub duration_min: i32,
    pub calories_burned: Option<i32>,
    pub intensity: Option<String>,
    pub notes: Option<String>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub logged_at: Option<DateTimeUtc>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    user_id: Option<i64>,
}

fn validate_entry(
    workout_type: &str,
    duration_min: i32,
    calories_burned: Option<i32>,
    intensity: Option<&str>,
    notes: Option<&str>,
) -> Result<(), AppError> {
    if workout_type.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "workout_type must not be empty".to_string(),
        ));
    }
    if duration_min <= 0 {
        return Err(AppError::InvalidInput(
            "duration_min must be positive".to_string(),
        ));
    }
    if let Some(calories) = calories_burned {
        if calories < 0 {
            return Err(AppError::InvalidInput(
                "calories_burned must not be negative".to_string(),
            ));
        }
    }
    if let Some(intensity) = intensity {
        if !validation::one_of(intensity, INTENSITIES) {
            return Err(AppError::InvalidInput(format!(
                "intensity must be one of {:?}",
                INTENSITIES
            )));
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
    path = "/workoutlog",
    tag = "Workout Log",
    params(
        ("user_id" = Option<i64>, Query, description = "Filter entries by user")
    ),
    responses(
        (status = 200, description = "List workout log entries", body = [workout_logs::Model])
    )
)]
#[get("")]
pub async fn get_workout_logs(
    data: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let mut select = workout_logs::Entity::find().order_by_desc(workout_logs::Column::LoggedAt);
    if let Some(user_id) = query.user_id {
        select = select.filter(workout_logs::Column::UserId.eq(user_id));
    }
    let entries = select.all(&data.db).await?;
    Ok(HttpResponse::Ok().json(entries))
}

#[utoipa::path(
    get,
    path = "/workoutlog/{id}",
    tag = "Workout Log",
    params(
        ("id" = i64, Path, description = "Workout log entry ID")
    ),
    responses(
        (status = 200, description = "Entry found", body = workout_logs::Model),
        (status = 404, description = "Entry not found")
    )
)]
#[get("/{id}")]
pub async fn get_workout_log_by_id(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let entry_id = path.into_inner();
    let entry = workout_logs::Entity::find_by_id(entry_id)
        .one(&data.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Workout log entry with id {} not found", entry_id))
        })?;

    Ok(HttpResponse::Ok().json(entry))
}

#[utoipa::path(
    post,
    path = "/workoutlog",
    tag = "Workout Log",
    request_body = CreateWorkoutLogDto,
    responses(
        (status = 201, description = "Entry created successfully", body = workout_logs::Model),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Referenced user not found")
    )
)]
#[post("")]
pub async fn create_workout_log(
    data: web::Data<AppState>,
    body: web::Json<CreateWorkoutLogDto>,
) -> Result<HttpResponse, AppError> {
    validate_entry(
        &body.workout_type,
        body.duration_min,
        body.calories_burned,
        body.intensity.as_deref(),
        body.notes.as_deref(),
    )?;
    helpers::ensure_user_exists(body.user_id, &data.db).await?;

    let entry = workout_logs::ActiveModel {
        user_id: Set(body.user_id),
        workout_type: Set(body.workout_type.trim().to_string()),
        duration_min: Set(body.duration_min),
        calories_burned: Set(body.calories_burned),
        intensity: Set(body.intensity.clone()),
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
    path = "/workoutlog/{id}",
    tag = "Workout Log",
    params(
        ("id" = i64, Path, description = "Workout log entry ID")
    ),
    request_body = UpdateWorkoutLogDto,
    responses(
        (status = 200, description = "Entry updated successfully", body = workout_logs::Model),
        (status = 404, description = "Entry not found")
    )
)]
#[put("/{id}")]
pub async fn update_workout_log(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<UpdateWorkoutLogDto>,
) -> Result<HttpResponse, AppError> {
    validate_entry(
        &body.workout_type,
        body.duration_min,
        body.calories_burned,
        body.intensity.as_deref(),
        body.notes.as_deref(),
    )?;

    let entry_id = path.into_inner();
    let entry_to_update = workout_logs::Entity::find_by_id(entry_id)
        .one(&data.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Workout log entry with id {} not found", entry_id))
        })?;

    let mut active_model = entry_to_update.into_active_model();
    active_model.workout_type = Set(body.workout_type.trim().to_string());
    active_model.duration_min = Set(body.duration_min);
    active_model.calories_burned = Set(body.calories_burned);
    active_model.intensity = Set(body.intensity.clone());
    active_model.notes = Set(body.notes.clone());
    if let Some(logged_at) = body.logged_at {
        active_model.logged_at = Set(logged_at);
    }

    let updated_entry = active_model.update(&data.db).await?;
    Ok(HttpResponse::Ok().json(updated_entry))
}

#[utoipa::path(
    delete,
    path = "/workoutlog/{id}",
    tag = "Workout Log",
    params(
        ("id" = i64, Path, description = "Workout log entry ID")
    ),
    responses(
        (status = 204, description = "Entry deleted successfully"),
        (status = 404, description = "Entry not found")
    )
)]
#[delete("/{id}")]
pub async fn delete_workout_log(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let entry_id = path.into_inner();
    let entry_to_delete = workout_logs::Entity::find_by_id(entry_id)
        .one(&data.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Workout log entry with id {} not found", entry_id))
        })?;

    entry_to_delete.into_active_model().delete(&data.db).await?;

    Ok(HttpResponse::NoContent().finish())
}

// Функция для регистрации всех маршрутов этого модуля
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_workout_logs)
        .service(get_workout_log_by_id)
        .service(create_workout_log)
        .service(update_workout_log)
        .service(delete_workout_log);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn duration_and_intensity_are_validated() {
        assert!(validate_entry("run", 0, None, None, None).is_err());
        assert!(validate_entry("run", 30, Some(-1), None, None).is_err());
        assert!(validate_entry("run", 30, None, Some("extreme"), None).is_err());
        assert!(validate_entry("  ", 30, None, None, None).is_err());
        assert!(validate_entry("run", 30, Some(250), Some("high"), None).is_ok());
    }

    #[actix_web::test]
    async fn update_of_unknown_entry_returns_not_found() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([Vec::<workout_logs::Model>::new()])
            .into_connection();
        let state = web::Data::new(AppState {
            db,
            config: Config {
                host: "127.0.0.1".to_string(),
                port: 8080,
                secret_key: "test-secret".to_string(),
                db_user: "root".to_string(),
                db_password: "hunter2".to_string(),
                db_host: "localhost".to_string(),
                db_port: 3306,
                db_name: "healthlog_test".to_string(),
            },
        });
        let app = test::init_service(
            App::new()
                .app_data(state)
                .service(web::scope("/workoutlog").configure(configure)),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/workoutlog/99")
            .set_json(serde_json::json!({
                "workout_type": "run",
                "duration_min": 30
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
