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
    database::models::food_logs,
    errors::AppError,
};

const MEAL_TYPES: &[&str] = &["breakfast", "lunch", "dinner", "snack"];
const MAX_NOTES_LEN: usize = 1000;

// --- DTOs (Data Transfer Objects) ---

#[derive(Deserialize, ToSchema, Clone)]
pub struct CreateFoodLogDto {
    pub user_id: i64,
    pub food_name: String,
    pub meal_type: String,
    pub calories: i32,
    pub protein_g: Option<f32>,
    pub carbs_g: Option<f32>,
    pub fat_g: Option<f32>,
    pub notes: Option<String>,
    /// Если не указано, берется момент создания записи
    #[schema(value_type = Option<String>, format = DateTime)]
    pub logged_at: Option<DateTimeUtc>,
}

#[derive(Deserialize, ToSchema, Clone)]
pub struct UpdateFoodLogDto {
    pub food_name: String,
    pub meal_type: String,
    pub calories: i32,
    pub protein_g: Option<f32>,
    pub carbs_g: Option<f32>,
    pub fat_g: Option<f32>,
    pub notes: Option<String>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub logged_at: Option<DateTimeUtc>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    user_id: Option<i64>,
}

fn validate_entry(
    meal_type: &str,
    calories: i32,
    notes: Option<&str>,
) -> Result<(), AppError> {
    if !validation::one_of(meal_type, MEAL_TYPES) {
        return Err(AppError::InvalidInput(format!(
            "meal_type must be one of {:?}",
            MEAL_TYPES
        )));
    }
    if calories < 0 {
        return Err(AppError::InvalidInput(
            "calories must not be negative".to_string(),
        ));
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
    path = "/foodlog",
    tag = "Food Log",
    params(
        ("user_id" = Option<i64>, Query, description = "Filter entries by user")
    ),
    responses(
        (status = 200, description = "List food log entries", body = [food_logs::Model])
    )
)]
#[get("")]
pub async fn get_food_logs(
    data: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let mut select = food_logs::Entity::find().order_by_desc(food_logs::Column::LoggedAt);
    if let Some(user_id) = query.user_id {
        select = select.filter(food_logs::Column::UserId.eq(user_id));
    }
    let entries = select.all(&data.db).await?;
    Ok(HttpResponse::Ok().json(entries))
}

#[utoipa::path(
    get,
    path = "/foodlog/{id}",
    tag = "Food Log",
    params(
        ("id" = i64, Path, description = "Food log entry ID")
    ),
    responses(
        (status = 200, description = "Entry found", body = food_logs::Model),
        (status = 404, description = "Entry not found")
    )
)]
#[get("/{id}")]
pub async fn get_food_log_by_id(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let entry_id = path.into_inner();
    let entry = food_logs::Entity::find_by_id(entry_id)
        .one(&data.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Food log entry with id {} not found", entry_id))
        })?;

    Ok(HttpResponse::Ok().json(entry))
}

#[utoipa::path(
    post,
    path = "/foodlog",
    tag = "Food Log",
    request_body = CreateFoodLogDto,
    responses(
        (status = 201, description = "Entry created successfully", body = food_logs::Model),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Referenced user not found")
    )
)]
#[post("")]
pub async fn create_food_log(
    data: web::Data<AppState>,
    body: web::Json<CreateFoodLogDto>,
) -> Result<HttpResponse, AppError> {
    validate_entry(&body.meal_type, body.calories, body.notes.as_deref())?;
    helpers::ensure_user_exists(body.user_id, &data.db).await?;

    let entry = food_logs::ActiveModel {
        user_id: Set(body.user_id),
        food_name: Set(body.food_name.clone()),
        meal_type: Set(body.meal_type.clone()),
        calories: Set(body.calories),
        protein_g: Set(body.protein_g),
        carbs_g: Set(body.carbs_g),
        fat_g: Set(body.fat_g),
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
    path = "/foodlog/{id}",
    tag = "Food Log",
    params(
        ("id" = i64, Path, description = "Food log entry ID")
    ),
    request_body = UpdateFoodLogDto,
    responses(
        (status = 200, description = "Entry updated successfully", body = food_logs::Model),
        (status = 404, description = "Entry not found")
    )
)]
#[put("/{id}")]
pub async fn update_food_log(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<UpdateFoodLogDto>,
) -> Result<HttpResponse, AppError> {
    validate_entry(&body.meal_type, body.calories, body.notes.as_deref())?;

    let entry_id = path.into_inner();
    let entry_to_update = food_logs::Entity::find_by_id(entry_id)
        .one(&data.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Food log entry with id {} not found", entry_id))
        })?;

    let mut active_model = entry_to_update.into_active_model();
    active_model.food_name = Set(body.food_name.clone());
    active_model.meal_type = Set(body.meal_type.clone());
    active_model.calories = Set(body.calories);
    active_model.protein_g = Set(body.protein_g);
    active_model.carbs_g = Set(body.carbs_g);
    active_model.fat_g = Set(body.fat_g);
    active_model.notes = Set(body.notes.clone());
    if let Some(logged_at) = body.logged_at {
        active_model.logged_at = Set(logged_at);
    }

    let updated_entry = active_model.update(&data.db).await?;
    Ok(HttpResponse::Ok().json(updated_entry))
}

#[utoipa::path(
    delete,
    path = "/foodlog/{id}",
    tag = "Food Log",
    params(
        ("id" = i64, Path, description = "Food log entry ID")
    ),
    responses(
        (status = 204, description = "Entry deleted successfully"),
        (status = 404, description = "Entry not found")
    )
)]
#[delete("/{id}")]
pub async fn delete_food_log(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let entry_id = path.into_inner();
    let entry_to_delete = food_logs::Entity::find_by_id(entry_id)
        .one(&data.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Food log entry with id {} not found", entry_id))
        })?;

    entry_to_delete.into_active_model().delete(&data.db).await?;

    Ok(HttpResponse::NoContent().finish())
}

// Функция для регистрации всех маршрутов этого модуля.
// Пути только относительные: префикс назначает composition root.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_food_logs)
        .service(get_food_log_by_id)
        .service(create_food_log)
        .service(update_food_log)
        .service(delete_food_log);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::database::models::users;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};

    fn test_config() -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            secret_key: "test-secret".to_string(),
            db_user: "root".to_string(),
            db_password: "hunter2".to_string(),
            db_host: "localhost".to_string(),
            db_port: 3306,
            db_name: "healthlog_test".to_string(),
        }
    }

    fn sample_entry(id: i64) -> food_logs::Model {
        food_logs::Model {
            id,
            user_id: 1,
            food_name: "Oatmeal".to_string(),
            meal_type: "breakfast".to_string(),
            calories: 350,
            protein_g: Some(12.0),
            carbs_g: Some(60.0),
            fat_g: Some(6.5),
            notes: None,
            logged_at: chrono::Utc::now(),
            created_at: Some(chrono::Utc::now()),
        }
    }

    fn sample_user() -> users::Model {
        users::Model {
            id: 1,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$2b$12$hash".to_string(),
            role: "member".to_string(),
            is_active: Some(true),
            created_at: None,
            updated_at: None,
        }
    }

    fn state_with(db: DatabaseConnection) -> web::Data<AppState> {
        web::Data::new(AppState {
            db,
            config: test_config(),
        })
    }

    #[actix_web::test]
    async fn list_returns_all_entries() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![sample_entry(1), sample_entry(2)]])
            .into_connection();
        let app = test::init_service(
            App::new()
                .app_data(state_with(db))
                .service(web::scope("/foodlog").configure(configure)),
        )
        .await;

        let req = test::TestRequest::get().uri("/foodlog").to_request();
        let entries: Vec<food_logs::Model> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].food_name, "Oatmeal");
    }

    #[actix_web::test]
    async fn get_unknown_id_returns_not_found() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([Vec::<food_logs::Model>::new()])
            .into_connection();
        let app = test::init_service(
            App::new()
                .app_data(state_with(db))
                .service(web::scope("/foodlog").configure(configure)),
        )
        .await;

        let req = test::TestRequest::get().uri("/foodlog/42").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn create_rejects_unknown_meal_type() {
        let db = MockDatabase::new(DatabaseBackend::MySql).into_connection();
        let app = test::init_service(
            App::new()
                .app_data(state_with(db))
                .service(web::scope("/foodlog").configure(configure)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/foodlog")
            .set_json(serde_json::json!({
                "user_id": 1,
                "food_name": "Pancakes",
                "meal_type": "brunch",
                "calories": 500
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn create_persists_valid_entry() {
        let created = sample_entry(5);
        let db = MockDatabase::new(DatabaseBackend::MySql)
            // lookup of the referenced user
            .append_query_results([vec![sample_user()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 5,
                rows_affected: 1,
            }])
            // re-select of the inserted row
            .append_query_results([vec![created.clone()]])
            .into_connection();
        let app = test::init_service(
            App::new()
                .app_data(state_with(db))
                .service(web::scope("/foodlog").configure(configure)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/foodlog")
            .set_json(serde_json::json!({
                "user_id": 1,
                "food_name": "Oatmeal",
                "meal_type": "breakfast",
                "calories": 350
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: food_logs::Model = test::read_body_json(resp).await;
        assert_eq!(body.id, 5);
    }

    #[actix_web::test]
    async fn delete_removes_existing_entry() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![sample_entry(3)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let app = test::init_service(
            App::new()
                .app_data(state_with(db))
                .service(web::scope("/foodlog").configure(configure)),
        )
        .await;

        let req = test::TestRequest::delete().uri("/foodlog/3").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }
}
