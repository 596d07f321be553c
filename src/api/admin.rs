use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    api::validation,
    app_state::AppState,
    database::models::{food_logs, heartrate_logs, mood_logs, sleep_logs, users, workout_logs},
    errors::AppError,
};

const ROLES: &[&str] = &["admin", "member"];

// --- DTOs (Data Transfer Objects) ---

#[derive(Deserialize, ToSchema, Clone)]
pub struct CreateUserDto {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Deserialize, ToSchema, Clone)]
pub struct UpdateUserDto {
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_active: Option<bool>,
    /// Если указан, пароль перезаписывается
    pub password: Option<String>,
}

/// Сводка по таблицам приложения
#[derive(Serialize, ToSchema)]
pub struct AdminStats {
    pub users: u64,
    pub food_logs: u64,
    pub mood_logs: u64,
    pub sleep_logs: u64,
    pub heartrate_logs: u64,
    pub workout_logs: u64,
}

fn validate_user(name: &str, email: &str, role: Option<&str>) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::InvalidInput("name must not be empty".to_string()));
    }
    if !validation::validate_email(email) {
        return Err(AppError::InvalidInput(format!(
            "'{}' is not a valid email address",
            email
        )));
    }
    if let Some(role) = role {
        if !validation::one_of(role, ROLES) {
            return Err(AppError::InvalidInput(format!(
                "role must be one of {:?}",
                ROLES
            )));
        }
    }
    Ok(())
}

// --- Route Handlers ---

#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "Admin",
    responses(
        (status = 200, description = "List all user accounts", body = [users::Model])
    )
)]
#[get("/users")]
pub async fn get_users(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let accounts = users::Entity::find().all(&data.db).await?;
    Ok(HttpResponse::Ok().json(accounts))
}

#[utoipa::path(
    get,
    path = "/admin/users/{id}",
    tag = "Admin",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = users::Model),
        (status = 404, description = "User not found")
    )
)]
#[get("/users/{id}")]
pub async fn get_user_by_id(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let user = users::Entity::find_by_id(user_id)
        .one(&data.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user_id)))?;

    Ok(HttpResponse::Ok().json(user))
}

#[utoipa::path(
    post,
    path = "/admin/users",
    tag = "Admin",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created successfully", body = users::Model),
        (status = 400, description = "Invalid input, e.g., user already exists")
    )
)]
#[post("/users")]
pub async fn create_user(
    data: web::Data<AppState>,
    body: web::Json<CreateUserDto>,
) -> Result<HttpResponse, AppError> {
    validate_user(&body.name, &body.email, body.role.as_deref())?;

    // Проверка на существующего пользователя
    let existing_user = users::Entity::find()
        .filter(users::Column::Email.eq(body.email.clone()))
        .one(&data.db)
        .await?;

    if existing_user.is_some() {
        return Err(AppError::InvalidInput(format!(
            "User with email {} already exists",
            body.email
        )));
    }

    let password_hash = bcrypt::hash(&body.password, bcrypt::DEFAULT_COST)?;

    let new_user = users::ActiveModel {
        name: Set(body.name.trim().to_string()),
        email: Set(body.email.clone()),
        password_hash: Set(password_hash),
        role: Set(body.role.clone().unwrap_or_else(|| "member".to_string())),
        is_active: Set(Some(true)),
        created_at: Set(Some(chrono::Utc::now())),
        ..Default::default()
    };

    let created_user = new_user.insert(&data.db).await?;
    Ok(HttpResponse::Created().json(created_user))
}

#[utoipa::path(
    put,
    path = "/admin/users/{id}",
    tag = "Admin",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated successfully", body = users::Model),
        (status = 404, description = "User not found")
    )
)]
#[put("/users/{id}")]
pub async fn update_user(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<UpdateUserDto>,
) -> Result<HttpResponse, AppError> {
    validate_user(&body.name, &body.email, Some(&body.role))?;

    let user_id = path.into_inner();
    let user_to_update = users::Entity::find_by_id(user_id)
        .one(&data.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user_id)))?;

    let mut active_model = user_to_update.into_active_model();
    active_model.name = Set(body.name.trim().to_string());
    active_model.email = Set(body.email.clone());
    active_model.role = Set(body.role.clone());
    active_model.is_active = Set(body.is_active);
    if let Some(password) = &body.password {
        active_model.password_hash = Set(bcrypt::hash(password, bcrypt::DEFAULT_COST)?);
    }
    active_model.updated_at = Set(Some(chrono::Utc::now()));

    let updated_user = active_model.update(&data.db).await?;
    Ok(HttpResponse::Ok().json(updated_user))
}

#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    tag = "Admin",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted successfully"),
        (status = 404, description = "User not found")
    )
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let user_to_delete = users::Entity::find_by_id(user_id)
        .one(&data.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user_id)))?;

    user_to_delete.into_active_model().delete(&data.db).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Получает сводку по количеству записей в каждой таблице
#[utoipa::path(
    get,
    path = "/admin/stats",
    tag = "Admin",
    responses(
        (status = 200, description = "Row counts per table", body = AdminStats)
    )
)]
#[get("/stats")]
pub async fn get_stats(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let stats = AdminStats {
        users: users::Entity::find().count(&data.db).await?,
        food_logs: food_logs::Entity::find().count(&data.db).await?,
        mood_logs: mood_logs::Entity::find().count(&data.db).await?,
        sleep_logs: sleep_logs::Entity::find().count(&data.db).await?,
        heartrate_logs: heartrate_logs::Entity::find().count(&data.db).await?,
        workout_logs: workout_logs::Entity::find().count(&data.db).await?,
    };

    Ok(HttpResponse::Ok().json(stats))
}

// Функция для регистрации всех маршрутов этого модуля
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_users)
        .service(get_user_by_id)
        .service(create_user)
        .service(update_user)
        .service(delete_user)
        .service(get_stats);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};

    fn state_with(db: DatabaseConnection) -> web::Data<AppState> {
        web::Data::new(AppState {
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
        })
    }

    fn sample_user(id: i64) -> users::Model {
        users::Model {
            id,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$2b$12$hash".to_string(),
            role: "member".to_string(),
            is_active: Some(true),
            created_at: None,
            updated_at: None,
        }
    }

    #[actix_web::test]
    async fn create_rejects_malformed_email() {
        let db = MockDatabase::new(DatabaseBackend::MySql).into_connection();
        let app = test::init_service(
            App::new()
                .app_data(state_with(db))
                .service(web::scope("/admin").configure(configure)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/admin/users")
            .set_json(serde_json::json!({
                "name": "Ada",
                "email": "not-an-email",
                "password": "s3cret"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn create_rejects_duplicate_email() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![sample_user(1)]])
            .into_connection();
        let app = test::init_service(
            App::new()
                .app_data(state_with(db))
                .service(web::scope("/admin").configure(configure)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/admin/users")
            .set_json(serde_json::json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "s3cret"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn created_user_response_never_contains_hash() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            // duplicate-email pre-check comes back empty
            .append_query_results([Vec::<users::Model>::new()])
            .append_exec_results([MockExecResult {
                last_insert_id: 7,
                rows_affected: 1,
            }])
            .append_query_results([vec![sample_user(7)]])
            .into_connection();
        let app = test::init_service(
            App::new()
                .app_data(state_with(db))
                .service(web::scope("/admin").configure(configure)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/admin/users")
            .set_json(serde_json::json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "s3cret"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["id"], 7);
        assert!(body.get("password_hash").is_none());
    }

    #[actix_web::test]
    async fn list_users_returns_accounts() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![sample_user(1), sample_user(2)]])
            .into_connection();
        let app = test::init_service(
            App::new()
                .app_data(state_with(db))
                .service(web::scope("/admin").configure(configure)),
        )
        .await;

        let req = test::TestRequest::get().uri("/admin/users").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
    }
}
