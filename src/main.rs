use actix_web::{App, HttpServer, middleware, web};
use dotenvy::dotenv;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use healthlog::api::middleware::RequestId;
use healthlog::api::{admin, food_log, heartrate_log, mood_log, sleep_log, workout_log};
use healthlog::app::Application;
use healthlog::database::models::{
    food_logs, heartrate_logs, mood_logs, sleep_logs, users, workout_logs,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let app = Application::build()
        .await
        .expect("Failed to build application");

    #[derive(OpenApi)]
    #[openapi(
        paths(
            // Food log
            food_log::get_food_logs,
            food_log::get_food_log_by_id,
            food_log::create_food_log,
            food_log::update_food_log,
            food_log::delete_food_log,
            // Mood log
            mood_log::get_mood_logs,
            mood_log::get_mood_log_by_id,
            mood_log::create_mood_log,
            mood_log::update_mood_log,
            mood_log::delete_mood_log,
            // Sleep log
            sleep_log::get_sleep_logs,
            sleep_log::get_sleep_log_by_id,
            sleep_log::create_sleep_log,
            sleep_log::update_sleep_log,
            sleep_log::delete_sleep_log,
            // Heart rate log
            heartrate_log::get_heartrate_logs,
            heartrate_log::get_heartrate_log_by_id,
            heartrate_log::create_heartrate_log,
            heartrate_log::update_heartrate_log,
            heartrate_log::delete_heartrate_log,
            // Workout log
            workout_log::get_workout_logs,
            workout_log::get_workout_log_by_id,
            workout_log::create_workout_log,
            workout_log::update_workout_log,
            workout_log::delete_workout_log,
            // Admin
            admin::get_users,
            admin::get_user_by_id,
            admin::create_user,
            admin::update_user,
            admin::delete_user,
            admin::get_stats,
        ),
        components(
            schemas(
                // --- Models ---
                users::Model,
                food_logs::Model,
                mood_logs::Model,
                sleep_logs::Model,
                heartrate_logs::Model,
                workout_logs::Model,

                // --- DTOs & API Structs ---
                food_log::CreateFoodLogDto,
                food_log::UpdateFoodLogDto,
                mood_log::CreateMoodLogDto,
                mood_log::UpdateMoodLogDto,
                sleep_log::CreateSleepLogDto,
                sleep_log::UpdateSleepLogDto,
                heartrate_log::CreateHeartRateLogDto,
                heartrate_log::UpdateHeartRateLogDto,
                workout_log::CreateWorkoutLogDto,
                workout_log::UpdateWorkoutLogDto,
                admin::CreateUserDto,
                admin::UpdateUserDto,
                admin::AdminStats,
            )
        ),
        tags(
            (name = "Food Log", description = "Food intake logging endpoints"),
            (name = "Mood Log", description = "Mood logging endpoints"),
            (name = "Sleep Log", description = "Sleep interval logging endpoints"),
            (name = "Heart Rate Log", description = "Heart rate measurement endpoints"),
            (name = "Workout Log", description = "Workout logging endpoints"),
            (name = "Admin", description = "User administration and statistics endpoints")
        )
    )]
    struct ApiDoc;

    let host = app.config.host.clone();
    let port = app.config.port;

    log::info!("Starting server at http://{}:{}", host, port);
    log::info!("Swagger UI available at http://{}:{}/swagger-ui/", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::NormalizePath::trim())
            .wrap(RequestId)
            .app_data(web::Data::new(app.app_state()))
            .configure(|cfg| app.configure(cfg))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
