use actix_web::web;

use crate::api;
use crate::app_state::AppState;
use crate::config::Config;
use crate::database::{self, DB};
use crate::errors::StartupError;

/// Именованная группа маршрутов, монтируемая под URL-префиксом.
///
/// Модуль регистрирует только относительные пути; префикс назначается
/// здесь, поэтому модуль можно перемонтировать без изменений.
#[derive(Clone, Copy)]
pub struct RouteGroup {
    pub name: &'static str,
    pub prefix: &'static str,
    pub configure: fn(&mut web::ServiceConfig),
}

impl RouteGroup {
    pub const fn new(
        name: &'static str,
        prefix: &'static str,
        configure: fn(&mut web::ServiceConfig),
    ) -> Self {
        Self {
            name,
            prefix,
            configure,
        }
    }
}

/// Fixed registration list. Order is deterministic; prefixes must be disjoint.
pub fn route_groups() -> Vec<RouteGroup> {
    vec![
        RouteGroup::new("foodlog", "/foodlog", api::food_log::configure),
        RouteGroup::new("moodlog", "/moodlog", api::mood_log::configure),
        RouteGroup::new("sleeplog", "/sleeplog", api::sleep_log::configure),
        RouteGroup::new("heartratelog", "/heartratelog", api::heartrate_log::configure),
        RouteGroup::new("workoutlog", "/workoutlog", api::workout_log::configure),
        RouteGroup::new("admin", "/admin", api::admin::configure),
    ]
}

/// Два модуля не могут претендовать на один префикс: это ошибка
/// программирования, обнаруживаемая до начала обслуживания.
fn ensure_distinct_prefixes(groups: &[RouteGroup]) -> Result<(), StartupError> {
    for (i, group) in groups.iter().enumerate() {
        if groups[..i].iter().any(|other| other.prefix == group.prefix) {
            return Err(StartupError::RouteConflict {
                prefix: group.prefix,
            });
        }
    }
    Ok(())
}

/// Mounts every group under its prefix. Shared by the server and by tests.
pub fn mount_route_groups(groups: &[RouteGroup], cfg: &mut web::ServiceConfig) {
    for group in groups {
        log::debug!("mounting route group '{}' at {}", group.name, group.prefix);
        cfg.service(web::scope(group.prefix).configure(group.configure));
    }
}

/// Собранное приложение: конфигурация, общий пул и таблица маршрутов.
#[derive(Clone)]
pub struct Application {
    pub config: Config,
    pub db: DB,
    route_groups: Vec<RouteGroup>,
}

impl Application {
    /// Linear startup sequence: configuration, database, route registry.
    /// Each failure is fatal and aborts construction (fail-fast).
    pub async fn build() -> Result<Self, StartupError> {
        let config = Config::from_env()?;
        Self::build_with_config(config).await
    }

    /// Same sequence with an externally supplied configuration
    /// (тесты и инструменты передают свою, не трогая окружение).
    pub async fn build_with_config(config: Config) -> Result<Self, StartupError> {
        log::info!(
            "connecting to database '{}' at {}:{}",
            config.db_name,
            config.db_host,
            config.db_port
        );
        let db = database::connect(&config).await?;

        let groups = route_groups();
        ensure_distinct_prefixes(&groups)?;
        log::info!(
            "registered {} route groups: {}",
            groups.len(),
            groups
                .iter()
                .map(|g| g.prefix)
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Application {
            config,
            db,
            route_groups: groups,
        })
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            db: self.db.clone(),
            config: self.config.clone(),
        }
    }

    /// Registers every mounted group on an actix `App`.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        mount_route_groups(&self.route_groups, cfg);
    }

    pub fn prefixes(&self) -> Vec<&'static str> {
        self.route_groups.iter().map(|g| g.prefix).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, middleware, test};

    #[test]
    fn registry_has_exactly_six_groups_at_fixed_prefixes() {
        let groups = route_groups();
        let prefixes: Vec<&str> = groups.iter().map(|g| g.prefix).collect();
        assert_eq!(
            prefixes,
            vec![
                "/foodlog",
                "/moodlog",
                "/sleeplog",
                "/heartratelog",
                "/workoutlog",
                "/admin"
            ]
        );
    }

    #[test]
    fn registry_prefixes_are_pairwise_distinct() {
        let groups = route_groups();
        for (i, a) in groups.iter().enumerate() {
            for b in &groups[i + 1..] {
                assert_ne!(a.prefix, b.prefix, "{} and {} share a prefix", a.name, b.name);
            }
        }
        assert!(ensure_distinct_prefixes(&groups).is_ok());
    }

    #[test]
    fn duplicate_prefix_is_a_startup_error_not_an_overwrite() {
        fn noop(_cfg: &mut web::ServiceConfig) {}
        let groups = vec![
            RouteGroup::new("foodlog", "/foodlog", noop),
            RouteGroup::new("imposter", "/foodlog", noop),
        ];
        let err = ensure_distinct_prefixes(&groups).unwrap_err();
        assert!(matches!(
            err,
            StartupError::RouteConflict { prefix: "/foodlog" }
        ));
    }

    #[test]
    fn two_registries_are_independent_instances() {
        let first = route_groups();
        let second = route_groups();
        assert_eq!(first.len(), second.len());
        // одна сборка не влияет на другую
        assert_ne!(first.as_ptr(), second.as_ptr());
    }

    async fn stub_food(_req: actix_web::HttpRequest) -> HttpResponse {
        HttpResponse::Ok().body("food")
    }

    async fn stub_admin(_req: actix_web::HttpRequest) -> HttpResponse {
        HttpResponse::Ok().body("admin")
    }

    fn stub_food_configure(cfg: &mut web::ServiceConfig) {
        cfg.route("", web::get().to(stub_food));
    }

    fn stub_admin_configure(cfg: &mut web::ServiceConfig) {
        cfg.route("", web::get().to(stub_admin));
    }

    #[actix_web::test]
    async fn requests_dispatch_to_the_group_owning_the_prefix() {
        let groups = vec![
            RouteGroup::new("foodlog", "/foodlog", stub_food_configure),
            RouteGroup::new("admin", "/admin", stub_admin_configure),
        ];
        ensure_distinct_prefixes(&groups).unwrap();

        let app = test::init_service(
            App::new()
                .wrap(middleware::NormalizePath::trim())
                .configure(|cfg| mount_route_groups(&groups, cfg)),
        )
        .await;

        let body = test::call_and_read_body(
            &app,
            test::TestRequest::get().uri("/foodlog/").to_request(),
        )
        .await;
        assert_eq!(body, "food");

        let body = test::call_and_read_body(
            &app,
            test::TestRequest::get().uri("/admin").to_request(),
        )
        .await;
        assert_eq!(body, "admin");

        // незанятый префикс не обслуживается
        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/steplog").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
