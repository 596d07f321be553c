pub mod admin;
pub mod food_log;
pub mod heartrate_log;
pub mod helpers;
pub mod middleware;
pub mod mood_log;
pub mod sleep_log;
pub mod validation;
pub mod workout_log;
