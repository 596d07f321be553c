pub mod food_logs;
pub mod heartrate_logs;
pub mod mood_logs;
pub mod sleep_logs;
pub mod users;
pub mod workout_logs;
