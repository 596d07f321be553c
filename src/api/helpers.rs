use sea_orm::{DatabaseConnection, EntityTrait};

use crate::{database::models::users, errors::AppError};

/// Проверяет, что пользователь, на которого ссылается запись лога, существует.
pub async fn ensure_user_exists(
    user_id: i64,
    db: &DatabaseConnection,
) -> Result<(), AppError> {
    let user = users::Entity::find_by_id(user_id).one(db).await?;
    if user.is_none() {
        log::warn!("log entry references unknown user {}", user_id);
        return Err(AppError::NotFound(format!(
            "User with id {} not found",
            user_id
        )));
    }
    Ok(())
}
