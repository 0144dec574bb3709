//! Admin/finance account lookups (§3 "Admin/Finance account").

use mrgun_common::ids::AdminId;
use sqlx::{Postgres, Transaction};

use crate::{error::StoreError, models::AdminRow};

pub async fn find_by_username(
    pool: &sqlx::PgPool,
    username: &str,
) -> Result<Option<AdminRow>, StoreError> {
    sqlx::query_as::<_, AdminRow>(
        r#"
        SELECT admin_id, username, password_hash, display_name, role, is_active
        FROM admins
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await
    .map_err(StoreError::from)
}

pub async fn find_by_id(
    tx: &mut Transaction<'_, Postgres>,
    admin_id: AdminId,
) -> Result<Option<AdminRow>, StoreError> {
    sqlx::query_as::<_, AdminRow>(
        r#"
        SELECT admin_id, username, password_hash, display_name, role, is_active
        FROM admins
        WHERE admin_id = $1
        "#,
    )
    .bind(admin_id.as_uuid())
    .fetch_optional(&mut **tx)
    .await
    .map_err(StoreError::from)
}
