//! Application, Site, and ApplicationAuthorisation lookups used by the
//! Authorisation Engine's rule pipeline (§4.3).

use chrono::{DateTime, Utc};
use mrgun_common::ids::{ApplicationId, OperatorId, SiteId};
use sqlx::{Postgres, Transaction};

use crate::{
    error::StoreError,
    models::{ApplicationAuthorisationRow, ApplicationRow, SiteRow},
};

pub async fn find_application_by_code(
    tx: &mut Transaction<'_, Postgres>,
    app_code: &str,
) -> Result<Option<ApplicationRow>, StoreError> {
    sqlx::query_as::<_, ApplicationRow>(
        r#"
        SELECT application_id, app_code, app_name, unit_price, min_players, max_players, is_active
        FROM applications
        WHERE app_code = $1
        "#,
    )
    .bind(app_code)
    .fetch_optional(&mut **tx)
    .await
    .map_err(StoreError::from)
}

pub async fn find_site(
    tx: &mut Transaction<'_, Postgres>,
    site_id: SiteId,
) -> Result<Option<SiteRow>, StoreError> {
    sqlx::query_as::<_, SiteRow>(
        r#"
        SELECT site_id, operator_id, name, address, contact_person, contact_phone,
               is_active, deleted_at
        FROM sites
        WHERE site_id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(site_id.as_uuid())
    .fetch_optional(&mut **tx)
    .await
    .map_err(StoreError::from)
}

/// Active grant for `(operator, application)` as of `now` -- expired grants
/// (`expires_at < now`) do not count (§4.3 rule 3).
pub async fn find_active_authorisation(
    tx: &mut Transaction<'_, Postgres>,
    operator_id: OperatorId,
    application_id: ApplicationId,
    now: DateTime<Utc>,
) -> Result<Option<ApplicationAuthorisationRow>, StoreError> {
    sqlx::query_as::<_, ApplicationAuthorisationRow>(
        r#"
        SELECT operator_id, application_id, granted_at, expires_at
        FROM application_authorisations
        WHERE operator_id = $1 AND application_id = $2
          AND (expires_at IS NULL OR expires_at > $3)
        "#,
    )
    .bind(operator_id.as_uuid())
    .bind(application_id.as_uuid())
    .bind(now)
    .fetch_optional(&mut **tx)
    .await
    .map_err(StoreError::from)
}

/// Idempotent upsert used by ApplicationRequest approval (§4.5): at most one
/// active grant per `(operator_id, application_id)` per §3.
pub async fn upsert_authorisation(
    tx: &mut Transaction<'_, Postgres>,
    operator_id: OperatorId,
    application_id: ApplicationId,
) -> Result<ApplicationAuthorisationRow, StoreError> {
    sqlx::query_as::<_, ApplicationAuthorisationRow>(
        r#"
        INSERT INTO application_authorisations (operator_id, application_id, granted_at, expires_at)
        VALUES ($1, $2, NOW(), NULL)
        ON CONFLICT (operator_id, application_id)
        DO UPDATE SET granted_at = NOW(), expires_at = NULL
        RETURNING operator_id, application_id, granted_at, expires_at
        "#,
    )
    .bind(operator_id.as_uuid())
    .bind(application_id.as_uuid())
    .fetch_one(&mut **tx)
    .await
    .map_err(StoreError::from)
}
