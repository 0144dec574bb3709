//! Authorisation Engine (C3): a stateless, side-effect-free rule pipeline.
//! Given the Operator row already locked by the caller, checks in the exact
//! order of §4.3 and fails at the first violated rule.

use chrono::{DateTime, Utc};
use mrgun_common::{
    ids::{ApplicationId, OperatorId, SiteId},
    Money,
};
use mrgun_store::{application, models::ApplicationRow, models::OperatorRow, operator};
use sqlx::{Postgres, Transaction};

use crate::error::EngineError;

/// The resolved facts an authorise/pre-authorise caller needs: eligibility
/// plus the numbers to quote or to commit.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub application_id: ApplicationId,
    pub app_name: String,
    pub unit_price: Money,
    pub total_cost: Money,
    pub current_balance: Money,
}

/// Runs the full §4.3 rule set against an operator row the caller already
/// holds `FOR UPDATE`. Returns the resolved pricing facts on success.
pub async fn check(
    tx: &mut Transaction<'_, Postgres>,
    operator: &OperatorRow,
    app_code: &str,
    site_id: SiteId,
    player_count: i32,
    now: DateTime<Utc>,
) -> Result<Resolved, EngineError> {
    // Rule 1: operator active, not locked.
    if !operator.is_active || operator.is_locked {
        return Err(EngineError::AccountLocked);
    }

    // Rule 2: application exists and active.
    let app: ApplicationRow = application::find_application_by_code(tx, app_code)
        .await?
        .ok_or(EngineError::AppNotFound)?;
    if !app.is_active {
        return Err(EngineError::AppNotFound);
    }

    // Rule 3: active grant, not expired.
    let operator_id = operator.id();
    application::find_active_authorisation(tx, operator_id, app.id(), now)
        .await?
        .ok_or(EngineError::AppNotAuthorised)?;

    // Rule 4: site exists, owned by operator, active.
    let site = application::find_site(tx, site_id)
        .await?
        .ok_or(EngineError::SiteNotFound)?;
    if site.operator_id() != operator_id {
        return Err(EngineError::SiteNotOwned);
    }
    if !site.is_active {
        return Err(EngineError::SiteNotFound);
    }

    // Rule 5: player_count range.
    if !player_count_in_range(player_count, app.min_players, app.max_players) {
        return Err(EngineError::InvalidPlayerCount);
    }

    // Rule 6: balance sufficiency.
    let unit_price = app.unit_price();
    let total_cost = unit_price
        .checked_mul_u32(player_count as u32)
        .ok_or_else(|| EngineError::Internal("total_cost overflowed decimal range".into()))?;
    let current_balance = operator.balance();
    if !has_sufficient_balance(current_balance, total_cost) {
        return Err(EngineError::InsufficientBalance {
            current_balance,
            required: total_cost,
        });
    }

    Ok(Resolved {
        application_id: app.id(),
        app_name: app.app_name,
        unit_price,
        total_cost,
        current_balance,
    })
}

/// Rules 1-4 only, no `player_count`/balance check -- used by the "launch
/// application" action (§4.2), which mints a headset token before a player
/// count is even known.
pub async fn check_launch_eligibility(
    tx: &mut Transaction<'_, Postgres>,
    operator_id: OperatorId,
    app_code: &str,
    site_id: SiteId,
    now: DateTime<Utc>,
) -> Result<ApplicationId, EngineError> {
    let operator = operator::lock_operator_for_update(tx, operator_id).await?;
    if !operator.is_active || operator.is_locked {
        return Err(EngineError::AccountLocked);
    }

    let app: ApplicationRow = application::find_application_by_code(tx, app_code)
        .await?
        .ok_or(EngineError::AppNotFound)?;
    if !app.is_active {
        return Err(EngineError::AppNotFound);
    }

    application::find_active_authorisation(tx, operator_id, app.id(), now)
        .await?
        .ok_or(EngineError::AppNotAuthorised)?;

    let site = application::find_site(tx, site_id)
        .await?
        .ok_or(EngineError::SiteNotFound)?;
    if site.operator_id() != operator_id {
        return Err(EngineError::SiteNotOwned);
    }
    if !site.is_active {
        return Err(EngineError::SiteNotFound);
    }

    Ok(app.id())
}

/// Re-locks the operator row and re-runs [`check`]; the shared entry point
/// for both pre-authorise (no further writes) and authorise (continues into
/// the debit).
pub async fn check_for_operator(
    tx: &mut Transaction<'_, Postgres>,
    operator_id: OperatorId,
    app_code: &str,
    site_id: SiteId,
    player_count: i32,
    now: DateTime<Utc>,
) -> Result<(OperatorRow, Resolved), EngineError> {
    let operator = operator::lock_operator_for_update(tx, operator_id).await?;
    let resolved = check(tx, &operator, app_code, site_id, player_count, now).await?;
    Ok((operator, resolved))
}

/// §4.3 rule 5, `min_players <= player_count <= max_players`.
pub fn player_count_in_range(player_count: i32, min_players: i32, max_players: i32) -> bool {
    player_count >= min_players && player_count <= max_players
}

/// §4.3 rule 6, `balance >= total_cost`. Balance exactly equal to the
/// required cost accepts (§8 boundary behaviour).
pub fn has_sufficient_balance(balance: Money, total_cost: Money) -> bool {
    balance >= total_cost
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn boundary_player_counts() {
        assert!(player_count_in_range(2, 2, 8));
        assert!(player_count_in_range(8, 2, 8));
        assert!(!player_count_in_range(1, 2, 8));
        assert!(!player_count_in_range(9, 2, 8));
    }

    #[test]
    fn balance_exactly_equal_to_cost_is_sufficient() {
        let cost = Money::from_cents(5000);
        assert!(has_sufficient_balance(cost, cost));
        assert!(!has_sufficient_balance(cost - Money::from_cents(1), cost));
    }

    proptest! {
        #[test]
        fn player_count_range_matches_naive_comparison(
            player_count in -10i32..200,
            min_players in 1i32..100,
            max_players in 1i32..100,
        ) {
            let expected = player_count >= min_players && player_count <= max_players;
            prop_assert_eq!(player_count_in_range(player_count, min_players, max_players), expected);
        }

        #[test]
        fn sufficiency_is_monotonic_in_balance(cents in 0i64..1_000_000, extra_cents in 0i64..1_000_000) {
            let cost = Money::from_cents(cents);
            let balance = Money::from_cents(cents + extra_cents);
            prop_assert!(has_sufficient_balance(balance, cost));
        }
    }
}
