//! Closed role/tier enums.
//!
//! The source this spec was distilled from stores `permissions` as free-form
//! JSON arrays and checks them at runtime (§9 "Dynamic-typing -> tagged
//! variants"). Here every account class has a fixed, closed set of roles and
//! a small compile-time capability matrix instead.

use serde::{Deserialize, Serialize};

/// Metadata only (§9 open question): no rule in this spec keys off tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerTier {
    Trial,
    Regular,
    Vip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    SuperAdmin,
    Admin,
    FinanceSpecialist,
    FinanceManager,
    FinanceAuditor,
}

/// The back-office actions gated by role. `ApplicationAuthorisation` review
/// and account lock/unlock are admin actions; refund/invoice review and
/// balance adjustment are finance actions. `SuperAdmin` can do everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ReviewApplicationRequest,
    LockOperatorAccount,
    AdjustBalance,
    ReviewRefund,
    ReviewInvoice,
}

impl AdminRole {
    pub fn can(self, capability: Capability) -> bool {
        use AdminRole::*;
        use Capability::*;
        match (self, capability) {
            (SuperAdmin, _) => true,
            (Admin, ReviewApplicationRequest | LockOperatorAccount) => true,
            (FinanceManager, AdjustBalance | ReviewRefund | ReviewInvoice) => true,
            (FinanceSpecialist, ReviewRefund | ReviewInvoice) => true,
            (FinanceAuditor, _) => false,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn super_admin_can_do_everything() {
        for cap in [
            Capability::ReviewApplicationRequest,
            Capability::LockOperatorAccount,
            Capability::AdjustBalance,
            Capability::ReviewRefund,
            Capability::ReviewInvoice,
        ] {
            assert!(AdminRole::SuperAdmin.can(cap));
        }
    }

    #[test]
    fn auditor_is_read_only() {
        assert!(!AdminRole::FinanceAuditor.can(Capability::AdjustBalance));
        assert!(!AdminRole::FinanceAuditor.can(Capability::ReviewRefund));
    }

    #[test]
    fn finance_specialist_cannot_adjust_balance() {
        assert!(!AdminRole::FinanceSpecialist.can(Capability::AdjustBalance));
        assert!(AdminRole::FinanceSpecialist.can(Capability::ReviewRefund));
    }
}
