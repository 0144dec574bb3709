//! Opaque stable identifiers.
//!
//! The wire format sometimes prefixes ids with a type tag (`site_<uuid>`,
//! `op_<uuid>`) and sometimes doesn't. Every boundary that accepts an id from
//! a client normalises it to its bare form before it reaches the store or
//! the engine; nothing downstream should ever see a prefixed string again.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Failure to parse a caller-supplied id string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("'{raw}' is not a valid {kind} id")]
pub struct IdParseError {
    pub kind: &'static str,
    pub raw: String,
}

/// Strips an optional `prefix_` tag, then parses the remainder as a UUID.
/// Accepts both `<prefix>_<uuid>` and bare `<uuid>`; anything else is
/// rejected rather than guessed at.
fn normalize(raw: &str, prefix: &str, kind: &'static str) -> Result<Uuid, IdParseError> {
    let stripped = raw.strip_prefix(prefix).unwrap_or(raw);
    Uuid::parse_str(stripped).map_err(|_| IdParseError {
        kind,
        raw: raw.to_string(),
    })
}

macro_rules! opaque_id {
    ($name:ident, $prefix:literal, $kind:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn parse(raw: &str) -> Result<Self, IdParseError> {
                normalize(raw, $prefix, $kind).map(Self)
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

opaque_id!(OperatorId, "op_", "operator");
opaque_id!(AdminId, "admin_", "admin");
opaque_id!(SiteId, "site_", "site");
opaque_id!(ApplicationId, "app_", "application");
opaque_id!(UsageRecordId, "usage_", "usage record");
opaque_id!(TransactionId, "txn_", "transaction");
opaque_id!(RefundId, "refund_", "refund");
opaque_id!(InvoiceId, "invoice_", "invoice");
opaque_id!(RechargeOrderId, "recharge_", "recharge order");
opaque_id!(ApplicationRequestId, "apreq_", "application request");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bare_and_prefixed() {
        let uuid = Uuid::new_v4();
        let bare = uuid.to_string();
        let prefixed = format!("site_{uuid}");

        assert_eq!(SiteId::parse(&bare).unwrap().as_uuid(), uuid);
        assert_eq!(SiteId::parse(&prefixed).unwrap().as_uuid(), uuid);
    }

    #[test]
    fn rejects_garbage() {
        assert!(SiteId::parse("not-a-uuid").is_err());
        assert!(SiteId::parse("site_not-a-uuid").is_err());
        assert!(SiteId::parse("").is_err());
    }

    #[test]
    fn wrong_prefix_is_not_special_cased() {
        // A foreign prefix isn't stripped, so the remainder fails to parse
        // as a UUID -- this is the desired "reject anything else" behavior.
        let uuid = Uuid::new_v4();
        let op_prefixed = format!("op_{uuid}");
        assert!(SiteId::parse(&op_prefixed).is_err());
    }
}
