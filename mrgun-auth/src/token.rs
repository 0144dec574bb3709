//! HMAC-SHA256 bearer tokens (§4.2).
//!
//! Three token kinds share one signing secret but carry a `typ` claim that
//! pins them to the session they were minted for. An admin token presented
//! where a headset token is required must fail distinctly from a token that
//! merely failed to verify -- `InvalidTokenType` vs `InvalidToken` -- so
//! callers can tell "wrong kind of credential" from "not a credential".
//!
//! Grounded on the `TokenWithExpiration` / scope-checked-bearer-token shape
//! in `lexe-api::auth`, adapted from that crate's client-signed ed25519
//! tokens to server-minted HMAC ones since there is no client key pair here.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mrgun_common::{
    config::{ADMIN_TOKEN_TTL, HEADSET_TOKEN_TTL, OPERATOR_TOKEN_TTL},
    ids::{AdminId, ApplicationId, OperatorId, SiteId},
    role::AdminRole,
};
use serde::{Deserialize, Serialize};

/// The `typ` claim. Serialised to the lowercase strings in §4.2's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Operator,
    Admin,
    Finance,
    Headset,
}

/// What a caller expects to find in the `typ` claim. `AdminOrFinance` covers
/// back-office endpoints that accept either admin or finance session tokens
/// and rely on [`Claims::role`] for the finer-grained capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedTokenType {
    Operator,
    AdminOrFinance,
    Headset,
}

impl ExpectedTokenType {
    fn matches(self, actual: TokenType) -> bool {
        match self {
            ExpectedTokenType::Operator => actual == TokenType::Operator,
            ExpectedTokenType::AdminOrFinance => {
                matches!(actual, TokenType::Admin | TokenType::Finance)
            }
            ExpectedTokenType::Headset => actual == TokenType::Headset,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Bare operator/admin id the token was minted for.
    pub sub: String,
    pub typ: TokenType,
    pub iat: u64,
    pub exp: u64,
    /// Present only on admin/finance tokens; drives the capability matrix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<AdminRole>,
    /// Present only on headset tokens, embedded at launch time (§4.2).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token signature invalid or expired")]
    InvalidToken,
    #[error("token type does not match what this endpoint requires")]
    InvalidTokenType,
}

pub struct IssuedToken {
    pub token: String,
    pub expires_in: u64,
}

/// Mints and verifies the three bearer token kinds off a single HMAC secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    pub fn issue_operator_token(&self, operator_id: OperatorId) -> Result<IssuedToken, TokenError> {
        self.issue(
            Claims {
                sub: operator_id.to_string(),
                typ: TokenType::Operator,
                iat: now(),
                exp: now() + OPERATOR_TOKEN_TTL.as_secs(),
                role: None,
                app_id: None,
                site_id: None,
            },
            OPERATOR_TOKEN_TTL.as_secs(),
        )
    }

    /// Finance-tier roles get a `finance` token, everyone else an `admin`
    /// token; both carry `role` so the capability matrix still applies.
    pub fn issue_admin_token(
        &self,
        admin_id: AdminId,
        role: AdminRole,
    ) -> Result<IssuedToken, TokenError> {
        let typ = match role {
            AdminRole::FinanceManager | AdminRole::FinanceSpecialist | AdminRole::FinanceAuditor => {
                TokenType::Finance
            }
            AdminRole::SuperAdmin | AdminRole::Admin => TokenType::Admin,
        };
        self.issue(
            Claims {
                sub: admin_id.to_string(),
                typ,
                iat: now(),
                exp: now() + ADMIN_TOKEN_TTL.as_secs(),
                role: Some(role),
                app_id: None,
                site_id: None,
            },
            ADMIN_TOKEN_TTL.as_secs(),
        )
    }

    pub fn issue_headset_token(
        &self,
        operator_id: OperatorId,
        application_id: ApplicationId,
        site_id: SiteId,
    ) -> Result<IssuedToken, TokenError> {
        self.issue(
            Claims {
                sub: operator_id.to_string(),
                typ: TokenType::Headset,
                iat: now(),
                exp: now() + HEADSET_TOKEN_TTL.as_secs(),
                role: None,
                app_id: Some(application_id.to_string()),
                site_id: Some(site_id.to_string()),
            },
            HEADSET_TOKEN_TTL.as_secs(),
        )
    }

    fn issue(&self, claims: Claims, ttl_secs: u64) -> Result<IssuedToken, TokenError> {
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| TokenError::InvalidToken)?;
        Ok(IssuedToken {
            token,
            expires_in: ttl_secs,
        })
    }

    /// Verifies signature and expiry, then checks the `typ` claim matches
    /// `expected`. A token that fails either check for a reason other than
    /// type mismatch returns [`TokenError::InvalidToken`].
    pub fn verify(&self, token: &str, expected: ExpectedTokenType) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.required_spec_claims.clear();

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| TokenError::InvalidToken)?;

        if !expected.matches(data.claims.typ) {
            return Err(TokenError::InvalidTokenType);
        }
        Ok(data.claims)
    }
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(b"unit-test-signing-secret-that-is-long-enough")
    }

    #[test]
    fn operator_token_round_trips() {
        let svc = service();
        let operator_id = OperatorId::generate();
        let issued = svc.issue_operator_token(operator_id).unwrap();
        let claims = svc.verify(&issued.token, ExpectedTokenType::Operator).unwrap();
        assert_eq!(claims.sub, operator_id.to_string());
        assert_eq!(claims.typ, TokenType::Operator);
    }

    #[test]
    fn headset_token_carries_app_and_site() {
        let svc = service();
        let issued = svc
            .issue_headset_token(OperatorId::generate(), ApplicationId::generate(), SiteId::generate())
            .unwrap();
        let claims = svc.verify(&issued.token, ExpectedTokenType::Headset).unwrap();
        assert!(claims.app_id.is_some());
        assert!(claims.site_id.is_some());
    }

    #[test]
    fn wrong_type_is_rejected_distinctly_from_invalid_signature() {
        let svc = service();
        let issued = svc.issue_operator_token(OperatorId::generate()).unwrap();

        let err = svc.verify(&issued.token, ExpectedTokenType::Headset).unwrap_err();
        assert_eq!(err, TokenError::InvalidTokenType);

        let err = svc.verify("not-a-jwt-at-all", ExpectedTokenType::Operator).unwrap_err();
        assert_eq!(err, TokenError::InvalidToken);
    }

    #[test]
    fn finance_role_mints_finance_token_admin_role_mints_admin_token() {
        let svc = service();
        let finance = svc
            .issue_admin_token(AdminId::generate(), AdminRole::FinanceManager)
            .unwrap();
        let claims = svc.verify(&finance.token, ExpectedTokenType::AdminOrFinance).unwrap();
        assert_eq!(claims.typ, TokenType::Finance);

        let admin = svc
            .issue_admin_token(AdminId::generate(), AdminRole::SuperAdmin)
            .unwrap();
        let claims = svc.verify(&admin.token, ExpectedTokenType::AdminOrFinance).unwrap();
        assert_eq!(claims.typ, TokenType::Admin);
    }
}
