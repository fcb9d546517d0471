//! Request access gates.
//!
//! Each gate is a plain function from request metadata and the identity
//! installed so far to pass or a [`DomainError`]. The HTTP layer wires them
//! up as middleware.

use std::sync::Arc;

use domain::{DomainError, Role, BEARER_TOKEN_PREFIX};

use crate::token::{Identity, TokenService};

pub const MSG_HEADER_REQUIRED: &str = "authorization header is required";
pub const MSG_HEADER_FORMAT: &str = "invalid authorization header format";
pub const MSG_TOKEN_REQUIRED: &str = "token is required";
pub const MSG_INSUFFICIENT_PERMISSIONS: &str = "insufficient permissions";
pub const MSG_INVALID_USER_ID: &str = "invalid user id";

/// Authentication gate backed by a token service.
#[derive(Clone)]
pub struct AccessPolicy {
    tokens: Arc<dyn TokenService>,
}

impl AccessPolicy {
    pub fn new(tokens: Arc<dyn TokenService>) -> Self {
        Self { tokens }
    }

    /// Resolve the caller from the raw `Authorization` header value.
    pub fn authenticate(&self, header: Option<&[u8]>) -> Result<Identity, DomainError> {
        let raw = match header {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Err(reject(MSG_HEADER_REQUIRED)),
        };

        let value = std::str::from_utf8(raw)
            .ok()
            .filter(|v| v.is_ascii())
            .ok_or_else(|| reject(MSG_HEADER_FORMAT))?;

        let token = value
            .strip_prefix(BEARER_TOKEN_PREFIX)
            .ok_or_else(|| reject(MSG_HEADER_FORMAT))?
            .trim();

        if token.is_empty() {
            return Err(reject(MSG_TOKEN_REQUIRED));
        }

        self.tokens.verify(token).map_err(|e| reject(e.to_string()))
    }
}

fn reject(reason: impl Into<String>) -> DomainError {
    let reason = reason.into();
    tracing::debug!(%reason, "authentication rejected");
    DomainError::unauthenticated(reason)
}

fn missing_identity(gate: &str) -> DomainError {
    tracing::error!(gate, "access gate ran without an authenticated identity");
    DomainError::internal(format!("{} gate requires authentication to run first", gate))
}

/// Pass when the caller's role is in `allowed`.
pub fn require_role(identity: Option<&Identity>, allowed: &[Role]) -> Result<(), DomainError> {
    let identity = identity.ok_or_else(|| missing_identity("role"))?;

    if allowed.contains(&identity.role) {
        return Ok(());
    }

    tracing::debug!(
        user_id = identity.user_id,
        role = %identity.role,
        "role gate rejected"
    );
    Err(DomainError::forbidden(MSG_INSUFFICIENT_PERMISSIONS))
}

/// Role gate that only admits administrators.
pub fn require_admin(identity: Option<&Identity>) -> Result<(), DomainError> {
    require_role(identity, &[Role::Admin])
}

/// Pass for administrators, or when `path_id` names the caller's own account.
pub fn require_self_or_admin(
    identity: Option<&Identity>,
    path_id: &str,
) -> Result<(), DomainError> {
    let identity = identity.ok_or_else(|| missing_identity("self-or-admin"))?;

    if identity.role.is_admin() {
        return Ok(());
    }

    let target: i64 = path_id
        .parse()
        .map_err(|_| DomainError::invalid_field("id", MSG_INVALID_USER_ID))?;

    if target == identity.user_id {
        return Ok(());
    }

    tracing::debug!(
        user_id = identity.user_id,
        target,
        "self-or-admin gate rejected"
    );
    Err(DomainError::forbidden(MSG_INSUFFICIENT_PERMISSIONS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{MockTokenService, TokenError};
    use domain::ErrorKind;

    fn policy_with(mock: MockTokenService) -> AccessPolicy {
        AccessPolicy::new(Arc::new(mock))
    }

    fn unauthenticated_reason(err: DomainError) -> String {
        match err {
            DomainError::Unauthenticated { reason } => reason,
            other => panic!("expected unauthenticated, got {:?}", other),
        }
    }

    fn identity(user_id: i64, role: Role) -> Identity {
        Identity { user_id, role }
    }

    #[test]
    fn test_missing_header() {
        let policy = policy_with(MockTokenService::new());

        for header in [None, Some(&b""[..])] {
            let err = policy.authenticate(header).unwrap_err();
            assert_eq!(unauthenticated_reason(err), MSG_HEADER_REQUIRED);
        }
    }

    #[test]
    fn test_wrong_scheme() {
        let policy = policy_with(MockTokenService::new());

        for header in ["Basic dXNlcjpwYXNz", "bearer abc", "Bearerabc", "Token abc"] {
            let err = policy.authenticate(Some(header.as_bytes())).unwrap_err();
            assert_eq!(unauthenticated_reason(err), MSG_HEADER_FORMAT, "{:?}", header);
        }
    }

    #[test]
    fn test_non_ascii_header() {
        let policy = policy_with(MockTokenService::new());
        let err = policy
            .authenticate(Some("Bearer tökén".as_bytes()))
            .unwrap_err();
        assert_eq!(unauthenticated_reason(err), MSG_HEADER_FORMAT);

        let err = policy.authenticate(Some(&[0x42, 0xff, 0xfe][..])).unwrap_err();
        assert_eq!(unauthenticated_reason(err), MSG_HEADER_FORMAT);
    }

    #[test]
    fn test_empty_token() {
        let policy = policy_with(MockTokenService::new());

        for header in ["Bearer ", "Bearer    "] {
            let err = policy.authenticate(Some(header.as_bytes())).unwrap_err();
            assert_eq!(unauthenticated_reason(err), MSG_TOKEN_REQUIRED);
        }
    }

    #[test]
    fn test_token_failures_carry_reason() {
        let mut mock = MockTokenService::new();
        mock.expect_verify()
            .withf(|t| t == "old")
            .returning(|_| Err(TokenError::Expired));
        mock.expect_verify()
            .withf(|t| t == "forged")
            .returning(|_| Err(TokenError::Invalid));
        let policy = policy_with(mock);

        let err = policy.authenticate(Some("Bearer old".as_bytes())).unwrap_err();
        assert_eq!(unauthenticated_reason(err), "token has expired");

        let err = policy.authenticate(Some("Bearer forged".as_bytes())).unwrap_err();
        assert_eq!(unauthenticated_reason(err), "invalid token");
    }

    #[test]
    fn test_valid_token_yields_identity() {
        let mut mock = MockTokenService::new();
        mock.expect_verify()
            .withf(|t| t == "good")
            .times(1)
            .returning(|_| Ok(identity(7, Role::User)));
        let policy = policy_with(mock);

        assert_eq!(
            policy.authenticate(Some("Bearer good".as_bytes())).unwrap(),
            identity(7, Role::User)
        );
    }

    #[test]
    fn test_role_gate() {
        let viewer = identity(1, Role::Viewer);
        let user = identity(2, Role::User);

        assert!(require_role(Some(&user), &[Role::User, Role::Admin]).is_ok());
        assert_eq!(
            require_role(Some(&viewer), &[Role::User, Role::Admin])
                .unwrap_err()
                .to_string(),
            "forbidden: insufficient permissions"
        );
    }

    #[test]
    fn test_admin_gate() {
        assert!(require_admin(Some(&identity(1, Role::Admin))).is_ok());
        for role in [Role::User, Role::Viewer] {
            let err = require_admin(Some(&identity(1, role))).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Forbidden);
        }
    }

    #[test]
    fn test_gates_without_identity_are_internal_faults() {
        assert_eq!(
            require_role(None, &[Role::User]).unwrap_err().kind(),
            ErrorKind::Internal
        );
        assert_eq!(require_admin(None).unwrap_err().kind(), ErrorKind::Internal);
        assert_eq!(
            require_self_or_admin(None, "1").unwrap_err().kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_self_or_admin() {
        let admin = identity(1, Role::Admin);
        let user = identity(7, Role::User);

        assert!(require_self_or_admin(Some(&admin), "99").is_ok());
        assert!(require_self_or_admin(Some(&user), "7").is_ok());
        assert_eq!(
            require_self_or_admin(Some(&user), "8").unwrap_err().kind(),
            ErrorKind::Forbidden
        );
    }

    #[test]
    fn test_self_or_admin_uses_integer_equality() {
        // 65 is 'A' as a code point; a char/string comparison would confuse these
        let user = identity(65, Role::Viewer);
        assert!(require_self_or_admin(Some(&user), "65").is_ok());
        assert_eq!(
            require_self_or_admin(Some(&user), "A").unwrap_err().kind(),
            ErrorKind::InvalidInput
        );

        let user = identity(1234, Role::User);
        assert!(require_self_or_admin(Some(&user), "1234").is_ok());
        assert_eq!(
            require_self_or_admin(Some(&user), "123").unwrap_err().kind(),
            ErrorKind::Forbidden
        );
        assert_eq!(
            require_self_or_admin(Some(&user), "12345").unwrap_err().kind(),
            ErrorKind::Forbidden
        );
    }

    #[test]
    fn test_self_or_admin_bad_path_id() {
        let user = identity(7, Role::User);
        for raw in ["abc", "", "7.0", "99999999999999999999"] {
            let err = require_self_or_admin(Some(&user), raw).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput, "{:?}", raw);
        }
    }

    #[test]
    fn test_admin_passes_even_with_bad_path_id() {
        assert!(require_self_or_admin(Some(&identity(1, Role::Admin)), "abc").is_ok());
    }
}
