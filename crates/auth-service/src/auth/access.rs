use super::context::AuthContext;
use crate::errors::AuthError;
use crate::observability::metrics::record_access_decision;

/// What a route demands from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Open to everyone, authenticated or not.
    Anonymous,
    /// Any authenticated identity.
    Authenticated,
    /// An identity holding this exact authority string.
    Authority(String),
}

impl Requirement {
    pub fn authority(authority: impl Into<String>) -> Self {
        Requirement::Authority(authority.into())
    }
}

/// Allow/deny decisions for a published [`AuthContext`].
///
/// Matching is exact string membership with no hierarchy or wildcards.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessDecisionPoint;

impl AccessDecisionPoint {
    /// # Errors
    ///
    /// - `AuthenticationRequired` - no context and the requirement is not `Anonymous`
    /// - `PermissionDenied` - context present but the authority is missing
    pub fn decide(ctx: Option<&AuthContext>, requirement: &Requirement) -> Result<(), AuthError> {
        let decision = match (requirement, ctx) {
            (Requirement::Anonymous, _) => Ok(()),
            (_, None) => Err(AuthError::AuthenticationRequired),
            (Requirement::Authenticated, Some(_)) => Ok(()),
            (Requirement::Authority(required), Some(ctx)) => {
                if ctx.has_authority(required) {
                    Ok(())
                } else {
                    Err(AuthError::PermissionDenied {
                        required: required.clone(),
                    })
                }
            }
        };

        let label = match &decision {
            Ok(()) => "allow",
            Err(AuthError::AuthenticationRequired) => "deny_unauthenticated",
            Err(_) => "deny_forbidden",
        };
        record_access_decision(label);

        if let Err(e) = &decision {
            tracing::debug!(target: "auth.access", requirement = ?requirement, code = e.code(), "Access denied");
        }

        decision
    }
}
