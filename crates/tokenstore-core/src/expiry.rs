//! Expiry planning for the records written by a single `create`.
//!
//! The rule applied when both an access and a refresh token are issued:
//!
//! - the access record expires at `min(access_expiry, refresh_expiry)`
//! - the generated basic record expires at `max(access_expiry, refresh_expiry)`
//! - the refresh record expires at `refresh_expiry`
//!
//! so the basic record always outlives both references that point at it.
//! Without a refresh token the basic and access records share the access
//! expiry.

use std::time::Duration;

use time::OffsetDateTime;

use crate::token::{TokenInfo, present};
use crate::{StoreError, StoreResult};

/// Add a lifetime to an issue instant.
///
/// # Errors
///
/// Returns `InvalidInput` if the lifetime does not fit a timestamp.
pub fn expires_at(created_at: OffsetDateTime, expires_in: Duration) -> StoreResult<OffsetDateTime> {
    let lifetime = time::Duration::try_from(expires_in)
        .map_err(|_| StoreError::invalid_input(format!("lifetime {expires_in:?} is out of range")))?;
    created_at.checked_add(lifetime).ok_or_else(|| {
        StoreError::invalid_input(format!(
            "expiry of token created at {created_at} with lifetime {expires_in:?} overflows"
        ))
    })
}

/// Expiry instants for every record a `create` call may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPlan {
    /// Expiry of the code-keyed basic record, when a code was issued.
    pub code: Option<OffsetDateTime>,
    /// Expiry of the basic record keyed by the generated identifier.
    pub basic: OffsetDateTime,
    /// Expiry of the access record.
    pub access: OffsetDateTime,
    /// Expiry of the refresh record, when a refresh token was issued.
    pub refresh: Option<OffsetDateTime>,
}

impl ExpiryPlan {
    /// Compute the plan for a token.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if any expiry overflows.
    pub fn for_token(info: &dyn TokenInfo) -> StoreResult<Self> {
        let code = match present(info.code()) {
            Some(_) => Some(expires_at(info.code_created_at(), info.code_expires_in())?),
            None => None,
        };

        let access_exp = expires_at(info.access_created_at(), info.access_expires_in())?;

        let plan = match present(info.refresh()) {
            Some(_) => {
                let refresh_exp = expires_at(info.refresh_created_at(), info.refresh_expires_in())?;
                Self {
                    code,
                    basic: access_exp.max(refresh_exp),
                    access: access_exp.min(refresh_exp),
                    refresh: Some(refresh_exp),
                }
            }
            None => Self {
                code,
                basic: access_exp,
                access: access_exp,
                refresh: None,
            },
        };

        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Token;
    use time::macros::datetime;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn test_access_only() {
        let now = datetime!(2024-05-01 12:00 UTC);
        let token = Token::new("c").with_access("a1", now, Duration::from_secs(30 * 60));
        let plan = ExpiryPlan::for_token(&token).unwrap();

        assert_eq!(plan.code, None);
        assert_eq!(plan.refresh, None);
        assert_eq!(plan.access, datetime!(2024-05-01 12:30 UTC));
        assert_eq!(plan.basic, plan.access);
    }

    #[test]
    fn test_refresh_outlives_access() {
        let now = datetime!(2024-05-01 12:00 UTC);
        let token = Token::new("c")
            .with_code("c1", now, Duration::from_secs(600))
            .with_access("a1", now, HOUR)
            .with_refresh("r1", now, 24 * HOUR);
        let plan = ExpiryPlan::for_token(&token).unwrap();

        assert_eq!(plan.code, Some(datetime!(2024-05-01 12:10 UTC)));
        assert_eq!(plan.access, datetime!(2024-05-01 13:00 UTC));
        assert_eq!(plan.refresh, Some(datetime!(2024-05-02 12:00 UTC)));
        assert_eq!(plan.basic, datetime!(2024-05-02 12:00 UTC));
    }

    #[test]
    fn test_access_clamped_to_refresh() {
        let now = datetime!(2024-05-01 12:00 UTC);
        let token = Token::new("c")
            .with_access("a1", now, 2 * HOUR)
            .with_refresh("r1", now, HOUR);
        let plan = ExpiryPlan::for_token(&token).unwrap();

        assert_eq!(plan.access, datetime!(2024-05-01 13:00 UTC));
        assert_eq!(plan.refresh, Some(datetime!(2024-05-01 13:00 UTC)));
        assert_eq!(plan.basic, datetime!(2024-05-01 14:00 UTC));
    }

    #[test]
    fn test_comparison_uses_full_instant() {
        // Same seconds-of-minute, different minutes.
        let now = datetime!(2024-05-01 12:00:30 UTC);
        let token = Token::new("c")
            .with_access("a1", now, Duration::from_secs(5 * 60))
            .with_refresh("r1", now, Duration::from_secs(2 * 60));
        let plan = ExpiryPlan::for_token(&token).unwrap();

        assert_eq!(plan.access, datetime!(2024-05-01 12:02:30 UTC));
        assert_eq!(plan.basic, datetime!(2024-05-01 12:05:30 UTC));
    }

    #[test]
    fn test_overflowing_lifetime_is_rejected() {
        let err = expires_at(OffsetDateTime::UNIX_EPOCH, Duration::MAX).unwrap_err();
        assert!(err.is_invalid_input());
    }
}
