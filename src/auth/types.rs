//! Authentication result types.

/// Canonical user reference carried in access tokens and refresh-token rows.
pub type Identity = uuid::Uuid;

/// Outcome of a successful authorization check.
///
/// Both authorization paths report through this one type so callers never
/// confuse an end-user identity with the trusted partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    /// An end user who presented a valid access token.
    User(Identity),
    /// The trusted partner that presented the shared API key.
    Partner,
}

/// Which credential scheme a route accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Bearer,
    ApiKey,
}
