//! Authentication state shared by every router.

use std::sync::Arc;

use crate::jwt::AccessTokenCodec;

/// Read-only authentication configuration, built once at startup.
#[derive(Clone)]
pub struct AuthBackend {
    pub codec: Arc<AccessTokenCodec>,
    pub partner_key: Arc<str>,
}

impl AuthBackend {
    pub fn new(codec: Arc<AccessTokenCodec>, partner_key: impl Into<Arc<str>>) -> Self {
        Self {
            codec,
            partner_key: partner_key.into(),
        }
    }
}

/// Trait for state types that support authentication extractors.
pub trait HasAuthBackend {
    fn auth(&self) -> &AuthBackend;
}

/// Macro to implement `HasAuthBackend` for state structs with an
/// `auth: AuthBackend` field.
///
/// # Example
/// ```ignore
/// use crate::impl_has_auth_backend;
///
/// #[derive(Clone)]
/// pub struct MyState {
///     pub db: Database,
///     pub auth: AuthBackend,
/// }
///
/// impl_has_auth_backend!(MyState);
/// ```
#[macro_export]
macro_rules! impl_has_auth_backend {
    ($state_type:ty) => {
        impl $crate::auth::HasAuthBackend for $state_type {
            fn auth(&self) -> &$crate::auth::AuthBackend {
                &self.auth
            }
        }
    };
}
