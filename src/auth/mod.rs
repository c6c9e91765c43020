//! Request authentication.
//!
//! Two independent paths exist: end users present a short-lived access token
//! as `Authorization: Bearer <token>`, and the billing partner presents a
//! shared secret as `Authorization: ApiKey <key>`. Refresh tokens travel as
//! bearer credentials too, but only the refresh and revoke endpoints read them.

mod credentials;
mod errors;
mod extractors;
mod state;
mod types;

pub use credentials::{API_KEY_PREFIX, BEARER_PREFIX, api_key, bearer_token};
pub use errors::{ApiAuthError, AuthError};
pub use extractors::{Auth, PartnerAuth, authorize};
pub use state::{AuthBackend, HasAuthBackend};
pub use types::{Authorization, Identity, Scheme};
