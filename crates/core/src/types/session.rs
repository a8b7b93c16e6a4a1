//! Session identity gating cart and wishlist operations.

use secrecy::SecretString;

use crate::types::id::UserId;

/// The logged-in user's identity.
///
/// Cart and wishlist mutations are scoped to a user; when no identity is
/// present they are refused before any network call. The bearer token is
/// held in a [`SecretString`] so it never appears in `Debug` output.
#[derive(Clone)]
pub struct SessionIdentity {
    user_id: UserId,
    token: SecretString,
}

impl SessionIdentity {
    /// Create a session identity.
    #[must_use]
    pub fn new(user_id: UserId, token: SecretString) -> Self {
        Self { user_id, token }
    }

    /// The user this session belongs to.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// The bearer token for authenticated requests.
    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }
}

impl std::fmt::Debug for SessionIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionIdentity")
            .field("user_id", &self.user_id)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
