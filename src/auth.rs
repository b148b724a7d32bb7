//! Decorative wallet sign-in gate. The address is never verified; a guest
//! bypass is just as valid as a wallet address. Entering the scene merely
//! requires `admitted()` to be true.

use bevy::prelude::*;

/// Bypass address accepted in place of a wallet address.
pub const GUEST_ADDRESS: &str = "guest";

#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct SignIn {
    address: Option<String>,
}

impl SignIn {
    /// Signed in with a wallet-provided address string.
    pub fn wallet(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
        }
    }

    /// Signed in via the guest bypass.
    pub fn guest() -> Self {
        Self::wallet(GUEST_ADDRESS)
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Whether the user may enter the scene.
    pub fn admitted(&self) -> bool {
        self.address.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_out_is_not_admitted() {
        assert!(!SignIn::default().admitted());
    }

    #[test]
    fn guest_bypass_is_as_valid_as_a_wallet() {
        assert!(SignIn::guest().admitted());
        assert!(SignIn::wallet("0xabc123").admitted());
        assert_eq!(SignIn::guest().address(), Some(GUEST_ADDRESS));
    }
}
