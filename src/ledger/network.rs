//! Network identity used to bind signatures to one ledger instance.

use sha2::{Digest, Sha256};

/// Passphrase of the public network.
pub const PUBLIC_NETWORK_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";

/// Passphrase of the test network.
pub const TEST_NETWORK_PASSPHRASE: &str = "Test SDF Network ; September 2015";

/// A ledger network, identified by the SHA-256 of its passphrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    passphrase: String,
    id: [u8; 32],
}

impl Network {
    pub fn new(passphrase: impl Into<String>) -> Self {
        let passphrase = passphrase.into();
        let id = Sha256::digest(passphrase.as_bytes()).into();
        Self { passphrase, id }
    }

    pub fn public() -> Self {
        Self::new(PUBLIC_NETWORK_PASSPHRASE)
    }

    pub fn testnet() -> Self {
        Self::new(TEST_NETWORK_PASSPHRASE)
    }

    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }

    /// 32-byte network id mixed into every signature payload.
    pub fn id(&self) -> &[u8; 32] {
        &self.id
    }
}
