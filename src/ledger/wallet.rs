//! Wallet management and transaction signing.
//!
//! # Security
//! - The secret is read from the command line or `PAYOUT_WALLET_SECRET`
//! - Only the public key is ever logged or printed
//! - One wallet per run; it is never mutated after construction

use std::fmt;

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::ledger::codec::to_canonical_bytes;
use crate::ledger::network::Network;
use crate::ledger::transaction::{DecoratedSignature, ParsedTransaction, Transaction};
use crate::ledger::types::{SigningError, WalletError};

/// Environment variable name for the wallet secret.
pub const WALLET_SECRET_ENV_VAR: &str = "PAYOUT_WALLET_SECRET";

/// Envelope type tag mixed into the signature payload.
const ENVELOPE_TYPE_TX: u32 = 2;

/// A single signing key bound to one network.
#[derive(Clone)]
pub struct Wallet {
    signing_key: SigningKey,
    network: Network,
}

impl Wallet {
    /// Create a wallet from a hex-encoded 32-byte ed25519 seed.
    ///
    /// A `0x` prefix and surrounding whitespace are accepted.
    pub fn from_secret(secret: &str, network: Network) -> Result<Self, WalletError> {
        let secret = secret.trim();
        let secret = secret.strip_prefix("0x").unwrap_or(secret);
        if secret.is_empty() {
            return Err(WalletError::MissingSecret);
        }

        let bytes = hex::decode(secret)?;
        let seed: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| WalletError::InvalidLength(bytes.len()))?;

        let wallet = Self {
            signing_key: SigningKey::from_bytes(&seed),
            network,
        };

        tracing::info!(
            public_key = %wallet.public_key_hex(),
            network = %wallet.network.passphrase(),
            "Wallet initialized"
        );

        Ok(wallet)
    }

    /// Load the wallet secret from `PAYOUT_WALLET_SECRET`.
    pub fn from_env(network: Network) -> Result<Self, WalletError> {
        let secret = std::env::var(WALLET_SECRET_ENV_VAR).map_err(|_| WalletError::MissingSecret)?;
        Self::from_secret(&secret, network)
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.verifying_key().to_bytes())
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Return a copy of `tx` with this wallet's signature appended.
    ///
    /// Nothing but the signature list changes. A transaction this key has
    /// already signed is refused.
    pub fn sign(&self, tx: &ParsedTransaction) -> Result<ParsedTransaction, SigningError> {
        if has_signature_from(tx, &self.network, &self.verifying_key()) {
            return Err(SigningError::AlreadySigned(self.public_key_hex()));
        }
        sign_transaction(tx, &self.network, &self.signing_key)
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("public_key", &self.public_key_hex())
            .field("network", &self.network.passphrase())
            .finish()
    }
}

/// Hash that is actually signed: `sha256(network_id ‖ ENVELOPE_TYPE_TX ‖ transaction)`.
pub fn signature_payload(tx: &Transaction, network: &Network) -> Result<[u8; 32], bincode::Error> {
    let body = to_canonical_bytes(tx)?;
    let mut hasher = Sha256::new();
    hasher.update(network.id());
    hasher.update(ENVELOPE_TYPE_TX.to_be_bytes());
    hasher.update(&body);
    Ok(hasher.finalize().into())
}

/// Sign `tx` for `network` with `key`, appending one decorated signature.
pub fn sign_transaction(
    tx: &ParsedTransaction,
    network: &Network,
    key: &SigningKey,
) -> Result<ParsedTransaction, SigningError> {
    let payload = signature_payload(&tx.transaction, network).map_err(SigningError::Payload)?;
    let signature = key.sign(&payload);

    let mut signed = tx.clone();
    signed.signatures.push(DecoratedSignature {
        hint: signature_hint(&key.verifying_key()),
        signature: signature.to_bytes().to_vec(),
    });
    Ok(signed)
}

/// Check whether `signature` is a valid signature of `tx` by `public_key`.
pub fn verify_signature(
    tx: &ParsedTransaction,
    network: &Network,
    public_key: &VerifyingKey,
    signature: &DecoratedSignature,
) -> bool {
    if signature.hint != signature_hint(public_key) {
        return false;
    }
    let Ok(bytes) = <[u8; 64]>::try_from(signature.signature.as_slice()) else {
        return false;
    };
    let Ok(payload) = signature_payload(&tx.transaction, network) else {
        return false;
    };
    public_key
        .verify(&payload, &Signature::from_bytes(&bytes))
        .is_ok()
}

fn has_signature_from(tx: &ParsedTransaction, network: &Network, public_key: &VerifyingKey) -> bool {
    tx.signatures
        .iter()
        .any(|sig| verify_signature(tx, network, public_key, sig))
}

/// Last four bytes of the public key.
fn signature_hint(public_key: &VerifyingKey) -> [u8; 4] {
    let bytes = public_key.to_bytes();
    [bytes[28], bytes[29], bytes[30], bytes[31]]
}
