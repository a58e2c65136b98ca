//! L1 Action Signing — EIP-712 Phantom Agent
//!
//! Every `/exchange` action is signed, not the HTTP request. The action is
//! msgpack-encoded, extended with the nonce and vault marker, and hashed
//! with keccak256. The hash is then wrapped in an `Agent` struct and
//! signed under the fixed "Exchange" EIP-712 domain (chain id 1337).

use std::sync::atomic::{AtomicU64, Ordering};

use alloy::primitives::{Address, B256, keccak256};
use alloy::signers::SignerSync;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use alloy::sol_types::{SolStruct, eip712_domain};
use serde::Serialize;

use super::types::SignatureWire;
use crate::error::{ExchangeError, Result};

/// Chain id of the L1 signing domain (not the settlement chain).
const L1_CHAIN_ID: u64 = 1337;

sol! {
    #[derive(Debug)]
    struct Agent {
        string source;
        bytes32 connectionId;
    }
}

/// Monotonic nonce source: wall-clock millis, bumped on collision.
///
/// The venue rejects reused nonces, so two actions signed in the same
/// millisecond get consecutive values.
#[derive(Debug, Default)]
pub struct NonceGenerator {
    last: AtomicU64,
}

impl NonceGenerator {
    pub const fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// Next nonce based on the current time.
    pub fn next(&self) -> u64 {
        let now = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default();
        self.next_at(now)
    }

    /// Next nonce given an explicit clock reading.
    pub fn next_at(&self, now_ms: u64) -> u64 {
        let previous = match self.last.fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
            Some(now_ms.max(last + 1))
        }) {
            Ok(prev) | Err(prev) => prev,
        };
        now_ms.max(previous + 1)
    }
}

/// Signs L1 actions with a local private key.
pub struct L1Signer {
    signer: PrivateKeySigner,
    is_mainnet: bool,
}

impl L1Signer {
    /// Parse a hex private key (with or without 0x).
    ///
    /// The error never includes the key material.
    pub fn from_private_key(private_key: &str, is_mainnet: bool) -> Result<Self> {
        let signer = private_key
            .trim()
            .parse::<PrivateKeySigner>()
            .map_err(|_| ExchangeError::Authentication("private key is not a valid secp256k1 key".to_string()))?;
        Ok(Self { signer, is_mainnet })
    }

    /// Address derived from the signing key.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign an action for submission to `/exchange`.
    pub fn sign_l1_action<A: Serialize>(
        &self,
        action: &A,
        nonce: u64,
        vault: Option<Address>,
    ) -> Result<SignatureWire> {
        let connection_id = action_hash(action, nonce, vault)?;
        self.sign_connection_id(connection_id)
    }

    fn sign_connection_id(&self, connection_id: B256) -> Result<SignatureWire> {
        let agent = Agent {
            source: phantom_source(self.is_mainnet).to_string(),
            connectionId: connection_id,
        };
        let domain = eip712_domain! {
            name: "Exchange",
            version: "1",
            chain_id: L1_CHAIN_ID,
            verifying_contract: Address::ZERO,
        };
        let digest = agent.eip712_signing_hash(&domain);
        let signature = self
            .signer
            .sign_hash_sync(&digest)
            .map_err(|e| ExchangeError::Authentication(format!("signing failed: {e}")))?;

        let bytes = signature.as_bytes();
        Ok(SignatureWire {
            r: format!("0x{}", alloy::primitives::hex::encode(&bytes[..32])),
            s: format!("0x{}", alloy::primitives::hex::encode(&bytes[32..64])),
            v: bytes[64],
        })
    }
}

/// "a" on mainnet, "b" on testnet.
pub const fn phantom_source(is_mainnet: bool) -> &'static str {
    if is_mainnet { "a" } else { "b" }
}

/// keccak256(msgpack(action) ‖ nonce_be ‖ vault_marker).
///
/// The vault marker is a single 0x00 byte, or 0x01 followed by the 20
/// address bytes when trading on behalf of a vault.
pub fn action_hash<A: Serialize>(action: &A, nonce: u64, vault: Option<Address>) -> Result<B256> {
    let mut data = rmp_serde::to_vec_named(action)
        .map_err(|e| ExchangeError::InvalidRequest(format!("failed to encode action: {e}")))?;
    data.extend_from_slice(&nonce.to_be_bytes());
    match vault {
        None => data.push(0x00),
        Some(address) => {
            data.push(0x01);
            data.extend_from_slice(address.as_slice());
        }
    }
    Ok(keccak256(&data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::api::types::{CancelAction, CancelWire};

    // Well-known throwaway key (Ethereum docs test vector).
    const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn cancel(oid: u64) -> CancelAction {
        CancelAction {
            kind: "cancel".to_string(),
            cancels: vec![CancelWire { a: 0, o: oid }],
        }
    }

    #[test]
    fn test_action_hash_is_deterministic() {
        let a = action_hash(&cancel(42), 1_700_000_000_000, None).unwrap();
        let b = action_hash(&cancel(42), 1_700_000_000_000, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_action_hash_binds_nonce_vault_and_payload() {
        let base = action_hash(&cancel(42), 1, None).unwrap();
        assert_ne!(base, action_hash(&cancel(42), 2, None).unwrap());
        assert_ne!(base, action_hash(&cancel(43), 1, None).unwrap());
        assert_ne!(base, action_hash(&cancel(42), 1, Some(Address::repeat_byte(0x11))).unwrap());
    }

    #[test]
    fn test_signature_layout() {
        let signer = L1Signer::from_private_key(KEY, true).unwrap();
        let sig = signer.sign_l1_action(&cancel(7), 1_700_000_000_000, None).unwrap();
        assert_eq!(sig.r.len(), 66);
        assert_eq!(sig.s.len(), 66);
        assert!(sig.v == 27 || sig.v == 28);
    }

    #[test]
    fn test_network_changes_signature() {
        let mainnet = L1Signer::from_private_key(KEY, true).unwrap();
        let testnet = L1Signer::from_private_key(KEY, false).unwrap();
        let a = mainnet.sign_l1_action(&cancel(7), 5, None).unwrap();
        let b = testnet.sign_l1_action(&cancel(7), 5, None).unwrap();
        assert_ne!(a, b);
        assert_eq!(phantom_source(true), "a");
        assert_eq!(phantom_source(false), "b");
    }

    #[test]
    fn test_signer_address_matches_key() {
        let signer = L1Signer::from_private_key(KEY, true).unwrap();
        let expected: Address = "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23".parse().unwrap();
        assert_eq!(signer.address(), expected);
    }

    #[test]
    fn test_bad_key_error_hides_material() {
        let err = L1Signer::from_private_key("0xnot-a-key", true).err().unwrap();
        assert!(matches!(err, ExchangeError::Authentication(_)));
        assert!(!err.to_string().contains("not-a-key"));
    }

    #[test]
    fn test_nonces_strictly_increase() {
        let nonces = NonceGenerator::new();
        let a = nonces.next_at(1_000);
        let b = nonces.next_at(1_000);
        let c = nonces.next_at(999);
        let d = nonces.next_at(5_000);
        assert_eq!(a, 1_000);
        assert_eq!(b, 1_001);
        assert_eq!(c, 1_002);
        assert_eq!(d, 5_000);
    }
}
