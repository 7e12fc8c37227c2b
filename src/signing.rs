//! Claim message construction and detached ed25519 signing.
//!
//! The on-chain escrow module verifies withdrawal authorizations against a
//! registered admin public key over a fixed-layout message:
//!
//! ```text
//! publisher (32 raw bytes)
//! amount    (u64, little-endian)
//! nonce     (u64, little-endian)
//! campaign  (ULEB128 length prefix + raw bytes)
//! ```
//!
//! This is the BCS encoding of the verifier's claim struct and must match
//! it byte for byte: any change here is a protocol-compatibility break,
//! not a style choice. [`build_claim_message`] is a pure function so the
//! same inputs always produce identical bytes.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use ed25519_dalek::{Signer as _, SigningKey, VerifyingKey};
use rand::rngs::OsRng;

use crate::config::AdsConfig;
use crate::error::AdsError;

/// Signature output returned to the claiming publisher.
#[derive(Debug, Clone)]
pub struct SignedClaim {
    /// Base64-encoded detached ed25519 signature over the claim message.
    pub signature: String,
    /// Base64-encoded admin public key the signature verifies under.
    pub admin_public_key: String,
}

/// Holds the admin signing key for claim authorizations.
///
/// The key is loaded once from configuration. When it is absent or
/// malformed an ephemeral keypair is generated for local development —
/// its public key is not registered on-chain, so signatures from it will
/// never verify in production.
#[derive(Debug)]
pub struct ClaimSigner {
    key: SigningKey,
    display_public_key: Option<String>,
    ephemeral: bool,
}

impl ClaimSigner {
    /// Loads the signer from configuration, falling back to an ephemeral
    /// dev keypair when no usable key material is present.
    #[must_use]
    pub fn from_config(config: &AdsConfig) -> Self {
        if let Some(encoded) = &config.admin_private_key_base64 {
            if let Some(key) = decode_signing_key(encoded) {
                tracing::info!("loaded configured admin signing key");
                return Self {
                    key,
                    display_public_key: config.admin_public_key_base64.clone(),
                    ephemeral: false,
                };
            }
            tracing::warn!("ADMIN_PRIVATE_KEY_BASE64 is malformed");
        }

        tracing::warn!(
            "no valid admin signing key configured; generated an ephemeral dev keypair — \
             claims signed with it will NOT verify on-chain"
        );
        Self {
            key: SigningKey::generate(&mut OsRng),
            display_public_key: config.admin_public_key_base64.clone(),
            ephemeral: true,
        }
    }

    /// Builds a signer from an explicit key, used by tests.
    #[must_use]
    pub fn from_signing_key(key: SigningKey) -> Self {
        Self {
            key,
            display_public_key: None,
            ephemeral: false,
        }
    }

    /// `true` when running on the dev-only ephemeral fallback keypair.
    #[must_use]
    pub const fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }

    /// Public half of the active signing key.
    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }

    /// Signs a claim message, returning the detached signature and the
    /// public key to hand to the on-chain verifier. A configured display
    /// key wins over the locally derived one so deployments can show the
    /// exact key registered on-chain.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> SignedClaim {
        let signature = self.key.sign(message);
        SignedClaim {
            signature: BASE64.encode(signature.to_bytes()),
            admin_public_key: self
                .display_public_key
                .clone()
                .unwrap_or_else(|| BASE64.encode(self.key.verifying_key().to_bytes())),
        }
    }
}

/// Accepts a 32-byte seed or a 64-byte keypair (seed followed by public
/// key), both base64-encoded.
fn decode_signing_key(encoded: &str) -> Option<SigningKey> {
    let bytes = BASE64.decode(encoded).ok()?;
    match bytes.len() {
        32 => {
            let seed: [u8; 32] = bytes.try_into().ok()?;
            Some(SigningKey::from_bytes(&seed))
        }
        64 => {
            let pair: [u8; 64] = bytes.try_into().ok()?;
            SigningKey::from_keypair_bytes(&pair).ok()
        }
        _ => None,
    }
}

/// Builds the canonical claim message the on-chain module verifies.
///
/// The publisher address must hex-decode (with or without a `0x` prefix)
/// to exactly 32 raw bytes. The campaign id is hex-decoded the same way
/// when possible, otherwise its raw UTF-8 bytes are used — the verifier
/// applies the identical fallback.
///
/// # Errors
///
/// Returns [`AdsError::InvalidAddress`] when the publisher address does
/// not decode to 32 bytes.
pub fn build_claim_message(
    publisher: &str,
    amount: u64,
    nonce: u64,
    campaign_id: &str,
) -> Result<Vec<u8>, AdsError> {
    let publisher_bytes = decode_hex(publisher)
        .map_err(|_| AdsError::InvalidAddress("publisher address is not valid hex".to_string()))?;
    if publisher_bytes.len() != 32 {
        return Err(AdsError::InvalidAddress(
            "publisher address must decode to 32 bytes".to_string(),
        ));
    }

    let campaign_bytes =
        decode_hex(campaign_id).unwrap_or_else(|_| campaign_id.as_bytes().to_vec());

    let mut message = Vec::with_capacity(32 + 8 + 8 + 2 + campaign_bytes.len());
    message.extend_from_slice(&publisher_bytes);
    message.extend_from_slice(&amount.to_le_bytes());
    message.extend_from_slice(&nonce.to_le_bytes());
    write_uleb128(&mut message, campaign_bytes.len() as u64);
    message.extend_from_slice(&campaign_bytes);
    Ok(message)
}

/// Hex decode tolerating an optional `0x` prefix.
fn decode_hex(value: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(value.strip_prefix("0x").unwrap_or(value))
}

/// ULEB128 as used by BCS for vector length prefixes.
fn write_uleb128(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
            buf.push(byte);
        } else {
            buf.push(byte);
            return;
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signature, Verifier as _};

    fn publisher() -> String {
        format!("0x{}", "11".repeat(32))
    }

    fn campaign() -> String {
        format!("0x{}", "22".repeat(32))
    }

    fn test_signer() -> ClaimSigner {
        ClaimSigner::from_signing_key(SigningKey::from_bytes(&[7u8; 32]))
    }

    fn build(amount: u64, nonce: u64) -> Vec<u8> {
        let Ok(message) = build_claim_message(&publisher(), amount, nonce, &campaign()) else {
            panic!("message should build");
        };
        message
    }

    #[test]
    fn message_layout_is_fixed() {
        let message = build(1_000, 7);
        // 32 publisher + 8 amount + 8 nonce + 1 length + 32 campaign.
        assert_eq!(message.len(), 81);
        assert_eq!(&message[..32], &[0x11u8; 32][..]);
        assert_eq!(&message[32..40], &1_000u64.to_le_bytes());
        assert_eq!(&message[40..48], &7u64.to_le_bytes());
        assert_eq!(message[48], 32);
        assert_eq!(&message[49..], &[0x22u8; 32][..]);
    }

    #[test]
    fn same_inputs_produce_identical_bytes() {
        assert_eq!(build(1_000, 7), build(1_000, 7));
    }

    #[test]
    fn every_field_perturbs_the_message() {
        let base = build(1_000, 7);
        assert_ne!(base, build(2_000, 7));
        assert_ne!(base, build(1_000, 8));

        let other_publisher = format!("0x{}", "33".repeat(32));
        let Ok(changed) = build_claim_message(&other_publisher, 1_000, 7, &campaign()) else {
            panic!("message should build");
        };
        assert_ne!(base, changed);

        let Ok(changed) = build_claim_message(&publisher(), 1_000, 7, "other-campaign") else {
            panic!("message should build");
        };
        assert_ne!(base, changed);
    }

    #[test]
    fn non_hex_campaign_id_falls_back_to_utf8_bytes() {
        let Ok(message) = build_claim_message(&publisher(), 5, 0, "demo-campaign") else {
            panic!("message should build");
        };
        let tail_len = "demo-campaign".len();
        assert_eq!(message[48], tail_len as u8);
        assert_eq!(&message[49..], "demo-campaign".as_bytes());
    }

    #[test]
    fn short_publisher_address_is_rejected() {
        let result = build_claim_message("0x1234", 1_000, 7, &campaign());
        assert!(matches!(result, Err(AdsError::InvalidAddress(_))));
    }

    #[test]
    fn non_hex_publisher_address_is_rejected() {
        let result = build_claim_message("not-hex-at-all", 1_000, 7, &campaign());
        assert!(matches!(result, Err(AdsError::InvalidAddress(_))));
    }

    #[test]
    fn uleb128_multi_byte_lengths() {
        let mut buf = Vec::new();
        write_uleb128(&mut buf, 127);
        assert_eq!(buf, vec![0x7f]);

        let mut buf = Vec::new();
        write_uleb128(&mut buf, 128);
        assert_eq!(buf, vec![0x80, 0x01]);

        let mut buf = Vec::new();
        write_uleb128(&mut buf, 300);
        assert_eq!(buf, vec![0xac, 0x02]);
    }

    #[test]
    fn signature_verifies_against_admin_public_key() {
        let signer = test_signer();
        let message = build(1_000, 7);
        let signed = signer.sign(&message);

        let Ok(sig_bytes) = BASE64.decode(&signed.signature) else {
            panic!("signature should be base64");
        };
        let Ok(sig_array) = <[u8; 64]>::try_from(sig_bytes.as_slice()) else {
            panic!("signature should be 64 bytes");
        };
        let signature = Signature::from_bytes(&sig_array);

        let Ok(key_bytes) = BASE64.decode(&signed.admin_public_key) else {
            panic!("public key should be base64");
        };
        let Ok(key_array) = <[u8; 32]>::try_from(key_bytes.as_slice()) else {
            panic!("public key should be 32 bytes");
        };
        let Ok(verifying_key) = VerifyingKey::from_bytes(&key_array) else {
            panic!("public key should decode");
        };

        assert!(verifying_key.verify(&message, &signature).is_ok());
    }

    #[test]
    fn signature_fails_on_tampered_message() {
        let signer = test_signer();
        let message = build(1_000, 7);
        let tampered = build(2_000, 7);
        let signed = signer.sign(&message);

        let Ok(sig_bytes) = BASE64.decode(&signed.signature) else {
            panic!("signature should be base64");
        };
        let Ok(sig_array) = <[u8; 64]>::try_from(sig_bytes.as_slice()) else {
            panic!("signature should be 64 bytes");
        };
        let signature = Signature::from_bytes(&sig_array);

        assert!(signer.verifying_key().verify(&tampered, &signature).is_err());
    }

    #[test]
    fn seed_and_keypair_encodings_both_load() {
        let seed = [9u8; 32];
        let key = SigningKey::from_bytes(&seed);

        let from_seed = decode_signing_key(&BASE64.encode(seed));
        let Some(from_seed) = from_seed else {
            panic!("seed should decode");
        };
        assert_eq!(from_seed.verifying_key(), key.verifying_key());

        let from_pair = decode_signing_key(&BASE64.encode(key.to_keypair_bytes()));
        let Some(from_pair) = from_pair else {
            panic!("keypair should decode");
        };
        assert_eq!(from_pair.verifying_key(), key.verifying_key());
    }

    #[test]
    fn malformed_key_material_is_rejected() {
        assert!(decode_signing_key("not base64!!!").is_none());
        assert!(decode_signing_key(&BASE64.encode([1u8; 17])).is_none());
    }
}
