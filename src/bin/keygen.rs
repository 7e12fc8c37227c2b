//! Generates an admin signing keypair for deployment configuration.
//!
//! Prints the base64 values to export as `ADMIN_PRIVATE_KEY_BASE64` and
//! `ADMIN_PUBLIC_KEY_BASE64`; the public key is also what gets registered
//! with the on-chain escrow module.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;

fn main() {
    let key = SigningKey::generate(&mut OsRng);

    println!("ADMIN_PRIVATE_KEY_BASE64={}", BASE64.encode(key.to_keypair_bytes()));
    println!("ADMIN_PUBLIC_KEY_BASE64={}", BASE64.encode(key.verifying_key().to_bytes()));
}
