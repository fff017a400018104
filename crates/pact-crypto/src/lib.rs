//! Cryptographic primitives for the Pact verifier.
//!
//! Keys and signatures travel Base58-encoded on the wire; payload hashes
//! are lowercase hex SHA-256. Verification is strict Ed25519
//! (malleability-rejecting).

use ed25519_dalek::{Signature, VerifyingKey};
use sha2::{Digest, Sha256};

mod error;

pub use error::CryptoError;

/// Result alias for crypto operations.
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Ed25519 public keys are 32 bytes.
pub const PUBLIC_KEY_LEN: usize = 32;
/// Ed25519 signatures are 64 bytes.
pub const SIGNATURE_LEN: usize = 64;

/// Lowercase hex SHA-256 of arbitrary bytes.
pub fn sha256_hex(data: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_ref());
    hex::encode(hasher.finalize())
}

/// Decode a Base58 string (checksum-free alphabet, as used for keys and
/// signatures on the wire).
pub fn b58_decode(s: &str) -> Result<Vec<u8>> {
    bs58::decode(s)
        .into_vec()
        .map_err(|_| CryptoError::InvalidEncoding)
}

/// Decode a Base58 public key, enforcing the Ed25519 length.
pub fn b58_decode_pubkey(s: &str) -> Result<[u8; PUBLIC_KEY_LEN]> {
    let bytes = b58_decode(s)?;
    bytes.try_into().map_err(|_| CryptoError::BadKey)
}

/// Decode a Base58 signature, enforcing the Ed25519 length.
pub fn b58_decode_signature(s: &str) -> Result<[u8; SIGNATURE_LEN]> {
    let bytes = b58_decode(s)?;
    bytes.try_into().map_err(|_| CryptoError::BadSignature)
}

/// Verify an Ed25519 signature over a message.
///
/// Uses `verify_strict`, which rejects the malleable and small-order
/// signatures that plain verification accepts.
pub fn ed25519_verify(
    pubkey: &[u8; PUBLIC_KEY_LEN],
    msg: &[u8],
    sig: &[u8; SIGNATURE_LEN],
) -> Result<()> {
    let key = VerifyingKey::from_bytes(pubkey).map_err(|_| CryptoError::BadKey)?;
    let signature = Signature::from_bytes(sig);
    key.verify_strict(msg, &signature)
        .map_err(|_| CryptoError::BadSignature)
}

/// Verify a Base58-encoded signature under a Base58-encoded public key.
pub fn ed25519_verify_b58(pubkey_b58: &str, msg: &[u8], sig_b58: &str) -> Result<()> {
    let pubkey = b58_decode_pubkey(pubkey_b58)?;
    let sig = b58_decode_signature(sig_b58)?;
    ed25519_verify(&pubkey, msg, &sig)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};
    use rand::rngs::OsRng;

    #[test]
    fn sha256_hex_matches_known_vector() {
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn sha256_hex_is_lowercase() {
        let digest = sha256_hex(b"pact");
        assert_eq!(digest, digest.to_lowercase());
        assert_eq!(digest.len(), 64);
    }

    #[test]
    fn b58_round_trip() {
        let bytes = [7u8; 32];
        let encoded = bs58::encode(bytes).into_string();
        assert_eq!(b58_decode(&encoded).unwrap(), bytes.to_vec());
    }

    #[test]
    fn b58_rejects_invalid_alphabet() {
        assert!(matches!(
            b58_decode("0OIl"),
            Err(CryptoError::InvalidEncoding)
        ));
    }

    #[test]
    fn pubkey_length_enforced() {
        let short = bs58::encode([1u8; 16]).into_string();
        assert!(matches!(b58_decode_pubkey(&short), Err(CryptoError::BadKey)));
    }

    #[test]
    fn signature_length_enforced() {
        let short = bs58::encode([1u8; 32]).into_string();
        assert!(matches!(
            b58_decode_signature(&short),
            Err(CryptoError::BadSignature)
        ));
    }

    #[test]
    fn verify_accepts_valid_signature() {
        let key = SigningKey::generate(&mut OsRng);
        let msg = b"payload-hash-bytes";
        let sig = key.sign(msg);
        ed25519_verify(
            key.verifying_key().as_bytes(),
            msg,
            &sig.to_bytes(),
        )
        .unwrap();
    }

    #[test]
    fn verify_rejects_wrong_message() {
        let key = SigningKey::generate(&mut OsRng);
        let sig = key.sign(b"original");
        assert!(matches!(
            ed25519_verify(key.verifying_key().as_bytes(), b"tampered", &sig.to_bytes()),
            Err(CryptoError::BadSignature)
        ));
    }

    #[test]
    fn verify_b58_end_to_end() {
        let key = SigningKey::generate(&mut OsRng);
        let msg = b"canonical-round";
        let sig = key.sign(msg);
        let pk_b58 = bs58::encode(key.verifying_key().as_bytes()).into_string();
        let sig_b58 = bs58::encode(sig.to_bytes()).into_string();
        ed25519_verify_b58(&pk_b58, msg, &sig_b58).unwrap();
    }
}
