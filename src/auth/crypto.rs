//! Solana wallet signature verification
//!
//! Verifies ed25519 detached signatures produced by Solana wallets. Both the
//! public key (the wallet address) and the signature travel base58-encoded.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use thiserror::Error;

/// Length of a raw ed25519 public key
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Length of a raw ed25519 signature
pub const SIGNATURE_LENGTH: usize = 64;

/// Errors for malformed verification input
///
/// A signature that decodes fine but does not match is not an error, see
/// [`verify_wallet_signature`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid signature format: {0}")]
    InvalidSignature(String),
}

/// Verify a Solana wallet signature over a UTF-8 message
///
/// # Arguments
/// * `message` - The message that was signed
/// * `signature_base58` - Base58-encoded 64-byte detached signature
/// * `public_key_base58` - Base58-encoded wallet address
///
/// # Returns
/// * `Ok(true)` if the signature is valid for the message and key
/// * `Ok(false)` if the signature does not verify
/// * `Err(CryptoError)` if the key or signature cannot be decoded
pub fn verify_wallet_signature(
    message: &str,
    signature_base58: &str,
    public_key_base58: &str,
) -> Result<bool, CryptoError> {
    let verifying_key = decode_public_key(public_key_base58)?;
    let signature = decode_signature(signature_base58)?;

    Ok(verifying_key.verify(message.as_bytes(), &signature).is_ok())
}

/// Decode a base58 wallet address into an ed25519 verifying key
///
/// Rejects anything that is not exactly 32 bytes or is not a valid
/// compressed Edwards point.
pub fn decode_public_key(public_key_base58: &str) -> Result<VerifyingKey, CryptoError> {
    let bytes = bs58::decode(public_key_base58)
        .into_vec()
        .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;

    let bytes: [u8; PUBLIC_KEY_LENGTH] = bytes.try_into().map_err(|b: Vec<u8>| {
        CryptoError::InvalidPublicKey(format!(
            "expected {} bytes, got {}",
            PUBLIC_KEY_LENGTH,
            b.len()
        ))
    })?;

    VerifyingKey::from_bytes(&bytes).map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
}

fn decode_signature(signature_base58: &str) -> Result<Signature, CryptoError> {
    let bytes = bs58::decode(signature_base58)
        .into_vec()
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

    let bytes: [u8; SIGNATURE_LENGTH] = bytes.try_into().map_err(|b: Vec<u8>| {
        CryptoError::InvalidSignature(format!(
            "expected {} bytes, got {}",
            SIGNATURE_LENGTH,
            b.len()
        ))
    })?;

    Ok(Signature::from_bytes(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};
    use rand::rngs::OsRng;

    fn keypair() -> (SigningKey, String) {
        let signing_key = SigningKey::generate(&mut OsRng);
        let address = bs58::encode(signing_key.verifying_key().as_bytes()).into_string();
        (signing_key, address)
    }

    #[test]
    fn test_valid_signature() {
        let (signing_key, address) = keypair();
        let message = "Authenticate with your wallet: 1700000000000";
        let signature = bs58::encode(signing_key.sign(message.as_bytes()).to_bytes()).into_string();

        assert_eq!(
            verify_wallet_signature(message, &signature, &address),
            Ok(true)
        );
    }

    #[test]
    fn test_bit_flipped_signature_fails() {
        let (signing_key, address) = keypair();
        let message = "Authenticate with your wallet: 1700000000000";
        let raw = signing_key.sign(message.as_bytes()).to_bytes();

        for bit in [0usize, 7, 100, 511] {
            let mut flipped = raw;
            flipped[bit / 8] ^= 1 << (bit % 8);
            let signature = bs58::encode(flipped).into_string();
            assert_eq!(
                verify_wallet_signature(message, &signature, &address),
                Ok(false),
                "bit {} flipped",
                bit
            );
        }
    }

    #[test]
    fn test_wrong_message_fails() {
        let (signing_key, address) = keypair();
        let signature = bs58::encode(signing_key.sign(b"hello").to_bytes()).into_string();

        assert_eq!(
            verify_wallet_signature("goodbye", &signature, &address),
            Ok(false)
        );
    }

    #[test]
    fn test_signature_from_other_wallet_fails() {
        let (signing_key, _) = keypair();
        let (_, other_address) = keypair();
        let signature = bs58::encode(signing_key.sign(b"hello").to_bytes()).into_string();

        assert_eq!(
            verify_wallet_signature("hello", &signature, &other_address),
            Ok(false)
        );
    }

    #[test]
    fn test_invalid_public_key() {
        let signature = bs58::encode([0u8; SIGNATURE_LENGTH]).into_string();

        // '0' is not in the base58 alphabet
        let result = verify_wallet_signature("hello", &signature, "0OIl");
        assert!(matches!(result, Err(CryptoError::InvalidPublicKey(_))));

        let short = bs58::encode([1u8; 16]).into_string();
        let result = verify_wallet_signature("hello", &signature, &short);
        assert!(matches!(result, Err(CryptoError::InvalidPublicKey(_))));
    }

    #[test]
    fn test_invalid_signature_encoding() {
        let (_, address) = keypair();

        let result = verify_wallet_signature("hello", "not-base58!", &address);
        assert!(matches!(result, Err(CryptoError::InvalidSignature(_))));

        let short = bs58::encode([1u8; 10]).into_string();
        let result = verify_wallet_signature("hello", &short, &address);
        assert!(matches!(result, Err(CryptoError::InvalidSignature(_))));
    }
}
