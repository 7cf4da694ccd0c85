//! Signing key management.

use std::path::PathBuf;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use thiserror::Error;
use zeroize::Zeroizing;

/// Source of the private key.
#[derive(Debug, Clone)]
pub enum KeySource {
    /// Load from environment variable (development).
    EnvVar { var_name: String },
    /// Load from file (production, recommend 0600 permissions).
    File { path: PathBuf },
}

/// Holds the signing identity.
///
/// - Key bytes are held in `Zeroizing` buffers while parsing.
/// - Keys are loaded once; there is no runtime rotation.
/// - Never log private key material.
pub struct KeyManager {
    signer: PrivateKeySigner,
}

impl KeyManager {
    /// Load the key from `source`, optionally checking the derived address.
    ///
    /// # Errors
    /// Returns `KeyError` if the variable or file is missing, the hex is
    /// invalid, the key is not a valid secp256k1 scalar, or the derived
    /// address does not match `expected_address`.
    pub fn load(source: KeySource, expected_address: Option<Address>) -> Result<Self, KeyError> {
        let secret: Zeroizing<String> = match source {
            KeySource::EnvVar { ref var_name } => Zeroizing::new(
                std::env::var(var_name).map_err(|_| KeyError::EnvVarNotFound(var_name.clone()))?,
            ),
            KeySource::File { ref path } => Zeroizing::new(std::fs::read_to_string(path)?),
        };
        Self::from_hex(&secret, expected_address)
    }

    /// Parse a hex key (optional `0x` prefix, surrounding whitespace ignored).
    pub fn from_hex(hex_key: &str, expected_address: Option<Address>) -> Result<Self, KeyError> {
        let trimmed = hex_key.trim();
        let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = Zeroizing::new(hex::decode(trimmed)?);
        Self::from_bytes(&bytes, expected_address)
    }

    pub fn from_bytes(secret: &[u8], expected_address: Option<Address>) -> Result<Self, KeyError> {
        let signer =
            PrivateKeySigner::from_slice(secret).map_err(|e| KeyError::InvalidKey(e.to_string()))?;

        if let Some(expected) = expected_address {
            if signer.address() != expected {
                return Err(KeyError::AddressMismatch {
                    expected,
                    actual: signer.address(),
                });
            }
        }

        Ok(Self { signer })
    }

    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }
}

impl std::fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyManager")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Key management errors.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Failed to decode hex: {0}")]
    HexDecode(#[from] hex::FromHexError),

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Address mismatch: expected {expected}, got {actual}")]
    AddressMismatch { expected: Address, actual: Address },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    /// Well-known development key (anvil account 0).
    const TEST_PRIVATE_KEY: &str =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn test_from_hex_derives_address() {
        let keys = KeyManager::from_hex(TEST_PRIVATE_KEY, None).unwrap();
        assert_eq!(keys.address(), Address::from_str(TEST_ADDRESS).unwrap());

        let bare = TEST_PRIVATE_KEY.trim_start_matches("0x");
        let keys = KeyManager::from_hex(&format!("  {bare}\n"), None).unwrap();
        assert_eq!(keys.address(), Address::from_str(TEST_ADDRESS).unwrap());
    }

    #[test]
    fn test_address_mismatch() {
        let err = KeyManager::from_hex(TEST_PRIVATE_KEY, Some(Address::ZERO)).unwrap_err();
        assert!(matches!(err, KeyError::AddressMismatch { .. }));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            KeyManager::from_hex("0xnothex", None),
            Err(KeyError::HexDecode(_))
        ));
        assert!(matches!(
            KeyManager::from_bytes(&[0u8; 32], None),
            Err(KeyError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_missing_env_var() {
        let err = KeyManager::load(
            KeySource::EnvVar {
                var_name: "TRUF_TEST_KEY_THAT_DOES_NOT_EXIST".to_string(),
            },
            None,
        )
        .unwrap_err();
        assert!(matches!(err, KeyError::EnvVarNotFound(_)));
    }

    #[test]
    fn test_debug_hides_key() {
        let keys = KeyManager::from_hex(TEST_PRIVATE_KEY, None).unwrap();
        let rendered = format!("{keys:?}");
        assert!(!rendered.contains("ac0974bec39a17e3"));
    }
}
