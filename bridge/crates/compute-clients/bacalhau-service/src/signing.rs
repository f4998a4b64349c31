//! Client identity used to sign submissions.
//!
//! Requester nodes verify every `POST /submit` against the RSA key it carries: the signature is
//! PKCS#1 v1.5 over the SHA-256 of the serialized payload, and the payload's client id must be
//! the hex SHA-256 of the key's modulus.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey, EncodeRsaPublicKey, LineEnding};
use rsa::pkcs1v15::SigningKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::BacalhauError;

/// Size of keys created for a missing key file
const GENERATED_KEY_BITS: usize = 2048;

pub struct ClientKey {
    signing_key: SigningKey<Sha256>,
    public_key: String,
    client_id: String,
}

impl ClientKey {
    /// Parses a PKCS#1 PEM encoded RSA private key.
    pub fn from_pem(pem: &str) -> Result<Self, BacalhauError> {
        let private_key = RsaPrivateKey::from_pkcs1_pem(pem).map_err(|e| BacalhauError::key_error(e.to_string()))?;
        Self::from_private_key(private_key)
    }

    /// Loads the key at `path`, creating and saving a new one when the file does not exist.
    pub fn load_or_create(path: &Path) -> Result<Self, BacalhauError> {
        if path.exists() {
            let pem = fs::read_to_string(path)
                .map_err(|e| BacalhauError::key_error(format!("reading {}: {}", path.display(), e)))?;
            return Self::from_pem(&pem);
        }

        info!(path = %path.display(), "No Bacalhau client key found, generating one");
        let private_key = RsaPrivateKey::new(&mut rand::thread_rng(), GENERATED_KEY_BITS)
            .map_err(|e| BacalhauError::key_error(e.to_string()))?;
        let pem = private_key.to_pkcs1_pem(LineEnding::LF).map_err(|e| BacalhauError::key_error(e.to_string()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| BacalhauError::key_error(format!("creating {}: {}", parent.display(), e)))?;
        }
        fs::write(path, pem.as_bytes())
            .map_err(|e| BacalhauError::key_error(format!("writing {}: {}", path.display(), e)))?;

        Self::from_private_key(private_key)
    }

    fn from_private_key(private_key: RsaPrivateKey) -> Result<Self, BacalhauError> {
        let public_key = private_key.to_public_key();
        let der = public_key.to_pkcs1_der().map_err(|e| BacalhauError::key_error(e.to_string()))?;
        let client_id = hex::encode(Sha256::digest(public_key.n().to_bytes_be()));

        Ok(Self { signing_key: SigningKey::new(private_key), public_key: STANDARD.encode(der.as_bytes()), client_id })
    }

    /// Id the requester node derives from this key
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Base64 of the PKCS#1 DER public key
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Base64 signature over `message`.
    pub fn sign(&self, message: &[u8]) -> String {
        STANDARD.encode(self.signing_key.sign(message).to_bytes())
    }
}

#[cfg(test)]
mod tests {
    use rsa::pkcs1::DecodeRsaPublicKey;
    use rsa::pkcs1v15::{Signature, VerifyingKey};
    use rsa::signature::Verifier;
    use rsa::RsaPublicKey;

    use super::*;

    const TEST_KEY: &str = include_str!("../tests/fixtures/client_key.pem");

    #[test]
    fn client_id_is_derived_from_the_modulus() {
        let key = ClientKey::from_pem(TEST_KEY).unwrap();
        assert_eq!(key.client_id(), "a3f69339adb53c9db2a614d97fff237ff99e80a589df1262e4a4a87762b608a7");
    }

    #[test]
    fn signatures_verify_against_the_published_key() {
        let key = ClientKey::from_pem(TEST_KEY).unwrap();
        let message = br#"{"ClientID":"abc"}"#;

        let der = STANDARD.decode(key.public_key()).unwrap();
        let verifying_key = VerifyingKey::<Sha256>::new(RsaPublicKey::from_pkcs1_der(&der).unwrap());
        let signature = Signature::try_from(STANDARD.decode(key.sign(message)).unwrap().as_slice()).unwrap();

        assert!(verifying_key.verify(message, &signature).is_ok());
        assert!(verifying_key.verify(b"tampered", &signature).is_err());
    }

    #[test]
    fn malformed_keys_are_rejected() {
        assert!(matches!(ClientKey::from_pem("not a key"), Err(BacalhauError::KeyError { .. })));
    }

    #[test]
    fn existing_key_files_are_reused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_id.pem");
        fs::write(&path, TEST_KEY).unwrap();

        let key = ClientKey::load_or_create(&path).unwrap();

        assert_eq!(key.client_id(), ClientKey::from_pem(TEST_KEY).unwrap().client_id());
        assert_eq!(fs::read_to_string(&path).unwrap(), TEST_KEY);
    }
}
