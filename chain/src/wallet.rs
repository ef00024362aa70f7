//! RSA-1024 wallet: key generation, on-disk persistence, and PKCS#1 v1.5
//! signing/verification of transfers.
//!
//! A wallet owns exactly one keypair. It is the only place in this crate
//! that touches private key material; the engine and verification
//! predicates only ever see hex-encoded public keys and signatures.

use std::fmt;
use std::fs;
use std::path::Path;

use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

use crate::hashing::signing_message;
use crate::types::{Transaction, MINING_SENTINEL};

/// Bit length of generated RSA keys, matching the reference protocol.
const KEY_BITS: usize = 1024;

/// Errors a wallet operation can fail with.
#[derive(Debug)]
pub enum WalletError {
    /// No keypair has been generated or loaded yet.
    NoKeys,
    /// Key material on disk (or passed in) could not be parsed.
    Corrupt(&'static str),
    /// Underlying filesystem operation failed.
    Io(std::io::Error),
    /// RSA key generation or signing operation failed.
    Crypto(String),
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletError::NoKeys => write!(f, "wallet has no keypair"),
            WalletError::Corrupt(msg) => write!(f, "corrupt wallet key material: {msg}"),
            WalletError::Io(e) => write!(f, "wallet I/O error: {e}"),
            WalletError::Crypto(msg) => write!(f, "wallet crypto error: {msg}"),
        }
    }
}

impl std::error::Error for WalletError {}

impl From<std::io::Error> for WalletError {
    fn from(e: std::io::Error) -> Self {
        WalletError::Io(e)
    }
}

/// An RSA-1024 keypair plus the hex encodings exposed over the wire.
#[derive(Clone, Default)]
pub struct Wallet {
    public_key_hex: Option<String>,
    private_key_hex: Option<String>,
}

impl Wallet {
    /// Creates an empty wallet with no keypair.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the hex-encoded public key, if a keypair is present.
    pub fn public_key(&self) -> Option<&str> {
        self.public_key_hex.as_deref()
    }

    /// Returns the hex-encoded private key, if a keypair is present.
    pub fn private_key(&self) -> Option<&str> {
        self.private_key_hex.as_deref()
    }

    /// Generates a fresh RSA-1024 keypair, overwriting any existing keys.
    pub fn create_keys(&mut self) -> Result<(), WalletError> {
        let mut rng = OsRng;
        let private_key = RsaPrivateKey::new(&mut rng, KEY_BITS)
            .map_err(|e| WalletError::Crypto(format!("key generation failed: {e}")))?;
        let public_key = RsaPublicKey::from(&private_key);

        let private_der = private_key
            .to_pkcs1_der()
            .map_err(|e| WalletError::Crypto(format!("failed to encode private key: {e}")))?;
        let public_der = public_key
            .to_pkcs1_der()
            .map_err(|e| WalletError::Crypto(format!("failed to encode public key: {e}")))?;

        self.private_key_hex = Some(hex::encode(private_der.as_bytes()));
        self.public_key_hex = Some(hex::encode(public_der.as_bytes()));
        Ok(())
    }

    /// Persists `public_key\nprivate_key\n` to `path`.
    pub fn save_keys(&self, path: &Path) -> Result<(), WalletError> {
        let (public_key, private_key) = match (&self.public_key_hex, &self.private_key_hex) {
            (Some(pk), Some(sk)) => (pk, sk),
            _ => return Err(WalletError::NoKeys),
        };
        let contents = format!("{public_key}\n{private_key}\n");
        fs::write(path, contents)?;
        Ok(())
    }

    /// Loads `public_key\nprivate_key\n` from `path`, replacing any
    /// in-memory keypair.
    pub fn load_keys(&mut self, path: &Path) -> Result<(), WalletError> {
        let contents = fs::read_to_string(path)?;
        let mut lines = contents.lines();
        let public_key = lines
            .next()
            .ok_or(WalletError::Corrupt("missing public key line"))?;
        let private_key = lines
            .next()
            .ok_or(WalletError::Corrupt("missing private key line"))?;

        // Validate both keys parse before committing either.
        decode_private_key(private_key)?;
        decode_public_key(public_key)?;

        self.public_key_hex = Some(public_key.to_string());
        self.private_key_hex = Some(private_key.to_string());
        Ok(())
    }

    /// Signs `sender -> recipient : amount` with this wallet's private key,
    /// returning the hex-encoded PKCS#1 v1.5 signature.
    pub fn sign_transaction(&self, sender: &str, recipient: &str, amount: f64) -> Result<String, WalletError> {
        let private_key_hex = self.private_key_hex.as_deref().ok_or(WalletError::NoKeys)?;
        let private_key = decode_private_key(private_key_hex)?;

        let message = signing_message(sender, recipient, amount);
        let digest = Sha256::digest(message.as_bytes());

        let signature = private_key
            .sign(Pkcs1v15Sign::new::<Sha256>(), &digest)
            .map_err(|e| WalletError::Crypto(format!("signing failed: {e}")))?;
        Ok(hex::encode(signature))
    }
}

fn decode_private_key(hex_str: &str) -> Result<RsaPrivateKey, WalletError> {
    let der = hex::decode(hex_str).map_err(|_| WalletError::Corrupt("private key is not valid hex"))?;
    RsaPrivateKey::from_pkcs1_der(&der).map_err(|_| WalletError::Corrupt("private key is not valid PKCS#1 DER"))
}

fn decode_public_key(hex_str: &str) -> Result<RsaPublicKey, WalletError> {
    let der = hex::decode(hex_str).map_err(|_| WalletError::Corrupt("public key is not valid hex"))?;
    RsaPublicKey::from_pkcs1_der(&der).map_err(|_| WalletError::Corrupt("public key is not valid PKCS#1 DER"))
}

/// Standalone signature verifier: checks `tx.signature` against `tx.sender`
/// interpreted as a hex-encoded RSA public key. Reward transactions (sender
/// `MINING`) always verify since they carry no signature.
pub fn verify_transaction_signature(tx: &Transaction) -> bool {
    if tx.sender == MINING_SENTINEL {
        return true;
    }
    let public_key = match decode_public_key(&tx.sender) {
        Ok(k) => k,
        Err(_) => return false,
    };
    let signature = match hex::decode(&tx.signature) {
        Ok(s) => s,
        Err(_) => return false,
    };
    let message = signing_message(&tx.sender, &tx.recipient, tx.amount);
    let digest = Sha256::digest(message.as_bytes());
    public_key
        .verify(Pkcs1v15Sign::new::<Sha256>(), &digest, &signature)
        .is_ok()
}
