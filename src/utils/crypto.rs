use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};
use ring::digest::{Context, SHA256};
use ring::rand::SystemRandom;
use ring::signature::{
    EcdsaKeyPair, KeyPair as RingKeyPair, UnparsedPublicKey, ECDSA_P256_SHA256_FIXED,
    ECDSA_P256_SHA256_FIXED_SIGNING,
};
use ripemd::{Digest as RipemdDigest, Ripemd160};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{LedgerError, Result};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Length of an affine P-256 point encoded as X || Y
pub const PUBLIC_KEY_LEN: usize = 64;
/// Length of a fixed-width ECDSA P-256 signature encoded as r || s
pub const SIGNATURE_LEN: usize = 64;

const UNCOMPRESSED_POINT_TAG: u8 = 0x04;
const COORDINATE_LEN: usize = 32;

/// Wall-clock time in nanoseconds since the Unix epoch
pub fn current_timestamp() -> Result<i64> {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| LedgerError::Crypto(format!("System time error: {e}")))?
        .as_nanos();

    if duration > i64::MAX as u128 {
        return Err(LedgerError::Crypto("Timestamp overflow".to_string()));
    }

    Ok(duration as i64)
}

pub fn sha256_digest(data: &[u8]) -> [u8; 32] {
    let mut context = Context::new(&SHA256);
    context.update(data);
    let digest = context.finish();
    let mut out = [0u8; 32];
    out.copy_from_slice(digest.as_ref());
    out
}

pub fn ripemd160_digest(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    let mut out = [0u8; 20];
    out.copy_from_slice(hasher.finalize().as_slice());
    out
}

pub fn base58_encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

pub fn base58_decode(data: &str) -> Result<Vec<u8>> {
    bs58::decode(data)
        .into_vec()
        .map_err(|e| LedgerError::Wallet(format!("Invalid base58 encoding: {e}")))
}

/// P-256 public key as the raw affine coordinates X || Y
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; PUBLIC_KEY_LEN]);

impl PublicKey {
    /// Accepts either X || Y (64 bytes) or the SEC1 uncompressed form 0x04 || X || Y
    pub fn from_bytes(bytes: &[u8]) -> Result<PublicKey> {
        let raw = match bytes.len() {
            PUBLIC_KEY_LEN => bytes,
            n if n == PUBLIC_KEY_LEN + 1 && bytes[0] == UNCOMPRESSED_POINT_TAG => &bytes[1..],
            n => {
                return Err(LedgerError::Crypto(format!(
                    "Invalid public key length: {n} bytes"
                )))
            }
        };
        let mut key = [0u8; PUBLIC_KEY_LEN];
        key.copy_from_slice(raw);
        Ok(PublicKey(key))
    }

    pub fn from_hex(encoded: &str) -> Result<PublicKey> {
        let bytes = HEXLOWER_PERMISSIVE
            .decode(encoded.as_bytes())
            .map_err(|e| LedgerError::Crypto(format!("Invalid public key hex: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// 128 lowercase hex characters, X then Y, each zero-padded to 32 bytes
    pub fn to_hex(&self) -> String {
        HEXLOWER.encode(&self.0)
    }

    pub fn x(&self) -> &[u8] {
        &self.0[..COORDINATE_LEN]
    }

    pub fn y(&self) -> &[u8] {
        &self.0[COORDINATE_LEN..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    fn to_uncompressed(&self) -> Vec<u8> {
        let mut point = Vec::with_capacity(PUBLIC_KEY_LEN + 1);
        point.push(UNCOMPRESSED_POINT_TAG);
        point.extend_from_slice(&self.0);
        point
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

/// ECDSA signature as the scalar pair r || s
#[derive(Clone, PartialEq, Eq)]
pub struct Signature([u8; SIGNATURE_LEN]);

impl Signature {
    pub fn from_bytes(bytes: &[u8]) -> Result<Signature> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(LedgerError::Crypto(format!(
                "Invalid signature length: {} bytes",
                bytes.len()
            )));
        }
        let mut sig = [0u8; SIGNATURE_LEN];
        sig.copy_from_slice(bytes);
        Ok(Signature(sig))
    }

    pub fn from_hex(encoded: &str) -> Result<Signature> {
        let bytes = HEXLOWER_PERMISSIVE
            .decode(encoded.as_bytes())
            .map_err(|e| LedgerError::Crypto(format!("Invalid signature hex: {e}")))?;
        Self::from_bytes(&bytes)
    }

    pub fn to_hex(&self) -> String {
        HEXLOWER.encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

/// PKCS#8 document holding the private scalar; wiped from memory on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop, bincode::Encode, bincode::Decode)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }

    pub fn to_hex(&self) -> String {
        HEXLOWER.encode(&self.0)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// A P-256 key pair. Immutable once generated.
#[derive(Clone, Debug)]
pub struct KeyPair {
    secret: SecretKey,
    public_key: PublicKey,
}

impl KeyPair {
    pub fn generate() -> Result<KeyPair> {
        let rng = SystemRandom::new();
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, &rng)
            .map_err(|e| LedgerError::Crypto(format!("Failed to generate ECDSA key pair: {e}")))?;
        Self::from_pkcs8(pkcs8.as_ref())
    }

    pub fn from_pkcs8(pkcs8: &[u8]) -> Result<KeyPair> {
        let key_pair = Self::load(pkcs8)?;
        let public_key = PublicKey::from_bytes(key_pair.public_key().as_ref())?;
        Ok(KeyPair {
            secret: SecretKey(pkcs8.to_vec()),
            public_key,
        })
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }

    /// Signs SHA-256(`message`). The digest step happens inside the signer, so
    /// passing a record's canonical bytes signs exactly that record's digest.
    pub fn sign(&self, message: &[u8]) -> Result<Signature> {
        let rng = SystemRandom::new();
        let key_pair = Self::load(self.secret.as_bytes())?;
        let signature = key_pair
            .sign(&rng, message)
            .map_err(|e| LedgerError::Crypto(format!("Failed to sign message: {e}")))?;
        Signature::from_bytes(signature.as_ref())
    }

    fn load(pkcs8: &[u8]) -> Result<EcdsaKeyPair> {
        let rng = SystemRandom::new();
        EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8, &rng)
            .map_err(|e| LedgerError::Crypto(format!("Failed to create key pair from PKCS8: {e}")))
    }
}

pub fn generate_keypair() -> Result<KeyPair> {
    KeyPair::generate()
}

pub fn sign(key_pair: &KeyPair, message: &[u8]) -> Result<Signature> {
    key_pair.sign(message)
}

/// Verifies an ECDSA P-256 signature over SHA-256(`message`).
/// Any mismatch is `false`, never an error.
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
    let point = public_key.to_uncompressed();
    let peer_public_key = UnparsedPublicKey::new(&ECDSA_P256_SHA256_FIXED, point.as_slice());
    peer_public_key.verify(message, signature.as_bytes()).is_ok()
}
