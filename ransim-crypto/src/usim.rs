//! Simplified USIM model
//!
//! The authentication response and session keys come from SHA-256 over the
//! long-term credentials and the challenge:
//!
//! - `RES = SHA-256(RAND || OPc || K)[..16]`
//! - `IK  = SHA-256(K || RAND)[..16]`
//! - `CK  = SHA-256(OPc || RAND)[..16]`
//!
//! AUTN is accepted but not verified (no f1/f5). A network stub computes the
//! same values through [`derive_authentication_vector`].

use sha2::{Digest, Sha256};

/// Maximum value of the 48-bit sequence number.
pub const SQN_MAX: u64 = 0xFFFF_FFFF_FFFF;

/// Outcome of one authentication run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticationResult {
    /// Response to return to the network
    pub res: [u8; 16],
    /// Integrity key
    pub ik: [u8; 16],
    /// Ciphering key
    pub ck: [u8; 16],
}

/// Subscriber credential record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsimContext {
    imsi: String,
    key: [u8; 16],
    opc: [u8; 16],
    amf: [u8; 2],
    sqn: u64,
}

impl UsimContext {
    /// Creates a USIM. `sqn` is truncated to 48 bits.
    pub fn new(imsi: impl Into<String>, key: [u8; 16], opc: [u8; 16], amf: [u8; 2], sqn: u64) -> Self {
        Self {
            imsi: imsi.into(),
            key,
            opc,
            amf,
            sqn: sqn & SQN_MAX,
        }
    }

    /// Subscriber IMSI digits.
    pub fn imsi(&self) -> &str {
        &self.imsi
    }

    /// Authentication Management Field.
    pub fn amf(&self) -> [u8; 2] {
        self.amf
    }

    /// Current sequence number.
    pub fn sqn(&self) -> u64 {
        self.sqn
    }

    /// Runs authentication for a challenge and advances SQN.
    pub fn generate_authentication_response(&mut self, rand: &[u8; 16], _autn: &[u8]) -> AuthenticationResult {
        let result = derive_authentication_vector(&self.key, &self.opc, rand);
        self.sqn = (self.sqn + 1) & SQN_MAX;
        result
    }
}

/// Computes `(RES, IK, CK)` for the given credentials and challenge.
pub fn derive_authentication_vector(key: &[u8; 16], opc: &[u8; 16], rand: &[u8; 16]) -> AuthenticationResult {
    AuthenticationResult {
        res: sha256_prefix(&[rand, opc, key]),
        ik: sha256_prefix(&[key, rand]),
        ck: sha256_prefix(&[opc, rand]),
    }
}

fn sha256_prefix(parts: &[&[u8; 16]]) -> [u8; 16] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let digest = hasher.finalize();
    let mut out = [0u8; 16];
    out.copy_from_slice(&digest[..16]);
    out
}
