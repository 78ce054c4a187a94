//! Key derivation functions
//!
//! The generic KDF of TS 33.220 Annex B: `HMAC-SHA-256(key, FC || P0 || L0
//! || ... || Pn || Ln)`. The NAS key derivation uses the TS 33.501 A.8
//! parameters, but its input key is a surrogate for KAMF built straight from
//! CK and IK since the KAUSF/KSEAF chain is not simulated.

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// HMAC-SHA256 output size in bytes
pub const HMAC_SHA256_SIZE: usize = 32;

/// Key size for 256-bit keys
pub const KEY_256_SIZE: usize = 32;

/// Key size for 128-bit keys
pub const KEY_128_SIZE: usize = 16;

/// FC for `KNASint`/`KNASenc` derivation (TS 33.501 A.8)
pub const FC_NAS_KEYS: u8 = 0x69;

/// FC used for the KAMF surrogate; picked from the KAMF derivation (A.7).
pub const FC_KAMF: u8 = 0x6D;

/// Algorithm type distinguisher for NAS key derivation (TS 33.501 A.8)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AlgorithmTypeDistinguisher {
    /// NAS encryption algorithm
    NasEnc = 0x01,
    /// NAS integrity algorithm
    NasInt = 0x02,
}

/// Compute HMAC-SHA256
pub fn hmac_sha256(key: &[u8], input: &[u8]) -> [u8; HMAC_SHA256_SIZE] {
    let mut mac = Hmac::<Sha256>::new_from_slice(key)
        .unwrap_or_else(|_| unreachable!("HMAC-SHA256 accepts keys of any size"));
    mac.update(input);
    let mut output = [0u8; HMAC_SHA256_SIZE];
    output.copy_from_slice(&mac.finalize().into_bytes());
    output
}

/// Generic KDF: `S = FC || P0 || L0 || ...` with two-octet big-endian lengths.
pub fn calculate_kdf_key(key: &[u8], fc: u8, parameters: &[&[u8]]) -> [u8; KEY_256_SIZE] {
    let mut input = vec![fc];
    for param in parameters {
        input.extend_from_slice(param);
        input.extend_from_slice(&(param.len() as u16).to_be_bytes());
    }
    hmac_sha256(key, &input)
}

/// Surrogate KAMF: `KDF(CK || IK, FC_KAMF, SUPI, ABBA)`.
pub fn derive_kamf_surrogate(ck: &[u8], ik: &[u8], supi: &[u8], abba: &[u8]) -> [u8; KEY_256_SIZE] {
    let mut key = Vec::with_capacity(ck.len() + ik.len());
    key.extend_from_slice(ck);
    key.extend_from_slice(ik);
    calculate_kdf_key(&key, FC_KAMF, &[supi, abba])
}

fn derive_nas_key(
    kamf: &[u8; KEY_256_SIZE],
    algorithm_type: AlgorithmTypeDistinguisher,
    algorithm_id: u8,
) -> [u8; KEY_128_SIZE] {
    let output = calculate_kdf_key(kamf, FC_NAS_KEYS, &[&[algorithm_type as u8], &[algorithm_id]]);
    // Least significant 128 bits.
    let mut key = [0u8; KEY_128_SIZE];
    key.copy_from_slice(&output[KEY_128_SIZE..]);
    key
}

/// Derive `KNASenc` for the given ciphering algorithm id.
pub fn derive_knas_enc(kamf: &[u8; KEY_256_SIZE], algorithm_id: u8) -> [u8; KEY_128_SIZE] {
    derive_nas_key(kamf, AlgorithmTypeDistinguisher::NasEnc, algorithm_id)
}

/// Derive `KNASint` for the given integrity algorithm id.
pub fn derive_knas_int(kamf: &[u8; KEY_256_SIZE], algorithm_id: u8) -> [u8; KEY_128_SIZE] {
    derive_nas_key(kamf, AlgorithmTypeDistinguisher::NasInt, algorithm_id)
}
