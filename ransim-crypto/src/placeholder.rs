//! Placeholder NAS integrity and ciphering
//!
//! Stand-ins for NIA/NEA with the same inputs (COUNT, BEARER, DIRECTION,
//! 128-bit key). The tag is a truncated HMAC-SHA-256 and the cipher XORs a
//! SHA-256 counter-mode keystream. Outputs do not match 128-NIA1/2/3 or
//! 128-NEA1/2/3.

use sha2::{Digest, Sha256};

use crate::kdf::hmac_sha256;

/// MAC size in bytes (32 bits)
pub const MAC_SIZE: usize = 4;

fn nas_input_block(count: u32, bearer: u8, direction: u8) -> [u8; 6] {
    let c = count.to_be_bytes();
    [c[0], c[1], c[2], c[3], bearer & 0x1F, direction & 0x01]
}

/// Computes the placeholder 32-bit tag over `data`.
pub fn placeholder_mac(count: u32, bearer: u8, direction: u8, key: &[u8], data: &[u8]) -> [u8; MAC_SIZE] {
    let mut input = Vec::with_capacity(6 + data.len());
    input.extend_from_slice(&nas_input_block(count, bearer, direction));
    input.extend_from_slice(data);
    let full = hmac_sha256(key, &input);
    let mut mac = [0u8; MAC_SIZE];
    mac.copy_from_slice(&full[..MAC_SIZE]);
    mac
}

/// XORs `data` in place with the placeholder keystream. Applying it twice
/// with the same inputs restores the original bytes.
pub fn placeholder_cipher(count: u32, bearer: u8, direction: u8, key: &[u8], data: &mut [u8]) {
    let header = nas_input_block(count, bearer, direction);
    for (block_index, chunk) in data.chunks_mut(32).enumerate() {
        let mut hasher = Sha256::new();
        hasher.update(key);
        hasher.update(header);
        hasher.update((block_index as u32).to_be_bytes());
        let keystream = hasher.finalize();
        for (byte, k) in chunk.iter_mut().zip(keystream.iter()) {
            *byte ^= k;
        }
    }
}
