//! `OctetString`: the byte buffer every codec builds on.
//!
//! Value semantics throughout. Mutating methods take `&mut self`, so a buffer
//! can only change through its single owner; sharing goes through `clone`.

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;

/// An ordered, owned sequence of octets.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct OctetString {
    data: Vec<u8>,
}

impl OctetString {
    /// Creates a new empty `OctetString`.
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Creates an `OctetString` that takes ownership of `data`.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Creates an `OctetString` by copying a byte slice.
    pub fn from_slice(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    /// Parses a hex string. Whitespace is ignored, case is not significant.
    ///
    /// Returns `None` for odd-length or non-hex input.
    pub fn from_hex(text: &str) -> Option<Self> {
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        hex::decode(compact).ok().map(Self::from_vec)
    }

    /// Encodes `value` big-endian into exactly `width` bytes.
    ///
    /// Higher-order bytes that do not fit are discarded; a width above 8
    /// left-pads with zeros.
    pub fn from_number(value: u64, width: usize) -> Self {
        let be = value.to_be_bytes();
        let data = if width >= be.len() {
            let mut data = vec![0u8; width - be.len()];
            data.extend_from_slice(&be);
            data
        } else {
            be[be.len() - width..].to_vec()
        };
        Self { data }
    }

    /// Creates an `OctetString` from the bytes of an ASCII string.
    pub fn from_ascii(text: &str) -> Self {
        Self {
            data: text.as_bytes().to_vec(),
        }
    }

    /// Creates `len` bytes drawn from the operating system CSPRNG.
    pub fn random(len: usize) -> Self {
        let mut data = vec![0u8; len];
        OsRng.fill_bytes(&mut data);
        Self { data }
    }

    /// Creates `len` zero bytes.
    pub fn zeros(len: usize) -> Self {
        Self {
            data: vec![0u8; len],
        }
    }

    // --- Building ---

    /// Concatenates `other` at the tail.
    pub fn append(&mut self, other: impl AsRef<[u8]>) {
        self.data.extend_from_slice(other.as_ref());
    }

    /// Concatenates `other` at the head.
    pub fn prefix(&mut self, other: impl AsRef<[u8]>) {
        let head = other.as_ref();
        let mut data = Vec::with_capacity(head.len() + self.data.len());
        data.extend_from_slice(head);
        data.append(&mut self.data);
        self.data = data;
    }

    /// Zero-pads at the tail until the buffer holds at least `len` bytes.
    /// Existing content is never truncated.
    pub fn reserve(&mut self, len: usize) {
        if self.data.len() < len {
            self.data.resize(len, 0);
        }
    }

    /// Appends a single byte.
    pub fn append_octet(&mut self, value: u8) {
        self.data.push(value);
    }

    /// Appends a 16-bit value in big-endian order.
    pub fn append_u16(&mut self, value: u16) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    /// Appends the low 24 bits of `value` in big-endian order.
    pub fn append_u24(&mut self, value: u32) {
        self.data.extend_from_slice(&value.to_be_bytes()[1..]);
    }

    /// Appends a 32-bit value in big-endian order.
    pub fn append_u32(&mut self, value: u32) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    // --- Accessors ---

    /// Returns the underlying bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of bytes held.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Byte at `index`, if present.
    pub fn get(&self, index: usize) -> Option<u8> {
        self.data.get(index).copied()
    }

    /// Big-endian 16-bit value starting at `index`, if in range.
    pub fn get_u16(&self, index: usize) -> Option<u16> {
        self.window::<2>(index).map(u16::from_be_bytes)
    }

    /// Big-endian 24-bit value starting at `index`, if in range.
    pub fn get_u24(&self, index: usize) -> Option<u32> {
        let b = self.window::<3>(index)?;
        Some(u32::from_be_bytes([0, b[0], b[1], b[2]]))
    }

    /// Big-endian 32-bit value starting at `index`, if in range.
    pub fn get_u32(&self, index: usize) -> Option<u32> {
        self.window::<4>(index).map(u32::from_be_bytes)
    }

    fn window<const N: usize>(&self, index: usize) -> Option<[u8; N]> {
        let end = index.checked_add(N)?;
        self.data.get(index..end)?.try_into().ok()
    }

    /// Uppercase hex rendering.
    pub fn to_hex_string(&self) -> String {
        hex::encode_upper(&self.data)
    }

    /// Copies `len` bytes starting at `index`. Returns `None` when the range
    /// runs past the end of the buffer.
    pub fn sub_copy(&self, index: usize, len: usize) -> Option<Self> {
        let end = index.checked_add(len)?;
        self.data.get(index..end).map(Self::from_slice)
    }

    /// Consumes self and returns the underlying `Vec<u8>`.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Concatenates two buffers into a new one.
    pub fn concat(a: &OctetString, b: &OctetString) -> Self {
        let mut result = a.clone();
        result.append(b);
        result
    }

    /// XORs two buffers; the result has the length of the shorter one.
    pub fn xor(a: &OctetString, b: &OctetString) -> Self {
        Self {
            data: a.data.iter().zip(&b.data).map(|(x, y)| x ^ y).collect(),
        }
    }
}

impl fmt::Debug for OctetString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OctetString({})", self.to_hex_string())
    }
}

impl fmt::Display for OctetString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_string())
    }
}

impl From<Vec<u8>> for OctetString {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl From<&[u8]> for OctetString {
    fn from(data: &[u8]) -> Self {
        Self::from_slice(data)
    }
}

impl From<OctetString> for Vec<u8> {
    fn from(value: OctetString) -> Self {
        value.data
    }
}

impl AsRef<[u8]> for OctetString {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
