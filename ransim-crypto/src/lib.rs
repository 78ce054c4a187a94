//! Cryptographic primitives for ransim
//!
//! - Key derivation in the TS 33.220 KDF shape (HMAC-SHA-256)
//! - A simplified USIM that derives RES/IK/CK with SHA-256
//! - Placeholder NAS integrity and ciphering functions
//!
//! None of this is Milenage or NIA/NEA. Vectors produced here will not
//! verify against a real AMF; the simulator only needs both ends of its own
//! links to agree.

pub mod kdf;
pub mod placeholder;
pub mod usim;

pub use kdf::{derive_knas_enc, derive_knas_int, derive_kamf_surrogate, hmac_sha256};
pub use placeholder::{placeholder_cipher, placeholder_mac, MAC_SIZE};
pub use usim::{derive_authentication_vector, AuthenticationResult, UsimContext, SQN_MAX};
