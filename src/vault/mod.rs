//! Vault module — encrypted credential and alias storage.
//!
//! This module provides:
//! - `Credential`, `Alias` and the decrypted `VaultData` document (`model`)
//! - Partial-update descriptors and their merge rules (`patch`)
//! - The binary `salt || nonce || ciphertext` envelope (`format`)
//! - The cached-key file and `KeyState` (`keycache`)
//! - The `Vault` state machine tying it all together (`store`)

pub mod format;
pub mod keycache;
pub mod model;
pub mod patch;
pub mod store;

// Re-export the most commonly used items.
pub use format::Envelope;
pub use keycache::{KeyCache, KeyState};
pub use model::{Alias, Credential, VaultData};
pub use patch::{AliasPatch, CredentialPatch, Patch};
pub use store::{Vault, VaultState};
