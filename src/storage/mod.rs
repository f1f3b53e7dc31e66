//! On-disk primitives shared by the vault and the session manager.
//!
//! - Permission-bracketed read/write/delete of single files (`secure_file`)
//! - Exclusive advisory lock for read-modify-write sequences (`lock`)

pub mod lock;
pub mod secure_file;

pub use lock::FileLock;
pub use secure_file::{delete_secure_file, read_secure_file, write_secure_file};
