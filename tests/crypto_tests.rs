//! Integration tests for the key derivation and AEAD layers.

use lockbox::crypto::{
    decrypt, derive_key, encrypt, generate_nonce, generate_salt, KEY_LEN, NONCE_LEN, SALT_LEN,
    TAG_LEN,
};
use lockbox::errors::LockboxError;

#[test]
fn derive_is_deterministic_per_salt() {
    let salt = [7u8; SALT_LEN];
    let a = derive_key(b"password123", &salt).unwrap();
    let b = derive_key(b"password123", &salt).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.as_bytes().len(), KEY_LEN);
}

#[test]
fn different_salt_gives_different_key() {
    let a = derive_key(b"password123", &[1u8; SALT_LEN]).unwrap();
    let b = derive_key(b"password123", &[2u8; SALT_LEN]).unwrap();
    assert_ne!(a, b);
}

#[test]
fn different_password_gives_different_key() {
    let salt = generate_salt();
    let a = derive_key(b"password123", &salt).unwrap();
    let b = derive_key(b"password124", &salt).unwrap();
    assert_ne!(a, b);
}

#[test]
fn short_salt_is_rejected() {
    assert!(derive_key(b"pw", &[0u8; 8]).is_err());
}

#[test]
fn encrypt_then_decrypt() {
    let key = derive_key(b"password123", &generate_salt()).unwrap();
    let nonce = generate_nonce();
    let ct = encrypt(&key, &nonce, b"{\"credentials\":{}}").unwrap();

    assert_eq!(ct.len(), 18 + TAG_LEN);
    assert_eq!(decrypt(&key, &nonce, &ct).unwrap(), b"{\"credentials\":{}}");
}

#[test]
fn wrong_key_fails_authentication() {
    let salt = generate_salt();
    let key = derive_key(b"password123", &salt).unwrap();
    let other = derive_key(b"wrong", &salt).unwrap();
    let nonce = generate_nonce();
    let ct = encrypt(&key, &nonce, b"secret").unwrap();

    assert!(matches!(
        decrypt(&other, &nonce, &ct),
        Err(LockboxError::AuthenticationFailed)
    ));
}

#[test]
fn flipped_bit_fails_authentication() {
    let key = derive_key(b"password123", &generate_salt()).unwrap();
    let nonce = generate_nonce();
    let mut ct = encrypt(&key, &nonce, b"secret").unwrap();
    ct[0] ^= 0x01;

    assert!(matches!(
        decrypt(&key, &nonce, &ct),
        Err(LockboxError::AuthenticationFailed)
    ));
}

#[test]
fn nonces_and_salts_are_fresh() {
    assert_ne!(generate_nonce(), generate_nonce());
    assert_ne!(generate_salt(), generate_salt());
    assert_eq!(generate_nonce().len(), NONCE_LEN);
}
