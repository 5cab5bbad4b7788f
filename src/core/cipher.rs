//! AES-256-CBC with PKCS#7 padding.
//!
//! In [`IvMode::KeyPrefix`] the IV is the first block of the key, so the
//! output is a pure function of key and plaintext. This matches the format
//! existing consumers decrypt, and it leaks equality of rosters encrypted
//! under the same key. [`IvMode::Random`] draws a fresh IV and prepends it to
//! the ciphertext; consumers must know which mode was used.

use crate::constants;
use crate::core::key::EncryptionKey;
use crate::error::{ProvisionError, Result};
use crate::models::config::IvMode;
use aes::Aes256;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Encrypt `plaintext`. In random mode the result is `iv || ciphertext`.
pub fn encrypt(key: &EncryptionKey, plaintext: &[u8], mode: IvMode) -> Result<Vec<u8>> {
    match mode {
        IvMode::KeyPrefix => encrypt_with_iv(key, key.iv_prefix(), plaintext),
        IvMode::Random => {
            let mut iv = [0u8; constants::BLOCK_SIZE];
            OsRng.fill_bytes(&mut iv);
            let ciphertext = encrypt_with_iv(key, &iv, plaintext)?;
            let mut out = Vec::with_capacity(iv.len() + ciphertext.len());
            out.extend_from_slice(&iv);
            out.extend_from_slice(&ciphertext);
            Ok(out)
        }
    }
}

/// Reverse [`encrypt`]. Fails on a wrong key, wrong mode, or corrupt data.
pub fn decrypt(key: &EncryptionKey, data: &[u8], mode: IvMode) -> Result<Zeroizing<Vec<u8>>> {
    match mode {
        IvMode::KeyPrefix => decrypt_with_iv(key, key.iv_prefix(), data),
        IvMode::Random => {
            if data.len() < constants::BLOCK_SIZE * 2 {
                return Err(ProvisionError::ArtifactTruncated(data.len()));
            }
            let (iv, ciphertext) = data.split_at(constants::BLOCK_SIZE);
            decrypt_with_iv(key, iv, ciphertext)
        }
    }
}

fn encrypt_with_iv(key: &EncryptionKey, iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let enc = Aes256CbcEnc::new_from_slices(key.as_bytes(), iv).map_err(|_| {
        ProvisionError::KeyLength {
            expected: constants::KEY_LEN,
            actual: key.as_bytes().len(),
        }
    })?;
    Ok(enc.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

fn decrypt_with_iv(
    key: &EncryptionKey,
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    if ciphertext.is_empty() || ciphertext.len() % constants::BLOCK_SIZE != 0 {
        return Err(ProvisionError::ArtifactTruncated(ciphertext.len()));
    }
    let dec = Aes256CbcDec::new_from_slices(key.as_bytes(), iv).map_err(|_| {
        ProvisionError::KeyLength {
            expected: constants::KEY_LEN,
            actual: key.as_bytes().len(),
        }
    })?;
    dec.decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| ProvisionError::Unpad)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> EncryptionKey {
        EncryptionKey::from_bytes((0..32).map(|i| byte.wrapping_add(i)).collect()).unwrap()
    }

    #[test]
    fn test_key_prefix_is_deterministic() {
        let k = key(1);
        let a = encrypt(&k, b"[{\"username\":\"alice\"}]", IvMode::KeyPrefix).unwrap();
        let b = encrypt(&k, b"[{\"username\":\"alice\"}]", IvMode::KeyPrefix).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_padding_rounds_up_to_block() {
        let k = key(1);
        assert_eq!(encrypt(&k, b"", IvMode::KeyPrefix).unwrap().len(), 16);
        assert_eq!(encrypt(&k, &[0u8; 15], IvMode::KeyPrefix).unwrap().len(), 16);
        // a full block still gets a whole block of padding
        assert_eq!(encrypt(&k, &[0u8; 16], IvMode::KeyPrefix).unwrap().len(), 32);
    }

    #[test]
    fn test_key_prefix_matches_explicit_iv() {
        let k = key(9);
        let iv = k.as_bytes()[..16].to_vec();
        let expected = encrypt_with_iv(&k, &iv, b"roster").unwrap();
        assert_eq!(encrypt(&k, b"roster", IvMode::KeyPrefix).unwrap(), expected);
    }

    #[test]
    fn test_nist_sp800_38a_first_block() {
        // F.2.5 CBC-AES256.Encrypt, block #1. PKCS#7 adds a second block,
        // which does not affect the first.
        let k = EncryptionKey::from_bytes(
            hex::decode("603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4").unwrap(),
        )
        .unwrap();
        let iv = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let pt = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();
        let ct = encrypt_with_iv(&k, &iv, &pt).unwrap();
        assert_eq!(ct.len(), 32);
        assert_eq!(ct[..16], hex::decode("f58c4c04d6e5f1ba779eabfb5f7bfbd6").unwrap()[..]);
    }

    #[test]
    fn test_decrypt_reverses_encrypt() {
        let k = key(3);
        for mode in [IvMode::KeyPrefix, IvMode::Random] {
            let ct = encrypt(&k, b"hello roster", mode).unwrap();
            assert_eq!(&decrypt(&k, &ct, mode).unwrap()[..], b"hello roster");
        }
    }

    #[test]
    fn test_random_mode_prepends_fresh_iv() {
        let k = key(5);
        let a = encrypt(&k, b"same", IvMode::Random).unwrap();
        let b = encrypt(&k, b"same", IvMode::Random).unwrap();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }

    #[test]
    fn test_decrypt_with_wrong_key_fails() {
        let ct = encrypt(&key(1), b"some roster payload", IvMode::KeyPrefix).unwrap();
        // Wrong key almost surely yields invalid padding; never the plaintext.
        match decrypt(&key(2), &ct, IvMode::KeyPrefix) {
            Err(ProvisionError::Unpad) => {}
            Ok(pt) => assert_ne!(&pt[..], b"some roster payload"),
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decrypt_rejects_partial_block() {
        let err = decrypt(&key(1), &[0u8; 15], IvMode::KeyPrefix).unwrap_err();
        assert!(matches!(err, ProvisionError::ArtifactTruncated(15)));
        let err = decrypt(&key(1), &[0u8; 16], IvMode::Random).unwrap_err();
        assert!(matches!(err, ProvisionError::ArtifactTruncated(16)));
    }
}
