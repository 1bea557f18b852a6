//! Encrypt-then-MAC object layer.
//!
//! Objects are processed in 64 KiB chunks: each chunk is XORed against a
//! fresh-counter keystream, and the ciphertext bytes are accumulated so a
//! single tag can be computed over the whole object.  Decryption reads
//! exactly the stored ciphertext length and verifies the tag after the
//! plaintext has been emitted; a mismatch is an integrity failure.

use std::io::{Read, Write};

use crate::crypto::keystream::{self, CHUNK_SIZE};
use crate::crypto::mac::{self, TAG_SIZE};
use crate::errors::{Result, VaultError};

/// Read until `buf` is full or the reader hits EOF; returns bytes read.
fn read_full<R: Read>(input: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Encrypt `input` to `output` under `(enc_key, nonce)`.
///
/// Returns the number of ciphertext bytes written and the object tag
/// computed with `mac_key` over the full ciphertext.
pub fn encrypt_stream<R: Read, W: Write>(
    input: &mut R,
    output: &mut W,
    enc_key: &[u8],
    mac_key: &[u8],
    nonce: &[u8],
) -> Result<(u64, [u8; TAG_SIZE])> {
    let mut mac_buf = Vec::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut ks = vec![0u8; CHUNK_SIZE];

    let mut written: u64 = 0;
    let mut counter: u64 = 0;

    loop {
        let got = read_full(input, &mut buf)
            .map_err(|e| VaultError::Io(format!("encrypt: read failed: {e}")))?;
        if got == 0 {
            break;
        }

        keystream::generate(enc_key, nonce, counter, &mut ks[..got])?;
        counter += 1;

        for i in 0..got {
            buf[i] ^= ks[i];
        }

        output
            .write_all(&buf[..got])
            .map_err(|_| VaultError::Io("encrypt: write failed".into()))?;

        mac_buf.extend_from_slice(&buf[..got]);
        written += got as u64;

        if got < CHUNK_SIZE {
            break;
        }
    }

    let tag = mac::compute(mac_key, &mac_buf)?;
    Ok((written, tag))
}

/// Decrypt exactly `data_size` ciphertext bytes from `input` to `output`
/// and verify the object tag.
///
/// Plaintext is written as chunks complete; the tag check happens once
/// all ciphertext has been read.  A failed check yields `IntegrityError`.
pub fn decrypt_stream<R: Read, W: Write>(
    input: &mut R,
    output: &mut W,
    enc_key: &[u8],
    mac_key: &[u8],
    nonce: &[u8],
    data_size: u64,
    expected_tag: &[u8],
) -> Result<()> {
    let mut mac_buf = Vec::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut ks = vec![0u8; CHUNK_SIZE];

    let mut remaining = data_size;
    let mut counter: u64 = 0;

    while remaining > 0 {
        let want = (remaining as usize).min(CHUNK_SIZE);
        let got = read_full(input, &mut buf[..want])
            .map_err(|e| VaultError::Io(format!("decrypt: read failed: {e}")))?;
        if got != want {
            return Err(VaultError::Io("decrypt: read failed".into()));
        }

        mac_buf.extend_from_slice(&buf[..want]);

        keystream::generate(enc_key, nonce, counter, &mut ks[..want])?;
        counter += 1;

        for i in 0..want {
            buf[i] ^= ks[i];
        }

        output
            .write_all(&buf[..want])
            .map_err(|_| VaultError::Io("decrypt: write failed".into()))?;

        remaining -= want as u64;
    }

    if !mac::verify(mac_key, &mac_buf, expected_tag)? {
        return Err(VaultError::Integrity("integrity check failed".into()));
    }

    Ok(())
}
