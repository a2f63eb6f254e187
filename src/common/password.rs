// src/common/password.rs

use rand::{rngs::OsRng, Rng};

pub const PASSWORD_LENGTH: usize = 32;

// Letras, dígitos e um único caractere especial seguro para connection strings
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_";

/// Senha aleatória usando o CSPRNG do sistema operacional.
pub fn generate_password() -> String {
    (0..PASSWORD_LENGTH)
        .map(|_| ALPHABET[OsRng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}
