use rand::{Rng, rng};

const RUNES_ALPHA: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const RUNES_ALPHA_NUMBER: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const RUNES_ICE_CHAR: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789+/";

/// ICE ufrag length used for generated local credentials
pub const LEN_UFRAG: usize = 16;
/// ICE pwd length used for generated local credentials
pub const LEN_PWD: usize = 32;

/// math_rand_alpha generates a mathematical random alphabet sequence of the requested length.
pub fn math_rand_alpha(n: usize) -> String {
    generate_crypto_random_string(n, RUNES_ALPHA)
}

/// math_rand_alpha_number generates a mathematical random alphabet and number sequence of the requested length.
pub fn math_rand_alpha_number(n: usize) -> String {
    generate_crypto_random_string(n, RUNES_ALPHA_NUMBER)
}

/// generate_ice_ufrag returns a random ufrag made of ice-char (RFC 5245 15.1)
pub fn generate_ice_ufrag() -> String {
    generate_crypto_random_string(LEN_UFRAG, RUNES_ICE_CHAR)
}

/// generate_ice_pwd returns a random password made of ice-char (RFC 5245 15.1)
pub fn generate_ice_pwd() -> String {
    generate_crypto_random_string(LEN_PWD, RUNES_ICE_CHAR)
}

pub fn generate_crypto_random_string(n: usize, runes: &[u8]) -> String {
    let mut rng = rng();

    let rand_string: String = (0..n)
        .map(|_| {
            let idx = rng.random_range(0..runes.len());
            runes[idx] as char
        })
        .collect();

    rand_string
}
