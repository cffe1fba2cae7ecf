use rand::RngCore;

/// Bytes of entropy in a refresh token. Hex encoding doubles the length.
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate an opaque refresh token: 256 random bits, hex encoded.
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
