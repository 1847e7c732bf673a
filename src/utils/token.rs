use rand::RngCore;

/// Generate an opaque 32-character hex identity token.
///
/// Tokens are created once when a participant joins a board and never
/// change afterwards.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
