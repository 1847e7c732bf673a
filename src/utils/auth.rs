/// Compare two secrets (board password, master password, API key) in
/// constant time so the comparison leaks nothing about where they diverge.
pub fn verify_secret(provided: &str, expected: &str) -> bool {
    provided.as_bytes().len() == expected.as_bytes().len()
        && provided
            .as_bytes()
            .iter()
            .zip(expected.as_bytes().iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
