use rand::{Rng, distributions::Alphanumeric};

/// 64 caractères alphanumériques ≈ 380 bits d'entropie, bien au-delà du
/// minimum exigé pour un jeton de session ou de vérification.
pub const TOKEN_LENGTH: usize = 64;

/// Jeton opaque non devinable (session, vérification d'email, reset).
pub fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}
