// src/validation.rs
//
// Validation et assainissement des entrées. Fonctions pures, sans effet de
// bord: aucune mutation d'état n'est appliquée tant qu'un champ n'a pas passé
// sa validation.

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("{0}")]
    InvalidUsername(String),
    #[error("{0}")]
    InvalidEmail(String),
    #[error("{0}")]
    WeakPassword(String),
    #[error("{0}")]
    UnsafeInput(String),
    #[error("{0}")]
    InvalidUrl(String),
}

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]{3,80}$").unwrap());

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$").unwrap()
});

static SQL_INJECTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(SELECT|INSERT|UPDATE|DELETE|DROP|CREATE|ALTER|EXEC|UNION|SCRIPT)\b",
        r"(?i)(--|#|/\*|\*/)",
        r"(?i)\bOR\b.*=.*\bOR\b",
        r"(?i)\bAND\b.*=.*\bAND\b",
        r#"(?i)(';|'|")"#,
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static XSS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?is)<script[^>]*>.*?</script>",
        r"(?i)javascript:",
        r"(?i)on\w+\s*=",
        r"(?is)<iframe[^>]*>.*?</iframe>",
        r"(?is)<object[^>]*>.*?</object>",
        r"(?is)<embed[^>]*>.*?</embed>",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static HTML_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<\s*(/?)\s*([a-z][a-z0-9]*)[^>]*>").unwrap());

// Balises inline conservées quand le HTML est explicitement autorisé.
const ALLOWED_HTML_TAGS: &[&str] = &["b", "i", "u", "em", "strong", "p", "br"];

const RESERVED_USERNAMES: &[&str] = &[
    "admin",
    "administrator",
    "root",
    "system",
    "api",
    "www",
    "mail",
    "ftp",
    "test",
    "guest",
    "anonymous",
    "null",
    "undefined",
];

const COMMON_PASSWORD_PATTERNS: &[&str] = &[
    "password", "123456", "qwerty", "abc123", "letmein", "welcome", "monkey", "dragon", "master",
    "shadow", "superman", "michael",
];

const PASSWORD_SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

const LOCALHOST_DENYLIST: &[&str] = &["localhost", "127.0.0.1", "0.0.0.0", "::1"];

/// Assainit une chaîne générique: caractères de contrôle retirés (sauf
/// tab/newline/retour chariot), motifs SQL/XSS rejetés, puis échappement
/// HTML — ou réduction à la liste blanche de balises si `allow_html`.
pub fn sanitize_string(
    value: &str,
    max_length: usize,
    allow_html: bool,
) -> Result<String, ValidationError> {
    if value.len() > max_length {
        return Err(ValidationError::UnsafeInput(format!(
            "Input exceeds maximum length of {max_length}"
        )));
    }

    let cleaned: String = value
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect();

    if SQL_INJECTION_PATTERNS.iter().any(|p| p.is_match(&cleaned)) {
        return Err(ValidationError::UnsafeInput(
            "Potentially dangerous SQL pattern detected".to_string(),
        ));
    }

    if XSS_PATTERNS.iter().any(|p| p.is_match(&cleaned)) {
        return Err(ValidationError::UnsafeInput(
            "Potentially dangerous XSS pattern detected".to_string(),
        ));
    }

    let sanitized = if allow_html {
        HTML_TAG_RE
            .replace_all(&cleaned, |caps: &regex::Captures| {
                let closing = &caps[1];
                let tag = caps[2].to_lowercase();
                if ALLOWED_HTML_TAGS.contains(&tag.as_str()) {
                    format!("<{closing}{tag}>")
                } else {
                    String::new()
                }
            })
            .into_owned()
    } else {
        html_escape::encode_safe(&cleaned).into_owned()
    };

    Ok(sanitized.trim().to_string())
}

/// Username: 3–80 caractères `[A-Za-z0-9_]`, hors liste de noms réservés.
pub fn validate_username(username: &str) -> Result<String, ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::InvalidUsername(
            "Username is required".to_string(),
        ));
    }

    let username = sanitize_string(username, 80, false)
        .map_err(|e| ValidationError::InvalidUsername(e.to_string()))?;

    if !USERNAME_RE.is_match(&username) {
        return Err(ValidationError::InvalidUsername(
            "Username must be 3-80 characters long and contain only letters, numbers, and underscores"
                .to_string(),
        ));
    }

    if RESERVED_USERNAMES.contains(&username.to_lowercase().as_str()) {
        return Err(ValidationError::InvalidUsername(
            "Username is reserved and cannot be used".to_string(),
        ));
    }

    Ok(username)
}

/// Email: syntaxe RFC, puis normalisation (domaine en minuscules).
pub fn validate_email(email: &str) -> Result<String, ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "Email is required".to_string(),
        ));
    }

    let email =
        sanitize_string(email, 254, false).map_err(|e| ValidationError::InvalidEmail(e.to_string()))?;

    if !EMAIL_RE.is_match(&email) {
        return Err(ValidationError::InvalidEmail(
            "Invalid email address".to_string(),
        ));
    }

    // Normalisation: la partie domaine est insensible à la casse.
    let normalized = match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email,
    };

    Ok(normalized)
}

/// Force du mot de passe. Jamais re-validé au login: seule l'inscription et
/// le changement de mot de passe passent par ici.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::WeakPassword(
            "Password is required".to_string(),
        ));
    }

    if password.len() < 12 {
        return Err(ValidationError::WeakPassword(
            "Password must be at least 12 characters long".to_string(),
        ));
    }

    if password.len() > 128 {
        return Err(ValidationError::WeakPassword(
            "Password must not exceed 128 characters".to_string(),
        ));
    }

    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(ValidationError::WeakPassword(
            "Password must contain at least one lowercase letter".to_string(),
        ));
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::WeakPassword(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::WeakPassword(
            "Password must contain at least one number".to_string(),
        ));
    }

    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        return Err(ValidationError::WeakPassword(
            "Password must contain at least one special character".to_string(),
        ));
    }

    let lowered = password.to_lowercase();
    if COMMON_PASSWORD_PATTERNS
        .iter()
        .any(|pattern| lowered.contains(pattern))
    {
        return Err(ValidationError::WeakPassword(
            "Password contains common patterns and is not secure".to_string(),
        ));
    }

    // Le crate regex ne supporte pas les backreferences: détection manuelle
    // d'un même caractère répété 4 fois ou plus d'affilée.
    let mut run = 0u32;
    let mut previous = None;
    for c in password.chars() {
        if previous == Some(c) {
            run += 1;
            if run >= 4 {
                return Err(ValidationError::WeakPassword(
                    "Password contains too many repeated characters".to_string(),
                ));
            }
        } else {
            previous = Some(c);
            run = 1;
        }
    }

    Ok(())
}

/// URL: schéma autorisé, hôte présent, et jamais une adresse
/// privée/loopback/link-local — garde-fou SSRF pour toute fonctionnalité qui
/// irait chercher une URL fournie par l'utilisateur.
#[expect(dead_code, reason = "SSRF guard for URL-fetching features; exercised in tests")]
pub fn validate_url(url: &str, allowed_schemes: &[&str]) -> Result<String, ValidationError> {
    use std::net::IpAddr;

    if url.is_empty() {
        return Err(ValidationError::InvalidUrl("URL is required".to_string()));
    }

    if url.len() > 2048 {
        return Err(ValidationError::InvalidUrl(
            "Input exceeds maximum length of 2048".to_string(),
        ));
    }

    let parsed = url::Url::parse(url)
        .map_err(|_| ValidationError::InvalidUrl("Invalid URL format".to_string()))?;

    if !allowed_schemes.contains(&parsed.scheme()) {
        return Err(ValidationError::InvalidUrl(format!(
            "URL scheme must be one of: {}",
            allowed_schemes.join(", ")
        )));
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| ValidationError::InvalidUrl("URL must have a valid domain".to_string()))?;

    if LOCALHOST_DENYLIST.contains(&host.to_lowercase().as_str()) {
        return Err(ValidationError::InvalidUrl(
            "URLs pointing to local addresses are not allowed".to_string(),
        ));
    }

    // Littéraux IP: refuse les plages privées/loopback/link-local.
    let bare_host = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = bare_host.parse::<IpAddr>() {
        let forbidden = match ip {
            IpAddr::V4(v4) => v4.is_private() || v4.is_loopback() || v4.is_link_local(),
            IpAddr::V6(v6) => {
                v6.is_loopback()
                    || (v6.segments()[0] & 0xffc0) == 0xfe80
                    || (v6.segments()[0] & 0xfe00) == 0xfc00
            }
        };
        if forbidden {
            return Err(ValidationError::InvalidUrl(
                "URLs pointing to private/local addresses are not allowed".to_string(),
            ));
        }
    }

    Ok(url.to_string())
}
