//! Structural checks applied to request payloads before they reach the store.

use std::collections::BTreeMap;

/// Field name -> human readable problem. Empty means valid.
pub type Problems = BTreeMap<String, String>;

pub const MAX_CHIRP_CHARS: usize = 140;
pub const MAX_EMAIL_CHARS: usize = 100;

const PROFANE_WORDS: &[&str] = &["kerfuffle", "sharbert", "fornax"];
const MASK: &str = "****";

/// Check a chirp body and return it with profanity masked.
pub fn clean_chirp_body(body: &str) -> Result<String, Problems> {
    let mut problems = Problems::new();
    if body.trim().is_empty() {
        problems.insert("body".into(), "chirp body is empty".into());
    }
    if body.chars().count() > MAX_CHIRP_CHARS {
        problems.insert(
            "body".into(),
            format!("chirp can only be up to and including {MAX_CHIRP_CHARS} chars"),
        );
    }
    if !problems.is_empty() {
        return Err(problems);
    }

    Ok(mask_profanity(body))
}

/// Replace every case-insensitive occurrence of a profane word with `****`.
/// Substrings inside longer words are masked too.
pub fn mask_profanity(body: &str) -> String {
    let mut out = body.to_string();
    for word in PROFANE_WORDS {
        // ASCII lowercasing keeps byte offsets identical to `out`.
        let lowered = out.to_ascii_lowercase();
        let mut masked = String::with_capacity(out.len());
        let mut last = 0;
        for (start, _) in lowered.match_indices(word) {
            masked.push_str(&out[last..start]);
            masked.push_str(MASK);
            last = start + word.len();
        }
        masked.push_str(&out[last..]);
        out = masked;
    }
    out
}

pub fn validate_email(email: &str) -> Problems {
    let mut problems = Problems::new();
    if email.trim().is_empty() {
        problems.insert("email".into(), "no email set".into());
    } else if email.chars().count() > MAX_EMAIL_CHARS {
        problems.insert(
            "email".into(),
            format!("email can only be up to and including {MAX_EMAIL_CHARS} chars"),
        );
    }
    problems
}

/// Checks for a new account. The password must be present; its length limit
/// is enforced by the credential engine.
pub fn validate_new_user(email: &str, password: &str) -> Problems {
    let mut problems = validate_email(email);
    if password.is_empty() {
        problems.insert("password".into(), "no password set".into());
    }
    problems
}
