use chirpy_types::Id;
use chirpy_types::models::Chirp;

/// The authenticated user is not the author of the chirp they are acting on.
#[derive(Debug, thiserror::Error)]
#[error("user {subject} is not the author of chirp {chirp}")]
pub struct NotAuthor {
    pub chirp: Id,
    pub subject: Id,
}

/// Exact ownership match. There are no roles and no admin override.
pub fn ensure_author(chirp: &Chirp, subject: Id) -> Result<(), NotAuthor> {
    if chirp.author_id == subject {
        Ok(())
    } else {
        Err(NotAuthor {
            chirp: chirp.id,
            subject,
        })
    }
}
