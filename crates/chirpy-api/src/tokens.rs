use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use chirpy_types::Id;
use chirpy_types::api::Claims;

/// `iss` claim on every access token.
pub const ISSUER: &str = "chirpy";

/// Environment variable holding the HS256 secret.
pub const SECRET_ENV: &str = "CHIRPY_JWT_SECRET";

const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token signing secret is not configured")]
    MissingSecret,
    #[error("'Authorization' header not set")]
    MissingHeader,
    #[error("bad 'Authorization' header format")]
    MalformedHeader,
    #[error("'Authorization' header is not a '{0}' credential")]
    WrongScheme(&'static str),
    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
    #[error("token subject is not a user id")]
    BadSubject,
}

/// Where the signing secret comes from.
#[derive(Debug, Clone)]
pub enum SecretSource {
    /// Read the named variable on every call, so a rotated secret takes
    /// effect without a restart.
    Env(String),
    Static(String),
}

impl SecretSource {
    fn resolve(&self) -> Result<String, TokenError> {
        let secret = match self {
            Self::Env(var) => std::env::var(var).unwrap_or_default(),
            Self::Static(secret) => secret.clone(),
        };
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }
        Ok(secret)
    }
}

/// Issues and validates HS256 access tokens.
#[derive(Debug, Clone)]
pub struct TokenService {
    secret: SecretSource,
}

impl Default for TokenService {
    fn default() -> Self {
        Self::from_env(SECRET_ENV)
    }
}

impl TokenService {
    pub fn from_env(var: impl Into<String>) -> Self {
        Self {
            secret: SecretSource::Env(var.into()),
        }
    }

    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretSource::Static(secret.into()),
        }
    }

    pub fn issue(&self, subject: Id, ttl_seconds: i64) -> Result<String, TokenError> {
        let secret = self.secret.resolve()?;
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            iss: ISSUER.to_string(),
            iat: now,
            exp: now.saturating_add(ttl_seconds),
            sub: subject.to_string(),
        };

        let token = encode(
            &Header::new(SIGNING_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?;
        Ok(token)
    }

    /// Return the subject id of a token that is correctly signed with HS256,
    /// issued by [`ISSUER`] and not yet expired. Whatever algorithm the token
    /// header names, only HS256 is accepted.
    pub fn validate(&self, token: &str) -> Result<Id, TokenError> {
        let secret = self.secret.resolve()?;

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = 0;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )?;

        data.claims.sub.parse().map_err(|_| TokenError::BadSubject)
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
pub fn parse_bearer(header: Option<&str>) -> Result<&str, TokenError> {
    parse_scheme(header, "Bearer")
}

/// Extract the key from `Authorization: ApiKey <key>`.
pub fn parse_api_key(header: Option<&str>) -> Result<&str, TokenError> {
    parse_scheme(header, "ApiKey")
}

fn parse_scheme<'a>(header: Option<&'a str>, scheme: &'static str) -> Result<&'a str, TokenError> {
    let header = header
        .filter(|h| !h.trim().is_empty())
        .ok_or(TokenError::MissingHeader)?;

    let mut fields = header.split_whitespace();
    let (Some(given), Some(value), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(TokenError::MalformedHeader);
    };

    if !given.eq_ignore_ascii_case(scheme) {
        return Err(TokenError::WrongScheme(scheme));
    }
    Ok(value)
}
