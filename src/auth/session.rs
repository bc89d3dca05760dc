use std::{convert::Infallible, time::Duration};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{
        header::{COOKIE, SET_COOKIE},
        request::Parts,
        HeaderMap, HeaderValue,
    },
    response::{IntoResponseParts, ResponseParts},
};
use cookie::{Cookie, SameSite};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{
    config::SessionConfig,
    error::AppError,
    flash::{Flash, FlashLevel},
};

/// Pending flashes kept in the cookie; older ones are dropped first.
pub const MAX_FLASHES: usize = 5;

/// Client-held session state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionData {
    #[serde(default)]
    pub logged_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flashes: Vec<Flash>,
}

impl SessionData {
    fn is_empty(&self) -> bool {
        !self.logged_in && self.username.is_none() && self.flashes.is_empty()
    }
}

/// Signed token payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(flatten)]
    pub data: SessionData,
    pub sid: Uuid,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
}

/// Signing keys and cookie attributes, built once from [`SessionConfig`].
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    ttl: Duration,
    cookie_name: String,
    secure: bool,
}

impl SessionKeys {
    pub fn new(cfg: &SessionConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            ttl: Duration::from_secs(
                u64::try_from(cfg.ttl_minutes)
                    .unwrap_or(1)
                    .max(1)
                    .saturating_mul(60),
            ),
            cookie_name: cfg.cookie_name.clone(),
            secure: cfg.secure_cookie,
        }
    }

    pub fn sign(&self, data: &SessionData, sid: Uuid) -> Result<String, AppError> {
        let now = OffsetDateTime::now_utc();
        let exp = i64::try_from(self.ttl.as_secs())
            .ok()
            .and_then(|secs| now.checked_add(TimeDuration::seconds(secs)))
            .ok_or_else(|| AppError::Internal("session ttl out of range".into()))?;
        let claims = SessionClaims {
            data: data.clone(),
            sid,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(%sid, logged_in = data.logged_in, "session signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, AppError> {
        let mut validation = Validation::default();
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<SessionClaims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }

    fn cookie_header(&self, token: &str) -> String {
        Cookie::build((self.cookie_name.as_str(), token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .build()
            .to_string()
    }

    fn removal_header(&self) -> String {
        Cookie::build((self.cookie_name.as_str(), ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(cookie::time::Duration::ZERO)
            .build()
            .to_string()
    }

    fn read_cookie(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|c| c.name() == self.cookie_name)
            .map(|c| c.value().to_string())
    }
}

/// Per-request session, decoded from the signed cookie.
///
/// Returning it as part of a response re-signs the cookie when the state
/// changed, or removes the cookie once the state is empty.
pub struct Session {
    data: SessionData,
    sid: Uuid,
    keys: SessionKeys,
    dirty: bool,
}

impl Session {
    pub fn anonymous(keys: SessionKeys) -> Self {
        Self {
            data: SessionData::default(),
            sid: Uuid::new_v4(),
            keys,
            dirty: false,
        }
    }

    pub fn from_token(keys: SessionKeys, token: &str) -> Self {
        match keys.verify(token) {
            Ok(claims) => Self {
                data: claims.data,
                sid: claims.sid,
                keys,
                dirty: false,
            },
            Err(e) => {
                debug!(error = %e, "discarding invalid session cookie");
                let mut session = Self::anonymous(keys);
                session.dirty = true;
                session
            }
        }
    }

    pub fn login(&mut self, username: &str) {
        self.data.logged_in = true;
        self.data.username = Some(username.to_string());
        self.sid = Uuid::new_v4();
        self.dirty = true;
    }

    pub fn logout(&mut self) {
        self.data = SessionData::default();
        self.dirty = true;
    }

    pub fn is_authenticated(&self) -> bool {
        self.data.logged_in && self.data.username.is_some()
    }

    pub fn current_username(&self) -> Option<&str> {
        if self.data.logged_in {
            self.data.username.as_deref()
        } else {
            None
        }
    }

    pub fn sid(&self) -> Uuid {
        self.sid
    }

    pub fn flash(&mut self, level: FlashLevel, message: impl Into<String>) {
        let flashes = &mut self.data.flashes;
        flashes.push(Flash::new(level, message));
        if flashes.len() > MAX_FLASHES {
            let excess = flashes.len() - MAX_FLASHES;
            flashes.drain(..excess);
        }
        self.dirty = true;
    }

    pub fn take_flashes(&mut self) -> Vec<Flash> {
        if self.data.flashes.is_empty() {
            return Vec::new();
        }
        self.dirty = true;
        std::mem::take(&mut self.data.flashes)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        Ok(match keys.read_cookie(&parts.headers) {
            Some(token) => Session::from_token(keys, &token),
            None => Session::anonymous(keys),
        })
    }
}

impl IntoResponseParts for Session {
    type Error = AppError;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if !self.dirty {
            return Ok(res);
        }
        let header = if self.data.is_empty() {
            self.keys.removal_header()
        } else {
            let token = self.keys.sign(&self.data, self.sid)?;
            self.keys.cookie_header(&token)
        };
        res.headers_mut()
            .append(SET_COOKIE, HeaderValue::from_str(&header)?);
        Ok(res)
    }
}
