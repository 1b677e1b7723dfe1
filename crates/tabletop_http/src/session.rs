//! Actor resolution for incoming requests.
//!
//! The core only needs "authenticated actor id, or absent"; how a session is
//! established lives outside this service.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use std::collections::{BTreeMap, HashMap};
use tabletop_core::DocumentId;

/// Maps request headers to the authenticated actor.
pub trait ActorResolver: Send + Sync {
    fn resolve(&self, headers: &HeaderMap) -> Option<DocumentId>;
}

/// Static `Authorization: Bearer <token>` table.
#[derive(Debug, Clone, Default)]
pub struct TokenSessions {
    actors: HashMap<String, DocumentId>,
}

impl TokenSessions {
    pub fn new(actors: impl IntoIterator<Item = (String, DocumentId)>) -> Self {
        Self {
            actors: actors.into_iter().collect(),
        }
    }
}

impl From<&BTreeMap<String, String>> for TokenSessions {
    fn from(value: &BTreeMap<String, String>) -> Self {
        Self::new(value.iter().map(|(token, actor)| (token.clone(), actor.clone())))
    }
}

impl ActorResolver for TokenSessions {
    fn resolve(&self, headers: &HeaderMap) -> Option<DocumentId> {
        let token = bearer_token(headers)?;
        self.actors.get(token).cloned()
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
