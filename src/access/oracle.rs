// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Caller identity resolution.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::series::OwnerId;

/// Resolves the identity of whoever issued a request.
///
/// Transports own the request context; the query layer only sees the
/// resolved owner, or `None` for an anonymous or unknown caller.
#[async_trait]
pub trait IdentityOracle: Send + Sync {
    /// Per-request data the oracle inspects (headers, tokens, peer info).
    type Context: Send + Sync;

    /// Returns the caller's owner id, or `None` if it cannot be established.
    async fn resolve_caller_identity(&self, ctx: &Self::Context) -> Option<OwnerId>;
}

/// Minimal request context carrying an optional bearer token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub session_token: Option<String>,
}

impl RequestContext {
    /// Context with no credentials.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Context presenting `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            session_token: Some(token.into()),
        }
    }
}

/// In-memory session token table.
#[derive(Debug, Default)]
pub struct SessionTable {
    sessions: RwLock<HashMap<String, OwnerId>>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `token` to `owner`, replacing any previous binding.
    pub fn insert(&self, token: impl Into<String>, owner: OwnerId) {
        self.sessions.write().insert(token.into(), owner);
    }

    /// Removes a session, returning the owner it was bound to.
    pub fn revoke(&self, token: &str) -> Option<OwnerId> {
        self.sessions.write().remove(token)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[async_trait]
impl IdentityOracle for SessionTable {
    type Context = RequestContext;

    async fn resolve_caller_identity(&self, ctx: &RequestContext) -> Option<OwnerId> {
        let token = ctx.session_token.as_deref()?;
        self.sessions.read().get(token).cloned()
    }
}
