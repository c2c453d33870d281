// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Authorization decisions.

use crate::series::OwnerId;

/// Outcome of an access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationDecision {
    /// The caller may read the series of the contained owner.
    Permitted(OwnerId),
    /// The caller may not read the requested series.
    Denied,
}

impl AuthorizationDecision {
    /// Returns true if access was granted.
    #[inline]
    pub fn is_permitted(&self) -> bool {
        matches!(self, AuthorizationDecision::Permitted(_))
    }
}

/// Decides whether a caller may read another owner's series.
///
/// Implementations must be pure: no I/O and no side effects, so the check
/// can run before anything touches the store.
pub trait AccessPolicy: Send + Sync {
    /// Checks `caller` against `requested`. An unidentified caller is `None`.
    fn authorize(&self, caller: Option<&OwnerId>, requested: &OwnerId) -> AuthorizationDecision;
}

/// Owners may read only their own series.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelfAccessPolicy;

impl AccessPolicy for SelfAccessPolicy {
    fn authorize(&self, caller: Option<&OwnerId>, requested: &OwnerId) -> AuthorizationDecision {
        authorize(caller, requested)
    }
}

/// Self-access rule: permitted iff the caller is known, non-empty and equal
/// to the requested owner.
pub fn authorize(caller: Option<&OwnerId>, requested: &OwnerId) -> AuthorizationDecision {
    match caller {
        Some(caller) if !caller.is_empty() && caller == requested => {
            AuthorizationDecision::Permitted(requested.clone())
        }
        _ => AuthorizationDecision::Denied,
    }
}
