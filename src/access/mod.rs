// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Access gate for series reads.
//!
//! Callers are identified by an [`IdentityOracle`] before they reach the
//! query layer; the gate then compares the resolved identity with the owner
//! of the requested series through an [`AccessPolicy`]. The default
//! [`SelfAccessPolicy`] lets owners read only their own data. Decisions are
//! recorded by the [`AccessAuditLogger`].

pub mod audit;
mod oracle;
mod policy;

pub use audit::{AccessAuditLogger, AccessEvent, AccessOperation, AuditSeverity};
pub use oracle::{IdentityOracle, RequestContext, SessionTable};
pub use policy::{authorize, AccessPolicy, AuthorizationDecision, SelfAccessPolicy};
