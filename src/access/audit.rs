// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Audit logging for series access decisions.
//!
//! Every query that reaches the access gate produces one event on the
//! `audit` tracing target: granted reads at `INFO`, denials at `WARN`,
//! failed reads at `ERROR`.
//!
//! # Example
//!
//! ```rust,no_run
//! use minutestore::access::{AccessAuditLogger, AccessEvent, AccessOperation};
//!
//! let logger = AccessAuditLogger::new("minutestore-query");
//! logger.log(AccessEvent::new(AccessOperation::ReadDenied, "u1").with_principal("u2"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use tracing::{error, info, warn};

use crate::series::OwnerId;

/// What happened to a series read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOperation {
    ReadPermitted,
    ReadDenied,
    ReadFailed,
}

impl AccessOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessOperation::ReadPermitted => "read_permitted",
            AccessOperation::ReadDenied => "read_denied",
            AccessOperation::ReadFailed => "read_failed",
        }
    }

    pub fn severity(&self) -> AuditSeverity {
        match self {
            AccessOperation::ReadPermitted => AuditSeverity::Info,
            AccessOperation::ReadDenied => AuditSeverity::Warning,
            AccessOperation::ReadFailed => AuditSeverity::Error,
        }
    }
}

/// Severity levels for audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AuditSeverity {
    Info,
    Warning,
    Error,
}

impl AuditSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditSeverity::Info => "INFO",
            AuditSeverity::Warning => "WARN",
            AuditSeverity::Error => "ERROR",
        }
    }
}

/// One audited access attempt.
#[derive(Debug, Clone)]
pub struct AccessEvent {
    /// Process-unique, increasing id.
    pub event_id: u64,
    pub timestamp: SystemTime,
    pub operation: AccessOperation,
    /// Owner whose series was requested.
    pub owner: String,
    /// Resolved caller, `None` when the caller was not identified.
    pub principal: Option<String>,
    pub details: Option<String>,
    pub error: Option<String>,
}

impl AccessEvent {
    pub fn new(operation: AccessOperation, owner: impl Into<String>) -> Self {
        static EVENT_COUNTER: AtomicU64 = AtomicU64::new(0);

        Self {
            event_id: EVENT_COUNTER.fetch_add(1, Ordering::SeqCst),
            timestamp: SystemTime::now(),
            operation,
            owner: owner.into(),
            principal: None,
            details: None,
            error: None,
        }
    }

    pub fn with_principal(mut self, principal: impl Into<String>) -> Self {
        self.principal = Some(principal.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// An attached error always raises the event to `Error`.
    pub fn severity(&self) -> AuditSeverity {
        if self.error.is_some() {
            AuditSeverity::Error
        } else {
            self.operation.severity()
        }
    }
}

/// Emits [`AccessEvent`]s as structured `tracing` records.
#[derive(Debug, Clone)]
pub struct AccessAuditLogger {
    service_name: String,
    min_severity: AuditSeverity,
}

impl Default for AccessAuditLogger {
    fn default() -> Self {
        Self::new("minutestore")
    }
}

impl AccessAuditLogger {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            min_severity: AuditSeverity::Info,
        }
    }

    /// Drops events below `severity`.
    pub fn with_min_severity(mut self, severity: AuditSeverity) -> Self {
        self.min_severity = severity;
        self
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Returns true if an event of `severity` would be emitted.
    #[inline]
    pub fn enabled(&self, severity: AuditSeverity) -> bool {
        severity >= self.min_severity
    }

    pub fn log(&self, event: AccessEvent) {
        let severity = event.severity();
        if !self.enabled(severity) {
            return;
        }

        let timestamp = event
            .timestamp
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        match severity {
            AuditSeverity::Info => info!(
                target: "audit",
                event_id = event.event_id,
                timestamp,
                service = %self.service_name,
                operation = event.operation.as_str(),
                owner = %event.owner,
                principal = ?event.principal,
                details = ?event.details,
                "series access granted"
            ),
            AuditSeverity::Warning => warn!(
                target: "audit",
                event_id = event.event_id,
                timestamp,
                service = %self.service_name,
                operation = event.operation.as_str(),
                owner = %event.owner,
                principal = ?event.principal,
                details = ?event.details,
                "series access denied"
            ),
            AuditSeverity::Error => error!(
                target: "audit",
                event_id = event.event_id,
                timestamp,
                service = %self.service_name,
                operation = event.operation.as_str(),
                owner = %event.owner,
                principal = ?event.principal,
                details = ?event.details,
                error = ?event.error,
                severity = severity.as_str(),
                "series access failed"
            ),
        }
    }

    /// Logs the gate's verdict on a read of `owner`'s data.
    pub fn log_decision(
        &self,
        caller: Option<&OwnerId>,
        owner: &OwnerId,
        details: impl Into<String>,
        permitted: bool,
    ) {
        let operation = if permitted {
            AccessOperation::ReadPermitted
        } else {
            AccessOperation::ReadDenied
        };
        self.log(Self::event(operation, caller, owner).with_details(details));
    }

    /// Logs a permitted read that failed afterwards.
    pub fn log_failure(&self, caller: Option<&OwnerId>, owner: &OwnerId, error: impl Into<String>) {
        self.log(Self::event(AccessOperation::ReadFailed, caller, owner).with_error(error));
    }

    fn event(operation: AccessOperation, caller: Option<&OwnerId>, owner: &OwnerId) -> AccessEvent {
        let event = AccessEvent::new(operation, owner.as_str());
        match caller {
            Some(caller) => event.with_principal(caller.as_str()),
            None => event,
        }
    }
}
