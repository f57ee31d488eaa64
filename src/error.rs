//! Error types used by the lotkeeper runtime and its modules.
//!
//! This module defines two main error enums:
//!
//! - [`RuntimeError`] — errors raised by the orchestration layer itself
//!   (session resolution, module registration, transport construction).
//! - [`ModuleError`] — errors raised inside event handlers and polling
//!   modules (HTTP failures, unparseable pages, handler panics).
//!
//! Both types provide `as_label` for stable snake_case identifiers in
//! logs and metrics.

use thiserror::Error;

/// # Errors produced by the lotkeeper runtime.
///
/// These represent failures in the orchestration system itself, such as
/// an invalid session at startup or a duplicate module registration.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The session token did not resolve to a valid account.
    ///
    /// This is the one fatal startup error: no module is ever started.
    #[error("invalid or expired session: {reason}")]
    InvalidSession {
        /// Why the session was rejected.
        reason: String,
    },

    /// A module with the same name is already registered.
    #[error("module {name:?} is already registered")]
    ModuleExists {
        /// The conflicting module name.
        name: String,
    },

    /// No module with this name is registered.
    #[error("module {name:?} is not registered")]
    ModuleNotFound {
        /// The requested module name.
        name: String,
    },

    /// The scheduler has been stopped; it never restarts.
    #[error("scheduler is stopped")]
    SchedulerStopped,

    /// The HTTP client could not be constructed (bad proxy URL, TLS init).
    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// OS signal listener registration failed.
    #[error("signal handler failed: {0}")]
    Signal(#[from] std::io::Error),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::InvalidSession { .. } => "runtime_invalid_session",
            RuntimeError::ModuleExists { .. } => "runtime_module_exists",
            RuntimeError::ModuleNotFound { .. } => "runtime_module_not_found",
            RuntimeError::SchedulerStopped => "runtime_scheduler_stopped",
            RuntimeError::HttpClient(_) => "runtime_http_client",
            RuntimeError::Signal(_) => "runtime_signal",
        }
    }
}

/// # Errors produced by event handlers and polling modules.
///
/// These are always isolated at the narrowest boundary (per-handler,
/// per-module) and routed to a logging sink; they never escape into the
/// scheduling control flow.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ModuleError {
    /// The HTTP request itself failed (connect, timeout, TLS).
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote answered with an unexpected status or body.
    #[error("unexpected response ({status}): {message}")]
    Response {
        /// HTTP status code.
        status: u16,
        /// Short description of what was wrong.
        message: String,
    },

    /// A scraped page did not contain the expected structure.
    #[error("failed to parse page: {context}")]
    Parse {
        /// What was being extracted when parsing failed.
        context: String,
    },

    /// Generic module or handler failure.
    #[error("{error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// A handler or module body panicked; the panic was caught and isolated.
    #[error("{name} panicked: {info}")]
    Panicked {
        /// Name of the handler/module that panicked.
        name: String,
        /// Extracted panic payload, if printable.
        info: String,
    },
}

impl ModuleError {
    /// Creates a generic failure from any displayable message.
    pub fn failed(error: impl Into<String>) -> Self {
        ModuleError::Failed {
            error: error.into(),
        }
    }

    /// Creates a parse failure with the given context.
    pub fn parse(context: impl Into<String>) -> Self {
        ModuleError::Parse {
            context: context.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ModuleError::Http(_) => "module_http",
            ModuleError::Response { .. } => "module_response",
            ModuleError::Parse { .. } => "module_parse",
            ModuleError::Failed { .. } => "module_failed",
            ModuleError::Panicked { .. } => "module_panicked",
        }
    }
}

/// Renders a caught panic payload as a printable message.
pub(crate) fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        let err = RuntimeError::InvalidSession {
            reason: "empty token".into(),
        };
        assert_eq!(err.as_label(), "runtime_invalid_session");

        let err = ModuleError::failed("boom");
        assert_eq!(err.as_label(), "module_failed");
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_panic_message_downcasts() {
        assert_eq!(panic_message(Box::new("static")), "static");
        assert_eq!(panic_message(Box::new(String::from("owned"))), "owned");
        assert_eq!(panic_message(Box::new(42_u8)), "unknown panic payload");
    }
}
