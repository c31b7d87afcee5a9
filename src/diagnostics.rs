// ABOUTME: Diagnostics accumulator for non-fatal warnings during an update session.
// ABOUTME: Collects warnings that shouldn't fail a session but should be shown to users.

use serde::Serialize;

/// Collects non-fatal warnings during a session.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

/// A non-fatal warning collected during a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// Create a lifecycle hook warning.
    pub fn hook_failed(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::HookFailed,
            message: message.into(),
        }
    }

    /// Create an image cleanup warning.
    pub fn image_cleanup(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ImageCleanup,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A lifecycle hook failed to run, exited nonzero, or timed out.
    HookFailed,
    /// An old image could not be removed after its containers were replaced.
    ImageCleanup,
}
