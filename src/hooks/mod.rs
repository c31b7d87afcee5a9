// ABOUTME: Label-driven lifecycle hooks around a container replacement.
// ABOUTME: Runs pre-update and post-update commands inside the container through exec.

use std::time::Duration;

use crate::config::HooksConfig;
use crate::container::{Container, POST_UPDATE_LABEL, PRE_UPDATE_LABEL};
use crate::diagnostics::{Diagnostics, Warning};
use crate::runtime::FullRuntime;
use crate::update::{ExecOutcome, UpdateClient};

/// Hook execution points in the replacement lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
    /// In the old container, before it is stopped.
    PreUpdate,
    /// In the new container, after it is started.
    PostUpdate,
}

impl HookPoint {
    pub fn name(&self) -> &'static str {
        match self {
            HookPoint::PreUpdate => "pre-update",
            HookPoint::PostUpdate => "post-update",
        }
    }

    /// Label the hook command is read from.
    pub fn label(&self) -> &'static str {
        match self {
            HookPoint::PreUpdate => PRE_UPDATE_LABEL,
            HookPoint::PostUpdate => POST_UPDATE_LABEL,
        }
    }

    fn command<'a>(&self, container: &'a Container) -> Option<&'a str> {
        match self {
            HookPoint::PreUpdate => container.pre_update_command(),
            HookPoint::PostUpdate => container.post_update_command(),
        }
    }
}

/// Runs hooks found on container labels. Results are advisory.
#[derive(Debug, Clone)]
pub struct HookRunner {
    enabled: bool,
    timeout: Duration,
}

impl HookRunner {
    pub fn new(enabled: bool, timeout: Duration) -> Self {
        Self { enabled, timeout }
    }

    pub fn from_config(config: &HooksConfig) -> Self {
        Self::new(config.enabled, config.timeout)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// A runner that never runs anything.
    pub fn disabled() -> Self {
        Self::new(false, Duration::ZERO)
    }

    /// Run the hook for `point` inside `container`, if it names one.
    ///
    /// Returns None if hooks are disabled or the label is absent. Failures are
    /// recorded in `diagnostics` and never abort the replacement.
    pub async fn run<R: FullRuntime>(
        &self,
        client: &UpdateClient<R>,
        point: HookPoint,
        container: &Container,
        diagnostics: &mut Diagnostics,
    ) -> Option<ExecOutcome> {
        if !self.enabled {
            return None;
        }
        let command = point.command(container)?;

        tracing::info!(container = %container.name(), hook = point.name(), "running lifecycle hook");

        match client
            .execute_command(container.id(), command, self.timeout)
            .await
        {
            Ok(outcome) => {
                match &outcome {
                    ExecOutcome::Succeeded { .. } => {
                        tracing::info!(container = %container.name(), hook = point.name(), "hook completed successfully");
                    }
                    ExecOutcome::Failed { exit_code, .. } => {
                        diagnostics.warn(Warning::hook_failed(format!(
                            "{} hook for {} exited with code {}",
                            point.name(),
                            container.name(),
                            exit_code
                        )));
                    }
                    ExecOutcome::Unfinished { .. } => {
                        diagnostics.warn(Warning::hook_failed(format!(
                            "{} hook for {} did not finish within {:?}",
                            point.name(),
                            container.name(),
                            self.timeout
                        )));
                    }
                }
                Some(outcome)
            }
            Err(e) => {
                diagnostics.warn(Warning::hook_failed(format!(
                    "{} hook for {} could not run: {}",
                    point.name(),
                    container.name(),
                    e
                )));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_point_names() {
        assert_eq!(HookPoint::PreUpdate.name(), "pre-update");
        assert_eq!(HookPoint::PostUpdate.name(), "post-update");
    }

    #[test]
    fn hook_point_labels() {
        assert_eq!(HookPoint::PreUpdate.label(), "reimage.lifecycle.pre-update");
        assert_eq!(HookPoint::PostUpdate.label(), "reimage.lifecycle.post-update");
    }

    #[test]
    fn hook_runner_from_config() {
        let runner = HookRunner::from_config(&HooksConfig::default());
        assert!(runner.enabled);
        assert_eq!(runner.timeout, Duration::from_secs(60));
        assert!(!HookRunner::disabled().enabled);
    }
}
