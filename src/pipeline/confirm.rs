//! Fallback confirmation gate
//!
//! A fallback candidate is only used after the operator accepts it. Prompts
//! are serialized so at most one question is on the terminal at a time, while
//! workers that do not need confirmation keep running.

use async_trait::async_trait;

use crate::core::{RinthError, RinthResult};
use crate::matcher::GameVersion;

/// One fallback offer presented to the operator
#[derive(Debug, Clone)]
pub struct FallbackRequest {
    pub project_title: String,
    pub filename: String,

    /// Game version the run is targeting
    pub target: GameVersion,

    /// Highest game version the offered release supports
    pub supports: Option<GameVersion>,
}

impl FallbackRequest {
    fn prompt(&self) -> String {
        let supports = self
            .supports
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        format!(
            "No exact match for '{}' (target: {}). Use fallback {} (supports {})?",
            self.project_title, self.target, self.filename, supports
        )
    }
}

/// Accept/reject decision point for fallback candidates
#[async_trait]
pub trait FallbackGate: Send + Sync {
    async fn confirm(&self, request: FallbackRequest) -> RinthResult<bool>;
}

/// Interactive gate: one dialoguer prompt at a time
pub struct InteractiveGate {
    prompt_lock: tokio::sync::Mutex<()>,
}

impl InteractiveGate {
    pub fn new() -> Self {
        Self {
            prompt_lock: tokio::sync::Mutex::new(()),
        }
    }
}

impl Default for InteractiveGate {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FallbackGate for InteractiveGate {
    async fn confirm(&self, request: FallbackRequest) -> RinthResult<bool> {
        // Held across the prompt: concurrent fallback tasks queue here
        let _guard = self.prompt_lock.lock().await;

        let prompt = request.prompt();
        let accepted = tokio::task::spawn_blocking(move || {
            dialoguer::Confirm::new()
                .with_prompt(prompt)
                .default(false)
                .interact()
        })
        .await
        .map_err(|e| RinthError::other(format!("confirmation prompt panicked: {}", e)))??;

        Ok(accepted)
    }
}

/// Non-interactive gate for unattended runs (--yes / --no)
pub struct AutoGate {
    accept: bool,
}

impl AutoGate {
    pub fn new(accept: bool) -> Self {
        Self { accept }
    }
}

#[async_trait]
impl FallbackGate for AutoGate {
    async fn confirm(&self, request: FallbackRequest) -> RinthResult<bool> {
        tracing::debug!(
            project = %request.project_title,
            accept = self.accept,
            "auto-resolving fallback offer"
        );
        Ok(self.accept)
    }
}

/// Test gate answering from a script of (project title, answer) pairs;
/// unscripted projects are rejected
#[cfg(test)]
pub struct ScriptedGate {
    answers: std::collections::HashMap<String, bool>,
    pub asked: parking_lot::Mutex<Vec<String>>,
}

#[cfg(test)]
impl ScriptedGate {
    pub fn new(answers: &[(&str, bool)]) -> Self {
        Self {
            answers: answers
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
            asked: parking_lot::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl FallbackGate for ScriptedGate {
    async fn confirm(&self, request: FallbackRequest) -> RinthResult<bool> {
        self.asked.lock().push(request.project_title.clone());
        Ok(self
            .answers
            .get(&request.project_title)
            .copied()
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_wording() {
        let request = FallbackRequest {
            project_title: "Sodium".to_string(),
            filename: "sodium-1.21.8.jar".to_string(),
            target: "1.21.9".parse().unwrap(),
            supports: Some("1.21.8".parse().unwrap()),
        };

        let prompt = request.prompt();
        assert!(prompt.contains("Sodium"));
        assert!(prompt.contains("1.21.9"));
        assert!(prompt.contains("supports 1.21.8"));
    }

    #[tokio::test]
    async fn test_auto_gate() {
        let request = FallbackRequest {
            project_title: "Sodium".to_string(),
            filename: "sodium.jar".to_string(),
            target: "1.21.9".parse().unwrap(),
            supports: None,
        };

        assert!(AutoGate::new(true).confirm(request.clone()).await.unwrap());
        assert!(!AutoGate::new(false).confirm(request).await.unwrap());
    }
}
