//! Shared helpers for unit tests.

use std::collections::HashMap;

use anyhow::{Result, anyhow};

use crate::config::Config;
use crate::safety::PromptHandler;

pub(crate) fn init_dummy_tracing_subscriber() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("dummy=trace")
        .try_init();
}

pub(crate) fn make_test_config() -> Config {
    Config {
        buckets: vec!["b1".to_string(), "b2".to_string()],
        ..Config::default()
    }
}

/// Scripted prompt handler answering from a fixed map.
///
/// Buckets without a scripted answer default to "yes", mirroring the real
/// handler's default.
pub(crate) struct ScriptedPromptHandler {
    answers: HashMap<String, String>,
    interactive: bool,
    fail_with: Option<String>,
}

impl ScriptedPromptHandler {
    pub(crate) fn new(answers: &[(&str, &str)]) -> Self {
        Self {
            answers: answers
                .iter()
                .map(|(bucket, answer)| (bucket.to_string(), answer.to_string()))
                .collect(),
            interactive: true,
            fail_with: None,
        }
    }

    pub(crate) fn non_interactive() -> Self {
        Self {
            answers: HashMap::new(),
            interactive: false,
            fail_with: None,
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            answers: HashMap::new(),
            interactive: true,
            fail_with: Some(message.to_string()),
        }
    }
}

impl PromptHandler for ScriptedPromptHandler {
    fn confirm_buckets(&self, buckets: &[String]) -> Result<HashMap<String, String>> {
        if let Some(ref message) = self.fail_with {
            return Err(anyhow!(message.clone()));
        }
        Ok(buckets
            .iter()
            .map(|bucket| {
                let answer = self
                    .answers
                    .get(bucket)
                    .cloned()
                    .unwrap_or_else(|| "yes".to_string());
                (bucket.clone(), answer)
            })
            .collect())
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}
