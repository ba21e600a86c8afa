//! Interactive confirmation before destructive operations.
//!
//! The confirmation gate asks the operator a yes/no question for every
//! candidate bucket through one batched prompt round-trip and retains only
//! the buckets answered with exactly "yes". Console interaction sits behind
//! the [`PromptHandler`] trait so the engine has no direct dependency on any
//! particular terminal library and tests can script the answers.

use std::collections::HashMap;
use std::io::{BufRead, IsTerminal, Write};

use anyhow::{Result, anyhow};
use tracing::info;

use crate::types::error::PurgeError;

/// Trait for collecting per-bucket confirmations, enabling testability.
///
/// The default implementation ([`StdioPromptHandler`]) uses stdin/stdout.
pub trait PromptHandler: Send + Sync {
    /// Ask one yes/no question per bucket in a single batched round-trip.
    ///
    /// Returns an unordered mapping from bucket name to the operator's
    /// validated answer text ("yes" or "no").
    fn confirm_buckets(&self, buckets: &[String]) -> Result<HashMap<String, String>>;

    /// Check if the current environment supports interactive prompts.
    ///
    /// Returns `true` if both stdin and stdout are connected to a TTY.
    fn is_interactive(&self) -> bool;
}

/// Default prompt handler using stdin/stdout.
///
/// Uses `print!`/`println!` for prompts (not tracing), so the questions
/// render even when log output is filtered or redirected.
pub struct StdioPromptHandler;

impl StdioPromptHandler {
    /// Empty input selects the default answer "yes"; anything other than
    /// "yes" or "no" is rejected and the question re-asked.
    fn read_answer(&self, bucket: &str) -> Result<String> {
        let stdin = std::io::stdin();
        loop {
            print!("Empty bucket {bucket}. Are you sure? [yes/no] (yes): ");
            std::io::stdout().flush()?;

            let mut input = String::new();
            stdin.lock().read_line(&mut input)?;
            let answer = input.trim();

            match answer {
                "" => return Ok("yes".to_string()),
                "yes" | "no" => return Ok(answer.to_string()),
                _ => println!("Must respond yes or no"),
            }
        }
    }
}

impl PromptHandler for StdioPromptHandler {
    fn confirm_buckets(&self, buckets: &[String]) -> Result<HashMap<String, String>> {
        let mut answers = HashMap::with_capacity(buckets.len());
        for bucket in buckets {
            answers.insert(bucket.clone(), self.read_answer(bucket)?);
        }
        Ok(answers)
    }

    fn is_interactive(&self) -> bool {
        std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
    }
}

/// Filters a candidate bucket list down to the buckets the operator
/// confirmed.
///
/// A bucket survives only when its answer is exactly `"yes"`; every dropped
/// bucket is logged by name. Because the answers come back as an unordered
/// mapping, the returned subset makes no ordering guarantee.
pub struct ConfirmationGate {
    prompt_handler: Box<dyn PromptHandler>,
}

impl Default for ConfirmationGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfirmationGate {
    pub fn new() -> Self {
        Self {
            prompt_handler: Box::new(StdioPromptHandler),
        }
    }

    /// Create a gate with a custom prompt handler (for testing).
    pub fn with_prompt_handler(prompt_handler: Box<dyn PromptHandler>) -> Self {
        Self { prompt_handler }
    }

    /// Return the subset of `candidates` the operator confirmed.
    ///
    /// In a non-interactive environment the prompt cannot be answered, so
    /// every candidate passes through with a notice rather than blocking a
    /// CI pipeline on stdin.
    pub fn confirm(&self, candidates: &[String]) -> Result<Vec<String>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        if !self.prompt_handler.is_interactive() {
            info!("non-interactive environment, skipping confirmation prompts.");
            return Ok(candidates.to_vec());
        }

        let answers = self
            .prompt_handler
            .confirm_buckets(candidates)
            .map_err(|e| anyhow!(PurgeError::Prompt(e.to_string())))?;

        let mut confirmed = Vec::with_capacity(answers.len());
        for (bucket, answer) in answers {
            if answer == "yes" {
                confirmed.push(bucket);
            } else {
                info!(bucket = bucket.as_str(), "{}: remove skipped", bucket);
            }
        }
        Ok(confirmed)
    }
}
