//! Scripted backend for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use notevault_core::{Error, Result};

use crate::GenerationBackend;

/// In-memory backend that answers from a script.
///
/// Each rule pairs a prompt substring with a canned response; the first rule
/// whose substring appears in the prompt wins. Prompts are recorded so tests
/// can assert on what was actually sent.
pub struct MockBackend {
    rules: Vec<(String, String)>,
    default_response: String,
    fail: bool,
    calls: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            default_response: "yes".to_string(),
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer `response` whenever the prompt contains `needle`.
    pub fn on(mut self, needle: impl Into<String>, response: impl Into<String>) -> Self {
        self.rules.push((needle.into(), response.into()));
        self
    }

    /// Response used when no rule matches.
    pub fn default_response(mut self, response: impl Into<String>) -> Self {
        self.default_response = response.into();
        self
    }

    /// Fail every call, simulating an unreachable provider.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Prompts received so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(prompt.to_string());
        }

        if self.fail {
            return Err(Error::Assist("Mock backend configured to fail".to_string()));
        }

        for (needle, response) in &self.rules {
            if prompt.contains(needle.as_str()) {
                return Ok(response.clone());
            }
        }

        Ok(self.default_response.clone())
    }
}
