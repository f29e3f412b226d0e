//! Canned-response inference client for tests.
//!
//! Records every prompt it receives so tests can assert on what was sent,
//! and replays a fixed sequence of outcomes (the last one repeats).

use async_trait::async_trait;
use std::sync::Mutex;

use crate::client::{InferenceClient, InferenceError};

#[derive(Debug, Clone)]
enum Outcome {
    Reply(String),
    Fail,
}

#[derive(Default)]
pub struct MockInference {
    outcomes: Vec<Outcome>,
    calls: Mutex<Vec<String>>,
}

impl MockInference {
    /// Always reply with the given text.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            outcomes: vec![Outcome::Reply(text.into())],
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always fail, as a transport-level error would.
    pub fn failing() -> Self {
        Self {
            outcomes: vec![Outcome::Fail],
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Reply with each text in turn; the last one repeats.
    pub fn sequence(replies: &[&str]) -> Self {
        Self {
            outcomes: replies.iter().map(|r| Outcome::Reply(r.to_string())).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every prompt seen so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().expect("mock lock").clone()
    }
}

#[async_trait]
impl InferenceClient for MockInference {
    async fn complete(&self, prompt: &str) -> Result<String, InferenceError> {
        let mut calls = self.calls.lock().expect("mock lock");
        let call_index = calls.len();
        calls.push(prompt.to_string());
        drop(calls);

        let outcome = self
            .outcomes
            .get(call_index)
            .or_else(|| self.outcomes.last())
            .cloned()
            .unwrap_or(Outcome::Fail);

        match outcome {
            Outcome::Reply(text) => Ok(text),
            Outcome::Fail => Err(InferenceError::Api {
                status: 503,
                body: "mock transport failure".to_string(),
            }),
        }
    }
}
