//! Scripted model client for tests.

use super::ModelClient;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

/// What the mock does on every `complete` call.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    Reply(String),
    Fail(String),
}

/// [`ModelClient`] double that records calls and the prompts it saw.
pub struct MockModelClient {
    behavior: MockBehavior,
    pub calls: Arc<Mutex<usize>>,
    pub last_system_prompt: Arc<Mutex<Option<String>>>,
    pub last_user_message: Arc<Mutex<Option<String>>>,
}

impl MockModelClient {
    pub fn replying(text: &str) -> Self {
        Self::with_behavior(MockBehavior::Reply(text.to_string()))
    }

    pub fn failing(error: &str) -> Self {
        Self::with_behavior(MockBehavior::Fail(error.to_string()))
    }

    fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(Mutex::new(0)),
            last_system_prompt: Arc::new(Mutex::new(None)),
            last_user_message: Arc::new(Mutex::new(None)),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, system_prompt: &str, user_message: &str) -> anyhow::Result<String> {
        *self.calls.lock() += 1;
        *self.last_system_prompt.lock() = Some(system_prompt.to_string());
        *self.last_user_message.lock() = Some(user_message.to_string());
        match &self.behavior {
            MockBehavior::Reply(text) => Ok(text.clone()),
            MockBehavior::Fail(error) => anyhow::bail!("{error}"),
        }
    }
}
