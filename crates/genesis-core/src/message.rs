//! Transcript messages

use chrono::{DateTime, Utc};
use genesis_api::RunState;
use std::sync::Arc;
use uuid::Uuid;

/// Who a message is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// A single transcript entry
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Client-generated unique id
    pub id: String,
    pub role: Role,
    pub text: String,
    /// The run this message was rendered from (assistant only)
    pub raw_response: Option<Arc<RunState>>,
    /// Degraded or error content
    pub is_error: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            raw_response: None,
            is_error: false,
            created_at: Utc::now(),
        }
    }

    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Create an assistant message from a completed run
    pub fn assistant(run: Arc<RunState>) -> Self {
        let mut msg = Self::new(Role::Assistant, run.final_response.clone());
        msg.raw_response = Some(run);
        msg
    }

    /// Create an informational system message
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }

    /// Create a system message flagged as an error
    pub fn error(text: impl Into<String>) -> Self {
        let mut msg = Self::new(Role::System, text);
        msg.is_error = true;
        msg
    }
}

/// Shallow patch for an existing message; `None` fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct MessagePatch {
    pub role: Option<Role>,
    pub text: Option<String>,
    pub raw_response: Option<Arc<RunState>>,
    pub is_error: Option<bool>,
}

impl MessagePatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn raw_response(run: Arc<RunState>) -> Self {
        Self {
            raw_response: Some(run),
            ..Default::default()
        }
    }

    pub(crate) fn apply(self, msg: &mut Message) {
        if let Some(role) = self.role {
            msg.role = role;
        }
        if let Some(text) = self.text {
            msg.text = text;
        }
        if let Some(run) = self.raw_response {
            msg.raw_response = Some(run);
        }
        if let Some(is_error) = self.is_error {
            msg.is_error = is_error;
        }
    }
}
