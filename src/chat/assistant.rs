// src/chat/assistant.rs
//! Chat-driven editing: the assistant replies and may return resume patches
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::chat::patch::updates_to_actions;
use crate::core::ApiClient;
use crate::notify::Notifier;
use crate::store::ResumeStore;
use crate::types::resume::{ResumeData, ResumeSettings};

pub const CHAT_ENDPOINT: &str = "/ai/chat";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub resume_data: &'a ResumeData,
    pub resume_settings: &'a ResumeSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_description: Option<&'a str>,
    pub history: &'a [ChatMessage],
    pub conversation_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    #[serde(default)]
    pub reply: String,
    #[serde(default)]
    pub resume_updates: Option<Value>,
    #[serde(default)]
    pub settings_updates: Option<Value>,
    #[serde(default)]
    pub has_changes: bool,
}

/// What one exchange did to the document
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOutcome {
    pub reply: String,
    pub applied: usize,
}

/// One conversation with the editing assistant about one resume
pub struct ChatSession {
    client: Arc<ApiClient>,
    notifier: Arc<Notifier>,
    conversation_id: Uuid,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(client: Arc<ApiClient>, notifier: Arc<Notifier>) -> Self {
        Self {
            client,
            notifier,
            conversation_id: Uuid::new_v4(),
            history: Vec::new(),
        }
    }

    pub fn conversation_id(&self) -> Uuid {
        self.conversation_id
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Send `message` with the current document. Updates in the reply are
    /// dispatched to `store` when the assistant reports changes. A failed
    /// exchange leaves both the store and the history untouched.
    pub async fn send(
        &mut self,
        store: &mut ResumeStore,
        message: &str,
        job_description: Option<&str>,
    ) -> Result<ChatOutcome> {
        match self.exchange(store, message, job_description).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.notifier.error("Chat request failed", &e);
                Err(e)
            }
        }
    }

    async fn exchange(
        &mut self,
        store: &mut ResumeStore,
        message: &str,
        job_description: Option<&str>,
    ) -> Result<ChatOutcome> {
        let state = store.state();
        let request = ChatRequest {
            message,
            resume_data: &state.resume_data,
            resume_settings: &state.resume_settings,
            job_description,
            history: &self.history,
            conversation_id: self.conversation_id,
        };

        debug!(
            "Chat request in conversation {} ({} prior messages)",
            self.conversation_id,
            self.history.len()
        );
        let response: ChatResponse = self.client.post_json(CHAT_ENDPOINT, &request).await?;

        let actions = if response.has_changes {
            updates_to_actions(response.resume_updates, response.settings_updates)?
        } else {
            Vec::new()
        };
        let applied = actions.len();
        store.dispatch_all(actions);

        if applied > 0 {
            info!("Assistant applied {} update(s)", applied);
            self.notifier.success("Resume updated by the assistant");
        }

        self.history.push(ChatMessage {
            role: ChatRole::User,
            content: message.to_string(),
        });
        self.history.push(ChatMessage {
            role: ChatRole::Assistant,
            content: response.reply.clone(),
        });

        Ok(ChatOutcome {
            reply: response.reply,
            applied,
        })
    }
}
