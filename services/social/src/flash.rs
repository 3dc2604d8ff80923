//! One-shot messages carried in the session until they are rendered

use serde::{Deserialize, Serialize};
use tower_sessions::{Session, session::Error};

use crate::session::MESSAGES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub text: String,
}

/// Queue a message for the next rendered page
pub async fn push(session: &Session, level: FlashLevel, text: impl Into<String>) -> Result<(), Error> {
    let mut messages: Vec<FlashMessage> = session.get(MESSAGES).await?.unwrap_or_default();
    messages.push(FlashMessage {
        level,
        text: text.into(),
    });
    session.insert(MESSAGES, messages).await
}

pub async fn success(session: &Session, text: impl Into<String>) -> Result<(), Error> {
    push(session, FlashLevel::Success, text).await
}

pub async fn error(session: &Session, text: impl Into<String>) -> Result<(), Error> {
    push(session, FlashLevel::Error, text).await
}

/// Remove and return every pending message
pub async fn take(session: &Session) -> Result<Vec<FlashMessage>, Error> {
    Ok(session
        .remove::<Vec<FlashMessage>>(MESSAGES)
        .await?
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    #[tokio::test]
    async fn test_messages_are_delivered_once_in_order() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        success(&session, "Registration successful.").await.unwrap();
        error(&session, "You cannot follow yourself.").await.unwrap();

        let messages = take(&session).await.unwrap();
        assert_eq!(
            messages,
            vec![
                FlashMessage {
                    level: FlashLevel::Success,
                    text: "Registration successful.".to_string(),
                },
                FlashMessage {
                    level: FlashLevel::Error,
                    text: "You cannot follow yourself.".to_string(),
                },
            ]
        );
        assert!(take(&session).await.unwrap().is_empty());
    }
}
