//! One-shot messages carried across a redirect.

use tower_sessions::Session;

use crate::models::{FlashMessage, session_keys};

/// Queue a message for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn push_flash(
    session: &Session,
    text: impl Into<String>,
) -> Result<(), tower_sessions::session::Error> {
    let mut messages: Vec<FlashMessage> = session
        .get(session_keys::FLASH_MESSAGES)
        .await?
        .unwrap_or_default();
    messages.push(FlashMessage { text: text.into() });
    session.insert(session_keys::FLASH_MESSAGES, messages).await
}

/// Remove and return every queued message.
///
/// A session that can't be read yields no messages.
pub async fn take_flashes(session: &Session) -> Vec<FlashMessage> {
    match session
        .remove::<Vec<FlashMessage>>(session_keys::FLASH_MESSAGES)
        .await
    {
        Ok(messages) => messages.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read flash messages");
            Vec::new()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_flashes_are_consumed_in_order() {
        let session = session();
        push_flash(&session, "first").await.unwrap();
        push_flash(&session, "second").await.unwrap();

        let texts: Vec<String> = take_flashes(&session)
            .await
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(texts, ["first", "second"]);

        assert!(take_flashes(&session).await.is_empty());
    }
}
