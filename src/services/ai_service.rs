use actix_web::http::Method;
use actix_web::web::Bytes;
use std::future::Future;
use std::sync::Arc;
use tracing::info;

use crate::config::ChatSettings;
use crate::error::{ChatError, CompletionError};
use crate::models::{
    ChatRequest, ChatResult, CompletionRequest, ComplexityTier, Role, UpstreamChatMessage,
};
use crate::services::{CompletionProvider, ModelService};
use crate::utils::truncate_chars;

/// A conversation ready to be sent upstream, with the tier that chose its model.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedChat {
    pub tier: ComplexityTier,
    pub request: CompletionRequest,
}

#[derive(Clone)]
pub struct AIService {
    provider: Option<Arc<dyn CompletionProvider>>,
    model_service: ModelService,
    settings: ChatSettings,
}

impl AIService {
    /// `provider` is `None` when no upstream credential is configured; every
    /// chat request is then refused.
    pub fn new(provider: Option<Arc<dyn CompletionProvider>>, settings: ChatSettings) -> Self {
        Self {
            provider,
            model_service: ModelService::new(settings.models.clone()),
            settings,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Runs one chat exchange from raw method and body to a reply.
    ///
    /// `body` is only awaited once the method and credential checks pass, so
    /// a rejected request never has its payload read.
    pub async fn handle<B>(&self, method: &Method, body: B) -> Result<ChatResult, ChatError>
    where
        B: Future<Output = Result<Bytes, ChatError>>,
    {
        if *method != Method::POST {
            return Err(ChatError::MethodNotAllowed);
        }
        let provider = self.provider.as_ref().ok_or(ChatError::MissingApiKey)?;

        let body = body.await?;
        let request = ChatRequest::from_body(&body)?;
        let prepared = self.prepare(&request);
        info!(
            complexity = %prepared.tier,
            model = %prepared.request.model,
            history = request.history.len(),
            "routing chat message"
        );

        let reply = provider.complete(&prepared.request).await?;
        if reply.is_empty() {
            return Err(CompletionError::EmptyReply.into());
        }

        Ok(ChatResult {
            reply,
            model_used: prepared.request.model,
            tier_used: prepared.tier,
        })
    }

    /// Truncates the message, picks the model and assembles the upstream
    /// conversation: system prompt, recent history, then the new message.
    pub fn prepare(&self, request: &ChatRequest) -> PreparedChat {
        let sanitized = truncate_chars(&request.message, self.settings.max_message_chars);
        let (tier, model) = self.model_service.select(sanitized, request.history.len());

        let window_start = request
            .history
            .len()
            .saturating_sub(self.settings.history_window);

        let mut messages = Vec::with_capacity(request.history.len() - window_start + 2);
        messages.push(UpstreamChatMessage::new(
            Role::System,
            self.settings.system_prompt.as_str(),
        ));
        messages.extend(
            request.history[window_start..]
                .iter()
                .map(UpstreamChatMessage::from),
        );
        messages.push(UpstreamChatMessage::new(Role::User, sanitized));

        PreparedChat {
            tier,
            request: CompletionRequest {
                model: model.to_string(),
                messages,
                max_tokens: self.settings.max_tokens,
                temperature: self.settings.temperature,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelSelection;
    use crate::services::MockCompletionProvider;
    use std::future::{ready, Ready};

    fn settings() -> ChatSettings {
        ChatSettings {
            system_prompt: "You are a test persona.".into(),
            models: ModelSelection {
                simple: "test/simple".into(),
                medium: "test/medium".into(),
                complex: "test/complex".into(),
            },
            ..ChatSettings::default()
        }
    }

    fn service_with(mock: MockCompletionProvider) -> AIService {
        AIService::new(Some(Arc::new(mock)), settings())
    }

    fn json_bytes(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    fn body(value: serde_json::Value) -> Ready<Result<Bytes, ChatError>> {
        ready(Ok(Bytes::from(json_bytes(value))))
    }

    async fn unread_body() -> Result<Bytes, ChatError> {
        panic!("request body was read")
    }

    fn history(turns: usize) -> Vec<serde_json::Value> {
        (0..turns)
            .map(|i| {
                let sender = if i % 2 == 0 { "user" } else { "bot" };
                serde_json::json!({"sender": sender, "text": format!("turn {i}")})
            })
            .collect()
    }

    #[actix_web::test]
    async fn non_post_is_rejected_without_calling_upstream() {
        let mut mock = MockCompletionProvider::new();
        mock.expect_complete().times(0);
        let service = service_with(mock);

        let err = service
            .handle(&Method::GET, body(serde_json::json!({"message": "hi"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::MethodNotAllowed));
    }

    #[actix_web::test]
    async fn missing_credential_is_rejected_before_the_body_is_read() {
        let service = AIService::new(None, settings());
        assert!(!service.is_configured());

        let err = service.handle(&Method::POST, unread_body()).await.unwrap_err();
        assert!(matches!(err, ChatError::MissingApiKey));
    }

    #[actix_web::test]
    async fn wrong_method_is_rejected_before_the_body_is_read() {
        let mut mock = MockCompletionProvider::new();
        mock.expect_complete().times(0);
        let service = service_with(mock);

        let err = service.handle(&Method::PUT, unread_body()).await.unwrap_err();
        assert!(matches!(err, ChatError::MethodNotAllowed));
    }

    #[actix_web::test]
    async fn body_read_failure_is_returned_unchanged() {
        let mut mock = MockCompletionProvider::new();
        mock.expect_complete().times(0);
        let service = service_with(mock);

        let err = service
            .handle(&Method::POST, ready(Err(ChatError::PayloadTooLarge)))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::PayloadTooLarge));
    }

    #[actix_web::test]
    async fn invalid_message_never_reaches_upstream() {
        let mut mock = MockCompletionProvider::new();
        mock.expect_complete().times(0);
        let service = service_with(mock);

        let err = service
            .handle(&Method::POST, body(serde_json::json!({"message": ["hi"]})))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::InvalidMessage));
    }

    #[actix_web::test]
    async fn successful_exchange_reports_reply_model_and_tier() {
        let mut mock = MockCompletionProvider::new();
        mock.expect_complete()
            .withf(|req: &CompletionRequest| {
                req.model == "test/simple"
                    && req.max_tokens == 300
                    && (req.temperature - 0.7).abs() < f32::EPSILON
                    && req.messages.len() == 2
            })
            .times(1)
            .returning(|_| Ok("Hello! How can I help?".to_string()));
        let service = service_with(mock);

        let result = service
            .handle(&Method::POST, body(serde_json::json!({"message": "hi"})))
            .await
            .unwrap();
        assert_eq!(
            result,
            ChatResult {
                reply: "Hello! How can I help?".into(),
                model_used: "test/simple".into(),
                tier_used: ComplexityTier::Simple,
            }
        );
    }

    #[actix_web::test]
    async fn long_message_is_truncated_to_500_characters() {
        let original: String = ('a'..='z').cycle().take(600).collect();
        let expected: String = original.chars().take(500).collect();

        let mut mock = MockCompletionProvider::new();
        mock.expect_complete()
            .withf(move |req: &CompletionRequest| {
                let last = req.messages.last().unwrap();
                last.role == Role::User && last.content == expected
            })
            .times(1)
            .returning(|_| Ok("ok".to_string()));
        let service = service_with(mock);

        service
            .handle(&Method::POST, body(serde_json::json!({"message": original})))
            .await
            .unwrap();
    }

    #[actix_web::test]
    async fn upstream_failure_maps_to_generic_error() {
        let mut mock = MockCompletionProvider::new();
        mock.expect_complete().times(1).returning(|_| {
            Err(CompletionError::Status {
                status: 401,
                body: "{\"error\":\"invalid key sk-or-xyz\"}".into(),
            })
        });
        let service = service_with(mock);

        let err = service
            .handle(
                &Method::POST,
                body(serde_json::json!({"message": "Where is your office located these days"})),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Upstream(CompletionError::Status { .. })));
        assert_eq!(err.public_message(), "Something went wrong. Please try again.");
    }

    #[actix_web::test]
    async fn empty_reply_is_a_failure() {
        let mut mock = MockCompletionProvider::new();
        mock.expect_complete()
            .times(1)
            .returning(|_| Ok(String::new()));
        let service = service_with(mock);

        let err = service
            .handle(&Method::POST, body(serde_json::json!({"message": "hello"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Upstream(CompletionError::EmptyReply)));
    }

    #[test]
    fn prepare_forwards_only_the_last_six_turns_in_order() {
        let service = AIService::new(None, settings());
        let request = ChatRequest::from_body(&json_bytes(serde_json::json!({
            "message": "Where is your office located these days",
            "history": history(10),
        })))
        .unwrap();

        let prepared = service.prepare(&request);
        let messages = &prepared.request.messages;

        assert_eq!(messages.len(), 8);
        assert_eq!(
            messages[0],
            UpstreamChatMessage::new(Role::System, "You are a test persona.")
        );
        let forwarded: Vec<_> = messages[1..7]
            .iter()
            .map(|m| (m.role, m.content.as_str()))
            .collect();
        assert_eq!(
            forwarded,
            vec![
                (Role::User, "turn 4"),
                (Role::Assistant, "turn 5"),
                (Role::User, "turn 6"),
                (Role::Assistant, "turn 7"),
                (Role::User, "turn 8"),
                (Role::Assistant, "turn 9"),
            ]
        );
        assert_eq!(
            messages[7],
            UpstreamChatMessage::new(Role::User, "Where is your office located these days")
        );
        // Ten turns of history exceed the complex threshold even though
        // only six are forwarded.
        assert_eq!(prepared.tier, ComplexityTier::Complex);
        assert_eq!(prepared.request.model, "test/complex");
    }

    #[test]
    fn prepare_with_short_history_forwards_everything() {
        let service = AIService::new(None, settings());
        let request = ChatRequest::from_body(&json_bytes(serde_json::json!({
            "message": "Where is your office located these days",
            "history": [{"sender": "assistant", "text": "Welcome!"}],
        })))
        .unwrap();

        let prepared = service.prepare(&request);
        assert_eq!(prepared.tier, ComplexityTier::Medium);
        assert_eq!(prepared.request.messages.len(), 3);
        assert_eq!(
            prepared.request.messages[1],
            UpstreamChatMessage::new(Role::Assistant, "Welcome!")
        );
    }
}
