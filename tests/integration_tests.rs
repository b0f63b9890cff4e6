//! Integration tests against the live Gemini API.
//! These tests require an API key in the environment to run.

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use gemini_chat::chat::{ChatConfig, ChatSession};
    use gemini_chat::{
        CompletionRequest, CompletionService, Content, GenerateContentRequest, Gemini, KnownModel,
        Model, Role,
    };

    fn api_key() -> Option<String> {
        let key = std::env::var("GOOGLE_API_KEY").ok();
        if key.is_none() {
            eprintln!("Skipping test: GOOGLE_API_KEY not set");
        }
        key
    }

    #[tokio::test]
    async fn test_simple_generate_request() {
        let Some(api_key) = api_key() else {
            return;
        };
        let client = Gemini::new(api_key).expect("Failed to create client");

        let request = GenerateContentRequest::new(vec![Content::user("Say 'test passed'")]);
        let response = client
            .generate_content(&Model::Known(KnownModel::Gemini15Flash), &request)
            .await;
        assert!(
            response.is_ok(),
            "Request should succeed with valid API key"
        );
    }

    #[tokio::test]
    async fn test_streaming_response() {
        let Some(api_key) = api_key() else {
            return;
        };
        let client = Gemini::new(api_key).expect("Failed to create client");

        let request = GenerateContentRequest::new(vec![Content::user("Count to 3")]);
        let stream = client
            .stream_generate_content(&Model::Known(KnownModel::Gemini15Flash), &request)
            .await
            .expect("Stream request should succeed");
        let chunks: Vec<_> = stream.collect().await;
        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|chunk| chunk.is_ok()));
    }

    #[tokio::test]
    async fn test_completion_service() {
        let Some(api_key) = api_key() else {
            return;
        };
        let client = Gemini::new(api_key).expect("Failed to create client");
        let completion = client
            .generate(&CompletionRequest::single("Reply with the single word: pong"))
            .await
            .expect("Completion should succeed");
        assert!(!completion.text.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_key_becomes_error_turn() {
        if api_key().is_none() {
            return;
        }
        let client = Gemini::new("not-a-real-key").expect("Failed to create client");
        let mut session = ChatSession::new(client, ChatConfig::default());
        let turn = session.respond("hello").await.clone();
        assert_eq!(turn.role(), Role::Assistant);
        assert!(turn.is_error());
        assert!(turn.content().starts_with("Error: "));
    }
}
