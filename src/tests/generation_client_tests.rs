#[cfg(test)]
mod tests {
    use std::time::Duration;
    use tokio::test;

    use crate::errors::ProviderError;
    use crate::implementations::generation_client::GenerationClient;
    use crate::implementations::providers::{ extract_chat_content, extract_generated_text };
    use crate::tests::fakes::{ setup, FakeGenerator, Scripted };

    #[test]
    async fn test_primary_success_skips_fallback() {
        setup();
        let primary = FakeGenerator::replying("aipipe", "<html>ok</html>");
        let fallback = FakeGenerator::replying("huggingface", "unused");
        let client = GenerationClient::new(primary.clone(), fallback.clone());

        let result = client.generate(&client.render_prompt("A page", &[])).await.unwrap();

        assert_eq!(result.content, "<html>ok</html>");
        assert_eq!(result.provider, "aipipe");
        assert_eq!(result.model, "fake-model");
        assert!(!result.fallback_used);
        assert!(result.primary_error.is_none());
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 0);
    }

    #[test]
    async fn test_fallback_answers_when_primary_fails() {
        setup();
        let primary = FakeGenerator::failing("aipipe", ProviderError::RateLimited);
        let fallback = FakeGenerator::replying("huggingface", "fallback text");
        let client = GenerationClient::new(primary.clone(), fallback.clone());

        let result = client.generate(&client.render_prompt("A page", &[])).await.unwrap();

        assert_eq!(result.content, "fallback text");
        assert_eq!(result.provider, "huggingface");
        assert!(result.fallback_used);
        assert_eq!(result.primary_error.as_deref(), Some("rate limited or out of quota"));
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
    }

    #[test]
    async fn test_both_failures_are_reported() {
        setup();
        let primary = FakeGenerator::failing("aipipe", ProviderError::Auth { status: 401 });
        let fallback = FakeGenerator::failing("huggingface", ProviderError::Transport("refused".to_string()));
        let client = GenerationClient::new(primary.clone(), fallback.clone());

        let err = client.generate(&client.render_prompt("A page", &[])).await.unwrap_err();

        assert_eq!(err.primary_provider, "aipipe");
        assert_eq!(err.primary, ProviderError::Auth { status: 401 });
        assert_eq!(err.fallback_provider, "huggingface");
        assert_eq!(err.fallback, ProviderError::Transport("refused".to_string()));
        // One hop only, no retries
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
    }

    #[test]
    async fn test_slow_primary_times_out_and_falls_back() {
        setup();
        let primary = FakeGenerator::with_timeout(
            "aipipe",
            Duration::from_millis(20),
            vec![Scripted::Stall(Duration::from_secs(5))]
        );
        let fallback = FakeGenerator::replying("huggingface", "fallback text");
        let client = GenerationClient::new(primary.clone(), fallback.clone());

        let result = client.generate(&client.render_prompt("A page", &[])).await.unwrap();

        assert!(result.fallback_used);
        assert!(result.primary_error.unwrap().contains("timed out"));
    }

    #[test]
    async fn test_blank_primary_output_counts_as_failure() {
        setup();
        let primary = FakeGenerator::replying("aipipe", "   \n");
        let fallback = FakeGenerator::replying("huggingface", "something");
        let client = GenerationClient::new(primary, fallback);

        let result = client.generate(&client.render_prompt("A page", &[])).await.unwrap();

        assert!(result.fallback_used);
        assert_eq!(result.primary_error.as_deref(), Some("provider returned no content"));
    }

    #[test]
    async fn test_prompt_carries_brief_and_checks() {
        setup();
        let primary = FakeGenerator::replying("aipipe", "x");
        let client = GenerationClient::new(primary.clone(), FakeGenerator::replying("huggingface", "y"));

        let prompt = client.render_prompt("Build a calculator", &["Has a = button".to_string()]);
        client.generate(&prompt).await.unwrap();

        let sent = primary.last_prompt().unwrap();
        assert!(sent.prompt.contains("Build a calculator"));
        assert!(sent.prompt.contains("- Has a = button"));
        assert!(!sent.instructions.is_empty());
        assert_eq!(client.provider_names(), ["aipipe", "huggingface"]);
    }

    #[test]
    async fn test_custom_template() {
        let client = GenerationClient::new(
            FakeGenerator::replying("a", "x"),
            FakeGenerator::replying("b", "y")
        ).with_template("brief={{brief}} checks={{checks}}");

        let prompt = client.render_prompt("hi", &[]);
        assert_eq!(prompt.prompt, "brief=hi checks=- (no explicit checks)");
    }

    #[test]
    async fn test_chat_completion_parsing() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"<html></html>"}}]}"#;
        assert_eq!(extract_chat_content(body).unwrap(), "<html></html>");

        assert!(matches!(extract_chat_content(r#"{"choices":[]}"#), Err(ProviderError::MalformedResponse(_))));
        assert!(matches!(extract_chat_content("not json"), Err(ProviderError::MalformedResponse(_))));
        assert_eq!(
            extract_chat_content(r#"{"choices":[{"message":{"content":""}}]}"#),
            Err(ProviderError::EmptyResponse)
        );
    }

    #[test]
    async fn test_inference_parsing() {
        assert_eq!(extract_generated_text(r#"[{"generated_text":"hello"}]"#).unwrap(), "hello");
        assert_eq!(extract_generated_text(r#"{"generated_text":"hello"}"#).unwrap(), "hello");
        assert!(
            matches!(
                extract_generated_text(r#"{"error":"Model gpt2 is currently loading"}"#),
                Err(ProviderError::MalformedResponse(msg)) if msg.contains("loading")
            )
        );
        assert_eq!(extract_generated_text(r#"[{"generated_text":" "}]"#), Err(ProviderError::EmptyResponse));
    }

    #[test]
    async fn test_status_classification() {
        assert_eq!(ProviderError::from_status(401, String::new()), ProviderError::Auth { status: 401 });
        assert_eq!(ProviderError::from_status(429, String::new()), ProviderError::RateLimited);
        assert!(matches!(ProviderError::from_status(500, "boom".to_string()), ProviderError::Http { status: 500, .. }));
    }
}
