use crate::config::{OpenAiSettings, ResponderConfig};
use anyhow::{Context, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
};
use std::time::{Duration, Instant};
use tokio::time::sleep;

const SUBJECT_VERB_AGREEMENT: &str = "Subject-verb agreement means the subject and verb must match. \
If the subject is singular (one thing), use a singular verb. \
If the subject is plural (many things), use a plural verb. \
Example: 'The cat runs' (singular) but 'The cats run' (plural).";

const EGYPTIAN_PYRAMIDS: &str = "This passage tells us about ancient Egyptian pyramids. The main idea is that Egyptians \
built these huge stone buildings as tombs for their kings called pharaohs. \
The supporting detail is that they took many years to build because they were so massive. \
Think about other big buildings you know - they also take a long time to construct!";

const READING_STRATEGY: &str = "To understand this passage, let's find the main idea first. \
Look for the most important point the author is trying to make. \
Then identify supporting details that help explain this main idea. \
Finally, think about how this connects to what you already know.";

const WATER_CYCLE: &str = "Rain happens because of the water cycle! When the sun heats up water in oceans and lakes, \
it turns into invisible water vapor that rises into the sky. High up where it's cold, \
this water vapor turns back into tiny water droplets that form clouds. \
When the droplets get too heavy, they fall as rain!";

/// Canned answer chosen when every keyword appears in the lowercased prompt
struct CannedResponse {
    keywords: &'static [&'static str],
    text: &'static str,
}

/// More specific rules come before the general ones they overlap with
static CANNED_RESPONSES: &[CannedResponse] = &[
    CannedResponse {
        keywords: &["photosynthesis"],
        text: "Plants make food using sunlight, water, and carbon dioxide. \
               The green parts of plants capture sunlight like solar panels. \
               Water comes up from the roots, and carbon dioxide comes from the air. \
               When these mix together with sunlight, plants make sugar for food and release oxygen.",
    },
    CannedResponse {
        keywords: &["step", "gravity"],
        text: "Step 1: Gravity is a force that pulls everything toward Earth. \
               Step 2: This invisible force is always working, even when you can't see it. \
               Step 3: That's why when you drop something, it falls down instead of floating away!",
    },
    CannedResponse {
        keywords: &["heavier", "fall"],
        text: "I can see why you might think that - it seems like heavier things should fall faster! \
               But actually, all objects fall at the same speed when there's no air resistance. \
               Try dropping a heavy book and a light piece of paper from the same height - \
               they'll hit the ground at almost the same time!",
    },
    CannedResponse {
        keywords: &["gravity"],
        text: "Gravity is a force that pulls objects toward Earth. \
               Think of it like an invisible hand that always pulls things down. \
               That's why when you drop a ball, it falls to the ground instead of floating away. \
               The bigger something is, the stronger its gravity pull.",
    },
    CannedResponse {
        keywords: &["atoms"],
        text: "Atoms are like tiny building blocks that make up everything around us. \
               Think of them like LEGO blocks - you can't see individual blocks in a big castle, \
               but they're all there holding it together. \
               Different combinations of these blocks make different materials.",
    },
    CannedResponse {
        keywords: &["experiment", "magnet"],
        text: "Here's a simple magnet experiment: Get a magnet and various small objects like paperclips, \
               coins, and plastic items. First, predict which items will stick to the magnet. \
               Then test each item. You'll find that only metal objects made of iron stick to magnets.",
    },
    CannedResponse {
        keywords: &["grammar"],
        text: SUBJECT_VERB_AGREEMENT,
    },
    CannedResponse {
        keywords: &["verb"],
        text: SUBJECT_VERB_AGREEMENT,
    },
    CannedResponse {
        keywords: &["writing", "feedback"],
        text: "Your writing shows good ideas and creativity. To improve: \
               First, add more descriptive words to paint pictures in the reader's mind. \
               Second, vary your sentence lengths by mixing short and long sentences. \
               Third, make sure each paragraph has one main idea.",
    },
    CannedResponse {
        keywords: &["magnificent"],
        text: "Magnificent means extremely beautiful, impressive, or wonderful. \
               It's used to describe something that makes you say 'Wow!' \
               Example sentence: The magnificent sunset painted the sky in brilliant colors.",
    },
    CannedResponse {
        keywords: &["define"],
        text: "This word means something special or important. \
               You can use it to describe things that are impressive or noteworthy.",
    },
    CannedResponse {
        keywords: &["egyptian"],
        text: EGYPTIAN_PYRAMIDS,
    },
    CannedResponse {
        keywords: &["pyramid"],
        text: EGYPTIAN_PYRAMIDS,
    },
    CannedResponse {
        keywords: &["key", "door"],
        text: "This story is about discovery and mystery. The main idea is that sometimes we find \
               unexpected treasures in familiar places. The young girl represents curiosity, \
               the mysterious key represents opportunity, and the hidden door represents new adventures \
               waiting to be discovered.",
    },
    CannedResponse {
        keywords: &["story"],
        text: READING_STRATEGY,
    },
    CannedResponse {
        keywords: &["passage"],
        text: READING_STRATEGY,
    },
    CannedResponse {
        keywords: &["compare", "mammal", "reptile"],
        text: "Mammals and reptiles are both animals, but they're different in important ways. \
               Mammals are warm-blooded and have fur or hair, while reptiles are cold-blooded and have scales. \
               Mammal babies drink milk from their mothers, but reptile babies usually take care of themselves.",
    },
    CannedResponse {
        keywords: &["compare"],
        text: "These two concepts are similar in some ways but different in others. \
               They both share certain characteristics, but each has unique features that make it special.",
    },
    CannedResponse {
        keywords: &["solving", "%"],
        text: "To find 15% of 80, let's break it down step by step. \
               First, remember that 15% means 15 out of 100, or 0.15. \
               Second, multiply 80 by 0.15: 80 × 0.15 = 12. \
               So 15% of 80 is 12.",
    },
    CannedResponse {
        keywords: &["study tip"],
        text: "Here are good study tips for science: \
               First, make connections between new ideas and things you already know. \
               Second, practice explaining concepts in your own words. \
               Third, use drawings and diagrams to help you remember. \
               Finally, ask questions when something doesn't make sense.",
    },
    CannedResponse {
        keywords: &["misconception"],
        text: "I can see why you might think that - it's a common idea. \
               However, let me help clarify this concept. \
               The actual explanation is a bit different, and here's why: \
               Scientific experiments have shown us the real answer.",
    },
    CannedResponse {
        keywords: &["real life", "fraction"],
        text: "Fractions are everywhere in real life! \
               When you eat half a pizza, that's 1/2. \
               When a recipe calls for 3/4 cup of flour, that's a fraction. \
               Even telling time uses fractions - quarter past means 1/4 of an hour.",
    },
    CannedResponse {
        keywords: &["real life"],
        text: "This concept appears in many real-world situations. \
               You might see it when cooking, shopping, playing sports, or using technology. \
               Understanding this helps you solve everyday problems.",
    },
    CannedResponse {
        keywords: &["rain"],
        text: WATER_CYCLE,
    },
    CannedResponse {
        keywords: &["weather"],
        text: WATER_CYCLE,
    },
];

const DEFAULT_RESPONSE: &str = "That's a great question! Let me explain this step by step. \
First, we need to understand the basic idea. \
Then we can look at some examples. \
Finally, we'll see how this connects to what you already know. \
This concept is important because it helps us understand the world around us.";

/// Offline responder answering from a fixed keyword table
#[derive(Debug, Clone, Copy, Default)]
pub struct MockResponder;

impl MockResponder {
    pub fn respond(&self, prompt: &str) -> String {
        let prompt_lower = prompt.to_lowercase();

        CANNED_RESPONSES
            .iter()
            .find(|canned| canned.keywords.iter().all(|k| prompt_lower.contains(k)))
            .map_or(DEFAULT_RESPONSE, |canned| canned.text)
            .to_string()
    }
}

/// Responder backed by an OpenAI-compatible chat completion endpoint, with rate limiting
pub struct OpenAiResponder {
    settings: OpenAiSettings,
    /// Last request time
    last_request: Option<Instant>,
    fallback: MockResponder,
}

impl OpenAiResponder {
    pub fn new(settings: OpenAiSettings) -> Self {
        Self {
            settings,
            last_request: None,
            fallback: MockResponder,
        }
    }

    /// Enforce rate limiting for API requests
    async fn enforce_rate_limit(last_request: &mut Option<Instant>, rate_limit_rps: f64) {
        if rate_limit_rps <= 0.0 {
            return;
        }

        let min_interval = Duration::from_secs_f64(1.0 / rate_limit_rps);

        if let Some(last_time) = *last_request {
            let elapsed = last_time.elapsed();
            if elapsed < min_interval {
                sleep(min_interval - elapsed).await;
            }
        }

        *last_request = Some(Instant::now());
    }

    /// Generate a response, falling back to canned text when configured to
    pub async fn generate(&mut self, prompt: &str) -> Result<String> {
        let outcome = self.request_completion(prompt).await.and_then(|content| {
            let trimmed = content.trim();
            if trimmed.chars().count() < self.settings.min_response_chars {
                anyhow::bail!(
                    "Response too short ({} chars, minimum {})",
                    trimmed.chars().count(),
                    self.settings.min_response_chars
                );
            }
            Ok(trimmed.to_string())
        });

        match outcome {
            Ok(content) => Ok(content),
            Err(err) if self.settings.fallback_to_mock => {
                log::warn!("Generation failed, using canned response: {:#}", err);
                Ok(self.fallback.respond(prompt))
            }
            Err(err) => Err(err),
        }
    }

    async fn request_completion(&mut self, prompt: &str) -> Result<String> {
        Self::enforce_rate_limit(&mut self.last_request, self.settings.rate_limit_rps).await;

        let client = self.create_client()?;
        let request = self.build_request(prompt)?;
        log::debug!("Requesting completion from model {}", self.settings.model);

        let response = client
            .chat()
            .create(request)
            .await
            .context("Failed to generate response")?;

        Ok(Self::extract_content(response))
    }

    /// Create the OpenAI client
    fn create_client(&self) -> Result<Client<OpenAIConfig>> {
        let api_key = std::env::var(&self.settings.env_var_api_key).with_context(|| {
            format!(
                "Environment variable {} not found",
                self.settings.env_var_api_key
            )
        })?;

        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(&self.settings.api_endpoint);

        Ok(Client::with_config(openai_config))
    }

    /// Build the chat completion request
    fn build_request(&self, prompt: &str) -> Result<CreateChatCompletionRequest> {
        let system_message: ChatCompletionRequestMessage =
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.settings.system_prompt.clone())
                .build()
                .context("Failed to build system message")?
                .into();

        let user_message: ChatCompletionRequestMessage =
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.to_string())
                .build()
                .context("Failed to build user message")?
                .into();

        CreateChatCompletionRequestArgs::default()
            .model(&self.settings.model)
            .messages([system_message, user_message])
            .temperature(self.settings.temperature as f32)
            .max_tokens(self.settings.max_tokens)
            .build()
            .context("Failed to build chat completion request")
    }

    fn extract_content(response: CreateChatCompletionResponse) -> String {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default()
    }
}

/// Source of model responses for rendered prompts
pub enum Responder {
    Mock(MockResponder),
    OpenAi(OpenAiResponder),
}

impl Responder {
    pub fn from_config(config: &ResponderConfig) -> Self {
        match config {
            ResponderConfig::Mock => Responder::Mock(MockResponder),
            ResponderConfig::OpenAi(settings) => {
                Responder::OpenAi(OpenAiResponder::new(settings.clone()))
            }
        }
    }

    pub async fn generate(&mut self, prompt: &str) -> Result<String> {
        match self {
            Responder::Mock(mock) => Ok(mock.respond(prompt)),
            Responder::OpenAi(openai) => openai.generate(prompt).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant as TokioInstant;

    fn test_settings(api_endpoint: &str, env_var_api_key: &str) -> OpenAiSettings {
        OpenAiSettings {
            api_endpoint: api_endpoint.to_string(),
            env_var_api_key: env_var_api_key.to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 150,
            rate_limit_rps: 0.0,
            system_prompt: "You are a tutor.".to_string(),
            min_response_chars: 20,
            fallback_to_mock: false,
        }
    }

    fn completion_body(content: &str) -> String {
        serde_json::json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "created": 1_700_000_000u32,
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 30, "total_tokens": 42 }
        })
        .to_string()
    }

    #[test]
    fn test_mock_matches_keywords() {
        let mock = MockResponder;
        let response = mock.respond("Explain Photosynthesis to a 5th grade student");
        assert!(response.starts_with("Plants make food using sunlight"));
    }

    #[test]
    fn test_mock_specific_rules_first() {
        let mock = MockResponder;
        let stepwise = mock.respond("Break down gravity into 3 simple steps");
        assert!(stepwise.starts_with("Step 1: Gravity"));

        let plain = mock.respond("Explain gravity using a simple analogy");
        assert!(plain.starts_with("Gravity is a force"));

        let vocabulary = mock.respond("Define magnificent for 4th grade students");
        assert!(vocabulary.starts_with("Magnificent means"));

        let fractions = mock.respond("Show how fractions applies in real life for 3rd grade students.");
        assert!(fractions.starts_with("Fractions are everywhere"));
    }

    #[test]
    fn test_mock_default_response() {
        let mock = MockResponder;
        assert_eq!(mock.respond("Tell me about volcanoes"), DEFAULT_RESPONSE);
    }

    #[tokio::test]
    async fn test_enforce_rate_limit_no_limit() {
        let mut last_request = None;
        let start = TokioInstant::now();

        OpenAiResponder::enforce_rate_limit(&mut last_request, 0.0).await;

        assert!(start.elapsed() < Duration::from_millis(10));
        assert!(last_request.is_none());
    }

    #[tokio::test]
    async fn test_enforce_rate_limit_with_sleep() {
        let mut last_request = Some(Instant::now());
        let start = TokioInstant::now();

        OpenAiResponder::enforce_rate_limit(&mut last_request, 100.0).await;

        assert!(start.elapsed() >= Duration::from_millis(8));
    }

    #[tokio::test]
    async fn test_openai_missing_env_var() {
        let settings = test_settings("http://127.0.0.1:9", "PROMPT_EVAL_TEST_MISSING_KEY");
        unsafe {
            std::env::remove_var(&settings.env_var_api_key);
        }
        let mut responder = OpenAiResponder::new(settings);

        let result = responder.generate("Explain rain").await;
        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("not found"));
    }

    #[tokio::test]
    async fn test_openai_missing_env_var_falls_back() {
        let mut settings = test_settings("http://127.0.0.1:9", "PROMPT_EVAL_TEST_FALLBACK_KEY");
        settings.fallback_to_mock = true;
        unsafe {
            std::env::remove_var(&settings.env_var_api_key);
        }
        let mut responder = OpenAiResponder::new(settings);

        let response = responder.generate("Why does rain fall?").await.unwrap();
        assert!(response.starts_with("Rain happens because of the water cycle"));
    }

    #[tokio::test]
    async fn test_openai_returns_completion() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body(
                "  Atoms are tiny pieces of matter that make up everything.  ",
            ))
            .create_async()
            .await;

        let settings = test_settings(&server.url(), "PROMPT_EVAL_TEST_KEY_OK");
        unsafe {
            std::env::set_var(&settings.env_var_api_key, "test-key");
        }
        let mut responder = Responder::OpenAi(OpenAiResponder::new(settings));

        let response = responder.generate("Explain atoms").await.unwrap();
        assert_eq!(
            response,
            "Atoms are tiny pieces of matter that make up everything."
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_openai_short_reply_falls_back() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body("Ok."))
            .create_async()
            .await;

        let mut settings = test_settings(&server.url(), "PROMPT_EVAL_TEST_KEY_SHORT");
        settings.fallback_to_mock = true;
        unsafe {
            std::env::set_var(&settings.env_var_api_key, "test-key");
        }
        let mut responder = OpenAiResponder::new(settings);

        let response = responder.generate("Explain atoms").await.unwrap();
        assert!(response.starts_with("Atoms are like tiny building blocks"));
    }

    #[tokio::test]
    async fn test_openai_api_error_without_fallback() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"error": {"message": "bad request", "type": "invalid_request_error", "param": null, "code": null}}"#,
            )
            .create_async()
            .await;

        let settings = test_settings(&server.url(), "PROMPT_EVAL_TEST_KEY_ERR");
        unsafe {
            std::env::set_var(&settings.env_var_api_key, "test-key");
        }
        let mut responder = OpenAiResponder::new(settings);

        let result = responder.generate("Explain atoms").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_responder_mock_variant() {
        let mut responder = Responder::from_config(&ResponderConfig::Mock);
        let response = responder.generate("Compare mammals and reptiles").await.unwrap();
        assert!(response.starts_with("Mammals and reptiles"));
    }
}
