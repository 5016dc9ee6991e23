//! Reveal dialogue: AI provider abstraction, prompt building and the markup parser.

#[cfg(feature = "openai")]
pub mod openai;
pub mod parser;

use futures::future::BoxFuture;
use thiserror::Error;

pub use self::parser::parse_dialogue;

/// Result alias for dialogue generation.
pub type AiResult<T> = Result<T, AiError>;

/// One spoken line of the reveal scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueLine {
    /// Speaker name as shown to players.
    pub character: String,
    /// Spoken text without markup.
    pub dialogue: String,
}

impl DialogueLine {
    /// Line spoken by `character`.
    pub fn new(character: impl Into<String>, dialogue: impl Into<String>) -> Self {
        Self {
            character: character.into(),
            dialogue: dialogue.into(),
        }
    }
}

/// Failures raised by text generation backends.
#[derive(Debug, Error)]
pub enum AiError {
    /// Transport failure.
    #[error("dialogue request failed: {message}")]
    Request {
        /// Underlying error text.
        message: String,
    },
    /// Non-success HTTP status.
    #[error("dialogue backend answered with status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },
    /// Body did not match the expected shape.
    #[error("failed to decode dialogue response: {message}")]
    Decode {
        /// Underlying error text.
        message: String,
    },
    /// Response carried no completion.
    #[error("dialogue response contained no choices")]
    EmptyChoices,
    /// Backend enabled without credentials.
    #[error("dialogue backend api key is not configured")]
    MissingApiKey,
}

/// Sends a prompt and returns free-form text.
pub trait AiProvider: Send + Sync {
    /// Complete `prompt`; callers bound the wait themselves.
    fn fetch(&self, prompt: String) -> BoxFuture<'static, AiResult<String>>;
}

const PROMPT_TEMPLATE: &str = r#"You are writing a reveal scene for: {movie}

  Write a dialogue-only scene using this EXACT format:

  **[Character Name]:** *"their dialogue"*
  **[Different Character]:** *"their response"*

  RULES:
  1. Use 2-4 characters from the movie
  2. Each character speaks 1-2 times
  3. Include character catchphrases naturally
  4. Build suspense without saying the movie title
  5. NO actor names, NO spoilers, NO narration, NO movie title
  6. Match the movie's genre/tone
  7. Keep your responses TERSE

  EXAMPLE (for a different movie):
  **Morpheus:** *"What if I told you... we're the ones they chose?"*
  **Trinity:** *"The question isn't how, it's why."*

  NOW write the scene for:"#;

/// Reveal-scene prompt for the winning movie.
pub fn build_reveal_prompt(movie_name: &str) -> String {
    PROMPT_TEMPLATE.replacen("{movie}", movie_name, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_the_movie_once() {
        let prompt = build_reveal_prompt("Heat");
        assert!(prompt.starts_with("You are writing a reveal scene for: Heat\n"));
        assert_eq!(prompt.matches("Heat").count(), 1);
        assert!(prompt.ends_with("NOW write the scene for:"));
    }
}
