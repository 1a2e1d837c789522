use std::sync::Arc;

use bot_logging::{bot_info, bot_warn};
use quote_core::{
    update, Effect, GeneratorSettings, GeneratorState, Msg, Outcome, Rejection, UniqueQuote,
};
use thiserror::Error;

use crate::openai::TextGenerator;
use crate::GenerationError;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("text generation failed: {0}")]
    GenerationFailed(GenerationError),
    #[error("no unique quote after {attempts} attempts")]
    GenerationExhausted {
        attempts: u32,
        last_rejection: Option<Rejection>,
    },
}

/// Runs the generate → check → retry loop against a text collaborator.
pub struct UniqueContentGenerator {
    text: Arc<dyn TextGenerator>,
    settings: GeneratorSettings,
}

impl UniqueContentGenerator {
    pub fn new(text: Arc<dyn TextGenerator>, settings: GeneratorSettings) -> Self {
        Self { text, settings }
    }

    /// Produces a quote whose bare text scores below the similarity threshold
    /// against every entry of `history`, plus its image prompt.
    pub async fn generate_unique_quote(
        &self,
        history: Vec<String>,
    ) -> Result<UniqueQuote, GeneratorError> {
        let (mut state, mut effects) =
            update(GeneratorState::new(history, self.settings), Msg::Start);
        let mut description_error = None;

        // The state machine emits at most one request per step.
        while let Some(effect) = effects.pop() {
            let msg = match effect {
                Effect::RequestCandidate { attempt, request } => {
                    bot_info!(
                        "Generating quote candidate {}/{}",
                        attempt,
                        state.settings().max_attempts
                    );
                    match self.text.complete(&request).await {
                        Ok(raw) => Msg::CandidateGenerated(raw),
                        Err(err) => Msg::CandidateFailed(err.to_string()),
                    }
                }
                Effect::RequestDescription { request } => {
                    match self.text.complete(&request).await {
                        Ok(text) => Msg::DescriptionGenerated(text),
                        Err(err) => {
                            let message = err.to_string();
                            description_error = Some(err);
                            Msg::DescriptionFailed(message)
                        }
                    }
                }
            };

            let rejected_before = state.rejections().len();
            let (next, next_effects) = update(state, msg);
            state = next;
            effects = next_effects;
            if let Some(rejection) = state.rejections().get(rejected_before) {
                bot_warn!("Candidate rejected: {}", rejection);
            }
        }

        match state.into_outcome() {
            Some(Outcome::Accepted(quote)) => {
                bot_info!(
                    "Accepted quote after {} attempt(s): {}",
                    quote.attempts,
                    quote.quote_text
                );
                Ok(quote)
            }
            Some(Outcome::Exhausted {
                attempts,
                last_rejection,
            }) => Err(GeneratorError::GenerationExhausted {
                attempts,
                last_rejection,
            }),
            Some(Outcome::Failed { message }) => Err(GeneratorError::GenerationFailed(
                description_error.unwrap_or(GenerationError::Malformed(message)),
            )),
            None => Err(GeneratorError::GenerationFailed(GenerationError::Malformed(
                "generation stopped without an outcome".into(),
            ))),
        }
    }
}
