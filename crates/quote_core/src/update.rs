use crate::extract::truncate_chars;
use crate::prompts::{candidate_request, description_request, MAX_IMAGE_PROMPT_CHARS};
use crate::state::Phase;
use crate::{CandidateQuote, Effect, GeneratorState, Msg, Outcome, Rejection, UniqueQuote};

/// Pure update function: applies a message to state and returns any effects.
///
/// Messages that do not fit the current phase are ignored. Every candidate
/// request increments the attempt counter and no request is issued once
/// `max_attempts` is reached, so a run always terminates.
pub fn update(mut state: GeneratorState, msg: Msg) -> (GeneratorState, Vec<Effect>) {
    let effects = match (msg, state.phase.clone()) {
        (Msg::Start, Phase::Idle) => vec![request_candidate(&mut state)],
        (Msg::CandidateGenerated(raw), Phase::Generating) => {
            let candidate = CandidateQuote::from_raw(raw);
            match state.check(&candidate) {
                Ok(()) => {
                    let request = description_request(&candidate.extracted);
                    state.phase = Phase::Describing {
                        accepted: candidate,
                    };
                    vec![Effect::RequestDescription { request }]
                }
                Err(rejection) => reject(&mut state, rejection),
            }
        }
        (Msg::CandidateFailed(message), Phase::Generating) => {
            reject(&mut state, Rejection::GenerationError(message))
        }
        (Msg::DescriptionGenerated(text), Phase::Describing { accepted }) => {
            let prompt = single_paragraph(&text);
            let image_prompt = truncate_chars(&prompt, MAX_IMAGE_PROMPT_CHARS).to_string();
            let attempts = state.attempts();
            state.finish(Outcome::Accepted(UniqueQuote {
                display_text: accepted.raw,
                quote_text: accepted.extracted,
                image_prompt,
                attempts,
            }));
            Vec::new()
        }
        (Msg::DescriptionFailed(message), Phase::Describing { .. }) => {
            state.finish(Outcome::Failed { message });
            Vec::new()
        }
        _ => Vec::new(),
    };

    (state, effects)
}

fn request_candidate(state: &mut GeneratorState) -> Effect {
    let attempt = state.next_attempt();
    Effect::RequestCandidate {
        attempt,
        request: candidate_request(state.history()),
    }
}

fn reject(state: &mut GeneratorState, rejection: Rejection) -> Vec<Effect> {
    state.push_rejection(rejection.clone());
    if state.can_retry() {
        return vec![request_candidate(state)];
    }
    let attempts = state.attempts();
    state.finish(Outcome::Exhausted {
        attempts,
        last_rejection: Some(rejection),
    });
    Vec::new()
}

fn single_paragraph(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
