//! Quote core: duplicate detection, history window and the pure generation state machine.
mod effect;
mod extract;
mod history;
mod msg;
mod prompts;
mod similarity;
mod state;
mod update;

pub use effect::Effect;
pub use extract::{extract_quote, strip_hashtags, truncate_chars};
pub use history::{HistoryWindow, QuoteRecord, DEFAULT_HISTORY_CAPACITY};
pub use msg::Msg;
pub use prompts::{
    candidate_request, description_request, ChatMessage, CompletionRequest, Role,
    CANDIDATE_TEMPERATURE, DESCRIPTION_MAX_TOKENS, DESCRIPTION_TEMPERATURE,
    EXAMPLE_IMAGE_PROMPTS, MAX_DISPLAY_CHARS, MAX_IMAGE_PROMPT_CHARS,
};
pub use similarity::{max_similarity, token_set_ratio, DEFAULT_SIMILARITY_THRESHOLD};
pub use state::{
    CandidateQuote, GeneratorSettings, GeneratorState, Outcome, Rejection, UniqueQuote,
    DEFAULT_MAX_ATTEMPTS,
};
pub use update::update;
