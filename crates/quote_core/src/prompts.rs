use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A text-generation request, independent of any vendor wire format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

pub const CANDIDATE_TEMPERATURE: f32 = 0.7;
pub const DESCRIPTION_TEMPERATURE: f32 = 0.8;
pub const DESCRIPTION_MAX_TOKENS: u32 = 150;

/// Longest prompt the image endpoint accepts.
pub const MAX_IMAGE_PROMPT_CHARS: usize = 1000;

/// Longest post the microblog accepts.
pub const MAX_DISPLAY_CHARS: usize = 280;

const PERSONA: &str = "You are a helpful assistant.";

const QUOTE_INSTRUCTION: &str = "Provide an existing quote from a well-known developer or tech figure, \
along with their name. Put the quote itself in double quotes. Include a maximum of 1-2 related \
hashtags. Keep your copy short and sweet and feel free to add an emoji or a touch of sass or \
silliness. Your post can contain up to 280 characters maximum, formatted starting with the quote \
followed by the name and be conversational at the end. Do not repeat any of the previous quotes.";

/// Calibration examples shown to the model when it writes an image prompt.
pub const EXAMPLE_IMAGE_PROMPTS: &[&str] = &[
    "A lone lighthouse built from stacked circuit boards on a basalt cliff at dusk, its beam \
     splitting into streams of glowing binary over a violet sea, painted in the style of \
     a romantic-era oil landscape.",
    "An enormous library whose shelves spiral up into the clouds, every book a miniature \
     city at night, a small robot on a rolling ladder reaching for the brightest one, soft \
     volumetric light, isometric illustration.",
    "A gardener in a greenhouse pruning a bonsai tree whose branches are tangled network \
     cables, tiny fiber-optic blossoms glowing at each tip, morning mist, watercolor with \
     ink outlines.",
    "Two hands made of origami paper passing a single glowing seed across a chessboard \
     floating in deep space, nebulae reflected on the glossy squares, surreal photorealism.",
];

/// Messages for one candidate attempt, seeded with the history for in-context avoidance.
pub fn candidate_request(history: &[String]) -> CompletionRequest {
    let mut messages = vec![ChatMessage::new(Role::System, PERSONA)];
    if !history.is_empty() {
        messages.push(ChatMessage::new(
            Role::Assistant,
            format!("Here are some previous quotes:\n{}", history.join("\n")),
        ));
    }
    messages.push(ChatMessage::new(Role::User, QUOTE_INSTRUCTION));

    CompletionRequest {
        messages,
        temperature: CANDIDATE_TEMPERATURE,
        max_tokens: None,
    }
}

/// Messages asking for a text-free image description of an accepted quote.
pub fn description_request(quote_text: &str) -> CompletionRequest {
    let examples = EXAMPLE_IMAGE_PROMPTS
        .iter()
        .enumerate()
        .map(|(i, example)| format!("{}. {}", i + 1, example))
        .collect::<Vec<_>>()
        .join("\n");

    let instruction = format!(
        "Imagine a vivid and intricate visual representation deeply inspired by the quote \
         \"{quote_text}\". Use concrete adjectives, locations or artistic styles, and feel free \
         to add surreal or fantastical elements. The image must contain absolutely NO text, \
         letters or captions. Answer with a single paragraph of at most {MAX_IMAGE_PROMPT_CHARS} \
         characters and no line breaks.\n\nHere are examples of the kind of description \
         wanted:\n{examples}"
    );

    CompletionRequest {
        messages: vec![
            ChatMessage::new(Role::System, PERSONA),
            ChatMessage::new(Role::User, instruction),
        ],
        temperature: DESCRIPTION_TEMPERATURE,
        max_tokens: Some(DESCRIPTION_MAX_TOKENS),
    }
}
