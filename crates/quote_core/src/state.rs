use std::fmt;

use crate::extract::extract_quote;
use crate::prompts::MAX_DISPLAY_CHARS;
use crate::similarity::{max_similarity, DEFAULT_SIMILARITY_THRESHOLD};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorSettings {
    /// Scores at or above this (0..=100) reject a candidate.
    pub similarity_threshold: u8,
    /// Candidate requests allowed before giving up. Always at least 1.
    pub max_attempts: u32,
    pub max_display_chars: usize,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_display_chars: MAX_DISPLAY_CHARS,
        }
    }
}

/// One generated candidate: the raw post text and the quote pulled out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateQuote {
    pub raw: String,
    pub extracted: String,
}

impl CandidateQuote {
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into().trim().to_string();
        let extracted = extract_quote(&raw);
        Self { raw, extracted }
    }
}

/// Why a candidate attempt did not produce an accepted quote.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    EmptyQuote,
    TooLong { chars: usize, max: usize },
    Similar { score: f64, matched: String },
    GenerationError(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::EmptyQuote => write!(f, "no quoted text found"),
            Rejection::TooLong { chars, max } => {
                write!(f, "post too long ({chars} chars, max {max})")
            }
            Rejection::Similar { score, matched } => {
                write!(f, "similar to previous quote ({score:.1}): {matched}")
            }
            Rejection::GenerationError(message) => write!(f, "generation error: {message}"),
        }
    }
}

/// The accepted result of a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueQuote {
    /// Full post text as generated (quote, attribution, hashtags).
    pub display_text: String,
    /// The bare quote used for duplicate detection and history.
    pub quote_text: String,
    pub image_prompt: String,
    pub attempts: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Accepted(UniqueQuote),
    Exhausted {
        attempts: u32,
        last_rejection: Option<Rejection>,
    },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Phase {
    Idle,
    Generating,
    Describing { accepted: CandidateQuote },
    Done,
}

/// State of a single `generate_unique_quote` run.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorState {
    settings: GeneratorSettings,
    history: Vec<String>,
    attempts: u32,
    rejections: Vec<Rejection>,
    pub(crate) phase: Phase,
    outcome: Option<Outcome>,
}

impl GeneratorState {
    /// `history` is a read-only snapshot, most recent first.
    pub fn new(history: Vec<String>, settings: GeneratorSettings) -> Self {
        let settings = GeneratorSettings {
            max_attempts: settings.max_attempts.max(1),
            similarity_threshold: settings.similarity_threshold.min(100),
            ..settings
        };
        Self {
            settings,
            history,
            attempts: 0,
            rejections: Vec::new(),
            phase: Phase::Idle,
            outcome: None,
        }
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Candidate requests issued so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn rejections(&self) -> &[Rejection] {
        &self.rejections
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn into_outcome(self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Accepts or rejects a candidate against the length limit and the history.
    pub fn check(&self, candidate: &CandidateQuote) -> Result<(), Rejection> {
        if candidate.extracted.is_empty() {
            return Err(Rejection::EmptyQuote);
        }

        let chars = candidate.raw.chars().count();
        if chars > self.settings.max_display_chars {
            return Err(Rejection::TooLong {
                chars,
                max: self.settings.max_display_chars,
            });
        }

        let threshold = f64::from(self.settings.similarity_threshold);
        match max_similarity(&candidate.extracted, self.history.iter().map(String::as_str)) {
            Some((score, matched)) if score >= threshold => Err(Rejection::Similar {
                score,
                matched: matched.to_string(),
            }),
            _ => Ok(()),
        }
    }

    pub(crate) fn can_retry(&self) -> bool {
        self.attempts < self.settings.max_attempts
    }

    pub(crate) fn next_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.phase = Phase::Generating;
        self.attempts
    }

    pub(crate) fn push_rejection(&mut self, rejection: Rejection) {
        self.rejections.push(rejection);
    }

    pub(crate) fn finish(&mut self, outcome: Outcome) {
        self.phase = Phase::Done;
        self.outcome = Some(outcome);
    }
}
