/// Inputs to the generation state machine, produced by whoever runs its effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Begin the first attempt.
    Start,
    /// The text collaborator answered a candidate request.
    CandidateGenerated(String),
    /// The text collaborator failed a candidate request.
    CandidateFailed(String),
    /// The text collaborator answered the image-description request.
    DescriptionGenerated(String),
    /// The text collaborator failed the image-description request.
    DescriptionFailed(String),
}
