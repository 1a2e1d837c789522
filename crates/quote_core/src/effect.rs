use crate::CompletionRequest;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Ask for a new quote candidate. `attempt` starts at 1.
    RequestCandidate {
        attempt: u32,
        request: CompletionRequest,
    },
    /// Ask for an image description of the accepted quote.
    RequestDescription { request: CompletionRequest },
}
