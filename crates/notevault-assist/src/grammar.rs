//! Grammar-correction flow.
//!
//! Probe sequence mirrors the summarization flow's gating: sense check with a
//! correction-check retry, then a correctness probe that can short-circuit
//! with "no fix required", then the actual correction round.

use tracing::debug;

use notevault_core::Result;

use crate::GenerationBackend;

/// Rejection when the input cannot be corrected into something sensible.
pub const NONSENSICAL_INPUT_MESSAGE: &str =
    "The provided text is nonsensical or invalid. Please provide meaningful input.";

/// Reply when the text is already correct.
pub const NO_FIX_REQUIRED_MESSAGE: &str = "No fix required!";

/// Result of a grammar check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarOutcome {
    /// The text is already grammatically correct.
    NoFixRequired,
    /// The backend produced a corrected version.
    Corrected(String),
    /// The flow rejected the input; the message is user-facing.
    Rejected(&'static str),
}

fn says_no(reply: &str) -> bool {
    reply.to_lowercase().contains("no")
}

fn says_yes(reply: &str) -> bool {
    reply.to_lowercase().contains("yes")
}

/// Run the grammar-correction flow against `backend`.
///
/// Callers validate that `text` is non-empty before calling.
pub async fn check_grammar(backend: &dyn GenerationBackend, text: &str) -> Result<GrammarOutcome> {
    let sense_reply = backend
        .generate(&format!(
            "Does this text make sense? Answer 'yes' or 'no': {}",
            text
        ))
        .await?;

    if says_no(&sense_reply) {
        let correction_reply = backend
            .generate(&format!(
                "Can this text be corrected to make sense? Answer 'yes' or 'no': {}",
                text
            ))
            .await?;
        if says_no(&correction_reply) {
            debug!(subsystem = "assist", flow = "grammar", "Input rejected as nonsensical");
            return Ok(GrammarOutcome::Rejected(NONSENSICAL_INPUT_MESSAGE));
        }
    }

    let correctness_reply = backend
        .generate(&format!(
            "Is this text grammatically and punctually correct? Answer 'yes' or 'no': {}",
            text
        ))
        .await?;
    if says_yes(&correctness_reply) {
        return Ok(GrammarOutcome::NoFixRequired);
    }

    let corrected = backend
        .generate(&format!("Correct grammar, punctuation, and spelling: {}", text))
        .await?;
    let mut corrected = corrected.trim().to_string();
    if !corrected.ends_with('.') {
        corrected.push('.');
    }

    Ok(GrammarOutcome::Corrected(corrected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockBackend;

    #[tokio::test]
    async fn test_correct_text_needs_no_fix() {
        let backend = MockBackend::new()
            .on("make sense? Answer", "Yes")
            .on("grammatically and punctually correct", "Yes");

        let outcome = check_grammar(&backend, "The cat sat on the mat.").await.unwrap();
        assert_eq!(outcome, GrammarOutcome::NoFixRequired);
    }

    #[tokio::test]
    async fn test_incorrect_text_is_corrected() {
        let backend = MockBackend::new()
            .on("Does this text make sense", "Yes")
            .on("grammatically and punctually correct", "Incorrect")
            .on("Correct grammar", "The cat sat on the mat.");

        let outcome = check_grammar(&backend, "teh cat sat on teh mat").await.unwrap();
        assert_eq!(
            outcome,
            GrammarOutcome::Corrected("The cat sat on the mat.".to_string())
        );
    }

    #[tokio::test]
    async fn test_correction_gains_trailing_period() {
        let backend = MockBackend::new()
            .on("Does this text make sense", "Yes")
            .on("grammatically and punctually correct", "Incorrect")
            .on("Correct grammar", "The cat sat on the mat");

        let outcome = check_grammar(&backend, "teh cat sat on teh mat").await.unwrap();
        assert_eq!(
            outcome,
            GrammarOutcome::Corrected("The cat sat on the mat.".to_string())
        );
    }

    #[tokio::test]
    async fn test_nonsensical_text_rejected() {
        let backend = MockBackend::new()
            .on("Does this text make sense", "No")
            .on("corrected to make sense", "No");

        let outcome = check_grammar(&backend, "zxcv asdf qwer").await.unwrap();
        assert_eq!(outcome, GrammarOutcome::Rejected(NONSENSICAL_INPUT_MESSAGE));
        assert_eq!(backend.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_salvageable_text_continues_to_correction() {
        let backend = MockBackend::new()
            .on("Does this text make sense", "No")
            .on("corrected to make sense", "Yes")
            .on("grammatically and punctually correct", "Incorrect")
            .on("Correct grammar", "Salvaged sentence.");

        let outcome = check_grammar(&backend, "barely sense text").await.unwrap();
        assert_eq!(outcome, GrammarOutcome::Corrected("Salvaged sentence.".to_string()));
        assert_eq!(backend.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let backend = MockBackend::new().failing();
        assert!(check_grammar(&backend, "hello world").await.is_err());
    }
}
