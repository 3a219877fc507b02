//! Summarization flow.
//!
//! Multi-round conversation with the generation backend: gate the input on a
//! meaning probe (with one correction-check retry), then pick a summarization
//! prompt based on the narrative perspective of the text, then sanity-check
//! the produced summary before returning it.

use tracing::debug;

use notevault_core::Result;

use crate::GenerationBackend;

/// Rejection when the input cannot be salvaged into something summarizable.
pub const INCOHERENT_INPUT_MESSAGE: &str =
    "The provided text cannot be summarized meaningfully. Please provide coherent text.";

/// Rejection when the backend produced an unusable summary.
pub const UNUSABLE_SUMMARY_MESSAGE: &str =
    "The summarization failed to produce meaningful output. Please provide valid and coherent text.";

/// Result of a summarization attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummarizeOutcome {
    /// The backend produced a usable summary.
    Summary(String),
    /// The flow rejected the input or the output; the message is user-facing.
    Rejected(&'static str),
}

fn is_first_person(text: &str) -> bool {
    text.contains(" I ") || text.to_lowercase().starts_with("i ")
}

/// A lowercase "no" anywhere in the reply counts as a refusal. That matches
/// replies like "No." or "no, it does not", and deliberately also trips on
/// words containing "no"; probe prompts ask for a bare yes/no to keep that
/// from mattering in practice.
fn says_no(reply: &str) -> bool {
    reply.to_lowercase().contains("no")
}

/// Run the summarization flow against `backend`.
///
/// Callers validate that `text` is non-empty before calling.
pub async fn summarize(backend: &dyn GenerationBackend, text: &str) -> Result<SummarizeOutcome> {
    let meaning_reply = backend
        .generate(&format!(
            "Does the following text convey meaning, even if it contains grammar or spelling errors? Answer 'yes' or 'no': {}",
            text
        ))
        .await?;

    if says_no(&meaning_reply) {
        let correction_reply = backend
            .generate(&format!(
                "Can the following text be corrected to make sense? Answer 'yes' or 'no': {}",
                text
            ))
            .await?;
        if says_no(&correction_reply) {
            debug!(subsystem = "assist", flow = "summarize", "Input rejected as incoherent");
            return Ok(SummarizeOutcome::Rejected(INCOHERENT_INPUT_MESSAGE));
        }
    }

    let summary_prompt = if is_first_person(text) {
        format!(
            "Act as a professional summarizer. Retain the first-person perspective while condensing: {}",
            text
        )
    } else {
        format!(
            "Act as a professional summarizer. Condense the following text while retaining its essence and correcting grammar and spelling: {}",
            text
        )
    };

    let summary = backend.generate(&summary_prompt).await?;
    let summary = summary.trim().to_string();

    if summary.is_empty() || summary.to_lowercase() == text.to_lowercase() || summary.len() < 3 {
        debug!(subsystem = "assist", flow = "summarize", "Summary rejected as unusable");
        return Ok(SummarizeOutcome::Rejected(UNUSABLE_SUMMARY_MESSAGE));
    }

    Ok(SummarizeOutcome::Summary(summary))
}
