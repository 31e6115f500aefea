use crate::error::InferenceError;
use crate::models::SummaryParams;
use crate::traits::Summarizer;

/// First `max_chars` characters of `text`. Anything past the cut is not
/// summarized.
pub fn summary_input(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_offset, _)) => &text[..byte_offset],
        None => text,
    }
}

pub async fn generate_summary<S: Summarizer + ?Sized>(
    summarizer: &S,
    text: &str,
    max_input_chars: usize,
    params: &SummaryParams,
) -> Result<String, InferenceError> {
    let input = summary_input(text, max_input_chars);
    if input.trim().is_empty() {
        return Ok(String::new());
    }

    summarizer.summarize(input, params).await
}
