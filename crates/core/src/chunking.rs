use crate::models::AssistantOptions;

pub const DEFAULT_CHUNK_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    pub max_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_CHUNK_MAX_CHARS,
        }
    }
}

impl From<&AssistantOptions> for ChunkingConfig {
    fn from(value: &AssistantOptions) -> Self {
        Self {
            max_chars: value.chunk_max_chars,
        }
    }
}

/// Trimmed, non-empty paragraphs separated by blank lines.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
        .collect()
}

/// Splits text into retrieval chunks.
///
/// Paragraphs come from blank-line boundaries, falling back to single lines
/// when that yields fewer than two. Paragraphs longer than `max_chars`
/// characters are cut into `max_chars`-sized pieces with the remainder kept
/// as the last piece.
pub fn chunk_text(text: &str, config: ChunkingConfig) -> Vec<String> {
    let mut paragraphs = split_paragraphs(text);
    if paragraphs.len() < 2 {
        paragraphs = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
    }

    let max_chars = config.max_chars.max(1);
    let mut chunks = Vec::with_capacity(paragraphs.len());

    for paragraph in paragraphs {
        let chars: Vec<char> = paragraph.chars().collect();
        if chars.len() <= max_chars {
            chunks.push(paragraph.to_string());
            continue;
        }

        chunks.extend(chars.chunks(max_chars).map(|piece| piece.iter().collect::<String>()));
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_paragraphs_become_chunks() {
        let text = "Artificial Intelligence is transforming industries.\n\n\
                    It includes areas like NLP, computer vision, and robotics.\n\n\
                    Machine learning is a subset of AI that learns patterns from data.\n\n\
                    AI can help automate tasks.";
        let chunks = chunk_text(text, ChunkingConfig::default());
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[2], "Machine learning is a subset of AI that learns patterns from data.");
    }

    #[test]
    fn single_paragraph_falls_back_to_lines() {
        let text = "first line\nsecond line\n\n";
        let chunks = chunk_text(text, ChunkingConfig::default());
        assert_eq!(chunks, vec!["first line", "second line"]);
    }

    #[test]
    fn long_paragraph_is_split_at_the_cap() {
        let config = ChunkingConfig { max_chars: 10 };
        let paragraph = "a".repeat(11);
        let chunks = chunk_text(&format!("{paragraph}\n\nshort"), config);
        assert_eq!(chunks, vec!["a".repeat(10), "a".to_string(), "short".to_string()]);
    }

    #[test]
    fn cap_counts_characters_not_bytes() {
        let config = ChunkingConfig { max_chars: 3 };
        let chunks = chunk_text("éééé", config);
        assert_eq!(chunks, vec!["ééé", "é"]);
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk_text("", ChunkingConfig::default()).is_empty());
        assert!(chunk_text(" \n\n \n", ChunkingConfig::default()).is_empty());
    }

    #[test]
    fn every_chunk_respects_the_cap() {
        let config = ChunkingConfig { max_chars: 7 };
        let text = "one two three four\n\nfive\n\nsix seven eight nine ten";
        for chunk in chunk_text(text, config) {
            assert!(chunk.chars().count() <= 7, "chunk too long: {chunk:?}");
            assert!(!chunk.is_empty());
        }
    }
}
