//! Quiz generation and grading.

use crate::error::InferenceError;
use crate::models::GenerationParams;
use crate::summarizer::summary_input;
use crate::traits::TextGenerator;
use regex::Regex;

pub const QUESTIONS_MARKER: &str = "Questions:";

const LEADING_MARKER_PATTERN: &str = r"^[\s\d\-•*.)]+";

pub fn build_challenge_prompt(text: &str, prompt_chars: usize) -> String {
    format!(
        "Based on the following text, generate 3 logic-based or comprehension questions:\n{}\n{QUESTIONS_MARKER}",
        summary_input(text, prompt_chars)
    )
}

/// Pulls question lines out of free-form generated text.
///
/// Reads everything after the last `Questions:` marker (or the whole text
/// when the marker is missing), strips bullets and numbering from each line,
/// drops blank lines and keeps at most `max_questions`. The output is not
/// checked for being actual questions.
#[derive(Debug, Clone)]
pub struct QuestionParser {
    leading_marker: Regex,
    max_questions: usize,
}

impl QuestionParser {
    pub fn new(max_questions: usize) -> Result<Self, regex::Error> {
        Ok(Self {
            leading_marker: Regex::new(LEADING_MARKER_PATTERN)?,
            max_questions,
        })
    }

    pub fn parse(&self, generated: &str) -> Vec<String> {
        let tail = generated
            .rsplit_once(QUESTIONS_MARKER)
            .map_or(generated, |(_, after)| after);

        tail.trim()
            .lines()
            .map(|line| self.leading_marker.replace(line, "").trim().to_string())
            .filter(|line| !line.is_empty())
            .take(self.max_questions)
            .collect()
    }
}

pub async fn generate_questions<G: TextGenerator + ?Sized>(
    generator: &G,
    parser: &QuestionParser,
    text: &str,
    prompt_chars: usize,
    params: &GenerationParams,
) -> Result<Vec<String>, InferenceError> {
    let prompt = build_challenge_prompt(text, prompt_chars);
    let generated = generator.generate(&prompt, params).await?;
    Ok(parser.parse(&generated))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grade {
    pub correct: bool,
    pub feedback: String,
}

/// Case-insensitive containment of the trimmed user answer in the model's
/// answer. A blank answer is contained in every model answer.
pub fn grade_answer(user_answer: &str, model_answer: &str) -> Grade {
    let expected = user_answer.trim().to_lowercase();
    let correct = model_answer.to_lowercase().contains(&expected);

    let feedback = if correct {
        "Correct".to_string()
    } else {
        format!("Not quite. Correct answer is: '{model_answer}'")
    };

    Grade { correct, feedback }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct EchoGenerator {
        continuation: &'static str,
    }

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate(
            &self,
            prompt: &str,
            _params: &GenerationParams,
        ) -> Result<String, InferenceError> {
            Ok(format!("{prompt}{}", self.continuation))
        }
    }

    fn parser() -> QuestionParser {
        QuestionParser::new(3).expect("pattern compiles")
    }

    #[test]
    fn prompt_embeds_the_leading_text() {
        let text = "a".repeat(1_000);
        let prompt = build_challenge_prompt(&text, 800);

        assert!(prompt.starts_with("Based on the following text, generate 3"));
        assert!(prompt.ends_with("\nQuestions:"));
        assert!(prompt.contains(&format!("\n{}\n", "a".repeat(800))));
        assert!(!prompt.contains(&"a".repeat(801)));
    }

    #[test]
    fn numbered_and_bulleted_lines_are_cleaned() {
        let raw = "prompt text\nQuestions:\n1. What is AI?\n\n- How does ML learn?\n• Why automate?\n4) Extra one?";
        assert_eq!(
            parser().parse(raw),
            vec!["What is AI?", "How does ML learn?", "Why automate?"]
        );
    }

    #[test]
    fn last_marker_wins() {
        let raw = "Questions: ignored\nQuestions:\n  What changed in 2023?  ";
        assert_eq!(parser().parse(raw), vec!["What changed in 2023?"]);
    }

    #[test]
    fn missing_marker_uses_whole_text() {
        let raw = "Who wrote it?\n2.\nWhen?";
        assert_eq!(parser().parse(raw), vec!["Who wrote it?", "When?"]);
    }

    #[test]
    fn degenerate_output_returns_fewer_questions() {
        assert!(parser().parse("Questions:\n\n  \n- \n3.").is_empty());
    }

    #[tokio::test]
    async fn generation_parses_the_continuation() {
        let generator = EchoGenerator {
            continuation: "\n1. What is the main topic?\n2. Who benefits?",
        };
        let params = GenerationParams {
            max_new_tokens: 300,
            do_sample: true,
        };

        let questions = generate_questions(&generator, &parser(), "Some document.", 800, &params)
            .await
            .expect("questions");

        assert_eq!(questions, vec!["What is the main topic?", "Who benefits?"]);
    }

    #[test]
    fn substring_answers_are_correct() {
        let grade = grade_answer("  Machine LEARNING ", "machine learning is a subset of AI");
        assert!(grade.correct);
        assert_eq!(grade.feedback, "Correct");
    }

    #[test]
    fn wrong_answers_show_the_model_answer() {
        let grade = grade_answer("robots", "a subset of AI");
        assert!(!grade.correct);
        assert!(grade.feedback.contains("'a subset of AI'"));
    }

    #[test]
    fn blank_answers_are_contained_in_any_answer() {
        let grade = grade_answer("   ", "anything");
        assert!(grade.correct);
        assert_eq!(grade.feedback, "Correct");
        assert!(grade_answer("", "").correct);
    }
}
