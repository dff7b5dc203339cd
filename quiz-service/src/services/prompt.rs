//! The instruction prompt sent with every generation request.
//!
//! Centralised so the quiz format (question count, option labels, answer
//! marker) is defined in exactly one place and can be inspected by tests.

/// Instruction prompt for multiple-choice question generation.
///
/// The `correct:` label and the a-d option labels are load-bearing: the
/// rendered page and the CLI both show the markdown verbatim, so the format
/// users see is whatever this prompt asks for.
pub const MCQ_PROMPT: &str = "Generate 5 multiple choice questions to test if user has understood the content of this file correctly. Question should have 4 options out of which only one should be correct. Give result in markdown. Place answer below every question with a label correct:. Each options should be in individual lines starting below the question, No * in front of answer please. Options should be labeled as a, b, c, d. Each questions should be labeled as 1, 2, 3, 4, 5.";
