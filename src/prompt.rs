// Prompt assembly for the chat flow

/// Words that mark an input as a resume
pub const RESUME_KEYWORDS: [&str; 7] = [
    "experience",
    "education",
    "skills",
    "projects",
    "certifications",
    "objective",
    "summary",
];

pub const ATS_SYSTEM_PROMPT: &str = "You are an expert ATS analyzer.\n\
Analyze this resume content and provide an ATS score (0-100) with detailed improvement suggestions in plain text.";

pub const ASSISTANT_SYSTEM_PROMPT: &str = "You are a helpful assistant.\n\
Summarize the content or answer user's query in plain text.";

/// How the combined input is presented to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Resume,
    General,
}

impl PromptKind {
    pub fn system_prompt(self) -> &'static str {
        match self {
            PromptKind::Resume => ATS_SYSTEM_PROMPT,
            PromptKind::General => ASSISTANT_SYSTEM_PROMPT,
        }
    }
}

/// Classify input by case-insensitive keyword match
pub fn classify(input: &str) -> PromptKind {
    let lowered = input.to_lowercase();
    if RESUME_KEYWORDS.iter().any(|word| lowered.contains(word)) {
        PromptKind::Resume
    } else {
        PromptKind::General
    }
}

/// System instruction, a blank line, then the input
pub fn build_prompt(input: &str) -> String {
    format!("{}\n\n{}", classify(input).system_prompt(), input)
}
