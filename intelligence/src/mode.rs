//! Conversation mode and intent classification shared by L6 and L7.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversationMode {
    Casual,
    Support,
    Educational,
    ProblemSolving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Question,
    SeekingHelp,
    Sharing,
    Venting,
    General,
    Greeting,
}

const SUPPORT_WORDS: &[&str] = &["struggling", "hard time", "support", "help me", "overwhelmed"];
const EDUCATIONAL_WORDS: &[&str] = &["explain", "how does", "what is", "teach me", "learn about"];
const PROBLEM_SOLVING_WORDS: &[&str] = &["fix", "broken", "error", "doesn't work", "not working", "issue", "problem", "bug"];
const GREETING_WORDS: &[&str] = &["hello", "hi ", "hey", "good morning", "good evening"];
const SEEKING_HELP_WORDS: &[&str] = &["help", "can you", "could you", "please assist"];
const VENTING_WORDS: &[&str] = &["so frustrated", "i hate", "fed up", "sick of", "nothing is working"];

/// Deterministic rule-based classification, matching the heuristics used at
/// session init and re-applied per turn by the context-switch detector.
pub fn classify_mode(message: &str) -> ConversationMode {
    let lower = message.to_lowercase();
    if PROBLEM_SOLVING_WORDS.iter().any(|w| lower.contains(w)) {
        ConversationMode::ProblemSolving
    } else if SUPPORT_WORDS.iter().any(|w| lower.contains(w)) {
        ConversationMode::Support
    } else if EDUCATIONAL_WORDS.iter().any(|w| lower.contains(w)) {
        ConversationMode::Educational
    } else {
        ConversationMode::Casual
    }
}

pub fn classify_intent(message: &str) -> Intent {
    let lower = message.to_lowercase();
    if GREETING_WORDS.iter().any(|w| lower.contains(w)) && lower.len() < 30 {
        Intent::Greeting
    } else if VENTING_WORDS.iter().any(|w| lower.contains(w)) {
        Intent::Venting
    } else if SEEKING_HELP_WORDS.iter().any(|w| lower.contains(w)) {
        Intent::SeekingHelp
    } else if lower.trim_end().ends_with('?') || lower.starts_with("what") || lower.starts_with("how") || lower.starts_with("why") {
        Intent::Question
    } else if lower.starts_with('i') || lower.contains("i feel") || lower.contains("i've been") {
        Intent::Sharing
    } else {
        Intent::General
    }
}

/// Fixed pairwise distance matrix between conversation modes, used to decide
/// whether a recomputed mode counts as a context switch.
pub fn mode_distance(a: ConversationMode, b: ConversationMode) -> f32 {
    use ConversationMode::*;
    if a == b {
        return 0.0;
    }
    match (a, b) {
        (Casual, Support) | (Support, Casual) => 0.6,
        (Casual, Educational) | (Educational, Casual) => 0.5,
        (Casual, ProblemSolving) | (ProblemSolving, Casual) => 0.7,
        (Support, Educational) | (Educational, Support) => 0.6,
        (Support, ProblemSolving) | (ProblemSolving, Support) => 0.4,
        (Educational, ProblemSolving) | (ProblemSolving, Educational) => 0.5,
        _ => 0.5,
    }
}
