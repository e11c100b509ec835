//! Keyword-driven offline provider for demos and cache testing

use super::CustomBinding;

pub const DUMMY_PROVIDER_NAME: &str = "dummy";
pub const DUMMY_PROVIDER_LABEL: &str = "Dummy LLM for Cache Testing";

/// (keywords, canned answer); the first entry with a matching keyword wins
const CANNED_ANSWERS: &[(&[&str], &str)] = &[
    (&["machine learning"], "Machine learning is a subset of AI that learns patterns from data."),
    (&["guido", "1991"], "Python was created by Guido van Rossum in 1991."),
    (&["indentation"], "Python uses indentation to define code blocks."),
    (&["lists", "mutable"], "Python lists are mutable."),
    (&["yield", "generator"], "Python generators use the 'yield' keyword."),
    (&["pip", "package manager"], "Python's package manager is pip."),
    (&["india", "new delhi"], "India's capital is New Delhi."),
    (&["japan", "tokyo"], "Japan's capital is Tokyo."),
    (&["france", "paris"], "France's capital is Paris."),
    (&["australia", "canberra"], "Australia's capital is Canberra."),
    (&["brazil", "brasilia"], "Brazil's capital is Brasília."),
];

/// Answer for a query, ignoring any context
pub fn dummy_answer(query: &str) -> String {
    let lowered = query.to_lowercase();

    CANNED_ANSWERS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(*k)))
        .map(|(_, answer)| answer.to_string())
        .unwrap_or_else(|| format!("Dummy response for: '{}'", query))
}

pub fn dummy_binding() -> CustomBinding {
    CustomBinding::function(|query, _context| Ok(dummy_answer(query)))
}
