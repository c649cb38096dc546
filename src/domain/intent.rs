use serde::Serialize;

/// Topic of a chatbot message, decided by keyword matching only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    AnxietyHelp,
    Meditation,
    Breathing,
    Stress,
    Sleep,
    Crisis,
    Fallback,
}

/// Whole words that signal a crisis. Matched as words, not substrings, so
/// "diet" or "weekend" do not trip them.
const CRISIS_WORDS: [&str; 10] = [
    "suicide",
    "suicidal",
    "kill",
    "die",
    "harm",
    "hurt",
    "crisis",
    "emergency",
    "overdose",
    "self-harm",
];

/// "end" on its own is far too common to be a keyword
const CRISIS_PHRASES: [&str; 3] = ["end it all", "end my life", "want to end it"];

/// Checked in order; the first intent with a matching word prefix wins.
const TOPICS: [(Intent, &[&str]); 6] = [
    (Intent::AnxietyHelp, &["anxi", "panic", "worry", "worried"]),
    (Intent::Meditation, &["meditat", "mindful"]),
    (Intent::Stress, &["stress", "overwhelm"]),
    (Intent::Breathing, &["breath"]),
    (Intent::Sleep, &["sleep", "insomnia"]),
    (Intent::Greeting, &["hi", "hello", "hey", "greetings"]),
];

impl Intent {
    /// Crisis keywords take priority over every other topic.
    pub fn classify(message: &str) -> Self {
        let message = message.to_lowercase();
        if contains_crisis_keywords(&message) {
            return Self::Crisis;
        }
        let words: Vec<&str> = words(&message).collect();
        TOPICS
            .iter()
            .find(|(intent, stems)| {
                words.iter().any(|w| match intent {
                    // greetings are short; only exact words count
                    Intent::Greeting => stems.contains(w),
                    _ => stems.iter().any(|s| w.starts_with(s)),
                })
            })
            .map(|(intent, _)| *intent)
            .unwrap_or(Self::Fallback)
    }
}

pub fn contains_crisis_keywords(message: &str) -> bool {
    let message = message.to_lowercase();
    words(&message).any(|w| CRISIS_WORDS.contains(&w))
        || CRISIS_PHRASES.iter().any(|p| message.contains(p))
}

// hyphens are kept so that "self-harm" stays one word
fn words(message: &str) -> impl Iterator<Item = &str> {
    message
        .split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .filter(|w| !w.is_empty())
}
