//! Scripted support chatbot: canned replies keyed by `Intent`.
//!
//! There is no dialogue state; every message is classified on its own.

use chrono::Local;
use chrono::Timelike;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::Intent;
use crate::welcome_email::SITE_URL;

/// Longest message accepted by `POST /chatbot`, in characters
pub const MAX_MESSAGE_LENGTH: usize = 1000;

/// Longest excerpt of a message that may end up in the logs
const LOG_EXCERPT_LENGTH: usize = 200;

const CRISIS_LINES: &str = "\
📞 988 Suicide & Crisis Lifeline: call or text 988 (24/7)
📱 Crisis Text Line: text HOME to 741741
🏥 Emergency services: call 911 or go to your nearest emergency room
💙 SAMHSA National Helpline: 1-800-662-4357";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub intent: Intent,
    pub reply: String,
}

impl ChatReply {
    pub fn to(message: &str) -> Self {
        let intent = Intent::classify(message);
        Self {
            intent,
            reply: reply(intent, message, Local::now().hour()),
        }
    }
}

/// `hour` is the local hour of day, used to pick a greeting.
pub fn reply(
    intent: Intent,
    message: &str,
    hour: u32,
) -> String {
    let message = message.to_lowercase();
    match intent {
        Intent::Greeting => format!(
            "{} Welcome to TranquilMindQuest! 🌿\n\n\
             I'm here to support your mental wellness journey. I can help you with:\n\n\
             ✓ Anxiety and stress relief\n\
             ✓ Meditation guidance\n\
             ✓ Breathing exercises\n\
             ✓ Sleep\n\
             ✓ Mental health resources\n\n\
             What would you like to explore today?",
            greeting(hour)
        ),
        Intent::AnxietyHelp => {
            let technique = if message.contains("panic") {
                "🚨 PANIC ATTACK TECHNIQUE:\n\
                 1. Find a safe, quiet space\n\
                 2. Use the 5-4-3-2-1 grounding technique:\n   \
                 • 5 things you can see\n   \
                 • 4 things you can touch\n   \
                 • 3 things you can hear\n   \
                 • 2 things you can smell\n   \
                 • 1 thing you can taste"
            } else {
                "🌬️ QUICK BREATHING EXERCISE:\n\
                 1. Breathe in slowly for 4 counts\n\
                 2. Hold for 4 counts\n\
                 3. Breathe out for 4 counts\n\
                 4. Repeat 3-5 times"
            };
            format!(
                "I understand anxiety can feel overwhelming. Let's take a moment together.\n\n\
                 {technique}\n\n\
                 Would you like me to guide you through more techniques?\n\n\
                 Visit our anxiety resources: {SITE_URL}/about#anxiety\n\n\
                 If you need immediate support, please call the National Crisis Hotline: 988"
            )
        }
        Intent::Meditation => format!(
            "Meditation is a wonderful practice for mental wellness! 🧘\n\n\
             Here's how to start:\n\n\
             1. Find a quiet, comfortable spot\n\
             2. Start with just 5 minutes\n\
             3. Focus on your breath\n\
             4. Gently redirect wandering thoughts\n\
             5. Be patient with yourself\n\n\
             Explore our guided meditations: {SITE_URL}/meditation\n\n\
             Would you like a specific type of meditation guidance?"
        ),
        Intent::Breathing => {
            let exercise = if message.contains("box") || message.contains("square") {
                "🌬️ BOX BREATHING:\n\n\
                 1️⃣ Breathe IN through your nose: 1... 2... 3... 4...\n\
                 2️⃣ HOLD: 1... 2... 3... 4...\n\
                 3️⃣ Breathe OUT through your mouth: 1... 2... 3... 4...\n\
                 4️⃣ HOLD: 1... 2... 3... 4...\n\n\
                 🔄 Repeat 3-5 times"
            } else {
                "🌬️ 4-7-8 BREATHING:\n\n\
                 1️⃣ Breathe IN through your nose: 1... 2... 3... 4...\n\
                 2️⃣ HOLD: 1... 2... 3... 4... 5... 6... 7...\n\
                 3️⃣ Breathe OUT through your mouth: 1... 2... 3... 4... 5... 6... 7... 8...\n\n\
                 🔄 Repeat 3-4 times"
            };
            format!(
                "Let's do a breathing exercise together:\n\n\
                 {exercise}\n\n\
                 💡 TIP: Place one hand on your chest, one on your belly. Only the belly hand \
                 should move.\n\n\
                 Learn more breathing techniques: {SITE_URL}/breathing\n\n\
                 How do you feel now?"
            )
        }
        Intent::Stress => format!(
            "I understand stress can be overwhelming. Here are some immediate strategies:\n\n\
             🌿 QUICK STRESS RELIEF:\n\n\
             1. Take 5 deep breaths\n\
             2. Step away from the situation\n\
             3. Drink a glass of water\n\
             4. Stretch your body\n\
             5. Listen to calming music\n\n\
             📚 RESOURCES:\n\
             • Stress management guide: {SITE_URL}/about#stress\n\
             • Mindfulness practices: {SITE_URL}/mindfulness\n\n\
             Would you like specific techniques for your situation?"
        ),
        Intent::Sleep => format!(
            "Sleep issues can significantly impact mental health. Here are some strategies:\n\n\
             • Sleep hygiene: consistent bedtime, cool room, no screens 1 hour before bed\n\
             • Relaxation techniques: progressive muscle relaxation or guided imagery\n\
             • Limit caffeine: avoid caffeine after 2 PM\n\
             • Weighted blankets: can provide comfort and reduce anxiety\n\n\
             Browse sleep aids: {SITE_URL}/products\n\n\
             What specific sleep challenges are you facing?"
        ),
        Intent::Crisis => format!(
            "🆘 IMMEDIATE HELP AVAILABLE:\n\n\
             You don't have to face this alone. Please reach out now:\n\n\
             {CRISIS_LINES}\n\n\
             You matter. Help is available. Please reach out."
        ),
        Intent::Fallback => "I'm not sure I understood that correctly. I can help you with:\n\n\
             • Anxiety & stress management\n\
             • Meditation guidance\n\
             • Breathing exercises\n\
             • Sleep\n\
             • Crisis support\n\n\
             Could you rephrase your question, or choose one of these topics?\n\n\
             For immediate crisis support, call 988."
            .to_string(),
    }
}

fn greeting(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Good morning! ☀️",
        12..=16 => "Good afternoon! 🌤️",
        _ => "Good evening! 🌙",
    }
}

static SSN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("ssn pattern must compile"));
static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}-\d{3}-\d{4}\b").expect("phone pattern must compile"));
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
        .expect("email pattern must compile")
});

/// Mask obvious personal data and cap the length. Only the result of this
/// may be logged.
pub fn sanitize_input(input: &str) -> String {
    let masked = SSN.replace_all(input, "[SSN]");
    let masked = PHONE.replace_all(&masked, "[PHONE]");
    let masked = EMAIL.replace_all(&masked, "[EMAIL]");
    masked.chars().take(LOG_EXCERPT_LENGTH).collect()
}
