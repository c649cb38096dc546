use chrono::Datelike;
use chrono::Utc;

use crate::domain::SubscriberName;

pub const SUBJECT: &str = "Welcome to TranquilMindQuest Newsletter! 🧘";

pub const SITE_URL: &str = "https://tranquilmindquest.com";

const TOPICS: [(&str, &str); 5] = [
    ("🔬", "Science-based mental health tips and insights"),
    ("💆", "Guided exercises and mindfulness practices"),
    ("📚", "Curated resources for your wellness journey"),
    ("💡", "Practical strategies for managing stress and anxiety"),
    ("🎯", "Expert advice from mental health professionals"),
];

const INTRO: &str = "Thank you for subscribing to our weekly wellness newsletter! We're \
                     thrilled to have you join our community of individuals committed to \
                     mental wellness and personal growth.";

const PROMISE: &str = "We're committed to providing you with valuable, evidence-based content \
                       that supports your mental wellness journey. We respect your privacy and \
                       promise to never spam you. You can unsubscribe at any time.";

/// The two bodies of a welcome email
pub struct WelcomeEmail {
    pub html: String,
    pub text: String,
}

impl WelcomeEmail {
    pub fn render(name: &SubscriberName) -> Self {
        let year = Utc::now().year();
        Self {
            html: html_body(name.as_ref(), year),
            text: text_body(name.as_ref(), year),
        }
    }
}

fn html_body(
    name: &str,
    year: i32,
) -> String {
    // the name is visitor input
    let name = htmlescape::encode_minimal(name);
    let topics: String = TOPICS
        .iter()
        .map(|(icon, topic)| format!("                <li>{icon} {topic}</li>\n"))
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Welcome to TranquilMindQuest</title>
    <style>
        body {{ margin: 0; padding: 0; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif; line-height: 1.6; color: #333333; background-color: #f4f4f4; }}
        .email-container {{ max-width: 600px; margin: 0 auto; background-color: #ffffff; }}
        .header {{ background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: #ffffff; padding: 40px 30px; text-align: center; }}
        .content {{ padding: 40px 30px; }}
        .button {{ display: inline-block; padding: 14px 32px; background: #667eea; color: #ffffff; text-decoration: none; border-radius: 6px; margin: 30px 0; font-weight: 600; }}
        .footer {{ background-color: #f9f9f9; padding: 30px; text-align: center; border-top: 1px solid #e0e0e0; font-size: 12px; color: #666666; }}
    </style>
</head>
<body>
    <div class="email-container">
        <div class="header">
            <h1>Welcome to TranquilMindQuest! 🧘</h1>
        </div>
        <div class="content">
            <p>Hi {name},</p>
            <p>{INTRO}</p>
            <p><strong>Every week, you'll receive:</strong></p>
            <ul>
{topics}            </ul>
            <p>{PROMISE}</p>
            <div style="text-align: center;">
                <a href="{SITE_URL}" class="button">Explore Our Resources</a>
            </div>
            <p>Stay mindful and take care,<br><strong>The TranquilMindQuest Team</strong></p>
        </div>
        <div class="footer">
            <p><strong>TranquilMindQuest</strong> - Your journey to mental wellness</p>
            <p>
                <a href="{SITE_URL}">Visit our website</a> |
                <a href="{SITE_URL}/privacy.html">Privacy Policy</a> |
                <a href="{SITE_URL}/unsubscribe">Unsubscribe</a>
            </p>
            <p>&copy; {year} TranquilMindQuest. All rights reserved.</p>
        </div>
    </div>
</body>
</html>
"#
    )
}

fn text_body(
    name: &str,
    year: i32,
) -> String {
    let topics: String = TOPICS
        .iter()
        .map(|(_, topic)| format!("- {topic}\n"))
        .collect();
    format!(
        "Welcome to TranquilMindQuest! 🧘

Hi {name},

{INTRO}

Every week, you'll receive:
{topics}
{PROMISE}

Explore our resources: {SITE_URL}

Stay mindful and take care,
The TranquilMindQuest Team

---
TranquilMindQuest - Your journey to mental wellness
Visit: {SITE_URL}
Privacy Policy: {SITE_URL}/privacy.html
Unsubscribe: {SITE_URL}/unsubscribe

© {year} TranquilMindQuest. All rights reserved.
"
    )
}
