//! Dashboard
//!
//! Canned chat-session listings shown after sign-in. Demo users see a
//! showcase set; everyone else sees two sample conversations.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::User;

/// One row of the session list
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// Session id
    pub id: String,
    /// Title shown in the list
    pub title: String,
    /// Preview of the newest message
    pub last_message: String,
    /// When the session was last used
    pub last_active: DateTime<Utc>,
}

impl SessionSummary {
    fn canned(id: &str, title: &str, last_message: &str, last_active: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            last_message: last_message.to_string(),
            last_active,
        }
    }

    /// How long ago the session was used, e.g. "2 minutes ago"
    #[must_use]
    pub fn relative_label(&self, now: DateTime<Utc>) -> String {
        relative_label(now.signed_duration_since(self.last_active))
    }
}

/// Sessions listed for `user`, newest first
#[must_use]
pub fn sessions_for(user: &User, now: DateTime<Utc>) -> Vec<SessionSummary> {
    if user.is_demo {
        vec![
            SessionSummary::canned(
                "demo-1",
                "🚀 Welcome to Alpha AI!",
                "Hi! I'm Alpha AI, your advanced neural assistant. Ready to explore?",
                now,
            ),
            SessionSummary::canned(
                "demo-2",
                "💼 Business Strategy Analysis",
                "How can I leverage AI to scale my startup exponentially?",
                now - Duration::minutes(2),
            ),
            SessionSummary::canned(
                "demo-3",
                "⚡ Technical Deep Dive",
                "Explain quantum computing and its applications",
                now - Duration::minutes(5),
            ),
        ]
    } else {
        vec![
            SessionSummary::canned(
                "1",
                "Project Alpha Planning",
                "How can I optimize my neural network architecture?",
                now - Duration::hours(2),
            ),
            SessionSummary::canned(
                "2",
                "Advanced AI Research",
                "Help me understand transformer architectures",
                now - Duration::days(1),
            ),
        ]
    }
}

fn relative_label(elapsed: Duration) -> String {
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {unit} ago")
        } else {
            format!("{n} {unit}s ago")
        }
    };

    if elapsed.num_minutes() < 1 {
        "Just now".to_string()
    } else if elapsed.num_hours() < 1 {
        plural(elapsed.num_minutes(), "minute")
    } else if elapsed.num_days() < 1 {
        plural(elapsed.num_hours(), "hour")
    } else {
        plural(elapsed.num_days(), "day")
    }
}
