//! Keyword-based topic categorization.

use std::fmt;

use serde::Serialize;

/// Closed set of topic categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TopicCategory {
    #[serde(rename = "Social Issues")]
    SocialIssues,
    #[serde(rename = "Economic Issues")]
    EconomicIssues,
    Technology,
    Politics,
    Other,
}

impl TopicCategory {
    pub const ALL: [TopicCategory; 5] = [
        TopicCategory::SocialIssues,
        TopicCategory::EconomicIssues,
        TopicCategory::Technology,
        TopicCategory::Politics,
        TopicCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TopicCategory::SocialIssues => "Social Issues",
            TopicCategory::EconomicIssues => "Economic Issues",
            TopicCategory::Technology => "Technology",
            TopicCategory::Politics => "Politics",
            TopicCategory::Other => "Other",
        }
    }
}

impl fmt::Display for TopicCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const SOCIAL_KEYWORDS: &[&str] = &[
    "society",
    "culture",
    "education",
    "justice",
    "discrimination",
    "rights",
    "equality",
];
const ECONOMIC_KEYWORDS: &[&str] = &[
    "economy",
    "finance",
    "market",
    "business",
    "money",
    "tax",
    "trade",
    "employment",
];
const TECHNOLOGY_KEYWORDS: &[&str] = &[
    "technology",
    "innovation",
    "science",
    "engineering",
    "internet",
];
const POLITICS_KEYWORDS: &[&str] = &[
    "government",
    "policy",
    "election",
    "law",
    "politics",
    "democracy",
];

// Checked in this order; the first set with a hit wins.
const PRIORITY: [(TopicCategory, &[&str]); 4] = [
    (TopicCategory::SocialIssues, SOCIAL_KEYWORDS),
    (TopicCategory::EconomicIssues, ECONOMIC_KEYWORDS),
    (TopicCategory::Technology, TECHNOLOGY_KEYWORDS),
    (TopicCategory::Politics, POLITICS_KEYWORDS),
];

/// Categorizes a text by case-insensitive substring match against fixed
/// keyword sets. Substring means "taxi" matches "tax" and "lawn" matches "law".
pub fn categorize_topic(text: &str) -> TopicCategory {
    let lower = text.to_lowercase();
    PRIORITY
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(TopicCategory::Other)
}
