// Assistant catalog - the static table of themed assistants
//
// Each topic maps to one backend route under /api/chatbots/. The table is
// read-only and defined at compile time: adding an assistant is a data edit
// here, not a new code path in the API client.

use std::fmt;

/// Closed enumeration of backend topics
///
/// The API client resolves the route from this enum, so an unknown topic
/// cannot be dispatched - it fails at the parse boundary instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicId {
    Medical,
    MentalHealth,
    Education,
    Finance,
    Legal,
    Career,
    Developer,
    Entertainment,
    /// Fallback assistant for anything that doesn't fit a specialty
    General,
}

impl TopicId {
    /// All topics, in catalog display order
    pub const ALL: [TopicId; 9] = [
        TopicId::Medical,
        TopicId::MentalHealth,
        TopicId::Education,
        TopicId::Finance,
        TopicId::Legal,
        TopicId::Career,
        TopicId::Developer,
        TopicId::Entertainment,
        TopicId::General,
    ];

    /// Backend path segment: POST /api/chatbots/<path>
    pub fn path(&self) -> &'static str {
        match self {
            TopicId::Medical => "medical",
            TopicId::MentalHealth => "mental-health",
            TopicId::Education => "education",
            TopicId::Finance => "finance",
            TopicId::Legal => "legal",
            TopicId::Career => "career",
            TopicId::Developer => "developer",
            TopicId::Entertainment => "entertainment",
            TopicId::General => "general",
        }
    }

    /// Parse a topic id string (the same form as the backend path)
    pub fn parse(s: &str) -> Option<TopicId> {
        TopicId::ALL.iter().copied().find(|t| t.path() == s)
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Semantic accent color for a topic, resolved to a concrete color by the theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorToken {
    Red,
    Violet,
    Blue,
    Green,
    Amber,
    Indigo,
    Pink,
    Orange,
    Slate,
}

/// Static descriptor for one themed assistant
#[derive(Debug)]
pub struct Topic {
    pub id: TopicId,
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub color: ColorToken,
    pub icon: &'static str,
    pub features: &'static [&'static str],
}

/// The full assistant catalog, in display order
pub const CATALOG: &[Topic] = &[
    Topic {
        id: TopicId::Medical,
        name: "Medical Assistant",
        description: "Medical information and health advice from a specialized assistant.",
        category: "Health & Wellness",
        color: ColorToken::Red,
        icon: "🏥",
        features: &["Symptom Analysis", "Treatment Info", "Drug Interactions"],
    },
    Topic {
        id: TopicId::MentalHealth,
        name: "Mental Health Support",
        description: "Emotional support and mental wellness guidance.",
        category: "Health & Wellness",
        color: ColorToken::Violet,
        icon: "🧠",
        features: &["Stress Management", "Mindfulness", "Coping Strategies"],
    },
    Topic {
        id: TopicId::Education,
        name: "Education Tutor",
        description: "Learning assistance and academic help across subjects.",
        category: "Learning & Development",
        color: ColorToken::Blue,
        icon: "📚",
        features: &["All Subjects", "Homework Help", "Exam Prep"],
    },
    Topic {
        id: TopicId::Finance,
        name: "Financial Advisor",
        description: "Financial planning advice and money management tips.",
        category: "Finance & Business",
        color: ColorToken::Green,
        icon: "💰",
        features: &["Investment Tips", "Budget Planning", "Tax Advice"],
    },
    Topic {
        id: TopicId::Legal,
        name: "Legal Assistant",
        description: "Legal information and guidance for various situations.",
        category: "Professional Services",
        color: ColorToken::Amber,
        icon: "⚖️",
        features: &["Contract Review", "Legal Research", "Compliance"],
    },
    Topic {
        id: TopicId::Career,
        name: "Career Coach",
        description: "Career advice, job search help, and professional guidance.",
        category: "Professional Services",
        color: ColorToken::Indigo,
        icon: "💼",
        features: &["Resume Building", "Interview Prep", "Career Planning"],
    },
    Topic {
        id: TopicId::Developer,
        name: "Developer Helper",
        description: "Programming assistance and development guidance.",
        category: "Technology",
        color: ColorToken::Pink,
        icon: "💻",
        features: &["Code Review", "Debugging", "Best Practices"],
    },
    Topic {
        id: TopicId::Entertainment,
        name: "Entertainment Guide",
        description: "Personalized movie, TV, game, and event recommendations.",
        category: "Entertainment",
        color: ColorToken::Orange,
        icon: "🎮",
        features: &["Movie Recs", "Game Reviews", "Event Planning"],
    },
    Topic {
        id: TopicId::General,
        name: "General Assistant",
        description: "A general-purpose assistant for everything else.",
        category: "General",
        color: ColorToken::Slate,
        icon: "💬",
        features: &["Open Questions", "Everyday Help"],
    },
];

/// Look up the static descriptor for a topic id
pub fn topic(id: TopicId) -> &'static Topic {
    // CATALOG covers every TopicId variant, so this cannot fail
    CATALOG
        .iter()
        .find(|t| t.id == id)
        .expect("catalog entry missing for topic")
}

/// Distinct categories in catalog order, for the filter bar
pub fn categories() -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    for t in CATALOG {
        if !out.contains(&t.category) {
            out.push(t.category);
        }
    }
    out
}

/// Category filter for the catalog view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(&'static str),
}

/// Filter the catalog by category and search text
///
/// A topic matches if the category filter is `All` or equals the topic's
/// category, AND the search text is empty or a case-insensitive substring of
/// the name, description, or any feature tag. Matches keep catalog order.
pub fn filter_topics(filter: CategoryFilter, search: &str) -> Vec<&'static Topic> {
    let needle = search.trim().to_lowercase();

    CATALOG
        .iter()
        .filter(|t| match filter {
            CategoryFilter::All => true,
            CategoryFilter::Category(c) => t.category == c,
        })
        .filter(|t| {
            if needle.is_empty() {
                return true;
            }
            t.name.to_lowercase().contains(&needle)
                || t.description.to_lowercase().contains(&needle)
                || t.features
                    .iter()
                    .any(|f| f.to_lowercase().contains(&needle))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_topic_has_a_catalog_entry() {
        for id in TopicId::ALL {
            assert_eq!(topic(id).id, id);
        }
        assert_eq!(CATALOG.len(), TopicId::ALL.len());
    }

    #[test]
    fn parse_round_trips_paths() {
        for id in TopicId::ALL {
            assert_eq!(TopicId::parse(id.path()), Some(id));
        }
        assert_eq!(TopicId::parse("astrology"), None);
        assert_eq!(TopicId::parse(""), None);
    }

    #[test]
    fn unfiltered_catalog_is_identity() {
        // All + empty search returns the full table in original order
        let result = filter_topics(CategoryFilter::All, "");
        assert_eq!(result.len(), CATALOG.len());
        for (got, want) in result.iter().zip(CATALOG.iter()) {
            assert_eq!(got.id, want.id);
        }
    }

    #[test]
    fn category_filter_narrows() {
        let result = filter_topics(CategoryFilter::Category("Health & Wellness"), "");
        let ids: Vec<TopicId> = result.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![TopicId::Medical, TopicId::MentalHealth]);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        // Name match
        let by_name = filter_topics(CategoryFilter::All, "LEGAL");
        assert!(by_name.iter().any(|t| t.id == TopicId::Legal));

        // Feature tag match
        let by_feature = filter_topics(CategoryFilter::All, "debugging");
        assert_eq!(by_feature.len(), 1);
        assert_eq!(by_feature[0].id, TopicId::Developer);

        // Description match
        let by_desc = filter_topics(CategoryFilter::All, "wellness guidance");
        assert!(by_desc.iter().any(|t| t.id == TopicId::MentalHealth));
    }

    #[test]
    fn search_combines_with_category() {
        // "interview" exists only under Professional Services
        let hit = filter_topics(CategoryFilter::Category("Professional Services"), "interview");
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].id, TopicId::Career);

        let miss = filter_topics(CategoryFilter::Category("Technology"), "interview");
        assert!(miss.is_empty());
    }

    #[test]
    fn no_match_returns_empty() {
        assert!(filter_topics(CategoryFilter::All, "quantum chromodynamics").is_empty());
    }

    #[test]
    fn categories_are_distinct_and_ordered() {
        let cats = categories();
        assert_eq!(cats[0], "Health & Wellness");
        let mut dedup = cats.clone();
        dedup.dedup();
        assert_eq!(cats, dedup);
    }
}
