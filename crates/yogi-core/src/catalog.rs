//! Static question catalog.
//!
//! Questions are grouped by [`Category`] and presented in catalog order:
//! every question of a category forms one contiguous section, and sections
//! follow category declaration order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Life domain a question belongs to.
///
/// Declaration order is significant: it is the section order and the
/// tie-break order for strongest/weakest category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Mental,
    Physical,
    Spiritual,
    Financial,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Mental,
        Category::Physical,
        Category::Spiritual,
        Category::Financial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Mental => "Mental",
            Category::Physical => "Physical",
            Category::Spiritual => "Spiritual",
            Category::Financial => "Financial",
        }
    }

    /// Zero-based position in declaration order.
    pub fn index(&self) -> usize {
        match self {
            Category::Mental => 0,
            Category::Physical => 1,
            Category::Spiritual => 2,
            Category::Financial => 3,
        }
    }

    /// One-line blurb shown on the section intro screen.
    pub fn tagline(&self) -> &'static str {
        match self {
            Category::Mental => "How you learn, focus, and handle pressure.",
            Category::Physical => "How you move, rest, eat, and hydrate.",
            Category::Spiritual => "How you find stillness, gratitude, and purpose.",
            Category::Financial => "How you track, save, and protect your money.",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: u32,
    pub category: Category,
    pub text: &'static str,
    /// Exclusive choices in display order.
    pub options: [&'static str; 4],
}

impl Question {
    /// Whether `answer` is exactly one of this question's options.
    pub fn has_option(&self, answer: &str) -> bool {
        self.options.contains(&answer)
    }

    /// Resolve user input to an option: a 1-based index or the option text,
    /// compared case-insensitively.
    pub fn match_option(&self, input: &str) -> Option<&'static str> {
        let input = input.trim();
        if let Ok(n) = input.parse::<usize>() {
            return n.checked_sub(1).and_then(|i| self.options.get(i)).copied();
        }
        self.options
            .iter()
            .find(|o| o.eq_ignore_ascii_case(input))
            .copied()
    }
}

const FREQUENCY: [&str; 4] = ["Daily", "A few times a week", "A few times a month", "Rarely"];

static QUESTIONS: [Question; 14] = [
    // Mental
    Question {
        id: 1,
        category: Category::Mental,
        text: "How often do you set aside time to learn something new?",
        options: FREQUENCY,
    },
    Question {
        id: 2,
        category: Category::Mental,
        text: "How often do you do focused work without distractions?",
        options: FREQUENCY,
    },
    Question {
        id: 3,
        category: Category::Mental,
        text: "How do you handle stress when things go wrong?",
        options: [
            "I stay calm and solve the problem",
            "I recover after a short while",
            "It throws me off for the day",
            "It overwhelms me",
        ],
    },
    Question {
        id: 4,
        category: Category::Mental,
        text: "How often do you reflect on your goals and progress?",
        options: ["Daily", "Weekly", "Monthly", "Rarely"],
    },
    // Physical
    Question {
        id: 5,
        category: Category::Physical,
        text: "How often do you exercise for at least 30 minutes?",
        options: ["Daily", "3-5 times a week", "1-2 times a week", "Rarely"],
    },
    Question {
        id: 6,
        category: Category::Physical,
        text: "How much sleep do you get on a typical night?",
        options: ["7-9 hours", "6-7 hours", "5-6 hours", "Less than 5 hours"],
    },
    Question {
        id: 7,
        category: Category::Physical,
        text: "How would you describe your diet?",
        options: [
            "Mostly whole foods",
            "Balanced with occasional treats",
            "Often processed or fast food",
            "I don't pay attention to it",
        ],
    },
    Question {
        id: 8,
        category: Category::Physical,
        text: "How much water do you drink in a day?",
        options: ["8+ glasses", "5-7 glasses", "2-4 glasses", "Less than 2 glasses"],
    },
    // Spiritual
    Question {
        id: 9,
        category: Category::Spiritual,
        text: "How often do you meditate, pray, or practice stillness?",
        options: ["Daily", "A few times a week", "Occasionally", "Never"],
    },
    Question {
        id: 10,
        category: Category::Spiritual,
        text: "How often do you practice gratitude?",
        options: ["Daily", "Weekly", "Occasionally", "Never"],
    },
    Question {
        id: 11,
        category: Category::Spiritual,
        text: "How connected do you feel to a sense of purpose?",
        options: [
            "Deeply connected",
            "Somewhat connected",
            "Still searching",
            "Not at all",
        ],
    },
    // Financial
    Question {
        id: 12,
        category: Category::Financial,
        text: "How often do you track your spending?",
        options: ["Daily", "Weekly", "Monthly", "Never"],
    },
    Question {
        id: 13,
        category: Category::Financial,
        text: "How much of your income do you save or invest?",
        options: ["20% or more", "10-20%", "Less than 10%", "Nothing"],
    },
    Question {
        id: 14,
        category: Category::Financial,
        text: "How many months of expenses could your savings cover?",
        options: ["6+ months", "3-6 months", "1-2 months", "Less than 1 month"],
    },
];

/// All questions in presentation order.
pub fn questions() -> &'static [Question] {
    &QUESTIONS
}

/// Questions of one category, in presentation order.
pub fn questions_in(category: Category) -> impl Iterator<Item = &'static Question> {
    QUESTIONS.iter().filter(move |q| q.category == category)
}

/// Categories in section order.
pub fn categories() -> &'static [Category] {
    &Category::ALL
}

pub fn question(id: u32) -> Option<&'static Question> {
    QUESTIONS.iter().find(|q| q.id == id)
}

pub fn question_count() -> usize {
    QUESTIONS.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<u32> = questions().iter().map(|q| q.id).collect();
        assert_eq!(ids.len(), questions().len());
    }

    #[test]
    fn sections_are_contiguous_and_in_category_order() {
        let order: Vec<Category> = questions().iter().map(|q| q.category).collect();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(order, sorted);
        for category in categories() {
            assert!(questions_in(*category).count() > 0, "{category} has no questions");
        }
    }

    #[test]
    fn options_within_a_question_are_distinct() {
        for q in questions() {
            let set: HashSet<&str> = q.options.iter().copied().collect();
            assert_eq!(set.len(), 4, "question {} repeats an option", q.id);
        }
    }

    #[test]
    fn match_option_accepts_index_and_text() {
        let q = question(5).unwrap();
        assert_eq!(q.match_option("1"), Some("Daily"));
        assert_eq!(q.match_option("4"), Some("Rarely"));
        assert_eq!(q.match_option("0"), None);
        assert_eq!(q.match_option("5"), None);
        assert_eq!(q.match_option(" 3-5 TIMES A WEEK "), Some("3-5 times a week"));
        assert_eq!(q.match_option("sometimes"), None);
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("spiritual".parse::<Category>(), Ok(Category::Spiritual));
        assert!("emotional".parse::<Category>().is_err());
    }
}
