//! Score table and aggregation.
//!
//! Every (question, option) pair in the catalog has exactly one entry in the
//! score table, carrying a point value and a feedback line. Category totals
//! are always recomputed from the full [`ResponseSet`], so changing an answer
//! never counts twice.
//!
//! ```text
//! percentage = round(100 * total_xp / (question_count * MAX_POINTS))
//! level      = 5 (>=90) | 4 (>=75) | 3 (>=60) | 2 (>=45) | 1
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::{self, Category};
use crate::error::ScoringError;
use crate::responses::ResponseSet;

/// Highest point value a single answer can earn.
pub const MAX_POINTS: u32 = 10;

/// Point tier of an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Low,
    Fair,
    Good,
    Best,
}

impl Tier {
    pub const fn points(self) -> u32 {
        match self {
            Tier::Low => 1,
            Tier::Fair => 4,
            Tier::Good => 7,
            Tier::Best => 10,
        }
    }
}

/// One row of the score table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreEntry {
    pub question_id: u32,
    pub answer: &'static str,
    pub tier: Tier,
    pub feedback: &'static str,
}

const fn entry(
    question_id: u32,
    answer: &'static str,
    tier: Tier,
    feedback: &'static str,
) -> ScoreEntry {
    ScoreEntry {
        question_id,
        answer,
        tier,
        feedback,
    }
}

use Tier::{Best, Fair, Good, Low};

static SCORE_TABLE: [ScoreEntry; 56] = [
    // 1. learning
    entry(1, "Daily", Best, "A daily learning habit compounds faster than anything else you can do."),
    entry(1, "A few times a week", Good, "Solid rhythm. Anchoring it to a fixed time would make it daily."),
    entry(1, "A few times a month", Fair, "Learning happens, but in bursts. Try 15 minutes a day."),
    entry(1, "Rarely", Low, "Start small: one chapter or one lesson this week."),
    // 2. focus
    entry(2, "Daily", Best, "Daily deep work is a rare edge. Protect it."),
    entry(2, "A few times a week", Good, "Good focus habits. Block the same hours every day."),
    entry(2, "A few times a month", Fair, "Distractions are winning most days. Try one phone-free hour."),
    entry(2, "Rarely", Low, "Begin with a single 25 minute block with notifications off."),
    // 3. stress
    entry(3, "I stay calm and solve the problem", Best, "Strong composure under pressure."),
    entry(3, "I recover after a short while", Good, "Healthy resilience. Breathing drills can shorten the dip."),
    entry(3, "It throws me off for the day", Fair, "A short reset routine can stop one bad moment ruining a day."),
    entry(3, "It overwhelms me", Low, "Stress is running the show. Start with sleep and a daily walk."),
    // 4. reflection
    entry(4, "Daily", Best, "Daily reflection keeps your goals in front of you."),
    entry(4, "Weekly", Good, "A weekly review is a great cadence. Keep it written."),
    entry(4, "Monthly", Fair, "Monthly check-ins let drift build up. Try a Sunday review."),
    entry(4, "Rarely", Low, "Write down three goals today and revisit them on Sunday."),
    // 5. exercise
    entry(5, "Daily", Best, "Daily movement is the foundation of everything else."),
    entry(5, "3-5 times a week", Good, "Great consistency. Recovery days count too."),
    entry(5, "1-2 times a week", Fair, "A good start. Add one more session this week."),
    entry(5, "Rarely", Low, "A 20 minute walk every day is the easiest first step."),
    // 6. sleep
    entry(6, "7-9 hours", Best, "You are giving your body the recovery it needs."),
    entry(6, "6-7 hours", Good, "Close. Moving bedtime 30 minutes earlier would help."),
    entry(6, "5-6 hours", Fair, "Chronic short sleep erodes focus and mood."),
    entry(6, "Less than 5 hours", Low, "Sleep is your biggest lever right now. Fix it first."),
    // 7. diet
    entry(7, "Mostly whole foods", Best, "Your nutrition is working for you."),
    entry(7, "Balanced with occasional treats", Good, "A sustainable balance. Keep treats occasional."),
    entry(7, "Often processed or fast food", Fair, "Swap one processed meal a day for a whole-food one."),
    entry(7, "I don't pay attention to it", Low, "Start by noticing what you eat for one week."),
    // 8. hydration
    entry(8, "8+ glasses", Best, "Well hydrated."),
    entry(8, "5-7 glasses", Good, "Nearly there. Keep a bottle within reach."),
    entry(8, "2-4 glasses", Fair, "Mild dehydration saps energy. Add a glass with every meal."),
    entry(8, "Less than 2 glasses", Low, "Drink a glass of water first thing every morning."),
    // 9. stillness
    entry(9, "Daily", Best, "A daily practice of stillness grounds everything else."),
    entry(9, "A few times a week", Good, "Good practice. Pair it with an existing habit to make it daily."),
    entry(9, "Occasionally", Fair, "Try five quiet minutes after waking."),
    entry(9, "Never", Low, "One minute of slow breathing is enough to begin."),
    // 10. gratitude
    entry(10, "Daily", Best, "Daily gratitude reshapes how you see your day."),
    entry(10, "Weekly", Good, "Nice habit. Writing three things nightly deepens it."),
    entry(10, "Occasionally", Fair, "Gratitude works best as a routine, not a mood."),
    entry(10, "Never", Low, "Tonight, write down one thing that went well."),
    // 11. purpose
    entry(11, "Deeply connected", Best, "A clear sense of purpose is a powerful anchor."),
    entry(11, "Somewhat connected", Good, "You are close. Write down what matters most to you."),
    entry(11, "Still searching", Fair, "Searching is part of it. Notice what energises you."),
    entry(11, "Not at all", Low, "Start by asking what you would do if nobody was watching."),
    // 12. tracking
    entry(12, "Daily", Best, "You know exactly where your money goes."),
    entry(12, "Weekly", Good, "A weekly review keeps spending honest."),
    entry(12, "Monthly", Fair, "Monthly is late enough for leaks to add up."),
    entry(12, "Never", Low, "Look at last month's statement today. Awareness comes first."),
    // 13. saving
    entry(13, "20% or more", Best, "An excellent savings rate."),
    entry(13, "10-20%", Good, "Healthy. Automate it so it grows without effort."),
    entry(13, "Less than 10%", Fair, "Every extra percent matters. Raise it by one this month."),
    entry(13, "Nothing", Low, "Set up an automatic transfer, even a small one."),
    // 14. emergency fund
    entry(14, "6+ months", Best, "A strong safety net."),
    entry(14, "3-6 months", Good, "A solid cushion. Six months gives real freedom."),
    entry(14, "1-2 months", Fair, "Build toward three months before anything else."),
    entry(14, "Less than 1 month", Low, "An emergency fund is your first financial priority."),
];

/// The full score table.
pub fn score_table() -> &'static [ScoreEntry] {
    &SCORE_TABLE
}

/// Exact lookup by question id and option text.
pub fn lookup(question_id: u32, answer: &str) -> Result<&'static ScoreEntry, ScoringError> {
    SCORE_TABLE
        .iter()
        .find(|e| e.question_id == question_id && e.answer == answer)
        .ok_or_else(|| ScoringError::Unscored {
            question_id,
            answer: answer.to_string(),
        })
}

pub fn points_for(question_id: u32, answer: &str) -> Result<u32, ScoringError> {
    lookup(question_id, answer).map(|e| e.tier.points())
}

pub fn feedback_for(question_id: u32, answer: &str) -> Result<&'static str, ScoringError> {
    lookup(question_id, answer).map(|e| e.feedback)
}

/// Accumulated points per category.
///
/// Always holds an entry for every category, starting at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryXp(BTreeMap<Category, u32>);

impl Default for CategoryXp {
    fn default() -> Self {
        Self(Category::ALL.into_iter().map(|c| (c, 0)).collect())
    }
}

impl CategoryXp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute totals from the final response set.
    pub fn from_responses(responses: &ResponseSet) -> Result<Self, ScoringError> {
        let mut xp = Self::new();
        for response in responses.iter() {
            let question = catalog::question(response.question_id)
                .ok_or(ScoringError::UnknownQuestion(response.question_id))?;
            let points = points_for(response.question_id, &response.answer)?;
            xp.add(question.category, points);
        }
        Ok(xp)
    }

    pub fn add(&mut self, category: Category, points: u32) {
        *self.0.entry(category).or_insert(0) += points;
    }

    pub fn get(&self, category: Category) -> u32 {
        self.0.get(&category).copied().unwrap_or(0)
    }

    /// (category, points) in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, u32)> + '_ {
        Category::ALL.into_iter().map(|c| (c, self.get(c)))
    }

    pub fn total(&self) -> u32 {
        total_xp(self)
    }

    pub fn strongest(&self) -> Category {
        strongest_category(self)
    }

    pub fn weakest(&self) -> Category {
        weakest_category(self)
    }
}

pub fn total_xp(xp: &CategoryXp) -> u32 {
    xp.iter().map(|(_, p)| p).sum()
}

/// Share of the maximum achievable points, rounded half-up to an integer.
pub fn percentage(total_xp: u32, question_count: usize) -> u32 {
    let max = question_count as f64 * MAX_POINTS as f64;
    if max == 0.0 {
        return 0;
    }
    (100.0 * total_xp as f64 / max).round() as u32
}

/// Result level, 1 through 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Level(u8);

impl Level {
    pub fn value(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lower bound of each level band, highest first. Boundaries belong to the
/// higher band.
const LEVEL_BANDS: [(u32, u8); 4] = [(90, 5), (75, 4), (60, 3), (45, 2)];

pub fn level(percentage: u32) -> Level {
    let value = LEVEL_BANDS
        .iter()
        .find(|(min, _)| percentage >= *min)
        .map(|(_, lvl)| *lvl)
        .unwrap_or(1);
    Level(value)
}

/// Category with the most points; ties go to the earliest declared.
pub fn strongest_category(xp: &CategoryXp) -> Category {
    pick_category(xp, |candidate, best| candidate > best)
}

/// Category with the fewest points; ties go to the earliest declared.
pub fn weakest_category(xp: &CategoryXp) -> Category {
    pick_category(xp, |candidate, best| candidate < best)
}

fn pick_category(xp: &CategoryXp, better: impl Fn(u32, u32) -> bool) -> Category {
    let mut best = (Category::ALL[0], xp.get(Category::ALL[0]));
    for (category, points) in xp.iter().skip(1) {
        if better(points, best.1) {
            best = (category, points);
        }
    }
    best.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::questions;
    use crate::responses::Response;
    use proptest::prelude::*;

    #[test]
    fn every_catalog_option_has_exactly_one_entry() {
        for q in questions() {
            for option in q.options {
                let hits = score_table()
                    .iter()
                    .filter(|e| e.question_id == q.id && e.answer == option)
                    .count();
                assert_eq!(hits, 1, "question {} option '{}'", q.id, option);
                assert!(!feedback_for(q.id, option).unwrap().is_empty());
            }
        }
    }

    #[test]
    fn table_has_no_entries_outside_the_catalog() {
        for e in score_table() {
            let q = catalog::question(e.question_id).expect("entry for unknown question");
            assert!(q.has_option(e.answer), "stray entry {} '{}'", e.question_id, e.answer);
        }
    }

    #[test]
    fn each_question_spans_all_tiers() {
        for q in questions() {
            let mut points: Vec<u32> = q.options.iter().map(|o| points_for(q.id, o).unwrap()).collect();
            points.sort();
            assert_eq!(points, vec![1, 4, 7, 10], "question {}", q.id);
        }
    }

    #[test]
    fn lookup_miss_is_an_error() {
        assert_eq!(
            points_for(1, "Sometimes"),
            Err(ScoringError::Unscored {
                question_id: 1,
                answer: "Sometimes".into()
            })
        );
        assert!(points_for(99, "Daily").is_err());
    }

    #[test]
    fn level_band_boundaries() {
        assert_eq!(level(100).value(), 5);
        assert_eq!(level(90).value(), 5);
        assert_eq!(level(89).value(), 4);
        assert_eq!(level(75).value(), 4);
        assert_eq!(level(74).value(), 3);
        assert_eq!(level(60).value(), 3);
        assert_eq!(level(59).value(), 2);
        assert_eq!(level(45).value(), 2);
        assert_eq!(level(44).value(), 1);
        assert_eq!(level(0).value(), 1);
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(140, 14), 100);
        assert_eq!(percentage(0, 14), 0);
        // 14 * 10 = 140, 100 * 71 / 140 = 50.71
        assert_eq!(percentage(71, 14), 51);
        // 100 * 1 / 40 = 2.5
        assert_eq!(percentage(1, 4), 3);
        assert_eq!(percentage(10, 0), 0);
    }

    #[test]
    fn ties_resolve_to_declaration_order() {
        let xp = CategoryXp::new();
        assert_eq!(strongest_category(&xp), Category::Mental);
        assert_eq!(weakest_category(&xp), Category::Mental);

        let mut xp = CategoryXp::new();
        xp.add(Category::Physical, 10);
        xp.add(Category::Financial, 10);
        assert_eq!(strongest_category(&xp), Category::Physical);
        assert_eq!(weakest_category(&xp), Category::Mental);

        xp.add(Category::Mental, 10);
        xp.add(Category::Spiritual, 10);
        assert_eq!(strongest_category(&xp), Category::Mental);
    }

    #[test]
    fn changing_an_answer_does_not_double_count() {
        let mut responses = ResponseSet::new();
        responses.record(Response::new(1, "Daily"));
        responses.record(Response::new(1, "Rarely"));

        let xp = CategoryXp::from_responses(&responses).unwrap();
        assert_eq!(xp.get(Category::Mental), 1);
        assert_eq!(xp.total(), 1);
    }

    #[test]
    fn best_answers_everywhere_reach_level_five() {
        let responses: ResponseSet = questions()
            .iter()
            .map(|q| Response::new(q.id, q.options[0]))
            .collect();
        let xp = CategoryXp::from_responses(&responses).unwrap();
        let total = total_xp(&xp);
        assert_eq!(total, 140);
        assert_eq!(percentage(total, questions().len()), 100);
        assert_eq!(level(percentage(total, questions().len())).value(), 5);
    }

    #[test]
    fn unknown_question_in_responses_is_reported() {
        let responses: ResponseSet = vec![Response::new(42, "Daily")].into();
        assert_eq!(
            CategoryXp::from_responses(&responses),
            Err(ScoringError::UnknownQuestion(42))
        );
    }

    proptest! {
        #[test]
        fn level_is_monotonic(a in 0u32..=100, b in 0u32..=100) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(level(lo) <= level(hi));
            prop_assert!((1..=5).contains(&level(a).value()));
        }

        #[test]
        fn percentage_is_monotonic_in_one_category(
            base in proptest::collection::vec(0u32..=40, 4),
            idx in 0usize..4,
            extra in 0u32..=40,
        ) {
            let mut xp = CategoryXp::new();
            for (c, p) in Category::ALL.into_iter().zip(base.iter()) {
                xp.add(c, *p);
            }
            let before = percentage(total_xp(&xp), 14);
            xp.add(Category::ALL[idx], extra);
            let after = percentage(total_xp(&xp), 14);
            prop_assert!(after >= before);
        }
    }
}
