use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{
    AnswerValue, GradingResult, Question, QuestionResult, QuestionType, Quiz,
};

/// Fraction of the correct answer's significant words that must overlap the
/// submission for the fuzzy text fallback to accept it.
const FUZZY_WORD_OVERLAP: f64 = 0.7;

/// Grade one quiz submission against the question bank.
///
/// Every question in the quiz is graded; an unanswered question is simply
/// incorrect. Business failure (not passing) is data on the result, never
/// an error.
pub fn grade_quiz(
    quiz: &Quiz,
    answers: &HashMap<String, AnswerValue>,
    passing_score: u32,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
) -> GradingResult {
    let mut total_points: u32 = 0;
    let mut earned_points: u32 = 0;
    let mut question_results = Vec::with_capacity(quiz.questions.len());

    for question in &quiz.questions {
        total_points += question.points;
        let submitted = answers.get(&question.id);
        let correct = match submitted {
            Some(answer) => is_answer_correct(question, answer),
            None => false,
        };
        let points_earned = if correct { question.points } else { 0 };
        earned_points += points_earned;

        question_results.push(QuestionResult {
            question_id: question.id.clone(),
            correct,
            points_possible: question.points,
            points_earned,
            submitted: submitted.cloned(),
            correct_answer: question.correct_answer.clone(),
        });
    }

    let percentage = if total_points > 0 {
        ((earned_points as f64 / total_points as f64) * 100.0).round() as u32
    } else {
        0
    };

    let time_spent = match (start_time, end_time) {
        (Some(start), Some(end)) => {
            Some(((end - start).num_milliseconds() as f64 / 60_000.0).round() as i64)
        }
        _ => None,
    };

    GradingResult {
        total_points,
        earned_points,
        percentage,
        passed: percentage >= passing_score,
        question_results,
        time_spent,
    }
}

fn is_answer_correct(question: &Question, submitted: &AnswerValue) -> bool {
    match question.question_type {
        QuestionType::SingleChoice => match (submitted, &question.correct_answer) {
            (AnswerValue::Text(s), AnswerValue::Text(c)) => s.trim() == c.trim(),
            _ => false,
        },
        QuestionType::MultipleChoice => match (submitted, &question.correct_answer) {
            (AnswerValue::Choices(s), AnswerValue::Choices(c)) => choice_sets_equal(s, c),
            _ => false,
        },
        // Strict boolean identity: the string "true" is not the boolean true.
        QuestionType::TrueFalse => match (submitted, &question.correct_answer) {
            (AnswerValue::Bool(s), AnswerValue::Bool(c)) => s == c,
            _ => false,
        },
        QuestionType::Text => match (submitted, &question.correct_answer) {
            (AnswerValue::Text(s), AnswerValue::Text(c)) => text_answer_matches(s, c),
            _ => false,
        },
        QuestionType::Unknown => {
            tracing::warn!(question_id = %question.id, "unknown question type, grading as incorrect");
            false
        }
    }
}

fn choice_sets_equal(submitted: &[String], correct: &[String]) -> bool {
    if submitted.len() != correct.len() {
        return false;
    }
    let mut s: Vec<&str> = submitted.iter().map(|v| v.trim()).collect();
    let mut c: Vec<&str> = correct.iter().map(|v| v.trim()).collect();
    s.sort_unstable();
    c.sort_unstable();
    s == c
}

/// Free-text matching: exact (case/whitespace-insensitive), then substring
/// containment for longer answers, then a fuzzy word-overlap fallback.
fn text_answer_matches(submitted: &str, correct: &str) -> bool {
    let s = submitted.trim().to_lowercase();
    let c = correct.trim().to_lowercase();

    if s == c {
        return true;
    }
    if c.chars().count() > 3 && s.contains(&c) {
        return true;
    }

    let ns = normalize_text(&s);
    let nc = normalize_text(&c);
    if !nc.is_empty() && ns == nc {
        return true;
    }

    if c.chars().count() > 10 {
        let key_words: Vec<&str> = nc.split(' ').filter(|w| w.chars().count() > 2).collect();
        if key_words.is_empty() {
            return false;
        }
        let submitted_words: Vec<&str> = ns.split(' ').filter(|w| !w.is_empty()).collect();
        let hits = key_words
            .iter()
            .filter(|kw| {
                submitted_words
                    .iter()
                    .any(|sw| sw.contains(*kw) || kw.contains(sw))
            })
            .count();
        return hits as f64 / key_words.len() as f64 >= FUZZY_WORD_OVERLAP;
    }

    false
}

// Strip punctuation, collapse runs of whitespace to single spaces.
fn normalize_text(s: &str) -> String {
    let stripped: String = s
        .chars()
        .map(|ch| if ch.is_alphanumeric() { ch } else { ' ' })
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionDifficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct QuestionStats {
    pub question_id: String,
    pub correct_percentage: u32,
    pub difficulty: QuestionDifficulty,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct QuizStatistics {
    pub total_attempts: u32,
    pub average_score: f64,
    pub highest_score: u32,
    pub lowest_score: u32,
    pub pass_rate: f64,
    pub average_time: f64,
    pub question_stats: Vec<QuestionStats>,
}

/// Aggregate a batch of grading results. An empty slice yields the all-zero
/// aggregate, not an error.
pub fn calculate_quiz_statistics(results: &[GradingResult]) -> QuizStatistics {
    if results.is_empty() {
        return QuizStatistics::default();
    }

    let total = results.len() as f64;
    let score_sum: u32 = results.iter().map(|r| r.percentage).sum();
    let highest = results.iter().map(|r| r.percentage).max().unwrap_or(0);
    let lowest = results.iter().map(|r| r.percentage).min().unwrap_or(0);
    let passed = results.iter().filter(|r| r.passed).count() as f64;

    let times: Vec<i64> = results.iter().filter_map(|r| r.time_spent).collect();
    let average_time = if times.is_empty() {
        0.0
    } else {
        (times.iter().sum::<i64>() as f64 / times.len() as f64).round()
    };

    // Per-question tallies, keyed in first-seen order so output is stable.
    let mut order: Vec<String> = Vec::new();
    let mut tallies: HashMap<String, (u32, u32)> = HashMap::new(); // (refs, correct)
    for result in results {
        for qr in &result.question_results {
            let entry = tallies.entry(qr.question_id.clone()).or_insert_with(|| {
                order.push(qr.question_id.clone());
                (0, 0)
            });
            entry.0 += 1;
            if qr.correct {
                entry.1 += 1;
            }
        }
    }

    let question_stats = order
        .into_iter()
        .map(|id| {
            let (refs, correct) = tallies[&id];
            let pct = ((correct as f64 / refs as f64) * 100.0).round() as u32;
            QuestionStats {
                question_id: id,
                correct_percentage: pct,
                difficulty: difficulty_for(pct),
            }
        })
        .collect();

    QuizStatistics {
        total_attempts: results.len() as u32,
        average_score: (score_sum as f64 / total).round(),
        highest_score: highest,
        lowest_score: lowest,
        pass_rate: (passed / total * 100.0).round(),
        average_time,
        question_stats,
    }
}

fn difficulty_for(correct_percentage: u32) -> QuestionDifficulty {
    if correct_percentage >= 80 {
        QuestionDifficulty::Easy
    } else if correct_percentage >= 60 {
        QuestionDifficulty::Medium
    } else {
        QuestionDifficulty::Hard
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct QuestionFeedback {
    pub question_id: String,
    pub feedback: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct QuizFeedback {
    pub overall: String,
    pub question_feedback: Vec<QuestionFeedback>,
    pub recommendations: Vec<String>,
}

/// Learner-facing feedback for a graded attempt: a five-tier overall
/// message, per-question notes for misses, and pacing/retake hints.
pub fn generate_feedback(result: &GradingResult, quiz: &Quiz) -> QuizFeedback {
    let overall = if result.percentage >= 90 {
        "Excellent work! You have mastered this material."
    } else if result.percentage >= 80 {
        "Great job! You have a strong grasp of the material."
    } else if result.passed {
        "Good work! You passed the quiz."
    } else if result.percentage >= 50 {
        "You are close. Review the material and try again."
    } else {
        "Keep going. Review the material thoroughly before your next attempt."
    };

    let mut question_feedback = Vec::new();
    for qr in result.question_results.iter().filter(|qr| !qr.correct) {
        let explanation = quiz
            .questions
            .iter()
            .find(|q| q.id == qr.question_id)
            .and_then(|q| q.explanation.clone());
        let feedback = explanation
            .unwrap_or_else(|| format!("The correct answer was: {}", qr.correct_answer));
        question_feedback.push(QuestionFeedback {
            question_id: qr.question_id.clone(),
            feedback,
        });
    }

    let mut recommendations = Vec::new();
    if !result.passed {
        recommendations
            .push("Review the lessons covered by this quiz before retaking it.".to_string());
    }
    if let (Some(spent), Some(limit)) = (result.time_spent, quiz.time_limit) {
        if spent as f64 > limit as f64 * 0.9 {
            recommendations.push(
                "You used most of the available time. Practice recalling the material more quickly."
                    .to_string(),
            );
        }
    }
    if result.passed && result.percentage < 80 {
        recommendations.push(
            "You passed, but revisiting the weaker topics would deepen your understanding."
                .to_string(),
        );
    }

    QuizFeedback {
        overall: overall.to_string(),
        question_feedback,
        recommendations,
    }
}
