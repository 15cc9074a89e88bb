use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Course-level default used wherever a caller does not override the
/// passing threshold.
pub const DEFAULT_PASSING_SCORE: u32 = 70;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    Employee,
    Candidate,
    Client,
    Mixed,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub audience: Audience,
    #[serde(default = "default_passing_score")]
    pub passing_score: u32,
    pub active: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_passing_score() -> u32 {
    DEFAULT_PASSING_SCORE
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LessonType {
    Video,
    Document,
    Article,
    Interactive,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub course_id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub lesson_type: LessonType,
    pub duration: Option<u32>, // minutes
    pub order: u32,            // 1-based sequence position
    pub required: bool,
}

/// Question kinds the grader understands. Anything else coming off the
/// wire lands on `Unknown` and is graded incorrect rather than failing
/// deserialization.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    TrueFalse,
    Text,
    #[serde(other)]
    Unknown,
}

/// A submitted or expected answer: a boolean, free text, or a choice list.
/// `true_false` questions require the `Bool` variant exactly; the string
/// "true" deserializes as `Text` and never matches a boolean key.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Text(String),
    Choices(Vec<String>),
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Bool(b) => write!(f, "{}", b),
            AnswerValue::Text(s) => write!(f, "{}", s),
            AnswerValue::Choices(c) => write!(f, "{}", c.join(", ")),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: AnswerValue,
    pub points: u32,
    pub explanation: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: String,
    pub course_id: Uuid,
    pub lesson_id: Option<String>,
    pub title: String,
    pub questions: Vec<Question>,
    pub time_limit: Option<u32>, // minutes
    pub attempts: Option<u32>,   // max retakes, None = unlimited
    #[serde(default)]
    pub randomize_questions: bool,
    #[serde(default)]
    pub show_results: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgress {
    pub lesson_id: String,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub quiz_id: String,
    pub attempt_number: u32,
    pub score: u32,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub answers: HashMap<String, AnswerValue>,
}

/// One learner bound to one course. Exactly one of `user_id`,
/// `candidate_id`, `account_id` is populated; the backend that creates
/// assignments enforces that, this crate only reads it.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: Uuid,
    pub course_id: Uuid,
    pub user_id: Option<String>,
    pub candidate_id: Option<String>,
    pub account_id: Option<String>,
    pub status: AssignmentStatus,
    pub progress_pct: u32,
    pub score: Option<u32>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub lesson_progress: Vec<LessonProgress>,
    #[serde(default)]
    pub quiz_attempts: Vec<QuizAttempt>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_id: String,
    pub correct: bool,
    pub points_possible: u32,
    pub points_earned: u32,
    pub submitted: Option<AnswerValue>,
    pub correct_answer: AnswerValue,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GradingResult {
    pub total_points: u32,
    pub earned_points: u32,
    pub percentage: u32,
    pub passed: bool,
    pub question_results: Vec<QuestionResult>,
    pub time_spent: Option<i64>, // minutes
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CertificateData {
    pub assignment_id: Uuid,
    pub course_name: String,
    pub learner_name: String,
    pub completion_date: DateTime<Utc>,
    pub score: Option<u32>,
    pub instructor_name: Option<String>,
    pub organization_name: Option<String>,
    pub certificate_id: Option<String>,
}
