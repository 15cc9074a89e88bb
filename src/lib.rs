//! Training-progress and quiz-grading engine for the LearnPath LMS.
//!
//! Three pure, stateless components over a shared data model:
//! [`grader`] scores quiz submissions, [`progress`] derives completion
//! metrics and pacing insights, and [`certificate`] gates and renders
//! completion certificates. Nothing here performs I/O or keeps state
//! between calls; the surrounding service owns persistence and transport.

pub mod certificate;
pub mod config;
pub mod grader;
pub mod models;
pub mod progress;

pub use certificate::{
    create_shareable_data, generate_certificate_id, generate_html, generate_verification_data,
    validate_certificate_requirements, CertificateTemplate, CertificateValidation, PageLayout,
    ShareableData, TemplateKind, VerificationData,
};
pub use config::{ConfigError, VerificationConfig};
pub use grader::{
    calculate_quiz_statistics, generate_feedback, grade_quiz, QuestionDifficulty, QuizFeedback,
    QuizStatistics,
};
pub use models::{
    AnswerValue, Assignment, AssignmentStatus, Audience, CertificateData, Course, GradingResult,
    Lesson, LessonProgress, LessonType, Question, QuestionResult, QuestionType, Quiz, QuizAttempt,
    DEFAULT_PASSING_SCORE,
};
pub use progress::{
    calculate_course_progress, calculate_time_remaining, calculate_time_spent,
    calculate_weighted_progress, derive_assignment_state, estimate_completion_date,
    learning_velocity, next_lesson, progress_insights, should_mark_complete, Pace,
    ProgressInsights,
};
