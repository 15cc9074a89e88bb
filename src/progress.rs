use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::{Assignment, AssignmentStatus, Lesson, LessonProgress, Quiz, QuizAttempt};

fn completed_ids(progress: &[LessonProgress]) -> HashSet<&str> {
    progress
        .iter()
        .filter(|p| p.completed)
        .map(|p| p.lesson_id.as_str())
        .collect()
}

/// Completion percentage over the lesson set, restricted to required
/// lessons unless `required_only` is false. Empty relevant set is 0.
pub fn calculate_course_progress(
    lessons: &[Lesson],
    progress: &[LessonProgress],
    required_only: bool,
) -> u32 {
    let done = completed_ids(progress);
    let relevant: Vec<&Lesson> = lessons
        .iter()
        .filter(|l| !required_only || l.required)
        .collect();
    if relevant.is_empty() {
        return 0;
    }
    let completed = relevant
        .iter()
        .filter(|l| done.contains(l.id.as_str()))
        .count();
    ((completed as f64 / relevant.len() as f64) * 100.0).round() as u32
}

/// Like `calculate_course_progress` but weights each lesson by its
/// duration; lessons without a duration count as weight 1.
pub fn calculate_weighted_progress(
    lessons: &[Lesson],
    progress: &[LessonProgress],
    required_only: bool,
) -> u32 {
    let done = completed_ids(progress);
    let mut total = 0.0;
    let mut completed = 0.0;
    for lesson in lessons.iter().filter(|l| !required_only || l.required) {
        let weight = lesson.duration.unwrap_or(1) as f64;
        total += weight;
        if done.contains(lesson.id.as_str()) {
            completed += weight;
        }
    }
    if total == 0.0 {
        return 0;
    }
    ((completed / total) * 100.0).round() as u32
}

/// Minutes of material already completed.
pub fn calculate_time_spent(lessons: &[Lesson], progress: &[LessonProgress]) -> u32 {
    let done = completed_ids(progress);
    lessons
        .iter()
        .filter(|l| done.contains(l.id.as_str()))
        .filter_map(|l| l.duration)
        .sum()
}

/// Minutes of material still ahead of the learner.
pub fn calculate_time_remaining(
    lessons: &[Lesson],
    progress: &[LessonProgress],
    required_only: bool,
) -> u32 {
    let done = completed_ids(progress);
    lessons
        .iter()
        .filter(|l| !required_only || l.required)
        .filter(|l| !done.contains(l.id.as_str()))
        .filter_map(|l| l.duration)
        .sum()
}

/// First required, incomplete lesson in `order` sequence. Equal `order`
/// values keep their input order (stable sort), so the rule is
/// deterministic for a given lesson list.
pub fn next_lesson<'a>(lessons: &'a [Lesson], progress: &[LessonProgress]) -> Option<&'a Lesson> {
    let done = completed_ids(progress);
    let mut ordered: Vec<&Lesson> = lessons.iter().collect();
    ordered.sort_by_key(|l| l.order);
    ordered
        .into_iter()
        .find(|l| l.required && !done.contains(l.id.as_str()))
}

/// Completion gate: every required lesson done, and every quiz passed on
/// its best attempt. A course without quizzes is gated by lessons alone.
pub fn should_mark_complete(
    lessons: &[Lesson],
    progress: &[LessonProgress],
    quizzes: &[Quiz],
    attempts: &[QuizAttempt],
    passing_score: u32,
) -> bool {
    let done = completed_ids(progress);
    let lessons_done = lessons
        .iter()
        .filter(|l| l.required)
        .all(|l| done.contains(l.id.as_str()));
    if !lessons_done {
        return false;
    }

    quizzes.iter().all(|quiz| {
        attempts
            .iter()
            .filter(|a| a.quiz_id == quiz.id)
            .map(|a| a.score)
            .max()
            .map(|best| best >= passing_score)
            .unwrap_or(false)
    })
}

fn completion_timestamps(progress: &[LessonProgress]) -> Vec<DateTime<Utc>> {
    let mut stamps: Vec<DateTime<Utc>> = progress
        .iter()
        .filter(|p| p.completed)
        .filter_map(|p| p.completed_at)
        .collect();
    stamps.sort();
    stamps
}

/// Project a finish date from the learner's average interval between
/// lesson completions. Needs at least two completion timestamps;
/// returning `None` below that is expected, not an error.
pub fn estimate_completion_date(
    assignment: &Assignment,
    lessons: &[Lesson],
) -> Option<DateTime<Utc>> {
    if assignment.status == AssignmentStatus::Completed {
        return assignment.completed_at;
    }

    let stamps = completion_timestamps(&assignment.lesson_progress);
    if stamps.len() < 2 {
        return None;
    }
    let first = stamps[0];
    let last = stamps[stamps.len() - 1];
    let avg_ms = (last - first).num_milliseconds() / (stamps.len() as i64 - 1);

    let done = completed_ids(&assignment.lesson_progress);
    let remaining = lessons
        .iter()
        .filter(|l| l.required && !done.contains(l.id.as_str()))
        .count() as i64;

    Some(last + Duration::milliseconds(avg_ms * remaining))
}

/// Completed lessons per day over the learner's active span. The span is
/// floored at one day so a burst of same-day completions does not produce
/// an absurd rate.
pub fn learning_velocity(progress: &[LessonProgress]) -> f64 {
    let stamps = completion_timestamps(progress);
    if stamps.is_empty() {
        return 0.0;
    }
    let span_days = (stamps[stamps.len() - 1] - stamps[0]).num_seconds() as f64 / 86_400.0;
    stamps.len() as f64 / span_days.max(1.0)
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Pace {
    OnTrack,
    Ahead,
    Behind,
    AtRisk,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProgressInsights {
    pub status: Pace,
    pub message: String,
    pub recommendation: String,
    pub velocity: f64,
    pub remaining_lessons: u32,
    pub days_remaining: Option<f64>,
}

fn insight(
    status: Pace,
    message: &str,
    recommendation: &str,
    velocity: f64,
    remaining_lessons: u32,
    days_remaining: Option<f64>,
) -> ProgressInsights {
    ProgressInsights {
        status,
        message: message.to_string(),
        recommendation: recommendation.to_string(),
        velocity,
        remaining_lessons,
        days_remaining,
    }
}

/// Pacing classification for the learner-facing dashboard. `now` is passed
/// in by the caller so the function stays deterministic under test.
///
/// Precedence: completed, no deadline, overdue, no lessons left, stalled
/// near deadline, stalled, then velocity ratio bands.
pub fn progress_insights(
    assignment: &Assignment,
    lessons: &[Lesson],
    progress: &[LessonProgress],
    now: DateTime<Utc>,
) -> ProgressInsights {
    let velocity = learning_velocity(progress);
    let done = completed_ids(progress);
    let remaining = lessons
        .iter()
        .filter(|l| l.required && !done.contains(l.id.as_str()))
        .count() as u32;

    if assignment.status == AssignmentStatus::Completed {
        return insight(
            Pace::OnTrack,
            "You have completed this course. Great work!",
            "Browse the catalog for your next course.",
            velocity,
            remaining,
            None,
        );
    }

    let due = match assignment.due_date {
        Some(due) => due,
        None => {
            return insight(
                Pace::OnTrack,
                "This course is self-paced. Keep up the steady progress.",
                "Set yourself a target date to stay motivated.",
                velocity,
                remaining,
                None,
            );
        }
    };

    let days_remaining = (due - now).num_seconds() as f64 / 86_400.0;

    if due < now {
        return insight(
            Pace::AtRisk,
            "This course is overdue.",
            "Finish the remaining lessons as soon as possible or ask for a new due date.",
            velocity,
            remaining,
            Some(days_remaining),
        );
    }

    if remaining == 0 {
        return insight(
            Pace::Ahead,
            "All required lessons are complete. Only the quizzes remain.",
            "Pass the remaining quizzes to finish the course.",
            velocity,
            remaining,
            Some(days_remaining),
        );
    }

    if velocity == 0.0 {
        if days_remaining <= 3.0 {
            return insight(
                Pace::AtRisk,
                "The due date is close and no lessons have been completed yet.",
                "Start now and focus on the required lessons first.",
                velocity,
                remaining,
                Some(days_remaining),
            );
        }
        return insight(
            Pace::Behind,
            "No lessons have been completed yet.",
            "Complete your first lesson to build momentum.",
            velocity,
            remaining,
            Some(days_remaining),
        );
    }

    let required_velocity = remaining as f64 / days_remaining;
    let ratio = velocity / required_velocity;

    if ratio >= 1.2 {
        insight(
            Pace::Ahead,
            "You are ahead of schedule.",
            "Keep the pace and you will finish early.",
            velocity,
            remaining,
            Some(days_remaining),
        )
    } else if ratio >= 0.8 {
        insight(
            Pace::OnTrack,
            "You are on track to finish by the due date.",
            "Keep completing lessons at your current pace.",
            velocity,
            remaining,
            Some(days_remaining),
        )
    } else if ratio >= 0.5 {
        insight(
            Pace::Behind,
            "You are falling behind the pace needed to finish on time.",
            "Try to complete one extra lesson this week.",
            velocity,
            remaining,
            Some(days_remaining),
        )
    } else {
        insight(
            Pace::AtRisk,
            "At the current pace you will not finish before the due date.",
            "Block out dedicated time for this course over the next few days.",
            velocity,
            remaining,
            Some(days_remaining),
        )
    }
}

/// Recompute the derived assignment fields from raw progress records.
/// `progress_pct` and `status` on a stored assignment must never disagree
/// with this; callers persist whatever comes back.
pub fn derive_assignment_state(
    assignment: &Assignment,
    lessons: &[Lesson],
    quizzes: &[Quiz],
    passing_score: u32,
) -> (u32, AssignmentStatus) {
    let pct = calculate_course_progress(lessons, &assignment.lesson_progress, true);
    let complete = should_mark_complete(
        lessons,
        &assignment.lesson_progress,
        quizzes,
        &assignment.quiz_attempts,
        passing_score,
    );
    let status = if complete {
        AssignmentStatus::Completed
    } else if pct > 0 || !assignment.quiz_attempts.is_empty() {
        AssignmentStatus::InProgress
    } else {
        AssignmentStatus::NotStarted
    };
    (pct, status)
}
