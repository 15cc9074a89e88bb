//! End-to-end walk through a learner finishing a two-lesson course with
//! one quiz, from first submission to certificate issuance.

use std::collections::HashMap;

use chrono::{TimeZone, Utc};
use learnpath_core::{
    calculate_course_progress, generate_html, generate_verification_data, grade_quiz,
    should_mark_complete, validate_certificate_requirements, AnswerValue, Assignment,
    AssignmentStatus, Audience, CertificateData, CertificateTemplate, Course, Lesson,
    LessonProgress, LessonType, Question, QuestionType, Quiz, QuizAttempt, VerificationConfig,
};
use uuid::Uuid;

fn course() -> Course {
    Course {
        id: Uuid::nil(),
        title: "Onboarding Essentials".into(),
        audience: Audience::Employee,
        passing_score: 70,
        active: true,
        tags: vec!["onboarding".into()],
    }
}

fn lessons() -> Vec<Lesson> {
    vec![
        Lesson {
            id: "l1".into(),
            course_id: Uuid::nil(),
            title: "Welcome".into(),
            lesson_type: LessonType::Video,
            duration: Some(10),
            order: 1,
            required: true,
        },
        Lesson {
            id: "l2".into(),
            course_id: Uuid::nil(),
            title: "Policies".into(),
            lesson_type: LessonType::Document,
            duration: Some(20),
            order: 2,
            required: true,
        },
    ]
}

fn quiz() -> Quiz {
    Quiz {
        id: "quiz-1".into(),
        course_id: Uuid::nil(),
        lesson_id: Some("l2".into()),
        title: "Policy check".into(),
        questions: vec![
            Question {
                id: "q1".into(),
                question_type: QuestionType::SingleChoice,
                text: "Who approves leave requests?".into(),
                options: vec!["Your manager".into(), "The CEO".into()],
                correct_answer: AnswerValue::Text("Your manager".into()),
                points: 10,
                explanation: None,
            },
            Question {
                id: "q2".into(),
                question_type: QuestionType::TrueFalse,
                text: "Security training is annual.".into(),
                options: vec![],
                correct_answer: AnswerValue::Bool(true),
                points: 10,
                explanation: Some("Security refreshers run every twelve months.".into()),
            },
        ],
        time_limit: Some(15),
        attempts: Some(3),
        randomize_questions: false,
        show_results: true,
    }
}

fn completed(lesson_id: &str) -> LessonProgress {
    LessonProgress {
        lesson_id: lesson_id.into(),
        completed: true,
        completed_at: Some(Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()),
    }
}

#[test]
fn learner_completes_course_and_earns_certificate() {
    let course = course();
    let lessons = lessons();
    let quiz = quiz();

    tracing_subscriber::fmt()
        .with_env_filter("learnpath_core=warn")
        .try_init()
        .ok();

    // Learner passes the quiz on the first attempt.
    let answers = HashMap::from([
        ("q1".to_string(), AnswerValue::Text("Your manager".into())),
        ("q2".to_string(), AnswerValue::Bool(true)),
    ]);
    let result = grade_quiz(&quiz, &answers, course.passing_score, None, None);
    assert!(result.passed);
    assert_eq!(result.percentage, 100);

    let attempt = QuizAttempt {
        quiz_id: quiz.id.clone(),
        attempt_number: 1,
        score: result.percentage,
        submitted_at: Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap(),
        answers,
    };

    // Halfway: lesson 2 still open, so the course must not complete even
    // though the quiz is passed.
    let halfway = vec![completed("l1")];
    assert_eq!(calculate_course_progress(&lessons, &halfway, true), 50);
    assert!(!should_mark_complete(
        &lessons,
        &halfway,
        std::slice::from_ref(&quiz),
        std::slice::from_ref(&attempt),
        course.passing_score
    ));

    // Lesson 2 done: completion flips.
    let finished = vec![completed("l1"), completed("l2")];
    assert_eq!(calculate_course_progress(&lessons, &finished, true), 100);
    assert!(should_mark_complete(
        &lessons,
        &finished,
        std::slice::from_ref(&quiz),
        std::slice::from_ref(&attempt),
        course.passing_score
    ));

    // The backend persists the derived state; the certificate gate then
    // accepts it.
    let assignment = Assignment {
        id: Uuid::nil(),
        course_id: course.id,
        user_id: Some("u-42".into()),
        candidate_id: None,
        account_id: None,
        status: AssignmentStatus::Completed,
        progress_pct: 100,
        score: Some(result.percentage),
        started_at: None,
        completed_at: Some(Utc.with_ymd_and_hms(2026, 3, 2, 11, 0, 0).unwrap()),
        due_date: None,
        lesson_progress: finished,
        quiz_attempts: vec![attempt],
    };
    let validation = validate_certificate_requirements(&assignment, &course, course.passing_score);
    assert!(validation.is_valid, "errors: {:?}", validation.errors);

    // Render and verify.
    let config = VerificationConfig::new("https://learn.example.com");
    let data = CertificateData {
        assignment_id: assignment.id,
        course_name: course.title.clone(),
        learner_name: "Ash Taylor".into(),
        completion_date: assignment.completed_at.unwrap(),
        score: assignment.score,
        instructor_name: None,
        organization_name: Some("Acme".into()),
        certificate_id: None,
    };
    let verification = generate_verification_data(&data, &config);
    assert!(verification
        .verification_url
        .starts_with("https://learn.example.com/verify/CERT-"));

    let mut stamped = data.clone();
    stamped.certificate_id = Some(verification.certificate_id.clone());
    let html = generate_html(&stamped, &CertificateTemplate::default_template());
    assert!(html.contains("Ash Taylor"));
    assert!(html.contains("Onboarding Essentials"));
    assert!(html.contains(&verification.certificate_id));
}
