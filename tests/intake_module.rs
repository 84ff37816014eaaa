use appseed::intake::{
    is_no_further_questions, render_answer_sheet, render_requirements_summary, IntakeAnswers,
    INTAKE_QUESTIONS, UNANSWERED_PLACEHOLDER,
};

#[test]
fn six_questions_cover_the_intake() {
    assert_eq!(INTAKE_QUESTIONS.len(), 6);
    assert_eq!(INTAKE_QUESTIONS[0].label, "Business goal");
    assert_eq!(INTAKE_QUESTIONS[5].label, "System environment");
}

#[test]
fn answers_fill_in_order_and_gate_completion() {
    let mut intake = IntakeAnswers::default();
    assert_eq!(intake.first_unanswered(), Some(0));

    for idx in 0..INTAKE_QUESTIONS.len() {
        intake.set_answer(idx, &format!("answer {idx}"));
    }
    assert!(intake.all_answered());
    assert_eq!(intake.first_unanswered(), None);
}

#[test]
fn summary_uses_labels_and_placeholder_for_missing_answers() {
    let mut intake = IntakeAnswers::default();
    intake.set_answer(0, "automate reporting");

    let summary = render_requirements_summary(&intake);
    assert!(summary.contains("## Business goal\nautomate reporting"));
    assert!(summary.contains(&format!("## Users\n{UNANSWERED_PLACEHOLDER}")));
}

#[test]
fn answer_sheet_lists_questions_with_numbers() {
    let intake = IntakeAnswers::default();
    let sheet = render_answer_sheet(&intake);
    assert!(sheet.contains("**Question 1:** [Business goal]"));
    assert!(sheet.contains("**Question 6:** [System environment]"));
    assert!(sheet.contains(UNANSWERED_PLACEHOLDER));
}

#[test]
fn follow_up_sentinel_matches_prefix_only() {
    assert!(is_no_further_questions("No further questions."));
    assert!(is_no_further_questions("no further questions needed"));
    assert!(!is_no_further_questions("What database should be used?"));
}
