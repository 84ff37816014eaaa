use serde::{Deserialize, Serialize};

pub const UNANSWERED_PLACEHOLDER: &str = "(not answered)";
pub const NO_FURTHER_QUESTIONS_PREFIX: &str = "No further questions";

#[derive(Debug, Clone, Copy)]
pub struct IntakeQuestion {
    pub label: &'static str,
    pub prompt: &'static str,
}

pub const INTAKE_QUESTIONS: [IntakeQuestion; 6] = [
    IntakeQuestion {
        label: "Business goal",
        prompt: "What is the purpose this system should achieve?",
    },
    IntakeQuestion {
        label: "Users",
        prompt: "Who are the primary users or target audience?",
    },
    IntakeQuestion {
        label: "Key features",
        prompt: "What are the main capabilities the system must provide?",
    },
    IntakeQuestion {
        label: "Business process and context",
        prompt: "Describe the business process the system is part of and any background context it needs.",
    },
    IntakeQuestion {
        label: "Problems and expected impact",
        prompt: "What problems should the system solve, and what impact do you expect?",
    },
    IntakeQuestion {
        label: "System environment",
        prompt: "In what environment should the system be built? (Without special instructions, a Streamlit app managed with Poetry is assumed.)",
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeAnswers {
    #[serde(default)]
    pub answers: Vec<String>,
    #[serde(default)]
    pub additional_answers: Vec<String>,
}

impl Default for IntakeAnswers {
    fn default() -> Self {
        Self {
            answers: vec![String::new(); INTAKE_QUESTIONS.len()],
            additional_answers: Vec::new(),
        }
    }
}

impl IntakeAnswers {
    pub fn answer(&self, index: usize) -> &str {
        self.answers.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn set_answer(&mut self, index: usize, text: &str) {
        if self.answers.len() < INTAKE_QUESTIONS.len() {
            self.answers.resize(INTAKE_QUESTIONS.len(), String::new());
        }
        if let Some(slot) = self.answers.get_mut(index) {
            *slot = text.trim().to_string();
        }
    }

    pub fn first_unanswered(&self) -> Option<usize> {
        (0..INTAKE_QUESTIONS.len()).find(|idx| self.answer(*idx).trim().is_empty())
    }

    pub fn all_answered(&self) -> bool {
        self.first_unanswered().is_none()
    }
}

pub fn is_no_further_questions(reply: &str) -> bool {
    reply
        .trim()
        .get(..NO_FURTHER_QUESTIONS_PREFIX.len())
        .map(|head| head.eq_ignore_ascii_case(NO_FURTHER_QUESTIONS_PREFIX))
        .unwrap_or(false)
}

pub fn render_answer_sheet(intake: &IntakeAnswers) -> String {
    let mut out = String::from("# Business requirements\n\n");
    for (idx, question) in INTAKE_QUESTIONS.iter().enumerate() {
        out.push_str(&format!(
            "**Question {}:** [{}] {}\n\n",
            idx + 1,
            question.label,
            question.prompt
        ));
        let answer = intake.answer(idx);
        let answer = if answer.trim().is_empty() {
            UNANSWERED_PLACEHOLDER
        } else {
            answer
        };
        out.push_str(&format!("**Answer:** {answer}\n\n"));
    }
    if !intake.additional_answers.is_empty() {
        out.push_str("## Follow-up answers\n");
        for (idx, additional) in intake.additional_answers.iter().enumerate() {
            out.push_str(&format!("**Follow-up answer {}:** {additional}\n\n", idx + 1));
        }
    }
    out
}

pub fn render_requirements_summary(intake: &IntakeAnswers) -> String {
    let mut out = String::new();
    for (idx, question) in INTAKE_QUESTIONS.iter().enumerate() {
        let answer = intake.answer(idx);
        let answer = if answer.trim().is_empty() {
            UNANSWERED_PLACEHOLDER
        } else {
            answer
        };
        out.push_str(&format!("## {}\n{answer}\n\n", question.label));
    }
    if !intake.additional_answers.is_empty() {
        out.push_str("## Follow-up answers\n");
        for (idx, additional) in intake.additional_answers.iter().enumerate() {
            out.push_str(&format!("Follow-up answer {}: {additional}\n\n", idx + 1));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_intake_is_unanswered() {
        let intake = IntakeAnswers::default();
        assert_eq!(intake.first_unanswered(), Some(0));
        assert!(!intake.all_answered());
    }

    #[test]
    fn blank_answers_do_not_count_as_answered() {
        let mut intake = IntakeAnswers::default();
        for idx in 0..INTAKE_QUESTIONS.len() {
            intake.set_answer(idx, "  something  ");
        }
        intake.set_answer(2, "   ");
        assert_eq!(intake.first_unanswered(), Some(2));
    }

    #[test]
    fn summary_sections_follow_question_labels() {
        let mut intake = IntakeAnswers::default();
        intake.set_answer(0, "ship faster");
        let summary = render_requirements_summary(&intake);
        assert!(summary.starts_with("## Business goal\nship faster\n\n"));
        assert!(summary.contains("## Users\n(not answered)"));
    }

    #[test]
    fn follow_up_answers_are_appended_to_both_renderings() {
        let mut intake = IntakeAnswers::default();
        intake.additional_answers.push("weekly batch is fine".to_string());
        assert!(render_requirements_summary(&intake).contains("weekly batch is fine"));
        assert!(render_answer_sheet(&intake).contains("weekly batch is fine"));
    }

    #[test]
    fn no_further_questions_sentinel_is_case_insensitive() {
        assert!(is_no_further_questions("No further questions are needed."));
        assert!(is_no_further_questions("  no further questions  "));
        assert!(!is_no_further_questions("One more question:"));
        assert!(!is_no_further_questions(""));
    }
}
