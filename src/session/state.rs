use crate::artifact::{split, ScriptArtifact, SCRIPT_MARKER};
use crate::intake::IntakeAnswers;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Requirements,
    PromptDesign,
    ScriptGeneration,
    Launch,
}

pub const ALL_STAGES: [Stage; 4] = [
    Stage::Requirements,
    Stage::PromptDesign,
    Stage::ScriptGeneration,
    Stage::Launch,
];

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Requirements => "requirements",
            Stage::PromptDesign => "prompt_design",
            Stage::ScriptGeneration => "script_generation",
            Stage::Launch => "launch",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Stage::Requirements => "Business requirements",
            Stage::PromptDesign => "Instruction prompt",
            Stage::ScriptGeneration => "Script generation",
            Stage::Launch => "Launch and feedback",
        }
    }

    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Requirements => Some(Stage::PromptDesign),
            Stage::PromptDesign => Some(Stage::ScriptGeneration),
            Stage::ScriptGeneration => Some(Stage::Launch),
            Stage::Launch => None,
        }
    }

    pub fn prev(self) -> Option<Stage> {
        match self {
            Stage::Requirements => None,
            Stage::PromptDesign => Some(Stage::Requirements),
            Stage::ScriptGeneration => Some(Stage::PromptDesign),
            Stage::Launch => Some(Stage::ScriptGeneration),
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSession {
    pub stage: Stage,
    #[serde(default)]
    pub intake: IntakeAnswers,
    #[serde(default)]
    pub follow_up_question: Option<String>,
    #[serde(default)]
    pub instruction_prompt: String,
    #[serde(default)]
    pub generated_output: String,
    #[serde(default)]
    pub revised_prompt: String,
    pub created_at: String,
    pub updated_at: String,
}

impl WorkflowSession {
    pub fn new() -> Self {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        Self {
            stage: Stage::Requirements,
            intake: IntakeAnswers::default(),
            follow_up_question: None,
            instruction_prompt: String::new(),
            generated_output: String::new(),
            revised_prompt: String::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    }

    pub fn artifact(&self) -> ScriptArtifact {
        split(&self.generated_output, SCRIPT_MARKER)
    }

    pub fn can_advance(&self) -> Result<(), String> {
        match self.stage {
            Stage::Requirements => {
                if self.intake.all_answered() {
                    Ok(())
                } else {
                    Err("answer all six intake questions before continuing".to_string())
                }
            }
            Stage::PromptDesign => {
                if self.instruction_prompt.trim().is_empty() {
                    Err("generate the instruction prompt before continuing".to_string())
                } else {
                    Ok(())
                }
            }
            Stage::ScriptGeneration => {
                if self.generated_output.trim().is_empty() {
                    Err("generate the bootstrap script before continuing".to_string())
                } else {
                    Ok(())
                }
            }
            Stage::Launch => Err("launch is the final stage".to_string()),
        }
    }

    pub fn advance(&mut self) -> Result<Stage, String> {
        self.can_advance()?;
        let next = self
            .stage
            .next()
            .ok_or_else(|| "launch is the final stage".to_string())?;
        self.stage = next;
        self.touch();
        Ok(next)
    }

    pub fn retreat(&mut self) -> Option<Stage> {
        let prev = self.stage.prev()?;
        self.stage = prev;
        self.touch();
        Some(prev)
    }
}

impl Default for WorkflowSession {
    fn default() -> Self {
        Self::new()
    }
}
