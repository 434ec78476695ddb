use serde::Serialize;

/// Who an agent is asked to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgentPersona {
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
}

impl AgentPersona {
    pub const RADIOLOGIST: AgentPersona = AgentPersona {
        role: "AI Radiology Specialist",
        goal: "Classify brain MRI images to detect tumors",
        backstory: "Expert in medical imaging with deep learning specialization",
    };

    pub const CLINICAL_ANALYST: AgentPersona = AgentPersona {
        role: "Clinical Analyst",
        goal: "Analyze results with medical context and determine tumor characteristics",
        backstory: "Experienced clinician with oncology expertise",
    };

    pub const TREATMENT_SPECIALIST: AgentPersona = AgentPersona {
        role: "Treatment Recommendations Specialist",
        goal: "Provide evidence-based clinical recommendations for patient care",
        backstory: "Board-certified oncologist with treatment protocol expertise",
    };

    pub const REPORT_WRITER: AgentPersona = AgentPersona {
        role: "Medical Report Writer",
        goal: "Generate structured and comprehensive medical reports",
        backstory: "Medical documentation expert with clinical writing specialization",
    };

    /// System prompt establishing the persona
    pub fn system_prompt(&self) -> String {
        format!(
            "You are a {}.\n{}\n\nYour goal: {}\n\nAnswer in plain text, one fact per line, \
             using the exact field labels the task asks for.",
            self.role, self.backstory, self.goal
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_mentions_role_and_goal() {
        let prompt = AgentPersona::CLINICAL_ANALYST.system_prompt();
        assert!(prompt.starts_with("You are a Clinical Analyst."));
        assert!(prompt.contains("determine tumor characteristics"));
    }
}
