//! The fixed prompt contract. Classification trustworthiness depends on
//! stable output, so the wording, rubric, and worked examples are
//! constants rather than configuration.

pub const SYSTEM_PROMPT: &str =
    "You are a strict data extraction engine for construction safety. You do not chat.";

/// Builds the per-step user message: the step text, the decision rubric,
/// and the mandatory `Hazard | Control` output format.
pub fn build_user_prompt(step_text: &str) -> String {
    format!(
        "Analyze this specific MOP step: '{step_text}'\n\n\
         INSTRUCTIONS:\n\
         1. DECIDE: Is this step 'Administrative/Safe' OR 'Physical/Hazardous'?\n\
            - Safe: Software, checking notes, phone calls, meetings, verifying, notifying.\n\
            - Hazardous: Using tools, LOTO, electrical work, ladders, chemicals, pressure.\n\
         2. OUTPUT FORMAT: Return strictly 'Hazard | Control' (separated by a pipe).\n\
         3. FOR SAFE STEPS: You MUST return exactly: N/A | N/A\n\n\
         EXAMPLES:\n\
         Input: 'Contact the client.' -> Output: N/A | N/A\n\
         Input: 'Disconnect the main breaker.' -> Output: Electrical Shock | LOTO & Verify Zero Energy\n\
         Input: 'Update the software tags.' -> Output: N/A | N/A\n\
         Input: 'Climb ladder to inspect unit.' -> Output: Fall Hazard | Secure Ladder & 3-Points Contact\n\n\
         Your Output:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt_embeds_step_text() {
        let prompt = build_user_prompt("Disconnect the main breaker.");
        assert!(prompt.contains("'Disconnect the main breaker.'"));
        assert!(prompt.contains("Hazard | Control"));
        assert!(prompt.contains("N/A | N/A"));
    }
}
