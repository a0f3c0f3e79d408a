use discovery_types::Outcome;

use crate::oracle::Regression;

/// Builds the prompts sent to a generative backend.
pub struct PromptBuilder;

impl PromptBuilder {
    /// Ask for a revised guidance prompt that folds in one hint.
    pub fn refine_guidance(previous: &str, parent_program: &str, hint: &str) -> String {
        let mut prompt = String::new();
        prompt.push_str("You maintain the guidance prompt of a code generator.\n\n");
        prompt.push_str(&format!("## Current Guidance\n{}\n\n", previous.trim()));
        prompt.push_str(&format!("## Program Produced So Far\n{}\n\n", parent_program));
        prompt.push_str(&format!("## Idea To Incorporate\n{}\n\n", hint.trim()));
        prompt.push_str(
            "Write a revised guidance prompt that keeps what still applies, adopts the idea \
             above and is likely to yield a better-scoring program.\n\
             Reply with the new guidance only, as plain text.\n",
        );
        prompt
    }

    /// Ask for SEARCH/REPLACE edits to the parent program.
    pub fn mutation(parent_program: &str, guidance: &str) -> String {
        let mut prompt = String::new();
        prompt.push_str(&format!("## Guidance\n{}\n\n", guidance.trim()));
        prompt.push_str(&format!("## Parent Program\n{}\n\n", parent_program));
        prompt.push_str("## Instructions\n");
        prompt.push_str("Propose edits that improve the parent program. Express every edit as:\n\n");
        prompt.push_str(DIFF_FORMAT);
        prompt.push_str(
            "\nThe search text must appear verbatim in the parent program. \
             The final computed value must be assigned to the variable `result`.\n",
        );
        prompt
    }

    /// Ask why a child scored below its parent.
    pub fn regression(regression: &Regression<'_>, existing_hints: &[String]) -> String {
        let mut prompt = String::new();
        prompt.push_str(
            "A program is being evolved against a hidden score. The parent below \
             scored HIGHER than the child derived from it.\n\n",
        );
        prompt.push_str(&format!(
            "## Parent Guidance\n{}\n\n",
            regression.parent_guidance.trim()
        ));
        prompt.push_str(&format!("## Parent Program\n{}\n\n", regression.parent_program));
        prompt.push_str(&format!("## Parent Outcome\n{}\n\n", regression.parent_outcome));
        prompt.push_str(&format!("## Child Program\n{}\n\n", regression.child_program));
        prompt.push_str(&format!("## Child Outcome\n{}\n\n", regression.child_outcome));
        Self::push_existing(&mut prompt, existing_hints);
        prompt.push_str(
            "## Task\n\
             1. Explain what most likely made the child worse.\n\
             2. Guess what the hidden score rewards and penalizes.\n\
             3. Give 1-3 concrete, testable changes to the guidance that target it.\n",
        );
        prompt.push_str(HINT_FORMAT);
        prompt
    }

    /// Ask for next steps from one program's outcome.
    pub fn outcome(
        guidance: &str,
        program: &str,
        outcome: &Outcome,
        existing_hints: &[String],
    ) -> String {
        let mut prompt = String::new();
        prompt.push_str(
            "A program is being evolved against a hidden score. Learn what you can \
             from this attempt.\n\n",
        );
        prompt.push_str(&format!("## Guidance\n{}\n\n", guidance.trim()));
        prompt.push_str(&format!("## Program\n{}\n\n", program));
        prompt.push_str(&format!("## Outcome\n{}\n\n", outcome));
        Self::push_existing(&mut prompt, existing_hints);
        prompt.push_str(
            "## Task\n\
             1. Infer what the hidden score rewards and penalizes.\n\
             2. Give 1-3 concise, testable changes to the guidance that exploit it.\n",
        );
        prompt.push_str(HINT_FORMAT);
        prompt
    }

    fn push_existing(prompt: &mut String, existing_hints: &[String]) {
        if existing_hints.is_empty() {
            return;
        }
        prompt.push_str("## Already Tried (do not repeat)\n");
        for hint in existing_hints.iter().filter(|h| !h.trim().is_empty()) {
            prompt.push_str(&format!("- {}\n", hint.trim()));
        }
        prompt.push('\n');
    }
}

const DIFF_FORMAT: &str = "\
<<<<<<< SEARCH
original code
=======
replacement code
>>>>>>> REPLACE
";

const HINT_FORMAT: &str = "\n## Output\n\
Return only a JSON array of objects of the form {\"description\": \"...\"}, \
one per idea, each 1-3 sentences naming the suspected scoring factor and the \
guidance change.\n";
