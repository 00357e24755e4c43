/// Clean up a raw generation: servers that echo the prompt get it stripped,
/// and anything from the stop token on is cut.
pub fn clean_generation(prompt: &str, generated: &str, stop: &str) -> String {
    let text = generated.strip_prefix(prompt).unwrap_or(generated);
    let text = match text.find(stop) {
        Some(i) => &text[..i],
        None => text,
    };
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROMPT: &str = "Summarize the chat dialogue:\nA: hi\n---\nSummary:\n";

    #[test]
    fn strips_echoed_prompt() {
        let raw = format!("{}A greets B.", PROMPT);
        assert_eq!(clean_generation(PROMPT, &raw, "</s>"), "A greets B.");
    }

    #[test]
    fn cuts_at_stop_token() {
        let raw = "A greets B.</s>garbage after eos";
        assert_eq!(clean_generation(PROMPT, raw, "</s>"), "A greets B.");
    }

    #[test]
    fn passes_through_clean_completions() {
        assert_eq!(clean_generation(PROMPT, "  A greets B.\n", "</s>"), "A greets B.");
    }

    #[test]
    fn handles_echo_and_stop_together() {
        let raw = format!("{}A greets B.</s>", PROMPT);
        assert_eq!(clean_generation(PROMPT, &raw, "</s>"), "A greets B.");
    }
}
