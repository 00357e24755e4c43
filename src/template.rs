use anyhow::{anyhow, Result};
use regex::Regex;
use serde_json::{Map, Value};

/// Default dialogue summarization prompt. `{summary}` is the completion
/// field: rendered with the reference summary for training, rendered empty
/// at inference time.
pub const DEFAULT_TEMPLATE: &str =
    "Summarize the chat dialogue:\n{dialogue}\n---\nSummary:\n{summary}";

/// A prompt template with `{field}` placeholders bound to example columns.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    raw: String,
    fields: Vec<String>,
}

impl PromptTemplate {
    pub fn parse(raw: &str) -> Result<Self> {
        let re = Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}")?;
        let mut fields: Vec<String> = Vec::new();
        for cap in re.captures_iter(raw) {
            let name = cap[1].to_string();
            if !fields.contains(&name) { fields.push(name); }
        }
        Ok(Self { raw: raw.to_string(), fields })
    }

    /// Placeholder names in first-appearance order.
    pub fn fields(&self) -> &[String] { &self.fields }

    /// Render against an example's column map. Missing or non-scalar
    /// fields are errors; numbers and bools are formatted as-is.
    pub fn render(&self, columns: &Map<String, Value>) -> Result<String> {
        let mut out = self.raw.clone();
        for name in &self.fields {
            let value = columns
                .get(name)
                .ok_or_else(|| anyhow!("missing field '{}' in example", name))?;
            let text = scalar_to_string(value)
                .ok_or_else(|| anyhow!("field '{}' is not a scalar", name))?;
            out = out.replace(&format!("{{{}}}", name), &text);
        }
        Ok(out)
    }

    /// Render the inference-time prompt: the completion field (by
    /// convention the last placeholder) becomes the empty string, so the
    /// prompt ends right where the model should continue.
    pub fn render_prompt(&self, columns: &Map<String, Value>) -> Result<String> {
        let Some(completion) = self.fields.last() else {
            return Err(anyhow!("template has no placeholders"));
        };
        let mut cols = columns.clone();
        cols.insert(completion.clone(), Value::String(String::new()));
        self.render(&cols)
    }
}

fn scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cols(pairs: &[(&str, &str)]) -> Map<String, Value> {
        let mut m = Map::new();
        for (k, v) in pairs { m.insert(k.to_string(), json!(v)); }
        m
    }

    #[test]
    fn parses_fields_in_order() {
        let t = PromptTemplate::parse(DEFAULT_TEMPLATE).unwrap();
        assert_eq!(t.fields(), &["dialogue".to_string(), "summary".to_string()]);
    }

    #[test]
    fn renders_training_text() {
        let t = PromptTemplate::parse(DEFAULT_TEMPLATE).unwrap();
        let out = t.render(&cols(&[("dialogue", "A: hi\nB: hello"), ("summary", "Greetings.")])).unwrap();
        assert_eq!(out, "Summarize the chat dialogue:\nA: hi\nB: hello\n---\nSummary:\nGreetings.");
    }

    #[test]
    fn missing_field_is_an_error() {
        let t = PromptTemplate::parse(DEFAULT_TEMPLATE).unwrap();
        let err = t.render(&cols(&[("dialogue", "A: hi")])).unwrap_err();
        assert!(err.to_string().contains("summary"));
    }

    #[test]
    fn non_scalar_field_is_an_error() {
        let t = PromptTemplate::parse("{x}").unwrap();
        let mut m = Map::new();
        m.insert("x".to_string(), json!(["not", "scalar"]));
        assert!(t.render(&m).is_err());
    }

    #[test]
    fn inference_prompt_ends_at_completion() {
        let t = PromptTemplate::parse(DEFAULT_TEMPLATE).unwrap();
        let out = t.render_prompt(&cols(&[("dialogue", "A: hi")])).unwrap();
        assert!(out.ends_with("Summary:\n"));
        assert!(!out.contains("{summary}"));
    }

    #[test]
    fn repeated_placeholder_renders_everywhere() {
        let t = PromptTemplate::parse("{a} and {a}").unwrap();
        assert_eq!(t.fields(), &["a".to_string()]);
        let out = t.render(&cols(&[("a", "x")])).unwrap();
        assert_eq!(out, "x and x");
    }
}
