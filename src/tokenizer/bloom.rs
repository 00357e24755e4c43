use anyhow::{anyhow, Result};
use hf_hub::api::sync::Api;
use tokenizers::Tokenizer;

pub const DEFAULT_MODEL_ID: &str = "bigscience/bloomz-7b1";

#[derive(Debug, Clone)]
pub struct CausalTokenizer {
    inner: Tokenizer,
    eos_token: String,
    eos_id: Option<u32>,
}

impl CausalTokenizer {
    // loads the base model's tokenizer from the HF Hub; padding and
    // truncation are disabled because packing consumes full sequences
    pub fn new(model_id: &str) -> Result<Self> {
        let mut tok = Tokenizer::from_pretrained(model_id, None)
            .map_err(|e| anyhow!("{}", e))?;

        // read tokenizer_config.json for the EOS token (string or {content})
        let eos_token = {
            let api = Api::new()?;
            let repo = api.model(model_id.to_string());
            let cfg = repo.get("tokenizer_config.json").ok()
                .and_then(|p| std::fs::read_to_string(p).ok())
                .and_then(|s| serde_json::from_str::<serde_json::Value>(&s).ok())
                .unwrap_or(serde_json::json!({}));

            match cfg.get("eos_token") {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(serde_json::Value::Object(o)) => o
                    .get("content")
                    .and_then(|v| v.as_str())
                    .unwrap_or("</s>")
                    .to_string(),
                _ => "</s>".to_string(),
            }
        };

        tok.with_truncation(None).map_err(|e| anyhow!("{}", e))?;
        tok.with_padding(None);

        let eos_id = tok.token_to_id(&eos_token);

        Ok(Self { inner: tok, eos_token, eos_id })
    }

    pub fn eos_token(&self) -> &str { &self.eos_token }

    pub fn eos_id(&self) -> Option<u32> { self.eos_id }

    /// batch-encode rendered training texts; returns (input_ids,
    /// attention_mask) per sample, unpadded
    pub fn encode_batch(&self, texts: &[String]) -> Result<Vec<(Vec<u32>, Vec<u32>)>> {
        let encodings = self.inner
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow!("{}", e))?;

        let mut out: Vec<(Vec<u32>, Vec<u32>)> = Vec::with_capacity(encodings.len());
        for e in encodings {
            let ids = e.get_ids().to_vec();
            let mask = e.get_attention_mask().to_vec();
            out.push((ids, mask));
        }
        Ok(out)
    }

    /// encode a single inference prompt
    pub fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let enc = self.inner
            .encode(text, true)
            .map_err(|e| anyhow!("{}", e))?;
        Ok(enc.get_ids().to_vec())
    }

    /// decode token IDs back to text
    pub fn decode_ids(&self, ids: &[u32], skip_special: bool) -> Result<String> {
        self.inner.decode(ids, skip_special)
            .map_err(|e| anyhow!("{}", e))
    }

    /// access the inner tokenizer if needed
    pub fn inner(&self) -> &Tokenizer { &self.inner }
}
