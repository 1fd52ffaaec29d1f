use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Client for a local Ollama-style generation endpoint.
///
/// Requests are always streamed: the endpoint answers with
/// newline-delimited JSON chunks carrying a `response` text fragment and
/// a `done` terminator. Failures propagate to the caller unchanged — no
/// retry, no timeout.
#[derive(Clone)]
pub struct LlmClient {
    endpoint: String,
    model: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
}

impl LlmClient {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Send a generation request and concatenate the streamed fragments
    /// until the terminal chunk arrives.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let payload = GenerateRequest {
            model: &self.model,
            prompt,
            stream: true,
        };
        let mut response = self
            .http
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("failed to reach generation endpoint {}", self.endpoint))?
            .error_for_status()
            .context("generation endpoint returned error status")?;

        let mut pending = Vec::new();
        let mut result = String::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .context("failed while reading generation stream")?
        {
            pending.extend_from_slice(&chunk);
            while let Some(newline) = pending.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = pending.drain(..=newline).collect();
                if append_chunk(&mut result, &line)? {
                    return Ok(result.trim().to_string());
                }
            }
        }
        if !pending.is_empty() {
            append_chunk(&mut result, &pending)?;
        }
        Ok(result.trim().to_string())
    }
}

/// Parse one NDJSON line, append its text fragment to `result`, and
/// report whether it was the terminal chunk. Blank lines are skipped.
fn append_chunk(result: &mut String, line: &[u8]) -> Result<bool> {
    let line = line.trim_ascii();
    if line.is_empty() {
        return Ok(false);
    }
    let chunk: GenerateChunk = serde_json::from_slice(line)
        .map_err(|err| anyhow!("malformed generation chunk: {err}"))?;
    result.push_str(&chunk.response);
    Ok(chunk.done)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_accumulate_in_order() {
        let mut result = String::new();
        assert!(!append_chunk(&mut result, br#"{"response": "Hello"}"#).unwrap());
        assert!(!append_chunk(&mut result, br#"{"response": " world"}"#).unwrap());
        assert!(append_chunk(&mut result, br#"{"response": "!", "done": true}"#).unwrap());
        assert_eq!(result, "Hello world!");
    }

    #[test]
    fn blank_lines_are_skipped() {
        let mut result = String::new();
        assert!(!append_chunk(&mut result, b"  \r").unwrap());
        assert!(result.is_empty());
    }

    #[test]
    fn chunks_without_response_only_signal_done() {
        let mut result = String::new();
        assert!(append_chunk(&mut result, br#"{"done": true}"#).unwrap());
        assert!(result.is_empty());
    }

    #[test]
    fn malformed_chunks_are_errors() {
        let mut result = String::new();
        assert!(append_chunk(&mut result, b"not json").is_err());
    }
}
