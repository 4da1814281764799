//! Lenient JSON extraction from model replies

use serde::de::DeserializeOwned;

use crate::error::AiError;

/// Strip a surrounding Markdown code fence, with or without a `json` tag
pub fn strip_code_fences(text: &str) -> &str {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}

/// Parse a model reply as JSON
pub fn extract_json<T: DeserializeOwned>(text: &str) -> Result<T, AiError> {
    serde_json::from_str(strip_code_fences(text)).map_err(|e| AiError::InvalidJson(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n[1]\n```  "), "[1]");
        assert_eq!(strip_code_fences("  {\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_extract_json_error() {
        let result: Result<serde_json::Value, _> = extract_json("Sure! Here it is: {");
        assert!(matches!(result, Err(AiError::InvalidJson(_))));
    }
}
