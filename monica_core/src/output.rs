//! Decoding and printing the engine's `run` result.

use std::io::Write;

use serde_json::Value;

use crate::engine::EngineResponse;
use crate::errors::{RunError, RunResult};

/// Parse the `run` field of an engine response.
///
/// A `run` that is not valid JSON is an error; it is never printed raw.
pub fn decode_run(response: &EngineResponse) -> RunResult<Value> {
    serde_json::from_str(&response.run).map_err(|e| RunError::malformed_result(e.to_string()))
}

/// Render a decoded result as pretty (indented) or single-line JSON.
pub fn render_result(result: &Value, pretty: bool) -> RunResult<String> {
    let text = if pretty {
        serde_json::to_string_pretty(result)
    } else {
        serde_json::to_string(result)
    };
    text.map_err(|e| RunError::serialization(e.to_string()))
}

/// Write a decoded result followed by a newline.
pub fn write_result<W: Write>(mut out: W, result: &Value, pretty: bool) -> RunResult<()> {
    let text = render_result(result, pretty)?;
    writeln!(out, "{}", text)
        .and_then(|_| out.flush())
        .map_err(|e| RunError::file_error("write", "<stdout>", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_run() {
        let response = EngineResponse::new(r#"[{"Date": "1991-01-01", "Yield": 0.0}]"#);
        let result = decode_run(&response).unwrap();
        assert_eq!(result[0]["Date"], "1991-01-01");
    }

    #[test]
    fn test_decode_invalid_run_fails() {
        let response = EngineResponse::new("Error: no climate data");
        let err = decode_run(&response).unwrap_err();
        assert_eq!(err.error_code(), "MALFORMED_RESULT");
    }

    #[test]
    fn test_decode_empty_run_fails() {
        assert!(decode_run(&EngineResponse::new("")).is_err());
    }

    #[test]
    fn test_write_compact() {
        let mut buf = Vec::new();
        write_result(&mut buf, &json!({"a": [1, 2]}), false).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "{\"a\":[1,2]}\n");
    }

    #[test]
    fn test_write_pretty() {
        let mut buf = Vec::new();
        write_result(&mut buf, &json!({"a": 1}), true).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "{\n  \"a\": 1\n}\n");
    }
}
