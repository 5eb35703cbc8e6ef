//! Helm-flavoured template filters
//!
//! Chart authors coming from Helm expect `toYaml`, `nindent` and friends;
//! these register them under lowercase Jinja names.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use minijinja::{Environment, Error, ErrorKind, Value};
use sha2::{Digest, Sha256};

/// Register every filter on an environment
pub fn register(env: &mut Environment<'_>) {
    env.add_filter("toyaml", toyaml);
    env.add_filter("tojson", tojson);
    env.add_filter("b64encode", b64encode);
    env.add_filter("b64decode", b64decode);
    env.add_filter("quote", quote);
    env.add_filter("squote", squote);
    env.add_filter("indent", indent);
    env.add_filter("nindent", nindent);
    env.add_filter("required", required);
    env.add_filter("trunc", trunc);
    env.add_filter("trimprefix", trimprefix);
    env.add_filter("trimsuffix", trimsuffix);
    env.add_filter("sha256", sha256sum);
}

fn invalid(message: impl std::fmt::Display) -> Error {
    Error::new(ErrorKind::InvalidOperation, message.to_string())
}

fn to_json(value: &Value) -> Result<serde_json::Value, Error> {
    serde_json::to_value(value).map_err(invalid)
}

fn as_text(value: &Value) -> String {
    value
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}

/// `{{ values.resources | toyaml }}`
pub fn toyaml(value: Value) -> Result<String, Error> {
    let yaml = serde_yaml::to_string(&to_json(&value)?).map_err(invalid)?;
    Ok(yaml.trim_start_matches("---\n").trim_end().to_string())
}

/// `{{ values.config | tojson }}`
pub fn tojson(value: Value) -> Result<String, Error> {
    serde_json::to_string(&to_json(&value)?).map_err(invalid)
}

pub fn b64encode(value: String) -> String {
    STANDARD.encode(value)
}

pub fn b64decode(value: String) -> Result<String, Error> {
    let bytes = STANDARD.decode(value).map_err(invalid)?;
    String::from_utf8(bytes).map_err(invalid)
}

/// Double-quote a value, escaping as YAML expects
pub fn quote(value: Value) -> String {
    let text = as_text(&value);
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

pub fn squote(value: Value) -> String {
    format!("'{}'", as_text(&value).replace('\'', "''"))
}

/// Prefix every non-empty line with `spaces` spaces
pub fn indent(value: String, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    value
        .lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Same as `indent`, with a leading newline
pub fn nindent(value: String, spaces: usize) -> String {
    format!("\n{}", indent(value, spaces))
}

/// `{{ values.host | required("host is required") }}`
pub fn required(value: Value, message: Option<String>) -> Result<Value, Error> {
    let missing = value.is_undefined()
        || value.is_none()
        || value.as_str().is_some_and(str::is_empty);

    if missing {
        Err(invalid(
            message.unwrap_or_else(|| "required value is missing".to_string()),
        ))
    } else {
        Ok(value)
    }
}

/// Keep at most `length` characters
pub fn trunc(value: String, length: usize) -> String {
    value.chars().take(length).collect()
}

pub fn trimprefix(value: String, prefix: String) -> String {
    value.strip_prefix(prefix.as_str()).unwrap_or(&value).to_string()
}

pub fn trimsuffix(value: String, suffix: String) -> String {
    value.strip_suffix(suffix.as_str()).unwrap_or(&value).to_string()
}

pub fn sha256sum(value: String) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toyaml_strips_document_marker() {
        let value = Value::from_serialize(serde_json::json!({"cpu": "100m"}));
        assert_eq!(toyaml(value).unwrap(), "cpu: 100m");
    }

    #[test]
    fn test_nindent() {
        assert_eq!(nindent("a: 1\n\nb: 2".to_string(), 2), "\n  a: 1\n\n  b: 2");
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote(Value::from("say \"hi\"")), "\"say \\\"hi\\\"\"");
        assert_eq!(quote(Value::from(3)), "\"3\"");
    }

    #[test]
    fn test_b64_round_trip() {
        let encoded = b64encode("secret".to_string());
        assert_eq!(encoded, "c2VjcmV0");
        assert_eq!(b64decode(encoded).unwrap(), "secret");
    }

    #[test]
    fn test_required() {
        assert!(required(Value::UNDEFINED, None).is_err());
        assert!(required(Value::from(""), Some("host".to_string())).is_err());
        assert!(required(Value::from("x"), None).is_ok());
    }

    #[test]
    fn test_trunc_is_char_based() {
        assert_eq!(trunc("héllo".to_string(), 2), "hé");
        assert_eq!(trunc("ab".to_string(), 63), "ab");
    }
}
