use serde_json::Value;

/// Pull `generated_text` out of an object or a list of objects. Anything
/// else is passed through as its string form.
pub fn extract_generated_text(payload: Value) -> String {
    let text = match &payload {
        Value::Array(items) => items
            .first()
            .and_then(|item| item.get("generated_text"))
            .and_then(Value::as_str),
        Value::Object(map) => map.get("generated_text").and_then(Value::as_str),
        _ => None,
    };

    if let Some(text) = text {
        return text.to_string();
    }

    tracing::warn!("Unrecognized generation response shape, posting raw payload: {}", payload);
    match payload {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
