use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{Formatter, Serializer};
use std::io;

/// Pick the conversation out of a chat row: its `conversation` field when
/// present (even if null), otherwise the whole row.
pub fn conversation_payload(row: &Value) -> &Value {
    row.get("conversation").unwrap_or(row)
}

/// Flatten a conversation into plain text for search and fallback display.
///
/// A message list renders one line per message as `role: content`, or bare
/// `content` when the role is empty. Non-object entries and messages without
/// content are dropped. Any other shape renders as ASCII-only compact JSON.
pub fn conversation_to_text(conv: &Value) -> Result<String, serde_json::Error> {
    match conv {
        Value::Array(messages) => Ok(messages
            .iter()
            .filter_map(render_message)
            .collect::<Vec<_>>()
            .join("\n")),
        other => to_ascii_json(other),
    }
}

fn render_message(msg: &Value) -> Option<String> {
    let obj = msg.as_object()?;
    let role = text_of(obj.get("role"));
    let content = text_of(obj.get("content"));
    let (role, content) = (role.trim(), content.trim());
    match (role.is_empty(), content.is_empty()) {
        (_, true) => None,
        (true, false) => Some(content.to_string()),
        (false, false) => Some(format!("{role}: {content}")),
    }
}

fn text_of(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Serialize `value` as compact JSON with every character outside printable
/// ASCII written as a `\uXXXX` escape.
pub fn to_ascii_json(value: &Value) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, AsciiFormatter);
    value.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            if (' '..='~').contains(&c) {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = i + c.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_role_and_content_lines() {
        let conv = json!([
            {"role": "user", "content": "hi"},
            {"role": "assistant", "content": "  hello there  "}
        ]);
        assert_eq!(
            conversation_to_text(&conv).unwrap(),
            "user: hi\nassistant: hello there"
        );
    }

    #[test]
    fn bare_content_when_role_missing() {
        let conv = json!([
            {"content": "no role"},
            {"role": "  ", "content": "blank role"}
        ]);
        assert_eq!(conversation_to_text(&conv).unwrap(), "no role\nblank role");
    }

    #[test]
    fn drops_non_objects_and_empty_content() {
        let conv = json!([
            "stray string",
            42,
            {"role": "user"},
            {"role": "user", "content": "   "},
            {},
            {"role": "user", "content": "kept"}
        ]);
        assert_eq!(conversation_to_text(&conv).unwrap(), "user: kept");
    }

    #[test]
    fn non_string_fields_coerced_to_text() {
        let conv = json!([
            {"role": "tool", "content": 7},
            {"role": null, "content": true}
        ]);
        assert_eq!(conversation_to_text(&conv).unwrap(), "tool: 7\ntrue");
    }

    #[test]
    fn null_fields_read_as_empty() {
        let conv = json!([
            {"role": null, "content": "hi"},
            {"role": "user", "content": null}
        ]);
        assert_eq!(conversation_to_text(&conv).unwrap(), "hi");
    }

    #[test]
    fn empty_list_is_empty_text() {
        assert_eq!(conversation_to_text(&json!([])).unwrap(), "");
    }

    #[test]
    fn non_list_renders_ascii_json() {
        let conv = json!({"text": "café ☕", "turns": [1, 2]});
        assert_eq!(
            conversation_to_text(&conv).unwrap(),
            r#"{"text":"caf\u00e9 \u2615","turns":[1,2]}"#
        );
    }

    #[test]
    fn astral_chars_escape_as_surrogate_pairs() {
        assert_eq!(to_ascii_json(&json!("😀")).unwrap(), r#""\ud83d\ude00""#);
    }

    #[test]
    fn control_and_del_chars_escaped() {
        assert_eq!(
            to_ascii_json(&json!("a\n\u{7f}\"b")).unwrap(),
            r#""a\n\u007f\"b""#
        );
    }

    #[test]
    fn scalar_conversation_renders_as_json() {
        assert_eq!(conversation_to_text(&json!("plain")).unwrap(), r#""plain""#);
        assert_eq!(conversation_to_text(&Value::Null).unwrap(), "null");
    }

    #[test]
    fn payload_prefers_conversation_field() {
        let row = json!({"conversation": [{"role": "user", "content": "hi"}], "meta": 1});
        assert_eq!(
            conversation_payload(&row),
            &json!([{"role": "user", "content": "hi"}])
        );
    }

    #[test]
    fn payload_falls_back_to_whole_row() {
        let row = json!({"messages": []});
        assert_eq!(conversation_payload(&row), &row);
        let list = json!([{"role": "user", "content": "hi"}]);
        assert_eq!(conversation_payload(&list), &list);
    }

    #[test]
    fn payload_keeps_explicit_null() {
        let row = json!({"conversation": null});
        assert_eq!(conversation_payload(&row), &Value::Null);
    }
}
