//! Data models for MailHog API payloads.

use log::trace;
use serde::Deserialize;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use std::fmt;

/// Content-Type fragments identifying a plain text part.
const TEXT_CONTENT_TYPES: &[&str] = &["text/plain", "txt"];
/// Content-Type fragments identifying an HTML part.
const HTML_CONTENT_TYPES: &[&str] = &["html"];

/// Case-insensitive, ordered header bag.
///
/// Each header name maps to one or more values. Lookups ignore ASCII case and
/// return the first value stored for a name. Names that differ only by case are
/// merged into the entry that appeared first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, Vec<String>)>,
}

impl Headers {
    /// Create an empty header bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// First value of the header `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    /// Every value of the header `name`, in the order the server sent them.
    ///
    /// Returns an empty slice when the header is absent.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    /// Whether the header `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .iter()
            .any(|(key, _)| key.eq_ignore_ascii_case(name))
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no header is present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over header names and their values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    fn extend_values(&mut self, name: String, values: Vec<String>) {
        match self
            .entries
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(&name))
        {
            Some((_, existing)) => existing.extend(values),
            None => self.entries.push((name, values)),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.extend_values(name.into(), vec![value.into()]);
        }
        headers
    }
}

/// A header value as MailHog encodes it: usually a list, sometimes a bare string.
#[derive(Deserialize)]
#[serde(untagged)]
enum HeaderValues {
    One(String),
    Many(Vec<String>),
}

impl From<HeaderValues> for Vec<String> {
    fn from(values: HeaderValues) -> Self {
        match values {
            HeaderValues::One(value) => vec![value],
            HeaderValues::Many(values) => values,
        }
    }
}

impl<'de> Deserialize<'de> for Headers {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct HeadersVisitor;

        impl<'de> Visitor<'de> for HeadersVisitor {
            type Value = Headers;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of header names to a value or a list of values")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Headers, E> {
                Ok(Headers::new())
            }

            fn visit_map<A>(self, mut map: A) -> Result<Headers, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut headers = Headers::new();
                while let Some((name, values)) = map.next_entry::<String, HeaderValues>()? {
                    headers.extend_values(name, values.into());
                }
                Ok(headers)
            }
        }

        deserializer.deserialize_any(HeadersVisitor)
    }
}

/// One MIME sub-part of a captured message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MimePart {
    /// Headers of this part, `Content-Type` among them.
    #[serde(rename = "Headers", default)]
    pub headers: Headers,
    /// Raw body of this part, still transfer-encoded.
    #[serde(rename = "Body", default)]
    pub body: String,
}

impl MimePart {
    fn content_type_contains(&self, fragments: &[&str]) -> bool {
        self.headers
            .get_all("Content-Type")
            .iter()
            .any(|line| fragments.iter().any(|fragment| line.contains(fragment)))
    }
}

/// A message item exactly as the API returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMessage {
    #[serde(rename = "ID", deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(rename = "Content")]
    pub content: RawContent,
    #[serde(rename = "MIME", default)]
    pub mime: Option<RawMime>,
}

/// Top-level content of a [`RawMessage`].
#[derive(Debug, Clone, Deserialize)]
pub struct RawContent {
    #[serde(rename = "Body")]
    pub body: String,
    #[serde(rename = "Headers")]
    pub headers: Headers,
}

/// MIME structure of a [`RawMessage`]; absent for single-part messages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMime {
    #[serde(rename = "Parts", default)]
    pub parts: Vec<MimePart>,
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(id) => id,
        Id::Number(id) => id.to_string(),
    })
}

/// An immutable captured message.
///
/// Built from a [`RawMessage`] with [`Message::from_raw`]; every accessor
/// borrows from the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: String,
    body: String,
    headers: Headers,
    parts: Vec<MimePart>,
}

impl Message {
    /// Translate a raw API item into a message.
    pub fn from_raw(raw: RawMessage) -> Self {
        Self {
            id: raw.id,
            body: raw.content.body,
            headers: raw.content.headers,
            parts: raw.mime.map(|mime| mime.parts).unwrap_or_default(),
        }
    }

    /// MailHog's identifier for this message.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Raw body of the whole message.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// First `From` header value.
    pub fn from(&self) -> Option<&str> {
        self.headers.get("From")
    }

    /// First `To` header value.
    pub fn to(&self) -> Option<&str> {
        self.headers.get("To")
    }

    /// First `Subject` header value.
    pub fn subject(&self) -> Option<&str> {
        self.headers.get("Subject")
    }

    /// First `Reply-To` header value, if any.
    pub fn reply_to(&self) -> Option<&str> {
        self.headers.get("Reply-To")
    }

    /// First `Return-Path` header value, if any.
    pub fn return_path(&self) -> Option<&str> {
        self.headers.get("Return-Path")
    }

    /// First value of an arbitrary header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Every top-level header of the message.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// MIME sub-parts in server order. Empty for single-part messages.
    pub fn parts(&self) -> &[MimePart] {
        &self.parts
    }

    /// Body of the first part whose `Content-Type` marks it as plain text.
    pub fn text_part(&self) -> Option<&str> {
        self.find_part(TEXT_CONTENT_TYPES)
    }

    /// Body of the first part whose `Content-Type` marks it as HTML.
    pub fn html_part(&self) -> Option<&str> {
        self.find_part(HTML_CONTENT_TYPES)
    }

    fn find_part(&self, fragments: &[&str]) -> Option<&str> {
        self.parts
            .iter()
            .find(|part| part.content_type_contains(fragments))
            .map(|part| part.body.as_str())
    }
}

/// Enables `raw.into()`.
///
/// `Message::from(raw)` does not resolve to this impl: the inherent
/// [`Message::from`] header accessor takes precedence. Use
/// [`Message::from_raw`] or `.into()` instead.
impl From<RawMessage> for Message {
    fn from(raw: RawMessage) -> Self {
        Message::from_raw(raw)
    }
}

/// Response envelope shared by the `messages` and `search` endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct MessageList {
    #[serde(default)]
    pub(crate) total: Option<usize>,
    #[serde(default)]
    pub(crate) items: Option<Vec<RawMessage>>,
}

/// Forward-only sequence of messages returned by a query.
///
/// Raw items are translated into [`Message`] values one at a time as the
/// sequence is consumed. It cannot be rewound; run the query again to get a
/// fresh sequence.
#[derive(Debug)]
pub struct Messages {
    items: std::vec::IntoIter<RawMessage>,
    total: Option<usize>,
}

impl Messages {
    pub(crate) fn new(list: MessageList) -> Self {
        Self {
            items: list.items.unwrap_or_default().into_iter(),
            total: list.total,
        }
    }

    /// Total number of matching messages the server reported, which may be
    /// larger than the number of items returned.
    pub fn total(&self) -> Option<usize> {
        self.total
    }
}

impl Iterator for Messages {
    type Item = Message;

    fn next(&mut self) -> Option<Message> {
        let raw = self.items.next()?;
        trace!("decoded message {}", raw.id);
        Some(Message::from_raw(raw))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl ExactSizeIterator for Messages {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(value: serde_json::Value) -> Message {
        Message::from_raw(serde_json::from_value(value).unwrap())
    }

    fn part(content_type: &str, body: &str) -> serde_json::Value {
        json!({ "Headers": { "Content-Type": [content_type] }, "Body": body })
    }

    #[test]
    fn decodes_plain_message_without_mime() {
        let msg = message(json!({
            "ID": "x",
            "Content": {
                "Body": "b",
                "Headers": { "To": "t", "From": "f", "Subject": "s" }
            },
            "MIME": null
        }));

        assert_eq!(msg.id(), "x");
        assert_eq!(msg.to(), Some("t"));
        assert_eq!(msg.from(), Some("f"));
        assert_eq!(msg.subject(), Some("s"));
        assert_eq!(msg.body(), "b");
        assert!(msg.parts().is_empty());
        assert_eq!(msg.text_part(), None);
        assert_eq!(msg.html_part(), None);
    }

    #[test]
    fn raw_message_converts_with_into() {
        let raw: RawMessage = serde_json::from_value(json!({
            "ID": "x",
            "Content": { "Body": "b", "Headers": { "From": ["f@example.com"] } }
        }))
        .unwrap();

        let msg: Message = raw.clone().into();

        assert_eq!(msg, Message::from_raw(raw));
        assert_eq!(msg.from(), Some("f@example.com"));
    }

    #[test]
    fn header_lookup_ignores_case_and_returns_first_value() {
        let msg = message(json!({
            "ID": 42,
            "Content": {
                "Body": "",
                "Headers": {
                    "reply-to": ["first@example.com", "second@example.com"],
                    "RETURN-PATH": ["<bounce@example.com>"],
                    "Received": ["a", "b"]
                }
            }
        }));

        assert_eq!(msg.id(), "42");
        assert_eq!(msg.reply_to(), Some("first@example.com"));
        assert_eq!(msg.return_path(), Some("<bounce@example.com>"));
        assert_eq!(msg.headers().get_all("received"), ["a", "b"]);
        assert_eq!(msg.header("X-Missing"), None);
        assert!(msg.headers().get_all("X-Missing").is_empty());
    }

    #[test]
    fn names_differing_in_case_are_merged() {
        let headers: Headers = serde_json::from_value(json!({
            "To": ["a@example.com"],
            "to": ["b@example.com"]
        }))
        .unwrap();

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("TO"), Some("a@example.com"));
        assert_eq!(headers.get_all("To"), ["a@example.com", "b@example.com"]);
    }

    #[test]
    fn null_headers_decode_as_empty() {
        let headers: Headers = serde_json::from_value(json!(null)).unwrap();
        assert!(headers.is_empty());
    }

    #[test]
    fn headers_keep_insertion_order() {
        let headers: Headers = [("Subject", "hi"), ("From", "me"), ("To", "you")]
            .into_iter()
            .collect();
        let names: Vec<&str> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["Subject", "From", "To"]);
    }

    #[test]
    fn resolves_text_and_html_parts_by_scanning() {
        let msg = message(json!({
            "ID": "1",
            "Content": { "Body": "", "Headers": {} },
            "MIME": { "Parts": [part("text/plain", "T"), part("text/html", "H")] }
        }));

        assert_eq!(msg.text_part(), Some("T"));
        assert_eq!(msg.html_part(), Some("H"));
    }

    #[test]
    fn part_lookup_ignores_position() {
        // html first, text third: a positional guess would pick the wrong part
        let msg = message(json!({
            "ID": "1",
            "Content": { "Body": "", "Headers": {} },
            "MIME": { "Parts": [
                part("text/html; charset=utf-8", "H"),
                part("image/png", "PNG"),
                part("text/plain; charset=utf-8", "T")
            ] }
        }));

        assert_eq!(msg.text_part(), Some("T"));
        assert_eq!(msg.html_part(), Some("H"));
    }

    #[test]
    fn parts_without_content_type_are_skipped() {
        let msg = message(json!({
            "ID": "1",
            "Content": { "Body": "", "Headers": {} },
            "MIME": { "Parts": [
                { "Headers": { "Content-Transfer-Encoding": ["7bit"] }, "Body": "no type" },
                { "Body": "no headers" },
                part("text/html", "H")
            ] }
        }));

        assert_eq!(msg.html_part(), Some("H"));
        assert_eq!(msg.text_part(), None);
    }

    #[test]
    fn every_content_type_line_is_checked() {
        let msg = message(json!({
            "ID": "1",
            "Content": { "Body": "", "Headers": {} },
            "MIME": { "Parts": [
                { "Headers": { "Content-Type": ["multipart/alternative", "text/html"] }, "Body": "H" },
                { "Headers": { "Content-Type": ["application/txt"] }, "Body": "T" }
            ] }
        }));

        assert_eq!(msg.html_part(), Some("H"));
        assert_eq!(msg.text_part(), Some("T"));
    }

    #[test]
    fn missing_content_is_an_error() {
        let raw = serde_json::from_value::<RawMessage>(json!({ "ID": "1" }));
        assert!(raw.is_err());
    }

    #[test]
    fn messages_are_yielded_in_order_and_once() {
        let list: MessageList = serde_json::from_value(json!({
            "total": 5,
            "items": [
                { "ID": "a", "Content": { "Body": "", "Headers": {} } },
                { "ID": "b", "Content": { "Body": "", "Headers": {} } }
            ]
        }))
        .unwrap();
        let mut messages = Messages::new(list);

        assert_eq!(messages.total(), Some(5));
        assert_eq!(messages.len(), 2);
        assert_eq!(messages.next().map(|m| m.id().to_string()), Some("a".into()));
        assert_eq!(messages.next().map(|m| m.id().to_string()), Some("b".into()));
        assert!(messages.next().is_none());
    }

    #[test]
    fn null_items_decode_as_empty_sequence() {
        let list: MessageList = serde_json::from_value(json!({ "items": null })).unwrap();
        assert_eq!(Messages::new(list).count(), 0);
    }
}
