//! Message content segmentation
//!
//! Splits raw message text into an ordered list of prose and fenced code
//! spans so the UI can give code blocks their own display treatment.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Whether a span holds prose or the body of a fenced code block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    Text,
    Code,
}

impl SpanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpanKind::Text => "text",
            SpanKind::Code => "code",
        }
    }
}

/// A typed chunk of message content. Content is always trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub kind: SpanKind,
    pub content: String,
}

impl Span {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: SpanKind::Text,
            content: content.into(),
        }
    }

    pub fn code(content: impl Into<String>) -> Self {
        Self {
            kind: SpanKind::Code,
            content: content.into(),
        }
    }

    pub fn is_code(&self) -> bool {
        self.kind == SpanKind::Code
    }
}

// Three backticks, an optional language tag that must end the fence line,
// then the shortest body up to the next three backticks.
fn fence_pattern() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"```(?:[A-Za-z0-9_]*\r?\n)?((?s:.)*?)```").expect("fence pattern compiles")
    })
}

fn push_trimmed(spans: &mut Vec<Span>, kind: SpanKind, raw: &str) {
    let content = raw.trim();
    if !content.is_empty() {
        spans.push(Span {
            kind,
            content: content.to_string(),
        });
    }
}

/// Partition `text` into prose and code spans, in order of appearance.
///
/// Language tags on opening fences are dropped, every span is trimmed, and
/// spans that trim to nothing are left out. An opening fence without a
/// matching close is kept as plain text.
pub fn segment(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    for caps in fence_pattern().captures_iter(text) {
        let (Some(fence), Some(body)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        push_trimmed(&mut spans, SpanKind::Text, &text[cursor..fence.start()]);
        push_trimmed(&mut spans, SpanKind::Code, body.as_str());
        cursor = fence.end();
    }

    push_trimmed(&mut spans, SpanKind::Text, &text[cursor..]);
    spans
}

/// Same as [`segment`], treating a missing message as empty.
pub fn segment_opt(text: Option<&str>) -> Vec<Span> {
    segment(text.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_single_trimmed_span() {
        assert_eq!(segment("  hello world \n"), vec![Span::text("hello world")]);
    }

    #[test]
    fn test_empty_and_blank_inputs() {
        assert!(segment("").is_empty());
        assert!(segment(" \n\t ").is_empty());
        assert!(segment_opt(None).is_empty());
    }

    #[test]
    fn test_bare_fence() {
        assert_eq!(segment("```code```"), vec![Span::code("code")]);
    }

    #[test]
    fn test_text_code_text_order() {
        assert_eq!(
            segment("pre ```x``` post"),
            vec![Span::text("pre"), Span::code("x"), Span::text("post")]
        );
    }

    #[test]
    fn test_language_tag_and_line_break_discarded() {
        assert_eq!(
            segment("```js\nconsole.log(1)\n```"),
            vec![Span::code("console.log(1)")]
        );
    }

    #[test]
    fn test_language_tag_with_crlf() {
        assert_eq!(
            segment("```rust\r\nfn main() {}\r\n```"),
            vec![Span::code("fn main() {}")]
        );
    }

    #[test]
    fn test_tag_without_line_break_stays_in_body() {
        assert_eq!(
            segment("```python print(1)```"),
            vec![Span::code("python print(1)")]
        );
    }

    #[test]
    fn test_whitespace_only_fence_dropped() {
        assert!(segment("``` ``` ").is_empty());
        assert!(segment("``````").is_empty());
        assert!(segment("```sh\n\n```").is_empty());
    }

    #[test]
    fn test_unterminated_fence_is_text() {
        assert_eq!(
            segment("``` unterminated"),
            vec![Span::text("``` unterminated")]
        );
    }

    #[test]
    fn test_consecutive_fences_have_no_empty_text_between() {
        assert_eq!(
            segment("```a``` \n ```b```"),
            vec![Span::code("a"), Span::code("b")]
        );
    }

    #[test]
    fn test_body_stops_at_first_closing_fence() {
        assert_eq!(
            segment("```one``` middle ```two``` ```"),
            vec![
                Span::code("one"),
                Span::text("middle"),
                Span::code("two"),
                Span::text("```"),
            ]
        );
    }

    #[test]
    fn test_multiline_reply() {
        let reply = "Here is an example:\n\n```rust\nfn add(a: i32, b: i32) -> i32 {\n    a + b\n}\n```\n\nCall it with `add(1, 2)`.";
        let spans = segment(reply);
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0], Span::text("Here is an example:"));
        assert_eq!(
            spans[1],
            Span::code("fn add(a: i32, b: i32) -> i32 {\n    a + b\n}")
        );
        assert_eq!(spans[2], Span::text("Call it with `add(1, 2)`."));
    }

    #[test]
    fn test_inner_indentation_preserved() {
        let spans = segment("```\n    indented\n  less\n```");
        assert_eq!(spans, vec![Span::code("indented\n  less")]);
    }

    #[test]
    fn test_resegmenting_text_span_is_stable() {
        let first = segment("  intro  ```x```  outro ");
        for span in first.iter().filter(|s| !s.is_code()) {
            assert_eq!(segment(&span.content), vec![span.clone()]);
        }
    }

    #[test]
    fn test_deterministic() {
        let input = "a ```b``` c ```d\ne``` f";
        assert_eq!(segment(input), segment(input));
    }

    #[test]
    fn test_serializes_kind_lowercase() {
        let json = serde_json::to_string(&Span::code("x")).unwrap();
        assert_eq!(json, r#"{"kind":"code","content":"x"}"#);
    }
}
