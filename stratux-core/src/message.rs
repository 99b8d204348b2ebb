//! Split raw hub frames into ordered tag/value pairs.
//!
//! Frames look like flat JSON objects (`{"Tag":Value,"Other":"text"}`), but
//! the link is lossy and frames arrive truncated or mangled, so this is not a
//! JSON parser. It splits on commas, then on the first `":` of each fragment:
//! - Fragments without `":` are dropped and counted as malformed
//! - Tags lose surrounding whitespace, quotes, and a leading `{`
//! - Values lose surrounding whitespace, trailing `}`, then surrounding quotes
//!
//! No type checking happens here; decoders coerce values.

/// A parsed frame borrowing from the raw text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message<'a> {
    /// The frame exactly as received.
    pub raw: &'a str,
    /// `(tag, value)` pairs in arrival order, duplicates kept.
    pub fields: Vec<(&'a str, &'a str)>,
    /// Non-blank fragments that did not split into a tag and a value.
    pub malformed: usize,
}

impl<'a> Message<'a> {
    /// Last value seen for `tag`.
    pub fn get(&self, tag: &str) -> Option<&'a str> {
        self.fields
            .iter()
            .rev()
            .find(|(t, _)| *t == tag)
            .map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Parse one frame. Never fails; bad fragments are skipped.
pub fn parse_message(frame: &str) -> Message<'_> {
    let mut msg = Message {
        raw: frame,
        ..Message::default()
    };

    for fragment in frame.split(',') {
        if fragment.trim().is_empty() {
            continue;
        }
        match split_fragment(fragment) {
            Some(field) => msg.fields.push(field),
            None => msg.malformed += 1,
        }
    }

    msg
}

fn split_fragment(fragment: &str) -> Option<(&str, &str)> {
    let (tag, value) = fragment.split_once("\":")?;
    let tag = clean_tag(tag);
    if tag.is_empty() {
        return None;
    }
    Some((tag, clean_value(value)))
}

fn clean_tag(tag: &str) -> &str {
    tag.trim_matches(|c: char| c == '{' || c == '"' || c.is_whitespace())
}

fn clean_value(value: &str) -> &str {
    value.trim().trim_end_matches('}').trim().trim_matches('"')
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
