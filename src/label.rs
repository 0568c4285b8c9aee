//! Display labels that are either literal text or a reference into a string
//! table.
//!
//! Older store files write string ids as digit strings; those still load as
//! ids.

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::StringTable;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Label {
    Literal(String),
    Localized(u32),
}

impl Label {
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// Parse the on-disk form.
    pub fn parse(raw: &str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = raw.parse::<u32>() {
                return Self::Localized(id);
            }
        }
        Self::Literal(raw.to_string())
    }

    /// Text as shown to the user, resolving string ids through `strings`.
    pub fn resolve(&self, strings: &StringTable) -> String {
        match self {
            Self::Literal(text) => text.clone(),
            Self::Localized(id) => strings.get(*id).to_string(),
        }
    }

    /// Text as written into skin markup, where string ids are resolved by the
    /// host at display time.
    pub fn to_markup(&self) -> String {
        match self {
            Self::Literal(text) => text.clone(),
            Self::Localized(id) => format!("$LOCALIZE[{id}]"),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Literal(text) if text.is_empty())
    }
}

impl Default for Label {
    fn default() -> Self {
        Self::Literal(String::new())
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => f.write_str(text),
            Self::Localized(id) => write!(f, "{id}"),
        }
    }
}

/// On disk a string id is a JSON number and text is a string. Text made only
/// of digits is wrapped as `{"text": ...}` so it cannot read back as an id.
/// Digit strings are still accepted as ids, as bundled defaults write them.
impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Localized(id) => serializer.serialize_u32(*id),
            Self::Literal(text) if matches!(Label::parse(text), Self::Localized(_)) => {
                let mut tagged = serializer.serialize_struct("Label", 1)?;
                tagged.serialize_field("text", text)?;
                tagged.end()
            }
            Self::Literal(text) => serializer.serialize_str(text),
        }
    }
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Id(u32),
            Tagged { text: String },
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Label::parse(&text),
            Raw::Id(id) => Label::Localized(id),
            Raw::Tagged { text } => Label::Literal(text),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_strings_are_string_ids() {
        assert_eq!(Label::parse("30033"), Label::Localized(30033));
        assert_eq!(Label::parse("Movies"), Label::literal("Movies"));
        assert_eq!(Label::parse("12a"), Label::literal("12a"));
        assert_eq!(Label::parse(""), Label::literal(""));
    }

    #[test]
    fn serde_reads_digit_strings_as_ids() {
        let labels: Vec<Label> = serde_json::from_str(r#"["342", "Home", 20382]"#)
            .expect("labels should parse");
        assert_eq!(
            labels,
            vec![
                Label::Localized(342),
                Label::literal("Home"),
                Label::Localized(20382)
            ]
        );
        let out = serde_json::to_string(&labels).expect("labels should serialise");
        assert_eq!(out, r#"[342,"Home",20382]"#);
    }

    #[test]
    fn digit_only_text_survives_a_round_trip() {
        let labels = vec![Label::literal("1984"), Label::Localized(1984), Label::literal("")];
        let out = serde_json::to_string(&labels).expect("labels should serialise");
        assert_eq!(out, r#"[{"text":"1984"},1984,""]"#);
        let back: Vec<Label> = serde_json::from_str(&out).expect("labels should parse");
        assert_eq!(back, labels);
    }

    #[test]
    fn markup_and_display_resolution() {
        let strings = StringTable::from_pairs([(30033, "New widget")]);
        assert_eq!(Label::Localized(30033).resolve(&strings), "New widget");
        assert_eq!(Label::Localized(342).to_markup(), "$LOCALIZE[342]");
        assert_eq!(Label::literal("TV").to_markup(), "TV");
    }
}
