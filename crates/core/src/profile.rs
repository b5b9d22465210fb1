//! Profile documents — the persona input model and the merged output model.
//!
//! Source profiles are read leniently: every field is optional, a missing or
//! `null` list reads as empty, and a list written as a single scalar
//! (`"bio": "one line"`) reads as a one-element list. Unknown fields are
//! ignored.
//!
//! The merged profile is strict: every field is always present and serializes
//! in a fixed order, so two merges of the same inputs produce byte-identical
//! JSON.

use serde::de::IgnoredAny;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// One persona profile as authored on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Display name, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Capability identifiers
    #[serde(default, deserialize_with = "lenient_list")]
    pub plugins: Vec<String>,

    /// Channel identifiers
    #[serde(default, deserialize_with = "lenient_list")]
    pub clients: Vec<String>,

    /// Model provider identifier (e.g. "anthropic")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_provider: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub settings: Settings,

    #[serde(default, deserialize_with = "lenient_list")]
    pub bio: Vec<String>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub lore: Vec<String>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub knowledge: Vec<String>,

    /// Example conversations, kept as opaque JSON records
    #[serde(default, deserialize_with = "lenient_list")]
    pub message_examples: Vec<Value>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub post_examples: Vec<String>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub adjectives: Vec<String>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub people: Vec<String>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub topics: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub style: Style,
}

/// Per-profile settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Secret material. Read so that documents carrying it still parse;
    /// never copied into a merged profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets: Option<Map<String, Value>>,

    /// Voice-synthesis configuration, treated as an atomic value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<Value>,
}

/// Style directives per channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// Directives that apply everywhere
    #[serde(default, deserialize_with = "lenient_list")]
    pub all: Vec<String>,

    /// Directives for conversational replies
    #[serde(default, deserialize_with = "lenient_list")]
    pub chat: Vec<String>,

    /// Directives for standalone posts
    #[serde(default, deserialize_with = "lenient_list")]
    pub post: Vec<String>,
}

/// A resolved profile paired with the identifier it was requested under.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceProfile {
    pub id: String,
    pub profile: Profile,
}

impl SourceProfile {
    pub fn new(id: impl Into<String>, profile: Profile) -> Self {
        Self {
            id: id.into(),
            profile,
        }
    }
}

/// The single synthesized profile produced by a merge.
///
/// Field order here is the serialized key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedProfile {
    /// Output identifier, lowercased
    pub name: String,
    pub plugins: Vec<String>,
    pub clients: Vec<String>,
    pub model_provider: String,
    pub settings: MergedSettings,
    /// Generated roleplay instruction naming every source persona
    pub system: String,
    pub bio: Vec<String>,
    pub lore: Vec<String>,
    pub knowledge: Vec<String>,
    pub message_examples: Vec<Value>,
    pub post_examples: Vec<String>,
    pub adjectives: Vec<String>,
    pub people: Vec<String>,
    pub topics: Vec<String>,
    pub style: Style,
}

impl MergedProfile {
    /// Serialize as pretty-printed JSON (two-space indent, no trailing newline).
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Settings of a merged profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedSettings {
    pub secrets: NoSecrets,
    pub voice: Value,
}

/// The `secrets` slot of a merged profile. Always serializes as `{}` and
/// discards whatever it is deserialized from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoSecrets;

impl Serialize for NoSecrets {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_map(Some(0))?.end()
    }
}

impl<'de> Deserialize<'de> for NoSecrets {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IgnoredAny::deserialize(deserializer)?;
        Ok(NoSecrets)
    }
}

/// Accept a list, a single element, or `null`.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
        None => Vec::new(),
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
