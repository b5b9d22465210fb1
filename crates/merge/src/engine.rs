//! Merge engine — builds one [`MergedProfile`] from ordered source profiles.

use chimera_core::profile::{MergedProfile, MergedSettings, NoSecrets, Profile, SourceProfile, Style};
use serde_json::{Value, json};

use crate::style::reconcile_style_rules;
use crate::union::{union_unique, union_values};

/// Model provider used when no source defines one.
pub const DEFAULT_MODEL_PROVIDER: &str = "anthropic";

/// Voice model used when no source defines a voice.
pub const DEFAULT_VOICE_MODEL: &str = "en_US-hfc_female-medium";

/// Fallback values for the scalar fields of a merged profile.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeDefaults {
    pub model_provider: String,
    pub voice: Value,
}

impl Default for MergeDefaults {
    fn default() -> Self {
        Self {
            model_provider: DEFAULT_MODEL_PROVIDER.into(),
            voice: json!({ "model": DEFAULT_VOICE_MODEL }),
        }
    }
}

/// Combines source profiles into a merged profile.
///
/// Stateless apart from its defaults: the same sources in the same order
/// always produce the same output.
#[derive(Debug, Clone, Default)]
pub struct ProfileMerger {
    defaults: MergeDefaults,
}

impl ProfileMerger {
    pub fn new(defaults: MergeDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &MergeDefaults {
        &self.defaults
    }

    /// Merge `sources` (in priority order) into a profile named `output`.
    ///
    /// Zero sources is allowed and yields a profile holding only defaults.
    pub fn merge(&self, output: &str, sources: &[SourceProfile]) -> MergedProfile {
        let name = output.to_lowercase();
        let source_ids: Vec<&str> = sources.iter().map(|s| s.id.as_str()).collect();

        MergedProfile {
            system: system_prompt(&name, &source_ids),
            name,
            plugins: union_field(sources, |p| p.plugins.as_slice()),
            clients: union_field(sources, |p| p.clients.as_slice()),
            model_provider: self.select_model_provider(sources),
            settings: MergedSettings {
                secrets: NoSecrets,
                voice: self.select_voice(sources),
            },
            bio: union_field(sources, |p| p.bio.as_slice()),
            lore: union_field(sources, |p| p.lore.as_slice()),
            knowledge: union_field(sources, |p| p.knowledge.as_slice()),
            message_examples: union_values(
                sources.iter().map(|s| s.profile.message_examples.as_slice()),
            ),
            post_examples: union_field(sources, |p| p.post_examples.as_slice()),
            adjectives: union_field(sources, |p| p.adjectives.as_slice()),
            people: union_field(sources, |p| p.people.as_slice()),
            topics: union_field(sources, |p| p.topics.as_slice()),
            style: Style {
                all: style_field(sources, |p| p.style.all.as_slice()),
                chat: style_field(sources, |p| p.style.chat.as_slice()),
                post: style_field(sources, |p| p.style.post.as_slice()),
            },
        }
    }

    /// First non-empty provider in source order, else the default.
    ///
    /// A leading source without a provider does not force the default; the
    /// next source that names one wins.
    fn select_model_provider(&self, sources: &[SourceProfile]) -> String {
        sources
            .iter()
            .filter_map(|s| s.profile.model_provider.as_deref())
            .find(|provider| !provider.is_empty())
            .unwrap_or(&self.defaults.model_provider)
            .to_string()
    }

    /// First non-null voice in source order, else the default.
    ///
    /// This looks past leading sources that have no voice instead of reading
    /// only the first source, so putting a voiceless profile first does not
    /// discard a voice configured further down.
    fn select_voice(&self, sources: &[SourceProfile]) -> Value {
        sources
            .iter()
            .filter_map(|s| s.profile.settings.voice.as_ref())
            .find(|voice| !voice.is_null())
            .unwrap_or(&self.defaults.voice)
            .clone()
    }
}

/// The generated `system` instruction for a merged profile.
pub(crate) fn system_prompt(name: &str, source_ids: &[&str]) -> String {
    format!(
        "Roleplay as {name}, combining traits of {}.",
        source_ids.join(", ")
    )
}

fn union_field<F>(sources: &[SourceProfile], select: F) -> Vec<String>
where
    F: Fn(&Profile) -> &[String],
{
    union_unique(sources.iter().map(|s| select(&s.profile)))
}

fn style_field<F>(sources: &[SourceProfile], select: F) -> Vec<String>
where
    F: Fn(&Profile) -> &[String],
{
    reconcile_style_rules(sources.iter().map(|s| select(&s.profile)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chimera_core::profile::Settings;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn source(id: &str, profile: Profile) -> SourceProfile {
        SourceProfile::new(id, profile)
    }

    fn alice() -> Profile {
        Profile {
            plugins: strings(&["@elizaos/plugin-bootstrap"]),
            clients: strings(&["twitter"]),
            model_provider: Some("openai".into()),
            settings: Settings {
                secrets: None,
                voice: Some(json!({"model": "en_GB-alan-medium"})),
            },
            bio: strings(&["builds compilers"]),
            topics: strings(&["rust", "parsers"]),
            post_examples: strings(&["shipping a lexer today"]),
            style: Style {
                all: strings(&["be concise"]),
                chat: strings(&["never use slang"]),
                post: vec![],
            },
            ..Profile::default()
        }
    }

    fn bob() -> Profile {
        Profile {
            plugins: strings(&["@elizaos/plugin-bootstrap", "@elizaos/plugin-image"]),
            clients: strings(&["discord"]),
            model_provider: Some("anthropic".into()),
            settings: Settings {
                secrets: None,
                voice: Some(json!({"model": "en_US-amy-low"})),
            },
            bio: strings(&["collects vinyl"]),
            topics: strings(&["parsers", "music"]),
            style: Style {
                all: strings(&["be warm"]),
                chat: strings(&["I use slang constantly"]),
                post: strings(&["no hashtags"]),
            },
            ..Profile::default()
        }
    }

    #[test]
    fn list_fields_are_unioned_in_source_order() {
        let merged = ProfileMerger::default().merge(
            "Duo",
            &[source("alice", alice()), source("bob", bob())],
        );

        assert_eq!(
            merged.plugins,
            strings(&["@elizaos/plugin-bootstrap", "@elizaos/plugin-image"])
        );
        assert_eq!(merged.clients, strings(&["twitter", "discord"]));
        assert_eq!(merged.topics, strings(&["rust", "parsers", "music"]));
        assert_eq!(merged.bio, strings(&["builds compilers", "collects vinyl"]));
    }

    #[test]
    fn name_is_lowercased_and_system_names_sources() {
        let merged = ProfileMerger::default().merge(
            "DuoBot",
            &[source("alice", alice()), source("bob", bob())],
        );
        assert_eq!(merged.name, "duobot");
        assert_eq!(
            merged.system,
            "Roleplay as duobot, combining traits of alice, bob."
        );
    }

    #[test]
    fn scalars_come_from_first_source() {
        let merged = ProfileMerger::default().merge(
            "duo",
            &[source("alice", alice()), source("bob", bob())],
        );
        assert_eq!(merged.model_provider, "openai");
        assert_eq!(merged.settings.voice, json!({"model": "en_GB-alan-medium"}));
    }

    #[test]
    fn merge_is_order_sensitive() {
        let merger = ProfileMerger::default();
        let ab = merger.merge("duo", &[source("alice", alice()), source("bob", bob())]);
        let ba = merger.merge("duo", &[source("bob", bob()), source("alice", alice())]);

        assert_ne!(ab.model_provider, ba.model_provider);
        assert_ne!(ab.settings.voice, ba.settings.voice);
        assert_ne!(ab.system, ba.system);
        assert_ne!(ab.topics, ba.topics);

        let mut ab_topics = ab.topics.clone();
        let mut ba_topics = ba.topics.clone();
        ab_topics.sort();
        ba_topics.sort();
        assert_eq!(ab_topics, ba_topics);
    }

    #[test]
    fn scalars_skip_sources_that_do_not_define_them() {
        let blank = Profile {
            model_provider: Some(String::new()),
            ..Profile::default()
        };
        let merged = ProfileMerger::default().merge(
            "duo",
            &[source("blank", blank), source("bob", bob())],
        );
        assert_eq!(merged.model_provider, "anthropic");
        assert_eq!(merged.settings.voice, json!({"model": "en_US-amy-low"}));
    }

    #[test]
    fn defaults_apply_when_no_source_defines_scalars() {
        let merged = ProfileMerger::default().merge(
            "duo",
            &[source("a", Profile::default()), source("b", Profile::default())],
        );
        assert_eq!(merged.model_provider, DEFAULT_MODEL_PROVIDER);
        assert_eq!(merged.settings.voice, json!({"model": DEFAULT_VOICE_MODEL}));
    }

    #[test]
    fn configured_defaults_are_used() {
        let merger = ProfileMerger::new(MergeDefaults {
            model_provider: "ollama".into(),
            voice: json!({"model": "custom"}),
        });
        let merged = merger.merge("solo", &[source("a", Profile::default())]);
        assert_eq!(merged.model_provider, "ollama");
        assert_eq!(merged.settings.voice, json!({"model": "custom"}));
    }

    #[test]
    fn style_channels_are_reconciled_independently() {
        let merged = ProfileMerger::default().merge(
            "duo",
            &[source("alice", alice()), source("bob", bob())],
        );
        assert_eq!(merged.style.all, strings(&["be concise", "be warm"]));
        assert_eq!(merged.style.chat, strings(&["I use slang constantly"]));
        assert_eq!(merged.style.post, strings(&["no hashtags"]));
    }

    #[test]
    fn secrets_are_never_carried_over() {
        let mut secretive = alice();
        secretive.settings.secrets = Some(
            json!({"TWITTER_PASSWORD": "hunter2"})
                .as_object()
                .cloned()
                .unwrap(),
        );
        let merged = ProfileMerger::default().merge("solo", &[source("alice", secretive)]);

        let value = serde_json::to_value(&merged).unwrap();
        assert_eq!(value["settings"]["secrets"], json!({}));
        assert!(!merged.to_pretty_json().unwrap().contains("hunter2"));
    }

    #[test]
    fn missing_fields_are_emitted_as_empty_lists() {
        let merged = ProfileMerger::default().merge(
            "duo",
            &[source("a", Profile::default()), source("b", Profile::default())],
        );
        let value = serde_json::to_value(&merged).unwrap();
        assert_eq!(value["topics"], json!([]));
        assert_eq!(value["messageExamples"], json!([]));
        assert_eq!(value["style"], json!({"all": [], "chat": [], "post": []}));
    }

    #[test]
    fn merging_a_profile_with_itself_adds_nothing() {
        let merger = ProfileMerger::default();
        let once = merger.merge("x", &[source("alice", alice())]);
        let twice = merger.merge("x", &[source("alice", alice()), source("alice", alice())]);

        assert_eq!(once.plugins, twice.plugins);
        assert_eq!(once.bio, twice.bio);
        assert_eq!(once.topics, twice.topics);
        assert_eq!(once.post_examples, twice.post_examples);
        assert_eq!(once.message_examples, twice.message_examples);
        assert_eq!(once.style, twice.style);
    }

    #[test]
    fn zero_sources_yield_defaults_only() {
        let merged = ProfileMerger::default().merge("Empty", &[]);
        assert_eq!(merged.name, "empty");
        assert_eq!(merged.model_provider, DEFAULT_MODEL_PROVIDER);
        assert!(merged.topics.is_empty());
        assert_eq!(merged.system, "Roleplay as empty, combining traits of .");
    }

    #[test]
    fn merge_is_deterministic() {
        let merger = ProfileMerger::default();
        let sources = [source("alice", alice()), source("bob", bob())];
        let first = merger.merge("duo", &sources).to_pretty_json().unwrap();
        let second = merger.merge("duo", &sources).to_pretty_json().unwrap();
        assert_eq!(first, second);
    }
}
