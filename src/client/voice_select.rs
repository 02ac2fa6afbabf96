//! Local fallback voice selection
//!
//! Picks an on-device voice for fallback synthesis by walking an explicit
//! ranked rule list, so the priority order is data rather than nested
//! conditionals and can be tested without a platform voice catalog.

use serde::Deserialize;

/// Voice gender used by the language-and-gender heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceGender {
    /// Female voice
    Female,
    /// Male voice
    Male,
    /// Unspecified or neutral voice
    Neutral,
}

/// An on-device voice as reported by the platform catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    /// Platform voice name
    pub name: String,
    /// BCP 47 language tag (e.g. `da-DK`)
    pub language: String,
    /// Reported gender
    pub gender: VoiceGender,
}

/// Configured preference for the fallback voice
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VoicePreference {
    /// Exact voice name, when the user pinned one
    pub voice_name: Option<String>,
    /// Target language prefix (e.g. `da`)
    pub language: String,
    /// Preferred gender
    pub gender: VoiceGender,
}

impl Default for VoicePreference {
    fn default() -> Self {
        Self {
            voice_name: None,
            language: "da".to_string(),
            gender: VoiceGender::Female,
        }
    }
}

/// Which rule chose the voice; logged on every fallback so "wrong voice"
/// regressions show up in the logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPath {
    /// Exact voice-name match
    ExactName,
    /// Language and gender both matched
    LanguageGender,
    /// Any voice of the target language
    Language,
    /// Nothing matched; platform default voice
    Default,
}

type Rule = fn(&Voice, &VoicePreference) -> bool;

fn matches_exact_name(voice: &Voice, pref: &VoicePreference) -> bool {
    pref.voice_name
        .as_deref()
        .is_some_and(|name| voice.name.eq_ignore_ascii_case(name))
}

fn matches_language_gender(voice: &Voice, pref: &VoicePreference) -> bool {
    matches_language(voice, pref) && voice.gender == pref.gender
}

fn matches_language(voice: &Voice, pref: &VoicePreference) -> bool {
    voice
        .language
        .to_lowercase()
        .starts_with(&pref.language.to_lowercase())
}

/// Ranked rules, highest priority first
static RULES: &[(SelectionPath, Rule)] = &[
    (SelectionPath::ExactName, matches_exact_name),
    (SelectionPath::LanguageGender, matches_language_gender),
    (SelectionPath::Language, matches_language),
];

/// Select a fallback voice from `catalog`
///
/// Returns the first voice matching the highest-priority rule, or `None`
/// with [`SelectionPath::Default`] when the platform default must be used.
#[must_use]
pub fn select_voice<'a>(
    catalog: &'a [Voice],
    pref: &VoicePreference,
) -> (Option<&'a Voice>, SelectionPath) {
    for (path, rule) in RULES {
        if let Some(voice) = catalog.iter().find(|v| rule(v, pref)) {
            return (Some(voice), *path);
        }
    }
    (None, SelectionPath::Default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Voice> {
        vec![
            Voice {
                name: "Magnus".to_string(),
                language: "da-DK".to_string(),
                gender: VoiceGender::Male,
            },
            Voice {
                name: "Sara".to_string(),
                language: "da-DK".to_string(),
                gender: VoiceGender::Female,
            },
            Voice {
                name: "Samantha".to_string(),
                language: "en-US".to_string(),
                gender: VoiceGender::Female,
            },
        ]
    }

    #[test]
    fn exact_name_wins_over_heuristics() {
        let pref = VoicePreference {
            voice_name: Some("magnus".to_string()),
            ..VoicePreference::default()
        };
        let voices = catalog();
        let (voice, path) = select_voice(&voices, &pref);
        assert_eq!(voice.unwrap().name, "Magnus");
        assert_eq!(path, SelectionPath::ExactName);
    }

    #[test]
    fn language_and_gender_heuristic() {
        let voices = catalog();
        let (voice, path) = select_voice(&voices, &VoicePreference::default());
        assert_eq!(voice.unwrap().name, "Sara");
        assert_eq!(path, SelectionPath::LanguageGender);
    }

    #[test]
    fn any_language_match_when_gender_missing() {
        let voices = vec![Voice {
            name: "Magnus".to_string(),
            language: "da-DK".to_string(),
            gender: VoiceGender::Male,
        }];
        let (voice, path) = select_voice(&voices, &VoicePreference::default());
        assert_eq!(voice.unwrap().name, "Magnus");
        assert_eq!(path, SelectionPath::Language);
    }

    #[test]
    fn default_when_nothing_matches() {
        let voices = vec![Voice {
            name: "Samantha".to_string(),
            language: "en-US".to_string(),
            gender: VoiceGender::Female,
        }];
        let (voice, path) = select_voice(&voices, &VoicePreference::default());
        assert!(voice.is_none());
        assert_eq!(path, SelectionPath::Default);
    }
}
