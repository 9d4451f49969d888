use std::fmt;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::LanguagePolicy;
use crate::error::{Result, RedubError};

/// Languages the dubbing service can speak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetLanguage {
    Hindi,
    Telugu,
    Kannada,
    Tamil,
    English,
}

impl TargetLanguage {
    pub const ALL: [TargetLanguage; 5] = [
        Self::Hindi,
        Self::Telugu,
        Self::Kannada,
        Self::Tamil,
        Self::English,
    ];

    /// Look up a caller-facing code such as "hi"
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "hi" => Some(Self::Hindi),
            "te" => Some(Self::Telugu),
            "kn" => Some(Self::Kannada),
            "ta" => Some(Self::Tamil),
            "en" => Some(Self::English),
            _ => None,
        }
    }

    /// Code understood by the speech provider
    pub fn provider_code(&self) -> &'static str {
        match self {
            Self::Hindi => "hi",
            Self::Telugu => "te",
            Self::Kannada => "kn",
            Self::Tamil => "ta",
            Self::English => "en",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Hindi => "Hindi",
            Self::Telugu => "Telugu",
            Self::Kannada => "Kannada",
            Self::Tamil => "Tamil",
            Self::English => "English",
        }
    }

    /// Resolve a caller-facing code under the configured policy
    pub fn resolve(code: &str, policy: LanguagePolicy) -> Result<Self> {
        if let Some(language) = Self::from_code(code) {
            return Ok(language);
        }

        match policy {
            LanguagePolicy::FallbackToEnglish => {
                warn!("Unsupported target language '{}', falling back to English", code);
                Ok(Self::English)
            }
            LanguagePolicy::Reject => Err(RedubError::UnsupportedLanguage(format!(
                "'{}' (supported: {})",
                code,
                Self::supported_codes().join(", ")
            ))),
        }
    }

    pub fn supported_codes() -> Vec<&'static str> {
        Self::ALL.iter().map(|l| l.provider_code()).collect()
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.provider_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        for language in TargetLanguage::ALL {
            assert_eq!(TargetLanguage::from_code(language.provider_code()), Some(language));
        }
        assert_eq!(TargetLanguage::from_code(" TE "), Some(TargetLanguage::Telugu));
    }

    #[test]
    fn test_unknown_code_falls_back_to_english() {
        let language = TargetLanguage::resolve("fr", LanguagePolicy::FallbackToEnglish).unwrap();
        assert_eq!(language, TargetLanguage::English);
        assert_eq!(language.provider_code(), "en");
    }

    #[test]
    fn test_unknown_code_rejected() {
        let err = TargetLanguage::resolve("xx", LanguagePolicy::Reject).unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("hi, te, kn, ta, en"));
    }

    #[test]
    fn test_known_code_ignores_policy() {
        assert_eq!(
            TargetLanguage::resolve("kn", LanguagePolicy::Reject).unwrap(),
            TargetLanguage::Kannada
        );
    }
}
