//! Keyword lexicon for query interpretation.
//!
//! Three reference tables (cities, countries, time keywords) plus the
//! job-keyword list. Declaration order is load-bearing: the interpreter
//! takes the *first* entry whose text occurs in the query, so more common
//! names should come first. Tables are fixed at process start and never
//! mutated; a TOML override file can replace the compiled-in defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// One temporal keyword mapped to a day-count window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeKeyword {
    pub keyword: String,
    pub days: u32,
}

/// The full keyword lexicon. Arabic terms; matching is exact Unicode
/// substring containment, no diacritic folding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    /// Known city names, scan order
    pub cities: Vec<String>,

    /// Known country names, scan order
    pub countries: Vec<String>,

    /// Temporal keywords mapped to day counts, scan order
    pub time_keywords: Vec<TimeKeyword>,

    /// Keywords signalling job-search intent (any match sets the flag)
    pub job_keywords: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            cities: strings(&[
                "الرياض", "جدة", "مكة", "المدينة", "الدمام", "الخبر", "الطائف", "تبوك", "أبها",
                "حائل", "القاهرة", "الإسكندرية", "الجيزة", "بورسعيد", "السويس", "الأقصر", "أسوان",
                "دبي", "أبوظبي", "الشارقة", "عجمان", "رأس الخيمة", "الفجيرة", "الكويت", "حولي",
                "الفروانية", "الأحمدي", "الجهراء", "عمان", "إربد", "الزرقاء", "العقبة", "السلط",
                "مادبا", "الكرك",
            ]),
            countries: strings(&[
                "السعودية", "مصر", "الإمارات", "الكويت", "الأردن", "قطر", "البحرين", "عمان",
                "لبنان", "سوريا", "العراق", "اليمن", "ليبيا", "تونس", "الجزائر", "المغرب",
            ]),
            time_keywords: [
                ("حديثة", 7),
                ("حديث", 7),
                ("جديدة", 7),
                ("جديد", 7),
                ("اليوم", 1),
                ("أمس", 2),
                ("الأسبوع", 7),
                ("الشهر", 30),
                ("قريبا", 7),
                ("قريب", 7),
                ("مؤخرا", 7),
                ("مؤخر", 7),
                ("الآن", 1),
            ]
            .into_iter()
            .map(|(keyword, days)| TimeKeyword {
                keyword: keyword.to_string(),
                days,
            })
            .collect(),
            job_keywords: strings(&[
                "وظيفة", "وظائف", "عمل", "توظيف", "مطلوب", "طلب عمل", "اعلان وظيفة", "كهربائي",
                "سائق", "مهندس", "محاسب", "معلم", "طبيب", "ممرض", "فني",
            ]),
        }
    }
}

impl Lexicon {
    /// Load a lexicon from a TOML file.
    ///
    /// Unspecified tables fall back to the built-in defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let lexicon: Lexicon = toml::from_str(&content)?;
        lexicon.validate()?;
        Ok(lexicon)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.cities.is_empty() {
            return Err(ConfigError::ValidationError(
                "lexicon cities must not be empty".into(),
            ));
        }
        if self.countries.is_empty() {
            return Err(ConfigError::ValidationError(
                "lexicon countries must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lexicon_order() {
        let lexicon = Lexicon::default();
        // Scan order is part of the contract: الرياض before جدة
        assert_eq!(lexicon.cities[0], "الرياض");
        assert_eq!(lexicon.cities[1], "جدة");
        assert_eq!(lexicon.countries[0], "السعودية");
        // الآن is last and maps to a 1-day window
        let last = lexicon.time_keywords.last().unwrap();
        assert_eq!(last.keyword, "الآن");
        assert_eq!(last.days, 1);
    }

    #[test]
    fn test_amman_is_both_city_and_country() {
        // "عمان" (Amman/Oman) appears in both tables; the interpreter scans
        // them independently.
        let lexicon = Lexicon::default();
        assert!(lexicon.cities.iter().any(|c| c == "عمان"));
        assert!(lexicon.countries.iter().any(|c| c == "عمان"));
    }

    #[test]
    fn test_load_from_toml_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexicon.toml");
        std::fs::write(
            &path,
            r#"
cities = ["الرياض", "جدة"]
countries = ["السعودية"]
job_keywords = ["وظيفة"]

[[time_keywords]]
keyword = "اليوم"
days = 1
"#,
        )
        .unwrap();

        let lexicon = Lexicon::load_from(&path).unwrap();
        assert_eq!(lexicon.cities.len(), 2);
        assert_eq!(lexicon.time_keywords.len(), 1);
        assert_eq!(lexicon.time_keywords[0].days, 1);
    }

    #[test]
    fn test_load_rejects_empty_cities() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexicon.toml");
        std::fs::write(&path, "cities = []\n").unwrap();

        let err = Lexicon::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("cities"));
    }
}
