//! Keyword-based interpretation of Arabic search queries.
//!
//! A pure function of (query, lexicon): extracts at most one city, at most
//! one country, at most one time window, and a job-intent flag, and returns
//! the residual text with the matched substrings removed.
//!
//! Matching is exact Unicode substring containment against the normalized
//! query — not tokenized, not word-bounded, no diacritic folding. A longer
//! keyword occurring inside another word still matches. These are deliberate
//! properties of the matching policy, preserved as-is.

use crate::types::QueryAnalysis;

use super::lexicon::Lexicon;

/// Interpret a search query against the lexicon.
///
/// Scan order per table is declaration order; the first match wins and ends
/// that table's scan. City, country, and time matches each remove the first
/// literal occurrence of the matched keyword from the cleaned text. The job
/// scan only sets a flag and removes nothing. Always returns a fully
/// populated record; unmatched fields default to `None`/`false`.
pub fn interpret(query: &str, lexicon: &Lexicon) -> QueryAnalysis {
    // Lowercase + trim. A no-op for Arabic script; kept because matching is
    // defined against the normalized text, and Latin-script queries would
    // otherwise match differently than they remove (see module docs).
    let normalized = query.to_lowercase().trim().to_string();

    let mut cleaned = query.to_string();

    let city = lexicon
        .cities
        .iter()
        .find(|city| normalized.contains(city.as_str()))
        .cloned();
    if let Some(ref city) = city {
        remove_first(&mut cleaned, city);
    }

    let country = lexicon
        .countries
        .iter()
        .find(|country| normalized.contains(country.as_str()))
        .cloned();
    if let Some(ref country) = country {
        remove_first(&mut cleaned, country);
    }

    let mut time_filter = None;
    for entry in &lexicon.time_keywords {
        if normalized.contains(entry.keyword.as_str()) {
            time_filter = Some(entry.days);
            remove_first(&mut cleaned, &entry.keyword);
            break;
        }
    }

    let is_job_search = lexicon
        .job_keywords
        .iter()
        .any(|keyword| normalized.contains(keyword.as_str()));

    QueryAnalysis {
        search_text: query.to_string(),
        city,
        country,
        time_filter,
        is_job_search,
        cleaned_text: collapse_whitespace(&cleaned),
    }
}

/// Remove the first literal occurrence of `needle` from `text`, if any.
fn remove_first(text: &mut String, needle: &str) {
    if let Some(pos) = text.find(needle) {
        text.replace_range(pos..pos + needle.len(), "");
    }
}

/// Collapse internal whitespace runs to single spaces and trim the ends.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> Lexicon {
        Lexicon::default()
    }

    #[test]
    fn test_city_only_query() {
        let result = interpret("شاحنات في جدة", &lexicon());
        assert_eq!(result.city.as_deref(), Some("جدة"));
        assert_eq!(result.country, None);
        assert_eq!(result.time_filter, None);
        assert!(!result.is_job_search);
        assert_eq!(result.cleaned_text, "شاحنات في");
    }

    #[test]
    fn test_city_and_country_extracted_independently() {
        let result = interpret("نقل من الرياض الى السعودية", &lexicon());
        assert_eq!(result.city.as_deref(), Some("الرياض"));
        assert_eq!(result.country.as_deref(), Some("السعودية"));
    }

    #[test]
    fn test_first_city_in_table_order_wins() {
        // Both الرياض and جدة are present; الرياض comes first in the table,
        // regardless of position in the query text.
        let result = interpret("من جدة الى الرياض", &lexicon());
        assert_eq!(result.city.as_deref(), Some("الرياض"));
        // Only the winning city's text is removed
        assert!(result.cleaned_text.contains("جدة"));
        assert!(!result.cleaned_text.contains("الرياض"));
    }

    #[test]
    fn test_amman_matches_both_tables() {
        // "عمان" sits in both the city and country lists; the scans are
        // independent, but removal happens twice only if the text contains
        // the substring twice.
        let result = interpret("توصيل الى عمان عمان", &lexicon());
        assert_eq!(result.city.as_deref(), Some("عمان"));
        assert_eq!(result.country.as_deref(), Some("عمان"));
        assert!(!result.cleaned_text.contains("عمان"));
    }

    #[test]
    fn test_time_keyword_maps_to_days() {
        let result = interpret("شحنات الأسبوع", &lexicon());
        assert_eq!(result.time_filter, Some(7));
        assert_eq!(result.cleaned_text, "شحنات");

        let result = interpret("شحنات الشهر", &lexicon());
        assert_eq!(result.time_filter, Some(30));
    }

    #[test]
    fn test_first_time_keyword_in_table_order_wins() {
        // جديدة precedes اليوم in the table; with both present only جديدة
        // is recorded and removed.
        let result = interpret("شحنات اليوم جديدة", &lexicon());
        assert_eq!(result.time_filter, Some(7));
        assert!(result.cleaned_text.contains("اليوم"));
        assert!(!result.cleaned_text.contains("جديدة"));
    }

    #[test]
    fn test_job_flag_does_not_remove_text() {
        let result = interpret("مطلوب سائق", &lexicon());
        assert!(result.is_job_search);
        assert_eq!(result.cleaned_text, "مطلوب سائق");
    }

    #[test]
    fn test_job_flag_independent_of_other_matches() {
        let result = interpret("وظيفة في جدة اليوم", &lexicon());
        assert!(result.is_job_search);
        assert_eq!(result.city.as_deref(), Some("جدة"));
        assert_eq!(result.time_filter, Some(1));
    }

    #[test]
    fn test_worked_example() {
        // "electrician job in Riyadh now"
        let result = interpret("وظيفة كهربائي في الرياض الآن", &lexicon());
        assert_eq!(result.city.as_deref(), Some("الرياض"));
        assert_eq!(result.country, None);
        assert_eq!(result.time_filter, Some(1));
        assert!(result.is_job_search);
        // Only the city and time substrings are removed; the job keywords stay.
        assert!(!result.cleaned_text.contains("الرياض"));
        assert!(!result.cleaned_text.contains("الآن"));
        assert!(result.cleaned_text.contains("وظيفة كهربائي"));
        assert_eq!(result.cleaned_text, "وظيفة كهربائي في");
    }

    #[test]
    fn test_no_matches_returns_collapsed_original() {
        let result = interpret("  نقل   بضائع  ", &lexicon());
        assert_eq!(result.search_text, "  نقل   بضائع  ");
        assert_eq!(result.city, None);
        assert_eq!(result.country, None);
        assert_eq!(result.time_filter, None);
        assert!(!result.is_job_search);
        assert_eq!(result.cleaned_text, "نقل بضائع");
    }

    #[test]
    fn test_cleaned_text_has_no_doubled_whitespace() {
        let result = interpret("نقل من الرياض الى جدة اليوم", &lexicon());
        assert!(!result.cleaned_text.contains("  "));
        assert_eq!(result.cleaned_text, result.cleaned_text.trim());
    }

    #[test]
    fn test_removal_is_first_occurrence_only() {
        let result = interpret("الرياض ثم الرياض", &lexicon());
        assert_eq!(result.city.as_deref(), Some("الرياض"));
        // Second occurrence survives removal
        assert_eq!(result.cleaned_text, "ثم الرياض");
    }

    #[test]
    fn test_substring_not_word_boundary_matching() {
        // مصر occurs inside مصرف; the substring policy still matches it.
        let result = interpret("تحويل الى مصرف", &lexicon());
        assert_eq!(result.country.as_deref(), Some("مصر"));
        assert_eq!(result.cleaned_text, "تحويل الى ف");
    }

    #[test]
    fn test_empty_query() {
        let result = interpret("", &lexicon());
        assert_eq!(result.search_text, "");
        assert_eq!(result.cleaned_text, "");
        assert_eq!(result.city, None);
        assert!(!result.is_job_search);
    }

    #[test]
    fn test_latin_query_uppercase_matches_but_does_not_remove() {
        // The latent normalization asymmetry: matching runs against the
        // lowercased query, removal against the original text. A lexicon
        // with a lowercase Latin entry matches an uppercase query, but the
        // removal finds nothing. Preserved behavior, not a bug fix target.
        let mut lex = Lexicon::default();
        lex.cities.insert(0, "amman".to_string());
        let result = interpret("trucks in AMMAN", &lex);
        assert_eq!(result.city.as_deref(), Some("amman"));
        assert_eq!(result.cleaned_text, "trucks in AMMAN");
    }
}
