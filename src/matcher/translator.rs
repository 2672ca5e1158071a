//! Wildcard topic filter matching
//!
//! The feed's broker uses looser-than-MQTT semantics:
//! - `*` matches any run of characters at its position, including across `/`
//! - a final `>` level matches the remainder of the topic
//! - a match must start at the first character of the topic
//!
//! Because `*` can swallow separators, a filter ending in `*` could match a
//! topic with extra trailing levels. Such matches are rejected unless the
//! topic and the filter have the same number of levels.

use super::error::{TranslationError, TranslationResult};
use crate::filter::{LEVEL_SEPARATOR, MULTI_LEVEL_WILDCARD, SINGLE_LEVEL_WILDCARD};
use regex::Regex;

/// A compiled topic filter
#[derive(Debug, Clone)]
pub struct TopicMatcher {
    filter: String,
    regex: Regex,
    /// Level count to enforce when the filter ends in `*`
    required_levels: Option<usize>,
}

impl TopicMatcher {
    /// The filter this matcher was compiled from
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Check a concrete topic against the filter
    pub fn is_match(&self, topic: &str) -> bool {
        if !self.regex.is_match(topic) {
            return false;
        }
        match self.required_levels {
            Some(levels) => topic.split(LEVEL_SEPARATOR).count() == levels,
            None => true,
        }
    }
}

/// Translates broker topic filters into matchers
#[derive(Debug, Clone, Copy, Default)]
pub struct WildcardTranslator;

impl WildcardTranslator {
    /// Compile a filter into a matcher
    pub fn compile(filter: &str) -> TranslationResult<TopicMatcher> {
        if filter.is_empty() {
            return Err(TranslationError::Empty);
        }

        let (body, multi_level) = split_multi_level(filter)?;

        let mut pattern = String::with_capacity(filter.len() * 2 + 4);
        pattern.push('^');
        for (i, literal) in body.split(SINGLE_LEVEL_WILDCARD).enumerate() {
            if i > 0 {
                pattern.push_str(".*");
            }
            pattern.push_str(&regex::escape(literal));
        }
        if multi_level {
            pattern.push_str(".*");
        }
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|e| TranslationError::Regex {
            filter: filter.to_string(),
            error: e.to_string(),
        })?;

        let required_levels = (!multi_level && filter.ends_with(SINGLE_LEVEL_WILDCARD))
            .then(|| filter.split(LEVEL_SEPARATOR).count());

        Ok(TopicMatcher {
            filter: filter.to_string(),
            regex,
            required_levels,
        })
    }
}

/// Strip a trailing multi-level wildcard, validating its placement.
///
/// `a/b/>` yields `("a/b/", true)`; a lone `>` yields `("", true)`.
fn split_multi_level(filter: &str) -> TranslationResult<(&str, bool)> {
    let Some(position) = filter.find(MULTI_LEVEL_WILDCARD) else {
        return Ok((filter, false));
    };

    let is_last_char = position == filter.len() - 1;
    let is_whole_level = position == 0 || filter[..position].ends_with(LEVEL_SEPARATOR);
    if !is_last_char || !is_whole_level {
        return Err(TranslationError::MisplacedMultiLevel(filter.to_string()));
    }

    Ok((&filter[..position], true))
}

/// Check a topic against a filter in one call.
///
/// Invalid filters never match; the compile error is logged.
pub fn topic_matches(filter: &str, topic: &str) -> bool {
    match WildcardTranslator::compile(filter) {
        Ok(matcher) => matcher.is_match(topic),
        Err(e) => {
            tracing::debug!(filter = %filter, error = %e, "Invalid topic filter never matches");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILTER: &str = "FDPS/position/*/*/*/39.8*/-98.5*/*/*/*/*";

    #[test]
    fn test_coordinate_filter_matches() {
        assert!(topic_matches(
            FILTER,
            "FDPS/position/A1/B/C/39.82/-98.57/300/1000/5/5"
        ));
    }

    #[test]
    fn test_coordinate_filter_rejects_other_latitude() {
        assert!(!topic_matches(
            FILTER,
            "FDPS/position/A1/B/C/40.00/-98.57/300/1000/5/5"
        ));
    }

    #[test]
    fn test_dot_is_literal() {
        // An unescaped '.' would let 39x8 through
        assert!(!topic_matches(
            FILTER,
            "FDPS/position/A1/B/C/39x82/-98.57/300/1000/5/5"
        ));
    }

    #[test]
    fn test_multi_level_matches_remainder() {
        let matcher = WildcardTranslator::compile("FDPS/position/>").unwrap();
        assert!(matcher.is_match("FDPS/position/A1/B/C/39.82/-98.57/300/1000/5/5"));
        assert!(matcher.is_match("FDPS/position/x"));
        assert!(!matcher.is_match("FDPS/position"));
        assert!(!matcher.is_match("FDPS/status/x"));
    }

    #[test]
    fn test_lone_multi_level_matches_everything() {
        let matcher = WildcardTranslator::compile(">").unwrap();
        assert!(matcher.is_match("a"));
        assert!(matcher.is_match("a/b/c"));
    }

    #[test]
    fn test_match_is_anchored_at_start() {
        assert!(!topic_matches("position/>", "FDPS/position/a"));
        assert!(!topic_matches("b/*", "a/b/c"));
    }

    #[test]
    fn test_literal_filter_requires_whole_topic() {
        assert!(topic_matches("a/b", "a/b"));
        assert!(!topic_matches("a/b", "a/bc"));
        assert!(!topic_matches("a/b", "a/b/c"));
    }

    #[test]
    fn test_single_level_spans_separators_mid_filter() {
        // looser than MQTT: '*' is not bounded by '/'
        assert!(topic_matches("a/*/d", "a/b/c/d"));
    }

    #[test]
    fn test_trailing_single_level_checks_level_count() {
        assert!(topic_matches("a/*", "a/b"));
        assert!(!topic_matches("a/*", "a/b/c"));
        assert!(topic_matches("a/b*", "a/bcd"));
        assert!(!topic_matches("a/b*", "a/bc/d"));
    }

    #[test]
    fn test_prefix_wildcard_within_level() {
        assert!(topic_matches("FDPS/position/*/*/*/3*/-9*/*/*/*/*",
            "FDPS/position/ID/ACTIVE/UAL1/35.51234/-99.12000/420/31000/10/20"));
        assert!(!topic_matches("FDPS/position/*/*/*/3*/-9*/*/*/*/*",
            "FDPS/position/ID/ACTIVE/UAL1/45.51234/-99.12000/420/31000/10/20"));
    }

    #[test]
    fn test_invalid_filters() {
        assert_eq!(
            WildcardTranslator::compile("").unwrap_err(),
            TranslationError::Empty
        );
        assert!(matches!(
            WildcardTranslator::compile("a/>/b"),
            Err(TranslationError::MisplacedMultiLevel(_))
        ));
        assert!(matches!(
            WildcardTranslator::compile("a/b>"),
            Err(TranslationError::MisplacedMultiLevel(_))
        ));
        assert!(!topic_matches("a/>/b", "a/x/b"));
        assert!(!topic_matches("", ""));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        assert!(topic_matches("a+b/(c)/[d]", "a+b/(c)/[d]"));
        assert!(!topic_matches("a+b", "aab"));
    }

    #[test]
    fn test_matcher_reports_filter() {
        let matcher = WildcardTranslator::compile(FILTER).unwrap();
        assert_eq!(matcher.filter(), FILTER);
    }
}
