//! Topic Matching
//!
//! Compiles broker topic filters into matchers so inbound messages can be
//! routed to the handlers whose filters they satisfy.

mod error;
mod translator;

pub use error::{TranslationError, TranslationResult};
pub use translator::{topic_matches, TopicMatcher, WildcardTranslator};
