//! Topic router
//!
//! Holds filter → handler routes and dispatches each inbound topic to every
//! route whose filter matches it.

use super::client::MessageHandler;
use crate::filter::TopicFilter;
use crate::matcher::{TopicMatcher, TranslationResult, WildcardTranslator};
use std::collections::BTreeMap;

struct Route {
    matcher: TopicMatcher,
    handler: MessageHandler,
}

/// Filter → handler table with wildcard dispatch
#[derive(Default)]
pub struct TopicRouter {
    routes: BTreeMap<TopicFilter, Route>,
}

impl std::fmt::Debug for TopicRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopicRouter")
            .field("filters", &self.routes.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl TopicRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route.
    ///
    /// Returns `Ok(false)` without replacing anything if the filter is
    /// already routed.
    pub fn insert(&mut self, filter: TopicFilter, handler: MessageHandler) -> TranslationResult<bool> {
        if self.routes.contains_key(&filter) {
            return Ok(false);
        }
        let matcher = WildcardTranslator::compile(filter.as_str())?;
        self.routes.insert(filter, Route { matcher, handler });
        Ok(true)
    }

    /// Remove a route, returning whether it existed
    pub fn remove(&mut self, filter: &TopicFilter) -> bool {
        self.routes.remove(filter).is_some()
    }

    /// Remove every route, returning the filters that were routed
    pub fn clear(&mut self) -> Vec<TopicFilter> {
        std::mem::take(&mut self.routes).into_keys().collect()
    }

    pub fn contains(&self, filter: &TopicFilter) -> bool {
        self.routes.contains_key(filter)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routed filters in sorted order
    pub fn filters(&self) -> Vec<TopicFilter> {
        self.routes.keys().cloned().collect()
    }

    /// Handlers of every route matching `topic`
    pub fn matching_handlers(&self, topic: &str) -> Vec<MessageHandler> {
        self.routes
            .values()
            .filter(|route| route.matcher.is_match(topic))
            .map(|route| route.handler.clone())
            .collect()
    }

    /// Invoke every matching handler, returning how many ran
    pub fn dispatch(&self, topic: &str, payload: &[u8]) -> usize {
        let handlers = self.matching_handlers(topic);
        for handler in &handlers {
            handler(topic, payload);
        }
        handlers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_handler(counter: &Arc<AtomicUsize>) -> MessageHandler {
        let counter = Arc::clone(counter);
        Arc::new(move |_topic: &str, _payload: &[u8]| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_dispatch_to_all_matching_routes() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut router = TopicRouter::new();
        router
            .insert("FDPS/position/>".into(), counting_handler(&hits))
            .unwrap();
        router
            .insert(
                "FDPS/position/*/*/*/39.8*/-98.5*/*/*/*/*".into(),
                counting_handler(&hits),
            )
            .unwrap();
        router
            .insert(
                "FDPS/position/*/*/*/40.*/-98.*/*/*/*/*".into(),
                counting_handler(&hits),
            )
            .unwrap();

        let ran = router.dispatch("FDPS/position/A1/B/C/39.82/-98.57/300/1000/5/5", b"");
        assert_eq!(ran, 2);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_duplicate_insert_keeps_first_route() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut router = TopicRouter::new();

        assert!(router.insert("a/>".into(), counting_handler(&first)).unwrap());
        assert!(!router.insert("a/>".into(), counting_handler(&second)).unwrap());

        router.dispatch("a/b", b"");
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_invalid_filter_is_not_routed() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut router = TopicRouter::new();
        assert!(router.insert("a/>/b".into(), counting_handler(&hits)).is_err());
        assert!(router.is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut router = TopicRouter::new();
        router.insert("a/>".into(), counting_handler(&hits)).unwrap();
        router.insert("b/>".into(), counting_handler(&hits)).unwrap();

        assert!(router.remove(&"a/>".into()));
        assert!(!router.remove(&"a/>".into()));
        assert_eq!(router.len(), 1);

        let cleared = router.clear();
        assert_eq!(cleared, vec![TopicFilter::from("b/>")]);
        assert!(router.is_empty());
        assert_eq!(router.dispatch("b/x", b""), 0);
    }
}
