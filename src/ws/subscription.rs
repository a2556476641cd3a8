#![expect(
    clippy::module_name_repetitions,
    reason = "Subscription types deliberately include the module name for clarity"
)]

//! Bookkeeping for the feed categories subscribed on the live connection.

/// Ordered set of subscribed feed categories.
///
/// Membership is optimistic: a topic is recorded once its subscribe request has been handed
/// to the socket, not when the server confirms it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicSet {
    topics: Vec<String>,
}

impl TopicSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, topic: &str) -> bool {
        self.topics.iter().any(|t| t == topic)
    }

    /// Returns `false` if the topic was already present.
    pub fn insert(&mut self, topic: &str) -> bool {
        if self.contains(topic) {
            return false;
        }
        self.topics.push(topic.to_owned());
        true
    }

    /// Returns `false` if the topic was not present.
    pub fn remove(&mut self, topic: &str) -> bool {
        let before = self.topics.len();
        self.topics.retain(|t| t != topic);
        self.topics.len() != before
    }

    pub fn clear(&mut self) {
        self.topics.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.topics.iter().map(String::as_str)
    }

    /// Snapshot of the subscribed topics in subscription order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.topics.clone()
    }

    /// Plan the requests that move this set to `desired`.
    ///
    /// Topics subscribed but not desired are unsubscribed (in subscription order), desired
    /// topics not yet subscribed are subscribed (in `desired` order, duplicates once). Topics
    /// in both are left alone, so planning against an already reconciled set is empty.
    #[must_use]
    pub fn reconcile<S: AsRef<str>>(&self, desired: &[S]) -> Reconciliation {
        let wanted = |topic: &str| desired.iter().any(|d| d.as_ref() == topic);

        let unsubscribe = self
            .iter()
            .filter(|topic| !wanted(topic))
            .map(str::to_owned)
            .collect();

        let mut subscribe: Vec<String> = Vec::new();
        for topic in desired.iter().map(AsRef::as_ref) {
            if !self.contains(topic) && !subscribe.iter().any(|s| s == topic) {
                subscribe.push(topic.to_owned());
            }
        }

        Reconciliation {
            unsubscribe,
            subscribe,
        }
    }
}

impl<'set> IntoIterator for &'set TopicSet {
    type Item = &'set String;
    type IntoIter = std::slice::Iter<'set, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.topics.iter()
    }
}

/// Subscribe/unsubscribe requests needed to move from the current to a desired topic set.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub unsubscribe: Vec<String>,
    pub subscribe: Vec<String>,
}

impl Reconciliation {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unsubscribe.is_empty() && self.subscribe.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn set_of(topics: &[&str]) -> TopicSet {
        let mut set = TopicSet::new();
        for topic in topics {
            set.insert(topic);
        }
        set
    }

    /// Apply a plan the way the connection manager does.
    fn apply(set: &mut TopicSet, plan: &Reconciliation) {
        for topic in &plan.unsubscribe {
            set.remove(topic);
        }
        for topic in &plan.subscribe {
            set.insert(topic);
        }
    }

    #[test]
    fn insert_and_remove_report_changes() {
        let mut set = TopicSet::new();
        assert!(set.insert("crypto"));
        assert!(!set.insert("crypto"));
        assert_eq!(set.len(), 1);

        assert!(set.remove("crypto"));
        assert!(!set.remove("crypto"));
        assert!(set.is_empty());
    }

    #[test]
    fn preserves_subscription_order() {
        let set = set_of(&["macro", "crypto", "tech"]);
        assert_eq!(set.to_vec(), vec!["macro", "crypto", "tech"]);
    }

    #[test]
    fn reconcile_computes_minimal_plan() {
        let set = set_of(&["crypto", "macro"]);

        let plan = set.reconcile(&["macro", "tech"]);

        assert_eq!(plan.unsubscribe, vec!["crypto"]);
        assert_eq!(plan.subscribe, vec!["tech"]);
    }

    #[test]
    fn reconcile_is_idempotent() {
        let mut set = set_of(&["crypto", "macro"]);
        let desired = ["macro", "tech"];

        let plan = set.reconcile(&desired);
        apply(&mut set, &plan);

        assert!(set.reconcile(&desired).is_empty());
    }

    #[test]
    fn reconcile_equals_symmetric_difference() {
        let cases: &[(&[&str], &[&str])] = &[
            (&[], &["a", "b"]),
            (&["a", "b"], &[]),
            (&["a", "b", "c"], &["c", "d", "e"]),
            (&["a"], &["a"]),
            (&["x", "y"], &["y", "x"]),
        ];

        for (current, desired) in cases {
            let set = set_of(current);
            let plan = set.reconcile(*desired);

            let old: HashSet<&str> = current.iter().copied().collect();
            let new: HashSet<&str> = desired.iter().copied().collect();
            let touched: HashSet<&str> = plan
                .unsubscribe
                .iter()
                .chain(&plan.subscribe)
                .map(String::as_str)
                .collect();
            let expected: HashSet<&str> = old.symmetric_difference(&new).copied().collect();

            assert_eq!(touched, expected, "current {current:?} desired {desired:?}");
            assert!(plan.unsubscribe.iter().all(|t| old.contains(t.as_str())));
            assert!(plan.subscribe.iter().all(|t| new.contains(t.as_str())));
        }
    }

    #[test]
    fn reconcile_subscribes_duplicates_once() {
        let set = TopicSet::new();
        let plan = set.reconcile(&["tech", "tech", "rwa"]);
        assert_eq!(plan.subscribe, vec!["tech", "rwa"]);
    }

    #[test]
    fn reconcile_accepts_owned_strings() {
        let set = set_of(&["crypto"]);
        let desired = vec!["crypto".to_owned()];
        assert!(set.reconcile(&desired).is_empty());
    }
}
