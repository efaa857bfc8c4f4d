//! Round-robin pool of browser identities for outbound requests.

use std::sync::atomic::{AtomicUsize, Ordering};

use reqwest::header::HeaderValue;

/// Ordered list of `User-Agent` strings handed out in strict rotation.
///
/// The cursor is a single atomic counter shared by every in-flight request,
/// so concurrent callers each observe a distinct position. State is not
/// persisted; a restart begins again at the first identity.
#[derive(Debug)]
pub struct IdentityPool {
    identities: Vec<HeaderValue>,
    cursor: AtomicUsize,
}

impl IdentityPool {
    /// Builds a pool from the given identities, skipping any that are not
    /// valid header values. Returns `None` when nothing usable remains.
    #[must_use]
    pub fn new<I, S>(identities: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let identities: Vec<HeaderValue> = identities
            .into_iter()
            .filter_map(|ua| match HeaderValue::from_str(ua.as_ref().trim()) {
                Ok(value) if !value.is_empty() => Some(value),
                _ => {
                    tracing::warn!(user_agent = ua.as_ref(), "skipping unusable user agent");
                    None
                }
            })
            .collect();

        if identities.is_empty() {
            return None;
        }

        Some(Self {
            identities,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Returns the next identity in rotation.
    pub fn next_identity(&self) -> HeaderValue {
        let position = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.identities[position % self.identities.len()].clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lider_core::DEFAULT_USER_AGENTS;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn rotation_cycles_deterministically() {
        let pool = IdentityPool::new(DEFAULT_USER_AGENTS).expect("non-empty pool");
        let n = pool.len();
        let first_cycle: Vec<_> = (0..n).map(|_| pool.next_identity()).collect();
        let second_cycle: Vec<_> = (0..n).map(|_| pool.next_identity()).collect();

        assert_eq!(first_cycle, second_cycle);
        assert_eq!(first_cycle[0], DEFAULT_USER_AGENTS[0]);
        let distinct: HashSet<_> = first_cycle.iter().collect();
        assert_eq!(distinct.len(), n, "each identity appears once per cycle");
    }

    #[test]
    fn default_pool_has_at_least_six_identities() {
        let pool = IdentityPool::new(DEFAULT_USER_AGENTS).unwrap();
        assert!(pool.len() >= 6);
    }

    #[test]
    fn invalid_and_blank_identities_are_skipped() {
        let pool = IdentityPool::new(["agent-a", "bad\nagent", "  "]).unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.next_identity(), "agent-a");
        assert!(IdentityPool::new(Vec::<String>::new()).is_none());
    }

    #[test]
    fn concurrent_callers_share_one_cursor() {
        let pool = Arc::new(IdentityPool::new(["a", "b", "c"]).unwrap());
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let pool = Arc::clone(&pool);
                std::thread::spawn(move || (0..30).map(|_| pool.next_identity()).count())
            })
            .collect();
        let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 90);
        // 90 draws over 3 identities leaves the cursor at a cycle boundary.
        assert_eq!(pool.next_identity(), "a");
    }
}
