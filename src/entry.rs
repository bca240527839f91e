//! Cache entry with TTL metadata and intrusive links.

use std::time::{Duration, Instant};

use crate::ds::list::{Linked, Links};
use crate::ds::slot_arena::SlotId;

/// Expiration state of an entry.
///
/// `ttl` is kept alongside the deadline so sliding expiration can push the
/// deadline forward on access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry {
    ttl: Option<Duration>,
    expires_at: Option<Instant>,
}

impl Expiry {
    /// Entry that never expires.
    pub const NEVER: Expiry = Expiry {
        ttl: None,
        expires_at: None,
    };

    /// Deadline `now + ttl`. A zero `ttl` means no expiration.
    pub fn after(ttl: Duration, now: Instant) -> Self {
        if ttl.is_zero() {
            return Self::NEVER;
        }
        Self {
            ttl: Some(ttl),
            expires_at: now.checked_add(ttl),
        }
    }

    pub fn from_ttl(ttl: Option<Duration>, now: Instant) -> Self {
        match ttl {
            Some(ttl) => Self::after(ttl, now),
            None => Self::NEVER,
        }
    }

    #[cfg(test)]
    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) => now >= deadline,
            None => false,
        }
    }

    /// Slide the deadline to `now + ttl`. Never moves it backwards.
    pub fn refresh(&mut self, now: Instant) {
        if let Some(ttl) = self.ttl {
            if let Some(next) = now.checked_add(ttl) {
                if self.expires_at.map_or(true, |current| next > current) {
                    self.expires_at = Some(next);
                }
            }
        }
    }

    /// Apply the TTL of an overwrite. The deadline becomes the later of the
    /// current one and `now + ttl`; a zero `ttl` clears it.
    pub fn extend(&mut self, ttl: Duration, now: Instant) {
        if ttl.is_zero() {
            *self = Self::NEVER;
            return;
        }
        let next = now.checked_add(ttl);
        self.expires_at = match (self.expires_at, next) {
            (Some(current), Some(next)) => Some(current.max(next)),
            (None, next) => next,
            (current, None) => current,
        };
        self.ttl = Some(ttl);
    }
}

/// A single cache entry stored in an engine's arena.
#[derive(Debug)]
pub struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) expiry: Expiry,
    pub(crate) links: Links,
    /// Owning frequency bucket; only set under LFU.
    pub(crate) bucket: Option<SlotId>,
}

impl<K, V> Entry<K, V> {
    pub fn new(key: K, value: V, expiry: Expiry) -> Self {
        Self {
            key,
            value,
            expiry,
            links: Links::default(),
            bucket: None,
        }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    #[cfg(test)]
    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expiry.is_expired_at(now)
    }
}

impl<K, V> Linked for Entry<K, V> {
    fn links(&self) -> &Links {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Links {
        &mut self.links
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_ttl_never_expires() {
        let now = Instant::now();
        let expiry = Expiry::after(Duration::ZERO, now);
        assert_eq!(expiry, Expiry::NEVER);
        assert!(!expiry.is_expired_at(now + Duration::from_secs(3600)));
    }

    #[test]
    fn test_expires_at_deadline() {
        let now = Instant::now();
        let expiry = Expiry::after(Duration::from_secs(10), now);
        assert!(!expiry.is_expired_at(now + Duration::from_secs(9)));
        assert!(expiry.is_expired_at(now + Duration::from_secs(10)));
    }

    #[test]
    fn test_refresh_slides_forward() {
        let now = Instant::now();
        let mut expiry = Expiry::after(Duration::from_secs(10), now);

        expiry.refresh(now + Duration::from_secs(5));
        assert_eq!(expiry.expires_at(), Some(now + Duration::from_secs(15)));
        assert!(!expiry.is_expired_at(now + Duration::from_secs(12)));
    }

    #[test]
    fn test_refresh_never_moves_backwards() {
        let now = Instant::now();
        let mut expiry = Expiry::after(Duration::from_secs(10), now + Duration::from_secs(5));
        expiry.refresh(now);
        assert_eq!(expiry.expires_at(), Some(now + Duration::from_secs(15)));
    }

    #[test]
    fn test_refresh_without_ttl_is_noop() {
        let mut expiry = Expiry::NEVER;
        expiry.refresh(Instant::now());
        assert_eq!(expiry, Expiry::NEVER);
    }

    #[test]
    fn test_extend_keeps_later_deadline() {
        let now = Instant::now();
        let mut expiry = Expiry::after(Duration::from_secs(60), now);

        expiry.extend(Duration::from_millis(10), now + Duration::from_secs(1));
        assert_eq!(expiry.expires_at(), Some(now + Duration::from_secs(60)));

        expiry.extend(Duration::from_secs(120), now + Duration::from_secs(1));
        assert_eq!(expiry.expires_at(), Some(now + Duration::from_secs(121)));
    }

    #[test]
    fn test_extend_sets_and_clears_deadline() {
        let now = Instant::now();
        let mut expiry = Expiry::NEVER;
        expiry.extend(Duration::from_secs(5), now);
        assert_eq!(expiry.expires_at(), Some(now + Duration::from_secs(5)));

        expiry.extend(Duration::ZERO, now);
        assert_eq!(expiry, Expiry::NEVER);
    }

    #[test]
    fn test_new_entry_is_unlinked() {
        let entry = Entry::new("k", 1, Expiry::NEVER);
        assert_eq!(*entry.links(), Links::default());
        assert!(entry.bucket.is_none());
        assert_eq!(entry.into_parts(), ("k", 1));
    }
}
