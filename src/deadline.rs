use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cooperative stop signal for a search: an optional wall-clock limit plus an optional shared
/// cancellation flag.
///
/// Nothing is preempted. Searches poll [`Deadline::expired`] between iterations and inside
/// their longer scans, so a limit can be overrun by at most one scan step.
#[derive(Clone, Debug)]
pub struct Deadline {
    start: Instant,
    expires_at: Option<Instant>,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl Default for Deadline {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl Deadline {
    /// A deadline that never expires on its own.
    pub fn unbounded() -> Self {
        Self {
            start: Instant::now(),
            expires_at: None,
            cancel_flag: None,
        }
    }

    /// A deadline that expires `limit` from now.
    pub fn after(limit: Duration) -> Self {
        Self::unbounded().capped(Some(limit))
    }

    /// Also expire as soon as `flag` is set to `true`.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    /// A child deadline starting now that expires at the earlier of this deadline and `limit`
    /// from now. The cancellation flag is shared with `self`.
    pub fn capped(&self, limit: Option<Duration>) -> Self {
        let now = Instant::now();
        let expires_at = match (self.expires_at, limit.and_then(|l| now.checked_add(l))) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };

        Self {
            start: now,
            expires_at,
            cancel_flag: self.cancel_flag.clone(),
        }
    }

    /// Time since this deadline was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Returns `true` once the cancellation flag has been raised.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }

    /// Returns `true` once the wall-clock limit has passed.
    pub fn is_time_up(&self) -> bool {
        self.expires_at.map_or(false, |at| Instant::now() >= at)
    }

    /// Returns `true` if the search should stop, for either reason.
    pub fn expired(&self) -> bool {
        self.is_cancelled() || self.is_time_up()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_never_expires() {
        let deadline = Deadline::unbounded();
        assert!(!deadline.expired());
        assert!(!deadline.is_time_up());
    }

    #[test]
    fn zero_limit_expires_immediately() {
        assert!(Deadline::after(Duration::ZERO).is_time_up());
    }

    #[test]
    fn capped_keeps_earlier_expiry() {
        let parent = Deadline::after(Duration::ZERO);
        assert!(parent.capped(Some(Duration::from_secs(60))).is_time_up());

        let parent = Deadline::after(Duration::from_secs(60));
        assert!(parent.capped(Some(Duration::ZERO)).is_time_up());
        assert!(!parent.capped(None).is_time_up());
    }

    #[test]
    fn cancel_flag_is_shared_with_children() {
        let flag = Arc::new(AtomicBool::new(false));
        let deadline = Deadline::unbounded().with_cancel_flag(flag.clone());
        let child = deadline.capped(Some(Duration::from_secs(60)));
        assert!(!child.expired());

        flag.store(true, Ordering::Relaxed);
        assert!(deadline.is_cancelled());
        assert!(child.expired());
        assert!(!child.is_time_up());
    }
}
