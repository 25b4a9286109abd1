//! Infinite-scroll sentinel.
//!
//! The sentinel watches exactly one target, the container of the last
//! rendered item. It is independent of any platform visibility API: whatever
//! observes the viewport reports `(target, visible)` pairs, and the sentinel
//! decides whether that warrants loading the next page.
//!
//! Contract: notify once when the attached target becomes visible while the
//! feed is ready for more, then stay quiet until re-attached. Reports about
//! any other target are ignored, which covers observers that still fire for
//! a node that has since been replaced.

use tracing::trace;

#[derive(Debug, Clone)]
pub struct Sentinel<K> {
    target: Option<K>,
    fired: bool,
}

impl<K> Default for Sentinel<K> {
    fn default() -> Self {
        Self {
            target: None,
            fired: false,
        }
    }
}

impl<K: PartialEq + Clone + std::fmt::Debug> Sentinel<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Watch `target`, disconnecting any previous target first.
    ///
    /// Re-attaching the current target re-arms it.
    pub fn attach(&mut self, target: K) {
        if let Some(old) = self.target.take() {
            trace!(?old, "sentinel detached");
        }
        trace!(?target, "sentinel attached");
        self.target = Some(target);
        self.fired = false;
    }

    /// Stop watching. Nothing notifies until the next [`attach`](Self::attach).
    pub fn detach(&mut self) {
        self.target = None;
        self.fired = false;
    }

    pub fn target(&self) -> Option<&K> {
        self.target.as_ref()
    }

    pub fn is_armed(&self) -> bool {
        self.target.is_some() && !self.fired
    }

    /// Report a visibility change of `target`.
    ///
    /// Returns `true` when the next page should be requested: `target` is the
    /// attached one, it is visible, the caller says the feed is `ready` (more
    /// pages exist and nothing is in flight), and this attachment has not
    /// notified yet. A report that is not `ready` does not consume the
    /// attachment.
    pub fn notify(&mut self, target: &K, visible: bool, ready: bool) -> bool {
        if !visible || !ready || self.fired {
            return false;
        }
        match &self.target {
            Some(current) if current == target => {
                self.fired = true;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifies_once_per_attachment() {
        let mut sentinel = Sentinel::new();
        sentinel.attach(30u64);
        assert!(sentinel.notify(&30, true, true));
        assert!(!sentinel.notify(&30, true, true));
        assert!(!sentinel.is_armed());

        sentinel.attach(30);
        assert!(sentinel.notify(&30, true, true));
    }

    #[test]
    fn ignores_stale_targets() {
        let mut sentinel = Sentinel::new();
        sentinel.attach(30u64);
        sentinel.attach(40);
        assert!(!sentinel.notify(&30, true, true));
        assert!(sentinel.notify(&40, true, true));
    }

    #[test]
    fn invisible_reports_do_nothing() {
        let mut sentinel = Sentinel::new();
        sentinel.attach(1u64);
        assert!(!sentinel.notify(&1, false, true));
        assert!(sentinel.is_armed());
    }

    #[test]
    fn not_ready_keeps_attachment_armed() {
        let mut sentinel = Sentinel::new();
        sentinel.attach(1u64);
        assert!(!sentinel.notify(&1, true, false));
        assert!(sentinel.is_armed());
        assert!(sentinel.notify(&1, true, true));
    }

    #[test]
    fn detached_never_notifies() {
        let mut sentinel: Sentinel<u64> = Sentinel::new();
        assert!(!sentinel.notify(&1, true, true));
        sentinel.attach(1);
        sentinel.detach();
        assert!(sentinel.target().is_none());
        assert!(!sentinel.notify(&1, true, true));
    }
}
