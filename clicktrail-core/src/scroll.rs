//! Scroll depth tracking.
//!
//! [`ScrollDepth`] owns `max_scroll_depth` for a page load. Each evaluation
//! walks the thresholds in ascending order, so one fast scroll to the bottom
//! reports every threshold it passed, lowest first. A threshold is reported
//! at most once and the maximum never decreases.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Viewport geometry at the time of a scroll signal, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub viewport_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, scroll_height: f64, viewport_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            viewport_height,
        }
    }

    /// `round(scroll_top / (scroll_height - viewport_height) * 100)`.
    ///
    /// A page that cannot scroll is at 0%. Negative offsets (overscroll
    /// bounce) clamp to 0.
    pub fn scroll_percent(&self) -> u32 {
        let scrollable = self.scroll_height - self.viewport_height;
        if scrollable.is_nan() || scrollable <= 0.0 || !self.scroll_top.is_finite() {
            return 0;
        }
        let percent = (self.scroll_top / scrollable * 100.0).round();
        if percent <= 0.0 { 0 } else { percent as u32 }
    }
}

/// A threshold reached for the first time during this page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
    pub depth: u8,
    pub scroll_percent: u32,
}

#[derive(Debug, Clone)]
pub struct ScrollDepth {
    thresholds: SmallVec<[u8; 4]>,
    max_depth: u8,
}

impl ScrollDepth {
    /// `thresholds` must be ascending; see
    /// [`TrackerConfig::validate`](crate::config::TrackerConfig::validate).
    pub fn new(thresholds: &[u8]) -> Self {
        Self {
            thresholds: SmallVec::from_slice(thresholds),
            max_depth: 0,
        }
    }

    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    /// Record a scroll position and return the newly crossed thresholds in
    /// ascending order.
    pub fn observe(&mut self, scroll_percent: u32) -> SmallVec<[Milestone; 4]> {
        let mut reached = SmallVec::new();
        for &threshold in &self.thresholds {
            if scroll_percent >= u32::from(threshold) && self.max_depth < threshold {
                self.max_depth = threshold;
                reached.push(Milestone {
                    depth: threshold,
                    scroll_percent,
                });
            }
        }
        reached
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLDS: [u8; 4] = [25, 50, 75, 100];

    #[test]
    fn percent_of_scrollable_height() {
        assert_eq!(ScrollMetrics::new(0.0, 2000.0, 1000.0).scroll_percent(), 0);
        assert_eq!(ScrollMetrics::new(500.0, 2000.0, 1000.0).scroll_percent(), 50);
        assert_eq!(ScrollMetrics::new(1000.0, 2000.0, 1000.0).scroll_percent(), 100);
        assert_eq!(ScrollMetrics::new(333.0, 2000.0, 1000.0).scroll_percent(), 33);
        assert_eq!(ScrollMetrics::new(245.0, 2000.0, 1000.0).scroll_percent(), 25);
    }

    #[test]
    fn unscrollable_page_is_zero_percent() {
        assert_eq!(ScrollMetrics::new(0.0, 800.0, 800.0).scroll_percent(), 0);
        assert_eq!(ScrollMetrics::new(10.0, 600.0, 800.0).scroll_percent(), 0);
        assert_eq!(ScrollMetrics::new(-40.0, 2000.0, 1000.0).scroll_percent(), 0);
        assert_eq!(ScrollMetrics::new(f64::NAN, 2000.0, 1000.0).scroll_percent(), 0);
    }

    #[test]
    fn fast_scroll_reports_every_threshold_in_order() {
        let mut depth = ScrollDepth::new(&THRESHOLDS);
        let reached = depth.observe(100);
        let depths: Vec<u8> = reached.iter().map(|m| m.depth).collect();
        assert_eq!(depths, vec![25, 50, 75, 100]);
        assert!(reached.iter().all(|m| m.scroll_percent == 100));
        assert_eq!(depth.max_depth(), 100);
    }

    #[test]
    fn threshold_fires_once() {
        let mut depth = ScrollDepth::new(&THRESHOLDS);
        assert_eq!(depth.observe(30).len(), 1);
        assert!(depth.observe(30).is_empty());
        assert!(depth.observe(10).is_empty());
        assert!(depth.observe(49).is_empty());
        assert_eq!(depth.observe(51)[0].depth, 50);
    }

    #[test]
    fn arbitrary_sequences_respect_invariants() {
        // Small LCG so the sequence is deterministic without extra crates.
        let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
        for _ in 0..200 {
            let mut depth = ScrollDepth::new(&THRESHOLDS);
            let mut fired: Vec<u8> = Vec::new();
            let mut last_max = 0;

            for _ in 0..20 {
                seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
                let percent = ((seed >> 33) % 121) as u32;

                let reached = depth.observe(percent);
                assert!(reached.windows(2).all(|w| w[0].depth < w[1].depth));
                fired.extend(reached.iter().map(|m| m.depth));

                assert!(depth.max_depth() >= last_max);
                last_max = depth.max_depth();
            }

            let mut deduped = fired.clone();
            deduped.dedup();
            assert_eq!(fired, deduped);
            assert!(fired.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
