//! Publication rate control for snapshot streams

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How often a subscriber wants to see snapshots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateRate {
    /// Every applied delta
    #[default]
    Native,

    /// At most this many snapshots per second, latest wins
    Max(u32),
}

impl UpdateRate {
    /// Build from an optional Hz setting; `None` and `0` mean native.
    pub fn from_hz(hz: Option<u32>) -> Self {
        match hz {
            None | Some(0) => UpdateRate::Native,
            Some(hz) => UpdateRate::Max(hz),
        }
    }

    /// Get throttle interval if needed
    pub fn throttle_interval(self) -> Option<Duration> {
        match self {
            UpdateRate::Native | UpdateRate::Max(0) => None,
            UpdateRate::Max(hz) => Some(Duration::from_secs_f64(1.0 / hz as f64)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_hz_means_native() {
        assert_eq!(UpdateRate::from_hz(None), UpdateRate::Native);
        assert_eq!(UpdateRate::from_hz(Some(0)), UpdateRate::Native);
        assert_eq!(UpdateRate::Max(0).throttle_interval(), None);
    }

    #[test]
    fn max_rate_yields_interval() {
        let interval = UpdateRate::from_hz(Some(4)).throttle_interval();
        assert_eq!(interval, Some(Duration::from_millis(250)));
    }
}
