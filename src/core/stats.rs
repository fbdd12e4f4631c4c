use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::Deposit;

/// Rolling lookback windows over which deposit averages are reported.
///
/// Windows overlap by construction: a deposit from three days ago counts
/// toward every window. Each one answers "what is my average deposit over
/// the last N days", not a partition of the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Window {
    Week,
    Month,
    SixMonths,
    Year,
}

impl Window {
    /// Every bounded window, shortest first.
    pub const ALL: [Window; 4] = [
        Window::Week,
        Window::Month,
        Window::SixMonths,
        Window::Year,
    ];

    /// Lookback duration of the window.
    pub fn duration(self) -> Duration {
        match self {
            Window::Week => Duration::days(7),
            Window::Month => Duration::days(30),
            Window::SixMonths => Duration::days(180),
            Window::Year => Duration::days(365),
        }
    }

    /// Stable label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Window::Week => "week",
            Window::Month => "month",
            Window::SixMonths => "six_months",
            Window::Year => "year",
        }
    }
}

/// Mean deposit size and deposit count for one window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    pub mean: f64,
    pub count: usize,
}

/// Per-window and all-time deposit statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub per_window: BTreeMap<Window, WindowStats>,
    pub all_time: WindowStats,
}

impl Statistics {
    /// Stats for a single bounded window.
    pub fn window(&self, window: Window) -> WindowStats {
        self.per_window.get(&window).copied().unwrap_or_default()
    }
}

/// Computes mean deposit size and count for every lookback window as of
/// `now`, in a single pass over the history.
///
/// A deposit belongs to a window when its timestamp is at or after
/// `now - duration`. A window with no members reports a mean of zero,
/// never an error or NaN, so callers need not special-case empty windows.
pub fn statistics(deposits: &[Deposit], now: DateTime<Utc>) -> Statistics {
    let cutoffs = Window::ALL.map(|w| now - w.duration());
    let mut sums = [0.0_f64; Window::ALL.len()];
    let mut counts = [0_usize; Window::ALL.len()];
    let mut all_sum = 0.0_f64;
    let mut all_count = 0_usize;

    for deposit in deposits {
        all_sum += deposit.amount;
        all_count += 1;
        for (i, cutoff) in cutoffs.iter().enumerate() {
            if deposit.timestamp >= *cutoff {
                sums[i] += deposit.amount;
                counts[i] += 1;
            }
        }
    }

    let per_window = Window::ALL
        .into_iter()
        .enumerate()
        .map(|(i, window)| (window, window_stats(sums[i], counts[i])))
        .collect();
    Statistics {
        per_window,
        all_time: window_stats(all_sum, all_count),
    }
}

fn window_stats(sum: f64, count: usize) -> WindowStats {
    let mean = if count == 0 { 0.0 } else { sum / count as f64 };
    WindowStats { mean, count }
}
