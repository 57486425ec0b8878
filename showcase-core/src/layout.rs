//! # Adaptive Layout Solver
//!
//! Chooses a column count, card width and gutter for a row of cards so that
//! the row fills the available width while every value stays inside its
//! bounds. Candidates keep the target gap whenever they can; the width
//! absorbs the rest.
//!
//! ```rust
//! use showcase_core::layout::{solve, LayoutConstraints};
//!
//! let result = solve(&LayoutConstraints::with_width(1000.0));
//! assert_eq!(result.columns, 2);
//! assert_eq!(result.gap, 40.0);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

const EPSILON: f64 = 1e-6;

/// Column counts examined on each side of the starting count. Width and gap
/// move monotonically with the column count, so the best score lies close to
/// the target.
const SEARCH_RADIUS: usize = 8;

/// Bounds for one solve. Out-of-range values are clamped, not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConstraints {
    pub total_width: f64,
    pub item_count_upper_bound: usize,
    pub min_item_width: f64,
    pub max_item_width: f64,
    pub target_item_width: f64,
    pub target_gap: f64,
    pub min_gap: f64,
    pub max_gap: f64,
}

impl Default for LayoutConstraints {
    fn default() -> Self {
        Self {
            total_width: 1200.0,
            item_count_upper_bound: 50,
            min_item_width: 280.0,
            max_item_width: 500.0,
            target_item_width: 390.0,
            target_gap: 40.0,
            min_gap: 35.0,
            max_gap: 60.0,
        }
    }
}

impl LayoutConstraints {
    /// Card grid defaults for the given container width
    pub fn with_width(total_width: f64) -> Self {
        Self {
            total_width,
            ..Default::default()
        }
    }

    pub fn item_count(mut self, count: usize) -> Self {
        self.item_count_upper_bound = count;
        self
    }
}

/// Chosen layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    pub columns: usize,
    pub card_width: f64,
    pub gap: f64,
}

impl LayoutResult {
    /// Width occupied by one full row
    pub fn row_width(&self) -> f64 {
        self.columns as f64 * self.card_width + self.columns.saturating_sub(1) as f64 * self.gap
    }

    /// Rows needed for `count` items
    pub fn rows(&self, count: usize) -> usize {
        count.div_ceil(self.columns.max(1))
    }
}

/// Constraints after clamping
#[derive(Debug, Clone, Copy)]
struct Bounds {
    total: f64,
    count: usize,
    min_width: f64,
    max_width: f64,
    target_width: f64,
    target_gap: f64,
    min_gap: f64,
    max_gap: f64,
}

impl Bounds {
    fn from_constraints(c: &LayoutConstraints) -> Self {
        let finite = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };

        let total = finite(c.total_width, 1.0).max(1.0);
        let min_width = finite(c.min_item_width, 1.0).max(1.0).min(total);
        let max_width = finite(c.max_item_width, total).min(total).max(min_width);
        let target_width = finite(c.target_item_width, min_width).clamp(min_width, max_width);
        let min_gap = finite(c.min_gap, 0.0).max(0.0).min(total);
        let max_gap = finite(c.max_gap, min_gap).min(total).max(min_gap);
        let target_gap = finite(c.target_gap, min_gap).clamp(min_gap, max_gap);

        Self {
            total,
            count: c.item_count_upper_bound.max(1),
            min_width,
            max_width,
            target_width,
            target_gap,
            min_gap,
            max_gap,
        }
    }

    /// Most columns that fit at minimum width and gap
    fn max_columns(&self) -> usize {
        let fit = ((self.total + self.min_gap) / (self.min_width + self.min_gap) + EPSILON).floor();
        (fit as usize).clamp(1, self.count)
    }

    /// Fewest columns that cover the row at maximum width and gap
    fn min_columns(&self, max_columns: usize) -> usize {
        let need = ((self.total + self.max_gap) / (self.max_width + self.max_gap) - EPSILON).ceil();
        (need.max(1.0) as usize).min(max_columns)
    }

    /// Column count implied by the target width and gap
    fn target_columns(&self) -> usize {
        let fit = ((self.total + self.target_gap) / (self.target_width + self.target_gap) + EPSILON).floor();
        fit.max(1.0) as usize
    }

    fn evaluate(&self, columns: usize) -> Option<Candidate> {
        let cols = columns as f64;
        let gutters = cols - 1.0;

        let mut gap = self.target_gap;
        let mut width = (self.total - gutters * gap) / cols;

        if width > self.max_width {
            width = self.max_width;
            gap = self.gap_for(width, cols);
        } else if width < self.min_width {
            width = self.min_width;
            gap = self.gap_for(width, cols);
        }

        let used = cols * width + gutters * gap;
        if used > self.total + EPSILON {
            return None;
        }

        // Spend leftover space on width first, then on the gutters
        let mut slack = self.total - used;
        if slack > EPSILON {
            let grow = (slack / cols).min(self.max_width - width).max(0.0);
            width += grow;
            slack -= grow * cols;
        }
        if slack > EPSILON && gutters > 0.0 {
            gap += (slack / gutters).min(self.max_gap - gap).max(0.0);
        }

        Some(Candidate {
            columns,
            width,
            gap,
            score: self.score(width, gap),
        })
    }

    /// Gap that exactly fills the row at `width`, clamped to its bounds
    fn gap_for(&self, width: f64, cols: f64) -> f64 {
        if cols <= 1.0 {
            return self.target_gap;
        }
        ((self.total - cols * width) / (cols - 1.0)).clamp(self.min_gap, self.max_gap)
    }

    /// Lower is better
    fn score(&self, width: f64, gap: f64) -> f64 {
        let at_max_gap = (gap - self.max_gap).abs() <= EPSILON;
        let at_max_width = (width - self.max_width).abs() <= EPSILON;

        if (gap - self.target_gap).abs() <= EPSILON {
            if width + EPSILON >= self.target_width {
                width - self.target_width
            } else {
                1_000_000.0 + (self.target_width - width)
            }
        } else if gap < self.target_gap {
            2_000_000.0 + (self.target_gap - gap) + (width - self.min_width) / self.total
        } else if at_max_gap && at_max_width {
            4_000_000.0
        } else if at_max_gap {
            3_000_000.0 + (width - self.target_width).abs()
        } else {
            1_500_000.0 + (gap - self.target_gap)
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    columns: usize,
    width: f64,
    gap: f64,
    score: f64,
}

impl From<Candidate> for LayoutResult {
    fn from(c: Candidate) -> Self {
        LayoutResult {
            columns: c.columns,
            card_width: c.width,
            gap: c.gap,
        }
    }
}

/// Solve for the best layout within `constraints`
pub fn solve(constraints: &LayoutConstraints) -> LayoutResult {
    let bounds = Bounds::from_constraints(constraints);
    let max_columns = bounds.max_columns();
    let min_columns = bounds.min_columns(max_columns);

    if max_columns == 1 {
        return LayoutResult {
            columns: 1,
            card_width: bounds.target_width,
            gap: bounds.target_gap,
        };
    }

    if min_columns == max_columns {
        if let Some(candidate) = bounds.evaluate(max_columns) {
            return candidate.into();
        }
    }

    let start = bounds.target_columns().clamp(min_columns, max_columns);
    let mut best: Option<Candidate> = None;
    let span = (start - min_columns)
        .max(max_columns - start)
        .min(SEARCH_RADIUS);

    for offset in 0..=span {
        let fewer = start.checked_sub(offset).filter(|c| *c >= min_columns);
        let more = start
            .checked_add(offset)
            .filter(|c| offset > 0 && *c <= max_columns);

        for columns in [fewer, more].into_iter().flatten() {
            if let Some(candidate) = bounds.evaluate(columns) {
                if best.map_or(true, |b| candidate.score < b.score) {
                    best = Some(candidate);
                }
            }
        }
    }

    match best {
        Some(candidate) => {
            debug!(
                "Layout for {}px: {} columns at {:.1}px, gap {:.1}px",
                bounds.total, candidate.columns, candidate.width, candidate.gap
            );
            candidate.into()
        }
        None => bounds.evaluate(max_columns).map(Into::into).unwrap_or(LayoutResult {
            columns: max_columns,
            card_width: bounds.min_width,
            gap: bounds.min_gap,
        }),
    }
}
