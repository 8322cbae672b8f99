//! Least-squares linear trend
//!
//! Fits `y = intercept + slope·x` over the collected points. With fewer than
//! two points, or when every x is the same, the fit is undefined; the trend
//! then echoes the last observed y (slope 0), which leaves any decision
//! built on it where it was.

use crate::controller::finite_or_zero;
use serde::{Deserialize, Serialize};

/// Result of a fit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendFit {
    pub intercept: f64,
    pub slope: f64,
}

impl TrendFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Bounded window of (x, y) points with a least-squares fit
///
/// # Example
/// ```
/// use firm_control_core_rs::stats::LinearTrend;
///
/// let mut trend = LinearTrend::new(10);
/// trend.push(1.0, 3.0);
/// assert_eq!(trend.fit().slope, 0.0); // echo
/// assert_eq!(trend.fit().intercept, 3.0);
///
/// trend.push(2.0, 5.0);
/// trend.push(3.0, 7.0);
/// assert!((trend.fit().slope - 2.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearTrend {
    points: Vec<(f64, f64)>,
    capacity: usize,
}

impl LinearTrend {
    /// Keep at most `capacity` points; the oldest is dropped first
    ///
    /// # Panics
    /// Panics if `capacity < 2`
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "a trend needs room for at least two points");
        Self {
            points: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, x: f64, y: f64) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        if self.points.len() == self.capacity {
            self.points.remove(0);
        }
        self.points.push((x, y));
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn last(&self) -> Option<(f64, f64)> {
        self.points.last().copied()
    }

    /// Least-squares fit, or the echo of the last y when underdetermined
    pub fn fit(&self) -> TrendFit {
        self.try_fit().unwrap_or(TrendFit {
            intercept: self.last().map(|(_, y)| y).unwrap_or(0.0),
            slope: 0.0,
        })
    }

    /// Least-squares fit, `None` with fewer than two distinct x values
    pub fn try_fit(&self) -> Option<TrendFit> {
        if self.points.len() < 2 {
            return None;
        }

        let n = self.points.len() as f64;
        let mean_x = self.points.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = self.points.iter().map(|(_, y)| y).sum::<f64>() / n;
        let sxx: f64 = self.points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
        let sxy: f64 = self
            .points
            .iter()
            .map(|(x, y)| (x - mean_x) * (y - mean_y))
            .sum();

        if sxx == 0.0 {
            return None;
        }
        let slope = finite_or_zero(sxy / sxx);
        Some(TrendFit {
            intercept: mean_y - slope * mean_x,
            slope,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_trend_is_flat_zero() {
        let trend = LinearTrend::new(4);
        assert_eq!(trend.fit(), TrendFit { intercept: 0.0, slope: 0.0 });
    }

    #[test]
    fn test_identical_x_echoes_last() {
        let mut trend = LinearTrend::new(4);
        trend.push(2.0, 10.0);
        trend.push(2.0, 14.0);
        let fit = trend.fit();
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.predict(100.0), 14.0);
    }

    #[test]
    fn test_window_drops_oldest() {
        let mut trend = LinearTrend::new(2);
        trend.push(0.0, 100.0);
        trend.push(1.0, 1.0);
        trend.push(2.0, 2.0);
        assert_eq!(trend.len(), 2);
        assert!((trend.fit().slope - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_points_skipped() {
        let mut trend = LinearTrend::new(4);
        trend.push(f64::NAN, 1.0);
        trend.push(1.0, f64::INFINITY);
        assert!(trend.is_empty());
    }
}
