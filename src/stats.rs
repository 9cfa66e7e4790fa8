//! Box plot statistics.
//!
//! Quartiles use linear interpolation between order statistics; whiskers
//! follow the standard Tukey rule (most extreme sample within 1.5 × IQR of
//! the nearest quartile), with samples beyond that range reported as fliers.

/// Statistics describing one box of a box plot.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoxStats {
    /// First quartile (25th percentile).
    pub q1: f64,
    /// Median (50th percentile).
    pub median: f64,
    /// Third quartile (75th percentile).
    pub q3: f64,
    /// Lower whisker end.
    pub whisker_lo: f64,
    /// Upper whisker end.
    pub whisker_hi: f64,
    /// Outlier values beyond the whiskers.
    pub fliers: Vec<f64>,
}

impl BoxStats {
    /// Compute box plot statistics from raw samples.
    ///
    /// Uses the 1.5 × IQR rule for outlier detection. Non-finite samples
    /// are dropped; returns `None` when nothing finite remains.
    #[must_use]
    pub fn from_samples(data: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let n = sorted.len();
        let q1 = percentile(&sorted, 25.0);
        let median = percentile(&sorted, 50.0);
        let q3 = percentile(&sorted, 75.0);
        let iqr = q3 - q1;

        let lower_fence = q1 - 1.5 * iqr;
        let upper_fence = q3 + 1.5 * iqr;

        // Whiskers reach the most extreme samples inside the fences.
        let whisker_lo = sorted
            .iter()
            .copied()
            .find(|&x| x >= lower_fence)
            .unwrap_or(sorted[0]);
        let whisker_hi = sorted
            .iter()
            .rev()
            .copied()
            .find(|&x| x <= upper_fence)
            .unwrap_or(sorted[n - 1]);

        let fliers: Vec<f64> = sorted
            .iter()
            .copied()
            .filter(|&x| x < lower_fence || x > upper_fence)
            .collect();

        Some(Self {
            q1,
            median,
            q3,
            whisker_lo,
            whisker_hi,
            fliers,
        })
    }

    /// Interquartile range (Q3 − Q1).
    #[must_use]
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Notch confidence interval half-width for `n` samples
    /// (`1.57 × IQR / √n`).
    #[must_use]
    pub fn notch_ci(&self, n: usize) -> f64 {
        if n == 0 {
            return 0.0;
        }
        1.57 * self.iqr() / (n as f64).sqrt()
    }
}

/// Calculate a percentile of sorted data using linear interpolation.
#[must_use]
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let k = (p / 100.0) * (sorted.len() - 1) as f64;
    let f = k.floor() as usize;
    let c = k.ceil() as usize;

    if f == c || c >= sorted.len() {
        sorted[f.min(sorted.len() - 1)]
    } else {
        let d = k - f as f64;
        sorted[f] * (1.0 - d) + sorted[c] * d
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_percentile_interpolation() {
        let data = vec![1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(percentile(&data, 50.0), 2.5);
        assert_relative_eq!(percentile(&data, 0.0), 1.0);
        assert_relative_eq!(percentile(&data, 100.0), 4.0);
    }

    #[test]
    fn test_stats_simple() {
        let data: Vec<f64> = (1..=9).map(f64::from).collect();
        let stats = BoxStats::from_samples(&data).unwrap();
        assert_relative_eq!(stats.median, 5.0);
        assert_relative_eq!(stats.q1, 3.0);
        assert_relative_eq!(stats.q3, 7.0);
        assert!(stats.fliers.is_empty());
        assert_relative_eq!(stats.whisker_lo, 1.0);
        assert_relative_eq!(stats.whisker_hi, 9.0);
    }

    #[test]
    fn test_fliers_beyond_tukey_fence() {
        let mut data: Vec<f64> = (1..=9).map(f64::from).collect();
        data.push(100.0);
        let stats = BoxStats::from_samples(&data).unwrap();
        // IQR fences exclude 100; whisker stops at the last in-fence sample.
        assert_eq!(stats.fliers, vec![100.0]);
        assert_relative_eq!(stats.whisker_hi, 9.0);
    }

    #[test]
    fn test_non_finite_dropped() {
        let data = vec![f64::NAN, 1.0, 2.0, f64::INFINITY, 3.0];
        let stats = BoxStats::from_samples(&data).unwrap();
        assert_relative_eq!(stats.median, 2.0);
    }

    #[test]
    fn test_empty_and_all_nan() {
        assert!(BoxStats::from_samples(&[]).is_none());
        assert!(BoxStats::from_samples(&[f64::NAN]).is_none());
    }

    #[test]
    fn test_notch_ci() {
        let stats = BoxStats {
            q1: 1.0,
            median: 2.0,
            q3: 3.0,
            whisker_lo: 0.0,
            whisker_hi: 4.0,
            fliers: vec![],
        };
        assert_relative_eq!(stats.notch_ci(4), 1.57 * 2.0 / 2.0);
        assert_relative_eq!(stats.notch_ci(0), 0.0);
    }
}
