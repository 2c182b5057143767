//! Position smoothing.
//!
//! Exponential-window running mean: the window grows with the sample count
//! until it reaches `length`, after which each new sample carries weight
//! `1/length`. A running variance of the update distance is kept alongside.
//! The first sample seeds the mean with zero variance.

use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct GeoFilter {
    length: usize,
    count: usize,
    mean: [f64; 3],
    var: f64,
}

impl GeoFilter {
    /// A length of 0 or 1 disables smoothing.
    pub fn new(length: usize) -> Self {
        Self { length: length.max(1), count: 0, mean: [0.0; 3], var: 0.0 }
    }

    pub fn update(&mut self, value: [f64; 3]) -> [f64; 3] {
        self.count += 1;
        if self.count == 1 {
            self.mean = value;
            return self.mean;
        }
        let window = self.count.min(self.length) as f64;
        let mut dist2 = 0.0;
        for (m, v) in self.mean.iter_mut().zip(value) {
            let diff = v - *m;
            *m += diff / window;
            dist2 += diff * diff;
        }
        self.var += (dist2 - self.var) / window;
        self.mean
    }

    /// Spread of recent samples around the mean, in floorplan units.
    pub fn deviation(&self) -> f64 {
        self.var.sqrt()
    }
}

/// One filter per tag, created on first sample.
#[derive(Debug, Clone)]
pub struct FilterBank {
    length: usize,
    filters: HashMap<String, GeoFilter>,
}

impl FilterBank {
    pub fn new(length: usize) -> Self {
        Self { length, filters: HashMap::new() }
    }

    /// Whether samples are actually averaged.
    pub fn smoothing(&self) -> bool {
        self.length > 1
    }

    pub fn update(&mut self, eui: &str, value: [f64; 3]) -> [f64; 3] {
        let length = self.length;
        self.filters
            .entry(eui.to_string())
            .or_insert_with(|| GeoFilter::new(length))
            .update(value)
    }

    pub fn get(&self, eui: &str) -> Option<&GeoFilter> {
        self.filters.get(eui)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_length_one_passes_samples_through() {
        let mut f = GeoFilter::new(1);
        assert_eq!(f.update([1.0, 2.0, 3.0]), [1.0, 2.0, 3.0]);
        assert_eq!(f.update([4.0, 5.0, 6.0]), [4.0, 5.0, 6.0]);
        assert_eq!(GeoFilter::new(0).update([7.0, 0.0, 0.0]), [7.0, 0.0, 0.0]);
        assert!(!FilterBank::new(1).smoothing());
    }

    #[test]
    fn test_growing_window_is_plain_average() {
        let mut f = GeoFilter::new(10);
        f.update([0.0, 0.0, 0.0]);
        f.update([2.0, 4.0, 0.0]);
        let m = f.update([4.0, 8.0, 0.0]);
        assert!(close(m[0], 2.0));
        assert!(close(m[1], 4.0));
    }

    #[test]
    fn test_full_window_weights_new_sample() {
        let mut f = GeoFilter::new(2);
        f.update([0.0, 0.0, 0.0]);
        f.update([2.0, 0.0, 0.0]);
        let m = f.update([4.0, 0.0, 0.0]);
        // mean was 1.0, new sample moves it halfway to 4.0
        assert!(close(m[0], 2.5));
    }

    #[test]
    fn test_first_sample_has_no_deviation() {
        let mut f = GeoFilter::new(4);
        f.update([8.0, 3.0, 0.0]);
        assert_eq!(f.deviation(), 0.0);
    }

    #[test]
    fn test_stationary_tag_has_shrinking_deviation() {
        let mut f = GeoFilter::new(4);
        f.update([1.0, 1.0, 0.0]);
        f.update([1.4, 1.0, 0.0]);
        let first = f.deviation();
        assert!(first > 0.0);
        for _ in 0..20 {
            f.update([1.2, 1.0, 0.0]);
        }
        assert!(f.deviation() < first);
    }

    #[test]
    fn test_bank_keeps_tags_apart() {
        let mut bank = FilterBank::new(10);
        assert!(bank.smoothing());
        bank.update("a", [0.0, 0.0, 0.0]);
        let a = bank.update("a", [2.0, 0.0, 0.0]);
        let b = bank.update("b", [10.0, 0.0, 0.0]);
        assert!(close(a[0], 1.0));
        assert_eq!(b, [10.0, 0.0, 0.0]);
        assert!(close(bank.get("a").unwrap().deviation(), 2f64.sqrt()));
        assert_eq!(bank.get("b").unwrap().deviation(), 0.0);
        assert!(bank.get("c").is_none());
    }
}
