//! Bar-height scaling on a 0–100 visual scale.
//!
//! Both scalers are total: no input produces NaN, infinity, or a division
//! by zero, and heights never decrease as magnitude grows.

/// Min-max scaling over the positive entries of a series (weight bars).
///
/// Zero entries mean "no reading" and always map to 0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinMaxScale {
    pub floor: f64,
    pub flat: f64,
}

impl Default for MinMaxScale {
    fn default() -> Self {
        Self {
            floor: 35.0,
            flat: 70.0,
        }
    }
}

impl MinMaxScale {
    pub fn scale(&self, values: &[f64]) -> Vec<f64> {
        let positive = values.iter().copied().filter(|v| is_reading(*v));
        let (min, max) = positive.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if min > max {
            return vec![0.0; values.len()];
        }

        values
            .iter()
            .map(|v| {
                if !is_reading(*v) {
                    0.0
                } else if max == min {
                    self.flat
                } else {
                    self.floor + (v - min) / (max - min) * (100.0 - self.floor)
                }
            })
            .collect()
    }
}

fn is_reading(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// Magnitude scaling for series that may be negative (net-calorie bars).
///
/// Every bar is at least `floor` high so near-zero days stay visible.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SymmetricScale {
    pub floor: f64,
}

impl Default for SymmetricScale {
    fn default() -> Self {
        Self { floor: 5.0 }
    }
}

impl SymmetricScale {
    pub fn scale(&self, values: &[f64]) -> Vec<f64> {
        let magnitude = |v: f64| if v.is_finite() { v.abs() } else { 0.0 };
        let max_abs = values.iter().map(|v| magnitude(*v)).fold(0.0, f64::max);
        if max_abs == 0.0 {
            return vec![self.floor; values.len()];
        }
        values
            .iter()
            .map(|v| self.floor + magnitude(*v) / max_abs * (100.0 - self.floor))
            .collect()
    }
}
