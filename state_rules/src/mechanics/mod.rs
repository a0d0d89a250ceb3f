//! Game mechanics: growth grants, rank tables, progression speed and
//! derived attributes.

mod derived;
mod growth;
mod ranks;
mod speed;

pub use derived::*;
pub use growth::*;
pub use ranks::*;
pub use speed::*;

/// Linear interpolation of `value` from `[in_min, in_max]` into
/// `[out_min, out_max]`. The input is clamped to its range first.
pub fn lerp(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    if in_max <= in_min {
        return out_min;
    }
    let t = ((value - in_min) / (in_max - in_min)).clamp(0.0, 1.0);
    out_min + t * (out_max - out_min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_clamps_input() {
        assert_eq!(lerp(-5.0, 0.0, 10.0, 0.5, 2.0), 0.5);
        assert_eq!(lerp(50.0, 0.0, 10.0, 0.5, 2.0), 2.0);
        assert!((lerp(5.0, 0.0, 10.0, 0.5, 2.0) - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_lerp_degenerate_range() {
        assert_eq!(lerp(3.0, 1.0, 1.0, 0.2, 0.9), 0.2);
    }
}
