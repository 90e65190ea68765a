#![forbid(unsafe_code)]

//! Stagger offsets for cascading entrance steps.
//!
//! # Invariants
//!
//! 1. `stagger_offsets(0, ..)` is empty.
//! 2. The first offset is always `Duration::ZERO`.
//! 3. Offsets are non-decreasing and the last one equals `(count - 1) * each`.
//! 4. `Linear` uses exact integer arithmetic.

use std::time::Duration;

use super::{EasingFn, ease_in, ease_in_out, ease_out};

/// How offsets are distributed over the total span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum StaggerMode {
    /// offset[i] = i * each.
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

/// Start offsets for `count` items spaced by `each`.
#[must_use]
pub fn stagger_offsets(count: usize, each: Duration, mode: StaggerMode) -> Vec<Duration> {
    match count {
        0 => return Vec::new(),
        1 => return vec![Duration::ZERO],
        _ => {}
    }

    let easing: EasingFn = match mode {
        StaggerMode::Linear => {
            return (0..count)
                .map(|i| each.saturating_mul(u32::try_from(i).unwrap_or(u32::MAX)))
                .collect();
        }
        StaggerMode::EaseIn => ease_in,
        StaggerMode::EaseOut => ease_out,
        StaggerMode::EaseInOut => ease_in_out,
    };

    let span = each.as_secs_f64() * (count - 1) as f64;
    (0..count)
        .map(|i| {
            let t = i as f64 / (count - 1) as f64;
            Duration::from_secs_f64(span * easing(t))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_150: Duration = Duration::from_millis(150);

    #[test]
    fn empty_and_single() {
        assert!(stagger_offsets(0, MS_150, StaggerMode::Linear).is_empty());
        assert_eq!(
            stagger_offsets(1, MS_150, StaggerMode::EaseIn),
            vec![Duration::ZERO]
        );
    }

    #[test]
    fn linear_is_exact() {
        let offsets = stagger_offsets(3, MS_150, StaggerMode::Linear);
        assert_eq!(
            offsets,
            vec![Duration::ZERO, MS_150, Duration::from_millis(300)]
        );
    }

    #[test]
    fn eased_spans_match_linear_total() {
        for mode in [StaggerMode::EaseIn, StaggerMode::EaseOut, StaggerMode::EaseInOut] {
            let offsets = stagger_offsets(5, MS_150, mode);
            assert_eq!(offsets[0], Duration::ZERO);
            let last = offsets[4].as_secs_f64();
            assert!((last - 0.6).abs() < 1e-6, "{mode:?}: {last}");
            assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
