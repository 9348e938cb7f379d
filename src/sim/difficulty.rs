//! Difficulty curves shared by both threat schedulers
//!
//! Spawn intervals shrink multiplicatively toward a floor; spawn chances grow
//! additively toward a ceiling. Both clamp on every step, so neither can
//! overshoot its limit.

/// Multiplicative decay toward a floor: `max(floor, current * rate)`
#[inline]
pub fn advance(current: f32, rate: f32, floor: f32) -> f32 {
    floor.max(current * rate)
}

/// Additive growth toward a ceiling: `min(ceiling, current + step)`
#[inline]
pub fn grow(current: f32, step: f32, ceiling: f32) -> f32 {
    ceiling.min(current + step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_advance_converges_to_floor() {
        let mut current = 5.0;
        let mut prev = current;
        for _ in 0..200 {
            current = advance(current, 0.95, 0.5);
            assert!(current <= prev);
            assert!(current >= 0.5);
            prev = current;
        }
        assert_eq!(current, 0.5);
    }

    #[test]
    fn test_ten_escalations() {
        let mut current = 2.0;
        for _ in 0..10 {
            current = advance(current, 0.95, 0.5);
        }
        let expected = (2.0_f32 * 0.95_f32.powi(10)).max(0.5);
        assert!((current - expected).abs() < 1e-4);
        assert!((current - 1.197).abs() < 1e-3);
    }

    #[test]
    fn test_grow_clamps_at_ceiling() {
        let mut chance = 0.3;
        for _ in 0..100 {
            chance = grow(chance, 0.01, 0.7);
            assert!(chance <= 0.7);
        }
        assert_eq!(chance, 0.7);
    }

    proptest! {
        #[test]
        fn advance_never_below_floor(
            floor in 0.01f32..10.0,
            extra in 0.0f32..100.0,
            rate in 0.01f32..1.0,
            steps in 1usize..300,
        ) {
            let mut current = floor + extra;
            for _ in 0..steps {
                let next = advance(current, rate, floor);
                prop_assert!(next >= floor);
                prop_assert!(next <= current);
                current = next;
            }
        }

        #[test]
        fn grow_never_above_ceiling(
            start in 0.0f32..1.0,
            step in 0.0f32..0.5,
            steps in 1usize..300,
        ) {
            let ceiling = 1.0;
            let mut current = start;
            for _ in 0..steps {
                let next = grow(current, step, ceiling);
                prop_assert!(next <= ceiling);
                prop_assert!(next >= current);
                current = next;
            }
        }
    }
}
