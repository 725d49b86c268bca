use crate::canvas::Color;
use fastrand::Rng;

/// Uniform sample in `[min, max)`. An inverted range yields values in
/// `(max, min]` instead of panicking, which keeps tiny viewports alive.
pub fn rand_range(rng: &mut Rng, min: f32, max: f32) -> f32 {
    min + rng.f32() * (max - min)
}

/// Uniform integer in `[min, max]`.
pub fn rand_int(rng: &mut Rng, min: i32, max: i32) -> i32 {
    if max <= min {
        return min;
    }
    rng.i32(min..=max)
}

/// Wraps any hue into `[0, 360)`.
pub fn wrap_hue(hue: f32) -> f32 {
    let h = hue.rem_euclid(360.0);
    if h >= 360.0 { 0.0 } else { h }
}

/// Standard HSL to RGB conversion. `s` and `l` are in `[0, 1]`.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Color {
    let h = wrap_hue(h);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match (h / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    (
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    )
}

/// Firework palette: fully saturated, slightly bright.
pub fn hue_to_color(hue: f32) -> Color {
    hsl_to_rgb(hue, 1.0, 0.6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hue_to_color_primaries() {
        assert_eq!(hue_to_color(0.0), (255, 51, 51));
        assert_eq!(hue_to_color(120.0), (51, 255, 51));
        assert_eq!(hue_to_color(240.0), (51, 51, 255));
        assert_eq!(hue_to_color(360.0), hue_to_color(0.0));
    }

    #[test]
    fn test_rand_int_inverted_range() {
        let mut rng = Rng::with_seed(7);
        assert_eq!(rand_int(&mut rng, 5, 3), 5);
        assert_eq!(rand_int(&mut rng, 4, 4), 4);
    }

    #[test]
    fn test_wrap_hue() {
        assert_eq!(wrap_hue(-40.0), 320.0);
        assert_eq!(wrap_hue(400.0), 40.0);
        assert_eq!(wrap_hue(0.0), 0.0);
    }

    proptest! {
        #[test]
        fn rand_range_stays_in_bounds(seed in any::<u64>(), min in -500.0f32..500.0, span in 0.001f32..500.0) {
            let mut rng = Rng::with_seed(seed);
            let v = rand_range(&mut rng, min, min + span);
            prop_assert!(v >= min && v <= min + span);
        }

        #[test]
        fn rand_int_is_inclusive(seed in any::<u64>(), min in -100i32..100, span in 0i32..100) {
            let mut rng = Rng::with_seed(seed);
            let v = rand_int(&mut rng, min, min + span);
            prop_assert!(v >= min && v <= min + span);
        }
    }
}
