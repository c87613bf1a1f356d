use rand::Rng;

use crate::config::PageConfig;

/// Where a heart is at a given moment, in fractions of the page size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeartPose {
    pub x: f32,
    /// 1.0 is the bottom edge, 0.0 the top; it ends slightly above the page.
    pub y: f32,
    pub opacity: f32,
}

// Heart drifting up the page on an endless loop
#[derive(Clone, Debug)]
pub struct FloatingHeart {
    x: f32,
    duration: f64,
    delay: f64,
}

const START_Y: f32 = 1.0;
const END_Y: f32 = -0.1;

impl FloatingHeart {
    pub fn new(x: f32, duration: f64, delay: f64) -> Self {
        Self {
            x: x.clamp(0.0, 1.0),
            duration: duration.max(f64::EPSILON),
            delay: delay.max(0.0),
        }
    }

    /// Random horizontal starts and loop lengths, staggered start times.
    pub fn scatter<R: Rng + ?Sized>(rng: &mut R, config: &PageConfig) -> Vec<Self> {
        (0..config.heart_count)
            .map(|i| {
                let duration =
                    rng.random_range(config.heart_min_duration..config.heart_max_duration);
                Self::new(
                    rng.random_range(0.0..1.0),
                    duration,
                    i as f64 * config.heart_stagger,
                )
            })
            .collect()
    }

    /// `None` until the heart's start delay has elapsed.
    pub fn pose(&self, time: f64) -> Option<HeartPose> {
        let elapsed = time - self.delay;
        if elapsed < 0.0 {
            return None;
        }
        let progress = ((elapsed % self.duration) / self.duration) as f32;
        let opacity = if progress < 0.5 {
            progress * 2.0
        } else {
            (1.0 - progress) * 2.0
        };
        Some(HeartPose {
            x: self.x,
            y: START_Y + (END_Y - START_Y) * progress,
            opacity,
        })
    }
}

const SWAY_KEYFRAMES: [f32; 4] = [0.0, 20.0, -20.0, 0.0];

/// Sunflower rotation in degrees, cycling through the sway keyframes once
/// per `period` seconds.
pub fn sway_degrees(time: f64, period: f64) -> f32 {
    if period <= 0.0 {
        return 0.0;
    }
    let segments = (SWAY_KEYFRAMES.len() - 1) as f32;
    let t = ((time.rem_euclid(period)) / period) as f32 * segments;
    let i = (t.floor() as usize).min(SWAY_KEYFRAMES.len() - 2);
    let local = t - i as f32;
    SWAY_KEYFRAMES[i] + (SWAY_KEYFRAMES[i + 1] - SWAY_KEYFRAMES[i]) * local
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_before_delay() {
        let heart = FloatingHeart::new(0.3, 10.0, 4.0);
        assert!(heart.pose(3.9).is_none());
        let start = heart.pose(4.0).unwrap();
        assert_eq!(start.y, 1.0);
        assert_eq!(start.opacity, 0.0);
        assert_eq!(start.x, 0.3);
    }

    #[test]
    fn fades_in_and_out_while_rising() {
        let heart = FloatingHeart::new(0.5, 10.0, 0.0);
        let mid = heart.pose(5.0).unwrap();
        assert!((mid.opacity - 1.0).abs() < 1e-6);
        assert!((mid.y - 0.45).abs() < 1e-6);
        let late = heart.pose(9.0).unwrap();
        assert!(late.y < mid.y);
        assert!(late.opacity < mid.opacity);
        // loops back to the bottom
        let again = heart.pose(10.5).unwrap();
        assert!(again.y > late.y);
    }

    #[test]
    fn scatter_follows_config() {
        let config = PageConfig::default();
        let hearts = FloatingHeart::scatter(&mut rand::rng(), &config);
        assert_eq!(hearts.len(), 12);
        for (i, h) in hearts.iter().enumerate() {
            assert_eq!(h.delay, i as f64);
            assert!((10.0..15.0).contains(&h.duration));
            assert!((0.0..=1.0).contains(&h.x));
        }
    }

    #[test]
    fn sway_hits_keyframes() {
        assert_eq!(sway_degrees(0.0, 6.0), 0.0);
        assert!((sway_degrees(2.0, 6.0) - 20.0).abs() < 1e-4);
        assert!((sway_degrees(4.0, 6.0) + 20.0).abs() < 1e-4);
        assert!((sway_degrees(1.0, 6.0) - 10.0).abs() < 1e-4);
        assert!(sway_degrees(6.0, 6.0).abs() < 1e-4);
        assert_eq!(sway_degrees(1.0, 0.0), 0.0);
    }
}
