use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Elapsed and total time of the loaded track. Shared with the player bar.
#[derive(Default, Debug, Clone)]
pub struct TrackProgress {
    current_position_millis: Arc<AtomicU64>,
    total_duration_millis: Arc<AtomicU64>,
    generation: Arc<AtomicU64>,
}

impl TrackProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_current_position(&self, position: Duration) {
        self.current_position_millis
            .store(position.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn set_total_duration(&self, duration: Duration) {
        self.total_duration_millis
            .store(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn position(&self) -> Duration {
        Duration::from_millis(self.current_position_millis.load(Ordering::Relaxed))
    }

    /// `None` until the source reports a duration.
    pub fn duration(&self) -> Option<Duration> {
        match self.total_duration_millis.load(Ordering::Relaxed) {
            0 => None,
            millis => Some(Duration::from_millis(millis)),
        }
    }

    pub fn ratio(&self) -> f64 {
        match self.duration() {
            Some(total) => {
                (self.position().as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
            }
            None => 0.0,
        }
    }

    pub fn percent(&self) -> u8 {
        (self.ratio() * 100.0).round() as u8
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.set_current_position(Duration::ZERO);
        self.set_total_duration(Duration::ZERO);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_is_rounded_and_clamped() {
        let progress = TrackProgress::new();
        assert_eq!(progress.percent(), 0);

        progress.set_total_duration(Duration::from_secs(3));
        progress.set_current_position(Duration::from_secs(2));
        assert_eq!(progress.percent(), 67);

        progress.set_current_position(Duration::from_secs(10));
        assert_eq!(progress.percent(), 100);
    }

    #[test]
    fn reset_clears_and_bumps_generation() {
        let progress = TrackProgress::new();
        progress.set_total_duration(Duration::from_secs(60));
        progress.set_current_position(Duration::from_secs(30));

        progress.reset();

        assert_eq!(progress.generation(), 1);
        assert_eq!(progress.duration(), None);
        assert_eq!(progress.position(), Duration::ZERO);
    }
}
