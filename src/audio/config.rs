use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AudioConfig {
    /// Percent, 0..=100.
    pub volume: u8,
    pub volume_step: u8,
    pub seek_step_secs: u64,
    /// Clock period of the simulated element.
    pub tick: Duration,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume: 70,
            volume_step: 5,
            seek_step_secs: 5,
            tick: Duration::from_secs(1),
        }
    }
}
