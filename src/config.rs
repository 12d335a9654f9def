use bitflags::bitflags;

/// Pacing used by the native engine when driving GUI interactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum RunSpeed {
    /// Run interactions as fast as the engine allows.
    Fast = 0,
    /// Insert small delays so a human can follow along.
    Normal = 1,
    /// Slow, demonstration-friendly pacing.
    Cinematic = 2,
}

bitflags! {
    /// Options forwarded to the native engine when queueing a test.
    pub struct RunFlags: u32 {
        /// Queue for an unattended run (no GUI focus stealing).
        const HEADLESS          = 0b0001;
        /// Skip screen capture even when the engine would record one.
        const NO_CAPTURE        = 0b0010;
        /// Keep running queued tests after this one fails.
        const CONTINUE_ON_ERROR = 0b0100;
    }
}

/// Main engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Name reported for this host application.
    pub app_name: String,
    /// Pacing for GUI driving.
    pub run_speed: RunSpeed,
    /// Stop draining the queue as soon as a check fails.
    pub stop_on_failure: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            app_name: "uitest-host".to_string(),
            run_speed: RunSpeed::Fast,
            stop_on_failure: false,
        }
    }
}
