//! Keeps the machine awake while the scheduled loop runs.
//!
//! A tracker that captures the screen every few minutes is useless on a
//! machine that sleeps or blanks its display between triggers. On Windows
//! this holds `SetThreadExecutionState` flags for the guard's lifetime and
//! restores normal power management on drop. Elsewhere it is a no-op.

pub struct KeepAwake {
    active: bool,
}

impl KeepAwake {
    /// Requests that the system (and optionally the display) stay on.
    /// Best-effort: failure is logged, not fatal.
    pub fn start(prevent_display_off: bool) -> Self {
        let active = platform::acquire(prevent_display_off);
        if active {
            crate::log("Sleep prevention enabled");
        } else {
            crate::log("Sleep prevention not available on this platform");
        }
        Self { active }
    }
}

impl Drop for KeepAwake {
    fn drop(&mut self) {
        if self.active {
            platform::release();
            crate::log("Sleep prevention disabled");
        }
    }
}

#[cfg(windows)]
mod platform {
    use windows::Win32::System::Power::{
        SetThreadExecutionState, ES_CONTINUOUS, ES_DISPLAY_REQUIRED, ES_SYSTEM_REQUIRED,
    };

    pub fn acquire(prevent_display_off: bool) -> bool {
        let mut flags = ES_CONTINUOUS | ES_SYSTEM_REQUIRED;
        if prevent_display_off {
            flags |= ES_DISPLAY_REQUIRED;
        }
        unsafe { SetThreadExecutionState(flags) }.0 != 0
    }

    pub fn release() {
        unsafe { SetThreadExecutionState(ES_CONTINUOUS) };
    }
}

#[cfg(not(windows))]
mod platform {
    pub fn acquire(_prevent_display_off: bool) -> bool {
        false
    }

    pub fn release() {}
}
