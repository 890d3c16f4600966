// Helpers to handle budgeting subsystems based on time
//
// Austin Shafer - 2020
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub fn get_current_time() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

// Helper to get the current time in milliseconds
#[allow(dead_code)]
pub fn get_current_millis() -> u32 {
    get_current_time().as_millis() as u32
}

// Manages subsystem timings
//
// This keeps track of how much time is remaining before an
// action needs to be called, and callers can use this number
// for their timeout values. The compositor uses it for the
// idle timer, which is reset by every input event.
//
// This isn't a timing subsystem, but rather a helper
// for tracking timing information.
#[derive(Debug, Clone)]
pub struct TimingManager {
    // length of time we are counting down from
    tm_period: Duration,
    // the last time we reset this manager
    tm_start: Duration,
}

impl TimingManager {
    // create a new manager to track time
    // periods of length `period`
    pub fn new(period: u32) -> TimingManager {
        TimingManager {
            tm_period: Duration::from_millis(period as u64),
            tm_start: get_current_time(),
        }
    }

    // Reset the manager to the current time
    pub fn reset(&mut self) {
        self.tm_start = get_current_time();
    }

    /// Change the length of the countdown
    ///
    /// This does not reset the start time.
    pub fn set_period(&mut self, period: u32) {
        self.tm_period = Duration::from_millis(period as u64);
    }

    pub fn get_period(&self) -> u32 {
        self.tm_period.as_millis() as u32
    }

    // Returns true if period ms have passed
    // since this manager was reset
    pub fn is_overdue(&self) -> bool {
        let time = get_current_time();

        // If it has been period ms
        time.saturating_sub(self.tm_start) >= self.tm_period
    }

    // Returns the number of ms remaining in this
    // tracker
    //
    // If 0 is returned, it is overdue and we
    // should reset it.
    pub fn time_remaining(&self) -> usize {
        let time_elapsed = get_current_time().saturating_sub(self.tm_start);
        if self.is_overdue() {
            return 0;
        }
        return self.tm_period.saturating_sub(time_elapsed).as_millis() as usize;
    }
}

// A stopclock for measuring time intervals
//
// The order of use MUST be `new`, `start`, `end`
// after that the recorded duration can be
// got with `get_duration`
#[allow(dead_code)]
pub struct StopWatch {
    sw_start: Duration,
    sw_end: Duration,
}

impl StopWatch {
    // Create an empty stopwatch
    pub fn new() -> StopWatch {
        StopWatch {
            sw_start: Duration::from_millis(0),
            sw_end: Duration::from_millis(0),
        }
    }

    pub fn start(&mut self) {
        self.sw_start = get_current_time();
    }

    pub fn end(&mut self) {
        self.sw_end = get_current_time();
    }

    pub fn get_duration(&self) -> Duration {
        self.sw_end.saturating_sub(self.sw_start)
    }
}
