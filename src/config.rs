//! Caller-constructed configuration, in the teacher's `AppConfig`/
//! `RelayerConfig` style (§10.3): a plain struct with a `Default` impl, built
//! in code rather than parsed from a file.

use std::time::Duration;

use crate::calendar::default_calendars;
use crate::leaf::CalendarUrl;

/// Which calendars to talk to and how long to wait for them (§4.6, §6).
#[derive(Debug, Clone)]
pub struct CalendarConfig {
    pub calendars: Vec<CalendarUrl>,
    pub timeout: Duration,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendars: default_calendars(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_the_four_default_calendars() {
        let config = CalendarConfig::default();
        assert_eq!(config.calendars.len(), 4);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }
}
