use crate::Millis;

/// Tells when a fixed-period task is due.
///
/// The first call to [Timer::is_due] is always due.
#[derive(Debug, Clone)]
pub struct Timer {
    refresh_time: Millis,
    last_time: Option<Millis>,
}

impl Timer {
    pub fn new(refresh_time: Millis) -> Self {
        Self {
            refresh_time,
            last_time: None,
        }
    }

    /// Returns `true` (and restarts the period) if at least `refresh_time`
    /// milliseconds passed since the last time it was due.
    pub fn is_due(&mut self, now: Millis) -> bool {
        let due = self
            .last_time
            .map(|last_time| now - last_time >= self.refresh_time)
            .unwrap_or(true);

        if due {
            self.last_time = Some(now);
        }

        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_once_per_period() {
        let mut timer = Timer::new(300.);

        assert!(timer.is_due(0.));
        assert!(!timer.is_due(16.));
        assert!(!timer.is_due(299.));
        assert!(timer.is_due(300.));
        assert!(!timer.is_due(310.));
        assert!(timer.is_due(700.));
    }
}
