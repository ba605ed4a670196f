use std::fmt;

use chrono::Utc;

/// Modified Julian Date of the Unix epoch.
const MJD_UNIX_EPOCH: f64 = 40587.0;
const SECONDS_PER_DAY: f64 = 86400.0;
/// TAI - UTC, in seconds.
const TAI_MINUS_UTC: f64 = 35.0;

/// Current TAI as MJD seconds.
pub fn tai_now() -> f64 {
    let unix = Utc::now().timestamp_micros() as f64 / 1e6;
    tai_from_unix(unix)
}

pub fn tai_from_unix(unix_seconds: f64) -> f64 {
    let utc_days = MJD_UNIX_EPOCH + unix_seconds / SECONDS_PER_DAY;
    (utc_days + TAI_MINUS_UTC / SECONDS_PER_DAY) * SECONDS_PER_DAY
}

/// A position, velocity, time triplet. Time is TAI in MJD seconds and
/// velocity is in position units per second. `NaN` marks an unknown
/// component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pvt {
    pub position: f64,
    pub velocity: f64,
    pub time: f64,
}

impl Pvt {
    pub fn new(position: f64, velocity: f64, time: f64) -> Self {
        Self {
            position,
            velocity,
            time,
        }
    }

    /// All components known and finite, and a positive time.
    pub fn is_valid(&self) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.time.is_finite()
            && self.time > 0.0
    }

    pub fn has_velocity(&self) -> bool {
        self.velocity != 0.0
    }

    /// Extrapolated position at TAI `t`, or `None` for an invalid triplet.
    pub fn position_at(&self, t: f64) -> Option<f64> {
        if !self.is_valid() {
            return None;
        }
        Some(self.position + self.velocity * (t - self.time))
    }

    pub fn current_position(&self) -> Option<f64> {
        self.position_at(tai_now())
    }
}

impl fmt::Display for Pvt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PVT({:?}, {:?}, {:?})",
            self.position, self.velocity, self.time
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity() {
        assert!(Pvt::new(25.0, 1.0, 100.0).is_valid());
        assert!(!Pvt::new(25.0, 1.0, 0.0).is_valid());
        assert!(!Pvt::new(f64::NAN, 1.0, 100.0).is_valid());
        assert!(!Pvt::new(25.0, f64::INFINITY, 100.0).is_valid());
    }

    #[test]
    fn test_position_at() {
        let pvt = Pvt::new(25.0, 0.5, 100.0);
        assert_eq!(pvt.position_at(110.0), Some(30.0));
        assert!(pvt.has_velocity());
        assert_eq!(Pvt::new(25.0, 0.5, -1.0).position_at(110.0), None);
        assert!(!Pvt::new(25.0, 0.0, 1.0).has_velocity());
    }

    #[test]
    fn test_tai_offset() {
        let expected = MJD_UNIX_EPOCH * SECONDS_PER_DAY + 35.0;
        assert!((tai_from_unix(0.0) - expected).abs() < 1e-3);
        assert!(tai_now() > tai_from_unix(0.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(Pvt::new(25.0, 0.0, 1000.5).to_string(), "PVT(25.0, 0.0, 1000.5)");
    }
}
