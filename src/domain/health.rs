//! Scrape health signal.

use std::fmt;

/// Outcome of one scrape as exposed through `locust_up`.
///
/// `Healthy` only when both reports were opened and fully read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    /// Gauge value: 1 = UP, 0 = DOWN.
    pub const fn as_gauge(self) -> f64 {
        match self {
            Self::Healthy => 1.0,
            Self::Unhealthy => 0.0,
        }
    }

    pub const fn is_healthy(self) -> bool {
        matches!(self, Self::Healthy)
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "up"),
            Self::Unhealthy => write!(f, "down"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gauge_values() {
        assert_eq!(HealthStatus::Healthy.as_gauge(), 1.0);
        assert_eq!(HealthStatus::Unhealthy.as_gauge(), 0.0);
        assert!(HealthStatus::Healthy.is_healthy());
        assert!(!HealthStatus::Unhealthy.is_healthy());
    }
}
