//! Five-flag health vector for the hub streams.
//!
//! - `hub`, `attitude`: latched, false → true once, never back
//! - `gps`: live, mirrors the latest status frame
//! - `traffic`, `weather`: recomputed from the latest status counters
//!
//! Link loss is never inferred here; the transport has to report it.

use crate::types::{HubStatus, Situation, StatusVector, WeatherProduct};

#[derive(Debug, Clone, Default)]
pub struct StatusAggregator {
    vector: StatusVector,
}

impl StatusAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vector(&self) -> StatusVector {
        self.vector
    }

    /// Latch `attitude` once the AHRS reports a non-zero status.
    pub fn apply_situation(&mut self, situation: &Situation) -> StatusVector {
        if situation.ahrs_status > 0 {
            self.vector.attitude = true;
        }
        self.vector
    }

    pub fn apply_status(&mut self, status: &HubStatus) -> StatusVector {
        self.vector.hub = true;
        self.vector.gps = status.gps_connected;
        self.vector.traffic = status.is_tracking_traffic();
        self.vector.weather = status.has_weather();
        self.vector
    }

    /// A delivered weather product proves both the hub link and weather
    /// reception.
    pub fn apply_weather(&mut self, _weather: &WeatherProduct) -> StatusVector {
        self.vector.hub = true;
        self.vector.weather = true;
        self.vector
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
