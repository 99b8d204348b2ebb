//! Shared types, error enum, and decoded stream types for stratux-core.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;

/// All errors produced by stratux-core.
///
/// Frame processing itself never fails; these only come out of channel-name
/// lookup and configuration I/O.
#[derive(Debug, Error)]
pub enum StratuxError {
    #[error("unknown channel: {0}")]
    UnknownChannel(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, StratuxError>;

// ---------------------------------------------------------------------------
// Channels
// ---------------------------------------------------------------------------

/// One of the four independent text streams published by the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Situation,
    Traffic,
    Status,
    Weather,
}

/// Every channel, in the order the hub streams are usually opened.
pub const CHANNELS: [Channel; 4] = [
    Channel::Situation,
    Channel::Traffic,
    Channel::Status,
    Channel::Weather,
];

impl Channel {
    /// Channel name as used in hub URLs and capture files.
    pub fn name(&self) -> &'static str {
        match self {
            Channel::Situation => "situation",
            Channel::Traffic => "traffic",
            Channel::Status => "status",
            Channel::Weather => "weather",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Channel {
    type Err = StratuxError;

    fn from_str(s: &str) -> Result<Self> {
        CHANNELS
            .iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| StratuxError::UnknownChannel(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Wire timestamp. Anything that fails to parse becomes the null sentinel
/// 2000-01-01T00:00:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Timestamp(pub NaiveDateTime);

impl Timestamp {
    pub fn null() -> Self {
        let null = NaiveDate::from_ymd_opt(2000, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
        Timestamp(null.unwrap_or_default())
    }

    /// Parse RFC 3339 (`2018-03-01T12:00:00.5Z`) or a bare ISO date-time
    /// without offset. Offsets are folded into UTC.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.naive_utc())
            .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
            .ok()
            .map(Timestamp)
    }

    pub fn parse_or_null(text: &str) -> Self {
        Self::parse(text).unwrap_or_else(Self::null)
    }

    pub fn is_null(&self) -> bool {
        *self == Self::null()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Timestamp::null()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S%.3f"))
    }
}

// ---------------------------------------------------------------------------
// Own-ship position
// ---------------------------------------------------------------------------

/// Local aircraft GPS position, the anchor for relative traffic geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OwnPosition {
    pub lat: f64,
    pub lon: f64,
}

// ---------------------------------------------------------------------------
// Situation
// ---------------------------------------------------------------------------

/// One complete attitude/GPS/baro snapshot from the situation stream.
///
/// Replaced wholesale on every update, never merged with the previous one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Situation {
    // GPS
    pub gps_last_fix_since_midnight_utc: f64,
    pub gps_lat: f64,
    pub gps_lon: f64,
    pub gps_fix_quality: i32,
    pub gps_height_above_ellipsoid: f64,
    pub gps_geoid_sep: f64,
    pub gps_satellites: i32,
    pub gps_satellites_tracked: i32,
    pub gps_satellites_seen: i32,
    pub gps_horizontal_accuracy: f64,
    pub gps_nacp: i32,
    pub gps_altitude_msl: f64,
    pub gps_vertical_accuracy: f64,
    pub gps_vertical_speed: f64,
    pub gps_last_fix_local_time: Timestamp,
    pub gps_true_course: f64,
    pub gps_turn_rate: f64,
    pub gps_ground_speed: f64,
    pub gps_last_ground_track_time: Timestamp,
    pub gps_time: Timestamp,
    pub gps_last_gps_time_stratux_time: Timestamp,
    pub gps_last_valid_nmea_message_time: Timestamp,
    pub gps_last_valid_nmea_message: String,
    pub gps_position_sample_rate: i32,

    // Baro
    pub baro_temperature: f64,
    pub baro_pressure_altitude: f64,
    pub baro_vertical_speed: f64,
    pub baro_last_measurement_time: Timestamp,

    // AHRS
    pub ahrs_pitch: f64,
    pub ahrs_roll: f64,
    pub ahrs_gyro_heading: f64,
    pub ahrs_mag_heading: f64,
    pub ahrs_slip_skid: f64,
    pub ahrs_turn_rate: f64,
    pub ahrs_g_load: f64,
    pub ahrs_g_load_min: f64,
    pub ahrs_g_load_max: f64,
    pub ahrs_last_attitude_time: Timestamp,
    pub ahrs_status: i32,
}

impl Situation {
    /// GPS position, if both coordinates are non-zero.
    pub fn position(&self) -> Option<OwnPosition> {
        if self.gps_lat != 0.0 && self.gps_lon != 0.0 {
            Some(OwnPosition {
                lat: self.gps_lat,
                lon: self.gps_lon,
            })
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Traffic
// ---------------------------------------------------------------------------

/// Default squawk for a contact that never reported one (VFR).
pub const DEFAULT_SQUAWK: i32 = 1200;

/// Default age, far past the staleness threshold.
pub const DEFAULT_TRAFFIC_AGE: f64 = 3600.0;

/// Most recent decoded state of one aircraft.
///
/// The aircraft ID is not stored here; it is the registry key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficContact {
    pub reg: String,
    pub tail: String,
    pub squawk: i32,
    pub signal_level: f64,
    pub on_ground: bool,
    pub lat: f64,
    pub lon: f64,
    pub position_valid: bool,
    pub alt: f64,
    pub track: f64,
    pub speed: f64,
    pub vertical_speed: f64,
    pub last_seen: Timestamp,
    pub timestamp: Timestamp,
    pub last_source: i32,
    pub bearing: f64,
    pub distance_nm: f64,
    pub age: f64,
    pub has_relative_position: bool,
}

impl Default for TrafficContact {
    fn default() -> Self {
        TrafficContact {
            reg: "N/A".into(),
            tail: "N/A".into(),
            squawk: DEFAULT_SQUAWK,
            signal_level: 0.0,
            on_ground: false,
            lat: 0.0,
            lon: 0.0,
            position_valid: false,
            alt: 0.0,
            track: 0.0,
            speed: 0.0,
            vertical_speed: 0.0,
            last_seen: Timestamp::null(),
            timestamp: Timestamp::null(),
            last_source: 0,
            bearing: 0.0,
            distance_nm: 0.0,
            age: DEFAULT_TRAFFIC_AGE,
            has_relative_position: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Hub status
// ---------------------------------------------------------------------------

/// Receiver counters from the status stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HubStatus {
    pub uat_traffic_tracking: i32,
    pub es_traffic_tracking: i32,
    pub gps_satellites_locked: i32,
    pub gps_connected: bool,
    pub uat_metar_total: i32,
    pub uat_taf_total: i32,
    pub uat_nexrad_total: i32,
    pub uat_sigmet_total: i32,
    pub uat_pirep_total: i32,
}

impl HubStatus {
    /// True if either receiver is tracking at least one target.
    pub fn is_tracking_traffic(&self) -> bool {
        self.uat_traffic_tracking > 0 || self.es_traffic_tracking > 0
    }

    /// True if any UAT weather product has been received.
    pub fn has_weather(&self) -> bool {
        self.uat_metar_total > 0
            || self.uat_taf_total > 0
            || self.uat_nexrad_total > 0
            || self.uat_sigmet_total > 0
            || self.uat_pirep_total > 0
    }
}

/// Combined health of the hub streams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusVector {
    pub hub: bool,
    pub attitude: bool,
    pub gps: bool,
    pub traffic: bool,
    pub weather: bool,
}

impl StatusVector {
    /// `[hub, attitude, gps, traffic, weather]`
    pub fn as_array(&self) -> [bool; 5] {
        [self.hub, self.attitude, self.gps, self.traffic, self.weather]
    }
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

/// One FIS-B weather product.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeatherProduct {
    pub product_type: String,
    pub location: String,
    pub time: Timestamp,
    pub data: String,
    /// Whole inbound frame, kept for diagnostics only.
    pub raw_message: String,
}

// ---------------------------------------------------------------------------
// Outbound events
// ---------------------------------------------------------------------------

/// Events emitted at the end of each processed frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StreamEvent {
    SituationUpdated(Situation),
    TrafficUpdated { id: u32, contact: TrafficContact },
    StatusUpdated(StatusVector),
    WeatherUpdated(WeatherProduct),
}

impl StreamEvent {
    pub fn name(&self) -> &'static str {
        match self {
            StreamEvent::SituationUpdated(_) => "situation_updated",
            StreamEvent::TrafficUpdated { .. } => "traffic_updated",
            StreamEvent::StatusUpdated(_) => "status_updated",
            StreamEvent::WeatherUpdated(_) => "weather_updated",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
