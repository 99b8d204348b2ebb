//! Decode parsed hub messages into typed structures.
//!
//! Each message kind has a static tag table mapping wire tags to setters:
//! - Situation: AHRS attitude, GPS fix, and baro data
//! - Traffic:   one aircraft report (aircraft ID kept beside the contact)
//! - Status:    receiver and weather counters
//! - Weather:   one FIS-B product
//!
//! Decoding starts from the kind's default value and never fails. Unknown
//! tags are ignored, unparseable numbers become 0, booleans are true only for
//! the literal `true`, and bad timestamps become the null sentinel. Duplicate
//! tags overwrite, so the last occurrence wins.

use tracing::trace;

use crate::geo::METERS_TO_NM;
use crate::message::Message;
use crate::types::*;

/// Field setter for one wire tag. Returns false if the value was defaulted.
pub type Setter<T> = fn(&mut T, &str) -> bool;

/// What went wrong while decoding, for statistics only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeReport {
    pub unknown_tags: usize,
    pub coercion_failures: usize,
}

// ---------------------------------------------------------------------------
// Value coercion
// ---------------------------------------------------------------------------

fn real(field: &mut f64, value: &str) -> bool {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => {
            *field = v;
            true
        }
        _ => {
            *field = 0.0;
            false
        }
    }
}

fn int(field: &mut i32, value: &str) -> bool {
    match value.parse::<i32>() {
        Ok(v) => {
            *field = v;
            true
        }
        Err(_) => {
            *field = 0;
            false
        }
    }
}

fn flag(field: &mut bool, value: &str) -> bool {
    *field = value == "true";
    *field || value == "false"
}

fn text(field: &mut String, value: &str) -> bool {
    value.clone_into(field);
    true
}

fn time(field: &mut Timestamp, value: &str) -> bool {
    match Timestamp::parse(value) {
        Some(ts) => {
            *field = ts;
            true
        }
        None => {
            *field = Timestamp::null();
            false
        }
    }
}

/// Apply every field of `msg` to `target` through `table`.
fn apply<T>(target: &mut T, table: &[(&str, Setter<T>)], msg: &Message) -> DecodeReport {
    let mut report = DecodeReport::default();

    for &(tag, value) in &msg.fields {
        match table.iter().find(|(known, _)| *known == tag) {
            Some((_, set)) => {
                if !set(target, value) {
                    trace!(tag, value, "value defaulted");
                    report.coercion_failures += 1;
                }
            }
            None => {
                trace!(tag, "unknown tag ignored");
                report.unknown_tags += 1;
            }
        }
    }

    report
}

// ---------------------------------------------------------------------------
// Situation
// ---------------------------------------------------------------------------

/// Situation stream tags.
pub const SITUATION_TAGS: &[(&str, Setter<Situation>)] = &[
    ("GPSLastFixSinceMidnightUTC", |s, v| real(&mut s.gps_last_fix_since_midnight_utc, v)),
    ("GPSLatitude", |s, v| real(&mut s.gps_lat, v)),
    ("GPSLongitude", |s, v| real(&mut s.gps_lon, v)),
    ("GPSFixQuality", |s, v| int(&mut s.gps_fix_quality, v)),
    ("GPSHeightAboveEllipsoid", |s, v| real(&mut s.gps_height_above_ellipsoid, v)),
    ("GPSGeoidSep", |s, v| real(&mut s.gps_geoid_sep, v)),
    ("GPSSatellites", |s, v| int(&mut s.gps_satellites, v)),
    ("GPSSatellitesTracked", |s, v| int(&mut s.gps_satellites_tracked, v)),
    ("GPSSatellitesSeen", |s, v| int(&mut s.gps_satellites_seen, v)),
    ("GPSHorizontalAccuracy", |s, v| real(&mut s.gps_horizontal_accuracy, v)),
    ("GPSNACp", |s, v| int(&mut s.gps_nacp, v)),
    ("GPSAltitudeMSL", |s, v| real(&mut s.gps_altitude_msl, v)),
    ("GPSVerticalAccuracy", |s, v| real(&mut s.gps_vertical_accuracy, v)),
    ("GPSVerticalSpeed", |s, v| real(&mut s.gps_vertical_speed, v)),
    ("GPSLastFixLocalTime", |s, v| time(&mut s.gps_last_fix_local_time, v)),
    ("GPSTrueCourse", |s, v| real(&mut s.gps_true_course, v)),
    ("GPSTurnRate", |s, v| real(&mut s.gps_turn_rate, v)),
    ("GPSGroundSpeed", |s, v| real(&mut s.gps_ground_speed, v)),
    ("GPSLastGroundTrackTime", |s, v| time(&mut s.gps_last_ground_track_time, v)),
    ("GPSTime", |s, v| time(&mut s.gps_time, v)),
    ("GPSLastGPSTimeStratuxTime", |s, v| time(&mut s.gps_last_gps_time_stratux_time, v)),
    ("GPSLastValidNMEAMessageTime", |s, v| time(&mut s.gps_last_valid_nmea_message_time, v)),
    ("GPSLastValidNMEAMessage", |s, v| text(&mut s.gps_last_valid_nmea_message, v)),
    ("GPSPositionSampleRate", |s, v| int(&mut s.gps_position_sample_rate, v)),
    ("BaroTemperature", |s, v| real(&mut s.baro_temperature, v)),
    ("BaroPressureAltitude", |s, v| real(&mut s.baro_pressure_altitude, v)),
    ("BaroVerticalSpeed", |s, v| real(&mut s.baro_vertical_speed, v)),
    ("BaroLastMeasurementTime", |s, v| time(&mut s.baro_last_measurement_time, v)),
    ("AHRSPitch", |s, v| real(&mut s.ahrs_pitch, v)),
    ("AHRSRoll", |s, v| real(&mut s.ahrs_roll, v)),
    ("AHRSGyroHeading", |s, v| real(&mut s.ahrs_gyro_heading, v)),
    ("AHRSMagHeading", |s, v| real(&mut s.ahrs_mag_heading, v)),
    ("AHRSSlipSkid", |s, v| real(&mut s.ahrs_slip_skid, v)),
    ("AHRSTurnRate", |s, v| real(&mut s.ahrs_turn_rate, v)),
    ("AHRSGLoad", |s, v| real(&mut s.ahrs_g_load, v)),
    ("AHRSGLoadMin", |s, v| real(&mut s.ahrs_g_load_min, v)),
    ("AHRSGLoadMax", |s, v| real(&mut s.ahrs_g_load_max, v)),
    ("AHRSLastAttitudeTime", |s, v| time(&mut s.ahrs_last_attitude_time, v)),
    ("AHRSStatus", |s, v| int(&mut s.ahrs_status, v)),
];

/// Reduce a heading by whole turns while it is above 360.
///
/// Only the upper bound is handled: negative headings pass through. Exact
/// multiples of 360 above one turn come out as 360. Computed in one step
/// rather than turn by turn, so results can differ from repeated subtraction
/// in the last bits, and huge inputs lose all precision (1e20 gives 0).
pub fn normalize_heading(deg: f64) -> f64 {
    if deg > 360.0 {
        deg - 360.0 * ((deg / 360.0).ceil() - 1.0)
    } else {
        deg
    }
}

pub fn decode_situation(msg: &Message) -> (Situation, DecodeReport) {
    let mut situation = Situation::default();
    let report = apply(&mut situation, SITUATION_TAGS, msg);

    situation.ahrs_gyro_heading = normalize_heading(situation.ahrs_gyro_heading);
    situation.ahrs_mag_heading = normalize_heading(situation.ahrs_mag_heading);

    (situation, report)
}

// ---------------------------------------------------------------------------
// Traffic
// ---------------------------------------------------------------------------

/// A decoded traffic frame: the contact plus the aircraft ID it belongs to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrafficFrame {
    /// Raw `Icao_addr` value; 0 if absent.
    pub icao_addr: i64,
    pub contact: TrafficContact,
}

impl TrafficFrame {
    /// Registry key, if the frame carried a usable (positive) aircraft ID.
    pub fn aircraft_id(&self) -> Option<u32> {
        if self.icao_addr > 0 {
            u32::try_from(self.icao_addr).ok()
        } else {
            None
        }
    }
}

/// Traffic stream tags.
pub const TRAFFIC_TAGS: &[(&str, Setter<TrafficFrame>)] = &[
    ("Icao_addr", |t, v| match v.parse::<i64>() {
        Ok(id) => {
            t.icao_addr = id;
            true
        }
        Err(_) => {
            t.icao_addr = 0;
            false
        }
    }),
    ("Reg", |t, v| text(&mut t.contact.reg, v)),
    ("Tail", |t, v| text(&mut t.contact.tail, v)),
    ("SignalLevel", |t, v| real(&mut t.contact.signal_level, v)),
    ("Squawk", |t, v| int(&mut t.contact.squawk, v)),
    ("OnGround", |t, v| flag(&mut t.contact.on_ground, v)),
    ("Lat", |t, v| real(&mut t.contact.lat, v)),
    ("Lng", |t, v| real(&mut t.contact.lon, v)),
    ("Position_valid", |t, v| flag(&mut t.contact.position_valid, v)),
    ("Alt", |t, v| real(&mut t.contact.alt, v)),
    ("Track", |t, v| real(&mut t.contact.track, v)),
    ("Speed", |t, v| real(&mut t.contact.speed, v)),
    ("Vvel", |t, v| real(&mut t.contact.vertical_speed, v)),
    ("Last_seen", |t, v| time(&mut t.contact.last_seen, v)),
    ("Last_source", |t, v| int(&mut t.contact.last_source, v)),
    ("Timestamp", |t, v| time(&mut t.contact.timestamp, v)),
    ("Bearing", |t, v| real(&mut t.contact.bearing, v)),
    // Sent in meters.
    ("Distance", |t, v| {
        let ok = real(&mut t.contact.distance_nm, v);
        t.contact.distance_nm *= METERS_TO_NM;
        ok
    }),
    ("Age", |t, v| real(&mut t.contact.age, v)),
];

pub fn decode_traffic(msg: &Message) -> (TrafficFrame, DecodeReport) {
    let mut frame = TrafficFrame::default();
    let report = apply(&mut frame, TRAFFIC_TAGS, msg);
    (frame, report)
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Status stream tags.
pub const STATUS_TAGS: &[(&str, Setter<HubStatus>)] = &[
    ("UAT_traffic_targets_tracking", |s, v| int(&mut s.uat_traffic_tracking, v)),
    ("ES_traffic_targets_tracking", |s, v| int(&mut s.es_traffic_tracking, v)),
    ("GPS_satellites_locked", |s, v| int(&mut s.gps_satellites_locked, v)),
    ("GPS_connected", |s, v| flag(&mut s.gps_connected, v)),
    ("UAT_METAR_total", |s, v| int(&mut s.uat_metar_total, v)),
    ("UAT_TAF_total", |s, v| int(&mut s.uat_taf_total, v)),
    ("UAT_NEXRAD_total", |s, v| int(&mut s.uat_nexrad_total, v)),
    ("UAT_SIGMET_total", |s, v| int(&mut s.uat_sigmet_total, v)),
    ("UAT_PIREP_total", |s, v| int(&mut s.uat_pirep_total, v)),
];

pub fn decode_status(msg: &Message) -> (HubStatus, DecodeReport) {
    let mut status = HubStatus::default();
    let report = apply(&mut status, STATUS_TAGS, msg);
    (status, report)
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

/// Weather stream tags.
pub const WEATHER_TAGS: &[(&str, Setter<WeatherProduct>)] = &[
    ("Type", |w, v| text(&mut w.product_type, v)),
    ("Location", |w, v| text(&mut w.location, v)),
    ("Time", |w, v| time(&mut w.time, v)),
    ("Data", |w, v| text(&mut w.data, v)),
];

pub fn decode_weather(msg: &Message) -> (WeatherProduct, DecodeReport) {
    let mut weather = WeatherProduct {
        raw_message: msg.raw.to_string(),
        ..WeatherProduct::default()
    };
    let report = apply(&mut weather, WEATHER_TAGS, msg);
    (weather, report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
