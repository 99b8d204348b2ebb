//! Per-channel dispatch from raw frames to typed events.
//!
//! `StreamCoordinator::process` runs one frame to completion: parse, decode,
//! apply to the context (own position, traffic registry, status vector), and
//! return the events for that frame. It takes `&mut self`, so frames are
//! strictly sequential and the context needs no locking. Channels may
//! interleave in any order; traffic seen before any GPS fix is stored without
//! relative geometry.

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::Config;
use crate::decode::{self, DecodeReport};
use crate::message::{parse_message, Message};
use crate::status::StatusAggregator;
use crate::tracker::TrafficTracker;
use crate::types::*;

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// All mutable state the coordinator works on.
#[derive(Debug, Clone, Default)]
pub struct StreamContext {
    /// Set by the first situation with a non-zero fix, never cleared.
    pub own_position: Option<OwnPosition>,
    pub tracker: TrafficTracker,
    pub status: StatusAggregator,
}

impl StreamContext {
    pub fn new(stale_timeout: f64) -> Self {
        StreamContext {
            own_position: None,
            tracker: TrafficTracker::new(stale_timeout),
            status: StatusAggregator::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.traffic.stale_timeout)
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Running totals of everything the lossy link threw at us.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FrameStats {
    pub frames: u64,
    pub malformed_fragments: u64,
    pub unknown_tags: u64,
    pub coercion_failures: u64,
    /// Traffic frames discarded for a missing or non-positive aircraft ID.
    pub dropped_traffic: u64,
}

impl FrameStats {
    fn record(&mut self, report: DecodeReport) {
        self.unknown_tags += report.unknown_tags as u64;
        self.coercion_failures += report.coercion_failures as u64;
    }
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct StreamCoordinator {
    ctx: StreamContext,
    stats: FrameStats,
}

impl StreamCoordinator {
    pub fn new(ctx: StreamContext) -> Self {
        StreamCoordinator {
            ctx,
            stats: FrameStats::default(),
        }
    }

    pub fn context(&self) -> &StreamContext {
        &self.ctx
    }

    pub fn into_context(self) -> StreamContext {
        self.ctx
    }

    pub fn own_position(&self) -> Option<OwnPosition> {
        self.ctx.own_position
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Process a frame from a channel given by name.
    pub fn process_named(&mut self, channel: &str, frame: &str) -> Result<Vec<StreamEvent>> {
        let channel: Channel = channel.parse()?;
        Ok(self.process(channel, frame))
    }

    /// Process one frame. Returns the events it produced, in emission order.
    pub fn process(&mut self, channel: Channel, frame: &str) -> Vec<StreamEvent> {
        self.stats.frames += 1;

        let msg = parse_message(frame);
        if msg.malformed > 0 {
            trace!(%channel, malformed = msg.malformed, "dropped malformed fragments");
            self.stats.malformed_fragments += msg.malformed as u64;
        }

        match channel {
            Channel::Situation => self.on_situation(&msg),
            Channel::Traffic => self.on_traffic(&msg),
            Channel::Status => self.on_status(&msg),
            Channel::Weather => self.on_weather(&msg),
        }
    }

    fn on_situation(&mut self, msg: &Message) -> Vec<StreamEvent> {
        let (situation, report) = decode::decode_situation(msg);
        self.stats.record(report);

        if let Some(pos) = situation.position() {
            if self.ctx.own_position.is_none() {
                debug!(lat = pos.lat, lon = pos.lon, "own position acquired");
            }
            self.ctx.own_position = Some(pos);
        }

        let vector = self.ctx.status.apply_situation(&situation);
        vec![
            StreamEvent::SituationUpdated(situation),
            StreamEvent::StatusUpdated(vector),
        ]
    }

    fn on_traffic(&mut self, msg: &Message) -> Vec<StreamEvent> {
        let (frame, report) = decode::decode_traffic(msg);
        self.stats.record(report);

        let Some(id) = frame.aircraft_id() else {
            debug!(icao_addr = frame.icao_addr, "traffic frame without aircraft id dropped");
            self.stats.dropped_traffic += 1;
            return Vec::new();
        };

        let own = self.ctx.own_position;
        let contact = self.ctx.tracker.upsert(id, frame.contact, own).clone();
        vec![StreamEvent::TrafficUpdated { id, contact }]
    }

    fn on_status(&mut self, msg: &Message) -> Vec<StreamEvent> {
        let (status, report) = decode::decode_status(msg);
        self.stats.record(report);

        let vector = self.ctx.status.apply_status(&status);
        vec![StreamEvent::StatusUpdated(vector)]
    }

    fn on_weather(&mut self, msg: &Message) -> Vec<StreamEvent> {
        let (weather, report) = decode::decode_weather(msg);
        self.stats.record(report);

        let vector = self.ctx.status.apply_weather(&weather);
        vec![
            StreamEvent::WeatherUpdated(weather),
            StreamEvent::StatusUpdated(vector),
        ]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const OWN_SITUATION: &str = r#"{"GPSLatitude":40.0,"GPSLongitude":-75.0,"AHRSStatus":1}"#;

    fn coordinator() -> StreamCoordinator {
        StreamCoordinator::default()
    }

    #[test]
    fn test_situation_sets_own_position() {
        let mut sc = coordinator();
        let events = sc.process(Channel::Situation, OWN_SITUATION);

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], StreamEvent::SituationUpdated(_)));
        assert!(matches!(
            events[1],
            StreamEvent::StatusUpdated(StatusVector { attitude: true, .. })
        ));
        assert_eq!(
            sc.own_position(),
            Some(OwnPosition {
                lat: 40.0,
                lon: -75.0
            })
        );
    }

    #[test]
    fn test_zero_fix_does_not_clear_own_position() {
        let mut sc = coordinator();
        sc.process(Channel::Situation, OWN_SITUATION);
        sc.process(Channel::Situation, r#"{"GPSLatitude":0,"GPSLongitude":0}"#);
        assert!(sc.own_position().is_some());

        sc.process(Channel::Situation, r#"{"GPSLatitude":41.0,"GPSLongitude":-74.0}"#);
        assert_eq!(sc.own_position().map(|p| p.lat), Some(41.0));
    }

    #[test]
    fn test_traffic_without_id_dropped() {
        let mut sc = coordinator();
        assert!(sc
            .process(Channel::Traffic, r#"{"Lat":40.1,"Lng":-75.0}"#)
            .is_empty());
        assert!(sc.process(Channel::Traffic, r#"{"Icao_addr":0}"#).is_empty());
        assert!(sc.process(Channel::Traffic, r#"{"Icao_addr":-3}"#).is_empty());
        assert!(sc.context().tracker.is_empty());
        assert_eq!(sc.stats().dropped_traffic, 3);
    }

    #[test]
    fn test_dropped_traffic_does_not_evict() {
        let mut sc = coordinator();
        sc.process(Channel::Traffic, r#"{"Icao_addr":5,"Age":90}"#);
        sc.process(Channel::Traffic, r#"{"Age":1}"#);
        assert!(sc.context().tracker.get(5).is_some());
    }

    #[test]
    fn test_traffic_before_situation_has_no_relative_position() {
        let mut sc = coordinator();
        let events = sc.process(
            Channel::Traffic,
            r#"{"Icao_addr":101,"Lat":40.1,"Lng":-75.0,"Position_valid":true,"Age":1}"#,
        );
        match &events[..] {
            [StreamEvent::TrafficUpdated { id, contact }] => {
                assert_eq!(*id, 101);
                assert!(!contact.has_relative_position);
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn test_status_frame() {
        let mut sc = coordinator();
        let events = sc.process(
            Channel::Status,
            r#"{"GPS_connected":true,"ES_traffic_targets_tracking":3,"UAT_TAF_total":0}"#,
        );
        assert_eq!(
            events,
            vec![StreamEvent::StatusUpdated(StatusVector {
                hub: true,
                attitude: false,
                gps: true,
                traffic: true,
                weather: false,
            })]
        );
    }

    #[test]
    fn test_weather_frame_emits_product_then_status() {
        let mut sc = coordinator();
        let events = sc.process(
            Channel::Weather,
            r#"{"Type":"TAF","Location":"KABE","Data":"TAF KABE 011130Z"}"#,
        );
        assert_eq!(events.len(), 2);
        match &events[0] {
            StreamEvent::WeatherUpdated(w) => {
                assert_eq!(w.product_type, "TAF");
                assert_eq!(w.location, "KABE");
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(matches!(
            events[1],
            StreamEvent::StatusUpdated(StatusVector {
                hub: true,
                weather: true,
                ..
            })
        ));
    }

    #[test]
    fn test_process_named() {
        let mut sc = coordinator();
        assert_eq!(sc.process_named("status", "{}").unwrap().len(), 1);
        assert!(matches!(
            sc.process_named("uplink", "{}"),
            Err(StratuxError::UnknownChannel(_))
        ));
        assert_eq!(sc.stats().frames, 1);
    }

    #[test]
    fn test_stats_accumulate() {
        let mut sc = coordinator();
        sc.process(Channel::Situation, r#"{"AHRSPitch":x,"Mystery":1,junk}"#);
        let stats = sc.stats();
        assert_eq!(stats.frames, 1);
        assert_eq!(stats.malformed_fragments, 1);
        assert_eq!(stats.unknown_tags, 1);
        assert_eq!(stats.coercion_failures, 1);
    }

    #[test]
    fn test_context_from_config() {
        let mut config = Config::default();
        config.traffic.stale_timeout = 15.0;
        let ctx = StreamContext::from_config(&config);
        assert_eq!(ctx.tracker.stale_timeout(), 15.0);
        assert!(ctx.own_position.is_none());

        let sc = StreamCoordinator::new(ctx);
        assert_eq!(sc.into_context().tracker.stale_timeout(), 15.0);
    }
}
