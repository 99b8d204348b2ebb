//! End-to-end frame sequences through the coordinator.

use stratux_core::{Channel, StatusVector, StreamCoordinator, StreamEvent, TrafficFilter};

const SITUATION: &str = r#"{"GPSLastFixSinceMidnightUTC":43200.5,"GPSLatitude":40.0,"GPSLongitude":-75.0,"GPSFixQuality":1,"GPSSatellites":8,"GPSAltitudeMSL":1500,"AHRSPitch":1.5,"AHRSRoll":-3.25,"AHRSGyroHeading":370,"AHRSMagHeading":355,"AHRSStatus":7,"GPSTime":"2018-03-01T12:00:00Z"}"#;

fn traffic(id: i64, lat: f64, lon: f64, age: f64) -> String {
    format!(
        r#"{{"Icao_addr":{id},"Reg":"N{id}","Tail":"N{id}","Lat":{lat},"Lng":{lon},"Position_valid":true,"Alt":4500,"Age":{age}}}"#
    )
}

fn traffic_event(events: &[StreamEvent]) -> (u32, &stratux_core::TrafficContact) {
    match events {
        [StreamEvent::TrafficUpdated { id, contact }] => (*id, contact),
        other => panic!("expected one traffic event, got {other:?}"),
    }
}

#[test]
fn test_situation_then_traffic_correlates() {
    let mut sc = StreamCoordinator::default();

    let events = sc.process(Channel::Situation, SITUATION);
    match &events[0] {
        StreamEvent::SituationUpdated(s) => {
            assert_eq!(s.ahrs_gyro_heading, 10.0);
            assert_eq!(s.ahrs_mag_heading, 355.0);
            assert_eq!(s.gps_satellites, 8);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    let events = sc.process(Channel::Traffic, &traffic(101, 40.1, -75.0, 0.5));
    let (id, contact) = traffic_event(&events);
    assert_eq!(id, 101);
    assert!(contact.has_relative_position);
    assert!(contact.bearing.abs() < 1.0, "bearing {}", contact.bearing);
    assert!(
        (contact.distance_nm - 6.0).abs() < 0.5,
        "distance {}",
        contact.distance_nm
    );
    assert_eq!(contact.reg, "N101");
}

#[test]
fn test_traffic_first_then_situation() {
    let mut sc = StreamCoordinator::default();

    let events = sc.process(Channel::Traffic, &traffic(7, 40.1, -75.0, 0.5));
    assert!(!traffic_event(&events).1.has_relative_position);

    sc.process(Channel::Situation, SITUATION);

    let events = sc.process(Channel::Traffic, &traffic(7, 40.0, -74.9, 0.5));
    let (_, contact) = traffic_event(&events);
    assert!(contact.has_relative_position);
    assert!((contact.bearing - 90.0).abs() < 1.0);
    assert_eq!(sc.context().tracker.len(), 1);
}

#[test]
fn test_eviction_across_frames() {
    let mut sc = StreamCoordinator::default();
    sc.process(Channel::Traffic, &traffic(1, 40.1, -75.0, 61.0));
    sc.process(Channel::Traffic, &traffic(2, 40.1, -75.0, 59.0));
    sc.process(Channel::Traffic, &traffic(3, 40.1, -75.0, 1.0));

    let tracker = &sc.context().tracker;
    assert!(tracker.get(1).is_none());
    assert!(tracker.get(2).is_some());
    assert!(tracker.get(3).is_some());
}

#[test]
fn test_status_latching_over_stream() {
    let mut sc = StreamCoordinator::default();

    let status = |events: Vec<StreamEvent>| match events.last() {
        Some(StreamEvent::StatusUpdated(v)) => *v,
        other => panic!("expected status, got {other:?}"),
    };

    let v = status(sc.process(
        Channel::Status,
        r#"{"GPS_connected":true,"UAT_traffic_targets_tracking":1,"UAT_METAR_total":4}"#,
    ));
    assert_eq!(
        v,
        StatusVector {
            hub: true,
            attitude: false,
            gps: true,
            traffic: true,
            weather: true,
        }
    );

    let v = status(sc.process(Channel::Situation, SITUATION));
    assert!(v.attitude);
    assert!(v.gps);

    let v = status(sc.process(Channel::Status, r#"{"GPS_connected":false}"#));
    assert_eq!(
        v,
        StatusVector {
            hub: true,
            attitude: true,
            gps: false,
            traffic: false,
            weather: false,
        }
    );

    let v = status(sc.process(Channel::Weather, r#"{"Type":"METAR","Location":"KPHL"}"#));
    assert!(v.weather);
    assert!(!v.gps);
}

#[test]
fn test_garbage_never_panics() {
    let mut sc = StreamCoordinator::default();
    let junk = [
        "",
        "}",
        "{{{{",
        r#""":"""#,
        r#"{"Icao_addr":99999999999999999999}"#,
        r#"{"Lat":"#,
        "\u{0}\u{1}\u{2}",
        r#"{"AHRSGyroHeading":1e308}"#,
        r#"{"Age":-1,"Icao_addr":4}"#,
    ];
    for channel in stratux_core::CHANNELS {
        for frame in junk {
            sc.process(channel, frame);
        }
    }
    assert_eq!(sc.stats().frames, (junk.len() * 4) as u64);
    assert_eq!(sc.context().tracker.len(), 1);
}

#[test]
fn test_visible_traffic_filter() {
    let mut sc = StreamCoordinator::default();
    sc.process(Channel::Traffic, &traffic(1, 40.1, -75.0, 1.0));
    sc.process(Channel::Situation, SITUATION);
    sc.process(Channel::Traffic, &traffic(2, 40.1, -75.0, 1.0));

    let tracker = &sc.context().tracker;
    assert_eq!(tracker.visible(TrafficFilter::All).len(), 2);
    assert_eq!(tracker.visible(TrafficFilter::PositionedOnly).len(), 1);
}
