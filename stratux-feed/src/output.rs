//! Event and summary printing.
//!
//! Events go to stdout, either as JSON lines or as one human-readable line
//! each. Logs go to stderr, so piping stdout stays clean.

use comfy_table::{Cell, Table};

use stratux_core::{FrameStats, StreamEvent, TrafficContact, TrafficFilter, TrafficTracker};

/// Print one event.
pub fn print_event(event: &StreamEvent, json: bool) {
    if json {
        match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::error!(event = event.name(), error = %e, "failed to serialize event"),
        }
    } else {
        println!("{}", describe(event));
    }
}

/// One-line summary of an event.
pub fn describe(event: &StreamEvent) -> String {
    match event {
        StreamEvent::SituationUpdated(s) => format!(
            "situation  pitch={:+.1} roll={:+.1} hdg={:.0} gs={:.0}kt alt={:.0}ft lat={:.4} lon={:.4}",
            s.ahrs_pitch,
            s.ahrs_roll,
            s.ahrs_mag_heading,
            s.gps_ground_speed,
            s.baro_pressure_altitude,
            s.gps_lat,
            s.gps_lon,
        ),
        StreamEvent::TrafficUpdated { id, contact } => format!(
            "traffic    {:06X} {} alt={:.0}ft {}",
            id,
            contact.tail,
            contact.alt,
            relative(contact)
        ),
        StreamEvent::StatusUpdated(v) => format!(
            "status     hub={} ahrs={} gps={} traffic={} weather={}",
            flag(v.hub),
            flag(v.attitude),
            flag(v.gps),
            flag(v.traffic),
            flag(v.weather),
        ),
        StreamEvent::WeatherUpdated(w) => format!(
            "weather    {} {} {}",
            w.product_type, w.location, w.data
        ),
    }
}

fn flag(on: bool) -> &'static str {
    if on {
        "up"
    } else {
        "down"
    }
}

fn relative(contact: &TrafficContact) -> String {
    if contact.has_relative_position {
        format!("brg={:.0} dist={:.1}nm", contact.bearing, contact.distance_nm)
    } else {
        "no relative position".into()
    }
}

/// Print frame counters.
pub fn print_stats(stats: &FrameStats) {
    println!();
    println!(
        "Frames: {} processed, {} malformed fragments, {} unknown tags, {} defaulted values, {} traffic dropped",
        stats.frames,
        stats.malformed_fragments,
        stats.unknown_tags,
        stats.coercion_failures,
        stats.dropped_traffic
    );
}

/// Print the contacts admitted by `filter`, nearest first.
pub fn print_traffic_table(tracker: &TrafficTracker, filter: TrafficFilter) {
    let mut contacts = tracker.visible(filter);
    if contacts.is_empty() {
        return;
    }

    // Correlated contacts first, by distance; the rest by ID.
    contacts.sort_by(|(a_id, a), (b_id, b)| {
        b.has_relative_position
            .cmp(&a.has_relative_position)
            .then(a.distance_nm.total_cmp(&b.distance_nm))
            .then(a_id.cmp(b_id))
    });

    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Reg", "Squawk", "Alt (ft)", "Speed", "Track", "Brg", "Dist (nm)", "Age (s)",
    ]);

    for (id, c) in contacts {
        let (brg, dist) = if c.has_relative_position {
            (format!("{:.0}", c.bearing), format!("{:.1}", c.distance_nm))
        } else {
            ("-".into(), "-".into())
        };
        table.add_row(vec![
            Cell::new(format!("{id:06X}")),
            Cell::new(&c.reg),
            Cell::new(format!("{:04}", c.squawk)),
            Cell::new(format!("{:.0}", c.alt)),
            Cell::new(format!("{:.0}", c.speed)),
            Cell::new(format!("{:.0}", c.track)),
            Cell::new(brg),
            Cell::new(dist),
            Cell::new(format!("{:.1}", c.age)),
        ]);
    }

    println!();
    println!("{table}");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
