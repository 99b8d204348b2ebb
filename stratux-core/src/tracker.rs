//! Registry of traffic contacts keyed by aircraft ID.
//!
//! Pure logic, no I/O. Every upsert first evicts contacts whose reported age
//! is past the stale timeout, then stamps the incoming contact with bearing
//! and distance from own ship (when both positions are known) and stores it,
//! replacing any previous report for the same aircraft.

use std::collections::HashMap;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::geo;
use crate::types::{OwnPosition, StratuxError, TrafficContact};

/// Contacts older than this many seconds are dropped on the next upsert.
pub const STALE_TIMEOUT: f64 = 60.0;

// ---------------------------------------------------------------------------
// Display filter
// ---------------------------------------------------------------------------

/// Which contacts a display wants to see.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficFilter {
    /// Every tracked contact.
    #[default]
    All,
    /// Only contacts with bearing/distance relative to own ship.
    PositionedOnly,
    /// Nothing.
    Off,
}

impl TrafficFilter {
    pub fn admits(&self, contact: &TrafficContact) -> bool {
        match self {
            TrafficFilter::All => true,
            TrafficFilter::PositionedOnly => contact.has_relative_position,
            TrafficFilter::Off => false,
        }
    }
}

impl FromStr for TrafficFilter {
    type Err = StratuxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(TrafficFilter::All),
            "positioned" | "positioned_only" => Ok(TrafficFilter::PositionedOnly),
            "off" | "none" => Ok(TrafficFilter::Off),
            other => Err(StratuxError::Config(format!("unknown traffic filter: {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// Time-windowed set of traffic contacts.
#[derive(Debug, Clone)]
pub struct TrafficTracker {
    contacts: HashMap<u32, TrafficContact>,
    stale_timeout: f64,

    // Counters
    pub upserts: u64,
    pub evicted: u64,
}

impl TrafficTracker {
    pub fn new(stale_timeout: f64) -> Self {
        TrafficTracker {
            contacts: HashMap::new(),
            stale_timeout,
            upserts: 0,
            evicted: 0,
        }
    }

    pub fn stale_timeout(&self) -> f64 {
        self.stale_timeout
    }

    /// Evict stale contacts, then store `contact` under `id`.
    ///
    /// Relative geometry is computed only when `own` is known and the
    /// contact reports a valid position; otherwise the wire bearing and
    /// distance are kept and `has_relative_position` is false.
    pub fn upsert(
        &mut self,
        id: u32,
        mut contact: TrafficContact,
        own: Option<OwnPosition>,
    ) -> &TrafficContact {
        let removed = self.evict_stale();
        if removed > 0 {
            debug!(removed, remaining = self.contacts.len(), "evicted stale traffic");
        }

        match own {
            Some(own) if contact.position_valid => {
                let bd = geo::bearing_distance(own.lat, own.lon, contact.lat, contact.lon);
                contact.bearing = bd.bearing_deg;
                contact.distance_nm = bd.distance_nm;
                contact.has_relative_position = true;
            }
            _ => contact.has_relative_position = false,
        }

        self.upserts += 1;
        let slot = self.contacts.entry(id).or_default();
        *slot = contact;
        slot
    }

    /// Drop every contact whose age exceeds the stale timeout. One pass.
    fn evict_stale(&mut self) -> usize {
        let before = self.contacts.len();
        let timeout = self.stale_timeout;
        self.contacts.retain(|_, c| c.age <= timeout);
        let removed = before - self.contacts.len();
        self.evicted += removed as u64;
        removed
    }

    pub fn get(&self, id: u32) -> Option<&TrafficContact> {
        self.contacts.get(&id)
    }

    /// Current contacts, in no particular order.
    pub fn snapshot(&self) -> Vec<(u32, &TrafficContact)> {
        self.contacts.iter().map(|(id, c)| (*id, c)).collect()
    }

    /// Contacts admitted by `filter`, in no particular order.
    pub fn visible(&self, filter: TrafficFilter) -> Vec<(u32, &TrafficContact)> {
        self.contacts
            .iter()
            .filter(|(_, c)| filter.admits(c))
            .map(|(id, c)| (*id, c))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}

impl Default for TrafficTracker {
    fn default() -> Self {
        TrafficTracker::new(STALE_TIMEOUT)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
