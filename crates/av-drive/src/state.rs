//! Live vehicle telemetry shared between the drive worker and observers.

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, AtomicU64, Ordering};

use av_core::GeoPoint;

/// Road index published before the first segment starts.
pub const ROAD_INDEX_NONE: u32 = u32::MAX;

// ── DriveStatus ───────────────────────────────────────────────────────────────

/// Lifecycle of one drive.  `Completed` and `Cancelled` are terminal;
/// `reset` is the only way back to `Idle`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DriveStatus {
    Idle,
    Driving,
    Completed,
    Cancelled,
}

impl DriveStatus {
    fn as_u8(self) -> u8 {
        match self {
            DriveStatus::Idle => 0,
            DriveStatus::Driving => 1,
            DriveStatus::Completed => 2,
            DriveStatus::Cancelled => 3,
        }
    }

    fn from_u8(v: u8) -> DriveStatus {
        match v {
            1 => DriveStatus::Driving,
            2 => DriveStatus::Completed,
            3 => DriveStatus::Cancelled,
            _ => DriveStatus::Idle,
        }
    }
}

// ── VehicleState ──────────────────────────────────────────────────────────────

/// The live poll surface: position, speed, bearing, road index, and the
/// drive lifecycle flags.
///
/// One writer (the drive loop) and any number of polling readers, with no
/// locks: every field is individually atomic, so a read always returns a
/// previously-written value.  The tuple as a whole is *not* atomic — a
/// reader may pair the position from one tick with the bearing from the
/// next, which is acceptable for a display refreshed every frame.
///
/// Floating-point fields are stored as `f64` bit patterns in `AtomicU64`.
/// Relaxed ordering is sufficient: no reader infers cross-field invariants.
#[derive(Debug)]
pub struct VehicleState {
    lat_bits:     AtomicU64,
    lon_bits:     AtomicU64,
    speed_bits:   AtomicU64,
    bearing_bits: AtomicU64,
    road_index:   AtomicU32,
    active:       AtomicBool,
    status:       AtomicU8,
}

impl VehicleState {
    /// An idle vehicle at the coordinate origin.
    pub fn new() -> Self {
        Self {
            lat_bits:     AtomicU64::new(0.0f64.to_bits()),
            lon_bits:     AtomicU64::new(0.0f64.to_bits()),
            speed_bits:   AtomicU64::new(0.0f64.to_bits()),
            bearing_bits: AtomicU64::new(0.0f64.to_bits()),
            road_index:   AtomicU32::new(ROAD_INDEX_NONE),
            active:       AtomicBool::new(false),
            status:       AtomicU8::new(DriveStatus::Idle.as_u8()),
        }
    }

    // ── Reader surface ────────────────────────────────────────────────────

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(
            f64::from_bits(self.lat_bits.load(Ordering::Relaxed)),
            f64::from_bits(self.lon_bits.load(Ordering::Relaxed)),
        )
    }

    /// Current speed in the active route's rate unit.
    pub fn speed(&self) -> f64 {
        f64::from_bits(self.speed_bits.load(Ordering::Relaxed))
    }

    /// Current bearing in degrees.
    pub fn bearing_deg(&self) -> f64 {
        f64::from_bits(self.bearing_bits.load(Ordering::Relaxed))
    }

    /// Index of the segment being driven, `None` before the first one.
    pub fn road_index(&self) -> Option<usize> {
        match self.road_index.load(Ordering::Relaxed) {
            ROAD_INDEX_NONE => None,
            i => Some(i as usize),
        }
    }

    /// `true` while a drive loop is running.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    pub fn status(&self) -> DriveStatus {
        DriveStatus::from_u8(self.status.load(Ordering::Relaxed))
    }

    // ── Writer surface (drive loop only) ──────────────────────────────────

    pub(crate) fn set_position(&self, pos: GeoPoint) {
        self.lat_bits.store(pos.lat.to_bits(), Ordering::Relaxed);
        self.lon_bits.store(pos.lon.to_bits(), Ordering::Relaxed);
    }

    pub(crate) fn set_speed(&self, speed: f64) {
        self.speed_bits.store(speed.to_bits(), Ordering::Relaxed);
    }

    pub(crate) fn set_bearing(&self, bearing_deg: f64) {
        self.bearing_bits.store(bearing_deg.to_bits(), Ordering::Relaxed);
    }

    pub(crate) fn set_road_index(&self, index: u32) {
        self.road_index.store(index, Ordering::Relaxed);
    }

    /// Publish a lifecycle transition.  The active flag tracks `Driving`.
    pub(crate) fn set_status(&self, status: DriveStatus) {
        self.status.store(status.as_u8(), Ordering::Relaxed);
        self.active
            .store(status == DriveStatus::Driving, Ordering::Relaxed);
    }
}

impl Default for VehicleState {
    fn default() -> Self {
        Self::new()
    }
}
