//! Atomic reassembly of a GPS fix from three independently arriving PGNs.
//!
//! Position (129025), course/speed (129026) and fix quality (129539) are
//! collected into a working buffer. The fix is published only once all three
//! parts of the same cluster are present. A part that arrives twice before the
//! cluster completes starts a new cluster holding only that part, so values
//! from two different clusters are never mixed.
use crate::fusion::store::GpsData;
use crate::protocol::messages::n2k::{GNSS_MODE_2D, GNSS_MODE_3D};

/// One of the three producers of a fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpsPart {
    Position,
    CourseSpeed,
    FixQuality,
}

impl GpsPart {
    const fn bit(self) -> u8 {
        match self {
            GpsPart::Position => 0b001,
            GpsPart::CourseSpeed => 0b010,
            GpsPart::FixQuality => 0b100,
        }
    }
}

//==================================================================================BUNDLE_STATE
/// Parts collected so far in the current cluster. The three bits give the
/// eight states from empty to complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BundleState(u8);

/// Result of feeding one part to a [`BundleState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Part added, cluster still incomplete.
    Collecting(BundleState),
    /// Part was already present: new cluster with only this part.
    Restart(BundleState),
    /// Last missing part arrived.
    Complete,
}

impl BundleState {
    pub const EMPTY: Self = Self(0);
    const ALL: u8 = 0b111;

    pub const fn contains(self, part: GpsPart) -> bool {
        self.0 & part.bit() != 0
    }

    /// Wire-level received mask (bit 0 position, bit 1 course/speed, bit 2 fix
    /// quality).
    pub const fn mask(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn next(self, part: GpsPart) -> Transition {
        if self.contains(part) {
            Transition::Restart(Self(part.bit()))
        } else if self.0 | part.bit() == Self::ALL {
            Transition::Complete
        } else {
            Transition::Collecting(Self(self.0 | part.bit()))
        }
    }
}

//==================================================================================ACCUMULATOR
/// What happened to the bundle after a part was accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BundleEvent {
    Pending,
    Restarted,
    /// Complete and plausible: ready to publish.
    Accepted(GpsFix),
    /// Complete but no usable fix; dropped.
    Discarded,
}

/// Fields of a fix gathered from one cluster.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GpsFix {
    pub latitude: i32,
    pub longitude: i32,
    pub cog: f32,
    pub sog: f32,
    pub mode: u8,
    pub hdop: f32,
    pub vdop: f32,
}

impl GpsFix {
    /// 2D or 3D fix, and not the null island placeholder.
    pub fn is_plausible(&self) -> bool {
        (self.mode == GNSS_MODE_2D || self.mode == GNSS_MODE_3D)
            && (self.latitude != 0 || self.longitude != 0)
    }

    /// Copy into the published reading, keeping fields the bundle does not own.
    pub fn apply_to(&self, gps: &mut GpsData) {
        gps.latitude = self.latitude;
        gps.longitude = self.longitude;
        gps.cog = self.cog;
        gps.sog = self.sog;
        gps.mode = self.mode;
        gps.hdop = self.hdop;
        gps.vdop = self.vdop;
    }
}

/// Working buffer of the cluster being assembled.
#[derive(Debug, Clone, Copy, Default)]
pub struct GpsBundle {
    fix: GpsFix,
    state: BundleState,
}

impl GpsBundle {
    pub const fn new() -> Self {
        Self {
            fix: GpsFix {
                latitude: 0,
                longitude: 0,
                cog: 0.0,
                sog: 0.0,
                mode: 0,
                hdop: 0.0,
                vdop: 0.0,
            },
            state: BundleState::EMPTY,
        }
    }

    pub fn state(&self) -> BundleState {
        self.state
    }

    /// Fully valid position update.
    pub fn position(&mut self, latitude: i32, longitude: i32) -> BundleEvent {
        self.fix.latitude = latitude;
        self.fix.longitude = longitude;
        self.advance(GpsPart::Position)
    }

    /// Fully valid course and speed over ground.
    pub fn course_speed(&mut self, cog: f32, sog: f32) -> BundleEvent {
        self.fix.cog = cog;
        self.fix.sog = sog;
        self.advance(GpsPart::CourseSpeed)
    }

    /// Fully valid fix quality.
    pub fn fix_quality(&mut self, mode: u8, hdop: f32, vdop: f32) -> BundleEvent {
        self.fix.mode = mode;
        self.fix.hdop = hdop;
        self.fix.vdop = vdop;
        self.advance(GpsPart::FixQuality)
    }

    fn advance(&mut self, part: GpsPart) -> BundleEvent {
        match self.state.next(part) {
            Transition::Collecting(state) => {
                self.state = state;
                BundleEvent::Pending
            }
            Transition::Restart(state) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("GPS bundle restarted by {}", part);
                self.state = state;
                BundleEvent::Restarted
            }
            Transition::Complete => {
                self.state = BundleState::EMPTY;
                if self.fix.is_plausible() {
                    BundleEvent::Accepted(self.fix)
                } else {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("GPS bundle discarded (mode {})", self.fix.mode);
                    BundleEvent::Discarded
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
