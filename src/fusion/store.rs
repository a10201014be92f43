//! Latest decoded value of every sensor class.
//!
//! Each reading carries a "new data" flag raised by the dispatcher when a
//! usable update lands and cleared by the consumer on read, so control code can
//! tell a fresh sample from a stale one without timestamps.

/// A value plus its consume-once freshness flag.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reading<T> {
    value: T,
    new_data: bool,
}

/// What a consumer gets back from a read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<T> {
    pub value: T,
    /// Whether an update arrived since the previous read.
    pub new_data: bool,
}

impl<T: Copy> Reading<T> {
    pub const fn new(value: T) -> Self {
        Self {
            value,
            new_data: false,
        }
    }

    /// In-place access for the dispatcher. Does not touch the flag.
    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    /// Mark the current value as fresh.
    pub fn publish(&mut self) {
        self.new_data = true;
    }

    /// Replace the value and mark it fresh.
    pub fn replace(&mut self, value: T) {
        self.value = value;
        self.new_data = true;
    }

    /// Latest value and its flag; the flag is cleared.
    pub fn take(&mut self) -> Sample<T> {
        let sample = self.peek();
        self.new_data = false;
        sample
    }

    /// Latest value and its flag, leaving the flag untouched.
    pub fn peek(&self) -> Sample<T> {
        Sample {
            value: self.value,
            new_data: self.new_data,
        }
    }
}

//==================================================================================SENSOR_DATA
/// Battery bank (PGN 127508).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PowerData {
    pub voltage: f32,
    pub current: f32,
    pub temperature: f32,
}

/// Apparent wind (PGN 130306).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindData {
    pub speed: f32,
    pub direction: f32,
}

/// Air conditions from the weather station (PGN 130311).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AirData {
    pub temperature: f32,
    pub humidity: f32,
    pub pressure: u16,
}

/// Depth sounder: speed through water, depth, water temperature.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WaterData {
    pub speed: f32,
    pub depth: f32,
    pub temperature: f32,
}

/// Propulsion feedback from the motor controller heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThrottleData {
    pub rpm: u16,
    pub drive_enabled: bool,
}

/// Published GPS fix. Position in 1e-7 degrees, angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GpsData {
    pub latitude: i32,
    pub longitude: i32,
    pub cog: f32,
    pub sog: f32,
    pub mode: u8,
    pub hdop: f32,
    pub vdop: f32,
    /// Magnetic variation, updated independently of the fix bundle.
    pub variation: f32,
}

/// Wall clock from the GPS (PGN 126992).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTimeData {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub usec_since_epoch: u64,
}

/// Inertial unit outputs (standard identifiers `0x084`, `0x086`..`0x08A`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InertialData {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
    pub x_angle_vel: f32,
    pub y_angle_vel: f32,
    pub z_angle_vel: f32,
    pub x_accel: f32,
    pub y_accel: f32,
    pub z_accel: f32,
    pub latitude: i32,
    pub longitude: i32,
    pub est_latitude: i32,
    pub est_longitude: i32,
    pub gps_direction: f32,
    pub gps_speed: f32,
    pub magnetic_bearing: f32,
    pub status: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GyroData {
    pub z_rate: f32,
}

/// Rudder actuator state as reported on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RudderFeedback {
    pub pot: u16,
    pub starboard_limit: u16,
    pub port_limit: u16,
    pub port_limit_hit: bool,
    pub starboard_limit_hit: bool,
    pub enabled: bool,
    pub calibrated: bool,
    pub calibrating: bool,
    /// Measured rudder angle (PGN 127245), radians.
    pub angle: f32,
}

/// Manual commands observed from the secondary controller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlCommands {
    /// Commanded current written to the motor controller.
    pub secondary_manual_throttle: i16,
    /// Commanded rudder angle, radians.
    pub secondary_manual_rudder: f32,
}

//==================================================================================DATA_STORE
/// Process-wide blackboard, owned by the fusion context.
#[derive(Debug, Clone, Default)]
pub struct DataStore {
    pub power: Reading<PowerData>,
    pub wind: Reading<WindData>,
    pub air: Reading<AirData>,
    pub water: Reading<WaterData>,
    pub throttle: Reading<ThrottleData>,
    pub gps: Reading<GpsData>,
    pub date_time: Reading<DateTimeData>,
    pub inertial: Reading<InertialData>,
    pub gyro: Reading<GyroData>,
    pub rudder: Reading<RudderFeedback>,
    pub commands: ControlCommands,
}

impl DataStore {
    pub fn get_power(&mut self) -> Sample<PowerData> {
        self.power.take()
    }

    pub fn get_wind(&mut self) -> Sample<WindData> {
        self.wind.take()
    }

    pub fn get_air(&mut self) -> Sample<AirData> {
        self.air.take()
    }

    pub fn get_water(&mut self) -> Sample<WaterData> {
        self.water.take()
    }

    pub fn get_throttle(&mut self) -> Sample<ThrottleData> {
        self.throttle.take()
    }

    pub fn get_gps(&mut self) -> Sample<GpsData> {
        self.gps.take()
    }

    pub fn get_date_time(&mut self) -> Sample<DateTimeData> {
        self.date_time.take()
    }

    pub fn get_inertial(&mut self) -> Sample<InertialData> {
        self.inertial.take()
    }

    pub fn get_gyro(&mut self) -> Sample<GyroData> {
        self.gyro.take()
    }

    pub fn get_rudder(&mut self) -> Sample<RudderFeedback> {
        self.rudder.take()
    }

    pub fn commands(&self) -> ControlCommands {
        self.commands
    }

    /// Speed through water; consumes the water reading's flag.
    pub fn water_speed(&mut self) -> f32 {
        self.water.take().value.speed
    }

    /// Propeller speed; consumes the throttle reading's flag.
    pub fn prop_speed(&mut self) -> u16 {
        self.throttle.take().value.rpm
    }

    /// Forget the published fix. Variation, fix mode and DOPs are kept.
    pub fn clear_gps(&mut self) {
        let gps = self.gps.value_mut();
        gps.latitude = 0;
        gps.longitude = 0;
        gps.cog = 0.0;
        gps.sog = 0.0;
        self.gps.new_data = false;
    }
}
