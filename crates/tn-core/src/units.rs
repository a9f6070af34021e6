//! Typed time and power at configuration boundaries; solvers work in raw
//! seconds and watts.

pub use uom::si::f64::{Power, Time};

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn minutes(v: f64) -> Time {
    use uom::si::time::minute;
    Time::new::<minute>(v)
}

#[inline]
pub fn w(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

#[inline]
pub fn kw(v: f64) -> Power {
    use uom::si::power::kilowatt;
    Power::new::<kilowatt>(v)
}

/// Duration in seconds.
#[inline]
pub fn as_seconds(t: Time) -> f64 {
    use uom::si::time::second;
    t.get::<second>()
}

/// Power in watts.
#[inline]
pub fn as_watts(p: Power) -> f64 {
    use uom::si::power::watt;
    p.get::<watt>()
}

pub mod constants {
    /// Therms of fuel per kWh.
    pub const KWH_TO_THERMS: f64 = 0.034_121_4;

    /// Volumetric heat capacity of water, J/(L·K).
    pub const WATER_HEAT_CAPACITY_J_PER_L_K: f64 = 4_183.0;

    /// J per kWh.
    pub const J_PER_KWH: f64 = 3.6e6;
}
