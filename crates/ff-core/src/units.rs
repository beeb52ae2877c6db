// ff-core/src/units.rs

use uom::si::f64::{
    Frequency as UomFrequency, Length as UomLength, Time as UomTime, Velocity as UomVelocity,
};

// Public canonical unit types (SI, f64)
pub type Frequency = UomFrequency;
pub type Length = UomLength;
pub type Time = UomTime;
pub type Velocity = UomVelocity;

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn hz(v: f64) -> Frequency {
    use uom::si::frequency::hertz;
    Frequency::new::<hertz>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn in_s(v: Time) -> f64 {
    use uom::si::time::second;
    v.get::<second>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _l = m(2.0);
        let _f = hz(1.5);
        let _v = mps(10.0);
    }

    #[test]
    fn nyquist_period_has_time_dimension() {
        let period: Time = (2.0 * hz(10.0 / 6.0)).recip();
        assert!((in_s(period) - 0.3).abs() < 1e-12);
        let advect: Time = m(100.0) / mps(10.0);
        assert!((in_s(advect) - 10.0).abs() < 1e-12);
    }
}
