//! # Physical quantities
//!
//! Unit-tagged values for the quantities that cross the public API: angles,
//! angular rates (proper motions) and linear velocities.
//!
//! A [`Quantity`] keeps the number the caller gave together with its [`Unit`].
//! Every conversion goes through a dimensioned [`uom`] value ([`Measure`]): the
//! source unit builds the `uom` quantity, the target unit reads it back. Two units
//! are convertible when they map onto the same `uom` quantity; converting a proper
//! motion in `km/s` to `mas/yr` is a [`GaldynError::UnitMismatch`].
//!
//! Astronomical rates (`mas/yr`, `rad/Myr`, ...) are expressed through `uom`
//! angles and Julian time spans, since `uom` has no per-year angular velocity
//! units of its own.
//!
//! The [`PhysicalQuantity`] trait is the narrow capability the rest of the crate
//! relies on, so callers may plug their own quantity type in.
//!
//! ```rust
//! use galdyn::units::{PhysicalQuantity, Quantity, Unit};
//!
//! let mu = Quantity::new(1.0, Unit::ArcsecPerYear);
//! let in_mas = mu.to(Unit::MasPerYear).unwrap();
//! assert!((in_mas.value() - 1000.0).abs() < 1e-9);
//! ```
use std::fmt;
use std::ops::{Mul, Neg};

use serde::{Deserialize, Serialize};
use uom::si::angle::{degree, radian, second as arcsecond};
use uom::si::angular_velocity::radian_per_second;
use uom::si::f64::{Angle, AngularVelocity, Length, Time, Velocity};
use uom::si::length::{meter, parsec};
use uom::si::time::{day, second};
use uom::si::velocity::{kilometer_per_second, meter_per_second};

use crate::galdyn_errors::GaldynError;

/// Kind of physical quantity a [`Unit`] measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Angle,
    AngularRate,
    Velocity,
}

/// A dimensioned `uom` value, the pivot of every unit conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measure {
    Angle(Angle),
    AngularRate(AngularVelocity),
    Velocity(Velocity),
}

impl Measure {
    pub fn dimension(&self) -> Dimension {
        match self {
            Measure::Angle(_) => Dimension::Angle,
            Measure::AngularRate(_) => Dimension::AngularRate,
            Measure::Velocity(_) => Dimension::Velocity,
        }
    }
}

/// Julian year (365.25 days).
fn julian_year() -> Time {
    Time::new::<day>(365.25)
}

/// Julian megayear.
fn megayear() -> Time {
    Time::new::<day>(365.25e6)
}

/// Angle swept per `span`, as a `uom` angular velocity.
fn per_span(angle: Angle, span: Time) -> AngularVelocity {
    AngularVelocity::new::<radian_per_second>(angle.get::<radian>() / span.get::<second>())
}

/// Angle swept by `rate` during `span`.
fn over_span(rate: AngularVelocity, span: Time) -> Angle {
    Angle::new::<radian>(rate.get::<radian_per_second>() * span.get::<second>())
}

fn kiloparsec(value: f64) -> Length {
    Length::new::<parsec>(1.0e3 * value)
}

/// Units known to the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    Radian,
    Degree,
    Arcsec,
    Milliarcsec,
    MasPerYear,
    ArcsecPerYear,
    DegreePerYear,
    RadianPerMyr,
    RadianPerSecond,
    KmPerSecond,
    KpcPerMyr,
}

impl Unit {
    pub fn dimension(&self) -> Dimension {
        match self {
            Unit::Radian | Unit::Degree | Unit::Arcsec | Unit::Milliarcsec => Dimension::Angle,
            Unit::MasPerYear
            | Unit::ArcsecPerYear
            | Unit::DegreePerYear
            | Unit::RadianPerMyr
            | Unit::RadianPerSecond => Dimension::AngularRate,
            Unit::KmPerSecond | Unit::KpcPerMyr => Dimension::Velocity,
        }
    }

    pub fn is_convertible_to(&self, other: Unit) -> bool {
        self.dimension() == other.dimension()
    }

    /// The `uom` value of `value` expressed in this unit.
    pub fn measure(&self, value: f64) -> Measure {
        match self {
            Unit::Radian => Measure::Angle(Angle::new::<radian>(value)),
            Unit::Degree => Measure::Angle(Angle::new::<degree>(value)),
            Unit::Arcsec => Measure::Angle(Angle::new::<arcsecond>(value)),
            Unit::Milliarcsec => Measure::Angle(Angle::new::<arcsecond>(1.0e-3 * value)),
            Unit::MasPerYear => Measure::AngularRate(per_span(
                Angle::new::<arcsecond>(1.0e-3 * value),
                julian_year(),
            )),
            Unit::ArcsecPerYear => {
                Measure::AngularRate(per_span(Angle::new::<arcsecond>(value), julian_year()))
            }
            Unit::DegreePerYear => {
                Measure::AngularRate(per_span(Angle::new::<degree>(value), julian_year()))
            }
            Unit::RadianPerMyr => {
                Measure::AngularRate(per_span(Angle::new::<radian>(value), megayear()))
            }
            Unit::RadianPerSecond => {
                Measure::AngularRate(AngularVelocity::new::<radian_per_second>(value))
            }
            Unit::KmPerSecond => Measure::Velocity(Velocity::new::<kilometer_per_second>(value)),
            Unit::KpcPerMyr => Measure::Velocity(Velocity::new::<meter_per_second>(
                kiloparsec(value).get::<meter>() / megayear().get::<second>(),
            )),
        }
    }

    /// Read `measure` in this unit, or `None` when the dimensions differ.
    pub fn read(&self, measure: &Measure) -> Option<f64> {
        match (self, measure) {
            (Unit::Radian, Measure::Angle(a)) => Some(a.get::<radian>()),
            (Unit::Degree, Measure::Angle(a)) => Some(a.get::<degree>()),
            (Unit::Arcsec, Measure::Angle(a)) => Some(a.get::<arcsecond>()),
            (Unit::Milliarcsec, Measure::Angle(a)) => Some(1.0e3 * a.get::<arcsecond>()),
            (Unit::MasPerYear, Measure::AngularRate(w)) => {
                Some(1.0e3 * over_span(*w, julian_year()).get::<arcsecond>())
            }
            (Unit::ArcsecPerYear, Measure::AngularRate(w)) => {
                Some(over_span(*w, julian_year()).get::<arcsecond>())
            }
            (Unit::DegreePerYear, Measure::AngularRate(w)) => {
                Some(over_span(*w, julian_year()).get::<degree>())
            }
            (Unit::RadianPerMyr, Measure::AngularRate(w)) => {
                Some(over_span(*w, megayear()).get::<radian>())
            }
            (Unit::RadianPerSecond, Measure::AngularRate(w)) => Some(w.get::<radian_per_second>()),
            (Unit::KmPerSecond, Measure::Velocity(v)) => Some(v.get::<kilometer_per_second>()),
            (Unit::KpcPerMyr, Measure::Velocity(v)) => {
                let meters = v.get::<meter_per_second>() * megayear().get::<second>();
                Some(meters / kiloparsec(1.0).get::<meter>())
            }
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Radian => "rad",
            Unit::Degree => "deg",
            Unit::Arcsec => "arcsec",
            Unit::Milliarcsec => "mas",
            Unit::MasPerYear => "mas/yr",
            Unit::ArcsecPerYear => "arcsec/yr",
            Unit::DegreePerYear => "deg/yr",
            Unit::RadianPerMyr => "rad/Myr",
            Unit::RadianPerSecond => "rad/s",
            Unit::KmPerSecond => "km/s",
            Unit::KpcPerMyr => "kpc/Myr",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Capability interface for a value paired with a unit.
pub trait PhysicalQuantity: Sized {
    fn value(&self) -> f64;

    fn unit(&self) -> Unit;

    /// Express the same quantity in `unit`, failing when the dimensions differ.
    fn to(&self, unit: Unit) -> Result<Self, GaldynError>;
}

/// A scalar value carrying its [`Unit`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(value: f64, unit: Unit) -> Self {
        Quantity { value, unit }
    }

    /// Read a `uom` value in `unit`.
    ///
    /// Errors
    /// ------
    /// * [`GaldynError::UnitMismatch`] if `unit` does not measure the same kind of
    ///   quantity as `measure`.
    pub fn from_measure(measure: &Measure, unit: Unit) -> Result<Self, GaldynError> {
        unit.read(measure)
            .map(|value| Quantity::new(value, unit))
            .ok_or(GaldynError::UnitMismatch {
                from: canonical_unit(measure.dimension()),
                to: unit,
            })
    }

    /// The dimensioned `uom` value of this quantity.
    pub fn measure(&self) -> Measure {
        self.unit.measure(self.value)
    }

    /// Sum of two quantities, expressed in the unit of `self`.
    pub fn checked_add(&self, other: &Quantity) -> Result<Quantity, GaldynError> {
        let rhs = other.to(self.unit)?;
        Ok(Quantity::new(self.value + rhs.value, self.unit))
    }

    /// Difference of two quantities, expressed in the unit of `self`.
    pub fn checked_sub(&self, other: &Quantity) -> Result<Quantity, GaldynError> {
        let rhs = other.to(self.unit)?;
        Ok(Quantity::new(self.value - rhs.value, self.unit))
    }

    /// Convert to an arbitrary [`PhysicalQuantity`] implementor's representation.
    pub fn from_quantity<Q: PhysicalQuantity>(q: &Q) -> Self {
        Quantity::new(q.value(), q.unit())
    }
}

/// SI-coherent unit of each dimension.
fn canonical_unit(dimension: Dimension) -> Unit {
    match dimension {
        Dimension::Angle => Unit::Radian,
        Dimension::AngularRate => Unit::RadianPerSecond,
        Dimension::Velocity => Unit::KmPerSecond,
    }
}

impl PhysicalQuantity for Quantity {
    fn value(&self) -> f64 {
        self.value
    }

    fn unit(&self) -> Unit {
        self.unit
    }

    fn to(&self, unit: Unit) -> Result<Self, GaldynError> {
        if unit == self.unit {
            return Ok(*self);
        }
        unit.read(&self.measure())
            .map(|value| Quantity::new(value, unit))
            .ok_or(GaldynError::UnitMismatch {
                from: self.unit,
                to: unit,
            })
    }
}

impl From<Angle> for Quantity {
    fn from(angle: Angle) -> Self {
        Quantity::new(angle.get::<radian>(), Unit::Radian)
    }
}

impl From<AngularVelocity> for Quantity {
    fn from(rate: AngularVelocity) -> Self {
        Quantity::new(rate.get::<radian_per_second>(), Unit::RadianPerSecond)
    }
}

impl From<Velocity> for Quantity {
    fn from(velocity: Velocity) -> Self {
        Quantity::new(velocity.get::<kilometer_per_second>(), Unit::KmPerSecond)
    }
}

impl Mul<f64> for Quantity {
    type Output = Quantity;

    fn mul(self, rhs: f64) -> Quantity {
        Quantity::new(self.value * rhs, self.unit)
    }
}

impl Neg for Quantity {
    type Output = Quantity;

    fn neg(self) -> Quantity {
        Quantity::new(-self.value, self.unit)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}
