//! # Celestial reference systems
//!
//! Positions on the celestial sphere tagged with the frame they are expressed in,
//! and the rotation between the **ICRS** (equatorial) and **Galactic** frames.
//!
//! The Galactic frame is defined by three J2000 angles: the equatorial coordinates of
//! the North Galactic Pole `(α_G, δ_G)` and the Galactic longitude of the North
//! Celestial Pole `l_NCP`. The ICRS → Galactic matrix is composed from elementary
//! axis rotations:
//!
//! ```text
//! N = Rz(l_NCP − π) · Ry(δ_G − π/2) · Rz(−α_G)
//! ```
//!
//! so that `v_gal = N · v_icrs` for unit vectors, and `N⁻¹ = Nᵀ`.
//!
//! Any type able to express itself in both frames can implement
//! [`SupportsFrameTransform`]; the proper-motion code only depends on that trait.
use std::fmt;
use std::sync::LazyLock;

use nalgebra::{Matrix3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::constants::{Degree, Radian, NCP_L_J2000, NGP_DEC_J2000, NGP_RA_J2000, RADEG};
use crate::conversion::{parse_dec_to_deg, parse_ra_to_deg, principal_angle};
use crate::galdyn_errors::GaldynError;

/// Celestial reference frames supported by the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frame {
    /// Galactic coordinates `(l, b)`
    Galactic,
    /// Equatorial ICRS coordinates `(α, δ)`
    Icrs,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Galactic => write!(f, "Galactic"),
            Frame::Icrs => write!(f, "ICRS"),
        }
    }
}

/// Orientation of the Galactic frame with respect to ICRS.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GalacticPole {
    /// Right ascension of the North Galactic Pole (radians)
    pub ra: Radian,
    /// Declination of the North Galactic Pole (radians)
    pub dec: Radian,
    /// Galactic longitude of the North Celestial Pole (radians)
    pub l_ncp: Radian,
}

impl GalacticPole {
    /// Standard J2000 definition of the Galactic frame.
    pub fn j2000() -> Self {
        GalacticPole {
            ra: NGP_RA_J2000 * RADEG,
            dec: NGP_DEC_J2000 * RADEG,
            l_ncp: NCP_L_J2000 * RADEG,
        }
    }
}

impl Default for GalacticPole {
    fn default() -> Self {
        Self::j2000()
    }
}

/// Rotation taking ICRS unit vectors to Galactic unit vectors.
///
/// Each factor is an active rotation about a principal axis, so the change of basis
/// by an angle `θ` enters with `-θ`.
pub fn icrs_to_galactic_rotation(pole: &GalacticPole) -> Rotation3<f64> {
    let to_pole_meridian = Rotation3::from_axis_angle(&Vector3::z_axis(), -pole.ra);
    let to_pole =
        Rotation3::from_axis_angle(&Vector3::y_axis(), pole.dec - std::f64::consts::FRAC_PI_2);
    let to_galactic_origin =
        Rotation3::from_axis_angle(&Vector3::z_axis(), pole.l_ncp - std::f64::consts::PI);

    to_galactic_origin * to_pole * to_pole_meridian
}

/// Rotation matrix taking ICRS unit vectors to Galactic unit vectors.
///
/// Arguments
/// ---------
/// * `pole`: orientation of the Galactic frame.
///
/// Returns
/// -------
/// * `N` such that `v_gal = N · v_icrs`. The matrix is orthonormal.
pub fn icrs_to_galactic_matrix(pole: &GalacticPole) -> Matrix3<f64> {
    icrs_to_galactic_rotation(pole).into_inner()
}

static ICRS_TO_GALACTIC_J2000: LazyLock<Matrix3<f64>> =
    LazyLock::new(|| icrs_to_galactic_matrix(&GalacticPole::j2000()));

/// Capability of expressing a sky position in a requested frame.
pub trait SupportsFrameTransform {
    fn transform_to(&self, frame: Frame) -> Result<SkyPosition, GaldynError>;
}

/// A direction on the celestial sphere, tagged with its frame.
///
/// `lon` is the Galactic longitude or the right ascension, normalized to `[0, 2π)`;
/// `lat` is the Galactic latitude or the declination, in `[-π/2, π/2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyPosition {
    frame: Frame,
    lon: Radian,
    lat: Radian,
}

impl SkyPosition {
    /// Build a position from angles in radians.
    ///
    /// Errors
    /// ------
    /// * [`GaldynError::InvalidParameter`] if `lat` is outside `[-π/2, π/2]` or
    ///   either angle is not finite.
    pub fn new(frame: Frame, lon: Radian, lat: Radian) -> Result<Self, GaldynError> {
        if !lon.is_finite() || !lat.is_finite() {
            return Err(GaldynError::InvalidParameter(format!(
                "non-finite sky position ({lon}, {lat})"
            )));
        }
        if lat.abs() > std::f64::consts::FRAC_PI_2 {
            return Err(GaldynError::InvalidParameter(format!(
                "latitude {lat} rad is outside [-π/2, π/2]"
            )));
        }

        Ok(SkyPosition {
            frame,
            lon: principal_angle(lon),
            lat,
        })
    }

    pub fn galactic(l: Radian, b: Radian) -> Result<Self, GaldynError> {
        Self::new(Frame::Galactic, l, b)
    }

    pub fn icrs(ra: Radian, dec: Radian) -> Result<Self, GaldynError> {
        Self::new(Frame::Icrs, ra, dec)
    }

    pub fn from_degrees(frame: Frame, lon: Degree, lat: Degree) -> Result<Self, GaldynError> {
        Self::new(frame, lon * RADEG, lat * RADEG)
    }

    /// Build an ICRS position from sexagesimal strings (`HH MM SS.SS`, `±DD MM SS.SS`).
    pub fn icrs_from_sexagesimal(ra: &str, dec: &str) -> Result<Self, GaldynError> {
        Self::from_degrees(Frame::Icrs, parse_ra_to_deg(ra)?, parse_dec_to_deg(dec)?)
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn longitude(&self) -> Radian {
        self.lon
    }

    pub fn latitude(&self) -> Radian {
        self.lat
    }

    /// Unit vector pointing to this position, in its own frame.
    pub fn to_unit_vector(&self) -> Vector3<f64> {
        let (sin_lat, cos_lat) = self.lat.sin_cos();
        let (sin_lon, cos_lon) = self.lon.sin_cos();
        Vector3::new(cos_lon * cos_lat, sin_lon * cos_lat, sin_lat)
    }

    /// Build a position from a (not necessarily normalized) direction vector.
    ///
    /// At the poles the longitude is undefined and set to zero.
    pub fn from_vector(frame: Frame, v: &Vector3<f64>) -> Result<Self, GaldynError> {
        let d2 = v.x * v.x + v.y * v.y;
        if d2 == 0.0 && v.z == 0.0 {
            return Err(GaldynError::DegenerateGeometry(
                "null direction vector".into(),
            ));
        }

        let lon = if d2 != 0.0 { v.y.atan2(v.x) } else { 0.0 };
        let lat = v.z.atan2(d2.sqrt());
        Self::new(frame, lon, lat)
    }
}

impl SupportsFrameTransform for SkyPosition {
    fn transform_to(&self, frame: Frame) -> Result<SkyPosition, GaldynError> {
        if self.frame == frame {
            return Ok(*self);
        }

        let n = &*ICRS_TO_GALACTIC_J2000;
        let v = self.to_unit_vector();
        match frame {
            Frame::Galactic => SkyPosition::from_vector(Frame::Galactic, &(n * v)),
            Frame::Icrs => SkyPosition::from_vector(Frame::Icrs, &(n.transpose() * v)),
        }
    }
}

impl fmt::Display for SkyPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lon_name, lat_name) = match self.frame {
            Frame::Galactic => ("l", "b"),
            Frame::Icrs => ("ra", "dec"),
        };
        write!(
            f,
            "{}({}={:.6}°, {}={:.6}°)",
            self.frame,
            lon_name,
            self.lon / RADEG,
            lat_name,
            self.lat / RADEG
        )
    }
}
