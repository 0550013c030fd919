//! # Proper-motion rotation between ICRS and Galactic frames
//!
//! Unlike positions, proper motions cannot be converted with a fixed matrix: the
//! tangent-plane bases `(ê_α, ê_δ)` and `(ê_l, ê_b)` at a given point of the sky are
//! rotated with respect to each other by an angle that depends on the position.
//!
//! At an equatorial position `(α, δ)`, with `(α_G, δ_G)` the equatorial coordinates of
//! the North Galactic Pole:
//!
//! ```text
//! C1   = sin δ_G · cos δ − cos δ_G · sin δ · cos(α − α_G)
//! C2   = cos δ_G · sin(α − α_G)
//! cosb = √(C1² + C2²)
//!
//!                 1    ⎡  C1  C2 ⎤
//! R(α, δ)  =  ─────── ⎢         ⎥
//!              cosb   ⎣ −C2  C1 ⎦
//!
//! [μ_l cos b, μ_b]ᵀ = R · [μ_α cos δ, μ_δ]ᵀ
//! ```
//!
//! `R` is orthonormal, so the inverse conversion uses `Rᵀ`. `cosb` is the cosine of the
//! Galactic latitude of the position; the rotation is undefined at the Galactic poles.
//!
//! ## Cos-latitude convention
//!
//! Catalogues quote the longitude component either as `μ_α` or as `μ_α* = μ_α cos δ`
//! (same for `μ_l`). [`CosLatitude`] records which convention a [`ProperMotion`]
//! uses. Inputs are scaled before the rotation if needed; outputs are always
//! [`CosLatitude::Scaled`] (use [`ProperMotion::to_unscaled`] if required).
//!
//! ## Example
//!
//! ```rust
//! use galdyn::proper_motion::{CosLatitude, ProperMotion, ProperMotionRotator};
//! use galdyn::ref_system::{Frame, SkyPosition};
//! use galdyn::units::{Quantity, Unit};
//!
//! let position = SkyPosition::from_degrees(Frame::Icrs, 83.82, -5.39).unwrap();
//! let mu = ProperMotion::icrs(
//!     Quantity::new(1.2, Unit::MasPerYear),
//!     Quantity::new(-0.4, Unit::MasPerYear),
//!     CosLatitude::Scaled,
//! );
//!
//! let rotator = ProperMotionRotator::default();
//! let mu_gal = rotator.equatorial_to_galactic(&position, &mu).unwrap();
//! assert_eq!(mu_gal.frame(), Frame::Galactic);
//! ```
use std::fmt;

use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

use crate::constants::POLE_EPS;
use crate::galdyn_errors::GaldynError;
use crate::ref_system::{Frame, GalacticPole, SkyPosition, SupportsFrameTransform};
use crate::units::{Dimension, PhysicalQuantity, Quantity, Unit};

/// Whether the longitude component of a proper motion is multiplied by the
/// cosine of the latitude (declination or Galactic latitude).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CosLatitude {
    /// Longitude component is `μ_lon · cos(lat)`
    Scaled,
    /// Longitude component is the raw rate `μ_lon`
    Unscaled,
}

/// A proper-motion vector in the tangent plane of a given frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProperMotion {
    frame: Frame,
    lon: Quantity,
    lat: Quantity,
    scaling: CosLatitude,
}

impl ProperMotion {
    pub fn new(frame: Frame, lon: Quantity, lat: Quantity, scaling: CosLatitude) -> Self {
        ProperMotion {
            frame,
            lon,
            lat,
            scaling,
        }
    }

    /// Proper motion `(μ_l, μ_b)` in Galactic coordinates.
    pub fn galactic(mu_l: Quantity, mu_b: Quantity, scaling: CosLatitude) -> Self {
        Self::new(Frame::Galactic, mu_l, mu_b, scaling)
    }

    /// Proper motion `(μ_α, μ_δ)` in ICRS coordinates.
    pub fn icrs(mu_ra: Quantity, mu_dec: Quantity, scaling: CosLatitude) -> Self {
        Self::new(Frame::Icrs, mu_ra, mu_dec, scaling)
    }

    /// Build a proper motion from any [`PhysicalQuantity`] implementor.
    pub fn from_quantities<Q: PhysicalQuantity>(
        frame: Frame,
        lon: &Q,
        lat: &Q,
        scaling: CosLatitude,
    ) -> Self {
        Self::new(
            frame,
            Quantity::from_quantity(lon),
            Quantity::from_quantity(lat),
            scaling,
        )
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn lon(&self) -> Quantity {
        self.lon
    }

    pub fn lat(&self) -> Quantity {
        self.lat
    }

    pub fn scaling(&self) -> CosLatitude {
        self.scaling
    }

    /// Both components as plain numbers in the unit of the longitude component.
    ///
    /// Errors
    /// ------
    /// * [`GaldynError::UnitMismatch`] if the longitude component is not an angular
    ///   rate, or if the latitude component cannot be converted to its unit.
    pub fn components(&self) -> Result<(Vector2<f64>, Unit), GaldynError> {
        let unit = self.lon.unit();
        if unit.dimension() != Dimension::AngularRate {
            return Err(GaldynError::UnitMismatch {
                from: unit,
                to: Unit::RadianPerSecond,
            });
        }
        let lat = self.lat.to(unit)?;
        Ok((Vector2::new(self.lon.value(), lat.value()), unit))
    }

    /// Express both components in `unit`.
    pub fn to_unit(&self, unit: Unit) -> Result<ProperMotion, GaldynError> {
        Ok(ProperMotion {
            lon: self.lon.to(unit)?,
            lat: self.lat.to(unit)?,
            ..*self
        })
    }

    /// Return the same motion with a cos(latitude)-scaled longitude component.
    pub fn to_scaled<P: SupportsFrameTransform>(
        &self,
        position: &P,
    ) -> Result<ProperMotion, GaldynError> {
        match self.scaling {
            CosLatitude::Scaled => Ok(*self),
            CosLatitude::Unscaled => {
                let lat = position.transform_to(self.frame)?.latitude();
                Ok(ProperMotion {
                    lon: self.lon * lat.cos(),
                    scaling: CosLatitude::Scaled,
                    ..*self
                })
            }
        }
    }

    /// Return the same motion with a raw (unscaled) longitude component.
    ///
    /// Errors
    /// ------
    /// * [`GaldynError::DegenerateGeometry`] at a pole of the motion's frame, where
    ///   the raw longitude rate is undefined.
    pub fn to_unscaled<P: SupportsFrameTransform>(
        &self,
        position: &P,
    ) -> Result<ProperMotion, GaldynError> {
        match self.scaling {
            CosLatitude::Unscaled => Ok(*self),
            CosLatitude::Scaled => {
                let lat = position.transform_to(self.frame)?.latitude();
                let cos_lat = lat.cos();
                if cos_lat.abs() < POLE_EPS {
                    return Err(GaldynError::DegenerateGeometry(format!(
                        "cannot unscale a {} proper motion at a pole of the frame",
                        self.frame
                    )));
                }
                Ok(ProperMotion {
                    lon: self.lon * cos_lat.recip(),
                    scaling: CosLatitude::Unscaled,
                    ..*self
                })
            }
        }
    }

    fn expect_frame(&self, frame: Frame) -> Result<(), GaldynError> {
        if self.frame != frame {
            return Err(GaldynError::InvalidParameter(format!(
                "expected a proper motion in the {frame} frame, got {}",
                self.frame
            )));
        }
        Ok(())
    }
}

impl fmt::Display for ProperMotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lon, lat) = match self.frame {
            Frame::Galactic => ("mu_l", "mu_b"),
            Frame::Icrs => ("mu_ra", "mu_dec"),
        };
        let star = match self.scaling {
            CosLatitude::Scaled => "*",
            CosLatitude::Unscaled => "",
        };
        write!(
            f,
            "{}({lon}{star}={}, {lat}={})",
            self.frame, self.lon, self.lat
        )
    }
}

/// Converts proper motions between the ICRS and Galactic tangent planes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProperMotionRotator {
    pole: GalacticPole,
}

impl ProperMotionRotator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a non-standard Galactic pole. It must match the frame service used
    /// to transform the positions.
    pub fn with_pole(pole: GalacticPole) -> Self {
        ProperMotionRotator { pole }
    }

    pub fn pole(&self) -> &GalacticPole {
        &self.pole
    }

    /// Matrix `R` taking `[μ_α cos δ, μ_δ]` to `[μ_l cos b, μ_b]` at an ICRS position.
    ///
    /// Errors
    /// ------
    /// * [`GaldynError::DegenerateGeometry`] when `cos b` vanishes (Galactic pole).
    pub fn rotation_matrix(&self, icrs: &SkyPosition) -> Result<Matrix2<f64>, GaldynError> {
        let (sin_dg, cos_dg) = self.pole.dec.sin_cos();
        let (sin_d, cos_d) = icrs.latitude().sin_cos();
        let (sin_da, cos_da) = (icrs.longitude() - self.pole.ra).sin_cos();

        let c1 = sin_dg * cos_d - cos_dg * sin_d * cos_da;
        let c2 = cos_dg * sin_da;
        let cosb = c1.hypot(c2);

        if cosb < POLE_EPS {
            return Err(GaldynError::DegenerateGeometry(format!(
                "cos(b) = {cosb:.3e} at {icrs}, the rotation is undefined at the Galactic pole"
            )));
        }

        Ok(Matrix2::new(c1, c2, -c2, c1) / cosb)
    }

    /// Convert an ICRS proper motion to Galactic coordinates.
    ///
    /// Arguments
    /// ---------
    /// * `position`: the sky position of the source, in any frame.
    /// * `mu`: the proper motion in the ICRS frame, scaled or not by `cos δ`.
    ///
    /// Returns
    /// -------
    /// * `(μ_l cos b, μ_b)` in the unit of the input `μ_α` component.
    pub fn equatorial_to_galactic<P: SupportsFrameTransform>(
        &self,
        position: &P,
        mu: &ProperMotion,
    ) -> Result<ProperMotion, GaldynError> {
        mu.expect_frame(Frame::Icrs)?;
        let icrs = position.transform_to(Frame::Icrs)?;

        let (v, unit) = mu.to_scaled(&icrs)?.components()?;
        let rotated = self.rotation_matrix(&icrs)? * v;

        Ok(ProperMotion::galactic(
            Quantity::new(rotated.x, unit),
            Quantity::new(rotated.y, unit),
            CosLatitude::Scaled,
        ))
    }

    /// Convert a Galactic proper motion to ICRS coordinates.
    ///
    /// Arguments
    /// ---------
    /// * `position`: the sky position of the source, in any frame.
    /// * `mu`: the proper motion in the Galactic frame, scaled or not by `cos b`.
    ///
    /// Returns
    /// -------
    /// * `(μ_α cos δ, μ_δ)` in the unit of the input `μ_l` component.
    pub fn galactic_to_equatorial<P: SupportsFrameTransform>(
        &self,
        position: &P,
        mu: &ProperMotion,
    ) -> Result<ProperMotion, GaldynError> {
        mu.expect_frame(Frame::Galactic)?;
        let icrs = position.transform_to(Frame::Icrs)?;

        let (v, unit) = mu.to_scaled(position)?.components()?;
        let rotated = self.rotation_matrix(&icrs)?.transpose() * v;

        Ok(ProperMotion::icrs(
            Quantity::new(rotated.x, unit),
            Quantity::new(rotated.y, unit),
            CosLatitude::Scaled,
        ))
    }

    /// Batched [`ProperMotionRotator::equatorial_to_galactic`]; fails on the first
    /// invalid element without returning partial results.
    pub fn equatorial_to_galactic_many<P: SupportsFrameTransform>(
        &self,
        positions: &[P],
        mus: &[ProperMotion],
    ) -> Result<Vec<ProperMotion>, GaldynError> {
        check_batch_len(positions.len(), mus.len())?;
        positions
            .iter()
            .zip(mus)
            .map(|(p, mu)| self.equatorial_to_galactic(p, mu))
            .collect()
    }

    /// Batched [`ProperMotionRotator::galactic_to_equatorial`]; fails on the first
    /// invalid element without returning partial results.
    pub fn galactic_to_equatorial_many<P: SupportsFrameTransform>(
        &self,
        positions: &[P],
        mus: &[ProperMotion],
    ) -> Result<Vec<ProperMotion>, GaldynError> {
        check_batch_len(positions.len(), mus.len())?;
        positions
            .iter()
            .zip(mus)
            .map(|(p, mu)| self.galactic_to_equatorial(p, mu))
            .collect()
    }
}

fn check_batch_len(n_positions: usize, n_motions: usize) -> Result<(), GaldynError> {
    if n_positions != n_motions {
        return Err(GaldynError::ShapeMismatch(format!(
            "{n_positions} positions for {n_motions} proper motions"
        )));
    }
    Ok(())
}

/// [`ProperMotionRotator::galactic_to_equatorial`] with the J2000 Galactic pole.
pub fn galactic_to_equatorial<P: SupportsFrameTransform>(
    position: &P,
    mu: &ProperMotion,
) -> Result<ProperMotion, GaldynError> {
    ProperMotionRotator::default().galactic_to_equatorial(position, mu)
}

/// [`ProperMotionRotator::equatorial_to_galactic`] with the J2000 Galactic pole.
pub fn equatorial_to_galactic<P: SupportsFrameTransform>(
    position: &P,
    mu: &ProperMotion,
) -> Result<ProperMotion, GaldynError> {
    ProperMotionRotator::default().equatorial_to_galactic(position, mu)
}

#[cfg(test)]
mod proper_motion_test {
    use super::*;
    use crate::constants::DPI;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn mas(v: f64) -> Quantity {
        Quantity::new(v, Unit::MasPerYear)
    }

    fn wrap_pi(a: f64) -> f64 {
        let a = a.rem_euclid(DPI);
        if a > std::f64::consts::PI {
            a - DPI
        } else {
            a
        }
    }

    /// Galactic proper motion obtained by differentiating the position transform.
    fn finite_difference_galactic(ra: f64, dec: f64, mu_ra: f64, mu_dec: f64) -> (f64, f64) {
        let h = 1e-6;
        let at = |t: f64| {
            SkyPosition::icrs(ra + mu_ra * t, dec + mu_dec * t)
                .unwrap()
                .transform_to(Frame::Galactic)
                .unwrap()
        };
        let (before, after, mid) = (at(-h), at(h), at(0.0));
        let mu_l = wrap_pi(after.longitude() - before.longitude()) / (2.0 * h);
        let mu_b = (after.latitude() - before.latitude()) / (2.0 * h);
        (mu_l * mid.latitude().cos(), mu_b)
    }

    #[test]
    fn test_matches_position_derivative() {
        let rotator = ProperMotionRotator::default();
        for (ra, dec) in [(0.3, 0.2), (4.0, -0.7), (2.1, 1.1), (5.5, -0.05)] {
            let (mu_ra, mu_dec) = (3.0, -1.5);
            let position = SkyPosition::icrs(ra, dec).unwrap();
            let mu = ProperMotion::icrs(
                Quantity::new(mu_ra, Unit::RadianPerSecond),
                Quantity::new(mu_dec, Unit::RadianPerSecond),
                CosLatitude::Unscaled,
            );

            let gal = rotator.equatorial_to_galactic(&position, &mu).unwrap();
            let (expected_l, expected_b) = finite_difference_galactic(ra, dec, mu_ra, mu_dec);

            assert_eq!(gal.scaling(), CosLatitude::Scaled);
            assert_abs_diff_eq!(gal.lon().value, expected_l, epsilon = 1e-6);
            assert_abs_diff_eq!(gal.lat().value, expected_b, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_rotation_preserves_total_motion() {
        let position = SkyPosition::from_degrees(Frame::Icrs, 266.4, -28.9).unwrap();
        let mu = ProperMotion::icrs(mas(-3.2), mas(-5.6), CosLatitude::Scaled);

        let gal = equatorial_to_galactic(&position, &mu).unwrap();
        let total_in = mu.lon().value.hypot(mu.lat().value);
        let total_out = gal.lon().value.hypot(gal.lat().value);
        assert_relative_eq!(total_in, total_out, max_relative = 1e-12);
    }

    #[test]
    fn test_round_trip() {
        let position = SkyPosition::from_degrees(Frame::Galactic, 121.17, -21.57).unwrap();
        let mu = ProperMotion::galactic(mas(4.4), mas(-1.1), CosLatitude::Scaled);

        let icrs = galactic_to_equatorial(&position, &mu).unwrap();
        assert_eq!(icrs.frame(), Frame::Icrs);
        let back = equatorial_to_galactic(&position, &icrs).unwrap();

        assert_eq!(back.frame(), Frame::Galactic);
        assert_abs_diff_eq!(back.lon().value, 4.4, epsilon = 1e-12);
        assert_abs_diff_eq!(back.lat().value, -1.1, epsilon = 1e-12);
    }

    #[test]
    fn test_unscaled_input_is_scaled_first() {
        let position = SkyPosition::from_degrees(Frame::Galactic, 30.0, 60.0).unwrap();
        let scaled = ProperMotion::galactic(mas(1.0), mas(2.0), CosLatitude::Scaled);
        let unscaled = ProperMotion::galactic(mas(2.0), mas(2.0), CosLatitude::Unscaled);

        let a = galactic_to_equatorial(&position, &scaled).unwrap();
        let b = galactic_to_equatorial(&position, &unscaled).unwrap();
        assert_abs_diff_eq!(a.lon().value, b.lon().value, epsilon = 1e-12);
        assert_abs_diff_eq!(a.lat().value, b.lat().value, epsilon = 1e-12);
    }

    #[test]
    fn test_mixed_angular_rate_units() {
        let position = SkyPosition::from_degrees(Frame::Icrs, 10.0, 20.0).unwrap();
        let in_mas = ProperMotion::icrs(mas(1500.0), mas(-250.0), CosLatitude::Scaled);
        let mixed = ProperMotion::icrs(
            mas(1500.0),
            Quantity::new(-0.25, Unit::ArcsecPerYear),
            CosLatitude::Scaled,
        );

        let a = equatorial_to_galactic(&position, &in_mas).unwrap();
        let b = equatorial_to_galactic(&position, &mixed).unwrap();
        assert_eq!(b.lon().unit, Unit::MasPerYear);
        assert_relative_eq!(a.lon().value, b.lon().value, max_relative = 1e-12);
        assert_relative_eq!(a.lat().value, b.lat().value, max_relative = 1e-12);
    }

    #[test]
    fn test_incompatible_units() {
        let position = SkyPosition::from_degrees(Frame::Icrs, 10.0, 20.0).unwrap();
        let mu = ProperMotion::icrs(
            mas(1.0),
            Quantity::new(3.0, Unit::KmPerSecond),
            CosLatitude::Scaled,
        );
        assert_eq!(
            equatorial_to_galactic(&position, &mu),
            Err(GaldynError::UnitMismatch {
                from: Unit::KmPerSecond,
                to: Unit::MasPerYear
            })
        );

        let not_a_rate = ProperMotion::icrs(
            Quantity::new(1.0, Unit::Degree),
            Quantity::new(1.0, Unit::Degree),
            CosLatitude::Scaled,
        );
        assert!(matches!(
            equatorial_to_galactic(&position, &not_a_rate),
            Err(GaldynError::UnitMismatch { .. })
        ));
    }

    #[test]
    fn test_galactic_pole_is_degenerate() {
        let ngp = SkyPosition::from_degrees(Frame::Galactic, 0.0, 90.0).unwrap();
        let mu = ProperMotion::galactic(mas(1.0), mas(1.0), CosLatitude::Scaled);
        assert!(matches!(
            galactic_to_equatorial(&ngp, &mu),
            Err(GaldynError::DegenerateGeometry(_))
        ));

        let sgp = SkyPosition::from_degrees(Frame::Galactic, 0.0, -90.0).unwrap();
        let mu = ProperMotion::icrs(mas(1.0), mas(1.0), CosLatitude::Scaled);
        assert!(matches!(
            equatorial_to_galactic(&sgp, &mu),
            Err(GaldynError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_celestial_pole_is_not_degenerate() {
        let ncp = SkyPosition::from_degrees(Frame::Icrs, 0.0, 90.0).unwrap();
        let mu = ProperMotion::icrs(mas(1.0), mas(2.0), CosLatitude::Scaled);
        let gal = equatorial_to_galactic(&ncp, &mu).unwrap();
        assert_relative_eq!(
            gal.lon().value.hypot(gal.lat().value),
            5f64.sqrt(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_wrong_input_frame() {
        let position = SkyPosition::from_degrees(Frame::Icrs, 10.0, 20.0).unwrap();
        let mu = ProperMotion::galactic(mas(1.0), mas(1.0), CosLatitude::Scaled);
        assert!(matches!(
            equatorial_to_galactic(&position, &mu),
            Err(GaldynError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_unscale_output() {
        let position = SkyPosition::from_degrees(Frame::Icrs, 150.0, -40.0).unwrap();
        let mu = ProperMotion::icrs(mas(2.0), mas(1.0), CosLatitude::Unscaled);

        let gal = equatorial_to_galactic(&position, &mu).unwrap();
        let gal_raw = gal.to_unscaled(&position).unwrap();
        let b = position.transform_to(Frame::Galactic).unwrap().latitude();
        assert_eq!(gal_raw.scaling(), CosLatitude::Unscaled);
        assert_relative_eq!(
            gal_raw.lon().value * b.cos(),
            gal.lon().value,
            max_relative = 1e-12
        );

        let icrs = galactic_to_equatorial(&position, &gal_raw)
            .unwrap()
            .to_unscaled(&position)
            .unwrap();
        assert_abs_diff_eq!(icrs.lon().value, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(icrs.lat().value, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_batch_conversion() {
        let positions = [
            SkyPosition::from_degrees(Frame::Icrs, 10.0, 20.0).unwrap(),
            SkyPosition::from_degrees(Frame::Icrs, 200.0, -60.0).unwrap(),
        ];
        let mus = [
            ProperMotion::icrs(mas(1.0), mas(0.5), CosLatitude::Scaled),
            ProperMotion::icrs(mas(-2.0), mas(3.5), CosLatitude::Scaled),
        ];

        let rotator = ProperMotionRotator::new();
        let gal = rotator.equatorial_to_galactic_many(&positions, &mus).unwrap();
        let back = rotator.galactic_to_equatorial_many(&positions, &gal).unwrap();
        for (b, m) in back.iter().zip(&mus) {
            assert_abs_diff_eq!(b.lon().value, m.lon().value, epsilon = 1e-12);
            assert_abs_diff_eq!(b.lat().value, m.lat().value, epsilon = 1e-12);
        }

        assert!(matches!(
            rotator.equatorial_to_galactic_many(&positions, &mus[..1]),
            Err(GaldynError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_display() {
        let mu = ProperMotion::galactic(mas(1.5), mas(-2.0), CosLatitude::Scaled);
        assert_eq!(
            format!("{mu}"),
            "Galactic(mu_l*=1.5 mas/yr, mu_b=-2 mas/yr)"
        );
    }
}
