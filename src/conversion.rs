use crate::constants::{Degree, Radian, DPI};
use crate::galdyn_errors::GaldynError;

/// Split a sexagesimal string into its three numeric fields.
fn split_sexagesimal(field: &str) -> Result<(&str, f64, f64), GaldynError> {
    let parts: Vec<&str> = field.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(GaldynError::InvalidSexagesimal(field.to_string()));
    }

    let parse = |s: &str| {
        s.parse::<f64>()
            .map_err(|_| GaldynError::InvalidSexagesimal(field.to_string()))
    };

    Ok((parts[0], parse(parts[1])?, parse(parts[2])?))
}

/// Parse a right ascension string to degrees
///
/// Arguments
/// ---------
/// * `ra`: a string representing the right ascension in the format `HH MM SS.SS`
///
/// Returns
/// -------
/// * The right ascension in degrees, or [`GaldynError::InvalidSexagesimal`] if the
///   input is malformed or out of range.
pub fn parse_ra_to_deg(ra: &str) -> Result<Degree, GaldynError> {
    let (h_raw, m, s) = split_sexagesimal(ra)?;
    let h: f64 = h_raw
        .parse()
        .map_err(|_| GaldynError::InvalidSexagesimal(ra.to_string()))?;

    if !(0.0..24.0).contains(&h) || !(0.0..60.0).contains(&m) || !(0.0..60.0).contains(&s) {
        return Err(GaldynError::InvalidSexagesimal(ra.to_string()));
    }

    Ok((h + m / 60.0 + s / 3600.0) * 15.0)
}

/// Parse a declination string to degrees
///
/// Arguments
/// ---------
/// * `dec`: a string representing the declination in the format `±DD MM SS.SS`
///
/// Returns
/// -------
/// * The declination in degrees, or [`GaldynError::InvalidSexagesimal`] if the
///   input is malformed or beyond ±90°.
pub fn parse_dec_to_deg(dec: &str) -> Result<Degree, GaldynError> {
    let (d_raw, m, s) = split_sexagesimal(dec)?;

    // the sign lives on the degree field, "-00" must stay negative
    let sign = if d_raw.starts_with('-') { -1.0 } else { 1.0 };
    let d: f64 = d_raw
        .trim_start_matches(&['-', '+'][..])
        .parse()
        .map_err(|_| GaldynError::InvalidSexagesimal(dec.to_string()))?;

    let dec_deg = sign * (d + m / 60.0 + s / 3600.0);
    if dec_deg.abs() > 90.0 || !(0.0..60.0).contains(&m) || !(0.0..60.0).contains(&s) {
        return Err(GaldynError::InvalidSexagesimal(dec.to_string()));
    }

    Ok(dec_deg)
}

/// Return the principal value of an angle in radians, in `[0, 2π)`.
pub fn principal_angle(a: Radian) -> Radian {
    a.rem_euclid(DPI)
}
