//! Latitude/longitude parsing and display

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoordError {
    #[error("empty coordinate")]
    Empty,
    #[error("cannot parse {axis} '{value}'")]
    Invalid { axis: &'static str, value: String },
    #[error("{axis} {value} out of range")]
    OutOfRange { axis: &'static str, value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn name(self) -> &'static str {
        match self {
            Axis::Latitude => "latitude",
            Axis::Longitude => "longitude",
        }
    }

    fn limit(self) -> f64 {
        match self {
            Axis::Latitude => 90.0,
            Axis::Longitude => 180.0,
        }
    }

    fn hemispheres(self) -> (char, char) {
        match self {
            Axis::Latitude => ('N', 'S'),
            Axis::Longitude => ('E', 'W'),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordFormat {
    /// Degrees, minutes, seconds: `50°52'21.92"N`
    Deg,
    /// Signed decimal degrees with 8 places: `50.87275556`
    D8,
}

/// Parse decimal (`-4.35`, `4,35`, `4.35W`) or sexagesimal
/// (`50°52'21.92"N`, `50:52:21.92 N`) notation into signed degrees
pub fn parse_coordinate(value: &str, axis: Axis) -> Result<f64, CoordError> {
    let invalid = || CoordError::Invalid {
        axis: axis.name(),
        value: value.to_string(),
    };

    let mut text = value.trim().to_uppercase();
    if text.is_empty() {
        return Err(CoordError::Empty);
    }

    let (positive, negative) = axis.hemispheres();
    let mut sign = 1.0;
    if let Some(rest) = text.strip_suffix(positive).or_else(|| text.strip_prefix(positive)) {
        text = rest.trim().to_string();
    } else if let Some(rest) = text.strip_suffix(negative).or_else(|| text.strip_prefix(negative)) {
        sign = -1.0;
        text = rest.trim().to_string();
    }
    if let Some(rest) = text.strip_prefix('-') {
        sign = -sign;
        text = rest.trim().to_string();
    }

    let separated: String = text
        .chars()
        .map(|c| match c {
            '°' | '\'' | '"' | ':' | '′' | '″' => ' ',
            ',' => '.',
            c => c,
        })
        .collect();
    let parts: Vec<f64> = separated
        .split_whitespace()
        .map(|p| p.parse::<f64>().map_err(|_| invalid()))
        .collect::<Result<_, _>>()?;

    let degrees = match parts.as_slice() {
        [d] => *d,
        [d, m] if (0.0..60.0).contains(m) => d + m / 60.0,
        [d, m, s] if (0.0..60.0).contains(m) && (0.0..60.0).contains(s) => {
            d + m / 60.0 + s / 3600.0
        }
        _ => return Err(invalid()),
    };
    if degrees < 0.0 || !degrees.is_finite() {
        return Err(invalid());
    }

    let signed = sign * degrees;
    if signed.abs() > axis.limit() {
        return Err(CoordError::OutOfRange {
            axis: axis.name(),
            value: signed,
        });
    }
    Ok(signed)
}

pub fn format_coordinate(degrees: f64, axis: Axis, format: CoordFormat) -> String {
    match format {
        CoordFormat::D8 => format!("{:.8}", degrees),
        CoordFormat::Deg => {
            let (positive, negative) = axis.hemispheres();
            let hemisphere = if degrees < 0.0 { negative } else { positive };
            let abs = degrees.abs();
            let mut d = abs.trunc() as u32;
            let minutes = (abs - abs.trunc()) * 60.0;
            let mut m = minutes.trunc() as u32;
            let mut s = ((minutes - minutes.trunc()) * 60.0 * 100.0).round() / 100.0;
            if s >= 60.0 {
                s -= 60.0;
                m += 1;
            }
            if m >= 60 {
                m -= 60;
                d += 1;
            }
            format!("{}°{}'{:.2}\"{}", d, m, s, hemisphere)
        }
    }
}

/// Convert a stored latitude/longitude pair for display
pub fn conv_lat_lon(
    latitude: &str,
    longitude: &str,
    format: CoordFormat,
) -> Result<(String, String), CoordError> {
    let lat = parse_coordinate(latitude, Axis::Latitude)?;
    let lon = parse_coordinate(longitude, Axis::Longitude)?;
    Ok((
        format_coordinate(lat, Axis::Latitude, format),
        format_coordinate(lon, Axis::Longitude, format),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_parse_decimal_forms() {
        assert!(close(parse_coordinate("50.849888", Axis::Latitude).unwrap(), 50.849888));
        assert!(close(parse_coordinate("-4,35", Axis::Longitude).unwrap(), -4.35));
        assert!(close(parse_coordinate("4.35W", Axis::Longitude).unwrap(), -4.35));
        assert!(close(parse_coordinate("S 33.9", Axis::Latitude).unwrap(), -33.9));
    }

    #[test]
    fn test_parse_sexagesimal_forms() {
        let lat = parse_coordinate("50°50'59.60\"N", Axis::Latitude).unwrap();
        assert!(close(lat, 50.0 + 50.0 / 60.0 + 59.6 / 3600.0));
        let lon = parse_coordinate("2:53:9.23 E", Axis::Longitude).unwrap();
        assert!(close(lon, 2.0 + 53.0 / 60.0 + 9.23 / 3600.0));
    }

    #[test]
    fn test_parse_rejects_garbage_and_range() {
        assert_eq!(parse_coordinate("  ", Axis::Latitude), Err(CoordError::Empty));
        assert!(matches!(
            parse_coordinate("north-ish", Axis::Latitude),
            Err(CoordError::Invalid { .. })
        ));
        assert!(matches!(
            parse_coordinate("50 75 0", Axis::Latitude),
            Err(CoordError::Invalid { .. })
        ));
        assert!(matches!(
            parse_coordinate("91.5", Axis::Latitude),
            Err(CoordError::OutOfRange { .. })
        ));
        assert!(parse_coordinate("179.9W", Axis::Longitude).is_ok());
    }

    #[test]
    fn test_deg_format() {
        let (lat, lon) =
            conv_lat_lon("50.849888888888", "2.885897222222", CoordFormat::Deg).unwrap();
        assert_eq!(lat, "50°50'59.60\"N");
        assert_eq!(lon, "2°53'9.23\"E");

        let (lat, lon) = conv_lat_lon("-33.8688", "-70.6693", CoordFormat::Deg).unwrap();
        assert_eq!(lat, "33°52'7.68\"S");
        assert_eq!(lon, "70°40'9.48\"W");
    }

    #[test]
    fn test_d8_format() {
        let (lat, lon) = conv_lat_lon("50°50'59.60\"N", "2.5W", CoordFormat::D8).unwrap();
        assert_eq!(lat, "50.84988889");
        assert_eq!(lon, "-2.50000000");
    }
}
