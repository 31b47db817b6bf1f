//! Metric screw and hex nut dimensions.

use crate::error::{JoineryError, JoineryResult};
use serde::{Deserialize, Serialize};

/// Screw diameter and length with the matching nut size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrewNutSpec {
    pub screw_diameter: f64,
    pub screw_length: f64,
    /// Distance across the nut flats.
    pub nut_flat_flat: f64,
    pub nut_height: f64,
}

/// (diameter, flat to flat, nut height) for ISO metric hex nuts.
const NUT_TABLE: [(f64, f64, f64); 9] = [
    (1.6, 3.2, 1.3),
    (2.0, 4.0, 1.6),
    (2.5, 5.0, 2.0),
    (3.0, 5.5, 2.4),
    (4.0, 7.0, 3.2),
    (5.0, 8.0, 4.7),
    (6.0, 10.0, 5.2),
    (8.0, 13.0, 6.8),
    (10.0, 16.0, 8.4),
];

pub fn get_screw_nut_spec(diameter: f64, length: f64) -> JoineryResult<ScrewNutSpec> {
    NUT_TABLE
        .iter()
        .find(|(d, _, _)| (d - diameter).abs() < 1e-9)
        .map(|&(d, flat, height)| ScrewNutSpec {
            screw_diameter: d,
            screw_length: length,
            nut_flat_flat: flat,
            nut_height: height,
        })
        .ok_or(JoineryError::UnknownScrewDiameter(diameter))
}

/// Diameters present in the nut table.
pub fn supported_diameters() -> impl Iterator<Item = f64> {
    NUT_TABLE.iter().map(|(d, _, _)| *d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_diameters() {
        let m3 = get_screw_nut_spec(3.0, 15.0).unwrap();
        assert_eq!(m3.nut_flat_flat, 5.5);
        assert_eq!(m3.nut_height, 2.4);
        assert_eq!(m3.screw_length, 15.0);

        let m10 = get_screw_nut_spec(10.0, 40.0).unwrap();
        assert_eq!(m10.nut_flat_flat, 16.0);
        assert_eq!(supported_diameters().count(), 9);
    }

    #[test]
    fn test_unknown_diameter() {
        let err = get_screw_nut_spec(3.5, 15.0).unwrap_err();
        assert_eq!(err.to_string(), "Unknown screw diameter: 3.5");
    }
}
