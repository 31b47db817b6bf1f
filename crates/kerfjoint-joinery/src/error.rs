//! Error types for the joinery crate.
//!
//! This module provides structured error types for joinery synthesis, cross
//! joints, living hinges, box generation and parameter validation.

use kerfjoint_geometry::GeometryError;
use std::io;
use thiserror::Error;

/// Errors that can occur while computing joinery.
#[derive(Error, Debug)]
pub enum JoineryError {
    /// Invalid parameters were provided.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// A panel, face or tab reference does not resolve.
    #[error("Missing reference: {0}")]
    MissingReference(String),

    /// A persisted tab type tag is not recognized.
    #[error("Unknown tab type: {0}")]
    UnknownTabType(String),

    /// A persisted hinge type tag is not recognized.
    #[error("Unknown hinge type: {0}")]
    UnknownHingeType(String),

    /// No screw/nut entry for this metric diameter.
    #[error("Unknown screw diameter: {0}")]
    UnknownScrewDiameter(f64),

    /// The overlap of two panels has more or fewer than three face directions.
    #[error("{0} : intersection is not rectangular box")]
    NotRectangularIntersection(String),

    /// One panel lies entirely inside the other over the overlap.
    #[error("{0} : a part is included in the other.")]
    PartIncluded(String),

    /// The probe results match no supported configuration.
    #[error("{0} : Not managed")]
    NotManaged(String),

    /// The two hinge boundary segments are not at the same distance from
    /// their intersection.
    #[error("Not an arc {inner_1:.6} {inner_2:.6}")]
    NotAnArc { inner_1: f64, inner_2: f64 },

    /// A hinge chain was requested without any hinge.
    #[error("No hinge defined")]
    NoHingeDefined,

    /// The kerf is wider than the hinge slit clearance.
    #[error("Laser beam diameter is greater than clearance width ({kerf} > {clearance})")]
    KerfExceedsClearance { kerf: f64, clearance: f64 },

    /// A face or part was registered twice.
    #[error("{0} already in tabs list")]
    DuplicateTab(String),

    /// A tab or part cannot be removed while others link to it.
    #[error("Some tabs are linked to this part {0}")]
    TabHasLinks(String),

    /// A part was registered twice.
    #[error("{0} already in interactor parts list")]
    DuplicatePart(String),

    /// A part cannot be removed while others link to it.
    #[error("Some parts are linked to this part {0}")]
    PartHasLinks(String),

    /// A part cannot be removed while it still carries tab faces.
    #[error("Part {0} still has tabs")]
    PartHasTabs(String),

    /// A linked part does not match its source thickness.
    #[error("{0} does not have the same thickness")]
    ThicknessMismatch(String),

    /// The requested variant exists but has no implementation.
    #[error("{0} not implemented")]
    NotImplemented(String),

    /// A geometric precondition failed.
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// A parameter validation error occurred.
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// TOML parse error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Errors related to parameter validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// A required parameter is missing.
    #[error("Missing required parameter: {0}")]
    Missing(String),

    /// A parameter value is out of the valid range.
    #[error("Parameter '{name}' out of range: {value} (valid: {min}..{max})")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A parameter value is invalid.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    /// Parameters are mutually incompatible.
    #[error("Incompatible parameters: {0}")]
    Incompatible(String),

    /// Dimensions are invalid (zero or negative).
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),
}

/// Result type alias for joinery operations.
pub type JoineryResult<T> = Result<T, JoineryError>;

/// Result type alias for parameter validation.
pub type ParameterResult<T> = Result<T, ParameterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joinery_error_display() {
        let err = JoineryError::NotRectangularIntersection("A -> B".to_string());
        assert_eq!(err.to_string(), "A -> B : intersection is not rectangular box");

        let err = JoineryError::PartIncluded("A -> B".to_string());
        assert_eq!(err.to_string(), "A -> B : a part is included in the other.");

        let err = JoineryError::UnknownTabType("Dovetail".to_string());
        assert_eq!(err.to_string(), "Unknown tab type: Dovetail");

        let err = JoineryError::NoHingeDefined;
        assert_eq!(err.to_string(), "No hinge defined");

        let err = JoineryError::PartHasTabs("left_panel".to_string());
        assert_eq!(err.to_string(), "Part left_panel still has tabs");
    }

    #[test]
    fn test_geometry_error_conversion() {
        let err: JoineryError = GeometryError::AxisNotFound.into();
        assert_eq!(
            err.to_string(),
            "Geometry error: axis not found: no corner matches the face normal"
        );
    }

    #[test]
    fn test_parameter_error_display() {
        let err = ParameterError::OutOfRange {
            name: "interval_ratio".to_string(),
            value: 7.0,
            min: 0.1,
            max: 5.0,
        };
        assert_eq!(
            err.to_string(),
            "Parameter 'interval_ratio' out of range: 7 (valid: 0.1..5)"
        );

        let err = ParameterError::Missing("panel".to_string());
        assert_eq!(err.to_string(), "Missing required parameter: panel");
    }

    #[test]
    fn test_kerf_error_display() {
        let err = JoineryError::KerfExceedsClearance {
            kerf: 0.3,
            clearance: 0.2,
        };
        assert_eq!(
            err.to_string(),
            "Laser beam diameter is greater than clearance width (0.3 > 0.2)"
        );
    }
}
