//! Rectangular box generator.
//!
//! Produces the panels of a closed box centered on the origin: front and
//! back in the XZ plane, sides in the YZ plane, bottom and top in the XY
//! plane. Which panel runs over the full length or width is chosen by the
//! priority, and the top and bottom either sit on the walls or between them.

use crate::error::{JoineryError, JoineryResult, ParameterError, ParameterResult};
use kerfjoint_geometry::{Point3, Solid, Vector3};
use serde::{Deserialize, Serialize};

/// Which walls run over the full box dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LengthWidthPriority {
    /// Front and back span the length.
    #[default]
    Length,
    /// Sides span the width.
    Width,
    /// Every wall spans its dimension, for cross joints.
    Cross,
    /// Walls are shortened by the inner radius and the front is split in two,
    /// to be replaced by rounded corners.
    Round,
}

/// Top or bottom placement relative to the walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlatePosition {
    /// Covers the walls.
    #[default]
    Outside,
    /// Fits between the walls.
    Inside,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TopType {
    #[default]
    Normal,
    Openable,
}

/// Box dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxProperties {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub thickness: f64,
    /// Dimensions are measured outside the walls rather than inside.
    pub outside_measure: bool,
    pub length_width_priority: LengthWidthPriority,
    pub length_outside: f64,
    pub width_outside: f64,
    pub inner_radius: f64,
    pub length_shift: f64,
    pub width_shift: f64,
}

impl Default for BoxProperties {
    fn default() -> Self {
        Self {
            length: 90.0,
            width: 50.0,
            height: 30.0,
            thickness: 3.0,
            outside_measure: true,
            length_width_priority: LengthWidthPriority::Length,
            length_outside: 0.0,
            width_outside: 0.0,
            inner_radius: 0.0,
            length_shift: 0.0,
            width_shift: 0.0,
        }
    }
}

impl BoxProperties {
    pub fn validate(&self) -> ParameterResult<()> {
        for (name, value) in [
            ("length", self.length),
            ("width", self.width),
            ("height", self.height),
            ("thickness", self.thickness),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(ParameterError::InvalidDimensions(format!(
                    "box {name} must be > 0, got {value}"
                )));
            }
        }
        if self.outside_measure
            && (self.length <= 2.0 * self.thickness || self.width <= 2.0 * self.thickness)
        {
            return Err(ParameterError::Incompatible(
                "outside dimensions must exceed twice the thickness".to_string(),
            ));
        }
        Ok(())
    }
}

/// Top or bottom plate parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopBottomProperties {
    pub position: PlatePosition,
    /// Inset of an inside plate from the wall edge.
    pub height_shift: f64,
    /// Overhang of an outside plate along the length.
    pub length_outside: f64,
    pub width_outside: f64,
    pub top_type: TopType,
    pub cover_length_tolerance: f64,
}

impl Default for TopBottomProperties {
    fn default() -> Self {
        Self {
            position: PlatePosition::Outside,
            height_shift: 0.0,
            length_outside: 0.0,
            width_outside: 0.0,
            top_type: TopType::Normal,
            cover_length_tolerance: 3.0,
        }
    }
}

/// A named generated panel.
#[derive(Debug, Clone)]
pub struct BoxPart {
    pub name: String,
    pub solid: Solid,
}

impl BoxPart {
    fn new(name: impl Into<String>, solid: Solid) -> Self {
        Self {
            name: name.into(),
            solid,
        }
    }
}

/// Wall and plate sizes before placement.
struct Layout {
    length: f64,
    length_spacing: f64,
    width: f64,
    width_spacing: f64,
    height: f64,
    shift_height: f64,
    bottom: (f64, f64),
    bottom_z: f64,
    top: (f64, f64),
    top_z: f64,
}

/// Panels of the box, in order: front (or both front halves), back, left,
/// right, bottom, top.
pub fn make_box(
    dimensions: &BoxProperties,
    top: &TopBottomProperties,
    bottom: &TopBottomProperties,
) -> JoineryResult<Vec<BoxPart>> {
    dimensions.validate()?;
    if top.top_type != TopType::Normal {
        return Err(JoineryError::NotImplemented("Top type".to_string()));
    }
    let layout = if dimensions.outside_measure {
        outside_layout(dimensions, top, bottom)
    } else {
        inside_layout(dimensions, top, bottom)
    };
    for (name, value) in [
        ("wall length", layout.length),
        ("wall width", layout.width),
        ("wall height", layout.height),
    ] {
        if value <= 0.0 {
            return Err(ParameterError::InvalidDimensions(format!(
                "{name} is {value} after removing thickness and overhangs"
            ))
            .into());
        }
    }

    let thickness = dimensions.thickness;
    let lift = Vector3::new(0.0, 0.0, layout.shift_height);
    let (front, back) = make_front_panels(layout.length, layout.height, thickness, layout.length_spacing);
    let (left, right) = make_side_panels(layout.width, layout.height, thickness, layout.width_spacing);
    let bottom_panel = make_z_panel(layout.bottom.0, layout.bottom.1, thickness, layout.bottom_z);
    let top_panel = make_z_panel(layout.top.0, layout.top.1, thickness, layout.top_z);

    let mut parts = Vec::with_capacity(7);
    if dimensions.length_width_priority == LengthWidthPriority::Round {
        let (half_1, half_2) =
            make_twice_half_front_panel(layout.length, layout.height, thickness, layout.length_spacing);
        parts.push(BoxPart::new("face_panel_1", half_1));
        parts.push(BoxPart::new("face_panel_2", half_2));
    } else {
        parts.push(BoxPart::new("face_panel", front));
    }
    parts.push(BoxPart::new("behind_panel", back));
    parts.push(BoxPart::new("left_panel", left));
    parts.push(BoxPart::new("right_panel", right));
    parts.push(BoxPart::new("bottom_panel", bottom_panel));
    parts.push(BoxPart::new("top_panel", top_panel));

    for part in &mut parts {
        part.solid = part.solid.translated(lift);
    }
    tracing::debug!(
        "Box {}x{}x{} ({:?}) gives {} panels",
        dimensions.length,
        dimensions.width,
        dimensions.height,
        dimensions.length_width_priority,
        parts.len()
    );
    Ok(parts)
}

fn outside_layout(d: &BoxProperties, top: &TopBottomProperties, bottom: &TopBottomProperties) -> Layout {
    let t = d.thickness;
    let (mut length, mut length_spacing, mut width, mut width_spacing) = match d.length_width_priority {
        LengthWidthPriority::Length => (
            d.length,
            d.width - 2.0 * t,
            d.width - 2.0 * t,
            d.length - 2.0 * t - 2.0 * d.width_shift,
        ),
        LengthWidthPriority::Width => (
            d.length - 2.0 * t,
            d.width - 2.0 * t - 2.0 * d.length_shift,
            d.width,
            d.length - 2.0 * t,
        ),
        LengthWidthPriority::Cross => (
            d.length,
            d.width - 2.0 * t - d.width_outside,
            d.width,
            d.length - 2.0 * t - d.length_outside,
        ),
        LengthWidthPriority::Round => (
            d.length - d.inner_radius,
            d.width - 2.0 * t,
            d.width - d.inner_radius,
            d.length - 2.0 * t,
        ),
    };

    let mut height = d.height;
    let mut shift_height = 0.0;
    let mut exceeding_length: f64 = 0.0;
    let mut exceeding_width: f64 = 0.0;
    if bottom.position == PlatePosition::Outside {
        height -= t;
        shift_height += t / 2.0;
        exceeding_length = exceeding_length.max(bottom.length_outside);
        exceeding_width = exceeding_width.max(bottom.width_outside);
    }
    if top.position == PlatePosition::Outside {
        height -= t;
        shift_height -= t / 2.0;
        exceeding_length = exceeding_length.max(top.length_outside);
        exceeding_width = exceeding_width.max(top.width_outside);
    }
    if exceeding_length > 0.0 {
        length -= exceeding_length;
        width_spacing -= exceeding_length;
    }
    if exceeding_width > 0.0 {
        width -= exceeding_width;
        length_spacing -= exceeding_width;
    }

    let down = -height / 2.0;
    let up = height / 2.0;
    let plate = |p: &TopBottomProperties| {
        (
            d.length + p.length_outside - exceeding_length,
            d.width + p.width_outside - exceeding_width,
        )
    };
    let (bottom_size, bottom_z) = match bottom.position {
        PlatePosition::Inside => ((width_spacing, length_spacing), down + bottom.height_shift),
        PlatePosition::Outside => (plate(bottom), down - t),
    };
    let (top_size, top_z) = match top.position {
        PlatePosition::Inside => ((width_spacing, length_spacing), up - t - top.height_shift),
        PlatePosition::Outside => (plate(top), up),
    };

    Layout {
        length,
        length_spacing,
        width,
        width_spacing,
        height,
        shift_height,
        bottom: bottom_size,
        bottom_z,
        top: top_size,
        top_z,
    }
}

fn inside_layout(d: &BoxProperties, top: &TopBottomProperties, bottom: &TopBottomProperties) -> Layout {
    let t = d.thickness;
    let mut extra_length = 0.0;
    let mut extra_width = 0.0;
    let (length, width) = match d.length_width_priority {
        LengthWidthPriority::Length => {
            extra_length = 2.0 * d.width_shift;
            (d.length + 2.0 * t + 2.0 * d.width_shift, d.width)
        }
        LengthWidthPriority::Width => {
            extra_width = 2.0 * d.length_shift;
            (d.length, d.width + 2.0 * t + 2.0 * d.length_shift)
        }
        LengthWidthPriority::Cross => (
            d.length + 2.0 * t + d.length_outside,
            d.width + 2.0 * t + d.width_outside,
        ),
        LengthWidthPriority::Round => (
            d.length + 2.0 * t - d.inner_radius,
            d.width + 2.0 * t - d.inner_radius,
        ),
    };

    let mut height = d.height;
    let mut shift_height = 0.0;
    if bottom.position == PlatePosition::Inside {
        height += t + bottom.height_shift;
        shift_height -= (t + bottom.height_shift) / 2.0;
    }
    if top.position == PlatePosition::Inside {
        height += t + top.height_shift;
        shift_height += (t + top.height_shift) / 2.0;
    }

    let down = -height / 2.0;
    let up = height / 2.0;
    let plate = |p: &TopBottomProperties| {
        (
            d.length + 2.0 * t + p.length_outside + extra_length,
            d.width + 2.0 * t + p.width_outside + extra_width,
        )
    };
    let (bottom_size, bottom_z) = match bottom.position {
        PlatePosition::Inside => ((d.length, d.width), down + bottom.height_shift),
        PlatePosition::Outside => (plate(bottom), down - t),
    };
    let (top_size, top_z) = match top.position {
        PlatePosition::Inside => ((d.length, d.width), up - t - top.height_shift),
        PlatePosition::Outside => (plate(top), up),
    };

    Layout {
        length,
        length_spacing: d.width,
        width,
        width_spacing: d.length,
        height,
        shift_height,
        bottom: bottom_size,
        bottom_z,
        top: top_size,
        top_z,
    }
}

/// Plate in the XY plane, centered, from `z` up by `thickness`.
fn make_z_panel(length: f64, width: f64, thickness: f64, z: f64) -> Solid {
    Solid::cuboid(
        Point3::new(-length / 2.0, -width / 2.0, z),
        Vector3::new(length, width, thickness),
    )
}

/// Front at `y = spacing / 2` and back at `y = -spacing / 2 - thickness`.
fn make_front_panels(length: f64, height: f64, thickness: f64, spacing: f64) -> (Solid, Solid) {
    let front = Solid::cuboid(
        Point3::new(-length / 2.0, spacing / 2.0, -height / 2.0),
        Vector3::new(length, thickness, height),
    );
    let back = front.translated(Vector3::new(0.0, -spacing - thickness, 0.0));
    (front, back)
}

fn make_twice_half_front_panel(length: f64, height: f64, thickness: f64, spacing: f64) -> (Solid, Solid) {
    let half = Solid::cuboid(
        Point3::new(-length / 4.0, spacing / 2.0, -height / 2.0),
        Vector3::new(length / 2.0, thickness, height),
    );
    (
        half.translated(Vector3::new(-length / 4.0, 0.0, 0.0)),
        half.translated(Vector3::new(length / 4.0, 0.0, 0.0)),
    )
}

/// Left at `x = spacing / 2` and right at `x = -spacing / 2 - thickness`.
fn make_side_panels(width: f64, height: f64, thickness: f64, spacing: f64) -> (Solid, Solid) {
    let left = Solid::cuboid(
        Point3::new(spacing / 2.0, -width / 2.0, -height / 2.0),
        Vector3::new(thickness, width, height),
    );
    let right = left.translated(Vector3::new(-spacing - thickness, 0.0, 0.0));
    (left, right)
}
