//! Panel material model and thickness estimation.

use crate::error::{JoineryError, JoineryResult, ParameterError, ParameterResult};
use kerfjoint_geometry::{group_faces_by_direction, Face, GeometryError, Solid};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Thickness used when it cannot be measured from the solid.
pub const FALLBACK_THICKNESS: f64 = 5.0;

/// Strength nodes left in cross joint notches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NodeType {
    #[default]
    NoNode,
    /// One node a quarter of the notch height.
    SingleShort,
    /// One node half the notch height.
    SingleLong,
    /// Two quarter-height nodes around the notch middle.
    DualShort,
}

/// Material and cutting parameters of one panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperties {
    /// Name of the panel solid in the document.
    pub label: String,
    pub thickness: f64,
    pub thickness_tolerance: f64,
    /// Kerf width.
    pub laser_beam_diameter: f64,
    pub hole_width_tolerance: f64,
    pub node_type: NodeType,
    pub node_thickness: f64,
    pub dog_bone: bool,
    /// Name of the output solid.
    pub new_name: String,
}

impl MaterialProperties {
    /// Properties for a panel of known thickness, every other field derived.
    pub fn new(label: impl Into<String>, thickness: f64) -> Self {
        let label = label.into();
        Self {
            new_name: format!("{label}_tab"),
            label,
            thickness,
            thickness_tolerance: 0.1 * thickness,
            laser_beam_diameter: thickness / 15.0,
            hole_width_tolerance: 0.0,
            node_type: NodeType::NoNode,
            node_thickness: 0.05 * thickness,
            dog_bone: true,
        }
    }

    /// Properties with the thickness measured on the solid.
    pub fn from_solid(label: impl Into<String>, solid: &Solid) -> Self {
        let label = label.into();
        let thickness = match estimate_thickness(solid) {
            Ok(thickness) => thickness,
            Err(e) => {
                tracing::warn!(
                    "Unable to estimate thickness of {}: {}, using {}",
                    label,
                    e,
                    FALLBACK_THICKNESS
                );
                FALLBACK_THICKNESS
            }
        };
        Self::new(label, thickness)
    }

    pub fn validate(&self) -> ParameterResult<()> {
        if self.thickness.is_nan() || self.thickness <= 0.0 {
            return Err(ParameterError::InvalidDimensions(format!(
                "{} thickness must be > 0, got {}",
                self.label, self.thickness
            )));
        }
        if self.laser_beam_diameter < 0.0 {
            return Err(ParameterError::InvalidValue {
                name: "laser_beam_diameter".to_string(),
                reason: "must not be negative".to_string(),
            });
        }
        if self.thickness_tolerance < 0.0 || self.node_thickness < 0.0 {
            return Err(ParameterError::InvalidValue {
                name: "thickness_tolerance".to_string(),
                reason: "tolerances must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

/// Measures panel thickness on the dominant face direction.
///
/// Inside the direction group with the largest area, the faces are paired
/// back to back: opposite normals, each pointing away from the other. The
/// closest such pair bounds the material, which keeps hollow solids from
/// pairing their two outer skins. For every outline vertex of the first face
/// the closest vertex of the second is taken and their distance measured
/// across the normal. The most frequent distance wins, so a single skewed
/// vertex pairing does not move the result.
pub fn estimate_thickness(solid: &Solid) -> JoineryResult<f64> {
    let groups = group_faces_by_direction(&solid.faces(), 1e-5);
    let biggest = groups
        .last()
        .ok_or_else(|| GeometryError::Degenerate("solid has no face".to_string()))?;
    if biggest.faces.len() < 2 {
        return Err(GeometryError::Degenerate(
            "fewer than two faces share the dominant normal".to_string(),
        )
        .into());
    }

    let (first, second) = back_to_back_pair(&biggest.faces).ok_or_else(|| {
        GeometryError::Degenerate("no back to back faces share the dominant normal".to_string())
    })?;
    let normal = first.normal();
    let first_loop = first.outer_loop()?;
    let second_loop = second.outer_loop()?;

    let minimums: Vec<f64> = first_loop
        .iter()
        .filter_map(|p| {
            second_loop
                .iter()
                .min_by(|a, b| (p - *a).norm().total_cmp(&(p - *b).norm()))
                .map(|q| (p - q).dot(&normal).abs())
        })
        .collect();

    let mut counts: HashMap<i64, usize> = HashMap::new();
    for value in &minimums {
        *counts.entry((value * 1e6).round() as i64).or_insert(0) += 1;
    }
    let mut best: Option<(f64, usize)> = None;
    for value in &minimums {
        let count = counts.get(&((value * 1e6).round() as i64)).copied().unwrap_or(0);
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((*value, count));
        }
    }
    best.map(|(value, _)| value).ok_or_else(|| {
        JoineryError::Geometry(GeometryError::VertexSort("empty outline".to_string()))
    })
}

/// Closest pair of faces with opposite normals, each facing away from the
/// other.
fn back_to_back_pair(faces: &[Face]) -> Option<(&Face, &Face)> {
    let mut best: Option<(f64, &Face, &Face)> = None;
    for (i, a) in faces.iter().enumerate() {
        for b in &faces[i + 1..] {
            if a.normal().dot(&b.normal()) > -1.0 + 1e-5 {
                continue;
            }
            let gap = (a.center_of_mass() - b.center_of_mass()).dot(&a.normal());
            if gap <= 1e-9 {
                continue;
            }
            if best.is_none_or(|(g, _, _)| gap < g) {
                best = Some((gap, a, b));
            }
        }
    }
    best.map(|(_, a, b)| (a, b))
}

/// Where a part gets its material parameters from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PartSource {
    Owned(MaterialProperties),
    /// Reuses another part's parameters under its own name.
    LinkedTo { source: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartEntry {
    pub name: String,
    pub source: PartSource,
}

/// Parts taking part in one joinery session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartsList {
    entries: Vec<PartEntry>,
}

impl PartsList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exist(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Registers a part with explicit properties.
    pub fn append(&mut self, properties: MaterialProperties) -> JoineryResult<&PartEntry> {
        if self.exist(&properties.label) {
            return Err(JoineryError::DuplicatePart(properties.label));
        }
        properties.validate()?;
        self.entries.push(PartEntry {
            name: properties.label.clone(),
            source: PartSource::Owned(properties),
        });
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Registers `name` as a link to `source`. Both must have the same
    /// thickness.
    pub fn append_link(
        &mut self,
        name: &str,
        solid: &Solid,
        source: &str,
    ) -> JoineryResult<&PartEntry> {
        if self.exist(name) {
            return Err(JoineryError::DuplicatePart(name.to_string()));
        }
        let source_properties = self
            .get(source)
            .ok_or_else(|| JoineryError::MissingReference(format!("No original part found ({source})")))?;
        let own = MaterialProperties::from_solid(name, solid);
        if (own.thickness - source_properties.thickness).abs() > 1e-6 {
            return Err(JoineryError::ThicknessMismatch(name.to_string()));
        }
        let source = self
            .entries
            .iter()
            .find(|e| e.name == source)
            .map(|e| match &e.source {
                PartSource::Owned(_) => e.name.clone(),
                PartSource::LinkedTo { source } => source.clone(),
            })
            .unwrap_or_else(|| source.to_string());
        self.entries.push(PartEntry {
            name: name.to_string(),
            source: PartSource::LinkedTo { source },
        });
        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn linked_parts(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| matches!(&e.source, PartSource::LinkedTo { source } if source == name))
            .map(|e| e.name.as_str())
            .collect()
    }

    pub fn remove(&mut self, name: &str) -> JoineryResult<()> {
        if !self.linked_parts(name).is_empty() {
            return Err(JoineryError::PartHasLinks(name.to_string()));
        }
        self.entries.retain(|e| e.name != name);
        Ok(())
    }

    /// Owned properties of a part, following its link.
    pub fn get(&self, name: &str) -> Option<&MaterialProperties> {
        let entry = self.entries.iter().find(|e| e.name == name)?;
        match &entry.source {
            PartSource::Owned(properties) => Some(properties),
            PartSource::LinkedTo { source } => self.get(source),
        }
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut MaterialProperties> {
        self.entries
            .iter_mut()
            .find(|e| e.name == name)
            .and_then(|e| match &mut e.source {
                PartSource::Owned(properties) => Some(properties),
                PartSource::LinkedTo { .. } => None,
            })
    }

    pub fn entries(&self) -> &[PartEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flattens links: every part gets a full copy of its source parameters
    /// with its own label and output name.
    pub fn resolve(&self) -> JoineryResult<Vec<MaterialProperties>> {
        self.entries
            .iter()
            .map(|entry| match &entry.source {
                PartSource::Owned(properties) => Ok(properties.clone()),
                PartSource::LinkedTo { source } => {
                    let mut properties = self.get(source).cloned().ok_or_else(|| {
                        JoineryError::MissingReference(format!("No original part found ({source})"))
                    })?;
                    properties.label = entry.name.clone();
                    properties.new_name = format!("{}_tab", entry.name);
                    Ok(properties)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kerfjoint_geometry::{Point3, Vector3};

    fn panel(thickness: f64) -> Solid {
        Solid::cuboid(Point3::origin(), Vector3::new(90.0, 50.0, thickness))
    }

    #[test]
    fn test_material_defaults() {
        let material = MaterialProperties::new("front", 3.0);
        assert!((material.thickness_tolerance - 0.3).abs() < 1e-12);
        assert!((material.laser_beam_diameter - 0.2).abs() < 1e-12);
        assert!((material.node_thickness - 0.15).abs() < 1e-12);
        assert_eq!(material.hole_width_tolerance, 0.0);
        assert_eq!(material.node_type, NodeType::NoNode);
        assert!(material.dog_bone);
        assert_eq!(material.new_name, "front_tab");
    }

    #[test]
    fn test_estimate_thickness_of_panel() {
        let thickness = estimate_thickness(&panel(3.0)).unwrap();
        assert!((thickness - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_estimate_thickness_of_hollow_box() {
        let outer = Solid::cuboid(Point3::origin(), Vector3::new(90.0, 50.0, 30.0));
        let inner = Solid::cuboid(Point3::new(3.0, 3.0, 3.0), Vector3::new(84.0, 44.0, 24.0));
        let thickness = estimate_thickness(&outer.cut(&inner)).unwrap();
        assert!((thickness - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_fallback_thickness_on_empty_solid() {
        let material = MaterialProperties::from_solid("ghost", &Solid::empty());
        assert_eq!(material.thickness, FALLBACK_THICKNESS);
    }

    #[test]
    fn test_parts_list_links() {
        let mut parts = PartsList::new();
        parts.append(MaterialProperties::from_solid("left", &panel(3.0))).unwrap();
        parts.append_link("right", &panel(3.0), "left").unwrap();

        let err = parts.append_link("thick", &panel(6.0), "left").unwrap_err();
        assert_eq!(err.to_string(), "thick does not have the same thickness");

        assert!(matches!(
            parts.remove("left").unwrap_err(),
            JoineryError::PartHasLinks(_)
        ));

        parts.get_mut("left").unwrap().laser_beam_diameter = 0.15;
        let resolved = parts.resolve().unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[1].label, "right");
        assert_eq!(resolved[1].new_name, "right_tab");
        assert_eq!(resolved[1].laser_beam_diameter, 0.15);

        parts.remove("right").unwrap();
        parts.remove("left").unwrap();
        assert!(parts.is_empty());
    }

    #[test]
    fn test_duplicate_part() {
        let mut parts = PartsList::new();
        parts.append(MaterialProperties::new("a", 3.0)).unwrap();
        let err = parts.append(MaterialProperties::new("a", 3.0)).unwrap_err();
        assert_eq!(err.to_string(), "a already in interactor parts list");
    }
}
