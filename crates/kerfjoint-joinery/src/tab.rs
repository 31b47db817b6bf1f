//! Tab faces, their parameters and face links.
//!
//! A tab face is one face of one panel that carries tabs. Faces are
//! registered in a [`TabsList`] either with their own parameters or as a link
//! to another face; links are flattened once by [`TabsList::resolve`] before
//! synthesis runs.

use crate::assembler::PanelMaterial;
use crate::error::{JoineryError, JoineryResult, ParameterError, ParameterResult};
use crate::ids::{GroupId, IdAllocator, TabId};
use crate::screw::get_screw_nut_spec;
use crate::slots::get_slot_positions;
use kerfjoint_geometry::{
    place_on_face, placement, resolve_frame, spun_placement, Face, LocalFrame, Matrix4, Solid,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Joint synthesized on a tab face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TabType {
    /// Rectangular finger tabs.
    Tab,
    /// Two tabs around a screw channel with a captive nut.
    #[serde(rename = "Screw")]
    TSlot,
    /// Alternating filled and empty segments over the whole face.
    Continuous,
    /// Rounded clip tab and grooved flexible tab.
    Flex,
}

impl fmt::Display for TabType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TabType::Tab => "Tab",
            TabType::TSlot => "Screw",
            TabType::Continuous => "Continuous",
            TabType::Flex => "Flex",
        };
        f.write_str(name)
    }
}

impl FromStr for TabType {
    type Err = JoineryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Tab" => Ok(TabType::Tab),
            "Screw" | "TSlot" => Ok(TabType::TSlot),
            "Continuous" => Ok(TabType::Continuous),
            "Flex" => Ok(TabType::Flex),
            other => Err(JoineryError::UnknownTabType(other.to_string())),
        }
    }
}

/// Layout and fastening parameters of a tab face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabParameters {
    /// Tab count, or element count for continuous joints.
    pub tabs_number: u32,
    pub tabs_width: f64,
    pub tabs_shift: f64,
    pub interval_ratio: f64,
    /// T-slot tab distance from the screw, in screw diameters.
    pub half_tab_ratio: f64,
    pub screw_diameter: f64,
    pub screw_length: f64,
    pub screw_length_tolerance: f64,
    pub dog_bone: bool,
    /// Mirror the layout along the face width.
    pub y_invert: bool,
}

impl Default for TabParameters {
    fn default() -> Self {
        Self {
            tabs_number: 1,
            tabs_width: 10.0,
            tabs_shift: 0.0,
            interval_ratio: 1.0,
            half_tab_ratio: 1.0,
            screw_diameter: 3.0,
            screw_length: 15.0,
            screw_length_tolerance: 0.0,
            dog_bone: true,
            y_invert: false,
        }
    }
}

impl TabParameters {
    pub fn validate(&self, tab_type: TabType) -> ParameterResult<()> {
        let min_number = if tab_type == TabType::Continuous { 2 } else { 1 };
        if self.tabs_number < min_number {
            return Err(ParameterError::OutOfRange {
                name: "tabs_number".to_string(),
                value: f64::from(self.tabs_number),
                min: f64::from(min_number),
                max: f64::from(u32::MAX),
            });
        }
        if tab_type != TabType::Continuous && (self.tabs_width.is_nan() || self.tabs_width <= 0.0) {
            return Err(ParameterError::InvalidDimensions(format!(
                "tabs_width must be > 0, got {}",
                self.tabs_width
            )));
        }
        if !(0.1..=5.0).contains(&self.interval_ratio) {
            return Err(ParameterError::OutOfRange {
                name: "interval_ratio".to_string(),
                value: self.interval_ratio,
                min: 0.1,
                max: 5.0,
            });
        }
        if tab_type == TabType::TSlot {
            if self.half_tab_ratio <= 0.0 {
                return Err(ParameterError::InvalidValue {
                    name: "half_tab_ratio".to_string(),
                    reason: "must be > 0".to_string(),
                });
            }
            if get_screw_nut_spec(self.screw_diameter, self.screw_length).is_err() {
                return Err(ParameterError::InvalidValue {
                    name: "screw_diameter".to_string(),
                    reason: format!("no nut size for M{}", self.screw_diameter),
                });
            }
            if self.screw_length <= 0.0 {
                return Err(ParameterError::InvalidDimensions(
                    "screw_length must be > 0".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Where a tab face takes its parameters from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TabSource {
    Owned {
        tab_type: TabType,
        params: TabParameters,
    },
    /// Reuses the source face parameters. Only the orientation is local.
    LinkedTo { source: TabId, y_invert: bool },
}

/// A registered face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabEntry {
    pub id: TabId,
    pub group_id: GroupId,
    pub panel: String,
    pub face_index: usize,
    pub source: TabSource,
}

impl TabEntry {
    pub fn face_name(&self) -> String {
        face_name(&self.panel, self.face_index)
    }

    pub fn is_link(&self) -> bool {
        matches!(self.source, TabSource::LinkedTo { .. })
    }
}

pub fn face_name(panel: &str, face_index: usize) -> String {
    format!("{}.Face{}", panel, face_index + 1)
}

/// Fully resolved tab face, ready for synthesis.
#[derive(Debug, Clone)]
pub struct TabProperties {
    pub id: TabId,
    pub group_id: GroupId,
    pub panel: String,
    pub face_index: usize,
    pub face: Face,
    pub frame: LocalFrame,
    /// Face width along the local Y axis.
    pub y_length: f64,
    /// Face short edge, the panel thickness.
    pub thickness: f64,
    pub tab_type: TabType,
    pub params: TabParameters,
    /// Source face when this one is a link.
    pub link: Option<TabId>,
}

impl TabProperties {
    pub fn from_face(
        entry: &TabEntry,
        face: Face,
        tab_type: TabType,
        params: TabParameters,
        link: Option<TabId>,
    ) -> JoineryResult<Self> {
        let frame = resolve_frame(&face)?;
        Ok(Self {
            id: entry.id,
            group_id: entry.group_id,
            panel: entry.panel.clone(),
            face_index: entry.face_index,
            y_length: frame.width(),
            thickness: frame.thickness(),
            face,
            frame,
            tab_type,
            params,
            link,
        })
    }

    pub fn name(&self) -> String {
        face_name(&self.panel, self.face_index)
    }

    /// Tab centers along the face, mirrored when `y_invert` is set.
    pub fn slot_positions(&self) -> Vec<f64> {
        let positions = get_slot_positions(
            self.y_length,
            self.params.tabs_number,
            self.params.tabs_shift,
            self.params.interval_ratio,
        );
        if self.params.y_invert {
            positions.into_iter().map(|y| -y).collect()
        } else {
            positions
        }
    }

    pub fn placement(&self, x_origin: f64) -> Matrix4<f64> {
        placement(&self.face, &self.frame, x_origin)
    }

    /// Placement that mirrors the local Y axis when `y_invert` is set.
    pub fn oriented_placement(&self, x_origin: f64) -> Matrix4<f64> {
        if self.params.y_invert {
            spun_placement(&self.face, &self.frame, x_origin)
        } else {
            self.placement(x_origin)
        }
    }

    /// Moves a feature modelled in the face frame onto the face.
    pub fn place(&self, feature: &Solid, x_origin: f64) -> Solid {
        place_on_face(feature, &self.face, &self.frame, x_origin)
    }
}

/// Tab faces of one session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TabsList {
    entries: Vec<TabEntry>,
}

fn measured_thickness(solid: &Solid, face_index: usize) -> JoineryResult<f64> {
    let face = solid.face(face_index)?;
    Ok(resolve_frame(&face)?.thickness())
}

impl TabsList {
    pub fn new() -> Self {
        Self::default()
    }

    fn exist(&self, panel: &str, face_index: usize) -> bool {
        self.entries
            .iter()
            .any(|e| e.panel == panel && e.face_index == face_index)
    }

    /// Registers a face with its own parameters. The face must resolve to a
    /// local frame.
    pub fn append(
        &mut self,
        ids: &mut IdAllocator,
        panel: &str,
        solid: &Solid,
        face_index: usize,
        tab_type: TabType,
    ) -> JoineryResult<TabId> {
        if self.exist(panel, face_index) {
            return Err(JoineryError::DuplicateTab(face_name(panel, face_index)));
        }
        measured_thickness(solid, face_index)?;
        let entry = TabEntry {
            id: ids.next_tab_id(),
            group_id: ids.next_group_id(),
            panel: panel.to_string(),
            face_index,
            source: TabSource::Owned {
                tab_type,
                params: TabParameters::default(),
            },
        };
        let id = entry.id;
        tracing::debug!("Registered {} as {} ({})", entry.face_name(), id, tab_type);
        self.entries.push(entry);
        Ok(id)
    }

    /// Registers a face reusing the parameters of `source`. Both faces must
    /// have the same thickness; the new face joins the source group.
    pub fn append_link(
        &mut self,
        ids: &mut IdAllocator,
        panel: &str,
        solid: &Solid,
        face_index: usize,
        source: TabId,
        source_solid: &Solid,
    ) -> JoineryResult<TabId> {
        if self.exist(panel, face_index) {
            return Err(JoineryError::DuplicateTab(face_name(panel, face_index)));
        }
        let source_entry = self.owner_of(source)?;
        let (source_id, group_id, source_face) =
            (source_entry.id, source_entry.group_id, source_entry.face_index);

        let own = measured_thickness(solid, face_index)?;
        let reference = measured_thickness(source_solid, source_face)?;
        if (own - reference).abs() > 1e-6 {
            return Err(JoineryError::ThicknessMismatch(face_name(panel, face_index)));
        }

        let entry = TabEntry {
            id: ids.next_tab_id(),
            group_id,
            panel: panel.to_string(),
            face_index,
            source: TabSource::LinkedTo {
                source: source_id,
                y_invert: false,
            },
        };
        let id = entry.id;
        self.entries.push(entry);
        Ok(id)
    }

    /// Inserts an entry restored from storage.
    pub fn restore(&mut self, ids: &mut IdAllocator, entry: TabEntry) -> JoineryResult<()> {
        if self.exist(&entry.panel, entry.face_index) {
            return Err(JoineryError::DuplicateTab(entry.face_name()));
        }
        ids.reserve(entry.id, entry.group_id);
        self.entries.push(entry);
        Ok(())
    }

    /// Follows a link to the entry that owns the parameters.
    fn owner_of(&self, id: TabId) -> JoineryResult<&TabEntry> {
        let entry = self
            .get(id)
            .ok_or_else(|| JoineryError::MissingReference(format!("No original tab found ({id})")))?;
        match &entry.source {
            TabSource::Owned { .. } => Ok(entry),
            TabSource::LinkedTo { source, .. } => self.owner_of(*source),
        }
    }

    pub fn get(&self, id: TabId) -> Option<&TabEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn linked_tabs(&self, id: TabId) -> Vec<TabId> {
        self.entries
            .iter()
            .filter(|e| matches!(e.source, TabSource::LinkedTo { source, .. } if source == id))
            .map(|e| e.id)
            .collect()
    }

    pub fn remove(&mut self, id: TabId) -> JoineryResult<()> {
        if !self.linked_tabs(id).is_empty() {
            let name = self.get(id).map(|e| e.face_name()).unwrap_or_default();
            return Err(JoineryError::TabHasLinks(name));
        }
        self.entries.retain(|e| e.id != id);
        Ok(())
    }

    /// Mutable parameters of an owned face. Links have none.
    pub fn params_mut(&mut self, id: TabId) -> Option<&mut TabParameters> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .and_then(|e| match &mut e.source {
                TabSource::Owned { params, .. } => Some(params),
                TabSource::LinkedTo { .. } => None,
            })
    }

    /// Sets the orientation override of a face, owned or linked.
    pub fn set_y_invert(&mut self, id: TabId, invert: bool) -> JoineryResult<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| JoineryError::MissingReference(id.to_string()))?;
        match &mut entry.source {
            TabSource::Owned { params, .. } => params.y_invert = invert,
            TabSource::LinkedTo { y_invert, .. } => *y_invert = invert,
        }
        Ok(())
    }

    pub fn entries(&self) -> &[TabEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flattens links and resolves every face on its panel. Parameters are
    /// validated here, before any joinery geometry is built.
    pub fn resolve(&self, panels: &[PanelMaterial]) -> JoineryResult<Vec<TabProperties>> {
        self.entries
            .iter()
            .map(|entry| {
                let (tab_type, params, link) = match &entry.source {
                    TabSource::Owned { tab_type, params } => (*tab_type, params.clone(), None),
                    TabSource::LinkedTo { source, y_invert } => {
                        let owner = self.owner_of(*source)?;
                        match &owner.source {
                            TabSource::Owned { tab_type, params } => {
                                let mut params = params.clone();
                                params.y_invert = *y_invert;
                                (*tab_type, params, Some(owner.id))
                            }
                            TabSource::LinkedTo { .. } => {
                                return Err(JoineryError::MissingReference(format!(
                                    "{} links to another link",
                                    entry.face_name()
                                )))
                            }
                        }
                    }
                };
                params.validate(tab_type)?;

                let panel = panels
                    .iter()
                    .find(|p| p.name == entry.panel)
                    .ok_or_else(|| JoineryError::MissingReference(entry.panel.clone()))?;
                let face = panel.solid.face(entry.face_index)?;
                TabProperties::from_face(entry, face, tab_type, params, link)
            })
            .collect()
    }
}
