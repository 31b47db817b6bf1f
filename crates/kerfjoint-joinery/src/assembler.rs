//! Panel assembly: base solid plus added features minus removed features.

use crate::material::MaterialProperties;
use kerfjoint_geometry::Solid;

/// A panel solid with its material parameters.
#[derive(Debug, Clone)]
pub struct PanelMaterial {
    pub name: String,
    pub solid: Solid,
    pub properties: MaterialProperties,
}

impl PanelMaterial {
    pub fn new(name: impl Into<String>, solid: Solid, properties: MaterialProperties) -> Self {
        Self {
            name: name.into(),
            solid,
            properties,
        }
    }

    /// Panel with default properties and the thickness measured on the solid.
    pub fn from_solid(name: impl Into<String>, solid: Solid) -> Self {
        let name = name.into();
        let properties = MaterialProperties::from_solid(name.clone(), &solid);
        Self {
            name,
            solid,
            properties,
        }
    }

    pub fn thickness(&self) -> f64 {
        self.properties.thickness
    }
}

/// Fuses a list of solids left to right. `None` for an empty list.
pub fn assemble_list_element(elements: &[Solid]) -> Option<Solid> {
    let (first, rest) = elements.split_first()?;
    Some(rest.iter().fold(first.clone(), |acc, el| acc.fuse(el)))
}

/// One panel during a joinery run, collecting the features to add and to
/// remove. The lists belong to this panel only.
#[derive(Debug, Clone)]
pub struct MaterialElement {
    pub panel: PanelMaterial,
    to_add: Vec<Solid>,
    to_remove: Vec<Solid>,
}

impl MaterialElement {
    pub fn new(panel: PanelMaterial) -> Self {
        Self {
            panel,
            to_add: Vec::new(),
            to_remove: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.panel.name
    }

    pub fn new_name(&self) -> &str {
        &self.panel.properties.new_name
    }

    pub fn properties(&self) -> &MaterialProperties {
        &self.panel.properties
    }

    pub fn add(&mut self, feature: Solid) {
        self.to_add.push(feature);
    }

    pub fn remove(&mut self, feature: Solid) {
        self.to_remove.push(feature);
    }

    pub fn to_add(&self) -> &[Solid] {
        &self.to_add
    }

    pub fn to_remove(&self) -> &[Solid] {
        &self.to_remove
    }

    pub fn reset_add_remove(&mut self) {
        self.to_add.clear();
        self.to_remove.clear();
    }

    /// Final panel shape: base fused with every added feature, then cut by
    /// every removed feature.
    pub fn get_shape(&self) -> Solid {
        let mut shape = self.panel.solid.clone();
        if let Some(added) = assemble_list_element(&self.to_add) {
            shape = shape.fuse(&added);
        }
        if let Some(removed) = assemble_list_element(&self.to_remove) {
            shape = shape.cut(&removed);
        }
        shape
    }

    /// Preview shape. Added features are concatenated without a boolean
    /// union, so overlapping additions give an invalid solid. Not for output.
    pub fn get_shape_fast(&self) -> Solid {
        let mut shape = if self.to_add.is_empty() {
            self.panel.solid.clone()
        } else {
            Solid::compound(std::iter::once(&self.panel.solid).chain(self.to_add.iter()))
        };
        if !self.to_remove.is_empty() {
            shape = shape.cut(&Solid::compound(self.to_remove.iter()));
        }
        shape
    }
}
