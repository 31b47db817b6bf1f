//! Named solids shared by the sessions.

use kerfjoint_geometry::Solid;

/// Ordered collection of named solids. Insertion order is kept; adding an
/// existing name replaces the solid in place.
#[derive(Debug, Clone, Default)]
pub struct ShapeDocument {
    objects: Vec<(String, Solid)>,
}

impl ShapeDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object(&mut self, name: impl Into<String>, solid: Solid) {
        let name = name.into();
        match self.objects.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = solid,
            None => self.objects.push((name, solid)),
        }
    }

    pub fn remove_object(&mut self, name: &str) -> Option<Solid> {
        let index = self.objects.iter().position(|(n, _)| n == name)?;
        Some(self.objects.remove(index).1)
    }

    pub fn get(&self, name: &str) -> Option<&Solid> {
        self.objects.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.objects.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Solid)> {
        self.objects.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
