//! Tab joinery synthesis over a set of panels.
//!
//! Every tab face walks its tab positions; for each position the other
//! panels are tried in input order and the first one the tab overlaps gets
//! the matching hole. Positions that meet no panel are skipped.

use crate::assembler::{MaterialElement, PanelMaterial};
use crate::config::JoineryConfig;
use crate::error::{JoineryError, JoineryResult};
use crate::features::{
    check_intersect, hole_on_plane, screw_way_on_face, screw_way_on_plane, tab_on_face,
    transform_feature,
};
use crate::flex::make_flex_tab_join;
use crate::screw::get_screw_nut_spec;
use crate::slots::continuous_segments;
use crate::tab::{TabProperties, TabType};

/// A tab of `width` at `pos_y` against the first panel it overlaps.
#[allow(clippy::too_many_arguments)]
fn join_single_tab(
    tab: &TabProperties,
    tab_index: usize,
    others: &[usize],
    elements: &mut [MaterialElement],
    width: f64,
    pos_y: f64,
    left_kerf: bool,
    right_kerf: bool,
    config: &JoineryConfig,
) -> bool {
    let face_material = elements[tab_index].properties().clone();
    for &other in others {
        let plane = &elements[other].panel;
        let feature = tab_on_face(
            &face_material,
            &plane.properties,
            width,
            pos_y,
            left_kerf,
            right_kerf,
        );
        let (intersect, placed) = check_intersect(&feature, tab, plane, config);
        if intersect {
            let hole = hole_on_plane(
                tab,
                width,
                pos_y,
                &face_material,
                plane,
                left_kerf,
                right_kerf,
                tab.params.dog_bone,
                config,
            );
            let hole = transform_feature(&hole, tab, plane.thickness());
            elements[tab_index].add(placed);
            elements[other].remove(hole);
            return true;
        }
    }
    false
}

pub fn make_tab_join(
    tab: &TabProperties,
    tab_index: usize,
    others: &[usize],
    elements: &mut [MaterialElement],
    config: &JoineryConfig,
) {
    for y in tab.slot_positions() {
        let width = tab.params.tabs_width;
        if !join_single_tab(tab, tab_index, others, elements, width, y, true, true, config) {
            tracing::debug!("No panel meets the tab at {:.3} on {}", y, tab.name());
        }
    }
}

/// Tab count is the number of elements along the face; even elements carry
/// material.
pub fn make_continuous_tab_joins(
    tab: &TabProperties,
    tab_index: usize,
    others: &[usize],
    elements: &mut [MaterialElement],
    config: &JoineryConfig,
) {
    for segment in continuous_segments(tab.y_length, tab.params.tabs_number) {
        if !segment.filled {
            continue;
        }
        // mirrored layout swaps which side of each segment is open
        let (y, left, right) = if tab.params.y_invert {
            (-segment.center, segment.right_kerf, segment.left_kerf)
        } else {
            (segment.center, segment.left_kerf, segment.right_kerf)
        };
        if !join_single_tab(
            tab,
            tab_index,
            others,
            elements,
            segment.length,
            y,
            left,
            right,
            config,
        ) {
            tracing::debug!("No panel meets the segment at {:.3} on {}", y, tab.name());
        }
    }
}

/// Two tabs around each screw, the screw channel with its nut pocket in the
/// tab panel and the clearance hole in the opposing panel.
pub fn make_tslot_tab_join(
    tab: &TabProperties,
    tab_index: usize,
    others: &[usize],
    elements: &mut [MaterialElement],
    config: &JoineryConfig,
) -> JoineryResult<()> {
    let params = &tab.params;
    let half_tab_distance = params.screw_diameter * params.half_tab_ratio + params.tabs_width / 2.0;
    let screw_nut = get_screw_nut_spec(params.screw_diameter, params.screw_length)?;
    let face_material = elements[tab_index].properties().clone();

    for y in tab.slot_positions() {
        let mut joined = false;
        for &other in others {
            let plane = &elements[other].panel;
            let (left_y, right_y) = (y - half_tab_distance, y + half_tab_distance);
            let left = tab_on_face(&face_material, &plane.properties, params.tabs_width, left_y, true, true);
            let right = tab_on_face(&face_material, &plane.properties, params.tabs_width, right_y, true, true);
            let (right_hit, right_placed) = check_intersect(&right, tab, plane, config);
            let (left_hit, left_placed) = check_intersect(&left, tab, plane, config);
            if !(left_hit || right_hit) {
                continue;
            }

            let mut plane_cuts = Vec::with_capacity(3);
            for pos in [left_y, right_y] {
                let hole = hole_on_plane(
                    tab,
                    params.tabs_width,
                    pos,
                    &face_material,
                    plane,
                    true,
                    true,
                    params.dog_bone,
                    config,
                );
                plane_cuts.push(transform_feature(&hole, tab, plane.thickness()));
            }
            let face_way = screw_way_on_face(
                &face_material,
                &plane.properties,
                &screw_nut,
                params.screw_length_tolerance,
                y,
                params.dog_bone,
                config,
            );
            let face_way = transform_feature(&face_way, tab, plane.thickness());
            let plane_way = screw_way_on_plane(&plane.properties, &screw_nut, y, config);
            plane_cuts.push(transform_feature(&plane_way, tab, plane.thickness()));

            let tab_element = &mut elements[tab_index];
            tab_element.add(left_placed);
            tab_element.add(right_placed);
            tab_element.remove(face_way);
            for cut in plane_cuts {
                elements[other].remove(cut);
            }
            joined = true;
            break;
        }
        if !joined {
            tracing::debug!("No panel meets the screw at {:.3} on {}", y, tab.name());
        }
    }
    Ok(())
}

/// Runs tab synthesis for every tab face and returns one element per panel,
/// in input order, with its features collected.
///
/// All inputs are checked before any geometry is built; a failure aborts the
/// whole run.
pub fn make_tabs_joins(
    parts: Vec<PanelMaterial>,
    tabs: &[TabProperties],
    config: &JoineryConfig,
) -> JoineryResult<Vec<MaterialElement>> {
    for part in &parts {
        part.properties.validate()?;
    }
    let mut owners = Vec::with_capacity(tabs.len());
    for tab in tabs {
        tab.params.validate(tab.tab_type)?;
        let index = parts
            .iter()
            .position(|p| p.name == tab.panel)
            .ok_or_else(|| JoineryError::MissingReference(tab.panel.clone()))?;
        owners.push(index);
    }

    let mut elements: Vec<MaterialElement> = parts.into_iter().map(MaterialElement::new).collect();

    for (tab, &tab_index) in tabs.iter().zip(owners.iter()) {
        let group_panels: Vec<&str> = tabs
            .iter()
            .filter(|t| t.group_id == tab.group_id)
            .map(|t| t.panel.as_str())
            .collect();
        let others: Vec<usize> = elements
            .iter()
            .enumerate()
            .filter(|(i, e)| *i != tab_index && !group_panels.contains(&e.name()))
            .map(|(i, _)| i)
            .collect();

        tracing::debug!(
            "{} {} on {} against {} panels",
            tab.tab_type,
            tab.id,
            tab.name(),
            others.len()
        );
        match tab.tab_type {
            TabType::Tab => make_tab_join(tab, tab_index, &others, &mut elements, config),
            TabType::TSlot => make_tslot_tab_join(tab, tab_index, &others, &mut elements, config)?,
            TabType::Continuous => {
                make_continuous_tab_joins(tab, tab_index, &others, &mut elements, config)
            }
            TabType::Flex => make_flex_tab_join(tab, tab_index, &others, &mut elements, config)?,
        }
    }
    Ok(elements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::IdAllocator;
    use crate::material::MaterialProperties;
    use crate::tab::TabsList;
    use kerfjoint_geometry::{Point3, Solid, Vector3};

    /// Floor 100 x 50 x 3 with a 100 x 3 x 30 wall standing on its back edge.
    fn corner() -> Vec<PanelMaterial> {
        let floor = Solid::cuboid(Point3::origin(), Vector3::new(100.0, 50.0, 3.0));
        let wall = Solid::cuboid(Point3::new(0.0, 47.0, 3.0), Vector3::new(100.0, 3.0, 30.0));
        vec![
            PanelMaterial::new("floor", floor, MaterialProperties::new("floor", 3.0)),
            PanelMaterial::new("wall", wall, MaterialProperties::new("wall", 3.0)),
        ]
    }

    fn bottom_face(panel: &PanelMaterial) -> usize {
        panel
            .solid
            .faces()
            .iter()
            .position(|f| (f.normal() + Vector3::z()).norm() < 1e-9)
            .unwrap()
    }

    #[test]
    fn test_tabs_go_into_floor() {
        let parts = corner();
        let mut ids = IdAllocator::new();
        let mut list = TabsList::new();
        let face = bottom_face(&parts[1]);
        let id = list.append(&mut ids, "wall", &parts[1].solid, face, TabType::Tab).unwrap();
        list.params_mut(id).unwrap().tabs_number = 3;
        let tabs = list.resolve(&parts).unwrap();

        let elements = make_tabs_joins(parts, &tabs, &JoineryConfig::default()).unwrap();
        assert_eq!(elements[1].to_add().len(), 3);
        assert_eq!(elements[0].to_remove().len(), 3);

        let wall = elements[1].get_shape();
        assert!((wall.bounding_box().z_min - 0.0).abs() < 1e-9);
        let floor = elements[0].get_shape();
        assert!(floor.volume() < 100.0 * 50.0 * 3.0 - 3.0 * 3.0 * 9.0);
    }

    #[test]
    fn test_tab_without_opposing_panel_is_skipped() {
        let parts = corner();
        let mut ids = IdAllocator::new();
        let mut list = TabsList::new();
        let top = parts[1]
            .solid
            .faces()
            .iter()
            .position(|f| (f.normal() - Vector3::z()).norm() < 1e-9)
            .unwrap();
        list.append(&mut ids, "wall", &parts[1].solid, top, TabType::Tab).unwrap();
        let tabs = list.resolve(&parts).unwrap();
        let elements = make_tabs_joins(parts, &tabs, &JoineryConfig::default()).unwrap();
        assert!(elements.iter().all(|e| e.to_add().is_empty() && e.to_remove().is_empty()));
    }

    #[test]
    fn test_missing_panel_fails_before_geometry() {
        let parts = corner();
        let mut ids = IdAllocator::new();
        let mut list = TabsList::new();
        let face = bottom_face(&parts[1]);
        list.append(&mut ids, "wall", &parts[1].solid, face, TabType::Tab).unwrap();
        let tabs = list.resolve(&parts).unwrap();
        let err = make_tabs_joins(vec![parts[0].clone()], &tabs, &JoineryConfig::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing reference: wall");
    }
}
