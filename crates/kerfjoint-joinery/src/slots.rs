//! Tab layout along a face.
//!
//! Positions are offsets along the local Y axis of a face, measured from the
//! face centroid.

/// Centers of `count` tabs spread over `width`.
///
/// An odd count puts one tab on the center and pairs the rest around it, an
/// even count pairs every tab around the center with a half interval offset.
/// `interval_ratio` scales the spacing, `shift` moves the whole layout.
pub fn get_slot_positions(width: f64, count: u32, shift: f64, interval_ratio: f64) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    let interval = width / f64::from(count);
    let half = count / 2;
    let mut positions = Vec::with_capacity(count as usize);

    if count % 2 == 1 {
        positions.push(shift);
        for i in 0..half {
            let offset = f64::from(i + 1) * interval * interval_ratio;
            positions.push(offset + shift);
            positions.push(-offset + shift);
        }
    } else {
        for i in 0..half {
            let offset = (f64::from(i) * interval + interval / 2.0) * interval_ratio;
            positions.push(offset + shift);
            positions.push(-offset + shift);
        }
    }
    positions
}

/// One virtual tab of a continuous joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualTab {
    pub center: f64,
    pub length: f64,
    /// Even segments carry material, odd ones are gaps.
    pub filled: bool,
    pub left_kerf: bool,
    pub right_kerf: bool,
}

/// Splits a face of width `y_length` into `count` equal virtual tabs.
///
/// The first segment starts at the open end of the face, so it gets no left
/// kerf; the last one gets no right kerf.
pub fn continuous_segments(y_length: f64, count: u32) -> Vec<VirtualTab> {
    if count == 0 {
        return Vec::new();
    }
    let length = y_length / f64::from(count);
    (0..count)
        .map(|i| VirtualTab {
            center: -y_length / 2.0 + length / 2.0 + f64::from(i) * length,
            length,
            filled: i % 2 == 0,
            left_kerf: i != 0,
            right_kerf: i != count - 1,
        })
        .collect()
}
