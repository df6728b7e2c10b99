//! Layout engine: maps a forest onto a vertical spine with alternating
//! main branches and sub-branches hanging off each branch midpoint.
//!
//! Angles are in degrees, 0° along +x, measured clockwise because y grows
//! downward. Only depth 1 (main bones) and depth 2 (sub bones) are placed;
//! deeper descendants are not part of the picture.
//!
//! The output depends on nothing but the forest and the viewport, so equal
//! inputs give bit-identical geometry.

use serde::Serialize;
use tracing::instrument;

use crate::domain::entities::Bone;

/// Inset of the spine from the top and bottom of the viewport.
pub const SPINE_MARGIN: f64 = 80.0;
pub const BONE_LENGTH: f64 = 100.0;
pub const CHILD_BONE_LENGTH: f64 = 60.0;
/// Vertical distance between neighbouring main bones on the spine.
pub const BONE_GAP: f64 = 90.0;
pub const LABEL_OFFSET: f64 = 20.0;
pub const VERTICAL_OFFSET: f64 = 12.0;
pub const CHILD_LABEL_OFFSET: f64 = 8.0;
pub const HEAD_HALF_WIDTH: f64 = 20.0;
pub const HEAD_HEIGHT: f64 = 30.0;

const LEFT_ANGLE: f64 = 135.0;
const RIGHT_ANGLE: f64 = 45.0;
const CHILD_SPREAD: f64 = 45.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point `distance` away along `angle_deg`.
    fn offset(self, angle_deg: f64, distance: f64) -> Self {
        let rad = angle_deg.to_radians();
        Self {
            x: self.x + rad.cos() * distance,
            y: self.y + rad.sin() * distance,
        }
    }

    fn midpoint(self, other: Self) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    End,
}

impl TextAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub text: String,
    pub anchor: Point,
    /// Rotation around `anchor`, degrees clockwise
    pub rotation_deg: f64,
    pub text_anchor: TextAnchor,
}

/// Container size in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(900.0, 600.0)
    }
}

/// Depth-2 bone drawn off its parent's midpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubBranch {
    pub bone_id: String,
    pub angle_deg: f64,
    pub segment: Segment,
    pub label: Label,
}

/// Depth-1 bone drawn off the spine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MainBranch {
    pub bone_id: String,
    pub angle_deg: f64,
    /// Even-indexed bones go left
    pub left: bool,
    pub segment: Segment,
    pub label: Label,
    pub sub_branches: Vec<SubBranch>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramLayout {
    pub viewport: Viewport,
    pub spine: Segment,
    /// Arrowhead polygon at the top of the spine
    pub head: [Point; 3],
    pub branches: Vec<MainBranch>,
}

impl DiagramLayout {
    /// Vertical middle of the spine, the reference for bone placement.
    pub fn spine_center_y(&self) -> f64 {
        (self.spine.start.y + self.spine.end.y) / 2.0
    }
}

/// Compute the full layout from scratch.
#[instrument(level = "debug", skip(forest), fields(bones = forest.len()))]
pub fn compute_layout(forest: &[Bone], viewport: Viewport) -> DiagramLayout {
    let spine_x = viewport.width / 2.0;
    let spine_start_y = SPINE_MARGIN;
    let spine_end_y = viewport.height - SPINE_MARGIN;
    let center_y = spine_start_y + (spine_end_y - spine_start_y) / 2.0;

    let head = [
        Point::new(spine_x - HEAD_HALF_WIDTH, spine_start_y + HEAD_HEIGHT),
        Point::new(spine_x, spine_start_y),
        Point::new(spine_x + HEAD_HALF_WIDTH, spine_start_y + HEAD_HEIGHT),
    ];

    let branches = forest
        .iter()
        .enumerate()
        .map(|(idx, bone)| {
            let anchor = Point::new(spine_x, bone_y(idx, forest.len(), center_y));
            main_branch(bone, anchor, idx % 2 == 0)
        })
        .collect();

    DiagramLayout {
        viewport,
        spine: Segment {
            start: Point::new(spine_x, spine_start_y),
            end: Point::new(spine_x, spine_end_y),
        },
        head,
        branches,
    }
}

/// Spine y for main bone `idx` of `count`, centred on `center_y`.
pub fn bone_y(idx: usize, count: usize, center_y: f64) -> f64 {
    if count <= 1 {
        return center_y;
    }
    let i = idx as f64;
    if count % 2 == 1 {
        let mid = (count / 2) as f64;
        center_y + (i - mid) * BONE_GAP
    } else {
        let mid = (count / 2) as f64;
        if i < mid {
            center_y - (mid - i - 0.5) * BONE_GAP
        } else {
            center_y + (i - mid + 0.5) * BONE_GAP
        }
    }
}

fn main_branch(bone: &Bone, start: Point, left: bool) -> MainBranch {
    let angle = if left { LEFT_ANGLE } else { RIGHT_ANGLE };
    let end = start.offset(angle, BONE_LENGTH);

    let near = start.offset(angle, LABEL_OFFSET);
    let label = Label {
        text: bone.name.clone(),
        anchor: Point::new(near.x, near.y - VERTICAL_OFFSET),
        rotation_deg: if left { -45.0 } else { 45.0 },
        text_anchor: if left { TextAnchor::End } else { TextAnchor::Start },
    };

    let mid = start.midpoint(end);
    let sub_branches = bone
        .children
        .iter()
        .enumerate()
        .map(|(idx, child)| sub_branch(child, mid, angle, idx))
        .collect();

    MainBranch {
        bone_id: bone.id.clone(),
        angle_deg: angle,
        left,
        segment: Segment { start, end },
        label,
        sub_branches,
    }
}

fn sub_branch(child: &Bone, start: Point, parent_angle: f64, idx: usize) -> SubBranch {
    let spread = if idx % 2 == 0 { -CHILD_SPREAD } else { CHILD_SPREAD };
    let angle = parent_angle + spread;
    let end = start.offset(angle, CHILD_BONE_LENGTH);

    // label sits beside the tip, perpendicular to the segment
    let anchor = end.offset(angle + 90.0, CHILD_LABEL_OFFSET);

    SubBranch {
        bone_id: child.id.clone(),
        angle_deg: angle,
        segment: Segment { start, end },
        label: Label {
            text: child.name.clone(),
            anchor,
            rotation_deg: angle,
            text_anchor: anchor_for_angle(angle),
        },
    }
}

/// `Start` when the direction points into the right half-plane.
pub fn anchor_for_angle(angle_deg: f64) -> TextAnchor {
    let normalized = angle_deg.rem_euclid(360.0);
    if normalized < 90.0 || normalized > 270.0 {
        TextAnchor::Start
    } else {
        TextAnchor::End
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_angles_when_choosing_anchor_then_right_half_plane_starts() {
        assert_eq!(anchor_for_angle(0.0), TextAnchor::Start);
        assert_eq!(anchor_for_angle(90.0), TextAnchor::End);
        assert_eq!(anchor_for_angle(180.0), TextAnchor::End);
        assert_eq!(anchor_for_angle(-45.0), TextAnchor::Start);
        assert_eq!(anchor_for_angle(270.0), TextAnchor::End);
    }

    #[test]
    fn given_three_bones_when_placing_then_middle_one_is_centered() {
        assert_eq!(bone_y(1, 3, 300.0), 300.0);
        assert_eq!(bone_y(0, 3, 300.0), 210.0);
        assert_eq!(bone_y(2, 3, 300.0), 390.0);
    }

    #[test]
    fn given_four_bones_when_placing_then_half_gap_around_center() {
        assert_eq!(bone_y(0, 4, 300.0), 165.0);
        assert_eq!(bone_y(1, 4, 300.0), 255.0);
        assert_eq!(bone_y(2, 4, 300.0), 345.0);
        assert_eq!(bone_y(3, 4, 300.0), 435.0);
    }
}
