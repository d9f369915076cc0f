/// Data-Oriented 2D Axis-Aligned Bounding Boxes
///
/// Pure functions over plain data, used by the sweep-and-prune broad phase.

use glam::Vec2;

/// Axis-aligned bounding box tagged with the index of its source object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,

    /// Index of the object in the caller's array
    pub obj_idx: usize,
}

/// Create AABB enclosing a circle
pub fn aabb_from_circle(center: Vec2, radius: f32, obj_idx: usize) -> Aabb {
    Aabb {
        min_x: center.x - radius,
        max_x: center.x + radius,
        min_y: center.y - radius,
        max_y: center.y + radius,
        obj_idx,
    }
}

/// Interval overlap on the sweep axis, touching edges included
pub fn aabb_overlaps_x(a: &Aabb, b: &Aabb) -> bool {
    a.min_x <= b.max_x && b.min_x <= a.max_x
}

/// Interval overlap on the pruning axis, touching edges included
pub fn aabb_overlaps_y(a: &Aabb, b: &Aabb) -> bool {
    a.min_y <= b.max_y && b.min_y <= a.max_y
}

/// Test if two AABBs intersect on both axes
pub fn aabb_intersects(a: &Aabb, b: &Aabb) -> bool {
    aabb_overlaps_x(a, b) && aabb_overlaps_y(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_circle() {
        let aabb = aabb_from_circle(Vec2::new(10.0, -4.0), 2.0, 5);
        assert_eq!(aabb.min_x, 8.0);
        assert_eq!(aabb.max_x, 12.0);
        assert_eq!(aabb.min_y, -6.0);
        assert_eq!(aabb.max_y, -2.0);
        assert_eq!(aabb.obj_idx, 5);
    }

    #[test]
    fn test_touching_boxes_intersect() {
        let a = aabb_from_circle(Vec2::splat(0.5), 0.5, 0);
        let b = aabb_from_circle(Vec2::splat(1.5), 0.5, 1);
        assert!(aabb_intersects(&a, &b));
        assert!(aabb_intersects(&b, &a));
    }

    #[test]
    fn test_overlap_on_one_axis_only() {
        let a = aabb_from_circle(Vec2::splat(0.5), 0.5, 0);
        let b = aabb_from_circle(Vec2::new(1.0, 3.5), 0.5, 1);
        assert!(aabb_overlaps_x(&a, &b));
        assert!(!aabb_overlaps_y(&a, &b));
        assert!(!aabb_intersects(&a, &b));
    }
}
