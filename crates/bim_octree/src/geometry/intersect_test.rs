use super::*;

fn face(points: &[[f64; 3]]) -> Face3 {
  Face3::new(points.iter().map(|&p| DVec3::from_array(p)).collect())
}

fn unit_cube() -> BoundingBox3 {
  BoundingBox3::new(DVec3::ZERO, DVec3::splat(1.0))
}

/// Diagonal triangle x + y + z = d, clipped to the positive octant.
fn diagonal(d: f64) -> Face3 {
  face(&[[d, 0.0, 0.0], [0.0, d, 0.0], [0.0, 0.0, d]])
}

// =========================================================================
// Non-parallel faces
// =========================================================================

#[test]
fn test_crossing_faces() {
  let floor = face(&[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [2.0, 2.0, 0.0], [0.0, 2.0, 0.0]]);
  let wall = face(&[[1.0, -1.0, -1.0], [1.0, 3.0, -1.0], [1.0, 3.0, 1.0], [1.0, -1.0, 1.0]]);
  assert!(face_intersects_face(&floor, &wall));
  assert!(face_intersects_face(&wall, &floor));
}

/// Boxes overlap, planes cross, but the sections along the shared line are
/// disjoint.
#[test]
fn test_disjoint_sections() {
  let triangle = face(&[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]]);
  let wall = face(&[[1.8, 1.5, -1.0], [1.8, 2.0, -1.0], [1.8, 2.0, 1.0], [1.8, 1.5, 1.0]]);
  assert!(triangle.bounding_box().overlaps(wall.bounding_box()));
  assert!(!face_intersects_face(&triangle, &wall));
  assert!(!face_intersects_face(&wall, &triangle));
}

/// A wall standing on the floor touches it along an edge.
#[test]
fn test_edge_contact() {
  let floor = face(&[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [2.0, 2.0, 0.0], [0.0, 2.0, 0.0]]);
  let wall = face(&[[1.0, 0.5, 0.0], [1.0, 1.5, 0.0], [1.0, 1.5, 1.0], [1.0, 0.5, 1.0]]);
  assert!(face_intersects_face(&floor, &wall));
  assert!(face_intersects_face(&wall, &floor));
}

/// A triangle resting on the floor by a single vertex.
#[test]
fn test_vertex_contact_from_above() {
  let floor = face(&[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [2.0, 2.0, 0.0], [0.0, 2.0, 0.0]]);
  let tip = face(&[[1.0, 1.0, 0.0], [1.0, 1.5, 1.0], [1.5, 1.0, 1.0]]);
  assert!(face_intersects_face(&floor, &tip));

  let hovering = face(&[[1.0, 1.0, 0.1], [1.0, 1.5, 1.0], [1.5, 1.0, 1.0]]);
  assert!(!face_intersects_face(&floor, &hovering));
}

/// The shared line passes through the hole only.
#[test]
fn test_section_through_hole() {
  let outer = vec![
    DVec3::new(0.0, 0.0, 0.0),
    DVec3::new(4.0, 0.0, 0.0),
    DVec3::new(4.0, 4.0, 0.0),
    DVec3::new(0.0, 4.0, 0.0),
  ];
  let hole = vec![
    DVec3::new(1.0, 1.0, 0.0),
    DVec3::new(1.0, 3.0, 0.0),
    DVec3::new(3.0, 3.0, 0.0),
    DVec3::new(3.0, 1.0, 0.0),
  ];
  let slab = Face3::with_holes(outer, vec![hole]);
  let post = face(&[[2.0, 1.5, -1.0], [2.0, 2.5, -1.0], [2.0, 2.5, 1.0], [2.0, 1.5, 1.0]]);
  assert!(!face_intersects_face(&slab, &post));

  let wide = face(&[[2.0, 0.5, -1.0], [2.0, 2.5, -1.0], [2.0, 2.5, 1.0], [2.0, 0.5, 1.0]]);
  assert!(face_intersects_face(&slab, &wide));
}

// =========================================================================
// Parallel faces
// =========================================================================

#[test]
fn test_parallel_planes_never_touch() {
  let a = face(&[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [2.0, 2.0, 0.0], [0.0, 2.0, 0.0]]);
  let b = face(&[[0.0, 0.0, 0.5], [2.0, 0.0, 0.5], [2.0, 2.0, 0.5], [0.0, 2.0, 0.5]]);
  assert!(!face_intersects_face(&a, &b));
}

#[test]
fn test_coplanar_faces() {
  let a = face(&[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]]);

  // Fully inside: no edge crossings, vertex containment decides
  let inner = face(&[[0.2, 0.2, 0.0], [0.6, 0.2, 0.0], [0.2, 0.6, 0.0]]);
  assert!(face_intersects_face(&a, &inner));
  assert!(face_intersects_face(&inner, &a));

  // Overlapping boxes, disjoint triangles
  let apart = face(&[[2.0, 2.0, 0.0], [1.2, 2.0, 0.0], [2.0, 1.2, 0.0]]);
  assert!(!face_intersects_face(&a, &apart));

  // Star-of-David style crossing, no vertex of either inside the other
  let crossing = face(&[[-0.5, 0.5, 0.0], [2.5, 0.5, 0.0], [-0.5, 0.6, 0.0]]);
  assert!(face_intersects_face(&a, &crossing));

  // Opposite winding is still coplanar
  let flipped = face(&[[0.2, 0.2, 0.0], [0.2, 0.6, 0.0], [0.6, 0.2, 0.0]]);
  assert!(face_intersects_face(&a, &flipped));
}

// =========================================================================
// Cuboid
// =========================================================================

#[test]
fn test_box_faces_point_outward() {
  let cube = unit_cube();
  let center = cube.center();
  for side in box_faces(&cube).iter() {
    assert!(side.is_valid());
    let outward = side.plane().point - center;
    assert!(
      side.normal().dot(outward) > 0.0,
      "Side normal {:?} should point away from the center",
      side.normal()
    );
  }
}

#[test]
fn test_face_slicing_cuboid() {
  // Large plane through the middle, no vertex inside the cube
  let slice = face(&[[-5.0, -5.0, 0.5], [5.0, -5.0, 0.5], [5.0, 5.0, 0.5], [-5.0, 5.0, 0.5]]);
  assert!(face_intersects_cuboid(&slice, &unit_cube()));
}

#[test]
fn test_face_near_corner() {
  // Max of x + y + z over the cube is 3
  assert!(!face_intersects_cuboid(&diagonal(3.2), &unit_cube()));
  assert!(face_intersects_cuboid(&diagonal(2.5), &unit_cube()));
  // Through the corner (1, 1, 1) only
  assert!(face_intersects_cuboid(&diagonal(3.0), &unit_cube()));
}

#[test]
fn test_face_inside_and_outside_cuboid() {
  let cuboid = Cuboid::new(unit_cube());
  let small = face(&[[0.2, 0.2, 0.2], [0.4, 0.2, 0.2], [0.2, 0.4, 0.2]]);
  assert!(cuboid.intersects_face(&small));

  let far = face(&[[3.0, 3.0, 3.0], [4.0, 3.0, 3.0], [3.0, 4.0, 3.0]]);
  assert!(!cuboid.intersects_face(&far));
}

/// A face lying on a cube side touches the cube.
#[test]
fn test_face_on_cuboid_side() {
  let lid = face(&[[-1.0, -1.0, 1.0], [2.0, -1.0, 1.0], [2.0, 2.0, 1.0], [-1.0, 2.0, 1.0]]);
  assert!(face_intersects_cuboid(&lid, &unit_cube()));

  let above = face(&[[-1.0, -1.0, 1.5], [2.0, -1.0, 1.5], [2.0, 2.0, 1.5], [-1.0, 2.0, 1.5]]);
  assert!(!face_intersects_cuboid(&above, &unit_cube()));
}
