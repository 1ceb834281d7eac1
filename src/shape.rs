use std::fmt;

use crate::consts::{ EPSILON, GLASS_RI };
use crate::tuple::Tuple4D;
use crate::ray::Ray4D;
use crate::light::Material;
use crate::matrix::Matrix4D;
use crate::transform::Transform;
use crate::error::Result;

/// Handle to a shape owned by a `ShapeArena`.
///
/// Groups refer to their children, and children to their parent, through
/// these handles instead of pointers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub(crate) usize);

impl ShapeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeType {
    /// A unit sphere with its center at the object-space origin.
    Sphere,

    /// The XZ plane (`y == 0`), extending indefinitely.
    Plane,

    /// An axis-aligned cube spanning `-1.0..=1.0` on every axis.
    Cube,

    /// A unit-radius cylinder along Y. Minimum Y, maximum Y and whether the
    /// ends are capped.
    Cylinder(f64, f64, bool),

    /// A double-napped cone along Y, with its apex at the origin. Minimum Y,
    /// maximum Y and whether the ends are capped.
    Cone(f64, f64, bool),

    /// A group of shapes. Has no surface of its own.
    Group(Vec<ShapeId>),
}

/// A shape in a scene.
///
/// Every shape carries its own transform and material. Shapes nested in a
/// group also remember their parent, which is only used to walk between
/// coordinate spaces; the group owns the child, never the other way around.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    ty: ShapeType,
    pub material: Material,
    transform: Transform,
    parent: Option<ShapeId>,
}

impl Shape {
    fn new(ty: ShapeType) -> Shape {
        Shape {
            ty,
            material: Default::default(),
            transform: Transform::identity(),
            parent: None,
        }
    }

    pub fn sphere() -> Shape {
        Shape::new(ShapeType::Sphere)
    }

    /// A sphere made of clear glass.
    pub fn glass_sphere() -> Shape {
        let mut sphere = Shape::sphere();
        sphere.material.transparency = 1.0;
        sphere.material.refractive_index = GLASS_RI;

        sphere
    }

    pub fn plane() -> Shape {
        Shape::new(ShapeType::Plane)
    }

    pub fn cube() -> Shape {
        Shape::new(ShapeType::Cube)
    }

    /// An infinitely long, open cylinder.
    pub fn cylinder() -> Shape {
        Shape::bounded_cylinder(f64::NEG_INFINITY, f64::INFINITY)
    }

    /// An open cylinder truncated to `minimum < y < maximum`.
    pub fn bounded_cylinder(minimum: f64, maximum: f64) -> Shape {
        Shape::new(ShapeType::Cylinder(minimum, maximum, false))
    }

    /// A truncated cylinder with both ends capped.
    pub fn capped_cylinder(minimum: f64, maximum: f64) -> Shape {
        Shape::new(ShapeType::Cylinder(minimum, maximum, true))
    }

    /// An infinite double-napped cone.
    pub fn cone() -> Shape {
        Shape::bounded_cone(f64::NEG_INFINITY, f64::INFINITY)
    }

    pub fn bounded_cone(minimum: f64, maximum: f64) -> Shape {
        Shape::new(ShapeType::Cone(minimum, maximum, false))
    }

    pub fn capped_cone(minimum: f64, maximum: f64) -> Shape {
        Shape::new(ShapeType::Cone(minimum, maximum, true))
    }

    /// An empty group. Children are attached through a `ShapeArena`.
    pub fn group() -> Shape {
        Shape::new(ShapeType::Group(Vec::new()))
    }

    pub fn ty(&self) -> &ShapeType {
        &self.ty
    }

    pub fn is_group(&self) -> bool {
        matches!(self.ty, ShapeType::Group(_))
    }

    /// Children of a group; empty for every other shape.
    pub fn children(&self) -> &[ShapeId] {
        match self.ty {
            ShapeType::Group(ref children) => children,
            _ => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<ShapeId>> {
        match self.ty {
            ShapeType::Group(ref mut children) => Some(children),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<ShapeId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: ShapeId) {
        self.parent = Some(parent);
    }

    pub(crate) fn clear_parent(&mut self) {
        self.parent = None;
    }

    pub fn transform(&self) -> &Matrix4D {
        self.transform.matrix()
    }

    pub fn inverse(&self) -> &Matrix4D {
        self.transform.inverse()
    }

    pub fn inverse_transpose(&self) -> &Matrix4D {
        self.transform.inverse_transpose()
    }

    /// Replaces this shape's transform.
    ///
    /// The inverse is computed here, once. A singular matrix is rejected and
    /// the previous transform is kept.
    pub fn set_transform(&mut self, transform: Matrix4D) -> Result<()> {
        self.transform = Transform::new(transform)?;
        Ok(())
    }

    /// Builder form of `set_transform`.
    pub fn with_transform(mut self, transform: Matrix4D) -> Result<Shape> {
        self.set_transform(transform)?;
        Ok(self)
    }

    pub fn with_material(mut self, material: Material) -> Shape {
        self.material = material;
        self
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn material_mut(&mut self) -> &mut Material {
        &mut self.material
    }

    /// Intersects an object-space ray with this shape's surface.
    ///
    /// Returns the `t` of every crossing, in no particular order. Groups have
    /// no surface and return nothing here; their children are reached through
    /// the `ShapeArena` that owns them.
    pub fn local_intersect(&self, ray: &Ray4D) -> Vec<f64> {
        match self.ty {
            ShapeType::Sphere => intersect_sphere(ray),
            ShapeType::Plane => intersect_plane(ray),
            ShapeType::Cube => intersect_cube(ray),
            ShapeType::Cylinder(min, max, closed)
                => intersect_cylinder(ray, min, max, closed),
            ShapeType::Cone(min, max, closed)
                => intersect_cone(ray, min, max, closed),
            ShapeType::Group(_) => Vec::new(),
        }
    }

    /// The object-space normal at a point on this shape's surface.
    ///
    /// # Panics
    ///
    /// Groups have no surface. Asking one for a normal is a bug in the
    /// caller, since a group can never be the subject of an intersection.
    pub fn local_normal_at(&self, at: &Tuple4D) -> Tuple4D {
        match self.ty {
            ShapeType::Sphere => Tuple4D { w: 0.0, ..*at },
            ShapeType::Plane => Tuple4D::vector(0.0, 1.0, 0.0),
            ShapeType::Cube => normal_at_cube(at),
            ShapeType::Cylinder(min, max, _) => normal_at_cylinder(at, min, max),
            ShapeType::Cone(min, max, _) => normal_at_cone(at, min, max),
            ShapeType::Group(_) => unreachable!(
                "Local normal calculations should never occur on groups."
            ),
        }
    }
}

/// Solves `a*t^2 + b*t + c == 0`, smaller root first.
fn solve_quadratic(a: f64, b: f64, c: f64) -> Option<(f64, f64)> {
    let disc = b.powi(2) - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }

    let t0 = (-b - disc.sqrt()) / (2.0 * a);
    let t1 = (-b + disc.sqrt()) / (2.0 * a);

    if t0 > t1 { Some((t1, t0)) } else { Some((t0, t1)) }
}

fn intersect_sphere(ray: &Ray4D) -> Vec<f64> {
    // Subtracting the center point drops the 'w' part of the ray origin.
    let sphere_to_ray = ray.origin - Tuple4D::point(0.0, 0.0, 0.0);

    let a = ray.direction.dot(&ray.direction);
    let b = 2.0 * ray.direction.dot(&sphere_to_ray);
    let c = sphere_to_ray.dot(&sphere_to_ray) - 1.0;

    match solve_quadratic(a, b, c) {
        Some((t0, t1)) => vec![t0, t1],
        None => Vec::new(),
    }
}

fn intersect_plane(ray: &Ray4D) -> Vec<f64> {
    // Parallel (or coplanar) rays never cross the plane.
    if ray.direction.y.abs() < EPSILON {
        return Vec::new();
    }

    vec![-ray.origin.y / ray.direction.y]
}

/// Where a ray enters and leaves the slab `-1.0..=1.0` on one axis.
///
/// A direction component near zero never reaches the slab's faces; the
/// distances become infinite with the sign of the numerator.
fn check_cube_axis(origin: f64, direction: f64) -> (f64, f64) {
    let tmin_numerator = -1.0 - origin;
    let tmax_numerator =  1.0 - origin;

    let (tmin, tmax) = if direction.abs() >= EPSILON {
        (tmin_numerator / direction, tmax_numerator / direction)
    } else {
        (tmin_numerator * f64::INFINITY, tmax_numerator * f64::INFINITY)
    };

    if tmin > tmax { (tmax, tmin) } else { (tmin, tmax) }
}

fn intersect_cube(ray: &Ray4D) -> Vec<f64> {
    let (xtmin, xtmax) = check_cube_axis(ray.origin.x, ray.direction.x);
    let (ytmin, ytmax) = check_cube_axis(ray.origin.y, ray.direction.y);
    let (ztmin, ztmax) = check_cube_axis(ray.origin.z, ray.direction.z);

    let tmin = xtmin.max(ytmin).max(ztmin);
    let tmax = xtmax.min(ytmax).min(ztmax);

    if tmin > tmax {
        return Vec::new();
    }

    vec![tmin, tmax]
}

fn normal_at_cube(p: &Tuple4D) -> Tuple4D {
    let xa = p.x.abs();
    let ya = p.y.abs();
    let za = p.z.abs();

    let max_component = xa.max(ya).max(za);
    if max_component == xa {
        Tuple4D::vector(p.x, 0.0, 0.0)
    } else if max_component == ya {
        Tuple4D::vector(0.0, p.y, 0.0)
    } else {
        Tuple4D::vector(0.0, 0.0, p.z)
    }
}

/// Keeps wall hits strictly between the two cap heights.
fn push_within(xs: &mut Vec<f64>, ray: &Ray4D, t: f64, minimum: f64, maximum: f64) {
    let y = ray.origin.y + t * ray.direction.y;
    if minimum < y && y < maximum {
        xs.push(t);
    }
}

/// Intersects the planes `y == minimum` and `y == maximum`, keeping hits
/// within `radius(cap_y)` of the Y axis.
fn intersect_caps<F>(ray: &Ray4D, minimum: f64, maximum: f64, xs: &mut Vec<f64>,
    radius_squared: F) where F: Fn(f64) -> f64 {
    // A ray with no Y movement can't reach either cap.
    if ray.direction.y.abs() < EPSILON {
        return;
    }

    for cap in [minimum, maximum] {
        let t = (cap - ray.origin.y) / ray.direction.y;
        let x = ray.origin.x + t * ray.direction.x;
        let z = ray.origin.z + t * ray.direction.z;

        if x.powi(2) + z.powi(2) <= radius_squared(cap) {
            xs.push(t);
        }
    }
}

fn intersect_cylinder(ray: &Ray4D, minimum: f64, maximum: f64, closed: bool)
    -> Vec<f64> {
    let mut xs = Vec::new();
    let a = ray.direction.x.powi(2) + ray.direction.z.powi(2);

    // Rays parallel to the Y axis can only hit the caps.
    if a.abs() >= EPSILON {
        let b = 2.0 * ray.origin.x * ray.direction.x
              + 2.0 * ray.origin.z * ray.direction.z;
        let c = ray.origin.x.powi(2) + ray.origin.z.powi(2) - 1.0;

        match solve_quadratic(a, b, c) {
            Some((t0, t1)) => {
                push_within(&mut xs, ray, t0, minimum, maximum);
                push_within(&mut xs, ray, t1, minimum, maximum);
            }
            None => return xs,
        }
    }

    if closed {
        intersect_caps(ray, minimum, maximum, &mut xs, |_| 1.0);
    }

    xs
}

fn normal_at_cylinder(at: &Tuple4D, minimum: f64, maximum: f64) -> Tuple4D {
    // Square of the distance from the Y axis.
    let dist = at.x.powi(2) + at.z.powi(2);

    if dist < 1.0 && at.y >= maximum - EPSILON {
        Tuple4D::vector(0.0, 1.0, 0.0)
    } else if dist < 1.0 && at.y <= minimum + EPSILON {
        Tuple4D::vector(0.0, -1.0, 0.0)
    } else {
        Tuple4D::vector(at.x, 0.0, at.z)
    }
}

fn intersect_cone(ray: &Ray4D, minimum: f64, maximum: f64, closed: bool)
    -> Vec<f64> {
    let mut xs = Vec::new();
    let (o, d) = (ray.origin, ray.direction);

    let a = d.x.powi(2) - d.y.powi(2) + d.z.powi(2);
    let b = 2.0 * (o.x * d.x - o.y * d.y + o.z * d.z);
    let c = o.x.powi(2) - o.y.powi(2) + o.z.powi(2);

    if a.abs() < EPSILON {
        // Parallel to one nappe: a single crossing, unless b vanishes too.
        if b.abs() >= EPSILON {
            push_within(&mut xs, ray, -c / (2.0 * b), minimum, maximum);
        }
    } else {
        match solve_quadratic(a, b, c) {
            Some((t0, t1)) => {
                push_within(&mut xs, ray, t0, minimum, maximum);
                push_within(&mut xs, ray, t1, minimum, maximum);
            }
            None => return xs,
        }
    }

    if closed {
        // A cone's radius at height y is |y|.
        intersect_caps(ray, minimum, maximum, &mut xs, |y| y.powi(2));
    }

    xs
}

fn normal_at_cone(at: &Tuple4D, minimum: f64, maximum: f64) -> Tuple4D {
    let dist = at.x.powi(2) + at.z.powi(2);

    if dist < maximum.powi(2) && at.y >= maximum - EPSILON {
        Tuple4D::vector(0.0, 1.0, 0.0)
    } else if dist < minimum.powi(2) && at.y <= minimum + EPSILON {
        Tuple4D::vector(0.0, -1.0, 0.0)
    } else {
        let mut y = dist.sqrt();
        if at.y > 0.0 {
            y = -y;
        }

        Tuple4D::vector(at.x, y, at.z)
    }
}

#[cfg(test)]
fn hits(s: &Shape, origin: Tuple4D, direction: Tuple4D) -> Vec<f64> {
    let mut xs = s.local_intersect(&Ray4D::new(origin, direction.normalize()));
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
    xs
}

#[test]
fn ray_intersects_sphere_at_two_points() {
    let s = Shape::sphere();
    let xs = hits(&s, Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));

    assert_eq!(xs, vec![4.0, 6.0]);
}

#[test]
fn ray_is_tangent_to_sphere() {
    let s = Shape::sphere();
    let xs = hits(&s, Tuple4D::point(0.0, 1.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));

    assert_eq!(xs, vec![5.0, 5.0]);
}

#[test]
fn ray_misses_sphere() {
    let s = Shape::sphere();
    let xs = hits(&s, Tuple4D::point(0.0, 2.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));

    assert!(xs.is_empty());
}

#[test]
fn ray_is_inside_sphere() {
    let s = Shape::sphere();
    let xs = hits(&s, Tuple4D::point(0.0, 0.0, 0.0), Tuple4D::vector(0.0, 0.0, 1.0));

    assert_eq!(xs, vec![-1.0, 1.0]);
}

#[test]
fn sphere_is_behind_ray() {
    let s = Shape::sphere();
    let xs = hits(&s, Tuple4D::point(0.0, 0.0, 5.0), Tuple4D::vector(0.0, 0.0, 1.0));

    assert_eq!(xs, vec![-6.0, -4.0]);
}

#[test]
fn normal_on_sphere_is_normalized_position() {
    let s = Shape::sphere();
    let k = 3.0f64.sqrt() / 3.0;

    assert_eq!(s.local_normal_at(&Tuple4D::point(1.0, 0.0, 0.0)),
        Tuple4D::vector(1.0, 0.0, 0.0));
    assert_eq!(s.local_normal_at(&Tuple4D::point(0.0, 0.0, 1.0)),
        Tuple4D::vector(0.0, 0.0, 1.0));
    assert_eq!(s.local_normal_at(&Tuple4D::point(k, k, k)),
        Tuple4D::vector(k, k, k));
}

#[test]
fn glass_sphere_material() {
    let s = Shape::glass_sphere();

    assert_eq!(*s.transform(), Matrix4D::identity());
    assert_eq!(s.material.transparency, 1.0);
    assert_eq!(s.material.refractive_index, 1.5);
}

#[test]
fn plane_normal_is_constant() {
    let p = Shape::plane();

    for at in [(0.0, 0.0, 0.0), (10.0, 0.0, -10.0), (-5.0, 0.0, 150.0)] {
        assert_eq!(p.local_normal_at(&Tuple4D::point(at.0, at.1, at.2)),
            Tuple4D::vector(0.0, 1.0, 0.0));
    }
}

#[test]
fn ray_parallel_or_coplanar_with_plane() {
    let p = Shape::plane();

    assert!(hits(&p, Tuple4D::point(0.0, 10.0, 0.0), Tuple4D::vector(0.0, 0.0, 1.0)).is_empty());
    assert!(hits(&p, Tuple4D::point(0.0, 0.0, 0.0), Tuple4D::vector(0.0, 0.0, 1.0)).is_empty());
}

#[test]
fn ray_intersecting_plane_from_above_and_below() {
    let p = Shape::plane();

    assert_eq!(hits(&p, Tuple4D::point(0.0, 1.0, 0.0), Tuple4D::vector(0.0, -1.0, 0.0)),
        vec![1.0]);
    assert_eq!(hits(&p, Tuple4D::point(0.0, -1.0, 0.0), Tuple4D::vector(0.0, 1.0, 0.0)),
        vec![1.0]);
}

#[test]
fn ray_intersects_cube_faces() {
    let c = Shape::cube();
    let cases = [
        ((5.0, 0.5, 0.0), (-1.0, 0.0, 0.0), 4.0, 6.0),
        ((-5.0, 0.5, 0.0), (1.0, 0.0, 0.0), 4.0, 6.0),
        ((0.5, 5.0, 0.0), (0.0, -1.0, 0.0), 4.0, 6.0),
        ((0.5, -5.0, 0.0), (0.0, 1.0, 0.0), 4.0, 6.0),
        ((0.5, 0.0, 5.0), (0.0, 0.0, -1.0), 4.0, 6.0),
        ((0.5, 0.0, -5.0), (0.0, 0.0, 1.0), 4.0, 6.0),
        ((0.0, 0.5, 0.0), (0.0, 0.0, 1.0), -1.0, 1.0),
    ];

    for (o, d, t1, t2) in cases {
        let xs = hits(&c, Tuple4D::point(o.0, o.1, o.2), Tuple4D::vector(d.0, d.1, d.2));
        assert_eq!(xs, vec![t1, t2]);
    }
}

#[test]
fn ray_misses_cube() {
    let c = Shape::cube();
    let cases = [
        ((-2.0, 0.0, 0.0), (0.2673, 0.5345, 0.8018)),
        ((0.0, -2.0, 0.0), (0.8018, 0.2673, 0.5345)),
        ((0.0, 0.0, -2.0), (0.5345, 0.8018, 0.2673)),
        ((2.0, 0.0, 2.0), (0.0, 0.0, -1.0)),
        ((0.0, 2.0, 2.0), (0.0, -1.0, 0.0)),
        ((2.0, 2.0, 0.0), (-1.0, 0.0, 0.0)),
    ];

    for (o, d) in cases {
        let xs = hits(&c, Tuple4D::point(o.0, o.1, o.2), Tuple4D::vector(d.0, d.1, d.2));
        assert!(xs.is_empty());
    }
}

#[test]
fn normal_on_cube_surface() {
    let c = Shape::cube();
    let cases = [
        ((1.0, 0.5, -0.8), (1.0, 0.0, 0.0)),
        ((-1.0, -0.2, 0.9), (-1.0, 0.0, 0.0)),
        ((-0.4, 1.0, -0.1), (0.0, 1.0, 0.0)),
        ((0.3, -1.0, -0.7), (0.0, -1.0, 0.0)),
        ((-0.6, 0.3, 1.0), (0.0, 0.0, 1.0)),
        ((0.4, 0.4, -1.0), (0.0, 0.0, -1.0)),
        ((1.0, 1.0, 1.0), (1.0, 0.0, 0.0)),
        ((-1.0, -1.0, -1.0), (-1.0, 0.0, 0.0)),
    ];

    for (p, n) in cases {
        assert_eq!(c.local_normal_at(&Tuple4D::point(p.0, p.1, p.2)),
            Tuple4D::vector(n.0, n.1, n.2));
    }
}

#[test]
fn ray_misses_cylinder() {
    let cyl = Shape::cylinder();
    let cases = [
        ((1.0, 0.0, 0.0), (0.0, 1.0, 0.0)),
        ((0.0, 0.0, 0.0), (0.0, 1.0, 0.0)),
        ((0.0, 0.0, -5.0), (1.0, 1.0, 1.0)),
    ];

    for (o, d) in cases {
        let xs = hits(&cyl, Tuple4D::point(o.0, o.1, o.2), Tuple4D::vector(d.0, d.1, d.2));
        assert!(xs.is_empty());
    }
}

#[test]
fn ray_strikes_cylinder() {
    let cyl = Shape::cylinder();

    assert_eq!(hits(&cyl, Tuple4D::point(1.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0)),
        vec![5.0, 5.0]);
    assert_eq!(hits(&cyl, Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0)),
        vec![4.0, 6.0]);

    let xs = hits(&cyl, Tuple4D::point(0.5, 0.0, -5.0), Tuple4D::vector(0.1, 1.0, 1.0));
    assert_eq!(xs.len(), 2);
    assert!((xs[0] - 6.80798).abs() < 0.0001);
    assert!((xs[1] - 7.08872).abs() < 0.0001);
}

#[test]
fn normal_on_cylinder_wall() {
    let cyl = Shape::cylinder();
    let cases = [
        ((1.0, 0.0, 0.0), (1.0, 0.0, 0.0)),
        ((0.0, 5.0, -1.0), (0.0, 0.0, -1.0)),
        ((0.0, -2.0, 1.0), (0.0, 0.0, 1.0)),
        ((-1.0, 1.0, 0.0), (-1.0, 0.0, 0.0)),
    ];

    for (p, n) in cases {
        assert_eq!(cyl.local_normal_at(&Tuple4D::point(p.0, p.1, p.2)),
            Tuple4D::vector(n.0, n.1, n.2));
    }
}

#[test]
fn default_cylinder_is_infinite_and_open() {
    assert_eq!(*Shape::cylinder().ty(),
        ShapeType::Cylinder(f64::NEG_INFINITY, f64::INFINITY, false));
}

#[test]
fn truncated_cylinder_excludes_ends() {
    let cyl = Shape::bounded_cylinder(1.0, 2.0);
    let cases = [
        ((0.0, 1.5, 0.0), (0.1, 1.0, 0.0), 0),
        ((0.0, 3.0, -5.0), (0.0, 0.0, 1.0), 0),
        ((0.0, 0.0, -5.0), (0.0, 0.0, 1.0), 0),
        ((0.0, 2.0, -5.0), (0.0, 0.0, 1.0), 0),
        ((0.0, 1.0, -5.0), (0.0, 0.0, 1.0), 0),
        ((0.0, 1.5, -2.0), (0.0, 0.0, 1.0), 2),
    ];

    for (o, d, count) in cases {
        let xs = hits(&cyl, Tuple4D::point(o.0, o.1, o.2), Tuple4D::vector(d.0, d.1, d.2));
        assert_eq!(xs.len(), count);
    }
}

#[test]
fn capped_cylinder_caps() {
    let cyl = Shape::capped_cylinder(1.0, 2.0);
    let cases = [
        ((0.0, 3.0, 0.0), (0.0, -1.0, 0.0)),
        ((0.0, 3.0, -2.0), (0.0, -1.0, 2.0)),
        ((0.0, 0.0, -2.0), (0.0, 1.0, 2.0)),
    ];

    for (o, d) in cases {
        let xs = hits(&cyl, Tuple4D::point(o.0, o.1, o.2), Tuple4D::vector(d.0, d.1, d.2));
        assert_eq!(xs.len(), 2);
    }
}

#[test]
fn normal_on_cylinder_caps() {
    let cyl = Shape::capped_cylinder(1.0, 2.0);
    let cases = [
        ((0.0, 1.0, 0.0), (0.0, -1.0, 0.0)),
        ((0.5, 1.0, 0.0), (0.0, -1.0, 0.0)),
        ((0.0, 1.0, 0.5), (0.0, -1.0, 0.0)),
        ((0.0, 2.0, 0.0), (0.0, 1.0, 0.0)),
        ((0.5, 2.0, 0.0), (0.0, 1.0, 0.0)),
        ((0.0, 2.0, 0.5), (0.0, 1.0, 0.0)),
    ];

    for (p, n) in cases {
        assert_eq!(cyl.local_normal_at(&Tuple4D::point(p.0, p.1, p.2)),
            Tuple4D::vector(n.0, n.1, n.2));
    }
}

#[test]
fn ray_strikes_cone() {
    let cone = Shape::cone();

    assert_eq!(hits(&cone, Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0)),
        vec![5.0, 5.0]);

    let xs = hits(&cone, Tuple4D::point(1.0, 1.0, -5.0), Tuple4D::vector(-0.5, -1.0, 1.0));
    assert_eq!(xs.len(), 2);
    assert!((xs[0] - 4.55006).abs() < 0.0001);
    assert!((xs[1] - 49.44994).abs() < 0.0001);
}

#[test]
fn ray_parallel_to_one_cone_half() {
    let cone = Shape::cone();
    let xs = hits(&cone, Tuple4D::point(0.0, 0.0, -1.0), Tuple4D::vector(0.0, 1.0, 1.0));

    assert_eq!(xs.len(), 1);
    assert!((xs[0] - 0.35355).abs() < 0.0001);
}

#[test]
fn single_cone_crossing_respects_bounds() {
    // The lone crossing above sits at y == 0.25.
    let origin = Tuple4D::point(0.0, 0.0, -1.0);
    let direction = Tuple4D::vector(0.0, 1.0, 1.0);

    assert_eq!(hits(&Shape::bounded_cone(0.0, 0.5), origin, direction).len(), 1);
    assert!(hits(&Shape::bounded_cone(0.5, 1.0), origin, direction).is_empty());
    assert!(hits(&Shape::bounded_cone(-1.0, 0.0), origin, direction).is_empty());
}

#[test]
fn ray_along_cone_surface_misses() {
    let cone = Shape::cone();

    for origin in [Tuple4D::point(0.0, 0.0, 0.0), Tuple4D::point(0.0, 1.0, 1.0)] {
        assert!(hits(&cone, origin, Tuple4D::vector(0.0, 1.0, 1.0)).is_empty());
    }
}

#[test]
fn capped_cone_caps() {
    let cone = Shape::capped_cone(-0.5, 0.5);
    let cases = [
        ((0.0, 0.0, -5.0), (0.0, 1.0, 0.0), 0),
        ((0.0, 0.0, -0.25), (0.0, 1.0, 1.0), 2),
        ((0.0, 0.0, -0.25), (0.0, 1.0, 0.0), 4),
    ];

    for (o, d, count) in cases {
        let xs = hits(&cone, Tuple4D::point(o.0, o.1, o.2), Tuple4D::vector(d.0, d.1, d.2));
        assert_eq!(xs.len(), count);
    }
}

#[test]
fn normal_on_cone() {
    let cone = Shape::cone();

    assert_eq!(cone.local_normal_at(&Tuple4D::point(0.0, 0.0, 0.0)),
        Tuple4D::vector(0.0, 0.0, 0.0));
    assert_eq!(cone.local_normal_at(&Tuple4D::point(1.0, 1.0, 1.0)),
        Tuple4D::vector(1.0, -(2.0f64.sqrt()), 1.0));
    assert_eq!(cone.local_normal_at(&Tuple4D::point(-1.0, -1.0, 0.0)),
        Tuple4D::vector(-1.0, 1.0, 0.0));
}

#[test]
fn normal_on_cone_caps() {
    let cone = Shape::capped_cone(-2.0, 1.0);

    assert_eq!(cone.local_normal_at(&Tuple4D::point(0.5, 1.0, 0.0)),
        Tuple4D::vector(0.0, 1.0, 0.0));
    assert_eq!(cone.local_normal_at(&Tuple4D::point(1.5, -2.0, 0.0)),
        Tuple4D::vector(0.0, -1.0, 0.0));
}

#[test]
fn singular_transform_is_rejected_and_previous_kept() {
    let mut s = Shape::sphere();
    s.set_transform(Matrix4D::translation(2.0, 3.0, 4.0)).unwrap();

    assert!(s.set_transform(Matrix4D::scaling(0.0, 1.0, 1.0)).is_err());
    assert_eq!(*s.transform(), Matrix4D::translation(2.0, 3.0, 4.0));
    assert_eq!(*s.inverse(), Matrix4D::translation(-2.0, -3.0, -4.0));
}

#[test]
fn group_has_no_surface() {
    let g = Shape::group();

    assert!(g.is_group());
    assert!(g.children().is_empty());
    assert!(hits(&g, Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0)).is_empty());
}

#[test]
#[should_panic]
fn group_normal_is_a_bug() {
    Shape::group().local_normal_at(&Tuple4D::point(0.0, 0.0, 0.0));
}
