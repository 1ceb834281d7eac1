use std::cmp::Ordering;

use crate::consts::{ EPSILON, VACUUM_RI };
use crate::tuple::Tuple4D;
use crate::ray::Ray4D;
use crate::shape::ShapeId;
use crate::group::ShapeArena;

/// An intersection.
///
/// This structure assumes that some ray produced an intersection. Parameter `t`
/// is analogous to `t` for a ray (the offset from the ray origin).
///
/// `object` is the primitive that was struck, never a group.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Intersection {
    pub t: f64,
    pub object: ShapeId,
}

impl Intersection {
    pub fn new(t: f64, object: ShapeId) -> Intersection {
        Intersection { t, object }
    }
}

/// A collection of intersections, kept in ascending order of `t`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Intersections {
    pub intersections: Vec<Intersection>,
}

impl Intersections {
    /// Wraps (and sorts) a list of intersections.
    pub fn new(intersections: Vec<Intersection>) -> Intersections {
        let mut xs = Intersections { intersections };
        xs.sort();

        xs
    }

    pub fn len(&self) -> usize {
        self.intersections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intersections.is_empty()
    }

    /// The visible intersection, if any.
    ///
    /// A hit is the intersection with the lowest finite `t` that is greater
    /// than or equal to 0. Intersections behind the ray origin never count.
    pub fn hit(&self) -> Option<Intersection> {
        self.intersections.iter()
            .filter(|i| i.t.is_finite() && i.t >= 0.0)
            .min_by(|a, b| a.t.partial_cmp(&b.t).unwrap_or(Ordering::Equal))
            .copied()
    }

    /// Sorts the intersections by `t`, ignoring `f64` semantics.
    pub fn sort(&mut self) {
        self.intersections.sort_by(|a, b|
            a.t.partial_cmp(&b.t).unwrap_or(Ordering::Equal)
        );
    }
}

/// A record for computations associated with an `Intersection`.
///
/// Mostly a superset of an `Intersection`.
#[derive(Clone, Debug)]
pub struct IntersectionComputation {
    /// The "time" of the ray intersection.
    pub t: f64,

    /// The object being intersected.
    pub object: ShapeId,

    /// The point where the intersection occurs.
    pub point: Tuple4D,

    /// A point slightly above the intersected surface. Used to prevent an
    /// object from shadowing itself (this causes "acne").
    pub over_point: Tuple4D,

    /// A point slightly below the intersected surface. Refracted rays start
    /// here.
    pub under_point: Tuple4D,

    /// The eye vector for the intersection.
    pub eyev: Tuple4D,

    /// The normal vector of the object being intersected, flipped toward the
    /// eye when the hit is on the inside.
    pub normalv: Tuple4D,

    /// The intersection ray, reflected across the normal.
    pub reflectv: Tuple4D,

    /// Whether the intersection occurs within the object or not.
    pub inside: bool,

    /// The refractive index of the material being exited.
    pub n1: f64,

    /// The refractive index of the material being entered.
    pub n2: f64,
}

impl IntersectionComputation {
    /// Prepares shading state for `hit`.
    ///
    /// `xs` is every intersection along `r`, sorted. It is walked to find the
    /// refractive indices on either side of the hit; pass `&[hit]` when only
    /// one surface matters.
    pub fn new(r: &Ray4D, hit: &Intersection, xs: &[Intersection],
        shapes: &ShapeArena) -> IntersectionComputation {
        let t = hit.t;
        let object = hit.object;
        let point = r.position(t);
        let eyev = -r.direction;
        let mut normalv = shapes.normal_at(object, &point);

        let inside = normalv.dot(&eyev) < 0.0;
        if inside {
            normalv = -normalv;
        }

        let over_point = point + normalv * EPSILON;
        let under_point = point - normalv * EPSILON;

        let reflectv = r.direction.reflect(&normalv);
        let (n1, n2) = Self::refraction_indices(hit, xs, shapes);

        IntersectionComputation {
            t, object,
            point, over_point, under_point,
            eyev, normalv, reflectv,
            inside,
            n1, n2,
        }
    }

    fn refraction_indices(hit: &Intersection, xs: &[Intersection],
        shapes: &ShapeArena) -> (f64, f64) {
        // Objects the ray has entered but not yet left, innermost last.
        let mut containers: Vec<ShapeId> = Vec::new();

        let innermost = |containers: &[ShapeId]| containers.last()
            .map_or(VACUUM_RI, |&id| shapes[id].material.refractive_index);

        for i in xs {
            let exiting = innermost(&containers);

            match containers.iter().position(|&id| id == i.object) {
                Some(j) => { containers.remove(j); }
                None => containers.push(i.object),
            }

            if i == hit {
                return (exiting, innermost(&containers));
            }
        }

        (VACUUM_RI, VACUUM_RI)
    }

    /// Calculates the reflectance of a hit with Schlick's approximation to
    /// the Fresnel equations.
    ///
    /// The reflectance is a number between 0 and 1, representing what fraction
    /// of the light is reflected for the hit.
    pub fn schlick(&self) -> f64 {
        let mut cos = self.eyev.dot(&self.normalv);

        // Total internal reflection can only occur if n1 > n2.
        if self.n1 > self.n2 {
            let n = self.n1 / self.n2;
            let sin2_t = n.powi(2) * (1.0 - cos.powi(2));

            if sin2_t > 1.0 {
                return 1.0;
            }

            // Past the critical angle check, use cos(theta_t) instead.
            cos = (1.0 - sin2_t).sqrt();
        }

        let r0 = ((self.n1 - self.n2) / (self.n1 + self.n2)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cos).powi(5)
    }
}

#[cfg(test)]
fn lone(shape: crate::shape::Shape) -> (ShapeArena, ShapeId) {
    let mut arena = ShapeArena::new();
    let id = arena.insert(shape);

    (arena, id)
}

#[test]
fn hit_when_all_intersections_positive() {
    let id = ShapeId(0);
    let i1 = Intersection::new(1.0, id);
    let i2 = Intersection::new(2.0, id);
    let xs = Intersections::new(vec![i2, i1]);

    assert_eq!(xs.hit(), Some(i1));
}

#[test]
fn hit_when_some_intersections_negative() {
    let id = ShapeId(0);
    let i1 = Intersection::new(-1.0, id);
    let i2 = Intersection::new(1.0, id);
    let xs = Intersections::new(vec![i2, i1]);

    assert_eq!(xs.hit(), Some(i2));
}

#[test]
fn hit_when_all_intersections_negative() {
    let id = ShapeId(0);
    let xs = Intersections::new(vec![
        Intersection::new(-2.0, id),
        Intersection::new(-1.0, id),
    ]);

    assert_eq!(xs.hit(), None);
}

#[test]
fn hit_is_lowest_nonnegative() {
    let id = ShapeId(0);
    let i4 = Intersection::new(2.0, id);
    let xs = Intersections::new(vec![
        Intersection::new(5.0, id),
        Intersection::new(7.0, id),
        Intersection::new(-3.0, id),
        i4,
    ]);

    assert_eq!(xs.hit(), Some(i4));
    assert_eq!(xs.intersections[0].t, -3.0);
}

#[test]
fn hit_ignores_infinite_t() {
    let id = ShapeId(0);
    let xs = Intersections::new(vec![
        Intersection::new(f64::INFINITY, id),
        Intersection::new(3.0, id),
    ]);

    assert_eq!(xs.hit().map(|i| i.t), Some(3.0));
}

#[test]
fn hit_on_outside() {
    use crate::shape::Shape;

    let (arena, s) = lone(Shape::sphere());
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let i = Intersection::new(4.0, s);
    let comps = IntersectionComputation::new(&r, &i, &[i], &arena);

    assert_eq!(comps.object, s);
    assert_eq!(comps.point, Tuple4D::point(0.0, 0.0, -1.0));
    assert_eq!(comps.eyev, Tuple4D::vector(0.0, 0.0, -1.0));
    assert_eq!(comps.normalv, Tuple4D::vector(0.0, 0.0, -1.0));
    assert!(!comps.inside);
}

#[test]
fn hit_on_inside() {
    use crate::shape::Shape;

    let (arena, s) = lone(Shape::sphere());
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, 0.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let i = Intersection::new(1.0, s);
    let comps = IntersectionComputation::new(&r, &i, &[i], &arena);

    assert_eq!(comps.point, Tuple4D::point(0.0, 0.0, 1.0));
    assert_eq!(comps.eyev, Tuple4D::vector(0.0, 0.0, -1.0));
    assert!(comps.inside);
    assert_eq!(comps.normalv, Tuple4D::vector(0.0, 0.0, -1.0));
}

#[test]
fn hit_offsets_point_above_and_below_surface() {
    use crate::shape::Shape;
    use crate::matrix::Matrix4D;

    let (arena, s) = lone(Shape::glass_sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, 1.0)).unwrap());
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let i = Intersection::new(5.0, s);
    let comps = IntersectionComputation::new(&r, &i, &[i], &arena);

    assert!(comps.over_point.z < -EPSILON / 2.0);
    assert!(comps.point.z > comps.over_point.z);
    assert!(comps.under_point.z > EPSILON / 2.0);
    assert!(comps.point.z < comps.under_point.z);
}

#[test]
fn reflection_vector() {
    use crate::shape::Shape;

    let (arena, p) = lone(Shape::plane());
    let k = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(Tuple4D::point(0.0, 1.0, -1.0), Tuple4D::vector(0.0, -k, k));
    let i = Intersection::new(2.0f64.sqrt(), p);
    let comps = IntersectionComputation::new(&r, &i, &[i], &arena);

    assert_eq!(comps.reflectv, Tuple4D::vector(0.0, k, k));
}

#[test]
fn refractive_indices_at_each_boundary() {
    use crate::shape::Shape;
    use crate::matrix::Matrix4D;

    let mut arena = ShapeArena::new();

    let mut a = Shape::glass_sphere().with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap();
    a.material.refractive_index = 1.5;
    let mut b = Shape::glass_sphere().with_transform(Matrix4D::translation(0.0, 0.0, -0.25)).unwrap();
    b.material.refractive_index = 2.0;
    let mut c = Shape::glass_sphere().with_transform(Matrix4D::translation(0.0, 0.0, 0.25)).unwrap();
    c.material.refractive_index = 2.5;

    let (a, b, c) = (arena.insert(a), arena.insert(b), arena.insert(c));

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -4.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let xs = vec![
        Intersection::new(2.0, a),
        Intersection::new(2.75, b),
        Intersection::new(3.25, c),
        Intersection::new(4.75, b),
        Intersection::new(5.25, c),
        Intersection::new(6.0, a),
    ];
    let expected = [
        (1.0, 1.5), (1.5, 2.0), (2.0, 2.5), (2.5, 2.5), (2.5, 1.5), (1.5, 1.0),
    ];

    for (i, &(n1, n2)) in xs.iter().zip(expected.iter()) {
        let comps = IntersectionComputation::new(&r, i, &xs, &arena);
        assert_eq!((comps.n1, comps.n2), (n1, n2));
    }
}

#[test]
fn schlick_under_total_internal_reflection() {
    use crate::shape::Shape;

    let (arena, s) = lone(Shape::glass_sphere());
    let k = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, k), Tuple4D::vector(0.0, 1.0, 0.0));
    let xs = [Intersection::new(-k, s), Intersection::new(k, s)];
    let comps = IntersectionComputation::new(&r, &xs[1], &xs, &arena);

    assert_eq!(comps.schlick(), 1.0);
}

#[test]
fn schlick_with_perpendicular_ray() {
    use crate::shape::Shape;

    let (arena, s) = lone(Shape::glass_sphere());
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, 0.0), Tuple4D::vector(0.0, 1.0, 0.0));
    let xs = [Intersection::new(-1.0, s), Intersection::new(1.0, s)];
    let comps = IntersectionComputation::new(&r, &xs[1], &xs, &arena);

    assert!((comps.schlick() - 0.04).abs() < EPSILON);
}

#[test]
fn schlick_with_small_angle_and_n2_above_n1() {
    use crate::shape::Shape;

    let (arena, s) = lone(Shape::glass_sphere());
    let r = Ray4D::new(Tuple4D::point(0.0, 0.99, -2.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let xs = [Intersection::new(1.8589, s)];
    let comps = IntersectionComputation::new(&r, &xs[0], &xs, &arena);

    assert!((comps.schlick() - 0.48873).abs() < 0.001);
}
