use crate::ray::Ray4D;
use crate::tuple::Tuple4D;
use crate::color::Color;
use crate::matrix::Matrix4D;
use crate::light::{ PointLight, Material, lighting };
use crate::shape::{ Shape, ShapeId };
use crate::group::ShapeArena;
use crate::intersect::{ Intersections, IntersectionComputation };
use crate::error::{ Result, TracerError };

/// A world with objects and light.
///
/// Every shape, grouped or not, is owned by the world's `ShapeArena`. The
/// top-level objects are the roots rays are cast against; shapes inside a
/// group are reached through that group.
///
/// Worlds collect all objects as well as light for rendering. Most logic is
/// performed within worlds for the ray tracer. Rendering only ever borrows a
/// world immutably.
#[derive(Debug, Clone)]
pub struct World {
    pub light_source: PointLight,
    shapes: ShapeArena,
    objects: Vec<ShapeId>,
}

impl Default for World {
    fn default() -> World {
        let light_source = PointLight::new(
            Color::rgb(1.0, 1.0, 1.0),
            Tuple4D::point(-10.0, 10.0, -10.0)
        );

        let mut s1 = Shape::sphere();
        s1.material = Material {
            color: Color::rgb(0.8, 1.0, 0.6),
            diffuse: 0.7,
            specular: 0.2,
            ..Default::default()
        };

        let mut s2 = Shape::sphere();
        let half = Matrix4D::scaling(0.5, 0.5, 0.5);
        if s2.set_transform(half).is_err() {
            unreachable!("Uniform scaling by one half is invertible.");
        }

        let mut world = World { light_source, ..World::empty() };
        world.add_object(s1);
        world.add_object(s2);

        world
    }
}

impl World {
    /// Creates a default world with two concentric spheres.
    pub fn new() -> World {
        Default::default()
    }

    /// Creates an empty world with no objects and the default light source.
    pub fn empty() -> World {
        World {
            light_source: Default::default(),
            shapes: ShapeArena::new(),
            objects: Vec::new(),
        }
    }

    /// Adds a shape at the top level of the world.
    pub fn add_object(&mut self, shape: Shape) -> ShapeId {
        let id = self.shapes.insert(shape);
        self.objects.push(id);

        id
    }

    /// Adds a shape as a child of an existing group.
    pub fn add_to_group(&mut self, group: ShapeId, shape: Shape) -> Result<ShapeId> {
        // Validate before inserting so a bad group leaves no orphan behind.
        match self.shapes.get(group) {
            None => return Err(TracerError::UnknownShape(group)),
            Some(g) if !g.is_group() => return Err(TracerError::NotAGroup(group)),
            Some(_) => {}
        }

        let id = self.shapes.insert(shape);
        self.shapes.add_child(group, id)?;

        Ok(id)
    }

    /// Top-level objects, in insertion order.
    pub fn objects(&self) -> &[ShapeId] {
        &self.objects
    }

    /// Every shape in the world, including grouped ones.
    pub fn shapes(&self) -> &ShapeArena {
        &self.shapes
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(id)
    }

    pub fn material_mut(&mut self, id: ShapeId) -> Option<&mut Material> {
        self.shapes.get_mut(id).map(|s| s.material_mut())
    }

    pub fn set_transform(&mut self, id: ShapeId, transform: Matrix4D) -> Result<()> {
        self.shapes.get_mut(id)
            .ok_or(TracerError::UnknownShape(id))?
            .set_transform(transform)
    }

    /// Intersects a ray against all objects in a world, sorted by `t`.
    pub fn intersect(&self, r: &Ray4D) -> Intersections {
        let mut intersections = Intersections::default();
        for &id in self.objects.iter() {
            intersections.intersections.extend(
                self.shapes.intersect(id, r).intersections
            );
        }

        intersections.sort();
        intersections
    }

    /// Determines whether a point is shadowed from the light source.
    pub fn is_shadowed(&self, p: &Tuple4D) -> bool {
        let v = self.light_source.position - *p;
        let distance = v.magnitude();
        let direction = v.normalize();

        let r = Ray4D::new(*p, direction);

        match self.intersect(&r).hit() {
            Some(i) => i.t < distance,
            None => false,
        }
    }

    /// Calculates the color for a hit, based on shadows, light, reflection
    /// and refraction.
    ///
    /// `remaining` bounds how many more bounces reflected and refracted rays
    /// may take.
    pub fn shade_hit(&self, comps: &IntersectionComputation, remaining: usize)
        -> Color {
        let m = &self.shapes[comps.object].material;
        let object_point = self.shapes.world_to_object(comps.object,
            &comps.over_point);

        let surface = lighting(m, &self.light_source, &comps.over_point,
            &object_point, &comps.eyev, &comps.normalv,
            self.is_shadowed(&comps.over_point));

        let reflected = self.reflected_color(comps, remaining);
        let refracted = self.refracted_color(comps, remaining);

        if m.reflective > 0.0 && m.transparency > 0.0 {
            let reflectance = comps.schlick();
            surface + reflected * reflectance + refracted * (1.0 - reflectance)
        } else {
            surface + reflected + refracted
        }
    }

    /// Color seen along the reflection of the hit, scaled by how reflective
    /// the surface is.
    pub fn reflected_color(&self, comps: &IntersectionComputation,
        remaining: usize) -> Color {
        let reflective = self.shapes[comps.object].material.reflective;
        if remaining < 1 || reflective == 0.0 {
            return Color::black();
        }

        let r = Ray4D::new(comps.over_point, comps.reflectv);
        self.color_at(&r, remaining - 1) * reflective
    }

    /// Color seen through the hit surface, bent by Snell's law and scaled by
    /// how transparent the surface is.
    pub fn refracted_color(&self, comps: &IntersectionComputation,
        remaining: usize) -> Color {
        let transparency = self.shapes[comps.object].material.transparency;
        if remaining == 0 || transparency == 0.0 {
            return Color::black();
        }

        let n_ratio = comps.n1 / comps.n2;
        let cos_i = comps.eyev.dot(&comps.normalv);
        let sin2_t = n_ratio.powi(2) * (1.0 - cos_i.powi(2));

        // Total internal reflection
        if sin2_t > 1.0 {
            return Color::black();
        }

        let cos_t = (1.0 - sin2_t).sqrt();
        let direction = comps.normalv * (n_ratio * cos_i - cos_t)
            - comps.eyev * n_ratio;

        let r = Ray4D::new(comps.under_point, direction);
        self.color_at(&r, remaining - 1) * transparency
    }

    /// Determines a color based on the intersection of a ray and the objects.
    ///
    /// Rays that hit nothing are black.
    pub fn color_at(&self, r: &Ray4D, remaining: usize) -> Color {
        let xs = self.intersect(r);

        match xs.hit() {
            None => Color::black(),
            Some(i) => {
                let comps = IntersectionComputation::new(r, &i,
                    &xs.intersections, &self.shapes);
                self.shade_hit(&comps, remaining)
            },
        }
    }
}

#[cfg(test)]
fn close(left: Color, right: Color) {
    assert!(left.approx_eq(&right, 0.0001), "{:?} != {:?}", left, right);
}

#[test]
fn intersect_default_world_with_ray() {
    let w: World = Default::default();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    let is: Intersections = w.intersect(&r);

    assert_eq!(is.intersections.len(), 4);
    assert_eq!(is.intersections[0].t, 4.0);
    assert_eq!(is.intersections[1].t, 4.5);
    assert_eq!(is.intersections[2].t, 5.5);
    assert_eq!(is.intersections[3].t, 6.0);
}

#[test]
fn shade_intersection_from_outside() {
    use crate::intersect::Intersection;

    let w: World = Default::default();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );

    let i = Intersection::new(4.0, w.objects()[0]);
    let comps = IntersectionComputation::new(&r, &i, &[i], w.shapes());

    close(w.shade_hit(&comps, 5), Color::rgb(0.38066, 0.47583, 0.2855));
}

#[test]
fn shade_intersection_from_inside() {
    use crate::intersect::Intersection;

    let mut w: World = Default::default();
    w.light_source = PointLight::new(
        Color::rgb(1.0, 1.0, 1.0),
        Tuple4D::point(0.0, 0.25, 0.0),
    );

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    let i = Intersection::new(0.5, w.objects()[1]);
    let comps = IntersectionComputation::new(&r, &i, &[i], w.shapes());

    close(w.shade_hit(&comps, 5), Color::rgb(0.90498, 0.90498, 0.90498));
}

#[test]
fn shade_intersection_in_shadow() {
    use crate::intersect::Intersection;

    let mut w: World = World::empty();
    w.light_source = PointLight::new(
        Color::rgb(1.0, 1.0, 1.0),
        Tuple4D::point(0.0, 0.0, -10.0),
    );

    w.add_object(Shape::sphere());
    let s2 = w.add_object(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, 10.0)).unwrap());

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    let i = Intersection::new(4.0, s2);
    let comps = IntersectionComputation::new(&r, &i, &[i], w.shapes());

    assert_eq!(w.shade_hit(&comps, 5), Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn color_ray_miss() {
    let w: World = Default::default();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 1.0, 0.0),
    );

    assert_eq!(w.color_at(&r, 5), Color::black());
}

#[test]
fn color_ray_hit() {
    let w: World = Default::default();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    close(w.color_at(&r, 5), Color::rgb(0.38066, 0.47583, 0.2855));
}

#[test]
fn color_behind_ray() {
    let mut w: World = Default::default();
    let (outer, inner) = (w.objects()[0], w.objects()[1]);
    w.material_mut(outer).unwrap().ambient = 1.0;
    w.material_mut(inner).unwrap().ambient = 1.0;

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.75),
        Tuple4D::vector(0.0, 0.0, -1.0)
    );

    let inner_color = w.shape(inner).unwrap().material.color;
    assert_eq!(w.color_at(&r, 5), inner_color);
}

#[test]
fn shadow_collinear_point_and_light() {
    let w: World = Default::default();
    assert!(!w.is_shadowed(&Tuple4D::point(0.0, 10.0, 0.0)));
}

#[test]
fn shadow_light_between_point_and_spheres() {
    let w: World = Default::default();
    assert!(w.is_shadowed(&Tuple4D::point(10.0, -10.0, 10.0)));
}

#[test]
fn shadow_object_behind_light() {
    let w: World = Default::default();
    assert!(!w.is_shadowed(&Tuple4D::point(-20.0, 20.0, -20.0)));
}

#[test]
fn shadow_object_behind_point() {
    let w: World = Default::default();
    assert!(!w.is_shadowed(&Tuple4D::point(-2.0, 2.0, -2.0)));
}

#[test]
fn grouped_shapes_are_rendered_through_their_group() {
    let mut w = World::empty();
    w.light_source = PointLight::new(Color::white(), Tuple4D::point(-10.0, 10.0, -10.0));

    let g = w.add_object(Shape::group()
        .with_transform(Matrix4D::translation(0.0, 0.0, 5.0)).unwrap());
    let s = w.add_to_group(g, Shape::sphere()).unwrap();

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let xs = w.intersect(&r);

    assert_eq!(w.objects(), &[g]);
    assert_eq!(xs.intersections.len(), 2);
    assert_eq!(xs.hit().map(|i| (i.t, i.object)), Some((9.0, s)));
}

#[cfg(test)]
fn flat_shaded(pattern: crate::pattern::Pattern) -> Material {
    Material {
        pattern: Some(pattern),
        ambient: 1.0,
        diffuse: 0.0,
        specular: 0.0,
        ..Default::default()
    }
}

#[cfg(test)]
fn shade_first_hit(w: &World, r: &Ray4D) -> Color {
    let xs = w.intersect(r);
    let hit = xs.hit().unwrap();
    let comps = IntersectionComputation::new(r, &hit, &xs.intersections, w.shapes());

    w.shade_hit(&comps, 0)
}

#[test]
fn shading_samples_pattern_through_object_and_pattern_transforms() {
    use crate::pattern::Pattern;

    let mut w = World::empty();
    w.light_source = PointLight::new(Color::white(), Tuple4D::point(-10.0, 10.0, -10.0));
    let stripes = Pattern::stripe(Color::white(), Color::black())
        .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap();
    w.add_object(Shape::sphere()
        .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap()
        .with_material(flat_shaded(stripes)));

    // Hits at world x == 2, which is pattern x == 0.5.
    let r = Ray4D::new(Tuple4D::point(5.0, 0.0, 0.0), Tuple4D::vector(-1.0, 0.0, 0.0));
    close(shade_first_hit(&w, &r), Color::white());

    // Hits at world x == -2, which is pattern x == -0.5.
    let r = Ray4D::new(Tuple4D::point(-5.0, 0.0, 0.0), Tuple4D::vector(1.0, 0.0, 0.0));
    close(shade_first_hit(&w, &r), Color::black());
}

#[test]
fn shading_samples_pattern_through_every_enclosing_group() {
    use crate::pattern::Pattern;

    let mut w = World::empty();
    w.light_source = PointLight::new(Color::white(), Tuple4D::point(-10.0, 10.0, -10.0));
    let g = w.add_object(Shape::group()
        .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap());

    let sampler = Pattern::test()
        .with_transform(Matrix4D::translation(0.0, 0.0, -3.0)).unwrap();
    w.add_to_group(g, Shape::sphere()
        .with_transform(Matrix4D::translation(0.5, 0.0, 0.0)).unwrap()
        .with_material(flat_shaded(sampler))).unwrap();

    // World (1, 0, -2) is object (0, 0, -1) and pattern (0, 0, 2).
    let r = Ray4D::new(Tuple4D::point(1.0, 0.0, -10.0), Tuple4D::vector(0.0, 0.0, 1.0));
    close(shade_first_hit(&w, &r), Color::rgb(0.0, 0.0, 2.0));
}

#[test]
fn adding_to_a_non_group_leaves_world_unchanged() {
    let mut w = World::empty();
    let s = w.add_object(Shape::sphere());

    assert!(matches!(w.add_to_group(s, Shape::cube()), Err(TracerError::NotAGroup(_))));
    assert_eq!(w.shapes().len(), 1);
}

#[test]
fn reflected_color_for_nonreflective_material() {
    use crate::intersect::Intersection;

    let mut w: World = Default::default();
    let inner = w.objects()[1];
    w.material_mut(inner).unwrap().ambient = 1.0;

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, 0.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let i = Intersection::new(1.0, inner);
    let comps = IntersectionComputation::new(&r, &i, &[i], w.shapes());

    assert_eq!(w.reflected_color(&comps, 5), Color::black());
}

#[cfg(test)]
fn world_with_reflective_floor() -> (World, ShapeId) {
    let mut w: World = Default::default();
    let mut plane = Shape::plane()
        .with_transform(Matrix4D::translation(0.0, -1.0, 0.0)).unwrap();
    plane.material.reflective = 0.5;

    let id = w.add_object(plane);
    (w, id)
}

#[test]
fn reflected_color_for_reflective_material() {
    use crate::intersect::Intersection;

    let (w, plane) = world_with_reflective_floor();
    let k = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -3.0), Tuple4D::vector(0.0, -k, k));
    let i = Intersection::new(2.0f64.sqrt(), plane);
    let comps = IntersectionComputation::new(&r, &i, &[i], w.shapes());

    close(w.reflected_color(&comps, 5), Color::rgb(0.19032, 0.2379, 0.14274));
    close(w.shade_hit(&comps, 5), Color::rgb(0.87677, 0.92436, 0.82918));
}

#[test]
fn reflected_color_at_maximum_depth() {
    use crate::intersect::Intersection;

    let (w, plane) = world_with_reflective_floor();
    let k = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -3.0), Tuple4D::vector(0.0, -k, k));
    let i = Intersection::new(2.0f64.sqrt(), plane);
    let comps = IntersectionComputation::new(&r, &i, &[i], w.shapes());

    assert_eq!(w.reflected_color(&comps, 0), Color::black());
}

#[test]
fn mutually_reflective_surfaces_terminate() {
    let mut w = World::empty();
    w.light_source = PointLight::new(Color::white(), Tuple4D::point(0.0, 0.0, 0.0));

    let mut lower = Shape::plane()
        .with_transform(Matrix4D::translation(0.0, -1.0, 0.0)).unwrap();
    lower.material.reflective = 1.0;
    let mut upper = Shape::plane()
        .with_transform(Matrix4D::translation(0.0, 1.0, 0.0)).unwrap();
    upper.material.reflective = 1.0;
    w.add_object(lower);
    w.add_object(upper);

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, 0.0), Tuple4D::vector(0.0, 1.0, 0.0));
    let c = w.color_at(&r, 5);

    assert!(c.r.is_finite() && c.r > 0.0);
}

#[test]
fn refracted_color_with_opaque_surface() {
    use crate::intersect::Intersection;

    let w: World = Default::default();
    let s = w.objects()[0];
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let xs = [Intersection::new(4.0, s), Intersection::new(6.0, s)];
    let comps = IntersectionComputation::new(&r, &xs[0], &xs, w.shapes());

    assert_eq!(w.refracted_color(&comps, 5), Color::black());
}

#[test]
fn refracted_color_at_maximum_depth() {
    use crate::intersect::Intersection;

    let mut w: World = Default::default();
    let s = w.objects()[0];
    {
        let m = w.material_mut(s).unwrap();
        m.transparency = 1.0;
        m.refractive_index = 1.5;
    }

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let xs = [Intersection::new(4.0, s), Intersection::new(6.0, s)];
    let comps = IntersectionComputation::new(&r, &xs[0], &xs, w.shapes());

    assert_eq!(w.refracted_color(&comps, 0), Color::black());
}

#[test]
fn refracted_color_under_total_internal_reflection() {
    use crate::intersect::Intersection;

    let mut w: World = Default::default();
    let s = w.objects()[0];
    {
        let m = w.material_mut(s).unwrap();
        m.transparency = 1.0;
        m.refractive_index = 1.5;
    }

    let k = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, k), Tuple4D::vector(0.0, 1.0, 0.0));
    let xs = [Intersection::new(-k, s), Intersection::new(k, s)];

    // Inside the sphere, so the second intersection is the one that matters
    let comps = IntersectionComputation::new(&r, &xs[1], &xs, w.shapes());

    assert_eq!(w.refracted_color(&comps, 5), Color::black());
}

#[test]
fn refracted_color_with_refracted_ray() {
    use crate::intersect::Intersection;
    use crate::pattern::Pattern;

    let mut w: World = Default::default();
    let (a, b) = (w.objects()[0], w.objects()[1]);
    {
        let m = w.material_mut(a).unwrap();
        m.ambient = 1.0;
        m.pattern = Some(Pattern::test());
    }
    {
        let m = w.material_mut(b).unwrap();
        m.transparency = 1.0;
        m.refractive_index = 1.5;
    }

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, 0.1), Tuple4D::vector(0.0, 1.0, 0.0));
    let xs = [
        Intersection::new(-0.9899, a),
        Intersection::new(-0.4899, b),
        Intersection::new(0.4899, b),
        Intersection::new(0.9899, a),
    ];
    let comps = IntersectionComputation::new(&r, &xs[2], &xs, w.shapes());
    let c = w.refracted_color(&comps, 5);

    assert!(c.approx_eq(&Color::rgb(0.0, 0.99888, 0.04725), 0.001), "{:?}", c);
}

#[cfg(test)]
fn world_with_glass_floor(reflective: f64) -> (World, ShapeId) {
    let mut w: World = Default::default();

    let mut floor = Shape::plane()
        .with_transform(Matrix4D::translation(0.0, -1.0, 0.0)).unwrap();
    floor.material.transparency = 0.5;
    floor.material.refractive_index = 1.5;
    floor.material.reflective = reflective;
    let floor = w.add_object(floor);

    let mut ball = Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, -3.5, -0.5)).unwrap();
    ball.material.color = Color::rgb(1.0, 0.0, 0.0);
    ball.material.ambient = 0.5;
    w.add_object(ball);

    (w, floor)
}

#[test]
fn shade_hit_with_transparent_material() {
    use crate::intersect::Intersection;

    let (w, floor) = world_with_glass_floor(0.0);
    let k = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -3.0), Tuple4D::vector(0.0, -k, k));
    let i = Intersection::new(2.0f64.sqrt(), floor);
    let comps = IntersectionComputation::new(&r, &i, &[i], w.shapes());

    close(w.shade_hit(&comps, 5), Color::rgb(0.93642, 0.68642, 0.68642));
}

#[test]
fn shade_hit_with_reflective_transparent_material() {
    use crate::intersect::Intersection;

    let (w, floor) = world_with_glass_floor(0.5);
    let k = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -3.0), Tuple4D::vector(0.0, -k, k));
    let i = Intersection::new(2.0f64.sqrt(), floor);
    let comps = IntersectionComputation::new(&r, &i, &[i], w.shapes());

    close(w.shade_hit(&comps, 5), Color::rgb(0.93391, 0.69643, 0.69243));
}
