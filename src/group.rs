//! Ownership of every shape in a scene, and the group hierarchy between them.
//!
//! Shapes are stored flat and refer to one another by `ShapeId`. A group
//! lists its children; each child records its parent. Both links are set
//! together by `ShapeArena::add_child`, which refuses anything that would
//! give a shape two parents or make a group contain itself.

use std::ops::Index;

use crate::shape::{ Shape, ShapeId, ShapeType };
use crate::intersect::{ Intersection, Intersections };
use crate::tuple::Tuple4D;
use crate::ray::Ray4D;
use crate::error::{ Result, TracerError };

#[derive(Debug, Clone, Default)]
pub struct ShapeArena {
    shapes: Vec<Shape>,
}

impl ShapeArena {
    pub fn new() -> ShapeArena {
        ShapeArena { shapes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Takes ownership of a shape and hands back its id.
    ///
    /// The shape enters the arena unparented; a group enters with no
    /// children, whatever links the value carried before.
    pub fn insert(&mut self, mut shape: Shape) -> ShapeId {
        shape.clear_parent();
        if let Some(children) = shape.children_mut() {
            children.clear();
        }

        let id = ShapeId(self.shapes.len());
        self.shapes.push(shape);

        id
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(id.0)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(id.0)
    }

    /// Makes `child` a member of `group`.
    pub fn add_child(&mut self, group: ShapeId, child: ShapeId) -> Result<()> {
        let parent = self.get(group).ok_or(TracerError::UnknownShape(group))?;
        let member = self.get(child).ok_or(TracerError::UnknownShape(child))?;

        if !parent.is_group() {
            return Err(TracerError::NotAGroup(group));
        }

        if member.parent().is_some() {
            return Err(TracerError::AlreadyParented(child));
        }

        if self.ancestry(group).any(|id| id == child) {
            return Err(TracerError::CyclicGroup { group, child });
        }

        if let Some(children) = self.shapes[group.0].children_mut() {
            children.push(child);
        }
        self.shapes[child.0].set_parent(group);

        Ok(())
    }

    /// `id` itself, then its parent, grandparent and so on.
    fn ancestry(&self, id: ShapeId) -> impl Iterator<Item = ShapeId> + '_ {
        std::iter::successors(Some(id), move |&id| self[id].parent())
    }

    /// Intersects a ray, given in the space `id`'s parent lives in, with the
    /// shape (or every shape below the group) at `id`.
    pub fn intersect(&self, id: ShapeId, ray: &Ray4D) -> Intersections {
        let mut xs = Vec::new();
        self.intersect_into(id, ray, &mut xs);

        Intersections::new(xs)
    }

    fn intersect_into(&self, id: ShapeId, ray: &Ray4D, xs: &mut Vec<Intersection>) {
        let shape = &self[id];
        let local = ray.transform(shape.inverse());

        match shape.ty() {
            ShapeType::Group(children) => {
                for &child in children {
                    self.intersect_into(child, &local, xs);
                }
            }
            _ => {
                xs.extend(shape.local_intersect(&local)
                    .into_iter()
                    .map(|t| Intersection::new(t, id)));
            }
        }
    }

    /// Converts a world-space point into `id`'s object space, passing through
    /// every enclosing group from the outermost inward.
    pub fn world_to_object(&self, id: ShapeId, point: &Tuple4D) -> Tuple4D {
        let shape = &self[id];
        let point = match shape.parent() {
            Some(parent) => self.world_to_object(parent, point),
            None => *point,
        };

        *shape.inverse() * point
    }

    /// Converts an object-space normal on `id` into world space.
    pub fn normal_to_world(&self, id: ShapeId, normal: &Tuple4D) -> Tuple4D {
        let shape = &self[id];

        let mut normal = *shape.inverse_transpose() * *normal;
        normal.w = 0.0;
        let normal = normal.normalize();

        match shape.parent() {
            Some(parent) => self.normal_to_world(parent, &normal),
            None => normal,
        }
    }

    /// World-space surface normal of `id` at a world-space point.
    pub fn normal_at(&self, id: ShapeId, world_point: &Tuple4D) -> Tuple4D {
        let local_point = self.world_to_object(id, world_point);
        let local_normal = self[id].local_normal_at(&local_point);

        self.normal_to_world(id, &local_normal)
    }
}

impl Index<ShapeId> for ShapeArena {
    type Output = Shape;

    fn index(&self, id: ShapeId) -> &Shape {
        &self.shapes[id.0]
    }
}

#[test]
fn adding_child_links_both_ways() {
    let mut arena = ShapeArena::new();
    let g = arena.insert(Shape::group());
    let s = arena.insert(Shape::sphere());

    arena.add_child(g, s).unwrap();

    assert_eq!(arena[g].children(), &[s]);
    assert_eq!(arena[s].parent(), Some(g));
    assert_eq!(arena[g].parent(), None);
}

#[test]
fn ray_misses_empty_group() {
    let mut arena = ShapeArena::new();
    let g = arena.insert(Shape::group());
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, 0.0), Tuple4D::vector(0.0, 0.0, 1.0));

    assert!(arena.intersect(g, &r).intersections.is_empty());
}

#[test]
fn ray_hits_children_of_group() {
    use crate::matrix::Matrix4D;

    let mut arena = ShapeArena::new();
    let g = arena.insert(Shape::group());
    let s1 = arena.insert(Shape::sphere());
    let s2 = arena.insert(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, -3.0)).unwrap());
    let s3 = arena.insert(Shape::sphere()
        .with_transform(Matrix4D::translation(5.0, 0.0, 0.0)).unwrap());
    for s in [s1, s2, s3] {
        arena.add_child(g, s).unwrap();
    }

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let xs = arena.intersect(g, &r).intersections;

    let objects: Vec<ShapeId> = xs.iter().map(|i| i.object).collect();
    assert_eq!(objects, vec![s2, s2, s1, s1]);
}

#[test]
fn group_transform_applies_to_children() {
    use crate::matrix::Matrix4D;

    let mut arena = ShapeArena::new();
    let g = arena.insert(Shape::group()
        .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap());
    let s = arena.insert(Shape::sphere()
        .with_transform(Matrix4D::translation(5.0, 0.0, 0.0)).unwrap());
    arena.add_child(g, s).unwrap();

    let r = Ray4D::new(Tuple4D::point(10.0, 0.0, -10.0), Tuple4D::vector(0.0, 0.0, 1.0));

    assert_eq!(arena.intersect(g, &r).intersections.len(), 2);
}

#[cfg(test)]
fn nested_scene() -> (ShapeArena, ShapeId) {
    use std::f64::consts::PI;
    use crate::matrix::Matrix4D;

    let mut arena = ShapeArena::new();
    let g1 = arena.insert(Shape::group()
        .with_transform(Matrix4D::rotation_y(PI / 2.0)).unwrap());
    let g2 = arena.insert(Shape::group()
        .with_transform(Matrix4D::scaling(1.0, 2.0, 3.0)).unwrap());
    let s = arena.insert(Shape::sphere()
        .with_transform(Matrix4D::translation(5.0, 0.0, 0.0)).unwrap());

    arena.add_child(g1, g2).unwrap();
    arena.add_child(g2, s).unwrap();

    (arena, s)
}

#[test]
fn point_from_world_to_nested_object_space() {
    use std::f64::consts::PI;
    use crate::matrix::Matrix4D;

    let mut arena = ShapeArena::new();
    let g1 = arena.insert(Shape::group()
        .with_transform(Matrix4D::rotation_y(PI / 2.0)).unwrap());
    let g2 = arena.insert(Shape::group()
        .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap());
    let s = arena.insert(Shape::sphere()
        .with_transform(Matrix4D::translation(5.0, 0.0, 0.0)).unwrap());
    arena.add_child(g1, g2).unwrap();
    arena.add_child(g2, s).unwrap();

    assert_eq!(arena.world_to_object(s, &Tuple4D::point(-2.0, 0.0, -10.0)),
        Tuple4D::point(0.0, 0.0, -1.0));
}

#[test]
fn normal_from_nested_object_space_to_world() {
    let (arena, s) = nested_scene();
    let k = 3.0f64.sqrt() / 3.0;

    assert_eq!(arena.normal_to_world(s, &Tuple4D::vector(k, k, k)),
        Tuple4D::vector(2.0 / 7.0, 3.0 / 7.0, -6.0 / 7.0));
}

#[test]
fn normal_on_nested_child() {
    let (arena, s) = nested_scene();
    let n = arena.normal_at(s, &Tuple4D::point(1.7321, 1.1547, -5.5774));

    assert!(n.approx_eq(&Tuple4D::vector(0.2857, 0.4286, -0.8571), 0.0001));
}

#[test]
fn only_groups_take_children() {
    let mut arena = ShapeArena::new();
    let s1 = arena.insert(Shape::sphere());
    let s2 = arena.insert(Shape::sphere());

    assert!(matches!(arena.add_child(s1, s2), Err(TracerError::NotAGroup(id)) if id == s1));
    assert_eq!(arena[s2].parent(), None);
}

#[test]
fn shape_cannot_have_two_parents() {
    let mut arena = ShapeArena::new();
    let g1 = arena.insert(Shape::group());
    let g2 = arena.insert(Shape::group());
    let s = arena.insert(Shape::cube());

    arena.add_child(g1, s).unwrap();

    assert!(matches!(arena.add_child(g2, s), Err(TracerError::AlreadyParented(_))));
    assert!(arena[g2].children().is_empty());
}

#[test]
fn group_cannot_contain_itself() {
    let mut arena = ShapeArena::new();
    let outer = arena.insert(Shape::group());
    let inner = arena.insert(Shape::group());
    arena.add_child(outer, inner).unwrap();

    assert!(matches!(arena.add_child(inner, inner),
        Err(TracerError::CyclicGroup { .. })));
    assert!(matches!(arena.add_child(inner, outer),
        Err(TracerError::CyclicGroup { .. })));
}

#[test]
fn unknown_ids_are_rejected() {
    let mut arena = ShapeArena::new();
    let g = arena.insert(Shape::group());

    assert!(matches!(arena.add_child(g, ShapeId(7)),
        Err(TracerError::UnknownShape(ShapeId(7)))));
    assert!(arena.get(ShapeId(7)).is_none());
}

#[test]
fn inserting_a_copy_drops_old_links() {
    let mut arena = ShapeArena::new();
    let g = arena.insert(Shape::group());
    let s = arena.insert(Shape::sphere());
    arena.add_child(g, s).unwrap();

    let copy = arena.insert(arena[g].clone());
    let lone = arena.insert(arena[s].clone());

    assert!(arena[copy].children().is_empty());
    assert_eq!(arena[lone].parent(), None);
}
