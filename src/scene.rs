//! JSON scene descriptions.
//!
//! A scene file names the canvas size, camera placement, one point light and
//! a tree of shapes. Groups nest their members under `children`. Transforms
//! are lists of steps applied in the order written.
//!
//! ```json
//! {
//!   "canvas_width": 320, "canvas_height": 180, "field_of_view": 1.0472,
//!   "camera_from": [0, 1.5, -5], "camera_to": [0, 1, 0], "camera_up": [0, 1, 0],
//!   "light": { "intensity": [1, 1, 1], "position": [-10, 10, -10] },
//!   "shapes": [
//!     { "ty": "plane",
//!       "material": { "pattern": { "ty": "checker", "a": [1, 1, 1], "b": [0, 0, 0] } } },
//!     { "ty": "sphere",
//!       "transform": [ { "scale": [0.5, 0.5, 0.5] }, { "translate": [0, 1, 0] } ] }
//!   ]
//! }
//! ```

use std::convert::TryFrom;
use std::fs;
use std::path::Path;

use log::debug;
use serde::{ Serialize, Deserialize };

use crate::tuple::Tuple4D;
use crate::matrix::Matrix4D;
use crate::color::Color;
use crate::pattern::Pattern;
use crate::light::{ Material, PointLight };
use crate::shape::{ Shape, ShapeId };
use crate::world::World;
use crate::camera::Camera;
use crate::error::{ Result, TracerError };

/// A world and the camera to view it through.
#[derive(Debug, Clone)]
pub struct Scene {
    pub world: World,
    pub camera: Camera,
}

impl Scene {
    pub fn from_json(json: &str) -> Result<Scene> {
        let scene_json: SceneJson = serde_json::from_str(json)?;
        Scene::try_from(scene_json)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Scene> {
        let path = path.as_ref();
        debug!("Loading scene from {}", path.display());

        Scene::from_json(&fs::read_to_string(path)?)
    }
}

impl TryFrom<SceneJson> for Scene {
    type Error = TracerError;

    fn try_from(scene_json: SceneJson) -> Result<Scene> {
        if scene_json.canvas_width == 0 || scene_json.canvas_height == 0 {
            return Err(TracerError::Scene(format!(
                "Canvas must not be empty, got {}x{}",
                scene_json.canvas_width, scene_json.canvas_height
            )));
        }

        // Create the camera transform from the view parameters.
        let [ux, uy, uz] = scene_json.camera_up;
        let camera_transform = Matrix4D::view_transform(
            scene_json.camera_from.into(),
            scene_json.camera_to.into(),
            Tuple4D::vector(ux, uy, uz),
        );

        let camera = Camera::new(
            scene_json.canvas_width,
            scene_json.canvas_height,
            scene_json.field_of_view,
        ).with_transform(camera_transform)?;

        let mut world = World::empty();
        world.light_source = PointLight::new(
            scene_json.light.intensity.into(),
            scene_json.light.position.into(),
        );

        for shape_json in scene_json.shapes {
            shape_json.add_to(&mut world, None)?;
        }

        debug!("Scene has {} top-level objects and {} shapes in total",
            world.objects().len(), world.shapes().len());

        Ok(Scene { world, camera })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneJson {
    pub canvas_width: usize,
    pub canvas_height: usize,
    pub field_of_view: f64,

    pub camera_from: [f64; 3],
    pub camera_to: [f64; 3],
    pub camera_up: [f64; 3],

    pub light: LightJson,

    #[serde(default)]
    pub shapes: Vec<ShapeJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightJson {
    pub intensity: [f64; 3],
    pub position: [f64; 3],
}

/// One step of a transform list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformJson {
    Translate([f64; 3]),
    Scale([f64; 3]),
    RotateX(f64),
    RotateY(f64),
    RotateZ(f64),

    /// `[xy, xz, yx, yz, zx, zy]`
    Shear([f64; 6]),
}

impl From<TransformJson> for Matrix4D {
    fn from(step: TransformJson) -> Matrix4D {
        match step {
            TransformJson::Translate([x, y, z]) => Matrix4D::translation(x, y, z),
            TransformJson::Scale([x, y, z]) => Matrix4D::scaling(x, y, z),
            TransformJson::RotateX(r) => Matrix4D::rotation_x(r),
            TransformJson::RotateY(r) => Matrix4D::rotation_y(r),
            TransformJson::RotateZ(r) => Matrix4D::rotation_z(r),
            TransformJson::Shear([xy, xz, yx, yz, zx, zy])
                => Matrix4D::shearing(xy, xz, yx, yz, zx, zy),
        }
    }
}

fn chain(steps: &[TransformJson]) -> Matrix4D {
    let steps: Vec<Matrix4D> = steps.iter().map(|&s| s.into()).collect();
    Matrix4D::chain(&steps)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialJson {
    pub color: Option<[f64; 3]>,
    pub pattern: Option<PatternJson>,

    pub ambient: Option<f64>,
    pub diffuse: Option<f64>,
    pub specular: Option<f64>,
    pub shininess: Option<f64>,

    pub reflective: Option<f64>,
    pub transparency: Option<f64>,
    pub refractive_index: Option<f64>,
}

impl MaterialJson {
    /// Overrides the fields this description sets, keeping the rest of
    /// `base`.
    fn apply(&self, base: Material) -> Result<Material> {
        let refractive_index = self.refractive_index.unwrap_or(base.refractive_index);
        if refractive_index <= 0.0 {
            return Err(TracerError::Scene(format!(
                "Refractive index must be positive, got {}", refractive_index
            )));
        }

        let reflective = self.reflective.unwrap_or(base.reflective);
        let transparency = self.transparency.unwrap_or(base.transparency);
        for (name, weight) in [("Reflective", reflective), ("Transparency", transparency)] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(TracerError::Scene(format!(
                    "{} weight must lie in [0, 1], got {}", name, weight
                )));
            }
        }

        let pattern = match self.pattern {
            Some(ref pattern) => Some(pattern.build()?),
            None => base.pattern,
        };

        Ok(Material {
            color: self.color.map_or(base.color, Color::from),
            pattern,

            ambient: self.ambient.unwrap_or(base.ambient),
            diffuse: self.diffuse.unwrap_or(base.diffuse),
            specular: self.specular.unwrap_or(base.specular),
            shininess: self.shininess.unwrap_or(base.shininess),

            reflective,
            transparency,
            refractive_index,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternJson {
    pub ty: String,
    pub a: [f64; 3],
    pub b: [f64; 3],

    #[serde(default)]
    pub transform: Vec<TransformJson>,
}

impl PatternJson {
    fn build(&self) -> Result<Pattern> {
        let (a, b) = (Color::from(self.a), Color::from(self.b));

        let pattern = match self.ty.as_str() {
            "stripe" => Pattern::stripe(a, b),
            "gradient" => Pattern::gradient(a, b),
            "ring" => Pattern::ring(a, b),
            "checker" => Pattern::checker(a, b),
            other => return Err(TracerError::Scene(
                format!("Unrecognized pattern type \"{}\"", other)
            )),
        };

        pattern.with_transform(chain(&self.transform))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeJson {
    pub ty: String,

    /// Lower and upper bounds along Y for cylinders and cones.
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub closed: Option<bool>,

    #[serde(default)]
    pub transform: Vec<TransformJson>,
    pub material: Option<MaterialJson>,

    #[serde(default)]
    pub children: Vec<ShapeJson>,
}

impl ShapeJson {
    fn build(&self) -> Result<Shape> {
        let minimum = self.minimum.unwrap_or(f64::NEG_INFINITY);
        let maximum = self.maximum.unwrap_or(f64::INFINITY);
        let closed = self.closed.unwrap_or(false);

        let shape = match self.ty.as_str() {
            "sphere" => Shape::sphere(),
            "glass_sphere" => Shape::glass_sphere(),
            "plane" => Shape::plane(),
            "cube" => Shape::cube(),
            "cylinder" if closed => Shape::capped_cylinder(minimum, maximum),
            "cylinder" => Shape::bounded_cylinder(minimum, maximum),
            "cone" if closed => Shape::capped_cone(minimum, maximum),
            "cone" => Shape::bounded_cone(minimum, maximum),
            "group" => Shape::group(),
            other => return Err(TracerError::Scene(
                format!("Unrecognized shape type \"{}\"", other)
            )),
        };

        if !shape.is_group() && !self.children.is_empty() {
            return Err(TracerError::Scene(
                format!("Only groups may have children, not \"{}\"", self.ty)
            ));
        }

        let mut shape = shape.with_transform(chain(&self.transform))?;
        if let Some(ref material) = self.material {
            shape.material = material.apply(shape.material)?;
        }

        Ok(shape)
    }

    /// Adds this shape, and everything below it, to `world`.
    fn add_to(&self, world: &mut World, parent: Option<ShapeId>) -> Result<ShapeId> {
        let shape = self.build()?;

        let id = match parent {
            Some(group) => world.add_to_group(group, shape)?,
            None => world.add_object(shape),
        };

        for child in self.children.iter() {
            child.add_to(world, Some(id))?;
        }

        Ok(id)
    }
}

#[cfg(test)]
const MINIMAL: &str = r#"{
    "canvas_width": 40, "canvas_height": 20, "field_of_view": 1.5707963267948966,
    "camera_from": [0, 0, -5], "camera_to": [0, 0, 0], "camera_up": [0, 1, 0],
    "light": { "intensity": [1, 1, 1], "position": [-10, 10, -10] },
    "shapes": [ SHAPES ]
}"#;

#[cfg(test)]
fn scene_with(shapes: &str) -> Result<Scene> {
    Scene::from_json(&MINIMAL.replace("SHAPES", shapes))
}

#[test]
fn camera_and_light_from_json() {
    let scene = scene_with("").unwrap();

    assert_eq!((scene.camera.hsize(), scene.camera.vsize()), (40, 20));

    let r = scene.camera.ray_for_pixel(20, 10);
    assert_eq!(r.origin, Tuple4D::point(0.0, 0.0, -5.0));
    assert!(r.direction.z > 0.99);
    assert_eq!(scene.world.light_source.position, Tuple4D::point(-10.0, 10.0, -10.0));
    assert!(scene.world.objects().is_empty());
}

#[test]
fn transform_steps_apply_in_order() {
    let scene = scene_with(r#"{ "ty": "sphere",
        "transform": [ { "translate": [1, 0, 0] }, { "scale": [2, 2, 2] } ] }"#).unwrap();

    let id = scene.world.objects()[0];
    let shape = scene.world.shape(id).unwrap();

    assert_eq!(*shape.transform(),
        Matrix4D::scaling(2.0, 2.0, 2.0) * Matrix4D::translation(1.0, 0.0, 0.0));
}

#[test]
fn materials_override_defaults() {
    let scene = scene_with(r#"{ "ty": "cube", "material": {
        "color": [1, 0, 0], "reflective": 0.5,
        "pattern": { "ty": "stripe", "a": [1, 1, 1], "b": [0, 0, 0],
                     "transform": [ { "rotate_y": 1.0 } ] } } }"#).unwrap();

    let id = scene.world.objects()[0];
    let m = scene.world.shape(id).unwrap().material;

    assert_eq!(m.color, Color::red());
    assert_eq!(m.reflective, 0.5);
    assert_eq!(m.ambient, Material::default().ambient);
    assert_eq!(*m.pattern.unwrap().transform(), Matrix4D::rotation_y(1.0));
}

#[test]
fn groups_nest_children() {
    use crate::shape::ShapeType;

    let scene = scene_with(r#"{ "ty": "group", "children": [
        { "ty": "sphere" },
        { "ty": "group", "children": [
            { "ty": "cylinder", "minimum": 0, "maximum": 1, "closed": true }
        ] }
    ] }"#).unwrap();

    let shapes = scene.world.shapes();
    let root = scene.world.objects()[0];

    assert_eq!(scene.world.objects().len(), 1);
    assert_eq!(shapes.len(), 4);
    assert_eq!(shapes[root].children().len(), 2);

    let inner = shapes[root].children()[1];
    let cylinder = shapes[inner].children()[0];
    assert_eq!(*shapes[cylinder].ty(), ShapeType::Cylinder(0.0, 1.0, true));
    assert_eq!(shapes[cylinder].parent(), Some(inner));
}

#[test]
fn unknown_types_are_rejected() {
    assert!(matches!(scene_with(r#"{ "ty": "teapot" }"#), Err(TracerError::Scene(_))));
    assert!(matches!(scene_with(r#"{ "ty": "plane",
        "material": { "pattern": { "ty": "plaid", "a": [0, 0, 0], "b": [1, 1, 1] } } }"#),
        Err(TracerError::Scene(_))));
}

#[test]
fn children_only_on_groups() {
    let res = scene_with(r#"{ "ty": "sphere", "children": [ { "ty": "cube" } ] }"#);
    assert!(matches!(res, Err(TracerError::Scene(_))));
}

#[test]
fn degenerate_transform_is_an_error() {
    let res = scene_with(r#"{ "ty": "sphere", "transform": [ { "scale": [0, 1, 1] } ] }"#);
    assert!(matches!(res, Err(TracerError::NonInvertibleMatrix)));
}

#[test]
fn malformed_json_is_an_error() {
    assert!(matches!(Scene::from_json("{ \"canvas_width\": "), Err(TracerError::Json(_))));
}

#[test]
fn nonpositive_refractive_index_is_rejected() {
    let res = scene_with(r#"{ "ty": "sphere", "material": { "refractive_index": 0 } }"#);
    assert!(matches!(res, Err(TracerError::Scene(_))));
}

#[test]
fn bundled_scene_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("scenes/glass.json");
    let scene = Scene::load(path).unwrap();

    assert_eq!(scene.world.objects().len(), 4);
    assert_eq!(scene.world.shapes().len(), 6);
}

#[test]
fn reflective_and_transparency_weights_are_range_checked() {
    for material in [r#"{ "reflective": 1.5 }"#, r#"{ "reflective": -0.1 }"#,
        r#"{ "transparency": 2 }"#] {
        let res = scene_with(&format!(r#"{{ "ty": "sphere", "material": {} }}"#, material));
        assert!(matches!(res, Err(TracerError::Scene(_))), "{}", material);
    }

    let scene = scene_with(r#"{ "ty": "sphere",
        "material": { "reflective": 1, "transparency": 0 } }"#).unwrap();
    let m = scene.world.shape(scene.world.objects()[0]).unwrap().material;
    assert_eq!((m.reflective, m.transparency), (1.0, 0.0));
}

#[test]
fn camera_looking_at_its_own_position_is_rejected() {
    let json = MINIMAL.replace("SHAPES", "")
        .replace(r#""camera_to": [0, 0, 0]"#, r#""camera_to": [0, 0, -5]"#);

    assert!(matches!(Scene::from_json(&json), Err(TracerError::NonInvertibleMatrix)));
}
