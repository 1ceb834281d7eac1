use crate::color::Color;
use crate::pattern::Pattern;
use crate::tuple::Tuple4D;
use crate::consts::VACUUM_RI;

/// A point light.
///
/// A very simple light source. Provides a color and a position where light is
/// produced from.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PointLight {
    pub intensity: Color,
    pub position: Tuple4D,
}

impl PointLight {
    /// Creates a point light.
    ///
    /// If `position` isn't a point, it is converted to a point automatically.
    pub fn new(intensity: Color, mut position: Tuple4D) -> PointLight {
        if !position.is_point() {
            position.w = 1.0;
        }

        PointLight { intensity, position }
    }
}

/// A material record.
///
/// Materials use attributes from the Phong reflection model; ambient, diffuse,
/// specular and shininess. `reflective` and `transparency` are weights in
/// `0.0..=1.0`; `refractive_index` must be positive.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub color: Color,
    pub pattern: Option<Pattern>,

    pub ambient: f64,
    pub diffuse: f64,
    pub specular: f64,
    pub shininess: f64,

    pub reflective: f64,
    pub refractive_index: f64,
    pub transparency: f64,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            color: Color::rgb(1.0, 1.0, 1.0),
            pattern: None,

            ambient: 0.1,
            diffuse: 0.9,
            specular: 0.9,
            shininess: 200.0,

            reflective: 0.0,
            refractive_index: VACUUM_RI,
            transparency: 0.0,
        }
    }
}

impl Material {
    /// Surface color at a point in the decorated object's space.
    pub fn color_at(&self, object_point: &Tuple4D) -> Color {
        match self.pattern {
            Some(ref pattern) => pattern.pattern_at_object(object_point),
            None => self.color,
        }
    }
}

/// Calculate the lighting of a pixel in an environment.
///
/// Takes a material, a single light, a world-space point, the eye vector and
/// the normal vector, and calculates how the light looks from the eye.
/// `object_point` is the same point in the object's own space; it is only
/// used to sample the material's pattern.
///
/// If this point is in a shadow (parameter `in_shadow`), only ambient light is
/// used.
pub fn lighting(m: &Material, light: &PointLight, point: &Tuple4D,
    object_point: &Tuple4D, eyev: &Tuple4D, normalv: &Tuple4D, in_shadow: bool)
    -> Color {
    // Combine surface color with light's color
    let effective_color = m.color_at(object_point) * light.intensity;

    // Ambient light reaches every point, shadowed or not
    let ambient = effective_color * m.ambient;
    if in_shadow {
        return ambient;
    }

    let lightv = (light.position - *point).normalize();

    // Light hitting the back of the surface adds nothing
    let light_dot_normal = lightv.dot(normalv);
    if light_dot_normal < 0.0 {
        return ambient;
    }

    let diffuse = effective_color * m.diffuse * light_dot_normal;

    let reflectv = (-lightv).reflect(normalv);
    let reflect_dot_eye = reflectv.dot(eyev);

    let specular = if reflect_dot_eye <= 0.0 {
        Color::black()
    } else {
        light.intensity * m.specular * reflect_dot_eye.powf(m.shininess)
    };

    ambient + diffuse + specular
}

#[cfg(test)]
fn light_at(x: f64, y: f64, z: f64) -> PointLight {
    PointLight::new(Color::white(), Tuple4D::point(x, y, z))
}

#[test]
fn eye_between_light_and_surface() {
    let m: Material = Default::default();
    let position = Tuple4D::point(0.0, 0.0, 0.0);

    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = light_at(0.0, 0.0, -10.0);

    let res = lighting(&m, &light, &position, &position, &eyev, &normalv, false);
    assert_eq!(res, Color::rgb(1.9, 1.9, 1.9));
}

#[test]
fn eye_between_light_and_surface_offset_45() {
    let m: Material = Default::default();
    let position = Tuple4D::point(0.0, 0.0, 0.0);

    let eyev = Tuple4D::vector(0.0, 2.0f64.sqrt() / 2.0, 2.0f64.sqrt() / 2.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = light_at(0.0, 0.0, -10.0);

    let res = lighting(&m, &light, &position, &position, &eyev, &normalv, false);
    assert_eq!(res, Color::rgb(1.0, 1.0, 1.0));
}

#[test]
fn eye_opposite_from_surface_offset_45() {
    let m: Material = Default::default();
    let position = Tuple4D::point(0.0, 0.0, 0.0);

    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = light_at(0.0, 10.0, -10.0);

    let res = lighting(&m, &light, &position, &position, &eyev, &normalv, false);
    assert!(res.approx_eq(&Color::rgb(0.7364, 0.7364, 0.7364), 0.0001));
}

#[test]
fn eye_opposite_from_surface_in_reflection() {
    let m: Material = Default::default();
    let position = Tuple4D::point(0.0, 0.0, 0.0);

    let eyev = Tuple4D::vector(0., -(2.0f64.sqrt())/2., -(2.0f64.sqrt())/2.);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = light_at(0.0, 10.0, -10.0);

    let res = lighting(&m, &light, &position, &position, &eyev, &normalv, false);
    assert!(res.approx_eq(&Color::rgb(1.6364, 1.6364, 1.6364), 0.0001));
}

#[test]
fn eye_across_surface_from_light() {
    let m: Material = Default::default();
    let position = Tuple4D::point(0.0, 0.0, 0.0);

    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = light_at(0.0, 0.0, 10.0);

    let res = lighting(&m, &light, &position, &position, &eyev, &normalv, false);
    assert_eq!(res, Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn surface_in_shadow_keeps_only_ambient() {
    let m: Material = Default::default();
    let position = Tuple4D::point(0.0, 0.0, 0.0);

    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = light_at(0.0, 0.0, -10.0);

    let res = lighting(&m, &light, &position, &position, &eyev, &normalv, true);
    assert_eq!(res, Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn lighting_with_stripe_pattern() {
    let m = Material {
        color: Color::rgb(0.5, 0.5, 0.5),
        pattern: Some(Pattern::stripe(Color::white(), Color::black())),

        // Only ambient light, so the pattern color comes through unchanged
        ambient: 1.0,
        diffuse: 0.0,
        specular: 0.0,

        ..Default::default()
    };

    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = light_at(0.0, 0.0, -10.0);

    let p1 = Tuple4D::point(0.9, 0.0, 0.0);
    let p2 = Tuple4D::point(1.1, 0.0, 0.0);

    assert_eq!(lighting(&m, &light, &p1, &p1, &eyev, &normalv, false),
        Color::white());
    assert_eq!(lighting(&m, &light, &p2, &p2, &eyev, &normalv, false),
        Color::black());
}

#[test]
fn pattern_is_sampled_at_object_point() {
    let m = Material {
        pattern: Some(Pattern::stripe(Color::white(), Color::black())),
        ambient: 1.0,
        diffuse: 0.0,
        specular: 0.0,

        ..Default::default()
    };

    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = light_at(0.0, 0.0, -10.0);

    // World x of 1.5 on an object scaled by two sits at object x 0.75
    let world = Tuple4D::point(1.5, 0.0, 0.0);
    let object = Tuple4D::point(0.75, 0.0, 0.0);

    assert_eq!(lighting(&m, &light, &world, &object, &eyev, &normalv, false),
        Color::white());
}
