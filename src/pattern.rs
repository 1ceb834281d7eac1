use crate::tuple::Tuple4D;
use crate::color::Color;
use crate::matrix::Matrix4D;
use crate::transform::Transform;
use crate::error::Result;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PatternType {
    /// Alternates between two colors across X, one unit per stripe.
    Stripe(Color, Color),

    /// Blends linearly from the first color to the second across each unit
    /// of X.
    Gradient(Color, Color),

    /// Concentric rings around the Y axis.
    Ring(Color, Color),

    /// Alternating unit cubes in all three dimensions.
    Checker(Color, Color),

    /// Returns the sampled point as a color. Useful for checking which space
    /// a pattern was evaluated in.
    Test,
}

/// A procedural color function with its own transform.
///
/// Patterns are plain values. Copying one into a material copies the whole
/// pattern, transform included.
///
/// # Examples
///
/// ```
/// # use whitted::pattern::Pattern;
/// # use whitted::color::Color;
/// # use whitted::tuple::Tuple4D;
/// let p = Pattern::stripe(Color::white(), Color::black());
/// assert_eq!(p.pattern_at(&Tuple4D::point(0.5, 0.0, 0.0)), Color::white());
/// assert_eq!(p.pattern_at(&Tuple4D::point(1.5, 0.0, 0.0)), Color::black());
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pattern {
    ty: PatternType,
    transform: Transform,
}

impl Pattern {
    pub fn new(ty: PatternType) -> Pattern {
        Pattern { ty, transform: Transform::identity() }
    }

    pub fn stripe(a: Color, b: Color) -> Pattern {
        Pattern::new(PatternType::Stripe(a, b))
    }

    pub fn gradient(a: Color, b: Color) -> Pattern {
        Pattern::new(PatternType::Gradient(a, b))
    }

    pub fn ring(a: Color, b: Color) -> Pattern {
        Pattern::new(PatternType::Ring(a, b))
    }

    pub fn checker(a: Color, b: Color) -> Pattern {
        Pattern::new(PatternType::Checker(a, b))
    }

    pub fn test() -> Pattern {
        Pattern::new(PatternType::Test)
    }

    pub fn ty(&self) -> &PatternType {
        &self.ty
    }

    pub fn transform(&self) -> &Matrix4D {
        self.transform.matrix()
    }

    pub fn set_transform(&mut self, transform: Matrix4D) -> Result<()> {
        self.transform = Transform::new(transform)?;
        Ok(())
    }

    pub fn with_transform(mut self, transform: Matrix4D) -> Result<Pattern> {
        self.set_transform(transform)?;
        Ok(self)
    }

    /// Color at a point already in pattern space.
    pub fn pattern_at(&self, p: &Tuple4D) -> Color {
        match self.ty {
            PatternType::Stripe(a, b) => {
                if p.x.floor().rem_euclid(2.0) == 0.0 { a } else { b }
            }
            PatternType::Gradient(a, b) => {
                a + (b - a) * (p.x - p.x.floor())
            }
            PatternType::Ring(a, b) => {
                let distance = (p.x.powi(2) + p.z.powi(2)).sqrt();
                if distance.floor().rem_euclid(2.0) == 0.0 { a } else { b }
            }
            PatternType::Checker(a, b) => {
                let sum = p.x.floor() + p.y.floor() + p.z.floor();
                if sum.rem_euclid(2.0) == 0.0 { a } else { b }
            }
            PatternType::Test => Color::rgb(p.x, p.y, p.z),
        }
    }

    /// Color at a point in the space of the object this pattern decorates.
    pub fn pattern_at_object(&self, object_point: &Tuple4D) -> Color {
        self.pattern_at(&(*self.transform.inverse() * *object_point))
    }
}

#[test]
fn stripe_pattern_is_constant_along_y_and_z() {
    let pattern = Pattern::stripe(Color::white(), Color::black());

    for (y, z) in [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 1.0), (0.0, 2.0)] {
        assert_eq!(pattern.pattern_at(&Tuple4D::point(0.0, y, z)), Color::white());
    }
}

#[test]
fn stripe_pattern_alternates_along_x() {
    let pattern = Pattern::stripe(Color::white(), Color::black());

    assert_eq!(pattern.pattern_at(&Tuple4D::point( 0.0, 0.0, 0.0)),
        Color::white());
    assert_eq!(pattern.pattern_at(&Tuple4D::point( 0.9, 0.0, 0.0)),
        Color::white());
    assert_eq!(pattern.pattern_at(&Tuple4D::point( 1.0, 0.0, 0.0)),
        Color::black());
    assert_eq!(pattern.pattern_at(&Tuple4D::point(-0.1, 0.0, 0.0)),
        Color::black());
    assert_eq!(pattern.pattern_at(&Tuple4D::point(-1.0, 0.0, 0.0)),
        Color::black());
    assert_eq!(pattern.pattern_at(&Tuple4D::point(-1.1, 0.0, 0.0)),
        Color::white());
}

#[test]
fn gradient_interpolates_between_colors() {
    let pattern = Pattern::gradient(Color::white(), Color::black());

    assert_eq!(pattern.pattern_at(&Tuple4D::point(0.0, 0.0, 0.0)),
        Color::white());
    assert_eq!(pattern.pattern_at(&Tuple4D::point(0.25, 0.0, 0.0)),
        Color::rgb(0.75, 0.75, 0.75));
    assert_eq!(pattern.pattern_at(&Tuple4D::point(0.5, 0.0, 0.0)),
        Color::rgb(0.5, 0.5, 0.5));
    assert_eq!(pattern.pattern_at(&Tuple4D::point(0.75, 0.0, 0.0)),
        Color::rgb(0.25, 0.25, 0.25));
}

#[test]
fn ring_extends_in_x_and_z() {
    let pattern = Pattern::ring(Color::white(), Color::black());

    assert_eq!(pattern.pattern_at(&Tuple4D::point(0.0, 0.0, 0.0)),
        Color::white());
    assert_eq!(pattern.pattern_at(&Tuple4D::point(1.0, 0.0, 0.0)),
        Color::black());
    assert_eq!(pattern.pattern_at(&Tuple4D::point(0.0, 0.0, 1.0)),
        Color::black());
    assert_eq!(pattern.pattern_at(&Tuple4D::point(0.708, 0.0, 0.708)),
        Color::black());
}

#[test]
fn checkers_repeat_in_every_dimension() {
    let pattern = Pattern::checker(Color::white(), Color::black());

    for (x, y, z, white) in [
        (0.0, 0.0, 0.0, true),
        (0.99, 0.0, 0.0, true), (1.01, 0.0, 0.0, false),
        (0.0, 0.99, 0.0, true), (0.0, 1.01, 0.0, false),
        (0.0, 0.0, 0.99, true), (0.0, 0.0, 1.01, false),
        (-0.5, 0.0, 0.0, false), (-0.5, -0.5, 0.0, true),
    ] {
        let expected = if white { Color::white() } else { Color::black() };
        assert_eq!(pattern.pattern_at(&Tuple4D::point(x, y, z)), expected);
    }
}

#[test]
fn pattern_transform_moves_sample_point() {
    let pattern = Pattern::test()
        .with_transform(Matrix4D::translation(0.5, 1.0, 1.5)).unwrap();

    assert_eq!(pattern.pattern_at_object(&Tuple4D::point(2.5, 3.0, 3.5)),
        Color::rgb(0.75, 0.5, 0.25));
}
