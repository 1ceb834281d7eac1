use std::time::Instant;

use log::info;

use crate::ray::Ray4D;
use crate::tuple::Tuple4D;
use crate::matrix::Matrix4D;
use crate::transform::Transform;
use crate::world::World;
use crate::canvas::Canvas;
use crate::config::{ RenderConfig, RenderMode };
use crate::parallel;
use crate::error::Result;

/// A camera record for generating a canvas.
///
/// This record gives a "frame" of the world. Based on camera parameters,
/// different perspectives can be produced.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    /// The horizontal size of the resultant canvas.
    hsize: usize,

    /// The vertical size of the resultant canvas.
    vsize: usize,

    half_width: f64,
    half_height: f64,
    pixel_size: f64,

    /// The angle describing "how much" the camera can see.
    field_of_view: f64,

    /// How the world is oriented relative to the camera (typically a view
    /// transformation), with its inverse cached for ray generation.
    transform: Transform,
}

impl Camera {
    /// Creates a camera looking down -Z from the origin.
    pub fn new(hsize: usize, vsize: usize, field_of_view: f64) -> Camera {
        let half_view = (field_of_view / 2.0).tan();
        let aspect = (hsize as f64) / (vsize as f64);

        let (half_width, half_height) = if aspect >= 1.0 {
            (half_view, half_view / aspect)
        } else {
            (half_view * aspect, half_view)
        };

        let pixel_size = half_width * 2.0 / (hsize as f64);
        Camera {
            hsize,
            vsize,
            half_width,
            half_height,
            pixel_size,
            field_of_view,
            transform: Transform::identity(),
        }
    }

    pub fn with_transform(mut self, transform: Matrix4D) -> Result<Camera> {
        self.set_transform(transform)?;
        Ok(self)
    }

    /// Replaces the view transform. Singular matrices are rejected.
    pub fn set_transform(&mut self, transform: Matrix4D) -> Result<()> {
        self.transform = Transform::new(transform)?;
        Ok(())
    }

    pub fn hsize(&self) -> usize {
        self.hsize
    }

    pub fn vsize(&self) -> usize {
        self.vsize
    }

    pub fn field_of_view(&self) -> f64 {
        self.field_of_view
    }

    /// World-space size of one pixel on the canvas one unit in front of the
    /// camera.
    pub fn pixel_size(&self) -> f64 {
        self.pixel_size
    }

    pub fn transform(&self) -> &Matrix4D {
        self.transform.matrix()
    }

    pub fn ray_for_pixel(&self, px: usize, py: usize) -> Ray4D {
        // Offsets from the edge of the canvas to the pixel's center
        let xoffset = (px as f64 + 0.5) * self.pixel_size;
        let yoffset = (py as f64 + 0.5) * self.pixel_size;

        // The untransformed coordinates of the pixel in world space
        let world_x = self.half_width - xoffset;
        let world_y = self.half_height - yoffset;

        // Using the camera matrix, transform the canvas point and origin,
        // computing the ray's direction vector
        let tr_inv = self.transform.inverse();

        let pixel = *tr_inv * Tuple4D::point(world_x, world_y, -1.0);
        let origin = *tr_inv * Tuple4D::point(0.0, 0.0, 0.0);
        let direction = (pixel - origin).normalize();

        Ray4D::new(origin, direction)
    }

    /// Renders on the calling thread with the default recursion depth.
    pub fn render(&self, w: &World) -> Result<Canvas> {
        self.render_with(w, &RenderConfig::new().sequential())
    }

    /// Renders on a worker pool sized from the available parallelism.
    pub fn render_concurrent(&self, w: &World) -> Result<Canvas> {
        self.render_with(w, &RenderConfig::new().mode(RenderMode::Auto))
    }

    pub fn render_with(&self, w: &World, config: &RenderConfig) -> Result<Canvas> {
        let start = Instant::now();

        let image = match config.mode {
            RenderMode::Sequential => self.render_sequential(w, config.recursion_depth)?,
            mode => parallel::render_concurrent(self, w, mode.workers(),
                config.recursion_depth)?,
        };

        info!("Rendered {}x{} in {:.2?}", self.hsize, self.vsize, start.elapsed());
        Ok(image)
    }

    fn render_sequential(&self, w: &World, depth: usize) -> Result<Canvas> {
        let mut image = Canvas::new(self.hsize, self.vsize);
        info!("Rendering {}x{} on the calling thread", self.hsize, self.vsize);

        for y in 0..self.vsize {
            for x in 0..self.hsize {
                let ray = self.ray_for_pixel(x, y);
                let color = w.color_at(&ray, depth);
                image.write_pixel(x, y, &color)?;
            }
        }

        Ok(image)
    }
}

impl Default for Camera {
    fn default() -> Camera {
        Camera::new(160, 120, std::f64::consts::FRAC_PI_3)
    }
}

#[test]
fn pixel_size_for_horizontal_and_vertical_canvas() {
    use std::f64::consts::PI;
    use crate::feq;

    assert!(feq(Camera::new(200, 125, PI / 2.0).pixel_size(), 0.01));
    assert!(feq(Camera::new(125, 200, PI / 2.0).pixel_size(), 0.01));
}

#[test]
fn ray_through_center() {
    let c = Camera::new(201, 101, std::f64::consts::PI / 2.0);
    let r = c.ray_for_pixel(100, 50);

    assert_eq!(r.origin, Tuple4D::point(0.0, 0.0, 0.0));
    assert_eq!(r.direction, Tuple4D::vector(0.0, 0.0, -1.0));
}

#[test]
fn ray_through_corner() {
    let c = Camera::new(201, 101, std::f64::consts::PI / 2.0);
    let r = c.ray_for_pixel(0, 0);

    assert_eq!(r.origin, Tuple4D::point(0.0, 0.0, 0.0));
    assert!(r.direction.approx_eq(&Tuple4D::vector(0.66519, 0.33259, -0.66851), 0.0001));
}

#[test]
fn ray_when_camera_transformed() {
    let c = Camera::new(201, 101, std::f64::consts::PI / 2.0)
        .with_transform(Matrix4D::rotation_y(std::f64::consts::PI / 4.0)
            * Matrix4D::translation(0.0, -2.0, 5.0))
        .unwrap();
    let r = c.ray_for_pixel(100, 50);

    assert_eq!(r.origin, Tuple4D::point(0.0, 2.0, -5.0));
    assert_eq!(r.direction,
        Tuple4D::vector(2.0f64.sqrt() / 2.0, 0.0, -(2.0f64.sqrt() / 2.0)));
}

#[test]
fn singular_camera_transform_is_rejected() {
    let mut c = Camera::new(10, 10, std::f64::consts::PI / 2.0);

    assert!(c.set_transform(Matrix4D::new()).is_err());
    assert_eq!(*c.transform(), Matrix4D::identity());
}

#[test]
fn render_world_with_camera() {
    use crate::color::Color;

    let w: World = Default::default();

    let from = Tuple4D::point(0.0, 0.0, -5.0);
    let to = Tuple4D::point(0.0, 0.0, 0.0);
    let up = Tuple4D::vector(0.0, 1.0, 0.0);

    let c = Camera::new(11, 11, std::f64::consts::PI / 2.0)
        .with_transform(Matrix4D::view_transform(from, to, up))
        .unwrap();

    let image = c.render(&w).unwrap();
    assert!(image.read_pixel(5, 5).unwrap()
        .approx_eq(&Color::rgb(0.38066, 0.47583, 0.2855), 0.0001));
}

