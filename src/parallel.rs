//! Multi-threaded rendering.
//!
//! A fixed pool of workers pulls pixels from one bounded queue. Each queued
//! message carries the only mutable reference to its pixel's cell in the
//! output canvas, so workers write their results directly and no two workers
//! can ever touch the same cell. Closing the queue stops the pool; the scope
//! the workers run in joins them before the canvas is handed back.

use std::thread;

use crossbeam_channel::bounded;
use log::{ debug, info, trace };

use crate::world::World;
use crate::camera::Camera;
use crate::canvas::Canvas;
use crate::color::Color;
use crate::consts::QUEUE_DEPTH_PER_WORKER;
use crate::error::{ Result, TracerError };

/// One pixel of work, and where to put the result.
struct Message<'c> {
    x: usize,
    y: usize,
    cell: &'c mut Color,
}

/// Renders `world` through `camera` with `workers` threads.
///
/// Produces exactly the pixels the single-threaded path does, whatever the
/// pool size.
pub fn render_concurrent(camera: &Camera, world: &World, workers: usize,
    depth: usize) -> Result<Canvas> {
    let workers = workers.max(1);
    let mut canvas = Canvas::new(camera.hsize(), camera.vsize());
    let width = canvas.width;

    info!("Rendering {}x{} using {} workers",
        camera.hsize(), camera.vsize(), workers);

    thread::scope(|scope| -> Result<()> {
        let (sender, receiver) = bounded::<Message>(workers * QUEUE_DEPTH_PER_WORKER);

        for id in 0..workers {
            let queue = receiver.clone();

            scope.spawn(move || {
                let mut traced = 0usize;

                // Ends once the queue is closed and drained.
                for msg in queue.iter() {
                    let ray = camera.ray_for_pixel(msg.x, msg.y);
                    *msg.cell = world.color_at(&ray, depth);
                    traced += 1;
                }

                trace!("Worker {} exiting after {} pixels", id, traced);
            });
        }
        drop(receiver);
        debug!("Started {} workers", workers);

        for (i, cell) in canvas.cells_mut().enumerate() {
            sender.send(Message { x: i % width, y: i / width, cell })
                .map_err(|e| TracerError::WorkerPool(e.to_string()))?;
        }

        // Close the queue so idle workers wake up and exit.
        drop(sender);
        Ok(())
    })?;

    Ok(canvas)
}

#[cfg(test)]
fn assert_bit_identical(left: &Canvas, right: &Canvas) {
    assert_eq!((left.width, left.height), (right.width, right.height));

    for (a, b) in left.pixels().iter().zip(right.pixels().iter()) {
        assert_eq!(
            (a.r.to_bits(), a.g.to_bits(), a.b.to_bits()),
            (b.r.to_bits(), b.g.to_bits(), b.b.to_bits())
        );
    }
}

#[cfg(test)]
fn reflective_scene() -> (World, Camera) {
    use crate::shape::Shape;
    use crate::matrix::Matrix4D;
    use crate::pattern::Pattern;
    use crate::tuple::Tuple4D;

    let mut w = World::new();

    let mut floor = Shape::plane()
        .with_transform(Matrix4D::translation(0.0, -1.0, 0.0)).unwrap();
    floor.material.reflective = 0.4;
    floor.material.pattern = Some(Pattern::checker(Color::white(), Color::black()));
    w.add_object(floor);
    w.add_object(Shape::glass_sphere()
        .with_transform(Matrix4D::translation(1.5, 0.0, -1.0)).unwrap());

    let camera = Camera::new(23, 17, std::f64::consts::PI / 2.0)
        .with_transform(Matrix4D::view_transform(
            Tuple4D::point(0.0, 1.5, -5.0),
            Tuple4D::point(0.0, 0.0, 0.0),
            Tuple4D::vector(0.0, 1.0, 0.0),
        )).unwrap();

    (w, camera)
}

#[test]
fn concurrent_render_matches_sequential_for_any_pool_size() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (w, camera) = reflective_scene();
    let reference = camera.render(&w).unwrap();

    for workers in [1, 2, 3, 8] {
        let image = render_concurrent(&camera, &w, workers, 5).unwrap();
        assert_bit_identical(&reference, &image);
    }
}

#[test]
fn auto_pool_matches_sequential() {
    let (w, camera) = reflective_scene();

    assert_bit_identical(&camera.render(&w).unwrap(),
        &camera.render_concurrent(&w).unwrap());
}

#[test]
fn more_workers_than_pixels() {
    let w = World::new();
    let camera = Camera::new(2, 1, std::f64::consts::PI / 2.0);

    let image = render_concurrent(&camera, &w, 16, 5).unwrap();
    assert_eq!(image.pixels().len(), 2);
}

#[test]
fn empty_canvas_renders_nothing() {
    let w = World::new();
    let camera = Camera::new(0, 0, std::f64::consts::PI / 2.0);

    let image = render_concurrent(&camera, &w, 4, 5).unwrap();
    assert!(image.pixels().is_empty());
}
