use std::f64::consts::PI;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::Parser;
use log::{ error, info };

use whitted::Result;
use whitted::tuple::Tuple4D;
use whitted::matrix::Matrix4D;
use whitted::shape::{ Shape, ShapeId };
use whitted::color::{ self, Color };
use whitted::pattern::Pattern;
use whitted::light::{ Material, PointLight };
use whitted::world::World;
use whitted::camera::Camera;
use whitted::config::{ RenderConfig, RenderMode };
use whitted::scene::Scene;
use whitted::consts::{ OUT_FILE, REFLECTION_RECURSION_DEPTH };

const DEMO_WIDTH: usize = 960;
const DEMO_HEIGHT: usize = 540;

/// Renders a JSON scene, or a built-in demo, to a PPM or PNG image.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
    /// Scene description to render. Renders the demo scene when omitted.
    scene: Option<PathBuf>,

    /// Output image; a .png extension writes PNG, anything else PPM.
    #[clap(short, long, default_value = OUT_FILE)]
    output: PathBuf,

    /// Size of the render worker pool.
    #[clap(short, long)]
    threads: Option<usize>,

    /// Trace every pixel on the main thread. Takes precedence over
    /// `--threads`.
    #[clap(long)]
    single_threaded: bool,

    /// Maximum reflection and refraction bounces per ray.
    #[clap(short, long, default_value_t = REFLECTION_RECURSION_DEPTH)]
    depth: usize,

    /// Override the canvas width.
    #[clap(long)]
    width: Option<usize>,

    /// Override the canvas height.
    #[clap(long)]
    height: Option<usize>,
}

impl Args {
    fn render_config(&self) -> RenderConfig {
        let mode = match (self.single_threaded, self.threads) {
            (true, _) => RenderMode::Sequential,
            (false, Some(n)) => RenderMode::Pool(n),
            (false, None) => RenderMode::Auto,
        };

        RenderConfig::new().recursion_depth(self.depth).mode(mode)
    }
}

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let start = Instant::now();

    let Scene { world, mut camera } = match args.scene {
        Some(ref path) => Scene::load(path)?,
        None => demo_scene()?,
    };

    if args.width.is_some() || args.height.is_some() {
        let width = args.width.unwrap_or_else(|| camera.hsize());
        let height = args.height.unwrap_or_else(|| camera.vsize());

        camera = Camera::new(width, height, camera.field_of_view())
            .with_transform(*camera.transform())?;
    }

    let canvas = camera.render_with(&world, &args.render_config())?;
    canvas.save(&args.output)?;

    info!("Saved render to {} after {:.2?}", args.output.display(), start.elapsed());
    Ok(())
}

/// A checkered mirror floor with a glass ball, a cone, a cube and a ring of
/// rods and beads floating over them.
fn demo_scene() -> Result<Scene> {
    let mut world = World::empty();
    world.light_source = PointLight::new(
        Color::rgb(1.0, 1.0, 1.0),
        Tuple4D::point(-10.0, 10.0, -10.0),
    );

    let checkers = Pattern::checker(Color::white(), Color::from_hex(color::NAVY))
        .with_transform(Matrix4D::scaling(0.5, 0.5, 0.5))?;
    world.add_object(Shape::plane().with_material(Material {
        color: Color::rgb(0.5, 0.5, 0.5),
        pattern: Some(checkers),
        specular: 0.0,
        reflective: 0.3,
        ..Default::default()
    }));

    world.add_object(Shape::glass_sphere()
        .with_transform(Matrix4D::translation(-0.5, 1.0, 0.5))?
        .with_material(Material {
            color: Color::rgb(1.0, 0.4666, 0.2666),
            diffuse: 0.1,
            specular: 1.0,
            shininess: 300.0,
            reflective: 0.9,
            transparency: 0.9,
            refractive_index: 1.5,
            ..Default::default()
        }));

    world.add_object(Shape::capped_cone(-1.0, 0.0)
        .with_transform(Matrix4D::chain(&[
            Matrix4D::scaling(0.5, 1.0, 0.5),
            Matrix4D::translation(1.5, 1.0, -0.5),
        ]))?
        .with_material(Material {
            color: Color::from_hex(color::ORANGE),
            diffuse: 0.7,
            specular: 0.3,
            reflective: 0.2,
            ..Default::default()
        }));

    world.add_object(Shape::cube()
        .with_transform(Matrix4D::chain(&[
            Matrix4D::rotation_y(PI / 4.0),
            Matrix4D::scaling(0.33, 0.33, 0.33),
            Matrix4D::translation(-1.5, 0.33, -0.75),
        ]))?
        .with_material(Material {
            color: Color::from_hex(color::PURPLE),
            diffuse: 0.7,
            specular: 0.3,
            ..Default::default()
        }));

    let ring = world.add_object(Shape::group()
        .with_transform(Matrix4D::chain(&[
            Matrix4D::scaling(0.6, 0.6, 0.6),
            Matrix4D::rotation_x(-PI / 6.0),
            Matrix4D::translation(0.5, 2.6, 1.5),
        ]))?);
    hexagon(&mut world, ring)?;

    let camera = Camera::new(DEMO_WIDTH, DEMO_HEIGHT, PI / 3.0)
        .with_transform(Matrix4D::view_transform(
            Tuple4D::point(0.0, 2.0, -5.0),
            Tuple4D::point(0.0, 1.0, 0.0),
            Tuple4D::vector(0.0, 1.0, 0.0),
        ))?;

    Ok(Scene { world, camera })
}

/// Fills `group` with six sides, each a bead on a corner and a rod along an
/// edge of a unit hexagon.
fn hexagon(world: &mut World, group: ShapeId) -> Result<()> {
    let metal = Material {
        color: Color::from_hex(color::TEAL),
        diffuse: 0.6,
        specular: 0.8,
        reflective: 0.4,
        ..Default::default()
    };

    for n in 0..6 {
        let side = world.add_to_group(group, Shape::group()
            .with_transform(Matrix4D::rotation_y(n as f64 * PI / 3.0))?)?;

        world.add_to_group(side, Shape::sphere()
            .with_transform(Matrix4D::chain(&[
                Matrix4D::scaling(0.25, 0.25, 0.25),
                Matrix4D::translation(0.0, 0.0, -1.0),
            ]))?
            .with_material(metal))?;

        world.add_to_group(side, Shape::bounded_cylinder(0.0, 1.0)
            .with_transform(Matrix4D::chain(&[
                Matrix4D::scaling(0.25, 1.0, 0.25),
                Matrix4D::rotation_z(-PI / 2.0),
                Matrix4D::rotation_y(-PI / 6.0),
                Matrix4D::translation(0.0, 0.0, -1.0),
            ]))?
            .with_material(metal))?;
    }

    Ok(())
}
