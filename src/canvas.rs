use std::io::{ BufWriter, Write };
use std::fs::File;
use std::path::Path;

use image::{ ColorType, ImageFormat };
use log::debug;

use crate::color::Color;
use crate::error::{ Result, TracerError };

/// Plain PPM readers expect lines of at most this many characters.
const PPM_LINE_WIDTH: usize = 70;

/// A canvas for drawing pixels.
///
/// This structure mostly stores the results of the ray tracer. Once the user
/// specifies the desired image width and height, the `Camera` generates rays
/// which are cast onto a `World`'s objects.
///
/// The canvas stores the resultant colors for each pixel ray, unclamped. Once
/// execution finishes, the `Canvas` can be saved as a PPM or PNG image.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Canvas {
    /// The width of the canvas, in pixels.
    pub width: usize,

    /// The height of the canvas, in pixels.
    pub height: usize,

    /// The pixels of the canvas, stored as a flattened vector, row by row.
    pixels: Vec<Color>,
}

impl Canvas {
    /// Creates a new black canvas with specified width and height.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![Color::black(); width * height]
        }
    }

    fn index(&self, x: usize, y: usize) -> Result<usize> {
        if x >= self.width || y >= self.height {
            return Err(TracerError::PixelOutOfBounds {
                x, y, width: self.width, height: self.height,
            });
        }

        Ok((y * self.width) + x)
    }

    /// Writes a color to a location on the `Canvas`.
    ///
    /// Pixels are specified in row-column order, where `y` is the row of the
    /// pixel, and `x` is the column. Rows and columns are zero-indexed.
    ///
    /// # Examples
    ///
    /// Writing a pixel to the fourth column, second row on an 8-by-8 canvas:
    ///
    /// ```
    /// # use whitted::color::Color;
    /// # use whitted::canvas::Canvas;
    /// let purple = Color::rgb(1.0, 0.0, 1.0);
    /// let mut canvas = Canvas::new(8, 8);
    /// canvas.write_pixel(4, 2, &purple).unwrap();
    /// assert_eq!(canvas.read_pixel(4, 2).unwrap(), purple);
    /// assert!(canvas.write_pixel(8, 0, &purple).is_err());
    /// ```
    pub fn write_pixel(&mut self, x: usize, y: usize, pixel: &Color) -> Result<()> {
        let i = self.index(x, y)?;
        self.pixels[i] = *pixel;

        Ok(())
    }

    /// Reads a color from a location on the `Canvas`.
    ///
    /// See method `write_pixel` for an example of writing and reading a pixel
    /// from a `Canvas`.
    pub fn read_pixel(&self, x: usize, y: usize) -> Result<Color> {
        Ok(self.pixels[self.index(x, y)?])
    }

    /// Every pixel, row by row.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Mutable access to every cell, row by row. Each cell is yielded once,
    /// so the references can be handed to different threads.
    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Color> {
        self.pixels.iter_mut()
    }

    /// Clamped 8-bit RGB triples, row by row.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| c.to_rgb8()).collect()
    }

    /// Writes the canvas as a plain (P3) PPM image.
    ///
    /// Every row starts on a new line, and no line exceeds 70 characters.
    pub fn to_ppm<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "P3")?;
        writeln!(out, "{} {}", self.width, self.height)?;
        writeln!(out, "255")?;

        // `chunks` rejects zero, and a zero-width canvas has no rows anyway.
        for row in self.pixels.chunks(self.width.max(1)) {
            let mut line = String::new();

            for channel in row.iter().flat_map(|c| c.to_rgb8()) {
                let token = channel.to_string();

                if !line.is_empty() && line.len() + 1 + token.len() > PPM_LINE_WIDTH {
                    writeln!(out, "{}", line)?;
                    line.clear();
                }

                if !line.is_empty() {
                    line.push(' ');
                }
                line.push_str(&token);
            }

            if !line.is_empty() {
                writeln!(out, "{}", line)?;
            }
        }

        Ok(())
    }

    /// Saves the canvas to a file. A `.png` extension selects PNG; anything
    /// else is written as PPM.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let is_png = path.extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("png"));

        if is_png {
            image::save_buffer_with_format(path, &self.to_rgb8(),
                self.width as u32, self.height as u32,
                ColorType::Rgb8, ImageFormat::Png)?;
        } else {
            let mut out = BufWriter::new(File::create(path)?);
            self.to_ppm(&mut out)?;
            out.flush()?;
        }

        debug!("Saved {}x{} canvas to {}", self.width, self.height, path.display());
        Ok(())
    }
}

#[cfg(test)]
fn ppm_lines(canvas: &Canvas) -> Vec<String> {
    let mut buf = Vec::new();
    canvas.to_ppm(&mut buf).unwrap();

    String::from_utf8(buf).unwrap().lines().map(String::from).collect()
}

#[test]
fn new_canvas_is_black() {
    let c = Canvas::new(10, 20);

    assert_eq!((c.width, c.height), (10, 20));
    assert!(c.pixels().iter().all(|p| *p == Color::black()));
}

#[test]
fn out_of_bounds_access_is_rejected() {
    let mut c = Canvas::new(4, 3);

    assert!(matches!(c.read_pixel(0, 3),
        Err(TracerError::PixelOutOfBounds { x: 0, y: 3, width: 4, height: 3 })));
    assert!(c.write_pixel(4, 0, &Color::red()).is_err());
}

#[test]
fn ppm_header() {
    let lines = ppm_lines(&Canvas::new(5, 3));
    assert_eq!(&lines[0..3], &["P3", "5 3", "255"]);
}

#[test]
fn ppm_pixel_data_is_clamped_and_scaled() {
    let mut c = Canvas::new(5, 3);
    c.write_pixel(0, 0, &Color::rgb(1.5, 0.0, 0.0)).unwrap();
    c.write_pixel(2, 1, &Color::rgb(0.0, 0.5, 0.0)).unwrap();
    c.write_pixel(4, 2, &Color::rgb(-0.5, 0.0, 1.0)).unwrap();

    let lines = ppm_lines(&c);
    assert_eq!(lines[3], "255 0 0 0 0 0 0 0 0 0 0 0 0 0 0");
    assert_eq!(lines[4], "0 0 0 0 0 0 0 128 0 0 0 0 0 0 0");
    assert_eq!(lines[5], "0 0 0 0 0 0 0 0 0 0 0 0 0 0 255");
}

#[test]
fn ppm_splits_long_lines() {
    let mut c = Canvas::new(10, 2);
    for cell in c.cells_mut() {
        *cell = Color::rgb(1.0, 0.8, 0.6);
    }

    let lines = ppm_lines(&c);
    assert_eq!(lines[3], "255 204 153 255 204 153 255 204 153 255 204 153 255 204 153 255 204");
    assert_eq!(lines[4], "153 255 204 153 255 204 153 255 204 153 255 204 153");
    assert_eq!(lines[5], "255 204 153 255 204 153 255 204 153 255 204 153 255 204 153 255 204");
    assert_eq!(lines[6], "153 255 204 153 255 204 153 255 204 153 255 204 153");
    assert!(lines.iter().all(|l| l.len() <= PPM_LINE_WIDTH));
}

#[test]
fn ppm_ends_with_newline() {
    let mut buf = Vec::new();
    Canvas::new(5, 3).to_ppm(&mut buf).unwrap();

    assert_eq!(buf.last(), Some(&b'\n'));
}

#[test]
fn saves_ppm_and_png_by_extension() {
    let dir = std::env::temp_dir().join(format!("whitted-canvas-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let mut c = Canvas::new(3, 2);
    c.write_pixel(1, 1, &Color::white()).unwrap();

    let ppm = dir.join("out.ppm");
    let png = dir.join("out.png");
    c.save(&ppm).unwrap();
    c.save(&png).unwrap();

    assert!(std::fs::read_to_string(&ppm).unwrap().starts_with("P3\n3 2\n255\n"));
    assert_eq!(&std::fs::read(&png).unwrap()[1..4], b"PNG");

    std::fs::remove_dir_all(&dir).unwrap();
}
