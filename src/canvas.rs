use std::io;
use std::io::{ BufWriter, Write };
use std::fs::File;
use std::path::Path;

use tracing::info;

use crate::camera::Point2;
use crate::color::Color;
use crate::consts::{ GLOW_RADIUS, RING_RADIUS };
use crate::error::{ Error, Result };
use crate::shading::FillSpec;

/// Opacity of the light glow at its center.
const GLOW_ALPHA: f64 = 200.0 / 255.0;

/// A canvas for drawing pixels.
///
/// Frames are painted onto the canvas polygon by polygon, and once painting
/// finishes the `Canvas` can be used to save the pixels to an image file.
///
/// For now, only PPM images are supported.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Canvas {
    /// The width of the canvas, in pixels.
    pub width: usize,

    /// The height of the canvas, in pixels.
    pub height: usize,

    /// The pixels of the canvas, stored as a flattened vector.
    pixels: Vec<Color>,
}

impl Canvas {
    /// Creates a new, black canvas with specified width and height.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![Color::black(); width * height]
        }
    }

    /// Paints every pixel with one color.
    pub fn clear(&mut self, color: &Color) {
        for pixel in self.pixels.iter_mut() {
            *pixel = *color;
        }
    }

    /// Saves a canvas to a PPM file.
    ///
    /// Lines in the PPM file are kept within 70 columns; a color that would
    /// cross the 70 column mark starts a new line.
    pub fn save(&self, path: &Path) -> Result<()> {
        let io_error = |source| Error::Io { path: path.to_path_buf(), source };

        let file = File::create(path).map_err(io_error)?;
        self.write_ppm(&mut BufWriter::new(file)).map_err(io_error)?;

        info!("Saved {}x{} image to {:?}", self.width, self.height, path);
        Ok(())
    }

    /// Writes the canvas as a plain (P3) PPM image.
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> io::Result<()> {
        // Header: magic, size and maximum color value
        writeln!(out, "P3")?;
        writeln!(out, "{} {}", self.width, self.height)?;
        writeln!(out, "255")?;

        let mut col = 0;
        for pixel in self.pixels.iter() {
            for channel in pixel.to_rgb8().iter() {
                let s = channel.to_string();

                if col == 0 {
                    write!(out, "{}", s)?;
                    col = s.len();
                } else if col + 1 + s.len() > 70 {
                    write!(out, "\n{}", s)?;
                    col = s.len();
                } else {
                    write!(out, " {}", s)?;
                    col += 1 + s.len();
                }
            }
        }

        writeln!(out)?;
        out.flush()
    }

    /// Writes a color to a location on the `Canvas`.
    ///
    /// Out-of-bounds pixels are ignored. Pixels are specified in row-column
    /// order, where `y` is the row of the pixel, and `x` is the column. Rows
    /// and columns are zero-indexed.
    ///
    /// # Examples
    ///
    /// Writing a pixel to the fourth column, second row on an 8-by-8 canvas:
    ///
    /// ```
    /// # use letter_raster::color::Color;
    /// # use letter_raster::canvas::Canvas;
    /// let pink = Color::letter();
    /// let mut canvas = Canvas::new(8, 8);
    /// canvas.write_pixel(4, 2, &pink);
    /// assert_eq!(canvas.read_pixel(4, 2).unwrap(), pink);
    /// ```
    pub fn write_pixel(&mut self, x: usize, y: usize, pixel: &Color) {
        // Silently ignore out-of-bounds pixels
        if x >= self.width || y >= self.height {
            return;
        }

        self.pixels[(y * self.width) + x] = *pixel;
    }

    /// Mixes a color into a pixel with opacity `alpha` in `[0, 1]`.
    pub fn blend_pixel(&mut self, x: usize, y: usize, pixel: &Color, alpha: f64) {
        if let Some(under) = self.read_pixel(x, y) {
            let alpha = alpha.clamp(0.0, 1.0);
            self.write_pixel(x, y, &under.lerp(pixel, alpha));
        }
    }

    /// Reads a color from a location on the `Canvas`.
    ///
    /// Pixels are specified in row-column order, where `y` is the row of the
    /// pixel, and `x` is the column. Rows and columns are zero-indexed. If
    /// the specified pixel location is out-of-bounds, `None` is returned by
    /// this function.
    ///
    /// See method `write_pixel` for an example of writing and reading a pixel
    /// from a `Canvas`.
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<Color> {
        // Return nothing if pixel is out-of-bounds
        if x >= self.width || y >= self.height {
            return None
        }

        Some(self.pixels[(y * self.width) + x])
    }

    /// Fills a polygon using the even-odd rule.
    ///
    /// A pixel is inside when its center is. Each covered pixel is painted
    /// with the fill's color at that center.
    ///
    /// ```
    /// # use letter_raster::camera::Point2;
    /// # use letter_raster::color::Color;
    /// # use letter_raster::canvas::Canvas;
    /// # use letter_raster::shading::FillSpec;
    /// let mut canvas = Canvas::new(4, 4);
    /// let square = [Point2::new(1.0, 1.0), Point2::new(3.0, 1.0),
    ///     Point2::new(3.0, 3.0), Point2::new(1.0, 3.0)];
    /// canvas.fill_polygon(&square, &FillSpec::Solid { color: Color::white() });
    ///
    /// assert_eq!(canvas.read_pixel(1, 1).unwrap(), Color::white());
    /// assert_eq!(canvas.read_pixel(2, 2).unwrap(), Color::white());
    /// assert_eq!(canvas.read_pixel(3, 3).unwrap(), Color::black());
    /// ```
    pub fn fill_polygon(&mut self, points: &[Point2], fill: &FillSpec) {
        if points.len() < 3 || self.width == 0 || self.height == 0 {
            return;
        }

        let (min_y, max_y) = points.iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY),
                |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));

        let first_row = (min_y - 0.5).ceil().max(0.0) as usize;
        let last_row = (max_y - 0.5).floor().min(self.height as f64 - 1.0);
        if last_row < 0.0 {
            return;
        }

        let mut crossings = Vec::with_capacity(points.len());

        for row in first_row..=(last_row as usize) {
            let yc = row as f64 + 0.5;

            crossings.clear();
            for (i, a) in points.iter().enumerate() {
                let b = &points[(i + 1) % points.len()];

                // Half-open in y so shared vertices count once
                if (a.y <= yc) != (b.y <= yc) {
                    crossings.push(a.x + (yc - a.y) / (b.y - a.y) * (b.x - a.x));
                }
            }
            crossings.sort_by(|a, b| a.partial_cmp(b)
                .unwrap_or(std::cmp::Ordering::Equal));

            for span in crossings.chunks_exact(2) {
                let start = (span[0] - 0.5).ceil().max(0.0);
                let end = (span[1] - 0.5).ceil().min(self.width as f64);

                let mut col = start;
                while col < end {
                    let center = Point2::new(col + 0.5, yc);
                    self.write_pixel(col as usize, row, &fill.color_at(center));
                    col += 1.0;
                }
            }
        }
    }

    /// Draws the light source marker: a soft glow fading out to its edge and
    /// a thin ring around its center.
    pub fn draw_light_marker(&mut self, center: Point2, color: &Color) {
        self.for_each_pixel_near(center, GLOW_RADIUS, |canvas, x, y, d| {
            if d < GLOW_RADIUS {
                let alpha = GLOW_ALPHA * (1.0 - d / GLOW_RADIUS);
                canvas.blend_pixel(x, y, color, alpha);
            }
        });

        self.for_each_pixel_near(center, RING_RADIUS + 1.0, |canvas, x, y, d| {
            if (d - RING_RADIUS).abs() < 0.5 {
                canvas.write_pixel(x, y, color);
            }
        });
    }

    /// Visits every on-canvas pixel whose center lies in the square of
    /// half-size `reach` around `center`, along with that distance.
    fn for_each_pixel_near<F>(&mut self, center: Point2, reach: f64, mut f: F)
    where
        F: FnMut(&mut Canvas, usize, usize, f64),
    {
        let x0 = (center.x - reach).floor().max(0.0) as usize;
        let y0 = (center.y - reach).floor().max(0.0) as usize;
        let x1 = (center.x + reach).ceil().min(self.width as f64);
        let y1 = (center.y + reach).ceil().min(self.height as f64);
        if x1 <= 0.0 || y1 <= 0.0 {
            return;
        }

        for y in y0..(y1 as usize) {
            for x in x0..(x1 as usize) {
                let p = Point2::new(x as f64 + 0.5, y as f64 + 0.5);
                f(self, x, y, p.distance(&center));
            }
        }
    }
}

#[test]
fn new_canvas_is_black() {
    let c = Canvas::new(10, 20);

    assert_eq!(c.width, 10);
    assert_eq!(c.height, 20);
    assert!(c.pixels.iter().all(|p| *p == Color::black()));
}

#[test]
fn out_of_bounds_pixels_are_ignored() {
    let mut c = Canvas::new(2, 2);
    c.write_pixel(5, 0, &Color::white());

    assert_eq!(c.read_pixel(5, 0), None);
    assert!(c.pixels.iter().all(|p| *p == Color::black()));
}

#[test]
fn clear_and_blend() {
    let mut c = Canvas::new(3, 3);
    c.clear(&Color::background());
    c.blend_pixel(1, 1, &Color::white(), 0.5);

    assert_eq!(c.read_pixel(0, 0).unwrap(), Color::background());
    assert_eq!(c.read_pixel(1, 1).unwrap(),
        Color::background().lerp(&Color::white(), 0.5));
}

#[test]
fn ppm_header_and_pixels() {
    let mut c = Canvas::new(2, 1);
    c.write_pixel(0, 0, &Color::rgb8(255, 105, 180));

    let mut buf = Vec::new();
    c.write_ppm(&mut buf).unwrap();

    assert_eq!(String::from_utf8(buf).unwrap(), "P3\n2 1\n255\n255 105 180 0 0 0\n");
}

#[test]
fn ppm_lines_stay_short() {
    let mut c = Canvas::new(10, 2);
    c.clear(&Color::rgb(1.0, 0.8, 0.6));

    let mut buf = Vec::new();
    c.write_ppm(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();

    assert!(text.lines().all(|line| line.len() <= 70));
    assert!(text.ends_with('\n'));
    // Every channel is still there.
    assert_eq!(text.lines().skip(3).flat_map(|l| l.split_whitespace()).count(), 60);
}

#[test]
fn fill_triangle_covers_pixel_centers() {
    let mut c = Canvas::new(10, 10);
    let tri = [Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), Point2::new(0.0, 10.0)];
    c.fill_polygon(&tri, &FillSpec::Solid { color: Color::white() });

    assert_eq!(c.read_pixel(0, 0).unwrap(), Color::white());
    assert_eq!(c.read_pixel(4, 4).unwrap(), Color::white());
    assert_eq!(c.read_pixel(5, 5).unwrap(), Color::black());
    assert_eq!(c.read_pixel(9, 9).unwrap(), Color::black());
}

#[test]
fn fill_clips_to_canvas() {
    let mut c = Canvas::new(4, 4);
    let huge = [Point2::new(-100.0, -100.0), Point2::new(100.0, -100.0),
        Point2::new(100.0, 100.0), Point2::new(-100.0, 100.0)];
    c.fill_polygon(&huge, &FillSpec::Solid { color: Color::white() });

    assert!(c.pixels.iter().all(|p| *p == Color::white()));

    let mut d = Canvas::new(4, 4);
    let offscreen = [Point2::new(-10.0, -10.0), Point2::new(-5.0, -10.0),
        Point2::new(-5.0, -5.0)];
    d.fill_polygon(&offscreen, &FillSpec::Solid { color: Color::white() });

    assert!(d.pixels.iter().all(|p| *p == Color::black()));
}

#[test]
fn fill_evaluates_gradient_per_pixel() {
    use crate::shading::GradientStop;

    let mut c = Canvas::new(4, 1);
    let strip = [Point2::new(0.0, 0.0), Point2::new(4.0, 0.0),
        Point2::new(4.0, 1.0), Point2::new(0.0, 1.0)];
    let fill = FillSpec::Linear {
        start: Point2::new(0.5, 0.5),
        end: Point2::new(3.5, 0.5),
        stops: vec![
            GradientStop::new(0.0, Color::black()),
            GradientStop::new(1.0, Color::white()),
        ],
    };
    c.fill_polygon(&strip, &fill);

    assert_eq!(c.read_pixel(0, 0).unwrap(), Color::black());
    assert_eq!(c.read_pixel(1, 0).unwrap(), Color::rgb(1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0));
    assert_eq!(c.read_pixel(3, 0).unwrap(), Color::white());
}

#[test]
fn light_marker_glows_with_ring() {
    let mut c = Canvas::new(40, 40);
    let yellow = Color::light_marker();
    c.draw_light_marker(Point2::new(20.0, 20.0), &yellow);

    // Ring pixel: center (24.5, 20.5) is about 4.53 from the marker.
    assert_eq!(c.read_pixel(24, 20).unwrap(), yellow);
    // Inside the glow, partially blended.
    let inner = c.read_pixel(20, 20).unwrap();
    assert!(inner.r > 0.6 && inner.r < 1.0);
    // Outside the glow, untouched.
    assert_eq!(c.read_pixel(35, 20).unwrap(), Color::black());
}

#[test]
fn light_marker_near_edge_is_cropped() {
    let mut c = Canvas::new(8, 8);
    c.draw_light_marker(Point2::new(-3.0, 2.0), &Color::light_marker());
    c.draw_light_marker(Point2::new(-40.0, -40.0), &Color::light_marker());

    assert_ne!(c.read_pixel(0, 2).unwrap(), Color::black());
}
