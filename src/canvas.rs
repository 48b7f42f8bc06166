use std::io;
use std::io::{ BufWriter, Write };
use std::fs::File;
use std::path::Path;

use crate::color::Color;
use crate::error::RenderError;

/// A canvas of quantized pixels.
///
/// The `Rasterizer` fills a canvas with the colors its rays find, clamping and
/// quantizing each to eight bits per channel. Pixels are stored row by row,
/// top row first, left to right within a row.
///
/// Once rendering finishes, the `Canvas` can be saved as a binary PPM (P6)
/// image.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Canvas {
    /// The width of the canvas, in pixels.
    pub width: usize,

    /// The height of the canvas, in pixels.
    pub height: usize,

    /// The pixels of the canvas, stored as a flattened vector.
    pixels: Vec<[u8; 3]>,
}

impl Canvas {
    /// Creates a new, black canvas with specified width and height.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![[0, 0, 0]; width * height]
        }
    }

    /// The pixels of the canvas in scan order.
    pub fn pixels(&self) -> &[[u8; 3]] {
        &self.pixels
    }

    /// Mutable access to the flattened pixel buffer.
    pub fn pixels_mut(&mut self) -> &mut [[u8; 3]] {
        &mut self.pixels
    }

    /// Writes the canvas as a binary PPM.
    ///
    /// The header is `P6`, the dimensions and a maximum channel value of
    /// 255, each on its own line. Three bytes per pixel follow.
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;

        for pixel in self.pixels.iter() {
            out.write_all(pixel)?;
        }

        out.flush()
    }

    /// Saves a canvas to a PPM file at `path`.
    pub fn save(&self, path: &Path) -> Result<(), RenderError> {
        let write = || -> io::Result<()> {
            let mut out = BufWriter::new(File::create(path)?);
            self.write_ppm(&mut out)
        };

        write().map_err(|source| RenderError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes a color to a location on the `Canvas`.
    ///
    /// The color is clamped to `0.0..=1.0` and quantized before it is stored.
    /// Out-of-bounds pixels are ignored. Pixels are specified in row-column
    /// order, where `y` is the row of the pixel counted from the top, and `x`
    /// is the column. Rows and columns are zero-indexed.
    ///
    /// # Examples
    ///
    /// Writing a pixel to the fourth column, second row on an 8-by-8 canvas:
    ///
    /// ```
    /// # use raycast::color::Color;
    /// # use raycast::canvas::Canvas;
    /// let purple = Color::rgb(1.0, 0.0, 1.0);
    /// let mut canvas = Canvas::new(8, 8);
    /// canvas.write_pixel(4, 2, &purple);
    /// assert_eq!(canvas.read_pixel(4, 2).unwrap(), [255, 0, 255]);
    /// ```
    pub fn write_pixel(&mut self, x: usize, y: usize, pixel: &Color) {
        // Silently ignore out-of-bounds pixels
        if x >= self.width || y >= self.height {
            return;
        }

        self.pixels[(y * self.width) + x] = pixel.to_rgb8();
    }

    /// Reads a pixel from a location on the `Canvas`.
    ///
    /// Returns `None` if the location is out-of-bounds. See method
    /// `write_pixel` for an example.
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        // Return nothing if pixel is out-of-bounds
        if x >= self.width || y >= self.height {
            return None
        }

        Some(self.pixels[(y * self.width) + x])
    }
}

#[test]
fn new_canvas_is_black() {
    let c = Canvas::new(10, 20);

    assert_eq!(c.pixels().len(), 200);
    assert!(c.pixels().iter().all(|p| *p == [0, 0, 0]));
}

#[test]
fn write_pixel_quantizes() {
    let mut c = Canvas::new(3, 2);
    c.write_pixel(2, 1, &Color::rgb(1.5, 0.5, -1.0));

    assert_eq!(c.read_pixel(2, 1), Some([255, 127, 0]));
    assert_eq!(c.pixels()[5], [255, 127, 0]);
}

#[test]
fn out_of_bounds_pixels() {
    let mut c = Canvas::new(2, 2);
    c.write_pixel(2, 0, &Color::white());

    assert_eq!(c.read_pixel(2, 0), None);
    assert_eq!(c.read_pixel(0, 2), None);
    assert!(c.pixels().iter().all(|p| *p == [0, 0, 0]));
}

#[test]
fn ppm_header_and_body() {
    let mut c = Canvas::new(2, 1);
    c.write_pixel(0, 0, &Color::rgb(1.0, 0.0, 0.0));
    c.write_pixel(1, 0, &Color::rgb(0.0, 0.5, 1.0));

    let mut out: Vec<u8> = Vec::new();
    c.write_ppm(&mut out).unwrap();

    let mut expected = b"P6\n2 1\n255\n".to_vec();
    expected.extend_from_slice(&[255, 0, 0, 0, 127, 255]);
    assert_eq!(out, expected);
}

#[test]
fn ppm_of_empty_canvas_is_header_only() {
    let c = Canvas::new(0, 0);

    let mut out: Vec<u8> = Vec::new();
    c.write_ppm(&mut out).unwrap();
    assert_eq!(out, b"P6\n0 0\n255\n".to_vec());
}

#[test]
fn save_reports_path_on_failure() {
    let c = Canvas::new(1, 1);
    let path = Path::new("/nonexistent-directory/out.ppm");

    match c.save(path) {
        Err(RenderError::Write { path: p, .. }) => assert_eq!(p, path),
        other => panic!("Expected a write error, got {:?}.", other),
    }
}
