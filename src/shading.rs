use std::fmt;
use std::str::FromStr;

use serde::{ Serialize, Deserialize };

use crate::camera::Point2;
use crate::color::Color;
use crate::consts::PHONG_EDGE_FACTOR;
use crate::light::face_intensity;
use crate::vector::Vector3;

/// How faces are colored.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadingMode {
    /// One flat color per face, from the face normal.
    Monotone,

    /// Per-vertex intensities blended along a linear gradient.
    Gouraud,

    /// A bright centroid fading towards a darker rim.
    Phong,
}

impl Default for ShadingMode {
    fn default() -> ShadingMode {
        ShadingMode::Phong
    }
}

impl FromStr for ShadingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<ShadingMode, String> {
        match s.to_ascii_lowercase().as_str() {
            "monotone" => Ok(ShadingMode::Monotone),
            "gouraud" => Ok(ShadingMode::Gouraud),
            "phong" => Ok(ShadingMode::Phong),
            other => Err(format!(
                "unknown shading mode '{}' (expected monotone, gouraud or phong)",
                other)),
        }
    }
}

impl fmt::Display for ShadingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShadingMode::Monotone => "monotone",
            ShadingMode::Gouraud => "gouraud",
            ShadingMode::Phong => "phong",
        };
        write!(f, "{}", name)
    }
}

/// A color at a position along a gradient, `offset` in `[0, 1]`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Color,
}

impl GradientStop {
    pub fn new(offset: f64, color: Color) -> GradientStop {
        GradientStop { offset, color }
    }
}

/// How the inside of a polygon is painted.
///
/// Gradients are padded: points beyond either end take the color of the
/// nearest end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FillSpec {
    Solid {
        color: Color,
    },

    /// Varies along the line from `start` to `end`. Stops are sorted by
    /// offset.
    Linear {
        start: Point2,
        end: Point2,
        stops: Vec<GradientStop>,
    },

    /// Varies with distance from `center`: `inner` at the center, `outer`
    /// at `radius` and beyond.
    Radial {
        center: Point2,
        radius: f64,
        inner: Color,
        outer: Color,
    },
}

impl FillSpec {
    /// The color this fill paints at a screen point.
    ///
    /// # Examples
    ///
    /// ```
    /// # use letter_raster::camera::Point2;
    /// # use letter_raster::color::Color;
    /// # use letter_raster::shading::FillSpec;
    /// let fill = FillSpec::Radial {
    ///     center: Point2::new(0.0, 0.0),
    ///     radius: 10.0,
    ///     inner: Color::white(),
    ///     outer: Color::black(),
    /// };
    ///
    /// assert_eq!(fill.color_at(Point2::new(5.0, 0.0)), Color::rgb(0.5, 0.5, 0.5));
    /// assert_eq!(fill.color_at(Point2::new(0.0, 50.0)), Color::black());
    /// ```
    pub fn color_at(&self, point: Point2) -> Color {
        match self {
            FillSpec::Solid { color } => *color,
            FillSpec::Linear { start, end, stops } => {
                let dx = end.x - start.x;
                let dy = end.y - start.y;
                let len_sq = dx * dx + dy * dy;

                let t = if len_sq > 0.0 {
                    ((point.x - start.x) * dx + (point.y - start.y) * dy) / len_sq
                } else {
                    0.0
                };

                color_at_offset(stops, t.clamp(0.0, 1.0))
            }
            FillSpec::Radial { center, radius, inner, outer } => {
                if *radius <= 0.0 {
                    return *inner;
                }

                let t = (point.distance(center) / radius).clamp(0.0, 1.0);
                inner.lerp(outer, t)
            }
        }
    }
}

/// Interpolates between the two stops surrounding `t`.
fn color_at_offset(stops: &[GradientStop], t: f64) -> Color {
    let first = match stops.first() {
        Some(stop) => stop,
        None => return Color::black(),
    };

    if t <= first.offset {
        return first.color;
    }

    for pair in stops.windows(2) {
        let (lo, hi) = (&pair[0], &pair[1]);
        if t <= hi.offset {
            let span = hi.offset - lo.offset;
            if span <= 0.0 {
                return hi.color;
            }
            return lo.color.lerp(&hi.color, (t - lo.offset) / span);
        }
    }

    // Past the last stop
    stops[stops.len() - 1].color
}

/// Chooses the fill for one projected face.
///
/// `points` are the face's screen positions and `intensities` the lighting
/// at each of them, in the same order. `normal` is the face normal used for
/// flat shading against the world-space `light_dir`.
///
/// ```
/// # use letter_raster::camera::Point2;
/// # use letter_raster::color::Color;
/// # use letter_raster::shading::{ fill_for, FillSpec, ShadingMode };
/// # use letter_raster::vector::Vector3;
/// let pts = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(1.0, 1.0)];
/// let fill = fill_for(ShadingMode::Monotone, Color::letter(),
///     Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 0.0, -1.0),
///     &pts, &[1.0, 1.0, 1.0]);
///
/// assert_eq!(fill, FillSpec::Solid { color: Color::letter() * 0.3 });
/// ```
pub fn fill_for(mode: ShadingMode, base: Color, normal: Vector3,
    light_dir: Vector3, points: &[Point2], intensities: &[f64]) -> FillSpec {
    match mode {
        ShadingMode::Monotone => FillSpec::Solid {
            color: base.shade(face_intensity(normal, light_dir)),
        },
        ShadingMode::Gouraud => {
            let last = intensities.len().saturating_sub(1).max(1) as f64;
            let stops = intensities.iter()
                .enumerate()
                .map(|(i, &intensity)| {
                    GradientStop::new(i as f64 / last, base.shade(intensity))
                })
                .collect();

            FillSpec::Linear {
                start: points.first().copied().unwrap_or_default(),
                end: points.get(2).copied().unwrap_or_default(),
                stops,
            }
        }
        ShadingMode::Phong => {
            let center = Point2::centroid(points);
            let radius = points.iter()
                .map(|p| p.distance(&center))
                .fold(0.0, f64::max);

            let mean = if intensities.is_empty() {
                0.0
            } else {
                intensities.iter().sum::<f64>() / intensities.len() as f64
            };
            let inner = base.shade(mean);

            FillSpec::Radial {
                center,
                radius,
                inner,
                outer: inner * PHONG_EDGE_FACTOR,
            }
        }
    }
}

#[cfg(test)]
fn square() -> [Point2; 4] {
    [
        Point2::new(0.0, 0.0),
        Point2::new(10.0, 0.0),
        Point2::new(10.0, 10.0),
        Point2::new(0.0, 10.0),
    ]
}

#[test]
fn default_mode_is_phong() {
    assert_eq!(ShadingMode::default(), ShadingMode::Phong);
}

#[test]
fn mode_names_parse_back() {
    for mode in [ShadingMode::Monotone, ShadingMode::Gouraud, ShadingMode::Phong].iter() {
        assert_eq!(mode.to_string().parse::<ShadingMode>(), Ok(*mode));
    }
    assert_eq!("GOURAUD".parse::<ShadingMode>(), Ok(ShadingMode::Gouraud));
    assert!("flat".parse::<ShadingMode>().is_err());
}

#[test]
fn monotone_uses_face_normal() {
    let n = Vector3::new(0.0, 0.0, -1.0);
    let fill = fill_for(ShadingMode::Monotone, Color::letter(), n, n,
        &square(), &[0.3; 4]);

    assert_eq!(fill, FillSpec::Solid { color: Color::letter() });
}

#[test]
fn gouraud_spreads_stops_evenly() {
    let base = Color::white();
    let fill = fill_for(ShadingMode::Gouraud, base, Vector3::zero(),
        Vector3::zero(), &square(), &[0.3, 0.6, 0.9, 1.0]);

    match fill {
        FillSpec::Linear { start, end, stops } => {
            assert_eq!(start, Point2::new(0.0, 0.0));
            assert_eq!(end, Point2::new(10.0, 10.0));
            assert_eq!(stops.len(), 4);
            assert_eq!(stops[1], GradientStop::new(1.0 / 3.0, base * 0.6));
            assert_eq!(stops[3], GradientStop::new(1.0, base));
        }
        other => panic!("expected a linear gradient, got {:?}", other),
    }
}

#[test]
fn phong_fades_from_centroid() {
    let base = Color::white();
    let fill = fill_for(ShadingMode::Phong, base, Vector3::zero(),
        Vector3::zero(), &square(), &[0.4, 0.6, 0.8, 1.0]);

    match fill {
        FillSpec::Radial { center, radius, inner, outer } => {
            assert_eq!(center, Point2::new(5.0, 5.0));
            assert!(crate::feq(radius, 50.0f64.sqrt()));
            assert_eq!(inner, base * 0.7);
            assert_eq!(outer, base * 0.49);
        }
        other => panic!("expected a radial gradient, got {:?}", other),
    }
}

#[test]
fn linear_gradient_pads_both_ends() {
    let fill = FillSpec::Linear {
        start: Point2::new(0.0, 0.0),
        end: Point2::new(10.0, 0.0),
        stops: vec![
            GradientStop::new(0.0, Color::black()),
            GradientStop::new(0.5, Color::white()),
            GradientStop::new(1.0, Color::rgb(1.0, 0.0, 0.0)),
        ],
    };

    assert_eq!(fill.color_at(Point2::new(-5.0, 3.0)), Color::black());
    assert_eq!(fill.color_at(Point2::new(2.5, 0.0)), Color::rgb(0.5, 0.5, 0.5));
    assert_eq!(fill.color_at(Point2::new(7.5, 9.0)), Color::rgb(1.0, 0.5, 0.5));
    assert_eq!(fill.color_at(Point2::new(20.0, 0.0)), Color::rgb(1.0, 0.0, 0.0));
}

#[test]
fn degenerate_gradients_fall_back() {
    let linear = FillSpec::Linear {
        start: Point2::new(1.0, 1.0),
        end: Point2::new(1.0, 1.0),
        stops: vec![
            GradientStop::new(0.0, Color::white()),
            GradientStop::new(1.0, Color::black()),
        ],
    };
    let radial = FillSpec::Radial {
        center: Point2::new(1.0, 1.0),
        radius: 0.0,
        inner: Color::white(),
        outer: Color::black(),
    };

    assert_eq!(linear.color_at(Point2::new(5.0, 5.0)), Color::white());
    assert_eq!(radial.color_at(Point2::new(5.0, 5.0)), Color::white());
}

#[test]
fn fill_serializes_with_kind_tag() {
    let fill = FillSpec::Solid { color: Color::black() };
    let json = serde_json::to_string(&fill).unwrap();

    assert_eq!(json, r#"{"kind":"solid","color":{"r":0.0,"g":0.0,"b":0.0}}"#);
}
