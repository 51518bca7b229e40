//! Scene descriptions read from JSON.
//!
//! Every field is optional; anything left out keeps the default scene's
//! value. A minimal description is just `{}`.

use std::convert::TryFrom;
use std::fs;
use std::path::Path;

use serde::{ Serialize, Deserialize };
use tracing::info;

use crate::clip::VisibilityPolicy;
use crate::consts::{ BASE_SCALE, CAMERA_DISTANCE, DEFAULT_DEPTH,
    DEFAULT_HEIGHT, DEFAULT_WIDTH };
use crate::error::{ Error, Result };
use crate::matrix::Axis;
use crate::scene::{ Letter, Scene };
use crate::shading::ShadingMode;
use crate::vector::Vector3;

/// Size and pose of one letter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LetterConfig {
    pub height: f64,
    pub width: f64,
    pub depth: f64,
    pub scale: f64,

    /// Extra rotation in degrees about X, Y and Z, applied in that order on
    /// top of the letter's upright starting pose.
    pub rotation: Vec<f64>,
}

impl Default for LetterConfig {
    fn default() -> LetterConfig {
        LetterConfig {
            height: DEFAULT_HEIGHT,
            width: DEFAULT_WIDTH,
            depth: DEFAULT_DEPTH,
            scale: 1.0,
            rotation: vec![0.0, 0.0, 0.0],
        }
    }
}

/// A serialized scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub d: LetterConfig,
    pub n: LetterConfig,

    pub camera_position: Vec<f64>,
    pub camera_rotation: Vec<f64>,

    /// Axes the letters are mirrored across.
    pub mirror: Vec<Axis>,

    pub light_direction: Vec<f64>,
    pub shading: ShadingMode,
    pub visibility: VisibilityPolicy,

    /// When set, the view scale follows the image size and `base_scale` is
    /// ignored.
    pub auto_scale: bool,
    pub base_scale: f64,
}

impl Default for SceneConfig {
    fn default() -> SceneConfig {
        SceneConfig {
            d: Default::default(),
            n: Default::default(),
            camera_position: vec![0.0, 0.0, -CAMERA_DISTANCE],
            camera_rotation: vec![0.0, 0.0, 0.0],
            mirror: Vec::new(),
            light_direction: vec![0.5, 0.5, -1.0],
            shading: Default::default(),
            visibility: Default::default(),
            auto_scale: true,
            base_scale: BASE_SCALE,
        }
    }
}

/// Reads a scene description from a JSON file.
pub fn load(path: &Path) -> Result<SceneConfig> {
    let text = fs::read_to_string(path)
        .map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
    let config = serde_json::from_str(&text)
        .map_err(|source| Error::Json { path: path.to_path_buf(), source })?;

    info!("Loaded scene description from {:?}", path);
    Ok(config)
}

fn invalid(details: String) -> Error {
    Error::InvalidConfig { details }
}

/// A size or scale must be a positive, finite number.
fn positive(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(invalid(format!("{} must be positive and finite, got {}", name, value)))
    }
}

/// Reads a three-component vector.
fn triple(name: &str, v: &Vec<f64>) -> Result<Vector3> {
    if v.len() != 3 {
        return Err(invalid(format!("{} needs 3 components, got {}", name, v.len())));
    }
    if v.iter().any(|c| !c.is_finite()) {
        return Err(invalid(format!("{} must be finite, got {:?}", name, v)));
    }

    Ok(v.into())
}

fn apply_letter(scene: &mut Scene, which: Letter, config: &LetterConfig)
    -> Result<()> {
    let name = format!("{:?}", which).to_lowercase();

    let height = positive(&format!("{}.height", name), config.height)?;
    let width = positive(&format!("{}.width", name), config.width)?;
    let depth = positive(&format!("{}.depth", name), config.depth)?;
    let scale = positive(&format!("{}.scale", name), config.scale)?;
    let rotation = triple(&format!("{}.rotation", name), &config.rotation)?;

    scene.set_dimensions(which, height, width, depth);
    scene.set_scale(which, scale);
    scene.rotate(which, Axis::X, rotation.x);
    scene.rotate(which, Axis::Y, rotation.y);
    scene.rotate(which, Axis::Z, rotation.z);

    Ok(())
}

/// Builds a scene from a description, rejecting values the renderer can't
/// use.
impl TryFrom<SceneConfig> for Scene {
    type Error = Error;

    fn try_from(config: SceneConfig) -> Result<Scene> {
        let mut scene = Scene::new();

        apply_letter(&mut scene, Letter::D, &config.d)?;
        apply_letter(&mut scene, Letter::N, &config.n)?;

        let position = triple("camera_position", &config.camera_position)?;
        let rotation = triple("camera_rotation", &config.camera_rotation)?;
        scene.set_camera_position(position);
        scene.set_camera_rotation([rotation.x, rotation.y, rotation.z]);

        let mut mirrored = [false; 3];
        for axis in config.mirror.iter() {
            mirrored[axis.index()] = true;
        }
        for axis in [Axis::X, Axis::Y, Axis::Z].iter() {
            if mirrored[axis.index()] {
                scene.set_mirror(*axis);
            }
        }

        let light = triple("light_direction", &config.light_direction)?;
        if light.length() == 0.0 {
            return Err(invalid("light_direction must not be zero".to_string()));
        }
        scene.set_light_direction(light);

        let base_scale = positive("base_scale", config.base_scale)?;
        scene.set_view_scale(config.auto_scale, base_scale);
        scene.set_shading_mode(config.shading);
        scene.set_visibility(config.visibility);

        Ok(scene)
    }
}

#[test]
fn default_config_builds_default_scene() {
    let scene = Scene::try_from(SceneConfig::default()).unwrap();
    let fresh = Scene::new();

    assert_eq!(scene.mesh(Letter::D), fresh.mesh(Letter::D));
    assert_eq!(scene.mesh(Letter::N), fresh.mesh(Letter::N));
    assert_eq!(scene.camera(), fresh.camera());
    assert_eq!(scene.light(), fresh.light());
    assert_eq!(scene.mirror(), [false; 3]);
    assert_eq!(scene.shading_mode(), ShadingMode::Phong);
    assert_eq!(scene.visibility(), VisibilityPolicy::Cull);
    assert_eq!(scene.viewport(800.0, 600.0), fresh.viewport(800.0, 600.0));
    assert_eq!(scene.viewport(800.0, 600.0).scale, 1.0);
}

#[test]
fn fixed_view_scale_is_opt_in() {
    let config: SceneConfig = serde_json::from_str(
        r#"{ "auto_scale": false, "base_scale": 3 }"#).unwrap();
    let scene = Scene::try_from(config).unwrap();

    assert_eq!(scene.viewport(800.0, 600.0).scale, 3.0);
    assert_eq!(scene.viewport(1200.0, 1200.0).scale, 3.0);
}

#[test]
fn empty_json_is_the_default() {
    let config: SceneConfig = serde_json::from_str("{}").unwrap();

    assert_eq!(config, SceneConfig::default());
}

#[test]
fn config_round_trips_through_json() {
    let config = SceneConfig::default();
    let json = serde_json::to_string(&config).unwrap();

    assert_eq!(serde_json::from_str::<SceneConfig>(&json).unwrap(), config);
}

#[test]
fn config_sets_scene_fields() {
    let config: SceneConfig = serde_json::from_str(r#"{
        "d": { "height": 120, "scale": 1.5, "rotation": [0, 20, 0] },
        "mirror": ["x", "x"],
        "shading": "gouraud",
        "visibility": "clip",
        "light_direction": [0, 0, -2]
    }"#).unwrap();
    let scene = Scene::try_from(config).unwrap();

    let d = scene.mesh(Letter::D);
    assert_eq!(d.dimensions(), (120.0, DEFAULT_WIDTH, DEFAULT_DEPTH));
    assert_eq!(d.scale(), 1.5);
    assert_eq!(d.transform(), crate::matrix::Matrix4::rotation_y(20.0)
        * crate::mesh::Mesh::initial_transform());

    // Listing an axis twice still mirrors it once.
    assert_eq!(scene.mirror(), [true, false, false]);
    assert_eq!(scene.shading_mode(), ShadingMode::Gouraud);
    assert_eq!(scene.visibility(), VisibilityPolicy::Clip);
    assert_eq!(scene.light().direction(), Vector3::new(0.0, 0.0, -1.0));
}

#[test]
fn invalid_dimensions_are_rejected() {
    let bad = [
        r#"{ "d": { "height": 0 } }"#,
        r#"{ "n": { "depth": -3 } }"#,
        r#"{ "n": { "scale": 0 } }"#,
        r#"{ "base_scale": -1 }"#,
        r#"{ "camera_position": [0, 0] }"#,
        r#"{ "light_direction": [0, 0, 0] }"#,
    ];

    for json in bad.iter() {
        let config: SceneConfig = serde_json::from_str(json).unwrap();
        match Scene::try_from(config) {
            Err(Error::InvalidConfig { .. }) => {}
            other => panic!("{} should be rejected, got {:?}", json, other.map(|_| ())),
        }
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let path = Path::new("does/not/exist.json");

    match load(path) {
        Err(Error::Io { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected an i/o error, got {:?}", other),
    }
}
