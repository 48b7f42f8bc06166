use std::fs;
use std::path::Path;

use serde::{ Serialize, Deserialize };
use tracing::{ debug, warn };

use crate::feq;
use crate::loader;
use crate::error::{ Result, SceneError };
use crate::camera::Camera;
use crate::shape::{ Shape, ShapeType };
use crate::light::{ Light, Material };
use crate::vector::Vector3;
use crate::color::Color;

/// Everything a render needs: one camera, the shapes and the lights.
///
/// A scene is built once by a loader and never changes afterwards. Shapes
/// keep the order they were declared in; the nearest-hit search relies on it
/// to break ties.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub camera: Camera,
    pub objects: Vec<Shape>,
    pub lights: Vec<Light>,
}

impl Scene {
    /// Creates a scene with no shapes and no lights.
    pub fn new(camera: Camera) -> Scene {
        Scene {
            camera,
            objects: Vec::new(),
            lights: Vec::new(),
        }
    }

    /// Loads a scene from a file.
    ///
    /// Files ending in `.json` are read as JSON; anything else is read with
    /// the line-oriented text format (see `loader`).
    pub fn load(path: &Path) -> Result<Scene> {
        let source = fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

        let scene = if is_json {
            Scene::from_json(&source)?
        } else {
            loader::parse_scene(&source)?
        };

        let spheres = scene.objects.iter().filter(|s| s.is_sphere()).count();
        debug!(
            spheres,
            planes = scene.objects.len() - spheres,
            lights = scene.lights.len(),
            "loaded scene from {}", path.display()
        );

        if scene.lights.is_empty() {
            warn!("scene has no lights, every pixel will be black");
        }

        Ok(scene)
    }

    /// Parses and validates a JSON scene.
    pub fn from_json(source: &str) -> Result<Scene> {
        let scene_json: SceneJson = serde_json::from_str(source)?;
        let scene: Scene = scene_json.into();

        scene.validate()?;
        Ok(scene)
    }

    /// Checks every value of the scene against the rules the text format
    /// enforces while parsing.
    ///
    /// Errors name the offending entry, e.g. `objects[2]` or `lights[0]`.
    pub fn validate(&self) -> Result<()> {
        validate_camera(&self.camera)
            .map_err(|r| r.at_item("camera".to_string()))?;

        for (i, shape) in self.objects.iter().enumerate() {
            validate_shape(shape)
                .map_err(|r| r.at_item(format!("objects[{}]", i)))?;
        }

        for (i, light) in self.lights.iter().enumerate() {
            validate_light(light)
                .map_err(|r| r.at_item(format!("lights[{}]", i)))?;
        }

        Ok(())
    }
}

impl From<SceneJson> for Scene {
    fn from(scene_json: SceneJson) -> Scene {
        Scene {
            camera: scene_json.camera,
            objects: scene_json.objects.into_iter().map(|x| x.into()).collect(),
            lights: scene_json.lights,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct SceneJson {
    camera: Camera,

    #[serde(default)]
    objects: Vec<ShapeJson>,

    #[serde(default)]
    lights: Vec<Light>,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ShapeJson {
    Sphere {
        position: Vector3,
        radius: f64,

        #[serde(flatten)]
        material: Material,
    },

    Plane {
        position: Vector3,
        normal: Vector3,

        #[serde(flatten)]
        material: Material,
    },
}

impl From<ShapeJson> for Shape {
    fn from(shape_json: ShapeJson) -> Shape {
        match shape_json {
            ShapeJson::Sphere { position, radius, material } =>
                Shape::sphere(position, radius).with_material(material),
            ShapeJson::Plane { position, normal, material } =>
                Shape::plane(position, normal).with_material(material),
        }
    }
}

/// A property value that failed validation.
#[derive(Debug, PartialEq)]
pub(crate) struct Rejected {
    pub property: &'static str,
    pub reason: String,
}

impl Rejected {
    fn new(property: &'static str, reason: impl Into<String>) -> Rejected {
        Rejected { property, reason: reason.into() }
    }

    pub fn at_line(self, line: usize) -> SceneError {
        SceneError::InvalidValue {
            line,
            property: self.property.to_string(),
            reason: self.reason,
        }
    }

    pub fn at_item(self, item: String) -> SceneError {
        SceneError::InvalidItem {
            item,
            property: self.property.to_string(),
            reason: self.reason,
        }
    }
}

type Checked = std::result::Result<(), Rejected>;

fn finite(property: &'static str, v: f64) -> Checked {
    if v.is_finite() {
        Ok(())
    } else {
        Err(Rejected::new(property, "must be finite"))
    }
}

fn positive(property: &'static str, v: f64) -> Checked {
    finite(property, v)?;
    if v > 0.0 {
        Ok(())
    } else {
        Err(Rejected::new(property, format!("must be positive, found {}", v)))
    }
}

fn non_negative(property: &'static str, v: f64) -> Checked {
    finite(property, v)?;
    if v >= 0.0 {
        Ok(())
    } else {
        Err(Rejected::new(property, format!("must not be negative, found {}", v)))
    }
}

fn unit_interval(property: &'static str, v: f64) -> Checked {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(Rejected::new(property,
            format!("must be between 0 and 1, found {}", v)))
    }
}

fn finite_vector(property: &'static str, v: &Vector3) -> Checked {
    finite(property, v.x)?;
    finite(property, v.y)?;
    finite(property, v.z)
}

fn nonzero_vector(property: &'static str, v: &Vector3) -> Checked {
    finite_vector(property, v)?;
    if v.length() > 0.0 {
        Ok(())
    } else {
        Err(Rejected::new(property, "must not be the zero vector"))
    }
}

fn unit_color(property: &'static str, c: &Color) -> Checked {
    unit_interval(property, c.r)?;
    unit_interval(property, c.g)?;
    unit_interval(property, c.b)
}

fn non_negative_color(property: &'static str, c: &Color) -> Checked {
    non_negative(property, c.r)?;
    non_negative(property, c.g)?;
    non_negative(property, c.b)
}

pub(crate) fn validate_camera(camera: &Camera) -> Checked {
    positive("width", camera.width)?;
    positive("height", camera.height)
}

pub(crate) fn validate_shape(shape: &Shape) -> Checked {
    match shape.ty {
        ShapeType::Sphere { center, radius } => {
            finite_vector("position", &center)?;
            non_negative("radius", radius)?;
        },
        ShapeType::Plane { position, normal } => {
            finite_vector("position", &position)?;
            nonzero_vector("normal", &normal)?;
        },
    }

    validate_material(shape.material())
}

pub(crate) fn validate_material(m: &Material) -> Checked {
    if let Some(color) = m.color {
        unit_color("color", &color)?;
    }

    non_negative_color("diffuse_color", &m.diffuse_color)?;
    non_negative_color("specular_color", &m.specular_color)?;

    unit_interval("reflectivity", m.reflectivity)?;
    unit_interval("refractivity", m.refractivity)?;

    let sum = m.reflectivity + m.refractivity;
    if sum > 1.0 && !feq(sum, 1.0) {
        return Err(Rejected::new("refractivity",
            format!("reflectivity + refractivity must not exceed 1, found {}",
                sum)));
    }

    positive("ior", m.ior)
}

pub(crate) fn validate_light(light: &Light) -> Checked {
    non_negative_color("color", &light.color)?;
    finite_vector("position", &light.position)?;

    unit_interval("radial-a0", light.radial_a0)?;
    unit_interval("radial-a1", light.radial_a1)?;
    unit_interval("radial-a2", light.radial_a2)?;

    if light.radial_a0 == 0.0 && light.radial_a1 == 0.0
        && light.radial_a2 == 0.0 {
        return Err(Rejected::new("radial-a0",
            "radial coefficients must not all be zero"));
    }

    if let Some(spot) = light.spot {
        // Wider cones would raise negative cosines to `angular-a0`.
        if !(spot.theta > 0.0 && spot.theta < 90.0) {
            return Err(Rejected::new("theta",
                format!("must be between 0 and 90 degrees for a spot light, \
                    found {}", spot.theta)));
        }

        nonzero_vector("direction", &spot.direction)?;
        unit_interval("angular-a0", spot.angular_a0)?;
    }

    Ok(())
}

#[cfg(test)]
const JSON_SCENE: &str = r#"{
    "camera": { "width": 2.0, "height": 1.5 },
    "objects": [
        {
            "type": "sphere",
            "position": [0.0, 0.0, -5.0],
            "radius": 1.0,
            "color": [1.0, 0.0, 0.0],
            "diffuse_color": [1.0, 0.0, 0.0],
            "specular_color": [0.2, 0.2, 0.2],
            "refractivity": 0.5,
            "ior": 1.52
        },
        {
            "type": "plane",
            "position": [0.0, -1.0, 0.0],
            "normal": [0.0, 2.0, 0.0],
            "diffuse_color": [0.5, 0.5, 0.5],
            "reflectivity": 0.25
        }
    ],
    "lights": [
        {
            "color": [1.0, 1.0, 1.0],
            "position": [0.0, 0.0, 0.0],
            "radial-a0": 1.0,
            "radial-a1": 0.0,
            "radial-a2": 0.0
        },
        {
            "color": [2.0, 2.0, 2.0],
            "position": [0.0, 5.0, -5.0],
            "radial-a0": 0.5,
            "radial-a1": 0.1,
            "radial-a2": 0.0,
            "spot": { "direction": [0.0, -1.0, 0.0], "theta": 30.0, "angular-a0": 0.5 }
        }
    ]
}"#;

#[test]
fn json_scene_loads() {
    let scene = Scene::from_json(JSON_SCENE).unwrap();

    assert_eq!(scene.camera, Camera::new(2.0, 1.5));
    assert_eq!(scene.objects.len(), 2);
    assert_eq!(scene.lights.len(), 2);

    let sphere = &scene.objects[0];
    assert!(sphere.is_sphere());
    assert_eq!(sphere.material.color, Some(Color::red()));
    assert_eq!(sphere.material.refractivity, 0.5);
    assert_eq!(sphere.material.ior, 1.52);

    let plane = &scene.objects[1];
    assert!(!plane.is_sphere());
    assert_eq!(plane.material.color, None);
    assert_eq!(plane.material.specular_color, Color::black());
    assert_eq!(plane.material.ior, 1.0);
    assert_eq!(plane.normal_at(Vector3::zero()), Vector3::new(0.0, 1.0, 0.0));

    assert!(!scene.lights[0].is_spot());
    assert!(scene.lights[1].is_spot());
    assert_eq!(scene.lights[1].radial_a1, 0.1);
}

#[test]
fn json_scene_requires_camera() {
    let res = Scene::from_json(r#"{ "objects": [], "lights": [] }"#);

    assert!(matches!(res, Err(SceneError::Json(_))));
}

#[test]
fn json_scene_rejects_unknown_shape() {
    let res = Scene::from_json(r#"{
        "camera": { "width": 1.0, "height": 1.0 },
        "objects": [ { "type": "cube", "position": [0.0, 0.0, 0.0] } ]
    }"#);

    assert!(matches!(res, Err(SceneError::Json(_))));
}

#[test]
fn json_scene_validates_materials() {
    let res = Scene::from_json(r#"{
        "camera": { "width": 1.0, "height": 1.0 },
        "objects": [
            { "type": "plane", "position": [0.0, 0.0, 0.0],
              "normal": [0.0, 1.0, 0.0], "diffuse_color": [1.0, 1.0, 1.0] },
            { "type": "sphere", "position": [0.0, 0.0, -3.0], "radius": 1.0,
              "diffuse_color": [1.0, 1.0, 1.0],
              "reflectivity": 0.75, "refractivity": 0.5 }
        ]
    }"#);

    match res {
        Err(SceneError::InvalidItem { item, property, .. }) => {
            assert_eq!(item, "objects[1]");
            assert_eq!(property, "refractivity");
        },
        other => panic!("Expected a validation error, got {:?}.", other),
    }
}

#[test]
fn validation_rejects_degenerate_values() {
    let mut scene = Scene::new(Camera::new(1.0, 1.0));
    assert_eq!(scene.validate().ok(), Some(()));

    scene.objects.push(Shape::plane(Vector3::zero(), Vector3::zero()));
    assert!(matches!(scene.validate(),
        Err(SceneError::InvalidItem { ref property, .. }) if property == "normal"));

    scene.objects.clear();
    scene.lights.push(Light::point(Color::white(), Vector3::zero(),
        0.0, 0.0, 0.0));
    assert!(matches!(scene.validate(),
        Err(SceneError::InvalidItem { ref property, .. }) if property == "radial-a0"));

    scene.lights.clear();
    scene.camera = Camera::new(0.0, 1.0);
    assert!(matches!(scene.validate(),
        Err(SceneError::InvalidItem { ref item, .. }) if item == "camera"));
}

#[test]
fn object_color_range_is_checked() {
    let m = Material {
        color: Some(Color::rgb(1.0, 1.2, 0.0)),
        ..Default::default()
    };

    assert_eq!(validate_material(&m).map_err(|r| r.property), Err("color"));
}

#[test]
fn light_color_may_exceed_one() {
    let light = Light::point(Color::rgb(3.0, 3.0, 3.0), Vector3::zero(),
        1.0, 0.0, 0.0);

    assert_eq!(validate_light(&light), Ok(()));
}

#[test]
fn load_reports_missing_file() {
    let path = Path::new("/nonexistent-directory/scene.txt");

    match Scene::load(path) {
        Err(SceneError::Io { path: p, .. }) => assert_eq!(p, path),
        other => panic!("Expected an I/O error, got {:?}.", other),
    }
}

#[test]
fn load_dispatches_on_extension() {
    let dir = std::env::temp_dir();
    let json_path = dir.join(format!("raycast-{}-scene.json", std::process::id()));
    let text_path = dir.join(format!("raycast-{}-scene.txt", std::process::id()));

    fs::write(&json_path, JSON_SCENE).unwrap();
    fs::write(&text_path, "camera, width: 2, height: 1.5\n").unwrap();

    let from_json = Scene::load(&json_path);
    let from_text = Scene::load(&text_path);

    fs::remove_file(&json_path).unwrap();
    fs::remove_file(&text_path).unwrap();

    assert_eq!(from_json.unwrap().objects.len(), 2);
    assert_eq!(from_text.unwrap(), Scene::new(Camera::new(2.0, 1.5)));
}

#[test]
fn spot_cone_must_stay_within_a_hemisphere() {
    let light = |theta: f64| Light::point(Color::white(), Vector3::zero(),
        1.0, 0.0, 0.0).with_spot(Vector3::new(0.0, -1.0, 0.0), theta, 0.5);

    assert_eq!(validate_light(&light(89.0)), Ok(()));

    for &theta in [90.0, 120.0, -30.0, f64::NAN].iter() {
        assert_eq!(validate_light(&light(theta)).map_err(|r| r.property),
            Err("theta"));
    }
}
