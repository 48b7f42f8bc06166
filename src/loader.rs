//! Parser for the line-oriented text scene format.
//!
//! Each non-blank line declares one object: its type, then a comma-separated
//! list of `name: value` properties. Values are numbers or bracketed
//! three-component vectors:
//!
//! ```text
//! # A red sphere lit from the camera
//! camera, width: 2, height: 2
//! sphere, position: [0, 0, -5], radius: 1, diffuse_color: [1, 0, 0], specular_color: [0, 0, 0]
//! light, color: [1, 1, 1], position: [0, 0, 0], radial-a0: 1, radial-a1: 0, radial-a2: 0
//! ```
//!
//! Lines starting with `#` are comments. Errors report the 1-based line they
//! were found on.

use std::collections::BTreeMap;

use tracing::trace;

use crate::consts::VACUUM_RI;
use crate::error::{ Result, SceneError };
use crate::scene::{ self, Scene };
use crate::camera::Camera;
use crate::shape::Shape;
use crate::light::{ Light, Material };
use crate::vector::Vector3;
use crate::color::Color;

const CAMERA_PROPERTIES: &[&str] = &["width", "height"];

const SPHERE_PROPERTIES: &[&str] = &[
    "position", "radius",
    "color", "diffuse_color", "specular_color",
    "reflectivity", "refractivity", "ior",
];

const PLANE_PROPERTIES: &[&str] = &[
    "position", "normal",
    "color", "diffuse_color", "specular_color",
    "reflectivity", "refractivity", "ior",
];

const LIGHT_PROPERTIES: &[&str] = &[
    "color", "position", "direction", "theta",
    "radial-a0", "radial-a1", "radial-a2", "angular-a0",
];

#[derive(Copy, Clone, Debug, PartialEq)]
enum Value {
    Number(f64),
    Vector(Vector3),
}

/// The properties given on one line, keyed by name.
struct Properties {
    object: &'static str,
    line: usize,
    values: BTreeMap<String, Value>,
}

impl Properties {
    fn parse(object: &'static str, line: usize, text: &str,
        allowed: &[&str]) -> Result<Properties> {
        let mut values = BTreeMap::new();

        for item in split_properties(text, line)? {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }

            let (name, value) = item.split_once(':').ok_or_else(|| {
                SceneError::Syntax {
                    line,
                    message: format!("expected `name: value`, found {:?}", item),
                }
            })?;

            let name = name.trim();
            if !allowed.contains(&name) {
                return Err(SceneError::UnknownProperty {
                    line,
                    object,
                    property: name.to_string(),
                });
            }

            let value = parse_value(name, value.trim(), line)?;
            if values.insert(name.to_string(), value).is_some() {
                return Err(SceneError::DuplicateProperty {
                    line,
                    object,
                    property: name.to_string(),
                });
            }
        }

        Ok(Properties { object, line, values })
    }

    fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    fn number(&self, name: &'static str) -> Result<Option<f64>> {
        match self.values.get(name) {
            None => Ok(None),
            Some(Value::Number(n)) => Ok(Some(*n)),
            Some(Value::Vector(_)) => Err(self.invalid(name,
                "expected a number, found a vector")),
        }
    }

    fn vector(&self, name: &'static str) -> Result<Option<Vector3>> {
        match self.values.get(name) {
            None => Ok(None),
            Some(Value::Vector(v)) => Ok(Some(*v)),
            Some(Value::Number(_)) => Err(self.invalid(name,
                "expected a vector, found a number")),
        }
    }

    fn color(&self, name: &'static str) -> Result<Option<Color>> {
        Ok(self.vector(name)?.map(|v| Color::rgb(v.x, v.y, v.z)))
    }

    fn required<T>(&self, name: &'static str, value: Option<T>) -> Result<T> {
        value.ok_or(SceneError::MissingProperty {
            line: self.line,
            object: self.object,
            property: name,
        })
    }

    fn require_number(&self, name: &'static str) -> Result<f64> {
        let value = self.number(name)?;
        self.required(name, value)
    }

    fn require_vector(&self, name: &'static str) -> Result<Vector3> {
        let value = self.vector(name)?;
        self.required(name, value)
    }

    fn require_color(&self, name: &'static str) -> Result<Color> {
        let value = self.color(name)?;
        self.required(name, value)
    }

    fn invalid(&self, name: &str, reason: &str) -> SceneError {
        SceneError::InvalidValue {
            line: self.line,
            property: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Splits a property list on the commas that are not inside brackets.
fn split_properties(text: &str, line: usize) -> Result<Vec<&str>> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                if depth == 0 {
                    return Err(SceneError::Syntax {
                        line,
                        message: "unmatched `]`".to_string(),
                    });
                }
                depth -= 1;
            },
            ',' if depth == 0 => {
                items.push(&text[start..i]);
                start = i + 1;
            },
            _ => {},
        }
    }

    if depth != 0 {
        return Err(SceneError::Syntax {
            line,
            message: "unclosed `[`".to_string(),
        });
    }

    items.push(&text[start..]);
    Ok(items)
}

fn parse_number(name: &str, text: &str, line: usize) -> Result<f64> {
    let invalid = |reason: String| SceneError::InvalidValue {
        line,
        property: name.to_string(),
        reason,
    };

    let n: f64 = text.parse()
        .map_err(|_| invalid(format!("{:?} is not a number", text)))?;

    if n.is_finite() {
        Ok(n)
    } else {
        Err(invalid(format!("{:?} is not finite", text)))
    }
}

fn parse_value(name: &str, text: &str, line: usize) -> Result<Value> {
    let inner = match text.strip_prefix('[') {
        Some(rest) => rest.strip_suffix(']').ok_or_else(|| SceneError::Syntax {
            line,
            message: format!("trailing characters after vector {:?}", text),
        })?,
        None => return Ok(Value::Number(parse_number(name, text, line)?)),
    };

    let parts = inner.split(',')
        .map(|part| parse_number(name, part.trim(), line))
        .collect::<Result<Vec<f64>>>()?;

    if parts.len() != 3 {
        return Err(SceneError::InvalidValue {
            line,
            property: name.to_string(),
            reason: format!("expected 3 components, found {}", parts.len()),
        });
    }

    Ok(Value::Vector(Vector3::new(parts[0], parts[1], parts[2])))
}

fn parse_camera(props: &Properties) -> Result<Camera> {
    let camera = Camera::new(
        props.require_number("width")?,
        props.require_number("height")?,
    );

    scene::validate_camera(&camera).map_err(|r| r.at_line(props.line))?;
    Ok(camera)
}

/// Reads the surface properties shared by spheres and planes.
fn parse_material(props: &Properties, specular_required: bool)
    -> Result<Material> {
    let specular_color = if specular_required {
        props.require_color("specular_color")?
    } else {
        props.color("specular_color")?.unwrap_or_else(Color::black)
    };

    Ok(Material {
        color: props.color("color")?,
        diffuse_color: props.require_color("diffuse_color")?,
        specular_color,
        reflectivity: props.number("reflectivity")?.unwrap_or(0.0),
        refractivity: props.number("refractivity")?.unwrap_or(0.0),
        ior: props.number("ior")?.unwrap_or(VACUUM_RI),
    })
}

fn parse_sphere(props: &Properties) -> Result<Shape> {
    let sphere = Shape::sphere(
        props.require_vector("position")?,
        props.require_number("radius")?,
    ).with_material(parse_material(props, true)?);

    scene::validate_shape(&sphere).map_err(|r| r.at_line(props.line))?;
    Ok(sphere)
}

fn parse_plane(props: &Properties) -> Result<Shape> {
    let plane = Shape::plane(
        props.require_vector("position")?,
        props.require_vector("normal")?,
    ).with_material(parse_material(props, false)?);

    scene::validate_shape(&plane).map_err(|r| r.at_line(props.line))?;
    Ok(plane)
}

/// Reads a point light, or a spot light if `theta` is present and nonzero.
fn parse_light(props: &Properties) -> Result<Light> {
    let mut light = Light::point(
        props.require_color("color")?,
        props.require_vector("position")?,
        props.require_number("radial-a0")?,
        props.require_number("radial-a1")?,
        props.require_number("radial-a2")?,
    );

    let theta = props.number("theta")?.unwrap_or(0.0);
    if theta != 0.0 {
        light = light.with_spot(
            props.require_vector("direction")?,
            theta,
            props.require_number("angular-a0")?,
        );
    } else {
        for name in ["direction", "angular-a0"] {
            if props.has(name) {
                return Err(props.invalid(name,
                    "only allowed on spot lights (nonzero theta)"));
            }
        }
    }

    scene::validate_light(&light).map_err(|r| r.at_line(props.line))?;
    Ok(light)
}

/// Parses a complete text scene.
///
/// The scene must declare exactly one camera. Shapes and lights keep the
/// order they appear in.
pub fn parse_scene(source: &str) -> Result<Scene> {
    let mut cameras = Vec::new();
    let mut objects = Vec::new();
    let mut lights = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;

        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let (kind, rest) = text.split_once(',').unwrap_or((text, ""));
        let (object, allowed): (&'static str, _) = match kind.trim() {
            "camera" => ("camera", CAMERA_PROPERTIES),
            "sphere" => ("sphere", SPHERE_PROPERTIES),
            "plane" => ("plane", PLANE_PROPERTIES),
            "light" => ("light", LIGHT_PROPERTIES),
            other => return Err(SceneError::UnknownObject {
                line,
                name: other.to_string(),
            }),
        };

        let props = Properties::parse(object, line, rest, allowed)?;
        trace!(line, object, properties = props.values.len(), "parsed object");

        match object {
            "camera" => cameras.push(parse_camera(&props)?),
            "sphere" => objects.push(parse_sphere(&props)?),
            "plane" => objects.push(parse_plane(&props)?),
            _ => lights.push(parse_light(&props)?),
        }
    }

    let camera = match cameras.as_slice() {
        [] => return Err(SceneError::MissingCamera),
        [camera] => *camera,
        many => return Err(SceneError::MultipleCameras(many.len())),
    };

    Ok(Scene { camera, objects, lights })
}

#[cfg(test)]
const TEXT_SCENE: &str = "\
# Two shapes, two lights
camera, width: 2, height: 1.5

sphere, position: [0, 0, -5], radius: 1, color: [1, 0, 0], diffuse_color: [1, 0, 0], specular_color: [0.2, 0.2, 0.2], refractivity: 0.5, ior: 1.52
plane, position: [0, -1, 0], normal: [0, 2, 0], diffuse_color: [0.5, 0.5, 0.5], reflectivity: 0.25
light, color: [1, 1, 1], position: [0, 0, 0], radial-a0: 1, radial-a1: 0, radial-a2: 0
light, color: [2, 2, 2], position: [0, 5, -5], radial-a0: 0.5, radial-a1: 0.1, radial-a2: 0, theta: 30, direction: [0, -1, 0], angular-a0: 0.5
";

#[cfg(test)]
fn line_error(source: &str) -> (usize, SceneError) {
    let err = parse_scene(source).unwrap_err();
    let line = match err {
        SceneError::Syntax { line, .. }
        | SceneError::UnknownObject { line, .. }
        | SceneError::UnknownProperty { line, .. }
        | SceneError::DuplicateProperty { line, .. }
        | SceneError::MissingProperty { line, .. }
        | SceneError::InvalidValue { line, .. } => line,
        ref other => panic!("Expected a line error, got {:?}.", other),
    };

    (line, err)
}

#[test]
fn text_scene_loads() {
    let scene = parse_scene(TEXT_SCENE).unwrap();

    assert_eq!(scene.camera, Camera::new(2.0, 1.5));
    assert_eq!(scene.objects.len(), 2);
    assert_eq!(scene.lights.len(), 2);

    let sphere = &scene.objects[0];
    assert!(sphere.is_sphere());
    assert_eq!(sphere.material.color, Some(Color::red()));
    assert_eq!(sphere.material.specular_color, Color::rgb(0.2, 0.2, 0.2));
    assert_eq!(sphere.material.ior, 1.52);

    let plane = &scene.objects[1];
    assert_eq!(plane.material.specular_color, Color::black());
    assert_eq!(plane.material.reflectivity, 0.25);

    assert!(!scene.lights[0].is_spot());
    let spot = scene.lights[1].spot.unwrap();
    assert_eq!(spot.theta, 30.0);
    assert_eq!(spot.angular_a0, 0.5);
    assert_eq!(spot.direction, Vector3::new(0.0, -1.0, 0.0));
}

#[test]
fn text_and_json_agree() {
    let json = r#"{
        "camera": { "width": 2.0, "height": 1.5 },
        "objects": [
            { "type": "sphere", "position": [0.0, 0.0, -5.0], "radius": 1.0,
              "color": [1.0, 0.0, 0.0], "diffuse_color": [1.0, 0.0, 0.0],
              "specular_color": [0.2, 0.2, 0.2], "refractivity": 0.5, "ior": 1.52 },
            { "type": "plane", "position": [0.0, -1.0, 0.0], "normal": [0.0, 2.0, 0.0],
              "diffuse_color": [0.5, 0.5, 0.5], "reflectivity": 0.25 }
        ],
        "lights": [
            { "color": [1.0, 1.0, 1.0], "position": [0.0, 0.0, 0.0],
              "radial-a0": 1.0, "radial-a1": 0.0, "radial-a2": 0.0 },
            { "color": [2.0, 2.0, 2.0], "position": [0.0, 5.0, -5.0],
              "radial-a0": 0.5, "radial-a1": 0.1, "radial-a2": 0.0,
              "spot": { "direction": [0.0, -1.0, 0.0], "theta": 30.0, "angular-a0": 0.5 } }
        ]
    }"#;

    assert_eq!(parse_scene(TEXT_SCENE).unwrap(), Scene::from_json(json).unwrap());
}

#[test]
fn comments_and_blank_lines_are_skipped() {
    let scene = parse_scene("\n   \n# camera, width: 9, height: 9\n\
        camera, width: 1, height: 1\n").unwrap();

    assert_eq!(scene.camera, Camera::new(1.0, 1.0));
}

#[test]
fn unknown_object() {
    let (line, err) = line_error("camera, width: 1, height: 1\ncube, size: 1\n");

    assert_eq!(line, 2);
    assert!(matches!(err, SceneError::UnknownObject { ref name, .. } if name == "cube"));
}

#[test]
fn unknown_property() {
    let (line, err) = line_error("camera, width: 1, height: 1, depth: 3\n");

    assert_eq!(line, 1);
    assert!(matches!(err, SceneError::UnknownProperty { object: "camera", .. }));
}

#[test]
fn duplicate_property() {
    let (_, err) = line_error("camera, width: 1, width: 2, height: 1\n");

    assert!(matches!(err, SceneError::DuplicateProperty { ref property, .. }
        if property == "width"));
}

#[test]
fn missing_property() {
    let (line, err) = line_error("camera, width: 1, height: 1\n\
        sphere, position: [0, 0, -5], radius: 1, diffuse_color: [1, 0, 0]\n");

    assert_eq!(line, 2);
    assert!(matches!(err, SceneError::MissingProperty {
        object: "sphere", property: "specular_color", .. }));
}

#[test]
fn malformed_values() {
    let (_, err) = line_error("camera, width: wide, height: 1\n");
    assert!(matches!(err, SceneError::InvalidValue { ref property, .. }
        if property == "width"));

    let (_, err) = line_error("camera, width: 1, height: 1\n\
        plane, position: [0, 0], normal: [0, 1, 0], diffuse_color: [1, 1, 1]\n");
    assert!(matches!(err, SceneError::InvalidValue { ref property, .. }
        if property == "position"));

    let (_, err) = line_error("camera, width: [1, 1, 1], height: 1\n");
    assert!(matches!(err, SceneError::InvalidValue { ref property, .. }
        if property == "width"));

    let (_, err) = line_error("camera, width: 1, height: 1\n\
        plane, position: [0, 0, 0, normal: [0, 1, 0]\n");
    assert!(matches!(err, SceneError::Syntax { line: 2, .. }));

    let (_, err) = line_error("camera, width 1, height: 1\n");
    assert!(matches!(err, SceneError::Syntax { line: 1, .. }));
}

#[test]
fn out_of_range_values() {
    let base = "camera, width: 1, height: 1\n";

    let (line, err) = line_error(&format!("{}sphere, position: [0, 0, 0], \
        radius: -1, diffuse_color: [1, 1, 1], specular_color: [0, 0, 0]\n", base));
    assert_eq!(line, 2);
    assert!(matches!(err, SceneError::InvalidValue { ref property, .. }
        if property == "radius"));

    let (_, err) = line_error(&format!("{}sphere, position: [0, 0, 0], \
        radius: 1, color: [2, 0, 0], diffuse_color: [1, 1, 1], \
        specular_color: [0, 0, 0]\n", base));
    assert!(matches!(err, SceneError::InvalidValue { ref property, .. }
        if property == "color"));

    let (_, err) = line_error(&format!("{}plane, position: [0, 0, 0], \
        normal: [0, 0, 0], diffuse_color: [1, 1, 1]\n", base));
    assert!(matches!(err, SceneError::InvalidValue { ref property, .. }
        if property == "normal"));

    let (_, err) = line_error(&format!("{}light, color: [1, 1, 1], \
        position: [0, 0, 0], radial-a0: 1.5, radial-a1: 0, radial-a2: 0\n", base));
    assert!(matches!(err, SceneError::InvalidValue { ref property, .. }
        if property == "radial-a0"));

    let (_, err) = line_error("camera, width: 0, height: 1\n");
    assert!(matches!(err, SceneError::InvalidValue { ref property, .. }
        if property == "width"));
}

#[test]
fn spot_properties_follow_theta() {
    let base = "camera, width: 1, height: 1\n\
        light, color: [1, 1, 1], position: [0, 0, 0], \
        radial-a0: 1, radial-a1: 0, radial-a2: 0";

    let (_, err) = line_error(&format!("{}, theta: 20, angular-a0: 1\n", base));
    assert!(matches!(err, SceneError::MissingProperty { property: "direction", .. }));

    let (_, err) = line_error(&format!("{}, direction: [0, -1, 0]\n", base));
    assert!(matches!(err, SceneError::InvalidValue { ref property, .. }
        if property == "direction"));

    let (_, err) = line_error(&format!("{}, theta: 0, angular-a0: 1\n", base));
    assert!(matches!(err, SceneError::InvalidValue { ref property, .. }
        if property == "angular-a0"));

    let scene = parse_scene(&format!("{}, theta: 0\n", base)).unwrap();
    assert!(!scene.lights[0].is_spot());

    let (line, err) = line_error(&format!("{}, theta: 120, \
        direction: [0, -1, 0], angular-a0: 0.5\n", base));
    assert_eq!(line, 2);
    assert!(matches!(err, SceneError::InvalidValue { ref property, .. }
        if property == "theta"));
}

#[test]
fn exactly_one_camera() {
    assert!(matches!(parse_scene(""), Err(SceneError::MissingCamera)));
    assert!(matches!(
        parse_scene("camera, width: 1, height: 1\ncamera, width: 2, height: 2\n"),
        Err(SceneError::MultipleCameras(2))
    ));
}
