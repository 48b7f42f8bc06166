use serde::{ Serialize, Deserialize };

use crate::consts::VACUUM_RI;
use crate::color::Color;
use crate::vector::Vector3;

/// The cone of a spot light.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Spot {
    /// Where the spot is aimed. Normalized before use.
    pub direction: Vector3,

    /// Half-angle of the cone, in degrees.
    pub theta: f64,

    /// Exponent of the angular falloff inside the cone.
    #[serde(rename = "angular-a0")]
    pub angular_a0: f64,
}

/// A light source.
///
/// Every light is a point emitter with quadratic radial attenuation. A light
/// with a `spot` is additionally restricted to a cone; a spot with a `theta`
/// of zero behaves exactly like a point light.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub color: Color,
    pub position: Vector3,

    #[serde(rename = "radial-a0")]
    pub radial_a0: f64,
    #[serde(rename = "radial-a1")]
    pub radial_a1: f64,
    #[serde(rename = "radial-a2")]
    pub radial_a2: f64,

    #[serde(default)]
    pub spot: Option<Spot>,
}

impl Light {
    /// Creates a point light with radial attenuation `1 / (a2 d^2 + a1 d + a0)`.
    pub fn point(color: Color, position: Vector3, a0: f64, a1: f64, a2: f64)
        -> Light {
        Light {
            color,
            position,
            radial_a0: a0,
            radial_a1: a1,
            radial_a2: a2,
            spot: None,
        }
    }

    /// Restricts this light to a cone aimed along `direction`.
    ///
    /// A `theta` of zero leaves the light a point light.
    pub fn with_spot(mut self, direction: Vector3, theta: f64, angular_a0: f64)
        -> Light {
        self.spot = if theta == 0.0 {
            None
        } else {
            Some(Spot { direction, theta, angular_a0 })
        };

        self
    }

    /// Whether this light is restricted to a cone.
    pub fn is_spot(&self) -> bool {
        matches!(self.spot, Some(spot) if spot.theta != 0.0)
    }

    /// Finds the unit direction from `point` towards the light, and the
    /// distance between them.
    pub fn direction_from(&self, point: Vector3) -> (Vector3, f64) {
        let v = self.position - point;
        let distance = v.length();

        (v * (1.0 / distance), distance)
    }

    /// Radial attenuation at `distance` from the light.
    pub fn radial_attenuation(&self, distance: f64) -> f64 {
        1.0 / (self.radial_a2 * distance * distance
            + self.radial_a1 * distance
            + self.radial_a0)
    }

    /// Angular attenuation for a point seen along `lightv`.
    ///
    /// `lightv` is the unit vector from the shaded point to the light. Point
    /// lights, and spots with a zero falloff exponent, never attenuate.
    /// Outside the cone the result is zero; inside it is
    /// `(lightv . direction) ^ angular_a0`.
    pub fn angular_attenuation(&self, lightv: Vector3) -> f64 {
        let spot = match self.spot {
            Some(spot) if spot.theta != 0.0 && spot.angular_a0 != 0.0 => spot,
            _ => return 1.0,
        };

        let target = spot.theta.to_radians().cos();
        let cos_angle = lightv.dot(&spot.direction.normalize());

        if target > cos_angle {
            0.0
        } else {
            cos_angle.powf(spot.angular_a0)
        }
    }
}

fn default_ior() -> f64 {
    VACUUM_RI
}

/// A surface material.
///
/// Colors are used by the Phong model; `reflectivity` and `refractivity`
/// weight the secondary rays against the locally lit color. Their sum is
/// expected not to exceed one.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// The nominal color of the surface. Scenes may state it, but lighting only
    /// depends on the diffuse and specular colors.
    #[serde(default)]
    pub color: Option<Color>,

    pub diffuse_color: Color,

    #[serde(default)]
    pub specular_color: Color,

    #[serde(default)]
    pub reflectivity: f64,
    #[serde(default)]
    pub refractivity: f64,
    #[serde(default = "default_ior")]
    pub ior: f64,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            color: None,
            diffuse_color: Color::white(),
            specular_color: Color::black(),

            reflectivity: 0.0,
            refractivity: 0.0,
            ior: VACUUM_RI,
        }
    }
}

/// Calculates the light one source contributes to a point on a surface.
///
/// `eyev` points from the surface back along the incoming ray, `normalv` is the
/// unit surface normal, and `shininess` is the Phong specular exponent.
///
/// The diffuse and specular terms are summed and clamped to `0..=1` per
/// channel, then scaled by the light's radial and angular attenuation. No
/// specular highlight is produced when the surface faces away from the light.
///
/// If the point is in a shadow (parameter `in_shadow`), the light contributes
/// nothing.
pub fn lighting(m: &Material, light: &Light, point: Vector3, eyev: Vector3,
    normalv: Vector3, shininess: f64, in_shadow: bool) -> Color {
    if in_shadow {
        return Color::black();
    }

    let (lightv, distance) = light.direction_from(point);

    let frad = light.radial_attenuation(distance);
    let fang = light.angular_attenuation(lightv);

    let mut diffuse = Color::black();
    let mut specular = Color::black();

    let light_dot_normal = normalv.dot(&lightv);
    if light_dot_normal > 0.0 {
        diffuse = Color::hadamard(&light.color, &m.diffuse_color)
            * light_dot_normal;

        let reflectv = normalv * (2.0 * light_dot_normal) - lightv;
        let reflect_dot_eye = eyev.dot(&reflectv);
        if reflect_dot_eye > 0.0 {
            specular = Color::hadamard(&light.color, &m.specular_color)
                * reflect_dot_eye.powf(shininess);
        }
    }

    frad * fang * (diffuse + specular).clamp()
}

#[cfg(test)]
use crate::consts::SHININESS;

#[cfg(test)]
fn red_material() -> Material {
    Material {
        diffuse_color: Color::red(),
        specular_color: Color::white(),
        ..Default::default()
    }
}

#[test]
fn eye_between_light_and_surface() {
    let m = red_material();
    let light = Light::point(Color::white(), Vector3::new(0.0, 0.0, -10.0),
        1.0, 0.0, 0.0);

    let eyev = Vector3::new(0.0, 0.0, -1.0);
    let normalv = Vector3::new(0.0, 0.0, -1.0);

    let res = lighting(&m, &light, Vector3::zero(), eyev, normalv, SHININESS,
        false);

    // Full diffuse plus full specular, clamped per channel.
    assert_eq!(res, Color::rgb(1.0, 1.0, 1.0));
}

#[test]
fn specular_fades_off_the_mirror_direction() {
    let m = Material {
        diffuse_color: Color::black(),
        specular_color: Color::white(),
        ..Default::default()
    };
    let light = Light::point(Color::white(), Vector3::new(0.0, 0.0, -10.0),
        1.0, 0.0, 0.0);

    let k = 2.0f64.sqrt() / 2.0;
    let eyev = Vector3::new(0.0, k, -k);
    let normalv = Vector3::new(0.0, 0.0, -1.0);

    let res = lighting(&m, &light, Vector3::zero(), eyev, normalv, SHININESS,
        false);

    let expected = k.powf(SHININESS);
    assert_eq!(res, Color::rgb(expected, expected, expected));
}

#[test]
fn light_behind_surface() {
    let m = red_material();
    let light = Light::point(Color::white(), Vector3::new(0.0, 0.0, 10.0),
        1.0, 0.0, 0.0);

    let eyev = Vector3::new(0.0, 0.0, -1.0);
    let normalv = Vector3::new(0.0, 0.0, -1.0);

    let res = lighting(&m, &light, Vector3::zero(), eyev, normalv, SHININESS,
        false);
    assert_eq!(res, Color::black());
}

#[test]
fn shadowed_point_gets_nothing() {
    let m = red_material();
    let light = Light::point(Color::white(), Vector3::new(0.0, 0.0, -10.0),
        1.0, 0.0, 0.0);

    let eyev = Vector3::new(0.0, 0.0, -1.0);
    let normalv = Vector3::new(0.0, 0.0, -1.0);

    let res = lighting(&m, &light, Vector3::zero(), eyev, normalv, SHININESS,
        true);
    assert_eq!(res, Color::black());
}

#[test]
fn radial_attenuation_is_quadratic() {
    let light = Light::point(Color::white(), Vector3::zero(), 1.0, 0.5, 0.25);

    // 1 / (0.25 * 4 + 0.5 * 2 + 1)
    assert!(crate::feq(light.radial_attenuation(2.0), 1.0 / 3.0));
}

#[test]
fn attenuation_applies_after_clamping() {
    let m = Material {
        diffuse_color: Color::white(),
        ..Default::default()
    };
    let light = Light::point(Color::rgb(4.0, 4.0, 4.0),
        Vector3::new(0.0, 0.0, -2.0), 0.0, 0.0, 1.0);

    let eyev = Vector3::new(0.0, 0.0, -1.0);
    let normalv = Vector3::new(0.0, 0.0, -1.0);

    let res = lighting(&m, &light, Vector3::zero(), eyev, normalv, SHININESS,
        false);
    assert_eq!(res, Color::rgb(0.25, 0.25, 0.25));
}

#[test]
fn zero_theta_spot_is_a_point_light() {
    let light = Light::point(Color::white(), Vector3::zero(), 1.0, 0.0, 0.0)
        .with_spot(Vector3::new(0.0, -1.0, 0.0), 0.0, 2.0);

    assert!(!light.is_spot());
    assert_eq!(light.angular_attenuation(Vector3::new(1.0, 0.0, 0.0)), 1.0);
}

#[test]
fn spot_cone_cutoff() {
    let light = Light::point(Color::white(), Vector3::zero(), 1.0, 0.0, 0.0)
        .with_spot(Vector3::new(0.0, 1.0, 0.0), 30.0, 2.0);

    assert!(light.is_spot());

    // Along the axis.
    assert_eq!(light.angular_attenuation(Vector3::new(0.0, 1.0, 0.0)), 1.0);

    // 20 degrees off the axis: inside the cone.
    let a = 20.0f64.to_radians();
    let inside = Vector3::new(a.sin(), a.cos(), 0.0);
    assert!(crate::feq(light.angular_attenuation(inside), a.cos().powi(2)));

    // 45 degrees off the axis: outside the cone.
    let b = 45.0f64.to_radians();
    let outside = Vector3::new(b.sin(), b.cos(), 0.0);
    assert_eq!(light.angular_attenuation(outside), 0.0);
}

#[test]
fn spot_with_zero_falloff_does_not_attenuate() {
    let light = Light::point(Color::white(), Vector3::zero(), 1.0, 0.0, 0.0)
        .with_spot(Vector3::new(0.0, 1.0, 0.0), 10.0, 0.0);

    assert_eq!(light.angular_attenuation(Vector3::new(1.0, 0.0, 0.0)), 1.0);
}
