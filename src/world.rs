use crate::ray::Ray;
use crate::vector::Vector3;
use crate::color::Color;
use crate::scene::Scene;
use crate::config::RenderSettings;
use crate::light::lighting;
use crate::intersect::{ self, Intersection };

/// A scene ready to be traced.
///
/// Pairs the read-only `Scene` with the settings governing recursion and
/// shading. Nothing in a `World` changes during a render, so it can be shared
/// between threads freely.
#[derive(Clone, Debug)]
pub struct World {
    pub scene: Scene,
    pub settings: RenderSettings,
}

impl World {
    pub fn new(scene: Scene, settings: RenderSettings) -> World {
        World { scene, settings }
    }

    /// Determines whether a point is shadowed from a light.
    ///
    /// `origin` is the shaded point, already nudged towards the light, `lightv`
    /// the unit direction to the light and `distance` how far away the light
    /// is. The shape at index `skip` (the one being shaded) never occludes
    /// itself.
    pub fn is_shadowed(&self, origin: Vector3, lightv: Vector3, distance: f64,
        skip: usize) -> bool {
        let r = Ray::new(origin, lightv);

        self.scene.objects.iter()
            .enumerate()
            .filter(|&(index, _)| index != skip)
            .filter_map(|(_, shape)| shape.intersect(&r))
            .any(|t| t < distance)
    }

    /// Calculates the locally lit color of a hit, summed over every light.
    ///
    /// `eyev` points from the hit back towards the ray origin. Lights blocked
    /// by another shape contribute nothing. The sum is not clamped.
    pub fn shade_hit(&self, hit: &Intersection, point: Vector3, eyev: Vector3)
        -> Color {
        let material = hit.what.material();
        let normalv = hit.what.normal_at(point);

        self.scene.lights.iter().fold(Color::black(), |acc, light| {
            let (lightv, distance) = light.direction_from(point);
            let over_point = point + lightv * self.settings.bias;
            let shadowed = self.is_shadowed(over_point, lightv, distance,
                hit.index);

            acc + lighting(material, light, point, eyev, normalv,
                self.settings.shininess, shadowed)
        })
    }

    /// Determines the color seen along a ray.
    ///
    /// `depth` counts how many reflections or refractions produced this ray,
    /// and `inside` records whether it currently travels through a refractive
    /// sphere. Rays past the maximum depth, and rays hitting nothing, are
    /// black.
    ///
    /// The local color is blended with the reflected and refracted colors by
    /// the material's `reflectivity` and `refractivity`:
    ///
    /// `(1 - reflectivity - refractivity) * local
    ///     + refractivity * refracted + reflectivity * reflected`
    pub fn color_at(&self, ray: Ray, depth: usize, inside: bool) -> Color {
        if depth > self.settings.max_depth {
            return Color::black();
        }

        let hit = match intersect::hit(&self.scene.objects, &ray) {
            Some(hit) => hit,
            None => return Color::black(),
        };

        let point = ray.position(hit.t);
        let local = self.shade_hit(&hit, point, -ray.direction);

        let m = hit.what.material();
        let mut color = local * (1.0 - m.reflectivity - m.refractivity);

        if m.refractivity > 0.0 {
            color = color + self.refracted_color(&hit, &ray, point, depth,
                inside) * m.refractivity;
        }

        if m.reflectivity > 0.0 {
            color = color + self.reflected_color(&hit, &ray, point, depth,
                inside) * m.reflectivity;
        }

        color
    }

    /// Traces the mirror reflection of `ray` off the hit surface.
    fn reflected_color(&self, hit: &Intersection, ray: &Ray, point: Vector3,
        depth: usize, inside: bool) -> Color {
        let normalv = hit.what.normal_at(point);
        let reflectv = ray.direction.reflect(&normalv);

        let reflected = Ray::biased(point, reflectv, self.settings.bias);
        self.color_at(reflected, depth + 1, inside)
    }

    /// Traces the ray transmitted through the hit surface.
    ///
    /// Entering a sphere uses the material's index of refraction; leaving one
    /// (while `inside`) uses its inverse. Passing through a sphere's surface
    /// flips `inside`, while planes leave it alone. On total internal
    /// reflection the ray is mirrored back into the medium instead.
    fn refracted_color(&self, hit: &Intersection, ray: &Ray, point: Vector3,
        depth: usize, inside: bool) -> Color {
        let m = hit.what.material();
        let normalv = hit.what.normal_at(point);

        let ior = if inside { 1.0 / m.ior } else { m.ior };

        match refract(ray.direction, normalv, ior) {
            Some(refractv) => {
                let next_inside = if hit.what.is_sphere() {
                    !inside
                } else {
                    inside
                };

                let refracted = Ray::biased(point, refractv, self.settings.bias);
                self.color_at(refracted, depth + 1, next_inside)
            },
            None => {
                let reflectv = ray.direction.reflect(&normalv);
                let reflected = Ray::biased(point, reflectv, self.settings.bias);
                self.color_at(reflected, depth + 1, inside)
            },
        }
    }
}

/// Bends `incident` through a surface with unit normal `normal`.
///
/// `ior` is the ratio of the refractive index being entered to the one being
/// left. The normal may face either way; it is flipped to oppose the incoming
/// ray.
///
/// The refraction is built in the plane of incidence: `b` is the unit tangent
/// along which the incident ray slides over the surface, so `incident . b` is
/// the sine of the incidence angle. Snell's law scales that sine by `1 / ior`.
/// Returns `None` on total internal reflection.
pub fn refract(incident: Vector3, normal: Vector3, ior: f64)
    -> Option<Vector3> {
    let d = incident.normalize();
    let n = if normal.dot(&d) > 0.0 { -normal } else { normal };

    let a = n.cross(&d);
    if a.length() < f64::EPSILON {
        // Head-on incidence passes straight through.
        return Some(d);
    }

    let b = a.normalize().cross(&n);

    let sin_t = d.dot(&b) / ior;
    let sin2_t = sin_t * sin_t;
    if sin2_t > 1.0 {
        return None;
    }

    let cos_t = (1.0 - sin2_t).sqrt();
    Some(-n * cos_t + b * sin_t)
}

#[cfg(test)]
use crate::camera::Camera;
#[cfg(test)]
use crate::shape::Shape;
#[cfg(test)]
use crate::light::{ Light, Material };
#[cfg(test)]
use crate::consts::{ GLASS_RI, SELF_INTERSECTION_BIAS };
#[cfg(test)]
use crate::feq;

#[cfg(test)]
fn lit_floor_world() -> World {
    let floor = Shape::plane(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0));

    let mut scene = Scene::new(Camera::new(2.0, 2.0));
    scene.objects.push(floor);
    scene.lights.push(Light::point(Color::white(),
        Vector3::new(0.0, 10.0, -5.0), 1.0, 0.0, 0.0));

    World::new(scene, Default::default())
}

#[cfg(test)]
fn floor_ray() -> Ray {
    // Looks down at (0, 0, -5) on the floor from off to the side.
    Ray::new(Vector3::new(2.0, 1.0, -5.0),
        Vector3::new(-2.0, -1.0, 0.0).normalize())
}

#[test]
fn ray_miss_is_black() {
    let w = lit_floor_world();
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0));

    assert_eq!(w.color_at(r, 0, false), Color::black());
}

#[test]
fn occluder_blocks_light() {
    let mut w = lit_floor_world();
    let open = w.color_at(floor_ray(), 0, false);
    assert!(open.r > 0.0 && open.g > 0.0 && open.b > 0.0);

    w.scene.objects.push(Shape::sphere(Vector3::new(0.0, 3.0, -5.0), 1.0));
    let blocked = w.color_at(floor_ray(), 0, false);
    assert_eq!(blocked, Color::black());

    w.scene.objects.pop();
    assert_eq!(w.color_at(floor_ray(), 0, false), open);
}

#[test]
fn shadow_requires_occluder_before_light() {
    let mut w = lit_floor_world();
    w.scene.objects.push(Shape::sphere(Vector3::new(0.0, 20.0, -5.0), 1.0));

    let p = Vector3::new(0.0, 0.0, -5.0);
    let (lightv, distance) = w.scene.lights[0].direction_from(p);

    assert!(!w.is_shadowed(p, lightv, distance, 0));
}

#[test]
fn shape_never_shadows_itself() {
    let mut scene = Scene::new(Camera::new(2.0, 2.0));
    scene.objects.push(Shape::sphere(Vector3::new(0.0, 0.0, -5.0), 1.0));
    let w = World::new(scene, Default::default());

    // From the back of the sphere towards a light in front of it.
    let p = Vector3::new(0.0, 0.0, -6.0);
    let lightv = Vector3::new(0.0, 0.0, 1.0);

    assert!(!w.is_shadowed(p, lightv, 6.0, 0));
    assert!(w.is_shadowed(p + lightv * 0.0001, lightv, 6.0, 1));
}

#[test]
fn opaque_material_is_exactly_local_light() {
    let mut scene = Scene::new(Camera::new(2.0, 2.0));
    scene.objects.push(Shape::sphere(Vector3::new(0.0, 0.0, -5.0), 1.0)
        .with_material(Material {
            diffuse_color: Color::rgb(0.2, 0.7, 0.4),
            specular_color: Color::rgb(0.5, 0.5, 0.5),
            ..Default::default()
        }));
    scene.lights.push(Light::point(Color::white(),
        Vector3::new(2.0, 2.0, 0.0), 1.0, 0.1, 0.0));
    scene.lights.push(Light::point(Color::rgb(0.3, 0.3, 1.0),
        Vector3::new(-2.0, 0.0, 0.0), 0.5, 0.0, 0.0));
    let w = World::new(scene, Default::default());

    let r = Ray::new(Vector3::zero(), Vector3::new(0.1, 0.1, -1.0).normalize());
    let hit = intersect::hit(&w.scene.objects, &r).unwrap();
    let local = w.shade_hit(&hit, r.position(hit.t), -r.direction);
    let traced = w.color_at(r, 0, false);

    assert!(!local.is_black());
    assert!(traced.r == local.r && traced.g == local.g && traced.b == local.b);
}

#[test]
fn lights_sum_without_clamping() {
    let mut scene = Scene::new(Camera::new(2.0, 2.0));
    scene.objects.push(Shape::sphere(Vector3::new(0.0, 0.0, -5.0), 1.0));
    for _ in 0..3 {
        scene.lights.push(Light::point(Color::white(), Vector3::zero(),
            1.0, 0.0, 0.0));
    }
    let w = World::new(scene, Default::default());

    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));
    assert_eq!(w.color_at(r, 0, false), Color::rgb(3.0, 3.0, 3.0));
}

#[test]
fn facing_mirrors_terminate() {
    let mirror = Material {
        diffuse_color: Color::white(),
        reflectivity: 1.0,
        ..Default::default()
    };

    let mut scene = Scene::new(Camera::new(2.0, 2.0));
    scene.objects.push(Shape::sphere(Vector3::new(-3.0, 0.0, 0.0), 1.0)
        .with_material(mirror));
    scene.objects.push(Shape::sphere(Vector3::new(3.0, 0.0, 0.0), 1.0)
        .with_material(mirror));
    scene.lights.push(Light::point(Color::white(),
        Vector3::new(0.0, 5.0, 0.0), 1.0, 0.0, 0.0));
    let w = World::new(scene, Default::default());

    let r = Ray::new(Vector3::zero(), Vector3::new(1.0, 0.0, 0.0));
    let c = w.color_at(r, 0, false);

    // Perfect mirrors keep none of their own light, and the bounce chain is
    // cut off at the depth bound.
    assert!(c.is_finite());
    assert_eq!(c, Color::black());
}

#[test]
fn past_max_depth_is_black() {
    let w = lit_floor_world();
    let depth = w.settings.max_depth + 1;

    assert_eq!(w.color_at(floor_ray(), depth, false), Color::black());
    assert!(!w.color_at(floor_ray(), depth - 1, false).is_black());
}

#[test]
fn mirror_shows_reflection() {
    let mut w = lit_floor_world();
    w.scene.objects[0].material.diffuse_color = Color::rgb(0.0, 1.0, 0.0);

    // A mirror along x + y = 20, facing down and to the left.
    let mirror = Material {
        diffuse_color: Color::black(),
        reflectivity: 1.0,
        ..Default::default()
    };
    w.scene.objects.push(Shape::plane(Vector3::new(20.0, 0.0, -5.0),
        Vector3::new(-1.0, -1.0, 0.0)).with_material(mirror));

    // Travelling along +X, the ray bounces off the mirror straight down.
    let r = Ray::new(Vector3::new(0.0, 10.0, -5.0), Vector3::new(1.0, 0.0, 0.0));
    let c = w.color_at(r, 0, false);

    assert!(c.g > 0.0);
    assert!(feq(c.r, 0.0) && feq(c.b, 0.0));
}

#[test]
fn refraction_with_unit_ior_passes_straight_through() {
    let backdrop = Shape::plane(Vector3::new(0.0, 0.0, -10.0),
        Vector3::new(0.0, 0.0, 1.0));
    let light = Light::point(Color::white(), Vector3::new(0.0, 8.0, -8.0),
        1.0, 0.0, 0.0);

    let mut bare = Scene::new(Camera::new(2.0, 2.0));
    bare.objects.push(backdrop);
    bare.lights.push(light);

    let mut glass = bare.clone();
    glass.objects.insert(0, Shape::sphere(Vector3::new(0.0, 0.0, -5.0), 1.0)
        .with_material(Material {
            diffuse_color: Color::black(),
            refractivity: 1.0,
            ior: 1.0,
            ..Default::default()
        }));

    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));
    let seen_bare = World::new(bare, Default::default()).color_at(r, 0, false);
    let seen_glass = World::new(glass, Default::default()).color_at(r, 0, false);

    assert!(!seen_bare.is_black());
    assert_eq!(seen_glass, seen_bare);
}

#[test]
fn refract_head_on_is_unbent() {
    let d = Vector3::new(0.0, 0.0, -1.0);
    let n = Vector3::new(0.0, 0.0, 1.0);

    assert_eq!(refract(d, n, GLASS_RI), Some(d));
}

#[test]
fn refract_obeys_snell() {
    let k = 2.0f64.sqrt() / 2.0;
    let d = Vector3::new(k, -k, 0.0);
    let n = Vector3::new(0.0, 1.0, 0.0);

    let t = refract(d, n, 1.5).expect("Entering glass never reflects fully.");
    let sin_t = k / 1.5;

    assert!(feq(t.length(), 1.0));
    assert!(feq(t.x, sin_t));
    assert!(feq(t.y, -(1.0 - sin_t * sin_t).sqrt()));
    assert!(feq(t.z, 0.0));
}

#[test]
fn refract_accepts_normal_facing_away() {
    let k = 2.0f64.sqrt() / 2.0;
    let d = Vector3::new(k, -k, 0.0);

    assert_eq!(refract(d, Vector3::new(0.0, -1.0, 0.0), 1.5),
        refract(d, Vector3::new(0.0, 1.0, 0.0), 1.5));
}

#[test]
fn total_internal_reflection() {
    // Leaving glass at 60 degrees from the normal.
    let a = 60.0f64.to_radians();
    let d = Vector3::new(a.sin(), a.cos(), 0.0);
    let n = Vector3::new(0.0, 1.0, 0.0);

    assert_eq!(refract(d, n, 1.0 / GLASS_RI), None);
}

#[cfg(test)]
fn glass_ball() -> Shape {
    Shape::sphere(Vector3::new(0.0, 0.0, -5.0), 1.0)
        .with_material(Material {
            diffuse_color: Color::black(),
            refractivity: 1.0,
            ior: 1.5,
            ..Default::default()
        })
}

/// Places a small white target four units along `exit`, lit from halfway.
#[cfg(test)]
fn add_target(scene: &mut Scene, exit: &Ray) {
    let d = exit.direction;

    scene.objects.push(Shape::sphere(exit.origin + d * 4.0, 0.1));
    scene.lights.push(Light::point(Color::white(), exit.origin + d * 2.0,
        1.0, 0.0, 0.0));
}

/// Follows `r` through the glass ball: in with `ior`, out with `1 / ior`.
#[cfg(test)]
fn exit_through_glass(r: &Ray) -> Ray {
    let glass = glass_ball();
    let ior = glass.material.ior;

    let entry = r.position(glass.intersect(r).unwrap());
    let bent = refract(r.direction, glass.normal_at(entry), ior).unwrap();
    let inner = Ray::biased(entry, bent, SELF_INTERSECTION_BIAS);

    let exit = inner.position(glass.intersect(&inner).unwrap());
    let out = refract(inner.direction, glass.normal_at(exit), 1.0 / ior)
        .unwrap();
    Ray::biased(exit, out, SELF_INTERSECTION_BIAS)
}

#[test]
fn glass_ball_bends_ray_onto_target() {
    let r = Ray::new(Vector3::new(0.0, 0.5, 0.0), Vector3::new(0.0, 0.0, -1.0));
    let exit = exit_through_glass(&r);

    // A ray 30 degrees off the normal leaves deflected by 2 (30 - 19.47).
    let deviation = r.direction.dot(&exit.direction).acos().to_degrees();
    assert!((deviation - 21.0576).abs() < 0.001);

    let mut scene = Scene::new(Camera::new(2.0, 2.0));
    scene.objects.push(glass_ball());
    add_target(&mut scene, &exit);
    let w = World::new(scene, Default::default());

    assert_eq!(w.color_at(r, 0, false), Color::white());
}

#[test]
fn refracting_plane_keeps_medium() {
    let r = Ray::new(Vector3::new(0.0, 0.5, 0.0), Vector3::new(0.0, 0.0, -1.0));
    let exit = exit_through_glass(&r);

    let mut scene = Scene::new(Camera::new(2.0, 2.0));
    scene.objects.push(glass_ball());
    add_target(&mut scene, &exit);

    // A pane crossed head-on: the ray carries on unbent, still outside.
    scene.objects.push(Shape::plane(Vector3::new(0.0, 0.0, -1.0),
        Vector3::new(0.0, 0.0, 1.0)).with_material(Material {
            diffuse_color: Color::black(),
            refractivity: 1.0,
            ior: GLASS_RI,
            ..Default::default()
        }));
    let w = World::new(scene, Default::default());

    assert_eq!(w.color_at(r, 0, false), Color::white());
}

#[test]
fn leaving_glass_uses_inverse_ior() {
    let glass = glass_ball();

    // Starts inside the ball, 30 degrees off the normal where it leaves.
    let r = Ray::new(Vector3::new(0.0, 0.5, -5.0), Vector3::new(0.0, 0.0, -1.0));
    let exit = r.position(glass.intersect(&r).unwrap());
    let out = refract(r.direction, glass.normal_at(exit), 1.0 / glass.material.ior)
        .unwrap();
    let exit = Ray::biased(exit, out, SELF_INTERSECTION_BIAS);

    let mut scene = Scene::new(Camera::new(2.0, 2.0));
    scene.objects.push(glass);
    add_target(&mut scene, &exit);
    let w = World::new(scene, Default::default());

    assert_eq!(w.color_at(r, 0, true), Color::white());

    // Treated as entering glass instead, the ray bends the other way.
    assert_eq!(w.color_at(r, 0, false), Color::black());
}
