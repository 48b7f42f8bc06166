use crate::ray::Ray;
use crate::shape::Shape;

/// An intersection.
///
/// This structure assumes that some ray produced an intersection. Parameter `t`
/// is the offset from the ray origin, `index` is the position of the shape in
/// the scene, and `what` refers to the shape itself.
#[derive(Copy, Clone, Debug)]
pub struct Intersection<'a> {
    pub t: f64,
    pub index: usize,
    pub what: &'a Shape,
}

/// Two intersections are equal if they share an offset and hit the same shape.
impl<'a> PartialEq for Intersection<'a> {
    fn eq(&self, other: &Intersection<'a>) -> bool {
        self.t == other.t
            && self.index == other.index
            && std::ptr::eq(self.what, other.what)
    }
}

/// Finds the nearest forward intersection of a ray with a list of shapes.
///
/// Every shape is tested. The hit with the smallest positive `t` wins; on a
/// tie, the shape appearing first in `shapes` is kept. Returns `None` if the
/// ray hits nothing in front of its origin.
pub fn hit<'a>(shapes: &'a [Shape], ray: &Ray) -> Option<Intersection<'a>> {
    let mut nearest: Option<Intersection<'a>> = None;

    for (index, shape) in shapes.iter().enumerate() {
        let t = match shape.intersect(ray) {
            Some(t) => t,
            None => continue,
        };

        let closer = match nearest {
            Some(ref current) => t < current.t,
            None => true,
        };

        if closer {
            nearest = Some(Intersection { t, index, what: shape });
        }
    }

    nearest
}

#[cfg(test)]
use crate::vector::Vector3;

#[test]
fn hit_picks_nearest_shape() {
    let shapes = vec![
        Shape::sphere(Vector3::new(0.0, 0.0, -10.0), 1.0),
        Shape::sphere(Vector3::new(0.0, 0.0, -4.0), 1.0),
        Shape::plane(Vector3::new(0.0, 0.0, -20.0), Vector3::new(0.0, 0.0, 1.0)),
    ];
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));

    let i = hit(&shapes, &r).expect("Ray should hit a sphere.");
    assert_eq!(i.index, 1);
    assert!(crate::feq(i.t, 3.0));
    assert!(std::ptr::eq(i.what, &shapes[1]));
}

#[test]
fn hit_ignores_shapes_behind_origin() {
    let shapes = vec![
        Shape::sphere(Vector3::new(0.0, 0.0, 5.0), 1.0),
        Shape::plane(Vector3::new(0.0, 0.0, 3.0), Vector3::new(0.0, 0.0, 1.0)),
    ];
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));

    assert_eq!(hit(&shapes, &r), None);
}

#[test]
fn hit_tie_keeps_first_shape() {
    let shapes = vec![
        Shape::plane(Vector3::new(0.0, 0.0, -2.0), Vector3::new(0.0, 0.0, 1.0)),
        Shape::plane(Vector3::new(0.0, 0.0, -2.0), Vector3::new(0.0, 0.0, -1.0)),
    ];
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));

    assert_eq!(hit(&shapes, &r).map(|i| i.index), Some(0));
}

#[test]
fn hit_on_empty_scene() {
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));

    assert_eq!(hit(&[], &r), None);
}
