// Floating point comparisons
pub const FEQ_EPSILON: f64 = 0.0001;

// Offset applied to secondary ray origins along their direction
pub const SELF_INTERSECTION_BIAS: f64 = 0.0001;

// Maximum recursion depth for reflected and refracted rays
pub const MAX_RECURSION_DEPTH: usize = 7;

// Phong specular exponent
pub const SHININESS: f64 = 20.0;

// Distance reported by the plane solver for rays parallel to the plane
pub const PARALLEL_SENTINEL: f64 = -1.0;

// Distance from the pinhole to the viewport, along -Z
pub const FOCAL_DISTANCE: f64 = 1.0;

// Maximum channel value of a quantized pixel
pub const MAX_CHANNEL: f64 = 255.0;

// Common refraction indices
pub const VACUUM_RI: f64 = 1.0;
pub const GLASS_RI: f64 = 1.52;
