use crate::consts::{ MAX_RECURSION_DEPTH, SHININESS, SELF_INTERSECTION_BIAS };

/// Tunable parameters of a render.
///
/// The scene itself stays untouched by these; they only govern how rays are
/// traced and how many workers trace them.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderSettings {
    /// Rays spawned deeper than this contribute black.
    pub max_depth: usize,

    /// Phong specular exponent.
    pub shininess: f64,

    /// Offset applied to the origin of shadow, reflected and refracted rays.
    pub bias: f64,

    /// Number of worker threads for parallel renders. `None` lets rayon pick
    /// one per core.
    pub threads: Option<usize>,
}

impl Default for RenderSettings {
    fn default() -> RenderSettings {
        RenderSettings {
            max_depth: MAX_RECURSION_DEPTH,
            shininess: SHININESS,
            bias: SELF_INTERSECTION_BIAS,
            threads: None,
        }
    }
}

impl RenderSettings {
    pub fn with_max_depth(mut self, max_depth: usize) -> RenderSettings {
        self.max_depth = max_depth;
        self
    }

    pub fn with_threads(mut self, threads: Option<usize>) -> RenderSettings {
        self.threads = threads;
        self
    }
}

#[test]
fn defaults_come_from_consts() {
    let s = RenderSettings::default();

    assert_eq!(s.max_depth, MAX_RECURSION_DEPTH);
    assert_eq!(s.shininess, 20.0);
    assert_eq!(s.threads, None);
}

#[test]
fn builder_overrides() {
    let s = RenderSettings::default()
        .with_max_depth(2)
        .with_threads(Some(3));

    assert_eq!(s.max_depth, 2);
    assert_eq!(s.threads, Some(3));
}
