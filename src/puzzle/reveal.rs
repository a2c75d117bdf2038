//! UV-ink reveal
//!
//! While the UV lamp is on, the clue nearest to where the pointer ray hits the
//! wall fades in; every other clue fades out. Scans are throttled to about
//! 30 per second regardless of the frame rate.

use glam::Vec3;

use super::code::{Label, Symbol};

/// Max distance (world units) between ray hit and clue for a reveal
pub const REVEAL_RADIUS: f32 = 0.6;
/// Opacity gained per scan by the lit clue
pub const FADE_IN: f32 = 0.25;
/// Opacity lost per scan by unlit clues
pub const FADE_OUT: f32 = 0.16;
/// Below this a clue is hidden outright
pub const VISIBLE_EPSILON: f32 = 0.02;
/// Minimum time between scans
pub const SCAN_INTERVAL_MS: f64 = 33.0;

/// Where the pointer ray hit the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    /// The hit object is clickable (terminal, drawer...); no reveal there
    pub interactable: bool,
}

/// New opacity of one clue after a scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClueFade {
    pub symbol: Symbol,
    pub opacity: f32,
    pub visible: bool,
}

/// Per-clue opacity state
#[derive(Debug, Clone)]
pub struct UvReveal {
    opacity: Vec<(Symbol, f32)>,
    last_scan_ms: Option<f64>,
}

impl Default for UvReveal {
    fn default() -> Self {
        Self::new()
    }
}

impl UvReveal {
    pub fn new() -> Self {
        Self {
            opacity: Symbol::ALL.iter().map(|s| (*s, 0.0)).collect(),
            last_scan_ms: None,
        }
    }

    pub fn opacity(&self, symbol: Symbol) -> f32 {
        self.opacity
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, o)| *o)
            .unwrap_or(0.0)
    }

    /// Drop every clue to zero (lamp switched off)
    pub fn hide_all(&mut self) -> Vec<ClueFade> {
        self.opacity
            .iter_mut()
            .map(|(symbol, o)| {
                *o = 0.0;
                ClueFade {
                    symbol: *symbol,
                    opacity: 0.0,
                    visible: false,
                }
            })
            .collect()
    }

    /// One scan step
    ///
    /// `anchor` gives the world position of a clue, or `None` while the scene
    /// hasn't placed it yet. Returns `None` when throttled.
    pub fn scan(
        &mut self,
        now_ms: f64,
        hit: Option<RayHit>,
        anchor: impl Fn(Symbol) -> Option<Vec3>,
    ) -> Option<Vec<ClueFade>> {
        if let Some(last) = self.last_scan_ms {
            if now_ms - last < SCAN_INTERVAL_MS {
                return None;
            }
        }
        self.last_scan_ms = Some(now_ms);

        let lit = hit
            .filter(|h| !h.interactable)
            .and_then(|h| nearest(h.point, &anchor))
            .filter(|(_, d)| *d <= REVEAL_RADIUS)
            .map(|(s, _)| s);

        let fades = self
            .opacity
            .iter_mut()
            .map(|(symbol, o)| {
                let delta = if Some(*symbol) == lit { FADE_IN } else { -FADE_OUT };
                *o = (*o + delta).clamp(0.0, 1.0);
                ClueFade {
                    symbol: *symbol,
                    opacity: *o,
                    visible: *o > VISIBLE_EPSILON,
                }
            })
            .collect();
        Some(fades)
    }
}

/// Closest placed clue to `point`
fn nearest(point: Vec3, anchor: &impl Fn(Symbol) -> Option<Vec3>) -> Option<(Symbol, f32)> {
    Symbol::ALL
        .iter()
        .filter_map(|s| anchor(*s).map(|p| (*s, p.distance(point))))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchors(symbol: Symbol) -> Option<Vec3> {
        Some(match symbol {
            Symbol::Tri => Vec3::new(-2.0, 1.5, -4.0),
            Symbol::Cir => Vec3::new(2.0, 1.5, -4.0),
            Symbol::Sqr => Vec3::new(4.0, 1.5, 0.0),
            Symbol::X => Vec3::new(-4.0, 1.5, 0.0),
        })
    }

    fn hit_at(x: f32, y: f32, z: f32) -> Option<RayHit> {
        Some(RayHit {
            point: Vec3::new(x, y, z),
            interactable: false,
        })
    }

    #[test]
    fn test_nearest_clue_fades_in() {
        let mut uv = UvReveal::new();
        let mut now = 0.0;
        for _ in 0..4 {
            uv.scan(now, hit_at(-2.1, 1.5, -4.0), anchors);
            now += SCAN_INTERVAL_MS;
        }
        assert!((uv.opacity(Symbol::Tri) - 1.0).abs() < 1e-6);
        assert_eq!(uv.opacity(Symbol::Cir), 0.0);
    }

    #[test]
    fn test_far_hit_fades_out() {
        let mut uv = UvReveal::new();
        uv.scan(0.0, hit_at(-2.0, 1.5, -4.0), anchors);
        assert!((uv.opacity(Symbol::Tri) - FADE_IN).abs() < 1e-6);

        let fades = uv.scan(40.0, hit_at(0.0, 1.5, -4.0), anchors).unwrap();
        let tri = fades.iter().find(|f| f.symbol == Symbol::Tri).unwrap();
        assert!((tri.opacity - (FADE_IN - FADE_OUT)).abs() < 1e-6);
        assert!(tri.visible);

        let fades = uv.scan(80.0, None, anchors).unwrap();
        let tri = fades.iter().find(|f| f.symbol == Symbol::Tri).unwrap();
        assert_eq!(tri.opacity, 0.0);
        assert!(!tri.visible);
    }

    #[test]
    fn test_interactable_hit_reveals_nothing() {
        let mut uv = UvReveal::new();
        let hit = Some(RayHit {
            point: Vec3::new(-2.0, 1.5, -4.0),
            interactable: true,
        });
        uv.scan(0.0, hit, anchors);
        assert_eq!(uv.opacity(Symbol::Tri), 0.0);
    }

    #[test]
    fn test_scan_is_throttled() {
        let mut uv = UvReveal::new();
        assert!(uv.scan(0.0, None, anchors).is_some());
        assert!(uv.scan(16.0, None, anchors).is_none());
        assert!(uv.scan(33.0, None, anchors).is_some());
    }

    #[test]
    fn test_unplaced_clues_are_skipped() {
        let mut uv = UvReveal::new();
        uv.scan(0.0, hit_at(-2.0, 1.5, -4.0), |_| None);
        assert_eq!(uv.opacity(Symbol::Tri), 0.0);
    }

    #[test]
    fn test_hide_all() {
        let mut uv = UvReveal::new();
        uv.scan(0.0, hit_at(-2.0, 1.5, -4.0), anchors);
        let fades = uv.hide_all();
        assert_eq!(fades.len(), 4);
        assert!(fades.iter().all(|f| !f.visible && f.opacity == 0.0));
    }
}
