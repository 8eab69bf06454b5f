//! Owner colors and the derived vividness / confidence / dimming transforms.
//!
//! Every transform is pure. [`ColorCache`] memoizes the per-owner results for a single graph-query
//! session and is bounded so long sessions over many owners do not grow it without limit.

use std::collections::{HashMap, VecDeque};

use crate::util::stable_hash;

const VIVID_SATURATION: (f32, f32) = (0.70, 0.85);
const VIVID_LIGHTNESS: (f32, f32) = (0.55, 0.65);
const ACHROMATIC_SATURATION: f32 = 0.02;
const MEDIUM_CONFIDENCE_SATURATION: f32 = 0.7;
const LOW_CONFIDENCE_SATURATION: f32 = 0.4;
const LOW_CONFIDENCE_LIGHTNESS: f32 = 0.85;
const HASHED_SATURATION: f32 = 0.62;
const HASHED_LIGHTNESS: f32 = 0.52;
const IMPACT_INTENSITY_MIN: f32 = 0.15;
const IMPACT_INTENSITY_RANGE: f32 = 0.75;
const DIMMED_TINT: f32 = 0.08;
const DIMMED_BRIGHTNESS: f32 = 0.3;

pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Linear-ish RGB in [0, 1] per channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsl {
    /// Degrees in [0, 360).
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl Rgb {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const NEUTRAL_GRAY: Self = Self::new(0.55, 0.57, 0.60);
    pub const NEAR_WHITE: Self = Self::new(0.96, 0.97, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Accepts `#rrggbb` or `rrggbb`.
    pub fn parse_hex(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Self::from_rgb8(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        let quantize = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        [quantize(self.r), quantize(self.g), quantize(self.b)]
    }

    pub fn lerp(self, other: Self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        let inverse = 1.0 - amount;
        Self::new(
            self.r * inverse + other.r * amount,
            self.g * inverse + other.g * amount,
            self.b * inverse + other.b * amount,
        )
    }

    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor)
    }

    pub fn luminance(self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    pub fn to_hsl(self) -> Hsl {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let l = (max + min) * 0.5;
        let delta = max - min;

        if delta <= f32::EPSILON {
            return Hsl { h: 0.0, s: 0.0, l };
        }

        let s = if l > 0.5 {
            delta / (2.0 - max - min)
        } else {
            delta / (max + min)
        };

        let sector = if max == self.r {
            ((self.g - self.b) / delta).rem_euclid(6.0)
        } else if max == self.g {
            (self.b - self.r) / delta + 2.0
        } else {
            (self.r - self.g) / delta + 4.0
        };

        Hsl {
            h: sector * 60.0,
            s,
            l,
        }
    }

    pub fn from_hsl(hsl: Hsl) -> Self {
        let s = hsl.s.clamp(0.0, 1.0);
        let l = hsl.l.clamp(0.0, 1.0);
        if s <= f32::EPSILON {
            return Self::new(l, l, l);
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let h = hsl.h.rem_euclid(360.0) / 360.0;

        let channel = |t: f32| {
            let t = t.rem_euclid(1.0);
            if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            }
        };

        Self::new(channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
    }
}

/// Discrete data-quality bands; there is no interpolation between them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn from_score(confidence: f32) -> Self {
        if confidence >= 0.7 {
            Self::High
        } else if confidence >= 0.4 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Base color for an owner key: `#rrggbb` keys are used as-is, anything else is hashed to a hue.
pub fn owner_color(color_key: Option<&str>) -> Rgb {
    let Some(key) = color_key.map(str::trim).filter(|key| !key.is_empty()) else {
        return Rgb::NEUTRAL_GRAY;
    };

    if let Some(color) = Rgb::parse_hex(key) {
        return color;
    }

    let hue = (stable_hash(key) % 360) as f32;
    Rgb::from_hsl(Hsl {
        h: hue,
        s: HASHED_SATURATION,
        l: HASHED_LIGHTNESS,
    })
}

/// Forces saturation and lightness into the legible band while keeping the hue. Grays have no
/// hue to keep and map to [`Rgb::NEUTRAL_GRAY`].
pub fn vivid(color: Rgb) -> Rgb {
    let hsl = color.to_hsl();
    if hsl.s < ACHROMATIC_SATURATION {
        return Rgb::NEUTRAL_GRAY;
    }
    Rgb::from_hsl(Hsl {
        h: hsl.h,
        s: hsl.s.clamp(VIVID_SATURATION.0, VIVID_SATURATION.1),
        l: hsl.l.clamp(VIVID_LIGHTNESS.0, VIVID_LIGHTNESS.1),
    })
}

pub fn desaturate_for_tier(color: Rgb, tier: ConfidenceTier) -> Rgb {
    let hsl = color.to_hsl();
    match tier {
        ConfidenceTier::High => color,
        ConfidenceTier::Medium => Rgb::from_hsl(Hsl {
            s: hsl.s * MEDIUM_CONFIDENCE_SATURATION,
            ..hsl
        }),
        ConfidenceTier::Low => Rgb::from_hsl(Hsl {
            s: hsl.s * LOW_CONFIDENCE_SATURATION,
            l: hsl.l * LOW_CONFIDENCE_LIGHTNESS,
            ..hsl
        }),
    }
}

pub fn desaturate_for_confidence(color: Rgb, confidence: f32) -> Rgb {
    desaturate_for_tier(color, ConfidenceTier::from_score(confidence))
}

/// Emissive strength for the impact glow: 0 maps to 0.15, 100 maps to 0.90.
pub fn impact_intensity(impact_score: f32) -> f32 {
    let score = if impact_score.is_finite() {
        impact_score.clamp(0.0, 100.0)
    } else {
        0.0
    };
    IMPACT_INTENSITY_MIN + (score / 100.0) * IMPACT_INTENSITY_RANGE
}

/// Near-grayscale, heavily darkened tone for nodes outside the active neighborhood.
pub fn dimmed(color: Rgb) -> Rgb {
    let luminance = color.luminance();
    Rgb::new(luminance, luminance, luminance)
        .lerp(color, DIMMED_TINT)
        .scale(DIMMED_BRIGHTNESS)
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum CacheKey {
    Vivid(String),
    Tiered(String, ConfidenceTier),
}

/// Bounded memo of owner colors, scoped to one graph-query session.
#[derive(Debug)]
pub struct ColorCache {
    capacity: usize,
    session: Option<String>,
    entries: HashMap<CacheKey, Rgb>,
    order: VecDeque<CacheKey>,
}

impl Default for ColorCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl ColorCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            session: None,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Starts a new session when `session_id` differs from the current one, dropping all entries.
    pub fn begin_session(&mut self, session_id: &str) {
        if self.session.as_deref() == Some(session_id) {
            return;
        }
        self.session = Some(session_id.to_owned());
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn vivid_owner_color(&mut self, color_key: Option<&str>) -> Rgb {
        let Some(key) = normalized_key(color_key) else {
            return Rgb::NEUTRAL_GRAY;
        };
        self.get_or_insert(CacheKey::Vivid(key.to_owned()), || {
            vivid(owner_color(Some(key)))
        })
    }

    pub fn confidence_color(&mut self, color_key: Option<&str>, confidence: f32) -> Rgb {
        let tier = ConfidenceTier::from_score(confidence);
        let Some(key) = normalized_key(color_key) else {
            return desaturate_for_tier(Rgb::NEUTRAL_GRAY, tier);
        };
        if tier == ConfidenceTier::High {
            return self.vivid_owner_color(Some(key));
        }

        let base = self.vivid_owner_color(Some(key));
        self.get_or_insert(CacheKey::Tiered(key.to_owned(), tier), || {
            desaturate_for_tier(base, tier)
        })
    }

    fn get_or_insert(&mut self, key: CacheKey, compute: impl FnOnce() -> Rgb) -> Rgb {
        if let Some(color) = self.entries.get(&key) {
            return *color;
        }

        let color = compute();
        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, color);
        color
    }
}

fn normalized_key(color_key: Option<&str>) -> Option<&str> {
    color_key.map(str::trim).filter(|key| !key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsl_round_trip_preserves_primary_colors() {
        for color in [
            Rgb::new(1.0, 0.0, 0.0),
            Rgb::new(0.0, 1.0, 0.0),
            Rgb::new(0.2, 0.4, 0.8),
        ] {
            let back = Rgb::from_hsl(color.to_hsl());
            assert!((back.r - color.r).abs() < 1e-4);
            assert!((back.g - color.g).abs() < 1e-4);
            assert!((back.b - color.b).abs() < 1e-4);
        }
    }

    #[test]
    fn cache_evicts_oldest_entry_when_full() {
        let mut cache = ColorCache::new(2);
        cache.vivid_owner_color(Some("a"));
        cache.vivid_owner_color(Some("b"));
        cache.vivid_owner_color(Some("c"));
        assert_eq!(cache.len(), 2);
        assert!(!cache.entries.contains_key(&CacheKey::Vivid("a".into())));
    }
}
