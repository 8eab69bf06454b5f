use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn stable_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Two deterministic values in [-1, 1] derived from `id`.
pub fn stable_pair(id: &str) -> (f32, f32) {
    let hash = stable_hash(id);

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

/// Strips the `svc:` / `dep:` / `rt:` namespace from a node id.
pub fn short_name(id: &str) -> &str {
    id.split_once(':').map(|(_, rest)| rest).unwrap_or(id)
}

pub fn format_score(value: f32) -> String {
    format!("{value:.0}")
}

pub fn format_ratio(value: f32) -> String {
    format!("{:.0}%", (value.clamp(0.0, 1.0) * 100.0).round())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_pair_is_deterministic_and_bounded() {
        let first = stable_pair("svc:checkout");
        let second = stable_pair("svc:checkout");
        assert_eq!(first, second);
        assert!((-1.0..=1.0).contains(&first.0));
        assert!((-1.0..=1.0).contains(&first.1));
    }

    #[test]
    fn short_name_drops_namespace_only() {
        assert_eq!(short_name("svc:checkout"), "checkout");
        assert_eq!(short_name("dep:postgres:15"), "postgres:15");
        assert_eq!(short_name("plain"), "plain");
    }

    #[test]
    fn ratio_formats_as_percent() {
        assert_eq!(format_ratio(0.456), "46%");
        assert_eq!(format_ratio(2.0), "100%");
    }
}
