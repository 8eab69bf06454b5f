use blastview::engine::{
    ColorCache, ConfidenceTier, Rgb, desaturate_for_confidence, dimmed, impact_intensity,
    owner_color, vivid,
};

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn confidence_has_exactly_three_bands() {
    let base = vivid(owner_color(Some("team-payments")));

    let mut bands: Vec<Rgb> = Vec::new();
    for step in 0..=100 {
        let color = desaturate_for_confidence(base, step as f32 / 100.0);
        if !bands.contains(&color) {
            bands.push(color);
        }
    }
    assert_eq!(bands.len(), 3);

    assert_eq!(desaturate_for_confidence(base, 0.0), desaturate_for_confidence(base, 0.39));
    assert_eq!(desaturate_for_confidence(base, 0.4), desaturate_for_confidence(base, 0.69));
    assert_eq!(desaturate_for_confidence(base, 0.7), desaturate_for_confidence(base, 1.0));
}

#[test]
fn band_edges_scale_saturation_and_lightness() {
    let base = Rgb::from_rgb8(200, 60, 60);
    let hsl = base.to_hsl();

    assert_eq!(desaturate_for_confidence(base, 0.7), base);

    let medium = desaturate_for_confidence(base, 0.5).to_hsl();
    assert!(close(medium.s, hsl.s * 0.7));
    assert!(close(medium.l, hsl.l));

    let low = desaturate_for_confidence(base, 0.1).to_hsl();
    assert!(close(low.s, hsl.s * 0.4));
    assert!(close(low.l, hsl.l * 0.85));
}

#[test]
fn tiers_follow_thresholds() {
    assert_eq!(ConfidenceTier::from_score(0.7), ConfidenceTier::High);
    assert_eq!(ConfidenceTier::from_score(0.69), ConfidenceTier::Medium);
    assert_eq!(ConfidenceTier::from_score(0.4), ConfidenceTier::Medium);
    assert_eq!(ConfidenceTier::from_score(0.39), ConfidenceTier::Low);
}

#[test]
fn impact_glow_is_linear() {
    assert!(close(impact_intensity(0.0), 0.15));
    assert!(close(impact_intensity(50.0), 0.525));
    assert!(close(impact_intensity(100.0), 0.90));
    assert!(close(impact_intensity(250.0), 0.90));
    assert!(close(impact_intensity(f32::NAN), 0.15));
}

#[test]
fn owner_color_is_stable_and_honors_hex_keys() {
    assert_eq!(owner_color(Some("team-risk")), owner_color(Some("team-risk")));
    assert_eq!(owner_color(Some("#ff8800")), Rgb::from_rgb8(0xff, 0x88, 0x00));
    assert_eq!(owner_color(None), Rgb::NEUTRAL_GRAY);
    assert_eq!(owner_color(Some("  ")), Rgb::NEUTRAL_GRAY);
}

#[test]
fn vivid_clamps_into_legible_band() {
    let washed = vivid(Rgb::from_rgb8(240, 235, 235)).to_hsl();
    assert!(washed.s >= 0.70 - 1e-3 && washed.s <= 0.85 + 1e-3);
    assert!(washed.l >= 0.55 - 1e-3 && washed.l <= 0.65 + 1e-3);
}

#[test]
fn gray_owners_stay_neutral() {
    assert_eq!(vivid(Rgb::from_rgb8(0x80, 0x80, 0x80)), Rgb::NEUTRAL_GRAY);
    assert_eq!(vivid(owner_color(Some("#202020"))), Rgb::NEUTRAL_GRAY);

    let mut cache = ColorCache::default();
    let gray = cache.vivid_owner_color(Some("#808080"));
    let red = cache.vivid_owner_color(Some("#ff0000"));
    assert_eq!(gray, Rgb::NEUTRAL_GRAY);
    assert_ne!(gray, red);
}

#[test]
fn dimmed_color_is_dark_and_nearly_gray() {
    let color = dimmed(Rgb::from_rgb8(220, 40, 40));
    let hsl = color.to_hsl();
    assert!(hsl.l < 0.3);
    assert!(hsl.s < 0.2);
}

#[test]
fn new_session_clears_cache() {
    let mut cache = ColorCache::new(16);
    cache.begin_session("query-a");
    cache.vivid_owner_color(Some("team-a"));
    cache.confidence_color(Some("team-a"), 0.5);
    assert_eq!(cache.len(), 2);

    cache.begin_session("query-a");
    assert_eq!(cache.len(), 2);

    cache.begin_session("query-b");
    assert!(cache.is_empty());
}

#[test]
fn missing_color_key_is_neutral_and_uncached() {
    let mut cache = ColorCache::default();
    assert_eq!(cache.vivid_owner_color(None), Rgb::NEUTRAL_GRAY);
    assert!(cache.is_empty());
}
