use eframe::egui::{Color32, Painter, Pos2, Rect, Shape, Stroke, Vec2, vec2};

use blastview::engine::{Projection, Rgb};

pub(super) fn to_color32(color: Rgb, opacity: f32) -> Color32 {
    let [r, g, b] = color.to_rgb8();
    Color32::from_rgba_unmultiplied(r, g, b, (opacity.clamp(0.0, 1.0) * 255.0).round() as u8)
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn with_alpha(color: Color32, alpha: f32) -> Color32 {
    Color32::from_rgba_unmultiplied(
        color.r(),
        color.g(),
        color.b(),
        (alpha.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(14, 17, 23));

    let center = rect.center();
    let max_radius = rect.width().max(rect.height()) * 0.7;
    for step in 0..6 {
        let radius = max_radius * (1.0 - step as f32 * 0.15);
        painter.circle_filled(
            center,
            radius,
            Color32::from_rgba_unmultiplied(24, 30, 40, 10 + step * 4),
        );
    }
}

pub(super) fn to_screen(rect: Rect, projection: Projection) -> Pos2 {
    rect.min + vec2(projection.x, projection.y)
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn diamond(center: Pos2, radius: f32) -> Vec<Pos2> {
    vec![
        center + vec2(0.0, -radius * 1.2),
        center + vec2(radius, 0.0),
        center + vec2(0.0, radius * 1.2),
        center + vec2(-radius, 0.0),
    ]
}

pub(super) fn draw_polyline(painter: &Painter, points: &[Pos2], colors: &[Color32], width: f32) {
    for (index, segment) in points.windows(2).enumerate() {
        let color = colors
            .get(index)
            .or_else(|| colors.last())
            .copied()
            .unwrap_or(Color32::GRAY);
        painter.line_segment([segment[0], segment[1]], Stroke::new(width, color));
    }
}

/// Walks the polyline emitting dashes; `offset` shifts the pattern along the path so that a
/// decreasing offset makes dashes flow from the first point toward the last.
pub(super) fn draw_dashed_polyline(
    painter: &Painter,
    points: &[Pos2],
    colors: &[Color32],
    width: f32,
    dash: f32,
    gap: f32,
    offset: f32,
) {
    let period = dash + gap;
    if period <= f32::EPSILON || dash <= 0.0 {
        draw_polyline(painter, points, colors, width);
        return;
    }

    let mut shapes = Vec::new();
    let mut travelled = offset.rem_euclid(period);
    for (index, segment) in points.windows(2).enumerate() {
        let (start, end) = (segment[0], segment[1]);
        let delta: Vec2 = end - start;
        let length = delta.length();
        if length <= f32::EPSILON {
            continue;
        }
        let color = colors
            .get(index)
            .or_else(|| colors.last())
            .copied()
            .unwrap_or(Color32::GRAY);

        let mut position = 0.0;
        while position < length {
            let phase = (travelled + position).rem_euclid(period);
            let (on, remaining) = if phase < dash {
                (true, dash - phase)
            } else {
                (false, period - phase)
            };
            let next = (position + remaining.max(0.01)).min(length);
            if on {
                shapes.push(Shape::line_segment(
                    [start + delta * (position / length), start + delta * (next / length)],
                    Stroke::new(width, color),
                ));
            }
            position = next;
        }
        travelled += length;
    }
    painter.extend(shapes);
}
