use std::f32::consts::TAU;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, Ui, vec2};

use blastview::engine::{
    Camera, EdgeBatch, LineStyle, NodeShape, PlacedNode, SceneFrame, Tooltip, Vec3,
};

use super::super::ViewModel;
use super::super::render_utils::{
    blend_color, circle_visible, diamond, draw_background, draw_dashed_polyline, draw_polyline,
    to_color32, to_screen, with_alpha,
};

const RING_SEGMENTS: usize = 72;
/// World radius of a node glyph at scale 1.
const NODE_WORLD_RADIUS: f32 = 0.55;
const SELECTED_RING: Color32 = Color32::from_rgb(245, 206, 93);
const HOVER_RING: Color32 = Color32::from_rgb(255, 164, 101);

struct ProjectedNode<'a> {
    placed: &'a PlacedNode,
    center: Pos2,
    radius: f32,
    depth: f32,
}

fn project(camera: &Camera, rect: Rect, point: Vec3) -> Option<(Pos2, f32, f32)> {
    camera
        .project(point, rect.width(), rect.height())
        .map(|projection| (to_screen(rect, projection), projection.depth, projection.scale))
}

fn project_path(camera: &Camera, rect: Rect, points: &[Vec3]) -> Option<Vec<Pos2>> {
    points
        .iter()
        .map(|point| project(camera, rect, *point).map(|(position, _, _)| position))
        .collect()
}

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        draw_background(&painter, rect);

        self.handle_camera_input(ui, &response);

        let elapsed = self.started.elapsed().as_secs_f32();
        let state = self.controller.state().clone();
        let frame = self.scene.frame(&state, elapsed);

        Self::draw_rings(&painter, &self.camera, rect, &frame);

        if frame.is_empty() {
            let message = if self.runner.is_loading() {
                "Computing blast radius..."
            } else if self.controller.focus().is_none() {
                "Search for a service, domain or dependency to begin."
            } else {
                "No graph for the current focus."
            };
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                message,
                FontId::proportional(16.0),
                Color32::from_gray(170),
            );
            self.handle_pointer(&response, None);
            return;
        }

        for batch in &frame.edges.background {
            Self::draw_edge_batch(&painter, &self.camera, rect, batch, frame.dash_offset);
        }
        for batch in &frame.edges.highlighted {
            Self::draw_edge_batch(&painter, &self.camera, rect, batch, frame.dash_offset);
        }

        let mut projected = frame
            .nodes
            .iter()
            .filter_map(|placed| {
                let (center, depth, scale) = project(&self.camera, rect, placed.position)?;
                let radius =
                    (placed.visual.scale * NODE_WORLD_RADIUS * scale).clamp(2.5, 46.0);
                circle_visible(rect, center, radius).then_some(ProjectedNode {
                    placed,
                    center,
                    radius,
                    depth,
                })
            })
            .collect::<Vec<_>>();
        projected.sort_by(|a, b| b.depth.total_cmp(&a.depth));

        if let Some(halo) = &frame.focus_halo
            && let Some((center, _, scale)) = project(&self.camera, rect, halo.center)
        {
            let radius = halo.radius * NODE_WORLD_RADIUS * scale * (1.0 + halo.pulse * 0.25);
            painter.circle_stroke(
                center,
                radius,
                Stroke::new(
                    1.5 + halo.pulse,
                    with_alpha(Color32::from_rgb(236, 242, 255), 0.25 + halo.pulse * 0.35),
                ),
            );
        }

        for node in &projected {
            Self::draw_node(&painter, node);
        }

        for placed_label in &frame.labels {
            let Some((anchor, _, _)) = project(&self.camera, rect, placed_label.anchor) else {
                continue;
            };
            let label = &placed_label.label;
            painter.text(
                anchor,
                Align2::CENTER_BOTTOM,
                &label.text,
                FontId::proportional(label.tier.font_size()),
                to_color32(label.tier.color(), 1.0),
            );
        }

        if let Some(notice) = &frame.truncation_notice {
            painter.text(
                rect.left_top() + vec2(12.0, 12.0),
                Align2::LEFT_TOP,
                notice,
                FontId::proportional(13.0),
                Color32::from_rgb(246, 190, 92),
            );
        }

        let pointer = Self::pointer_position(ui).filter(|pointer| rect.contains(*pointer));
        let hovered = pointer.and_then(|pointer| {
            projected
                .iter()
                .rev()
                .find(|node| node.center.distance(pointer) <= node.radius + 2.0)
                .map(|node| node.placed.visual.node_id.clone())
        });
        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        if let (Some(tooltip), Some(pointer)) = (&frame.tooltip, pointer) {
            Self::draw_tooltip(&painter, rect, pointer, tooltip);
        }

        let counts = frame.counts();
        painter.text(
            rect.left_bottom() + vec2(12.0, -10.0),
            Align2::LEFT_BOTTOM,
            format!(
                "{} nodes  |  {} highlighted / {} background edges  |  {}",
                counts.nodes,
                counts.highlighted_edges,
                counts.background_edges,
                state.view.label()
            ),
            FontId::proportional(12.0),
            Color32::from_gray(150),
        );

        if frame.is_animated() {
            ui.ctx().request_repaint();
        }

        self.handle_pointer(&response, hovered);
    }

    fn draw_rings(painter: &egui::Painter, camera: &Camera, rect: Rect, frame: &SceneFrame) {
        for ring in &frame.rings {
            let points = (0..=RING_SEGMENTS)
                .map(|step| {
                    let angle = step as f32 / RING_SEGMENTS as f32 * TAU;
                    Vec3::new(
                        ring.radius * angle.cos(),
                        ring.height,
                        ring.radius * angle.sin(),
                    )
                })
                .collect::<Vec<_>>();
            let Some(path) = project_path(camera, rect, &points) else {
                continue;
            };
            painter.add(Shape::line(
                path,
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(110, 128, 150, 60)),
            ));
        }
    }

    fn draw_edge_batch(
        painter: &egui::Painter,
        camera: &Camera,
        rect: Rect,
        batch: &EdgeBatch,
        dash_offset: f32,
    ) {
        for edge in &batch.edges {
            let Some(path) = project_path(camera, rect, &edge.points) else {
                continue;
            };
            let colors = edge
                .colors
                .iter()
                .map(|color| to_color32(*color, batch.opacity))
                .collect::<Vec<_>>();

            match batch.style {
                LineStyle::Solid => draw_polyline(painter, &path, &colors, batch.line_width),
                LineStyle::Dashed(pattern) => {
                    // Pattern lengths are in world units; convert at the edge midpoint.
                    let pixels = edge
                        .points
                        .get(edge.points.len() / 2)
                        .and_then(|middle| project(camera, rect, *middle))
                        .map_or(1.0, |(_, _, scale)| scale);
                    draw_dashed_polyline(
                        painter,
                        &path,
                        &colors,
                        batch.line_width,
                        pattern.dash * pixels,
                        pattern.gap * pixels,
                        dash_offset * pixels,
                    );
                }
            }
        }
    }

    fn draw_node(painter: &egui::Painter, node: &ProjectedNode<'_>) {
        let visual = &node.placed.visual;
        let fill = to_color32(visual.fill, visual.opacity);
        let outline = Stroke::new(1.2, to_color32(visual.wireframe, visual.opacity));

        if visual.emissive > 0.0 {
            painter.circle_filled(
                node.center,
                node.radius * 1.6,
                with_alpha(fill, visual.emissive * 0.22),
            );
        }

        match visual.shape {
            NodeShape::Sphere => {
                painter.circle_filled(node.center, node.radius, fill);
                painter.circle_stroke(node.center, node.radius, outline);
            }
            NodeShape::Cube => {
                let square =
                    Rect::from_center_size(node.center, vec2(node.radius, node.radius) * 1.7);
                painter.rect_filled(square, 1.5, fill);
                painter.rect_stroke(square, 1.5, outline, egui::StrokeKind::Middle);
            }
            NodeShape::Octahedron => {
                painter.add(Shape::convex_polygon(
                    diamond(node.center, node.radius),
                    fill,
                    outline,
                ));
            }
        }

        if visual.is_selected {
            painter.circle_stroke(
                node.center,
                node.radius + 5.0,
                Stroke::new(2.0, SELECTED_RING),
            );
        } else if visual.is_hovered {
            painter.circle_stroke(
                node.center,
                node.radius + 4.0,
                Stroke::new(1.5, blend_color(HOVER_RING, fill, 0.25)),
            );
        }
    }

    fn draw_tooltip(painter: &egui::Painter, rect: Rect, pointer: Pos2, tooltip: &Tooltip) {
        let mut text = tooltip.title.clone();
        for line in &tooltip.lines {
            text.push('\n');
            text.push_str(line);
        }

        let galley =
            painter.layout_no_wrap(text, FontId::proportional(12.5), Color32::from_gray(235));
        let padding = vec2(8.0, 6.0);
        let size = galley.size() + padding * 2.0;
        let mut origin = pointer + vec2(16.0, 16.0);
        if origin.x + size.x > rect.right() {
            origin.x = pointer.x - size.x - 12.0;
        }
        if origin.y + size.y > rect.bottom() {
            origin.y = pointer.y - size.y - 12.0;
        }

        let frame = Rect::from_min_size(origin, size);
        painter.rect_filled(frame, 4.0, Color32::from_rgba_unmultiplied(20, 24, 32, 235));
        painter.galley(origin + padding, galley, Color32::from_gray(235));
    }
}
