use eframe::egui::{self, Context, Pos2, RawInput, Ui};

use blastview::engine::{InputEvent, Key, KeyPress};

use super::super::ViewModel;

const ORBIT_SPEED: f32 = 0.008;
const PITCH_SPEED: f32 = 0.006;

fn shortcut_key(key: egui::Key) -> Option<Key> {
    Some(match key {
        egui::Key::Slash => Key::Slash,
        egui::Key::Escape => Key::Escape,
        egui::Key::Tab => Key::Tab,
        egui::Key::F => Key::F,
        egui::Key::V => Key::V,
        egui::Key::Num1 => Key::Digit(1),
        egui::Key::Num2 => Key::Digit(2),
        egui::Key::Num3 => Key::Digit(3),
        egui::Key::Num4 => Key::Digit(4),
        egui::Key::Num5 => Key::Digit(5),
        _ => return None,
    })
}

impl ViewModel {
    /// Takes Tab presses out of the frame's input while no text field is being edited, so they
    /// cycle the selection instead of moving widget focus.
    pub(in crate::app) fn intercept_navigation_keys(&mut self, raw_input: &mut RawInput) {
        if self.controller.input_focused() {
            return;
        }

        let pending = &mut self.pending_keys;
        raw_input.events.retain(|event| match event {
            egui::Event::Key {
                key: egui::Key::Tab,
                pressed,
                modifiers,
                ..
            } => {
                if *pressed {
                    pending.push(KeyPress {
                        key: Key::Tab,
                        shift: modifiers.shift,
                    });
                }
                false
            }
            _ => true,
        });
    }

    pub(in crate::app) fn handle_keyboard(&mut self, ctx: &Context) {
        let mut presses = std::mem::take(&mut self.pending_keys);
        ctx.input(|input| {
            for event in &input.events {
                if let egui::Event::Key {
                    key,
                    pressed: true,
                    repeat: false,
                    modifiers,
                    ..
                } = event
                    && !modifiers.command
                    && !modifiers.alt
                    && let Some(key) = shortcut_key(*key)
                {
                    presses.push(KeyPress {
                        key,
                        shift: modifiers.shift,
                    });
                }
            }
        });

        for press in presses {
            let commands = self.controller.handle(InputEvent::KeyPressed(press));
            self.execute(commands);
        }
    }

    pub(in crate::app) fn handle_camera_input(&mut self, ui: &Ui, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Secondary)
        {
            let delta = response.drag_delta();
            self.camera
                .orbit(-delta.x * ORBIT_SPEED, -delta.y * PITCH_SPEED);
        }

        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() > f32::EPSILON {
            let factor = (1.0 - (scroll * 0.0018)).clamp(0.85, 1.15);
            self.camera.dolly(factor);
        }
    }

    /// Reports the node under the pointer and any click to the controller.
    pub(in crate::app) fn handle_pointer(
        &mut self,
        response: &egui::Response,
        hovered: Option<String>,
    ) {
        if self.controller.state().hovered_node_id != hovered {
            let commands = self.controller.handle(InputEvent::PointerOver(hovered.clone()));
            self.execute(commands);
            if self.controller.state().hovered_node_id == hovered {
                response.ctx.request_repaint();
            }
        }

        if response.clicked_by(egui::PointerButton::Primary) {
            let event = match hovered {
                Some(node_id) => InputEvent::Click(node_id),
                None => InputEvent::ClickEmpty,
            };
            let commands = self.controller.handle(event);
            self.execute(commands);
        }
    }

    pub(in crate::app) fn pointer_position(ui: &Ui) -> Option<Pos2> {
        ui.input(|input| input.pointer.hover_pos())
    }
}
