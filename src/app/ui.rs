// src/app/ui.rs
pub mod grid;
pub mod topbar;

use eframe::egui as eg;

impl crate::app::MovieCatApp {
    pub(crate) fn ui_render_status(&self, ui: &mut eg::Ui) {
        ui.horizontal(|ui| {
            if self.lookup_in_flight || self.scan_in_flight {
                ui.add(eg::Spinner::new().size(12.0));
            }
            ui.label(&self.status);
            ui.with_layout(eg::Layout::right_to_left(eg::Align::Center), |ui| {
                ui.label(eg::RichText::new(self.library.showing_label()).weak());
            });
        });
    }

    pub(crate) fn ui_render_delete_confirm(&mut self, ctx: &eg::Context) {
        if !self.confirm_delete {
            return;
        }
        let Some(name) = self.library.selected_movie().map(|m| m.name.clone()) else {
            self.confirm_delete = false;
            return;
        };

        let mut confirmed = false;
        let mut cancelled = false;
        eg::Window::new("Delete")
            .collapsible(false)
            .resizable(false)
            .anchor(eg::Align2::CENTER_CENTER, eg::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(format!("Delete '{name}'?"));
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    confirmed = ui.button("Delete").clicked();
                    cancelled = ui.button("Cancel").clicked();
                });
            });

        // Apply after .show so the window closure does not hold `self`.
        if confirmed {
            self.confirm_delete = false;
            self.delete_confirmed();
        } else if cancelled {
            self.confirm_delete = false;
        }
    }

    pub(crate) fn ui_render_message(&mut self, ctx: &eg::Context) {
        let Some((title, body)) = &self.message else {
            return;
        };
        let mut open = true;
        let mut ok = false;
        eg::Window::new(*title)
            .collapsible(false)
            .resizable(false)
            .anchor(eg::Align2::CENTER_CENTER, eg::vec2(0.0, 0.0))
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label(body.as_str());
                ui.add_space(6.0);
                ok = ui.button("OK").clicked();
            });
        if ok || !open {
            self.message = None;
        }
    }
}
