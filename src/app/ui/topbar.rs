// src/app/ui/topbar.rs
use std::time::Instant;

use eframe::egui as eg;

use crate::app::library::LibraryEvent;
use crate::app::types::{FilterMode, SortKey};

impl crate::app::MovieCatApp {
    // ---------- TOP BAR ----------
    pub(crate) fn ui_render_topbar(&mut self, ui: &mut eg::Ui, ctx: &eg::Context) {
        ui.horizontal(|ui| {
            // Search (applied after a short pause in typing)
            let resp = ui.add(
                eg::TextEdit::singleline(&mut self.search_text)
                    .hint_text("Search title…")
                    .desired_width(200.0),
            );
            if resp.changed() {
                self.search_edited_at = Some(Instant::now());
            }

            ui.separator();

            // Sort
            let mut sort = self.library.sort();
            eg::ComboBox::from_id_source("sort_by_combo")
                .selected_text(format!("Sort: {}", sort.label()))
                .show_ui(ui, |ui| {
                    for key in SortKey::ALL {
                        ui.selectable_value(&mut sort, key, key.label());
                    }
                });
            if sort != self.library.sort() {
                self.dispatch(LibraryEvent::SortChanged(sort));
                self.settings_changed();
            }

            // Filter
            let mut filter = self.library.filter();
            eg::ComboBox::from_id_source("filter_combo")
                .selected_text(format!("Show: {}", filter.label()))
                .show_ui(ui, |ui| {
                    for mode in FilterMode::ALL {
                        ui.selectable_value(&mut filter, mode, mode.label());
                    }
                });
            if filter != self.library.filter() {
                self.dispatch(LibraryEvent::FilterChanged(filter));
                self.settings_changed();
            }

            ui.separator();

            if ui.button("New").on_hover_text("Clear the form").clicked() {
                self.select(None);
            }

            ui.with_layout(eg::Layout::right_to_left(eg::Align::Center), |ui| {
                let label = if self.settings.dark_mode {
                    "Light mode"
                } else {
                    "Dark mode"
                };
                if ui.button(label).clicked() {
                    self.toggle_theme(ctx);
                }
            });
        });
    }
}
