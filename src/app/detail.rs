// src/app/detail.rs
use eframe::egui as eg;
use tracing::info;

use crate::app::local;
use crate::app::slots::CreditsState;

const PANEL_MIN_W: f32 = 280.0;
const PANEL_MAX_W: f32 = 420.0;

impl crate::app::MovieCatApp {
    pub(crate) fn ui_render_detail_panel(&mut self, ctx: &eg::Context) {
        eg::SidePanel::right("detail_panel")
            .resizable(true)
            .default_width(320.0)
            .min_width(PANEL_MIN_W)
            .max_width(PANEL_MAX_W)
            .show(ctx, |ui| {
                eg::ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
                    ui.add_space(6.0);
                    let heading = if self.library.selected().is_some() {
                        "Edit movie"
                    } else {
                        "New movie"
                    };
                    ui.heading(heading);
                    ui.separator();

                    self.ui_detail_poster(ui);
                    ui.add_space(6.0);
                    self.ui_detail_form(ui);
                    ui.add_space(8.0);
                    self.ui_detail_actions(ui, ctx);

                    if self.library.selected().is_some() {
                        ui.add_space(8.0);
                        ui.separator();
                        self.ui_detail_credits(ui);
                    }

                    ui.add_space(8.0);
                    ui.separator();
                    self.ui_detail_import(ui, ctx);
                });
            });
    }

    fn ui_detail_poster(&self, ui: &mut eg::Ui) {
        let Some(id) = self.library.selected() else {
            return;
        };
        let avail_w = ui.available_width().clamp(120.0, PANEL_MAX_W);
        match self.poster_texture(id) {
            Some(tex) => {
                let size = tex.size_vec2();
                let scale = (avail_w / size.x).min(1.5);
                ui.vertical_centered(|ui| {
                    ui.image((tex.id(), size * scale));
                });
            }
            None => {
                let size = eg::vec2(avail_w.min(200.0), avail_w.min(200.0) * 1.5);
                ui.vertical_centered(|ui| {
                    let (rect, _) = ui.allocate_exact_size(size, eg::Sense::hover());
                    ui.painter().rect_filled(rect, 8.0, eg::Color32::from_gray(40));
                    ui.painter().text(
                        rect.center(),
                        eg::Align2::CENTER_CENTER,
                        "No poster",
                        eg::FontId::proportional(14.0),
                        eg::Color32::from_gray(200),
                    );
                });
            }
        }
    }

    fn ui_detail_form(&mut self, ui: &mut eg::Ui) {
        eg::Grid::new("movie_form")
            .num_columns(2)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                ui.label("Title");
                ui.text_edit_singleline(&mut self.draft.name);
                ui.end_row();

                ui.label("Year");
                ui.text_edit_singleline(&mut self.draft.year);
                ui.end_row();

                ui.label("Genre");
                ui.text_edit_singleline(&mut self.draft.genre);
                ui.end_row();

                ui.label("Rating");
                ui.add(eg::TextEdit::singleline(&mut self.draft.rating).hint_text("0 to 10"));
                ui.end_row();
            });

        ui.horizontal_wrapped(|ui| {
            ui.checkbox(&mut self.draft.watched, "Watched");
            ui.checkbox(&mut self.draft.favorite, "Favorite");
            ui.checkbox(&mut self.draft.watchlist, "Watchlist");
        });
    }

    fn ui_detail_actions(&mut self, ui: &mut eg::Ui, ctx: &eg::Context) {
        let selected = self.library.selected_movie().cloned();

        ui.horizontal_wrapped(|ui| {
            let submit_label = if selected.is_some() { "Update" } else { "Add" };
            if ui.button(submit_label).clicked() {
                self.submit_form();
            }

            let fetch = ui.add_enabled(!self.lookup_in_flight, eg::Button::new("Auto Fetch"));
            if fetch.on_hover_text("Fill the form from TMDB").clicked() {
                self.start_auto_fetch(ctx);
            }
            if self.lookup_in_flight {
                ui.add(eg::Spinner::new().size(14.0));
            }
        });

        let Some(movie) = selected else {
            return;
        };
        ui.horizontal_wrapped(|ui| {
            if ui
                .add_enabled(movie.has_file(), eg::Button::new("Play"))
                .on_disabled_hover_text("No local file attached")
                .clicked()
            {
                match local::play(&movie.file_path) {
                    Ok(()) => self.set_status(format!("Playing '{}'", movie.name)),
                    Err(e) => self.show_message("Play", e.to_string()),
                }
            }
            if ui.button("Trailer").clicked() {
                let url = local::trailer_search_url(&movie);
                info!("opening {url}");
                ctx.open_url(eg::OpenUrl::new_tab(url));
            }
            if ui.button("Delete").clicked() {
                self.confirm_delete = true;
            }
        });

        if movie.has_file() {
            ui.label(eg::RichText::new(&movie.file_path).small().weak());
        }
    }

    fn ui_detail_credits(&self, ui: &mut eg::Ui) {
        ui.label(eg::RichText::new("Credits").strong());
        let text = match &self.credits {
            CreditsState::Ready(_, credits) => {
                ui.label(format!("Director: {}", credits.director_label()));
                ui.label(format!("Cast: {}", credits.cast_label()));
                return;
            }
            CreditsState::Loading(_) => "Loading credits...",
            CreditsState::Unavailable(_) => "Credits unavailable.",
            CreditsState::Idle => "Use Auto Fetch to look up credits.",
        };
        ui.label(eg::RichText::new(text).weak());
    }

    fn ui_detail_import(&mut self, ui: &mut eg::Ui, ctx: &eg::Context) {
        ui.label(eg::RichText::new("Import folder").strong());

        let roots = self.cfg.library_roots.clone();
        if !roots.is_empty() {
            ui.horizontal_wrapped(|ui| {
                for root in roots {
                    if ui.small_button(root.as_str()).clicked() {
                        self.import_path = root;
                    }
                }
            });
        }

        ui.horizontal(|ui| {
            ui.add(
                eg::TextEdit::singleline(&mut self.import_path)
                    .hint_text("/path/to/movies")
                    .desired_width(200.0),
            );
            let scan = ui.add_enabled(!self.scan_in_flight, eg::Button::new("Import"));
            if scan.clicked() {
                self.start_import(ctx);
            }
        });
    }
}
