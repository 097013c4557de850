// src/app/ui/grid.rs
use eframe::egui as eg;

use crate::app::library::LibraryEvent;
use crate::app::types::{PosterSlot, RecordId};
use crate::app::POSTER_SIZE;

pub const H_SPACING: f32 = 8.0;
pub const V_SPACING: f32 = 10.0;
const TEXT_H: f32 = 40.0;

fn draw_corner_badge(p: &eg::Painter, rect: eg::Rect, label: &str) {
    let pad = 6.0;
    let r = eg::Rect::from_min_size(
        eg::pos2(rect.right() - pad - 22.0, rect.top() + pad),
        eg::vec2(22.0, 20.0),
    );
    let visuals = p.ctx().style().visuals.clone();
    let bg = visuals.extreme_bg_color.gamma_multiply(0.92);
    let fg = visuals.strong_text_color();

    p.rect_filled(r, eg::Rounding::same(6.0), bg);
    p.text(
        r.center(),
        eg::Align2::CENTER_CENTER,
        label,
        eg::FontId::proportional(12.0),
        fg,
    );
}

fn placeholder_text(slot: Option<&PosterSlot>) -> &'static str {
    match slot {
        Some(PosterSlot::NoPoster) => "No poster",
        Some(PosterSlot::Failed) => "Poster unavailable",
        _ => "Loading...",
    }
}

impl crate::app::MovieCatApp {
    pub(crate) fn ui_render_grid(&mut self, ui: &mut eg::Ui) {
        let card_w = POSTER_SIZE.width as f32;
        let poster_h = POSTER_SIZE.height as f32;
        let card_h = poster_h + TEXT_H;

        if self.library.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.heading("No movies yet");
                ui.label("Add one with the form on the right, or import a folder.");
            });
            return;
        }

        let ids: Vec<RecordId> = self.library.visible_page().to_vec();
        let mut clicked: Option<RecordId> = None;

        eg::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                let avail = ui.available_width();
                let cols = ((avail + H_SPACING) / (card_w + H_SPACING))
                    .floor()
                    .max(1.0) as usize;

                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing = eg::vec2(H_SPACING, V_SPACING);

                    for (col, &id) in ids.iter().enumerate() {
                        if col > 0 && col % cols == 0 {
                            ui.end_row();
                        }

                        let (rect, resp) = ui.allocate_exact_size(
                            eg::vec2(card_w, card_h),
                            eg::Sense::click(),
                        );
                        if resp.clicked() {
                            clicked = Some(id);
                        }
                        if !ui.is_rect_visible(rect) {
                            continue;
                        }

                        let poster_rect = eg::Rect::from_min_size(rect.min, eg::vec2(card_w, poster_h));
                        let text_rect = eg::Rect::from_min_max(
                            eg::pos2(rect.min.x, poster_rect.max.y + 2.0),
                            rect.max,
                        );
                        let painter = ui.painter();

                        if let Some(tex) = self.poster_texture(id) {
                            // Fit the (already shrunk) texture inside the poster box.
                            let size = tex.size_vec2();
                            let scale = (card_w / size.x).min(poster_h / size.y).min(1.0);
                            let img_rect =
                                eg::Rect::from_center_size(poster_rect.center(), size * scale);
                            painter.rect_filled(poster_rect, 6.0, eg::Color32::from_gray(24));
                            painter.image(
                                tex.id(),
                                img_rect,
                                eg::Rect::from_min_max(eg::pos2(0.0, 0.0), eg::pos2(1.0, 1.0)),
                                eg::Color32::WHITE,
                            );
                        } else {
                            painter.rect_filled(poster_rect, 6.0, eg::Color32::from_gray(40));
                            painter.text(
                                poster_rect.center(),
                                eg::Align2::CENTER_CENTER,
                                placeholder_text(self.posters.slot(id)),
                                eg::FontId::proportional(13.0),
                                eg::Color32::from_gray(200),
                            );
                        }

                        let Some(movie) = self.library.get(id) else {
                            continue;
                        };
                        if movie.favorite {
                            draw_corner_badge(painter, poster_rect, "★");
                        }

                        let label = format!("{}\n{} ★{:.1}", movie.name, movie.year, movie.rating);
                        let text_color = ui.visuals().text_color();
                        let galley = painter.layout(
                            label,
                            eg::FontId::proportional(13.0),
                            text_color,
                            card_w,
                        );
                        painter.with_clip_rect(text_rect).galley(
                            text_rect.left_top(),
                            galley,
                            text_color,
                        );

                        if self.library.selected() == Some(id) {
                            painter.rect_stroke(
                                rect.expand(2.0),
                                6.0,
                                eg::Stroke::new(2.0, eg::Color32::YELLOW),
                            );
                        } else if resp.hovered() {
                            painter.rect_stroke(
                                rect.expand(2.0),
                                6.0,
                                eg::Stroke::new(1.0, ui.visuals().weak_text_color()),
                            );
                        }
                    }
                    ui.end_row();
                });

                if self.library.has_more() {
                    ui.add_space(8.0);
                    ui.vertical_centered(|ui| {
                        if ui.button("Load more").clicked() {
                            self.dispatch(LibraryEvent::PageRequested);
                        }
                    });
                }
            });

        if let Some(id) = clicked {
            self.select(Some(id));
        }
    }
}
