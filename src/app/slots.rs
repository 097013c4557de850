// src/app/slots.rs
//! UI-thread state fed by background results: per-card poster slots and the
//! credits shown in the detail panel.

use std::collections::{HashMap, HashSet};

use eframe::egui::TextureHandle;
use tracing::{debug, trace};

use crate::app::cache::{CacheKey, PosterImage};
use crate::app::catalog::Credits;
use crate::app::types::{CardPoster, PosterDelivery, PosterOutcome, PosterSlot, RecordId};

#[derive(Default)]
pub struct PosterSlots {
    cards: HashMap<RecordId, CardPoster>,
}

impl PosterSlots {
    /// True when the card already tracks `key`, so no new request is needed.
    pub fn is_current(&self, id: RecordId, key: &Option<CacheKey>) -> bool {
        self.cards.get(&id).is_some_and(|c| &c.key == key)
    }

    pub fn begin(&mut self, id: RecordId, key: Option<CacheKey>, slot: PosterSlot) {
        self.cards.insert(id, CardPoster { key, slot });
    }

    pub fn remove(&mut self, id: RecordId) {
        self.cards.remove(&id);
    }

    pub fn retain(&mut self, keep: &HashSet<RecordId>) {
        self.cards.retain(|id, _| keep.contains(id));
    }

    pub fn slot(&self, id: RecordId) -> Option<&PosterSlot> {
        self.cards.get(&id).map(|c| &c.slot)
    }

    pub fn texture(&self, id: RecordId) -> Option<&TextureHandle> {
        match self.slot(id)? {
            PosterSlot::Ready(tex) => Some(tex),
            _ => None,
        }
    }

    /// A delivery counts only while its card exists and still wants that key.
    pub fn accepts(&self, delivery: &PosterDelivery) -> bool {
        match self.cards.get(&delivery.target) {
            None => {
                trace!("stale poster delivery for {:?}", delivery.target);
                false
            }
            Some(card) if card.key != delivery.key => {
                trace!("poster for {:?} changed since request", delivery.target);
                false
            }
            Some(_) => true,
        }
    }

    /// Store the outcome in its card. Stale deliveries change nothing and
    /// never reach `upload`.
    pub fn deliver<U>(&mut self, delivery: PosterDelivery, upload: U) -> bool
    where
        U: FnOnce(&PosterImage, &str) -> TextureHandle,
    {
        if !self.accepts(&delivery) {
            return false;
        }
        let slot = match delivery.outcome {
            PosterOutcome::Ready(image) => {
                let name = delivery
                    .key
                    .as_ref()
                    .map_or_else(|| "poster".to_string(), CacheKey::texture_name);
                PosterSlot::Ready(upload(&image, &name))
            }
            PosterOutcome::NoPoster => PosterSlot::NoPoster,
            PosterOutcome::Failed(reason) => {
                debug!("poster for {:?} failed: {reason}", delivery.target);
                PosterSlot::Failed
            }
        };
        if let Some(card) = self.cards.get_mut(&delivery.target) {
            card.slot = slot;
        }
        true
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum CreditsState {
    #[default]
    Idle,
    Loading(u64),
    Ready(u64, Credits),
    Unavailable(u64),
}

impl CreditsState {
    pub fn clear(&mut self) {
        *self = Self::Idle;
    }

    pub fn start(&mut self, tmdb_id: u64) {
        *self = Self::Loading(tmdb_id);
    }

    /// Finish a request made with `start`. Answers for any other id are late
    /// and ignored.
    pub fn finish(&mut self, tmdb_id: u64, credits: Option<Credits>) -> bool {
        if *self != Self::Loading(tmdb_id) {
            trace!("late credits for {tmdb_id} ignored");
            return false;
        }
        self.replace(tmdb_id, credits);
        true
    }

    /// Show credits that came with a fresh match, whatever was shown before.
    pub fn replace(&mut self, tmdb_id: u64, credits: Option<Credits>) {
        *self = match credits {
            Some(c) => Self::Ready(tmdb_id, c),
            None => Self::Unavailable(tmdb_id),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::cache::TargetSize;
    use crate::app::catalog::CastMember;

    use eframe::egui as eg;
    use std::sync::Arc;

    fn key(path: &str) -> Option<CacheKey> {
        Some(CacheKey::new(path.to_string(), TargetSize::new(140, 200)))
    }

    fn delivery(target: u64, key: Option<CacheKey>, outcome: PosterOutcome) -> PosterDelivery {
        PosterDelivery {
            target: RecordId(target),
            key,
            outcome,
        }
    }

    fn no_upload(_: &PosterImage, _: &str) -> TextureHandle {
        panic!("stale delivery must not be uploaded")
    }

    fn is_loading(slots: &PosterSlots, id: u64) -> bool {
        matches!(slots.slot(RecordId(id)), Some(PosterSlot::Loading))
    }

    #[test]
    fn delivery_for_removed_card_is_dropped() {
        let mut slots = PosterSlots::default();
        slots.begin(RecordId(1), key("/a.jpg"), PosterSlot::Loading);
        slots.remove(RecordId(1));

        let d = delivery(1, key("/a.jpg"), PosterOutcome::NoPoster);
        assert!(!slots.accepts(&d));
        assert!(!slots.deliver(d, no_upload));
        assert!(slots.slot(RecordId(1)).is_none());
    }

    #[test]
    fn delivery_for_old_key_is_dropped() {
        let mut slots = PosterSlots::default();
        slots.begin(RecordId(1), key("/new.jpg"), PosterSlot::Loading);

        let img = Arc::new(eg::ColorImage::new([2, 3], eg::Color32::RED));
        let d = delivery(1, key("/old.jpg"), PosterOutcome::Ready(img));
        assert!(!slots.deliver(d, no_upload));
        assert!(is_loading(&slots, 1));

        let d = delivery(1, None, PosterOutcome::Failed("boom".into()));
        assert!(!slots.deliver(d, no_upload));
        assert!(is_loading(&slots, 1));
    }

    #[test]
    fn delivery_for_current_key_fills_slot() {
        let mut slots = PosterSlots::default();
        slots.begin(RecordId(1), key("/a.jpg"), PosterSlot::Loading);
        slots.begin(RecordId(2), None, PosterSlot::Loading);
        slots.begin(RecordId(3), key("/c.jpg"), PosterSlot::Loading);

        assert!(slots.deliver(delivery(2, None, PosterOutcome::NoPoster), no_upload));
        assert!(matches!(slots.slot(RecordId(2)), Some(PosterSlot::NoPoster)));

        let failed = delivery(3, key("/c.jpg"), PosterOutcome::Failed("404".into()));
        assert!(slots.deliver(failed, no_upload));
        assert!(matches!(slots.slot(RecordId(3)), Some(PosterSlot::Failed)));

        let ctx = eg::Context::default();
        let img = Arc::new(eg::ColorImage::new([2, 3], eg::Color32::RED));
        let ready = delivery(1, key("/a.jpg"), PosterOutcome::Ready(img));
        let mut uploaded = None;
        assert!(slots.deliver(ready, |image, name| {
            uploaded = Some(name.to_string());
            ctx.load_texture(name, (**image).clone(), eg::TextureOptions::LINEAR)
        }));
        assert_eq!(uploaded, key("/a.jpg").map(|k| k.texture_name()));
        assert_eq!(slots.texture(RecordId(1)).map(|t| t.size()), Some([2, 3]));
    }

    #[test]
    fn retain_keeps_only_listed_cards() {
        let mut slots = PosterSlots::default();
        slots.begin(RecordId(1), None, PosterSlot::Loading);
        slots.begin(RecordId(2), None, PosterSlot::Loading);
        slots.retain(&HashSet::from([RecordId(2)]));
        assert!(slots.slot(RecordId(1)).is_none());
        assert!(slots.is_current(RecordId(2), &None));
        assert!(!slots.is_current(RecordId(2), &key("/b.jpg")));
    }

    fn credits(director: &str) -> Credits {
        Credits {
            director: Some(director.to_string()),
            cast: vec![CastMember {
                name: "Someone".into(),
                character: None,
            }],
        }
    }

    #[test]
    fn fresh_match_replaces_shown_credits() {
        let mut state = CreditsState::default();
        state.start(348);
        assert!(state.finish(348, Some(credits("Ridley Scott"))));

        // Auto fetch re-matched the record to another film.
        state.replace(679, Some(credits("James Cameron")));
        assert_eq!(state, CreditsState::Ready(679, credits("James Cameron")));

        // A late answer for the old id does not win.
        assert!(!state.finish(348, Some(credits("Ridley Scott"))));
        assert_eq!(state, CreditsState::Ready(679, credits("James Cameron")));
    }

    #[test]
    fn failed_credits_do_not_stay_loading() {
        let mut state = CreditsState::default();
        state.start(5);
        assert!(state.finish(5, None));
        assert_eq!(state, CreditsState::Unavailable(5));

        state.clear();
        assert!(!state.finish(5, Some(credits("X"))));
        assert_eq!(state, CreditsState::Idle);
    }
}
