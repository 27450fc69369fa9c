//! Live and recently released notes plus the interval links between them.
//!
//! Notes are kept in creation order and addressed by [`NoteId`]. Links store
//! ids rather than references, so pruning a note leaves the links that point
//! at it unresolvable instead of dangling.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{animation::Decorations, config::DecorationConfig, mapping::Interval};

/// Stable handle of a note. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoteId(u64);

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which note a note-off releases when several identical pitches are held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleasePolicy {
    /// The earliest-started active note with that pitch.
    #[default]
    Oldest,
    /// The most recently started active note with that pitch.
    Newest,
}

#[derive(Debug, Clone)]
pub struct Note {
    pub id: NoteId,
    pub pitch: u8,
    pub created_step: u64,
    pub active: bool,
    /// Notes that were sounding when this one started, in registry order.
    pub intervals: Vec<NoteId>,
    pub decorations: Decorations,
}

impl Note {
    /// Steps elapsed since the note started.
    pub fn age(&self, step: u64) -> u64 {
        step.saturating_sub(self.created_step)
    }
}

#[derive(Debug, Default)]
pub struct NoteRegistry {
    notes: Vec<Note>,
    next_id: u64,
    policy: ReleasePolicy,
    decoration: DecorationConfig,
}

impl NoteRegistry {
    pub fn new(policy: ReleasePolicy, decoration: DecorationConfig) -> Self {
        Self {
            notes: Vec::new(),
            next_id: 0,
            policy,
            decoration,
        }
    }

    pub fn policy(&self) -> ReleasePolicy {
        self.policy
    }

    /// Registers a sounding note, linking it to every currently active note.
    pub fn on_note_started(&mut self, step: u64, pitch: u8) -> NoteId {
        let id = NoteId(self.next_id);
        self.next_id += 1;

        let intervals: Vec<NoteId> = self
            .notes
            .iter()
            .filter(|note| note.active)
            .map(|note| {
                let interval = Interval::between(note.pitch, pitch);
                debug!(from = %id, to = %note.id, %interval, "linked concurrent note");
                note.id
            })
            .collect();

        debug!(%id, pitch, step, links = intervals.len(), "note started");

        self.notes.push(Note {
            id,
            pitch,
            created_step: step,
            active: true,
            intervals,
            decorations: Decorations::new(&self.decoration),
        });
        id
    }

    /// Releases one active note with `pitch`, chosen by the release policy.
    ///
    /// Returns the released note, or `None` for a stray note-off.
    pub fn on_note_stopped(&mut self, pitch: u8) -> Option<NoteId> {
        let note = match self.policy {
            ReleasePolicy::Oldest => self
                .notes
                .iter_mut()
                .find(|note| note.active && note.pitch == pitch),
            ReleasePolicy::Newest => self
                .notes
                .iter_mut()
                .rev()
                .find(|note| note.active && note.pitch == pitch),
        };

        match note {
            Some(note) => {
                note.active = false;
                let id = note.id;
                debug!(%id, pitch, "note stopped");
                Some(id)
            }
            None => {
                debug!(pitch, "ignoring note-off without an active note");
                None
            }
        }
    }

    /// Drops every note whose age at `step` has reached `window`.
    ///
    /// Returns the number of notes removed. Links held by the survivors are
    /// left untouched.
    pub fn prune_older_than(&mut self, step: u64, window: u64) -> usize {
        let before = self.notes.len();
        self.notes.retain(|note| note.age(step) < window);
        let removed = before - self.notes.len();
        if removed > 0 {
            trace!(removed, remaining = self.notes.len(), step, "pruned notes");
        }
        removed
    }

    /// Looks up a note. Pruned ids resolve to `None`.
    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes
            .binary_search_by_key(&id, |note| note.id)
            .ok()
            .map(|index| &self.notes[index])
    }

    /// Linked notes of `note` that are still tracked.
    pub fn resolve_links<'a>(&'a self, note: &'a Note) -> impl Iterator<Item = &'a Note> + 'a {
        note.intervals.iter().filter_map(move |id| self.get(*id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter()
    }

    pub fn ids(&self) -> Vec<NoteId> {
        self.notes.iter().map(|note| note.id).collect()
    }

    pub fn active_count(&self) -> usize {
        self.notes.iter().filter(|note| note.active).count()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Mutable access for advancing a note's decorations.
    pub(crate) fn get_mut(&mut self, id: NoteId) -> Option<&mut Note> {
        self.notes
            .binary_search_by_key(&id, |note| note.id)
            .ok()
            .map(move |index| &mut self.notes[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(policy: ReleasePolicy) -> NoteRegistry {
        NoteRegistry::new(policy, DecorationConfig::default())
    }

    #[test]
    fn new_note_links_to_every_active_note() {
        let mut registry = registry(ReleasePolicy::Oldest);
        let a = registry.on_note_started(1, 60);
        let b = registry.on_note_started(1, 64);
        let released = registry.on_note_started(1, 50);
        registry.on_note_stopped(50);

        let c = registry.on_note_started(2, 67);
        let note = registry.get(c).unwrap();

        assert_eq!(note.intervals, vec![a, b]);
        assert!(!note.intervals.contains(&c));
        assert!(!note.intervals.contains(&released));
        assert!(registry.get(a).unwrap().intervals.is_empty());
        assert_eq!(registry.get(b).unwrap().intervals, vec![a]);
    }

    #[test]
    fn links_never_point_forward() {
        let mut registry = registry(ReleasePolicy::Oldest);
        let pitches = [60, 62, 64, 65, 67, 69, 71, 72];
        for (step, pitch) in pitches.iter().enumerate() {
            registry.on_note_started(step as u64, *pitch);
            if step % 3 == 2 {
                registry.on_note_stopped(pitches[step - 1]);
            }
        }

        for note in registry.iter() {
            assert!(note.intervals.iter().all(|linked| *linked < note.id));
        }
    }

    #[test]
    fn unison_notes_are_permitted_and_linked() {
        let mut registry = registry(ReleasePolicy::Oldest);
        let first = registry.on_note_started(1, 60);
        let second = registry.on_note_started(2, 60);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(second).unwrap().intervals, vec![first]);
    }

    #[test]
    fn release_oldest_picks_earliest_active_match() {
        let mut registry = registry(ReleasePolicy::Oldest);
        let first = registry.on_note_started(1, 60);
        let second = registry.on_note_started(2, 60);
        let other = registry.on_note_started(3, 64);

        assert_eq!(registry.on_note_stopped(60), Some(first));
        assert!(!registry.get(first).unwrap().active);
        assert!(registry.get(second).unwrap().active);
        assert!(registry.get(other).unwrap().active);

        assert_eq!(registry.on_note_stopped(60), Some(second));
        assert_eq!(registry.on_note_stopped(60), None);
    }

    #[test]
    fn release_newest_picks_latest_active_match() {
        let mut registry = registry(ReleasePolicy::Newest);
        let first = registry.on_note_started(1, 60);
        let second = registry.on_note_started(2, 60);

        assert_eq!(registry.on_note_stopped(60), Some(second));
        assert!(registry.get(first).unwrap().active);
    }

    #[test]
    fn stray_note_off_is_a_no_op() {
        let mut registry = registry(ReleasePolicy::Oldest);
        let held = registry.on_note_started(1, 60);

        assert_eq!(registry.on_note_stopped(72), None);
        assert_eq!(registry.len(), 1);
        assert!(registry.get(held).unwrap().active);
    }

    #[test]
    fn stop_then_start_scenario() {
        let mut registry = registry(ReleasePolicy::Oldest);
        let c = registry.on_note_started(1, 60);
        let e = registry.on_note_started(2, 64);
        registry.on_note_stopped(60);

        let c = registry.get(c).unwrap();
        let e_note = registry.get(e).unwrap();
        assert!(!c.active);
        assert!(e_note.active);
        assert_eq!(e_note.intervals, vec![c.id]);
        assert!(c.intervals.is_empty());
    }

    #[test]
    fn prune_keeps_notes_inside_window() {
        let mut registry = registry(ReleasePolicy::Oldest);
        for step in 0..10 {
            registry.on_note_started(step, 60 + step as u8);
        }

        let removed = registry.prune_older_than(12, 5);

        assert_eq!(removed, 8);
        assert!(registry.iter().all(|note| note.age(12) <= 5));
        let steps: Vec<u64> = registry.iter().map(|note| note.created_step).collect();
        assert_eq!(steps, vec![8, 9]);
    }

    #[test]
    fn pruned_links_resolve_to_nothing() {
        let mut registry = registry(ReleasePolicy::Oldest);
        let old = registry.on_note_started(0, 48);
        let mid = registry.on_note_started(5, 55);
        let young = registry.on_note_started(9, 60);

        registry.prune_older_than(10, 8);

        assert!(registry.get(old).is_none());
        let young = registry.get(young).unwrap();
        assert_eq!(young.intervals.len(), 2);
        let resolved: Vec<NoteId> = registry.resolve_links(young).map(|n| n.id).collect();
        assert_eq!(resolved, vec![mid]);
    }

    #[test]
    fn ids_are_not_reused_after_pruning() {
        let mut registry = registry(ReleasePolicy::Oldest);
        let first = registry.on_note_started(0, 60);
        registry.prune_older_than(100, 10);
        let second = registry.on_note_started(100, 60);

        assert_ne!(first, second);
        assert!(registry.get(first).is_none());
    }
}
