//! Landing-page audio player state.
//!
//! Each track is either stopped or playing, and at most one track plays at a
//! time. The board does not touch any media element itself: operations return
//! [`MediaCommand`]s for the view layer to apply, and media events (time
//! update, duration known, ended) are fed back in.

pub mod catalog;
pub mod clock;

pub use catalog::{Track, DEMO_TRACKS, PREMIUM_TRACKS};
pub use clock::{format_time, progress_percent};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackState {
    #[default]
    Stopped,
    Playing,
}

/// Instruction for the media layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaCommand {
    Play(String),
    Pause(String),
}

/// What the page shows for one track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackView {
    pub id: String,
    pub playing: bool,
    /// Percent, `0..=100`.
    pub progress: f64,
    /// `MM:SS`
    pub current: String,
    /// `MM:SS`; `00:00` until the duration is known.
    pub duration: String,
}

#[derive(Debug, Clone, Default)]
struct Slot {
    state: TrackState,
    current_time: f64,
    /// Percent from the last time update.
    progress: f64,
    /// Label source; only set by [`PlayerBoard::on_duration_known`].
    duration: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct PlayerBoard {
    slots: Vec<(String, Slot)>,
}

impl PlayerBoard {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut slots: Vec<(String, Slot)> = Vec::new();
        for id in ids {
            let id = id.into();
            if !slots.iter().any(|(existing, _)| *existing == id) {
                slots.push((id, Slot::default()));
            }
        }
        Self { slots }
    }

    /// Board with every track from the landing page catalog.
    pub fn landing_page() -> Self {
        Self::new(catalog::all_tracks().map(|t| t.id))
    }

    pub fn track_ids(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|(id, _)| id.as_str())
    }

    /// The track currently playing, if any.
    pub fn playing(&self) -> Option<&str> {
        self.slots
            .iter()
            .find(|(_, s)| s.state == TrackState::Playing)
            .map(|(id, _)| id.as_str())
    }

    pub fn state(&self, id: &str) -> Option<TrackState> {
        self.slot(id).map(|s| s.state)
    }

    /// User pressed play/pause on `id`.
    ///
    /// Any other playing track is paused first.
    pub fn toggle(&mut self, id: &str) -> crate::Result<Vec<MediaCommand>> {
        if self.slot(id).is_none() {
            return Err(unknown(id));
        }

        let mut commands = Vec::new();
        for (other, slot) in self.slots.iter_mut() {
            if other.as_str() != id && slot.state == TrackState::Playing {
                slot.state = TrackState::Stopped;
                commands.push(MediaCommand::Pause(other.clone()));
            }
        }

        let slot = self.slot_mut(id)?;
        slot.state = match slot.state {
            TrackState::Playing => {
                commands.push(MediaCommand::Pause(id.to_string()));
                TrackState::Stopped
            }
            TrackState::Stopped => {
                commands.push(MediaCommand::Play(id.to_string()));
                TrackState::Playing
            }
        };
        Ok(commands)
    }

    /// Media element reported a new playback position.
    ///
    /// `duration` only feeds the progress value; the duration label waits
    /// for [`on_duration_known`](Self::on_duration_known).
    pub fn on_time_update(&mut self, id: &str, current: f64, duration: f64) -> crate::Result<()> {
        let slot = self.slot_mut(id)?;
        slot.current_time = if current.is_finite() { current.max(0.0) } else { 0.0 };
        slot.progress = progress_percent(slot.current_time, duration);
        Ok(())
    }

    /// Media element learned the track duration. Non-finite values (streams) are ignored.
    pub fn on_duration_known(&mut self, id: &str, duration: f64) -> crate::Result<()> {
        let slot = self.slot_mut(id)?;
        if duration.is_finite() && duration > 0.0 {
            slot.duration = Some(duration);
        }
        Ok(())
    }

    /// Playback reached the end: back to stopped at position zero.
    pub fn on_ended(&mut self, id: &str) -> crate::Result<()> {
        let slot = self.slot_mut(id)?;
        slot.state = TrackState::Stopped;
        slot.current_time = 0.0;
        slot.progress = 0.0;
        Ok(())
    }

    /// The media element refused to start (e.g. autoplay policy).
    pub fn on_play_rejected(&mut self, id: &str, reason: &str) -> crate::Result<()> {
        let slot = self.slot_mut(id)?;
        if slot.state == TrackState::Playing {
            tracing::warn!(track = %id, %reason, "playback rejected; reverting to stopped");
            slot.state = TrackState::Stopped;
        }
        Ok(())
    }

    pub fn view(&self, id: &str) -> Option<TrackView> {
        self.slot(id).map(|slot| TrackView {
            id: id.to_string(),
            playing: slot.state == TrackState::Playing,
            progress: slot.progress,
            current: format_time(slot.current_time),
            duration: format_time(slot.duration.unwrap_or(0.0)),
        })
    }

    pub fn views(&self) -> Vec<TrackView> {
        self.slots
            .iter()
            .filter_map(|(id, _)| self.view(id))
            .collect()
    }

    fn slot(&self, id: &str) -> Option<&Slot> {
        self.slots.iter().find(|(k, _)| k.as_str() == id).map(|(_, s)| s)
    }

    fn slot_mut(&mut self, id: &str) -> crate::Result<&mut Slot> {
        self.slots
            .iter_mut()
            .find(|(k, _)| k.as_str() == id)
            .map(|(_, s)| s)
            .ok_or_else(|| unknown(id))
    }
}

fn unknown(id: &str) -> Error {
    Error::Player(format!("unknown track '{}'", id))
}
