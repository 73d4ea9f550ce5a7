//! Feedback hooks: audio, music, haptics and toast notifications.
//!
//! The simulation never talks to Web Audio, Telegram haptics or the DOM
//! directly. It calls these optional, fire-and-forget callbacks at fixed
//! points and keeps running regardless of what the host does with them —
//! an unset hook is a no-op, and a host-side failure is the host's problem.

use bevy::prelude::*;

use crate::common::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundKind {
    Shoot,
    Hit,
    Explode,
    Powerup,
    Boss,
    LevelUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicMode {
    Menu,
    Game,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticKind {
    Light,
    Medium,
    Heavy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyTone {
    Info,
    Gold,
    Boss,
    LevelUp,
}

type SoundFn = Box<dyn Fn(SoundKind) + Send + Sync>;
type MusicFn = Box<dyn Fn(MusicMode) + Send + Sync>;
type HapticFn = Box<dyn Fn(HapticKind) + Send + Sync>;
type NotifyFn = Box<dyn Fn(&str, NotifyTone) + Send + Sync>;

#[derive(Resource, Default)]
pub struct FeedbackHooks {
    pub sound: Option<SoundFn>,
    pub music: Option<MusicFn>,
    pub haptic: Option<HapticFn>,
    pub notify: Option<NotifyFn>,
}

impl FeedbackHooks {
    pub fn sound(&self, kind: SoundKind) {
        if let Some(f) = &self.sound {
            f(kind);
        }
    }

    pub fn music(&self, mode: MusicMode) {
        if let Some(f) = &self.music {
            f(mode);
        }
    }

    pub fn haptic(&self, kind: HapticKind) {
        if let Some(f) = &self.haptic {
            f(kind);
        }
    }

    pub fn notify(&self, text: &str, tone: NotifyTone) {
        if let Some(f) = &self.notify {
            f(text, tone);
        }
    }
}

fn music_game(hooks: Res<FeedbackHooks>) {
    hooks.music(MusicMode::Game);
}

fn music_menu(hooks: Res<FeedbackHooks>) {
    hooks.music(MusicMode::Menu);
}

pub fn plugin(app: &mut App) {
    app.init_resource::<FeedbackHooks>();
    app.add_systems(OnEnter(GameState::InGame), music_game);
    app.add_systems(OnEnter(GameState::Menu), music_menu);
    app.add_systems(OnEnter(GameState::GameOver), music_menu);
}
