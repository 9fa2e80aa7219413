//! Menu shell
//!
//! [`App`] owns everything a session needs: settings and their store, audio,
//! the current match, the debug flag and the polled pads. Platform frontends
//! feed it [`InputEvent`]s and call [`App::update`] once per frame.

pub mod fsm;
pub mod view;

pub use fsm::{MenuAction, MenuFsm, Screen, Transition, next_state};
pub use view::{Hud, MenuItem, Popup, View};

use crate::audio::{AudioManager, SoundEffect};
use crate::input::{Command, InputEvent, InputRouter};
use crate::persistence::SettingsStore;
use crate::platform::{PadState, PadTracker};
use crate::settings::{self, Action, Controls, Difficulty, KeyCode, ParticleQuality, Settings};
use crate::sim::{GameEvent, GameState, Mode, tick};

/// Main menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainItem {
    OnePlayer,
    TwoPlayers,
    Settings,
    Quit,
}

impl MainItem {
    pub const ALL: [MainItem; 4] = [
        MainItem::OnePlayer,
        MainItem::TwoPlayers,
        MainItem::Settings,
        MainItem::Quit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MainItem::OnePlayer => "1 Player",
            MainItem::TwoPlayers => "2 Players",
            MainItem::Settings => "Settings",
            MainItem::Quit => "Quit",
        }
    }
}

/// Settings menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsItem {
    AiDifficulty,
    Particles,
    Controls,
    Sound,
    Credits,
    ResetSettings,
    Back,
}

impl SettingsItem {
    pub const ALL: [SettingsItem; 7] = [
        SettingsItem::AiDifficulty,
        SettingsItem::Particles,
        SettingsItem::Controls,
        SettingsItem::Sound,
        SettingsItem::Credits,
        SettingsItem::ResetSettings,
        SettingsItem::Back,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SettingsItem::AiDifficulty => "AI Difficulty",
            SettingsItem::Particles => "Particles",
            SettingsItem::Controls => "Controls",
            SettingsItem::Sound => "Sound",
            SettingsItem::Credits => "Credits",
            SettingsItem::ResetSettings => "Reset Settings",
            SettingsItem::Back => "Back",
        }
    }

    /// Current value text, for items that hold one
    pub fn value(&self, settings: &Settings) -> Option<&'static str> {
        match self {
            SettingsItem::AiDifficulty => Some(settings.ai_difficulty.as_str()),
            SettingsItem::Particles => Some(settings.particle_quality.as_str()),
            SettingsItem::Sound => Some(if settings.sound { "On" } else { "Off" }),
            _ => None,
        }
    }
}

/// Controls menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlsItem {
    Bind(Action),
    ResetDefaults,
    Apply,
    Back,
}

impl ControlsItem {
    pub fn all() -> Vec<ControlsItem> {
        Action::ALL
            .into_iter()
            .map(ControlsItem::Bind)
            .chain([ControlsItem::ResetDefaults, ControlsItem::Apply, ControlsItem::Back])
            .collect()
    }

    pub fn label(&self) -> &'static str {
        match self {
            ControlsItem::Bind(action) => action.label(),
            ControlsItem::ResetDefaults => "Reset to Defaults",
            ControlsItem::Apply => "Apply",
            ControlsItem::Back => "Back",
        }
    }
}

/// Staged edits on the controls screen
#[derive(Debug, Clone)]
pub struct ControlsEditor {
    pub selected: usize,
    pub staged: Controls,
    /// Action waiting for its new key
    pub awaiting: Option<Action>,
}

impl ControlsEditor {
    fn new(current: &Controls) -> Self {
        Self {
            selected: 0,
            staged: current.clone(),
            awaiting: None,
        }
    }
}

/// Navigation keys for lists
fn is_up(key: &KeyCode) -> bool {
    matches!(key.as_str(), "ArrowUp" | "KeyW")
}

fn is_down(key: &KeyCode) -> bool {
    matches!(key.as_str(), "ArrowDown" | "KeyS")
}

fn is_select(key: &KeyCode) -> bool {
    matches!(key.as_str(), "Enter" | "NumpadEnter" | "Space")
}

fn is_clear(key: &KeyCode) -> bool {
    matches!(key.as_str(), "Backspace" | "Delete")
}

fn is_escape(key: &KeyCode) -> bool {
    key.as_str() == "Escape"
}

fn step(index: usize, len: usize, forward: bool) -> usize {
    if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    }
}

/// Whole-session state
pub struct App {
    fsm: MenuFsm,
    settings: Settings,
    store: Box<dyn SettingsStore>,
    audio: AudioManager,
    game: Option<GameState>,
    router: InputRouter,
    tracker: PadTracker,
    pads: Vec<PadState>,
    debug: bool,
    main_selected: usize,
    settings_selected: usize,
    controls: ControlsEditor,
    popup_yes: bool,
    seed: u64,
    matches_started: u64,
    /// Points needed to win a match (0 = endless)
    pub score_to_win: u32,
}

impl App {
    /// Load settings from `store` and open the main menu
    pub fn new(store: Box<dyn SettingsStore>, audio: AudioManager, seed: u64) -> Self {
        let settings = Settings::load(store.as_ref());
        let mut audio = audio;
        audio.set_enabled(settings.sound);
        let controls = ControlsEditor::new(&settings.controls);
        let mut app = Self {
            fsm: MenuFsm::new(),
            settings,
            store,
            audio,
            game: None,
            router: InputRouter::new(),
            tracker: PadTracker::new(),
            pads: Vec::new(),
            debug: false,
            main_selected: 0,
            settings_selected: 0,
            controls,
            popup_yes: true,
            seed,
            matches_started: 0,
            score_to_win: crate::consts::SCORE_TO_WIN,
        };
        app.enter_main_menu();
        app
    }

    pub fn screen(&self) -> Screen {
        self.fsm.screen()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn game(&self) -> Option<&GameState> {
        self.game.as_ref()
    }

    pub fn game_mut(&mut self) -> Option<&mut GameState> {
        self.game.as_mut()
    }

    pub fn audio(&self) -> &AudioManager {
        &self.audio
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn pads(&self) -> &[PadState] {
        &self.pads
    }

    /// Session over; the frontend should stop its loop
    pub fn is_finished(&self) -> bool {
        self.screen() == Screen::Exit
    }

    pub fn view(&self) -> View {
        view::build(self)
    }

    /// Store this frame's pad snapshots and route any new button presses
    pub fn set_pads(&mut self, pads: Vec<PadState>) {
        let presses = self.tracker.update(&pads);
        self.pads = pads;
        for (pad, button) in presses {
            self.handle_event(InputEvent::PadButton { pad, button });
        }
    }

    /// Tab hidden or window lost focus
    pub fn pause(&mut self) {
        if let Some(game) = &mut self.game {
            if !game.paused {
                log::info!("Auto-paused");
            }
            game.paused = true;
        }
        self.router.clear();
    }

    /// Advance the current match and feed audio
    pub fn update(&mut self, dt: f32) {
        if self.screen() == Screen::Playing {
            if let Some(game) = &mut self.game {
                let input = self.router.paddle_input(&self.pads, game.mode);
                tick(game, &input, dt);
                for event in game.drain_events() {
                    match event {
                        GameEvent::PaddleHit { .. } => self.audio.play(SoundEffect::PaddleHit),
                        GameEvent::Scored { .. } => self.audio.play(SoundEffect::Score),
                        GameEvent::MatchWon { winner } => log::info!("{} wins the match", winner.name()),
                    }
                }
            }
        }
        self.audio.update();
    }

    /// Route one input event to the current screen
    pub fn handle_event(&mut self, event: InputEvent) {
        if event == InputEvent::Quit {
            self.apply(MenuAction::Quit);
            return;
        }
        match self.screen() {
            Screen::MainMenu => self.main_menu_event(&event),
            Screen::Settings => self.settings_event(&event),
            Screen::Controls => self.controls_event(&event),
            Screen::Credits => {
                if event.is_press() {
                    self.apply(MenuAction::Back);
                }
            }
            Screen::ConfirmReset | Screen::ConfirmResetFinal | Screen::ConfirmUnbound => {
                self.popup_event(&event)
            }
            Screen::Playing => self.playing_event(&event),
            Screen::Exit => {}
        }
    }

    /// Persist the current settings; failures are logged and play continues
    pub fn save_settings(&mut self) {
        if let Err(e) = self.settings.save(self.store.as_mut()) {
            log::error!("Failed to save settings to {}: {}", self.store.describe(), e);
        }
    }

    /// Run a transition plus the side effects of arriving on the new screen
    fn apply(&mut self, action: MenuAction) -> bool {
        let result = self.fsm.transition(action);
        if !result.success {
            return false;
        }
        match (result.to, action) {
            (Screen::Exit, _) => {
                self.audio.stop_music();
                self.save_settings();
                log::info!("Quitting");
            }
            (Screen::MainMenu, _) => {
                self.game = None;
                self.enter_main_menu();
            }
            (Screen::Playing, MenuAction::StartSinglePlayer) => self.start_match(Mode::SinglePlayer),
            (Screen::Playing, MenuAction::StartTwoPlayer) => self.start_match(Mode::TwoPlayer),
            (Screen::Controls, MenuAction::OpenControls) => {
                self.controls = ControlsEditor::new(&self.settings.controls);
            }
            (Screen::ConfirmReset | Screen::ConfirmResetFinal | Screen::ConfirmUnbound, _) => {
                self.popup_yes = true;
            }
            _ => {}
        }
        true
    }

    fn enter_main_menu(&mut self) {
        self.main_selected = 0;
        if self.settings.sound {
            self.audio.start_music();
        }
    }

    fn start_match(&mut self, mode: Mode) {
        self.audio.stop_music();
        self.router.clear();
        let seed = self.seed.wrapping_add(self.matches_started);
        self.matches_started += 1;
        let mut game = GameState::new(mode, &self.settings, seed);
        game.score_to_win = self.score_to_win;
        log::info!("Match started: {}", mode.label());
        self.game = Some(game);
    }

    fn main_menu_event(&mut self, event: &InputEvent) {
        let InputEvent::KeyDown(key) = event else {
            return;
        };
        let len = MainItem::ALL.len();
        if is_escape(key) {
            self.apply(MenuAction::Quit);
        } else if is_up(key) {
            self.main_selected = step(self.main_selected, len, false);
        } else if is_down(key) {
            self.main_selected = step(self.main_selected, len, true);
        } else if is_select(key) {
            let action = match MainItem::ALL[self.main_selected] {
                MainItem::OnePlayer => MenuAction::StartSinglePlayer,
                MainItem::TwoPlayers => MenuAction::StartTwoPlayer,
                MainItem::Settings => MenuAction::OpenSettings,
                MainItem::Quit => MenuAction::Quit,
            };
            self.apply(action);
        }
    }

    fn settings_event(&mut self, event: &InputEvent) {
        let InputEvent::KeyDown(key) = event else {
            return;
        };
        let len = SettingsItem::ALL.len();
        let item = SettingsItem::ALL[self.settings_selected];
        match key.as_str() {
            "Escape" => self.leave_settings(),
            "ArrowLeft" => self.cycle_setting(item, false),
            "ArrowRight" => self.cycle_setting(item, true),
            _ if is_up(key) => self.settings_selected = step(self.settings_selected, len, false),
            _ if is_down(key) => self.settings_selected = step(self.settings_selected, len, true),
            _ if is_select(key) => match item {
                SettingsItem::Back => self.leave_settings(),
                SettingsItem::Controls => {
                    self.apply(MenuAction::OpenControls);
                }
                SettingsItem::Credits => {
                    self.apply(MenuAction::OpenCredits);
                }
                SettingsItem::ResetSettings => {
                    self.apply(MenuAction::RequestReset);
                }
                _ => self.cycle_setting(item, true),
            },
            _ => {}
        }
    }

    fn leave_settings(&mut self) {
        self.save_settings();
        self.apply(MenuAction::Back);
    }

    /// Step a value item and save straight away
    fn cycle_setting(&mut self, item: SettingsItem, forward: bool) {
        match item {
            SettingsItem::AiDifficulty => {
                self.settings.ai_difficulty =
                    settings::cycle(&Difficulty::ALL, self.settings.ai_difficulty, forward);
            }
            SettingsItem::Particles => {
                self.settings.particle_quality =
                    settings::cycle(&ParticleQuality::ALL, self.settings.particle_quality, forward);
            }
            SettingsItem::Sound => {
                self.settings.sound = settings::cycle(&[false, true], self.settings.sound, forward);
                self.audio.set_enabled(self.settings.sound);
            }
            _ => return,
        }
        log::debug!("{} -> {:?}", item.label(), item.value(&self.settings));
        self.save_settings();
    }

    fn controls_event(&mut self, event: &InputEvent) {
        let InputEvent::KeyDown(key) = event else {
            return;
        };

        if let Some(action) = self.controls.awaiting {
            if is_escape(key) {
                // cancelled
            } else if is_clear(key) {
                self.controls.staged.set(action, None);
            } else {
                log::debug!("Staged {} = {}", action.key(), key.as_str());
                self.controls.staged.set(action, Some(key.clone()));
            }
            self.controls.awaiting = None;
            return;
        }

        let items = ControlsItem::all();
        let item = items[self.controls.selected];
        if is_up(key) {
            self.controls.selected = step(self.controls.selected, items.len(), false);
        } else if is_down(key) {
            self.controls.selected = step(self.controls.selected, items.len(), true);
        } else if is_escape(key) {
            self.apply(MenuAction::Back);
        } else if is_clear(key) {
            if let ControlsItem::Bind(action) = item {
                self.controls.staged.set(action, None);
            }
        } else if is_select(key) {
            match item {
                ControlsItem::Bind(action) => self.controls.awaiting = Some(action),
                ControlsItem::ResetDefaults => self.controls.staged = Controls::default(),
                ControlsItem::Apply => {
                    if self.controls.staged.all_unbound() {
                        self.apply(MenuAction::ApplyUnbound);
                    } else {
                        self.commit_controls();
                        self.apply(MenuAction::Back);
                    }
                }
                ControlsItem::Back => {
                    self.apply(MenuAction::Back);
                }
            }
        }
    }

    fn commit_controls(&mut self) {
        self.settings.controls = self.controls.staged.clone();
        log::info!("Controls applied");
        self.save_settings();
    }

    fn popup_event(&mut self, event: &InputEvent) {
        let answer = match event {
            InputEvent::KeyDown(key) => match key.as_str() {
                "ArrowLeft" | "KeyA" => {
                    self.popup_yes = true;
                    None
                }
                "ArrowRight" | "KeyD" => {
                    self.popup_yes = false;
                    None
                }
                "Escape" => Some(false),
                _ if is_select(key) => Some(self.popup_yes),
                _ => None,
            },
            InputEvent::PadButton { button: 0, .. } => Some(true),
            InputEvent::PadButton { button: 1, .. } => Some(false),
            _ => None,
        };
        let Some(yes) = answer else {
            return;
        };

        let screen = self.screen();
        if !yes {
            self.apply(MenuAction::Cancel);
            return;
        }
        match screen {
            Screen::ConfirmResetFinal => {
                log::info!("Settings reset to defaults");
                self.settings = Settings::default();
                self.audio.set_enabled(self.settings.sound);
                self.save_settings();
            }
            Screen::ConfirmUnbound => self.commit_controls(),
            _ => {}
        }
        self.apply(MenuAction::Confirm);
    }

    fn playing_event(&mut self, event: &InputEvent) {
        let Some(game) = &mut self.game else {
            return;
        };

        // Any press ends the win banner and is otherwise swallowed
        if event.is_press() && game.skip_banner() {
            return;
        }
        if matches!(event, InputEvent::KeyDown(_)) && game.paused {
            game.paused = false;
        }

        match self.router.handle_event(event, &self.settings.controls, game.mode) {
            Some(Command::ResetMatch) => game.reset_match(),
            Some(Command::ToggleDebug) => {
                self.debug = !self.debug;
                log::info!("Debug overlay {}", if self.debug { "on" } else { "off" });
            }
            Some(Command::ReturnToMenu) => {
                self.apply(MenuAction::ReturnToMenu);
            }
            Some(Command::Quit) => {
                self.apply(MenuAction::Quit);
            }
            None => {}
        }
    }
}
