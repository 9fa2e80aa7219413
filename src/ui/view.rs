//! Text surfaces for the current screen
//!
//! Frontends draw the board on the GPU and everything textual from a [`View`].

use super::{App, ControlsItem, MainItem, Screen, SettingsItem};
use crate::palette;
use crate::settings::{Action, Controls};
use crate::sim::{GameState, Phase};

const UNBOUND: &str = "[UNBOUND]";

const CREDITS: [&str; 12] = [
    "BOING!",
    "CREATED BY: XCALLUMNICX",
    "",
    "Music:",
    "- Procedural menu loop, synthesized in the browser",
    "",
    "Libraries:",
    "- wgpu, glam, rand, serde",
    "",
    "Special thanks:",
    "- Everyone who ever played Pong",
    "",
];

/// One menu row
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub label: String,
    pub value: Option<String>,
    pub selected: bool,
}

/// Yes/no confirmation box
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub title: String,
    pub title_color: [u8; 3],
    pub message: String,
    pub yes: String,
    pub no: String,
    pub yes_selected: bool,
}

/// In-match overlay
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub scores: [u32; 2],
    pub help: String,
    pub banner: Option<String>,
    pub paused: bool,
}

/// Everything textual on screen this frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct View {
    pub title: String,
    pub items: Vec<MenuItem>,
    pub hint: String,
    /// Free text (credits, rebind prompt)
    pub lines: Vec<String>,
    pub popup: Option<Popup>,
    pub hud: Option<Hud>,
    pub debug: Vec<String>,
}

fn binding_text(controls: &Controls, action: Action) -> String {
    controls
        .get(action)
        .map(|k| k.display_name())
        .unwrap_or_else(|| UNBOUND.to_string())
}

fn rows<I>(entries: I, selected: usize) -> Vec<MenuItem>
where
    I: IntoIterator<Item = (String, Option<String>)>,
{
    entries
        .into_iter()
        .enumerate()
        .map(|(i, (label, value))| MenuItem {
            label,
            value,
            selected: i == selected,
        })
        .collect()
}

pub(super) fn build(app: &App) -> View {
    let screen = app.screen();
    let mut view = match screen {
        Screen::MainMenu | Screen::Exit => main_menu(app),
        Screen::Settings | Screen::ConfirmReset | Screen::ConfirmResetFinal => settings(app),
        Screen::Controls | Screen::ConfirmUnbound => controls(app),
        Screen::Credits => View {
            title: "CREDITS".to_string(),
            lines: CREDITS.iter().map(|s| s.to_string()).collect(),
            hint: "Press any key or joystick button to return.".to_string(),
            ..View::default()
        },
        Screen::Playing => match app.game() {
            Some(game) => playing(app, game),
            None => View::default(),
        },
    };
    view.popup = popup(screen, app.popup_yes);
    view
}

fn main_menu(app: &App) -> View {
    View {
        title: "BOING!".to_string(),
        items: rows(
            MainItem::ALL.iter().map(|i| (i.label().to_string(), None)),
            app.main_selected,
        ),
        hint: "Use Up/Down and Enter to choose. Esc to quit.".to_string(),
        ..View::default()
    }
}

fn settings(app: &App) -> View {
    View {
        title: "SETTINGS".to_string(),
        items: rows(
            SettingsItem::ALL
                .iter()
                .map(|i| (i.label().to_string(), i.value(&app.settings).map(str::to_string))),
            app.settings_selected,
        ),
        hint: "Use Left/Right to change values. Enter on Controls to rebind.".to_string(),
        ..View::default()
    }
}

fn controls(app: &App) -> View {
    let editor = &app.controls;
    let items = ControlsItem::all().into_iter().map(|item| {
        let value = match item {
            ControlsItem::Bind(action) => Some(binding_text(&editor.staged, action)),
            _ => None,
        };
        (item.label().to_string(), value)
    });
    let lines = editor
        .awaiting
        .map(|a| vec![format!("Press a key to bind for '{}' (Esc to cancel)", a.label())])
        .unwrap_or_default();
    View {
        title: "REMAP CONTROLS".to_string(),
        items: rows(items, editor.selected),
        hint: "Enter to rebind | Backspace to clear | Apply to commit | Esc to cancel".to_string(),
        lines,
        ..View::default()
    }
}

fn popup(screen: Screen, yes_selected: bool) -> Option<Popup> {
    let (title, title_color, message, yes, no) = match screen {
        Screen::ConfirmReset => (
            "Warning",
            [220, 180, 40],
            "This will reset all settings to their default values. Are you sure you want to continue?",
            "Continue",
            "Cancel",
        ),
        Screen::ConfirmResetFinal => (
            "FINAL WARNING",
            [255, 0, 0],
            "WE ARE ABOUT TO ERASE YOUR WHOLE SETTINGS FILE. ARE YOU SURE?",
            "Yes",
            "No",
        ),
        Screen::ConfirmUnbound => (
            "WARNING",
            [220, 180, 40],
            "WARNING: you have unbound all keys! are you sure you want to apply this change?",
            "Apply",
            "Cancel",
        ),
        _ => return None,
    };
    Some(Popup {
        title: title.to_string(),
        title_color,
        message: message.to_string(),
        yes: yes.to_string(),
        no: no.to_string(),
        yes_selected,
    })
}

/// Bottom help line, naming whatever keys are currently bound
pub fn help_line(game: &GameState, controls: &Controls) -> String {
    format!(
        "{}  |  Rebind Controls in Settings  |  {}: reset  |  {}: menu  |  {}: debug",
        game.mode.label(),
        binding_text(controls, Action::Reset),
        binding_text(controls, Action::Menu),
        binding_text(controls, Action::Debug),
    )
}

fn playing(app: &App, game: &GameState) -> View {
    let banner = match game.phase {
        Phase::Won { winner, .. } => Some(format!("{} wins!", winner.name())),
        Phase::Playing => None,
    };
    View {
        hud: Some(Hud {
            scores: game.scores,
            help: help_line(game, &app.settings.controls),
            banner,
            paused: game.paused,
        }),
        debug: if app.debug { debug_lines(app, game) } else { Vec::new() },
        ..View::default()
    }
}

/// Debug overlay text; the first line is drawn in the accent color
pub fn debug_lines(app: &App, game: &GameState) -> Vec<String> {
    let stats = &game.stats;
    let mut lines = vec![
        format!("FPS: {:.1}", stats.fps),
        format!("Frame: {:.2} ms", stats.avg_frame_ms()),
        format!("Update: {:.2} ms", stats.avg_update_ms()),
        format!("Draw: {:.2} ms", stats.avg_draw_ms()),
        format!("Particles: {}", game.particles.len()),
        format!("TrailLen: {}", game.trail.len()),
        format!("Shake: {:.1}px / {:.2}s", game.shake.magnitude, game.shake.timer),
    ];
    lines.extend(app.pads().iter().map(|p| p.summary()));
    lines
}

/// CSS color string for a palette entry
pub fn css_color(c: [u8; 3]) -> String {
    format!("rgb({}, {}, {})", c[0], c[1], c[2])
}

/// Label color: highlighted when selected, white otherwise
pub fn item_color(item: &MenuItem) -> [u8; 3] {
    if item.selected { palette::HIGHLIGHT } else { palette::WHITE }
}

/// Value text color: accent when selected, white otherwise
pub fn value_color(item: &MenuItem) -> [u8; 3] {
    if item.selected { palette::ACCENT } else { palette::WHITE }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioManager;
    use crate::input::InputEvent;
    use crate::persistence::MemoryStore;
    use crate::platform::PadState;
    use crate::sim::Side;
    use crate::ui::MenuAction;

    fn app() -> App {
        App::new(Box::new(MemoryStore::new()), AudioManager::new(false), 5)
    }

    #[test]
    fn test_main_menu_view() {
        let view = app().view();
        assert_eq!(view.title, "BOING!");
        let labels: Vec<_> = view.items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, ["1 Player", "2 Players", "Settings", "Quit"]);
        assert!(view.items[0].selected);
        assert_eq!(item_color(&view.items[0]), palette::HIGHLIGHT);
        assert_eq!(item_color(&view.items[1]), palette::WHITE);
        assert!(view.hud.is_none() && view.popup.is_none());
    }

    #[test]
    fn test_settings_values() {
        let mut app = app();
        app.apply(MenuAction::OpenSettings);
        let view = app.view();
        assert_eq!(view.items[0].value.as_deref(), Some("Normal"));
        assert_eq!(view.items[3].value.as_deref(), Some("On"));
        assert_eq!(view.items[2].value, None);
        assert_eq!(value_color(&view.items[0]), palette::ACCENT);
        assert_eq!(value_color(&view.items[3]), palette::WHITE);
    }

    #[test]
    fn test_controls_show_unbound_and_prompt() {
        let mut app = app();
        app.apply(MenuAction::OpenSettings);
        app.apply(MenuAction::OpenControls);
        app.handle_event(InputEvent::key_down("Delete"));
        app.handle_event(InputEvent::key_down("ArrowDown"));
        app.handle_event(InputEvent::key_down("Enter"));
        let view = app.view();
        assert_eq!(view.items[0].value.as_deref(), Some(UNBOUND));
        assert_eq!(view.items[2].value.as_deref(), Some("up"));
        assert!(view.items[1].selected);
        assert_eq!(view.lines, ["Press a key to bind for 'Left Down' (Esc to cancel)"]);
    }

    #[test]
    fn test_popups_follow_screen() {
        let mut app = app();
        app.apply(MenuAction::OpenSettings);
        app.apply(MenuAction::RequestReset);
        let popup = app.view().popup.unwrap();
        assert_eq!(popup.title, "Warning");
        assert!(popup.yes_selected);
        app.handle_event(InputEvent::key_down("ArrowRight"));
        assert!(!app.view().popup.unwrap().yes_selected);
        app.handle_event(InputEvent::key_down("Enter"));
        assert!(app.view().popup.is_none());
    }

    #[test]
    fn test_hud_help_uses_bindings() {
        let mut app = app();
        app.settings.controls.set(Action::Debug, None);
        app.apply(MenuAction::StartSinglePlayer);
        let hud = app.view().hud.unwrap();
        assert_eq!(
            hud.help,
            "1P (vs AI)  |  Rebind Controls in Settings  |  r: reset  |  m: menu  |  [UNBOUND]: debug"
        );
        assert_eq!(hud.banner, None);
    }

    #[test]
    fn test_banner_and_debug_lines() {
        let mut app = app();
        app.apply(MenuAction::StartTwoPlayer);
        app.debug = true;
        app.pads = vec![PadState::new(0, "Pad", vec![0.0; 4], vec![false; 16])];
        app.game_mut().unwrap().phase = Phase::Won {
            winner: Side::Right,
            remaining: 1.0,
        };
        let view = app.view();
        assert_eq!(view.hud.unwrap().banner.as_deref(), Some("Right wins!"));
        assert_eq!(view.debug.len(), 8);
        assert!(view.debug[0].starts_with("FPS: "));
        assert_eq!(view.debug[4], "Particles: 0");
        assert_eq!(view.debug[7], "#0 Pad axes=4 buttons=16 hats=1");
    }

    #[test]
    fn test_css_color() {
        assert_eq!(css_color(palette::ACCENT), "rgb(100, 200, 255)");
    }
}
