//! Menu shell state machine
//!
//! Every screen change goes through [`next_state`]; pairs missing from the
//! table are rejected and leave the machine where it was.

/// Shell screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    MainMenu,
    Settings,
    Controls,
    Credits,
    /// First reset confirmation (yellow)
    ConfirmReset,
    /// Second reset confirmation (red)
    ConfirmResetFinal,
    /// Applying a binding set with nothing bound
    ConfirmUnbound,
    Playing,
    /// Terminal
    Exit,
}

impl Screen {
    pub fn is_popup(&self) -> bool {
        matches!(
            self,
            Screen::ConfirmReset | Screen::ConfirmResetFinal | Screen::ConfirmUnbound
        )
    }
}

/// Actions that trigger screen transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    StartSinglePlayer,
    StartTwoPlayer,
    OpenSettings,
    OpenControls,
    OpenCredits,
    RequestReset,
    Confirm,
    Cancel,
    ApplyUnbound,
    Back,
    ReturnToMenu,
    Quit,
}

/// Result of a transition attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub success: bool,
    pub from: Screen,
    pub to: Screen,
    pub action: MenuAction,
}

/// Next screen for `action` taken on `screen`, if the pair is valid
pub fn next_state(screen: Screen, action: MenuAction) -> Option<Screen> {
    use MenuAction as A;
    use Screen as S;

    match (screen, action) {
        // Nothing leaves Exit
        (S::Exit, _) => None,
        (_, A::Quit) => Some(S::Exit),

        // From MainMenu
        (S::MainMenu, A::StartSinglePlayer) => Some(S::Playing),
        (S::MainMenu, A::StartTwoPlayer) => Some(S::Playing),
        (S::MainMenu, A::OpenSettings) => Some(S::Settings),

        // From Settings
        (S::Settings, A::OpenControls) => Some(S::Controls),
        (S::Settings, A::OpenCredits) => Some(S::Credits),
        (S::Settings, A::RequestReset) => Some(S::ConfirmReset),
        (S::Settings, A::Back) => Some(S::MainMenu),

        // From Controls
        (S::Controls, A::ApplyUnbound) => Some(S::ConfirmUnbound),
        (S::Controls, A::Back) => Some(S::Settings),

        // From Credits
        (S::Credits, A::Back) => Some(S::Settings),

        // Reset confirmations
        (S::ConfirmReset, A::Confirm) => Some(S::ConfirmResetFinal),
        (S::ConfirmReset, A::Cancel) => Some(S::Settings),
        (S::ConfirmResetFinal, A::Confirm) => Some(S::Settings),
        (S::ConfirmResetFinal, A::Cancel) => Some(S::Settings),

        // Unbound confirmation
        (S::ConfirmUnbound, A::Confirm) => Some(S::Settings),
        (S::ConfirmUnbound, A::Cancel) => Some(S::Controls),

        // From Playing
        (S::Playing, A::ReturnToMenu) => Some(S::MainMenu),

        // Invalid transition
        _ => None,
    }
}

/// Shell state machine
#[derive(Debug, Clone)]
pub struct MenuFsm {
    screen: Screen,
}

impl MenuFsm {
    pub fn new() -> Self {
        Self {
            screen: Screen::MainMenu,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn can_transition(&self, action: MenuAction) -> bool {
        next_state(self.screen, action).is_some()
    }

    /// Attempt a transition
    pub fn transition(&mut self, action: MenuAction) -> Transition {
        let from = self.screen;
        match next_state(from, action) {
            Some(to) => {
                self.screen = to;
                log::info!("Screen {:?} -> {:?} ({:?})", from, to, action);
                Transition {
                    success: true,
                    from,
                    to,
                    action,
                }
            }
            None => {
                log::debug!("Rejected {:?} on {:?}", action, from);
                Transition {
                    success: false,
                    from,
                    to: from,
                    action,
                }
            }
        }
    }
}

impl Default for MenuFsm {
    fn default() -> Self {
        Self::new()
    }
}
