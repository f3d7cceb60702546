//! Terminal-independent key events and their navigation meaning.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Ctrl(char),
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
    Tab,
    BackTab,
    Enter,
    Esc,
    Backspace,
}

/// What a key means to a list panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Up,
    Down,
    PageUp,
    PageDown,
    Top,
    Bottom,
    NextGroup,
    PrevGroup,
    Open,
    Back,
    FocusLeft,
    FocusRight,
    FocusUp,
    FocusDown,
}

impl Key {
    pub fn nav(self) -> Option<Nav> {
        match self {
            Self::Up | Self::Char('k') => Some(Nav::Up),
            Self::Down | Self::Char('j') => Some(Nav::Down),
            Self::PageUp => Some(Nav::PageUp),
            Self::PageDown => Some(Nav::PageDown),
            Self::Home => Some(Nav::Top),
            Self::End => Some(Nav::Bottom),
            Self::Tab => Some(Nav::NextGroup),
            Self::BackTab => Some(Nav::PrevGroup),
            Self::Enter => Some(Nav::Open),
            Self::Esc => Some(Nav::Back),
            Self::Left | Self::Ctrl('h') => Some(Nav::FocusLeft),
            Self::Right | Self::Ctrl('l') => Some(Nav::FocusRight),
            Self::Ctrl('k') => Some(Nav::FocusUp),
            Self::Ctrl('j') => Some(Nav::FocusDown),
            _ => None,
        }
    }
}
