use bevy::prelude::*;

/// The viewer waits for the session manifest before running tools and
/// reconstruction.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum ViewerState {
    #[default]
    LoadingSession,
    Running,
}

#[derive(Component)]
pub struct FpsText;
