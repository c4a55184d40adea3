/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SceneEvent {
    /// The player's walk cycle advanced to a new frame.
    PlayerStride { frame: u8 },
    NpcStarted { index: usize },
    NpcStopped { index: usize },
    NpcTurned { index: usize },
}
