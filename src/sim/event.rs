/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound and screen effects;
/// the simulation never waits on them.

/// Fire-and-forget audio cues.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Cue {
    Jump,
    Shoot,
    Coin,
    PowerUp,
    PowerUpAppears,
    Stomp,
    Damage,
    BlockBreak,
    BlockBump,
    LevelClear,
    Win,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Cue(Cue),
    /// Shake intensity in pixels; decays by one per tick.
    ScreenShake(f32),
    DamageFlash,
    PlayerKilled,
    Respawned,
    LevelCleared,
    GameOver,
    Won,
}

impl From<Cue> for GameEvent {
    fn from(cue: Cue) -> Self {
        GameEvent::Cue(cue)
    }
}
