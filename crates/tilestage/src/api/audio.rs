use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AudioError {
    #[error("no sound or track named `{0}`")]
    NotFound(String),
}

/// Playback backend injected into a world. The world only forwards calls
/// and pumps `update` once per frame.
pub trait AudioManager: Send {
    /// Called once per world update.
    fn update(&mut self) {}

    fn play_sound(&mut self, name: &str) -> Result<(), AudioError>;

    /// `volume` in [0, 1].
    fn play_sound_with_volume(&mut self, name: &str, volume: f64) -> Result<(), AudioError>;

    fn play_music(&mut self, name: &str) -> Result<(), AudioError>;

    fn stop_music(&mut self);

    fn pause_music(&mut self);

    fn resume_music(&mut self);

    /// Release backend resources. Called when the world is destroyed.
    fn cleanup(&mut self) {}
}

/// Silent backend: nothing is loaded, so every play request is `NotFound`.
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioManager for NullAudio {
    fn play_sound(&mut self, name: &str) -> Result<(), AudioError> {
        Err(AudioError::NotFound(name.to_string()))
    }

    fn play_sound_with_volume(&mut self, name: &str, _volume: f64) -> Result<(), AudioError> {
        Err(AudioError::NotFound(name.to_string()))
    }

    fn play_music(&mut self, name: &str) -> Result<(), AudioError> {
        Err(AudioError::NotFound(name.to_string()))
    }

    fn stop_music(&mut self) {}

    fn pause_music(&mut self) {}

    fn resume_music(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_audio_reports_not_found() {
        let mut audio = NullAudio;
        assert_eq!(audio.play_sound("jump"), Err(AudioError::NotFound("jump".into())));
        assert!(audio.play_music("theme").is_err());
        audio.update();
        audio.stop_music();
        audio.cleanup();
    }

    #[test]
    fn error_message_names_the_asset() {
        assert_eq!(AudioError::NotFound("boom".into()).to_string(), "no sound or track named `boom`");
    }
}
