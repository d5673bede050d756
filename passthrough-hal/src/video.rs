//! Video-input passthrough switch.
//!
//! Routes an external device's video signal straight to the screen while the
//! session view is visible. Activation resets the tuner, picks the first
//! passthrough-capable input and tunes to its passthrough channel.

use tracing::{debug, info, warn};

use crate::errors::PassthroughError;

/// A video input reported by the TV input service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoInput {
    pub id: String,
    /// Whether the input is a hardware passthrough source (HDMI etc).
    pub passthrough: bool,
}

impl VideoInput {
    pub fn passthrough(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            passthrough: true,
        }
    }
}

/// The channel a passthrough input is tuned through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassthroughChannel {
    pub input_id: String,
    pub uri: String,
}

impl PassthroughChannel {
    /// Channel URI scheme used by the TV input framework for passthrough inputs.
    pub fn for_input(input_id: &str) -> Self {
        Self {
            input_id: input_id.to_string(),
            uri: format!("content://android.media.tv/passthrough/{input_id}"),
        }
    }
}

/// IPC surface of the TV input / tuner service.
pub trait TvInputService {
    fn list_inputs(&mut self) -> Result<Vec<VideoInput>, PassthroughError>;
    fn tune(&mut self, input_id: &str, channel_uri: &str) -> Result<(), PassthroughError>;
    fn reset(&mut self) -> Result<(), PassthroughError>;
}

/// Starts and stops the passthrough channel alongside view visibility.
pub struct VideoPassthroughSwitch {
    service: Option<Box<dyn TvInputService>>,
    active: Option<PassthroughChannel>,
}

impl std::fmt::Debug for VideoPassthroughSwitch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoPassthroughSwitch")
            .field("available", &self.service.is_some())
            .field("active", &self.active)
            .finish()
    }
}

impl VideoPassthroughSwitch {
    pub fn new(service: Box<dyn TvInputService>) -> Self {
        Self {
            service: Some(service),
            active: None,
        }
    }

    /// A switch for hosts without a TV input service.
    pub fn unavailable() -> Self {
        Self {
            service: None,
            active: None,
        }
    }

    pub fn active_channel(&self) -> Option<&PassthroughChannel> {
        self.active.as_ref()
    }

    /// Reset, discover the first passthrough input and tune to it.
    ///
    /// On any failure the channel is left idle.
    pub fn activate(&mut self) -> Result<PassthroughChannel, PassthroughError> {
        let service = self
            .service
            .as_mut()
            .ok_or(PassthroughError::ServiceUnavailable)?;

        if let Err(e) = service.reset() {
            warn!("Video passthrough reset before activation failed: {}", e);
        }
        self.active = None;

        let inputs = service.list_inputs()?;
        debug!("TV inputs: {:?}", inputs);
        let input = inputs
            .iter()
            .find(|i| i.passthrough)
            .ok_or(PassthroughError::NoPassthroughInput)?;

        let channel = PassthroughChannel::for_input(&input.id);
        service.tune(&channel.input_id, &channel.uri)?;
        info!("Video passthrough tuned to {}", channel.uri);

        self.active = Some(channel.clone());
        Ok(channel)
    }

    /// Reset to idle.
    pub fn deactivate(&mut self) -> Result<(), PassthroughError> {
        let service = self
            .service
            .as_mut()
            .ok_or(PassthroughError::ServiceUnavailable)?;
        self.active = None;
        service.reset()?;
        debug!("Video passthrough reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockTvInputService, TvCall};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_activate_tunes_first_passthrough_input() {
        let mock = MockTvInputService::with_inputs(vec![
            VideoInput {
                id: "tuner0".into(),
                passthrough: false,
            },
            VideoInput::passthrough("hdmi1"),
            VideoInput::passthrough("hdmi2"),
        ]);
        let mut switch = VideoPassthroughSwitch::new(Box::new(mock.clone()));

        let channel = switch.activate().unwrap();
        assert_eq!(channel.input_id, "hdmi1");
        assert_eq!(
            mock.calls(),
            vec![
                TvCall::Reset,
                TvCall::ListInputs,
                TvCall::Tune(
                    "hdmi1".into(),
                    "content://android.media.tv/passthrough/hdmi1".into()
                ),
            ]
        );
    }

    #[test]
    fn test_no_input_leaves_idle() {
        let mock = MockTvInputService::with_inputs(vec![]);
        let mut switch = VideoPassthroughSwitch::new(Box::new(mock.clone()));
        assert_eq!(
            switch.activate(),
            Err(PassthroughError::NoPassthroughInput)
        );
        assert!(switch.active_channel().is_none());
        assert_eq!(mock.count(&TvCall::ListInputs), 1);
    }

    #[test]
    fn test_deactivate_resets() {
        let mock = MockTvInputService::with_inputs(vec![VideoInput::passthrough("hdmi1")]);
        let mut switch = VideoPassthroughSwitch::new(Box::new(mock.clone()));
        switch.activate().unwrap();
        switch.deactivate().unwrap();
        assert!(switch.active_channel().is_none());
        assert_eq!(mock.count(&TvCall::Reset), 2);
    }

    #[test]
    fn test_unavailable_service() {
        let mut switch = VideoPassthroughSwitch::unavailable();
        assert_eq!(switch.activate(), Err(PassthroughError::ServiceUnavailable));
        assert_eq!(switch.deactivate(), Err(PassthroughError::ServiceUnavailable));
    }
}
