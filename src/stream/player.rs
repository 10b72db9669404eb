//! Local Player - mpv/VLC as the media element
//!
//! Each `Load` spawns the player on the resolved URL. A watcher task waits for
//! the process and reports how it ended. mpv is started with a JSON IPC socket
//! so pause, resume and seek reach the running process; VLC has no control
//! channel and only supports load/unload.
//!
//! mpv also exits 0 when the viewer quits, so its quit bindings are remapped to
//! exit with [`VIEWER_QUIT_STATUS`]. That exit is reported as an error rather
//! than end of media and never auto-advances. VLC cannot tell the two apart and
//! any clean exit counts as the end of the episode.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::models::MediaLocation;
use crate::playback::element::{ElementCommand, ElementError, ElementEvent, ElementSink, MediaElement};

/// Exit status mpv reports when the viewer quits or closes its window
pub const VIEWER_QUIT_STATUS: i32 = 12;

/// Quit bindings that replace mpv's defaults for the session
const MPV_INPUT_CONF: &str = "q quit 12\nQ quit-watch-later 12\nCLOSE_WIN quit 12\n";

/// Supported local players
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PlayerType {
    /// mpv media player (default, remote-controllable)
    #[default]
    Mpv,
    /// VLC media player
    Vlc,
}

impl PlayerType {
    /// Get the command name for this player
    pub fn command(&self) -> &'static str {
        match self {
            PlayerType::Vlc => {
                // On macOS, VLC is an app bundle - check for it
                #[cfg(target_os = "macos")]
                if std::path::Path::new("/Applications/VLC.app").exists() {
                    return "/Applications/VLC.app/Contents/MacOS/VLC";
                }
                "vlc"
            }
            PlayerType::Mpv => "mpv",
        }
    }

    /// Get a display name for this player
    pub fn display_name(&self) -> &'static str {
        match self {
            PlayerType::Vlc => "VLC",
            PlayerType::Mpv => "mpv",
        }
    }

    /// Whether pause/seek can be sent to a running process
    pub fn is_controllable(&self) -> bool {
        matches!(self, PlayerType::Mpv)
    }
}

impl std::fmt::Display for PlayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A spawned player process and the handle to stop it
struct Running {
    kill: oneshot::Sender<()>,
    watcher: JoinHandle<()>,
}

/// Local player driven as a media element
pub struct LocalPlayer {
    player_type: PlayerType,
    location: Option<MediaLocation>,
    running: Option<Running>,
    ipc_path: PathBuf,
    input_conf: PathBuf,
}

impl LocalPlayer {
    /// Create a new local player with the specified type
    pub fn new(player_type: PlayerType) -> Self {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let dir = std::env::temp_dir();
        Self {
            player_type,
            location: None,
            running: None,
            ipc_path: dir.join(format!("dramatui-mpv-{id}.sock")),
            input_conf: dir.join(format!("dramatui-mpv-{id}.conf")),
        }
    }

    /// Create an mpv player
    pub fn mpv() -> Self {
        Self::new(PlayerType::Mpv)
    }

    /// Create a VLC player
    pub fn vlc() -> Self {
        Self::new(PlayerType::Vlc)
    }

    /// Get the player type
    pub fn player_type(&self) -> PlayerType {
        self.player_type
    }

    /// Location of the media currently loaded
    pub fn location(&self) -> Option<&MediaLocation> {
        self.location.as_ref()
    }

    /// Whether a player process is alive
    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .map(|running| !running.watcher.is_finished())
            .unwrap_or(false)
    }

    /// Check if the player is available on the system
    pub async fn is_available(&self) -> bool {
        let cmd = self.player_type.command();

        // If it's a full path (macOS app bundle), check if it exists
        if cmd.starts_with('/') {
            return std::path::Path::new(cmd).exists();
        }

        // Otherwise use 'which' to find in PATH
        Command::new("which")
            .arg(cmd)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Build the command line for a stream URL
    fn command_for(&self, location: &MediaLocation) -> Command {
        let mut cmd = Command::new(self.player_type.command());
        cmd.arg(location.as_str());

        match self.player_type {
            PlayerType::Vlc => {
                cmd.arg("--no-video-title-show");
                cmd.arg("--play-and-exit");
            }
            PlayerType::Mpv => {
                cmd.arg("--force-window=immediate");
                cmd.arg(format!("--input-ipc-server={}", self.ipc_path.display()));
                if self.input_conf.exists() {
                    cmd.arg(format!("--input-conf={}", self.input_conf.display()));
                }
            }
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());
        cmd.kill_on_drop(true);
        cmd
    }

    fn spawn(&mut self, location: MediaLocation, sink: &ElementSink) -> Result<(), ElementError> {
        self.stop();

        if self.player_type == PlayerType::Mpv && !self.input_conf.exists() {
            if let Err(e) = std::fs::write(&self.input_conf, MPV_INPUT_CONF) {
                warn!(error = %e, "could not write mpv input bindings; quitting will count as end of episode");
            }
        }

        let child = self.command_for(&location).spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ElementError::NotFound(self.player_type.command().to_string())
            } else {
                ElementError::Spawn(e)
            }
        })?;
        info!(player = %self.player_type, url = %location, "player started");

        // Duration is unknown until the player reads the stream
        sink.emit(ElementEvent::MetadataLoaded { duration: None });

        let (kill, kill_rx) = oneshot::channel();
        let watcher = tokio::spawn(watch(child, kill_rx, sink.clone()));
        self.running = Some(Running { kill, watcher });
        self.location = Some(location);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            debug!(player = %self.player_type, "stopping player");
            let _ = running.kill.send(());
        }
    }

    async fn control(&self, what: &'static str, command: serde_json::Value) -> Result<(), ElementError> {
        if !self.player_type.is_controllable() {
            return Err(ElementError::Unsupported(what));
        }
        if !self.is_running() {
            return Err(ElementError::Control(format!("{what}: no player running")));
        }
        send_ipc(&self.ipc_path, &command).await
    }
}

#[async_trait]
impl MediaElement for LocalPlayer {
    async fn apply(&mut self, command: ElementCommand, sink: &ElementSink) -> Result<(), ElementError> {
        match command {
            ElementCommand::Load(location) => self.spawn(location, sink),
            ElementCommand::Restart => {
                let location = self
                    .location
                    .clone()
                    .ok_or_else(|| ElementError::Control("restart: nothing loaded".into()))?;
                self.spawn(location, sink)
            }
            ElementCommand::Unload => {
                self.stop();
                self.location = None;
                Ok(())
            }
            ElementCommand::Play => {
                self.control("play", serde_json::json!({ "command": ["set_property", "pause", false] }))
                    .await
            }
            ElementCommand::Pause => {
                self.control("pause", serde_json::json!({ "command": ["set_property", "pause", true] }))
                    .await
            }
            ElementCommand::SeekBy(seconds) => {
                self.control("seek", serde_json::json!({ "command": ["seek", seconds, "relative"] }))
                    .await
            }
        }
    }
}

impl Drop for LocalPlayer {
    fn drop(&mut self) {
        self.stop();
        let _ = std::fs::remove_file(&self.input_conf);
    }
}

/// Element event for a player exit code; `None` means killed by a signal
fn exit_event(code: Option<i32>) -> ElementEvent {
    match code {
        Some(0) => ElementEvent::Ended,
        Some(VIEWER_QUIT_STATUS) => ElementEvent::Error("player closed before the end".into()),
        Some(code) => ElementEvent::Error(format!("player exited with status {code}")),
        None => ElementEvent::Error("player terminated by a signal".into()),
    }
}

/// Wait for the player to exit, or kill it when asked
async fn watch(mut child: Child, kill_rx: oneshot::Receiver<()>, sink: ElementSink) {
    tokio::select! {
        status = child.wait() => match status {
            Ok(status) => {
                debug!(code = ?status.code(), "player exited");
                sink.emit(exit_event(status.code()));
            }
            Err(e) => sink.emit(ElementEvent::Error(e.to_string())),
        },
        _ = kill_rx => {
            let _ = child.kill().await;
        }
    }
}

#[cfg(unix)]
async fn send_ipc(path: &std::path::Path, command: &serde_json::Value) -> Result<(), ElementError> {
    use tokio::io::AsyncWriteExt;
    use tokio::net::UnixStream;

    let mut stream = UnixStream::connect(path)
        .await
        .map_err(|e| ElementError::Control(format!("connect {}: {e}", path.display())))?;
    let mut line = command.to_string();
    line.push('\n');
    stream
        .write_all(line.as_bytes())
        .await
        .map_err(|e| ElementError::Control(e.to_string()))
}

#[cfg(not(unix))]
async fn send_ipc(_path: &std::path::Path, _command: &serde_json::Value) -> Result<(), ElementError> {
    Err(ElementError::Unsupported("player control"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::controller::PlayerInput;
    use tokio::sync::mpsc;

    #[test]
    fn test_player_type_command() {
        // On macOS with VLC installed, returns full path; otherwise "vlc"
        let vlc_cmd = PlayerType::Vlc.command();
        assert!(vlc_cmd == "vlc" || vlc_cmd == "/Applications/VLC.app/Contents/MacOS/VLC");
        assert_eq!(PlayerType::Mpv.command(), "mpv");
    }

    #[test]
    fn test_player_type_display() {
        assert_eq!(PlayerType::Vlc.to_string(), "VLC");
        assert_eq!(PlayerType::Mpv.to_string(), "mpv");
    }

    #[test]
    fn test_default_player_is_controllable() {
        assert_eq!(PlayerType::default(), PlayerType::Mpv);
        assert!(PlayerType::Mpv.is_controllable());
        assert!(!PlayerType::Vlc.is_controllable());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_event(Some(0)), ElementEvent::Ended);
        assert!(matches!(exit_event(Some(VIEWER_QUIT_STATUS)), ElementEvent::Error(_)));
        assert!(matches!(exit_event(Some(2)), ElementEvent::Error(_)));
        assert!(matches!(exit_event(None), ElementEvent::Error(_)));
    }

    #[test]
    fn test_quit_bindings_use_viewer_status() {
        let status = format!(" {VIEWER_QUIT_STATUS}");
        assert!(MPV_INPUT_CONF.lines().all(|line| line.ends_with(&status)));
        assert!(MPV_INPUT_CONF.contains("CLOSE_WIN quit"));
    }

    #[tokio::test]
    async fn test_vlc_rejects_controls() {
        let (tx, _rx) = mpsc::unbounded_channel::<PlayerInput>();
        let sink = ElementSink::new(tx, 1);
        let mut player = LocalPlayer::vlc();
        let err = player.apply(ElementCommand::Pause, &sink).await.unwrap_err();
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_restart_without_media_is_not_fatal() {
        let (tx, _rx) = mpsc::unbounded_channel::<PlayerInput>();
        let sink = ElementSink::new(tx, 1);
        let mut player = LocalPlayer::mpv();
        let err = player.apply(ElementCommand::Restart, &sink).await.unwrap_err();
        assert!(!err.is_fatal());
        assert!(player.apply(ElementCommand::Unload, &sink).await.is_ok());
    }
}
