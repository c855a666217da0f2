/// Background asset loading for the terminal front end
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use clockview_core::asset::load_clock_file;
use clockview_core::{AssetError, ClockModel};

/// Single-shot loader: one thread decodes the asset and sends the result
/// back; the frame loop polls for it.
pub struct AssetLoader {
    receiver: Receiver<Result<ClockModel, AssetError>>,
}

impl AssetLoader {
    pub fn spawn(path: PathBuf) -> io::Result<Self> {
        let (sender, receiver) = mpsc::channel();
        thread::Builder::new()
            .name("asset-loader".into())
            .spawn(move || {
                log::info!("loading clock asset from {}", path.display());
                // The receiver only disappears when the app is shutting down
                let _ = sender.send(load_clock_file(&path));
            })?;
        Ok(Self { receiver })
    }

    /// Result of the load, once it has finished
    pub fn poll(&self) -> Option<Result<ClockModel, AssetError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(AssetError::Unavailable(
                "loader thread exited without a result".into(),
            ))),
        }
    }
}
