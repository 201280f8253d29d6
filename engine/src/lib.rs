use std::path::Path;

use winit::event_loop::{ControlFlow, EventLoop};

use config::ViewerConfig;
use error::RunError;
use game::{assets::gltf_import, sim::Sim};
use main::window::MainWindow;

pub mod config;
pub mod error;
pub mod game;
pub mod main;

/// Loads the model, opens the window and runs until it is closed.
/// Nothing is shown if the model fails to load.
pub fn run(model_path: impl AsRef<Path>, config: ViewerConfig) -> Result<(), RunError> {
    let mut model = gltf_import::load(model_path)?;
    model.start(config.initial_clip, config.play_animation, config.time_wrap);
    for (idx, name) in model.clip_names().enumerate() {
        log::debug!("clip {}: {}", idx, name);
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut window = MainWindow::new(Sim::new(model), config);
    event_loop.run_app(&mut window)?;
    window.into_result()
}
