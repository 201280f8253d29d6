use std::{sync::Arc, time::Instant};

use pollster::FutureExt as _;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{
    config::ViewerConfig,
    error::RunError,
    game::sim::{Command, Sim},
    main::{wgpu_context::WgpuContext, world::Renderer},
};

/// Viewer key bindings. Repeats are ignored so holding a key doesn't cycle clips.
pub fn key_command(event: &KeyEvent) -> Option<Command> {
    if event.state != ElementState::Pressed || event.repeat {
        return None;
    }
    match event.physical_key {
        PhysicalKey::Code(code) => command_for_key(code),
        PhysicalKey::Unidentified(_) => None,
    }
}

pub fn command_for_key(code: KeyCode) -> Option<Command> {
    match code {
        KeyCode::Space => Some(Command::NextClip),
        KeyCode::KeyP => Some(Command::TogglePlayback),
        KeyCode::Escape => Some(Command::Close),
        _ => None,
    }
}

struct RenderContext {
    renderer: Renderer,
    wgpu_context: WgpuContext,
}

pub struct MainWindow {
    config: ViewerConfig,
    sim: Sim,
    render_context: Option<RenderContext>,
    last_frame: Option<Instant>,
    fatal: Option<RunError>,
}

impl MainWindow {
    pub fn new(sim: Sim, config: ViewerConfig) -> Self {
        Self {
            config,
            sim,
            render_context: None,
            last_frame: None,
            fatal: None,
        }
    }

    /// The error that stopped the event loop, if any.
    pub fn into_result(self) -> Result<(), RunError> {
        match self.fatal {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: RunError) {
        log::error!("{}", error);
        self.fatal = Some(error);
        event_loop.exit();
    }

    fn create_render_context(&self, event_loop: &ActiveEventLoop) -> Result<RenderContext, RunError> {
        let attributes = Window::default_attributes()
            .with_title(self.config.window_title.clone())
            .with_inner_size(LogicalSize::new(self.config.window_width, self.config.window_height))
            .with_resizable(self.config.resizable);
        let window = Arc::new(event_loop.create_window(attributes)?);
        let wgpu_context = WgpuContext::new(window, self.config.present_mode()).block_on()?;
        let renderer = Renderer::new(&wgpu_context, self.sim.model(), &self.config)?;
        Ok(RenderContext { renderer, wgpu_context })
    }

    fn resize(&mut self, physical_size: PhysicalSize<u32>) {
        if let Some(render_context) = self.render_context.as_mut() {
            if render_context.wgpu_context.resize(physical_size) {
                render_context.renderer.resize(&render_context.wgpu_context);
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let dt = self
            .last_frame
            .map_or(0.0, |last| now.duration_since(last).as_secs_f32());
        self.last_frame = Some(now);

        self.sim.update(dt);
        if self.sim.close_requested() {
            event_loop.exit();
            return;
        }
        let Some(render_context) = self.render_context.as_mut() else {
            return;
        };
        match render_context
            .renderer
            .render(&render_context.wgpu_context, &self.sim.pose().skinning)
        {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost, reconfiguring");
                render_context.wgpu_context.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fail(event_loop, RunError::Gpu("out of memory".to_string()));
            }
            Err(e) => log::warn!("render error: {:?}", e),
        }
    }
}

impl ApplicationHandler for MainWindow {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.render_context.is_some() {
            return;
        }
        match self.create_render_context(event_loop) {
            Ok(render_context) => self.render_context = Some(render_context),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.sim.push(Command::Close),
            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(command) = key_command(&event) {
                    self.sim.push(command);
                }
            }
            WindowEvent::Resized(physical_size) => self.resize(physical_size),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self
                    .render_context
                    .as_ref()
                    .map(|render_context| render_context.wgpu_context.window.inner_size())
                {
                    self.resize(size);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // a minimized window may get no redraws, Close still has to land
        self.sim.apply_pending();
        if self.sim.close_requested() {
            event_loop.exit();
            return;
        }
        if let Some(render_context) = self.render_context.as_ref() {
            render_context.wgpu_context.window.request_redraw();
        }
    }
}
