//! Sonic Rings - live microphone spectrum as concentric rings
//!
//! Each frame pulls one spectrum from the microphone, pushes it into the
//! history and redraws every ring from it: the newest frame is the innermost
//! ring, older frames fade outward.

use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use sonic_rings::analysis::{AnalysisSession, FrameStats};
use sonic_rings::audio::{list_input_devices, MicrophoneSource};
use sonic_rings::camera::CameraSystem;
use sonic_rings::cli::Args;
use sonic_rings::controls::{self, Adjustment, Control};
use sonic_rings::params::Settings;
use sonic_rings::rendering::{RenderSystem, Uniforms};
use sonic_rings::rings::RingGenerator;

const WINDOW_TITLE: &str = "Sonic Rings";

/// Stats readout refresh interval
const TITLE_INTERVAL: Duration = Duration::from_millis(250);

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,
    camera: CameraSystem,

    // Analysis pipeline; None while idle (no input)
    session: Option<AnalysisSession<MicrophoneSource>>,
    generator: RingGenerator,

    // Configuration
    settings: Settings,
    device_name: Option<String>,

    // Time tracking
    start_time: Instant,
    last_title_update: Instant,
}

impl App {
    fn new(settings: Settings, device_name: Option<String>) -> Self {
        let camera = CameraSystem::new(&settings.render);
        Self {
            window: None,
            render_system: None,
            camera,
            session: None,
            generator: RingGenerator::new(),
            settings,
            device_name,
            start_time: Instant::now(),
            last_title_update: Instant::now(),
        }
    }

    /// Start microphone analysis; failure leaves the app idle
    fn start_session(&mut self) {
        let source = match MicrophoneSource::new(
            self.device_name.clone(),
            &self.settings.analysis,
            self.settings.visualizer.smoothing_time_constant,
        ) {
            Ok(source) => source,
            Err(e) => {
                log::error!("Invalid analysis settings: {}", e);
                return;
            }
        };

        match AnalysisSession::start(source, &self.settings.visualizer, &self.settings.analysis) {
            Ok(session) => self.session = Some(session),
            Err(e) => {
                log::error!("{}", e);
                log::warn!("No audio input; rings stay idle");
            }
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        let window_attributes = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.settings.render.window_width,
                self.settings.render.window_height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let render_system = match pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            &self.settings.render,
            self.settings.visualizer.ring_count,
        )) {
            Ok(render_system) => render_system,
            Err(e) => {
                log::error!("{}", e);
                event_loop.exit();
                return;
            }
        };

        self.start_session();

        println!("\nSonic Rings is running!");
        println!("  Up/Down     sensitivity");
        println!("  Left/Right  ring count");
        println!("  [ / ]       wave smoothing");
        println!("  - / =       time decay");
        println!("  , / .       ring spacing");
        println!("  F / R       base radius");
        println!("  Z / A       wave amplitude");
        println!("  T           light/dark theme");
        println!("  C           next color");
        println!("  Esc         quit\n");

        self.window = Some(window);
        self.render_system = Some(render_system);
        self.start_time = Instant::now();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::Resized(size) => {
                if let Some(render_system) = self.render_system.as_mut() {
                    render_system.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        ..
                    },
                ..
            } => {
                if code == KeyCode::Escape {
                    self.shutdown(event_loop);
                } else if code == KeyCode::KeyT {
                    self.toggle_theme();
                } else if let Some(control) = control_for_key(code) {
                    self.apply_control(control);
                }
            }
            WindowEvent::RedrawRequested => self.render_frame(event_loop),
            _ => {}
        }
    }
}

impl App {
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(session) = self.session.take() {
            session.stop();
        }
        event_loop.exit();
    }

    fn toggle_theme(&mut self) {
        let background = controls::toggle_theme(&mut self.settings.render);
        if let Some(render_system) = self.render_system.as_mut() {
            render_system.set_background(background);
        }
        log::info!("Background {}", background);
    }

    fn apply_control(&mut self, control: Control) {
        let mut candidate = self.settings.visualizer.clone();
        match controls::apply(&mut candidate, control) {
            Adjustment::Unchanged => return,
            Adjustment::Updated => {}
            Adjustment::Resized => {
                if let Some(session) = self.session.as_mut() {
                    if let Err(e) = session.reconfigure(&candidate) {
                        log::warn!("Ignoring {:?}: {}", control, e);
                        return;
                    }
                }
                if let Some(render_system) = self.render_system.as_mut() {
                    render_system.set_ring_count(candidate.ring_count);
                }
            }
        }
        if let Err(e) = candidate.validate() {
            log::warn!("Ignoring {:?}: {}", control, e);
            return;
        }

        let v = &candidate;
        log::info!(
            "{:?}: color {} sensitivity {:.1} rings {} spacing {:.3} radius {:.2} amplitude {:.2} wave smoothing {:.2} time decay {:.2}",
            control,
            v.base_color,
            v.sensitivity,
            v.ring_count,
            v.ring_spacing,
            v.base_radius,
            v.wave_amplitude,
            v.waveform_smoothing,
            v.smoothing_time_constant
        );
        self.settings.visualizer = candidate;
    }

    /// Tick the pipeline and draw one frame
    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(render_system) = self.render_system.as_mut() else {
            return;
        };

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;

        if let Some(session) = self.session.as_mut() {
            let stats = session.tick(&self.settings.visualizer);
            let frame = self
                .generator
                .generate(session.history(), &self.settings.visualizer, elapsed_ms);
            frame.submit_to(render_system);

            if self.last_title_update.elapsed() >= TITLE_INTERVAL {
                self.last_title_update = Instant::now();
                log::debug!(
                    "energy {:.1} peak bin {} after {} ticks",
                    stats.energy,
                    stats.dominant_bin,
                    session.ticks()
                );
                if let Some(window) = &self.window {
                    window.set_title(&stats_title(&stats, session.dominant_frequency_hz()));
                }
            }
        }

        let view_proj = self.camera.view_proj(render_system.aspect_ratio());
        render_system.update_uniforms(&Uniforms {
            view_proj: view_proj.to_cols_array_2d(),
        });

        match render_system.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    render_system.resize(size.width, size.height);
                }
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
    }
}

fn stats_title(stats: &FrameStats, dominant_hz: Option<f32>) -> String {
    let peak = match dominant_hz {
        Some(hz) => format!("bin {} (~{:.0} Hz)", stats.dominant_bin, hz),
        None => format!("bin {}", stats.dominant_bin),
    };
    format!(
        "{} | energy {:.1} ({:.0}%) | peak {}",
        WINDOW_TITLE,
        stats.energy,
        stats.energy_percent(),
        peak
    )
}

fn control_for_key(code: KeyCode) -> Option<Control> {
    let control = match code {
        KeyCode::ArrowUp => Control::SensitivityUp,
        KeyCode::ArrowDown => Control::SensitivityDown,
        KeyCode::ArrowRight => Control::MoreRings,
        KeyCode::ArrowLeft => Control::FewerRings,
        KeyCode::BracketRight => Control::WaveSmoothingUp,
        KeyCode::BracketLeft => Control::WaveSmoothingDown,
        KeyCode::Equal => Control::TimeDecayUp,
        KeyCode::Minus => Control::TimeDecayDown,
        KeyCode::Period => Control::SpacingUp,
        KeyCode::Comma => Control::SpacingDown,
        KeyCode::KeyR => Control::RadiusUp,
        KeyCode::KeyF => Control::RadiusDown,
        KeyCode::KeyA => Control::AmplitudeUp,
        KeyCode::KeyZ => Control::AmplitudeDown,
        KeyCode::KeyC => Control::NextColor,
        _ => return None,
    };
    Some(control)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.list_devices {
        match list_input_devices() {
            Ok(devices) if devices.is_empty() => println!("No input devices found"),
            Ok(devices) => {
                println!("Input devices:");
                for device in devices {
                    let marker = if device.is_default { " (default)" } else { "" };
                    println!("  {}{}", device.name, marker);
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let settings = match args.load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    println!("Sonic Rings - live spectrum rings");
    println!("Initializing systems...\n");

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            eprintln!("Error: failed to create event loop: {}", e);
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(settings, args.device);
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", e);
    }
}
