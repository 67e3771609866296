use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::Local;
use posture_core::{update, AppState, Msg, Notice};
use posture_logging::{posture_info, posture_warn};

use super::config::AppConfig;
use super::effects::EffectRunner;
use super::files;
use super::ui::commands::{self, Command, HELP_TEXT};
use super::ui::render;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Everything the main loop reacts to, from any thread.
pub enum LoopEvent {
    Msg(Msg),
    Command(Command),
    InputClosed,
}

pub fn run_app() -> anyhow::Result<()> {
    let config = AppConfig::load_from_env()?;
    posture_logging::initialize(
        config.log_destination,
        config.level_filter(),
        &config.log_file,
    );
    posture_info!("posture_app starting backend={}", config.backend_url);

    let (loop_tx, loop_rx) = mpsc::channel::<LoopEvent>();
    let runner = EffectRunner::new(&config, loop_tx.clone())?;
    spawn_ticker(loop_tx.clone())?;
    spawn_input_reader(loop_tx)?;

    println!("{HELP_TEXT}");
    let mut controller = Controller::new(runner);
    controller.dispatch(Msg::AppStarted);
    controller.flush_render();

    while let Ok(event) = loop_rx.recv() {
        match event {
            LoopEvent::Msg(Msg::Tick) => {
                controller.dispatch(Msg::Tick);
                controller.flush_render();
            }
            LoopEvent::Msg(msg) => controller.dispatch(msg),
            LoopEvent::Command(Command::Quit) | LoopEvent::InputClosed => break,
            LoopEvent::Command(command) => {
                controller.handle_command(command);
                controller.flush_render();
            }
        }
    }

    posture_info!("posture_app shutting down");
    controller.shutdown();
    Ok(())
}

struct Controller {
    state: AppState,
    runner: EffectRunner,
    render_pending: bool,
    notice_stamp: Option<(Notice, String)>,
}

impl Controller {
    fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
            render_pending: true,
            notice_stamp: None,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            self.render_pending = true;
        }
        self.state = state;
        self.runner.enqueue(effects);
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Empty | Command::Quit => {}
            Command::Help => println!("{HELP_TEXT}"),
            Command::Status => self.render_pending = true,
            Command::Unknown(text) => println!("Unknown command: {text} (type `help`)"),
            command => {
                let view = self.state.view();
                if let Some(label) = command.disabled_control(&view.controls) {
                    println!("{label} is unavailable right now.");
                    return;
                }
                if let Command::Open(path) = &command {
                    match files::read_selection(path) {
                        Ok(artifact) => self.dispatch(Msg::FileSelected(artifact)),
                        Err(err) => {
                            posture_warn!("File selection failed: {:#}", err);
                            println!("Could not open file: {err:#}");
                        }
                    }
                } else if let Some(msg) = command.to_msg() {
                    self.dispatch(msg);
                }
            }
        }
    }

    /// Print the frame if anything changed since the last one.
    fn flush_render(&mut self) {
        if !std::mem::take(&mut self.render_pending) {
            return;
        }
        let view = self.state.view();
        let stamp = match &view.notice {
            None => None,
            Some(notice) => match &self.notice_stamp {
                Some((stamped, stamp)) if stamped == notice => Some(stamp.clone()),
                _ => Some(Local::now().format("%H:%M:%S").to_string()),
            },
        };
        self.notice_stamp = view.notice.clone().zip(stamp.clone());

        println!("----------------------------------------");
        for line in render::render(&view, stamp.as_deref()) {
            println!("{line}");
        }
    }

    fn shutdown(self) {
        self.runner.shutdown();
    }
}

fn spawn_ticker(loop_tx: mpsc::Sender<LoopEvent>) -> io::Result<()> {
    thread::Builder::new()
        .name("posture-tick".to_string())
        .spawn(move || {
            // Also drives render coalescing.
            while loop_tx.send(LoopEvent::Msg(Msg::Tick)).is_ok() {
                thread::sleep(TICK_INTERVAL);
            }
        })?;
    Ok(())
}

fn spawn_input_reader(loop_tx: mpsc::Sender<LoopEvent>) -> io::Result<()> {
    thread::Builder::new()
        .name("posture-input".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if loop_tx
                    .send(LoopEvent::Command(commands::parse(&line)))
                    .is_err()
                {
                    return;
                }
            }
            let _ = loop_tx.send(LoopEvent::InputClosed);
        })?;
    Ok(())
}
