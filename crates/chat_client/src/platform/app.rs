use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use agent_logging::{agent_info, agent_warn};
use status_core::{update, AppState, Msg};

use super::cli::Args;
use super::effects::EffectRunner;
use super::input::{parse_line, InputCommand};
use super::logging;
use super::ui;
use super::ui::terminal::TerminalSurface;

/// Everything the main loop reacts to.
pub enum AppEvent {
    Core(Msg),
    Notice(String),
    Quit,
}

pub fn run_app(args: Args) -> anyhow::Result<()> {
    logging::initialize(args.log.into());
    let config = args.client_config();
    agent_info!("agent client starting against {}", config.endpoint);

    let mut surface = TerminalSurface::new(io::stdout());
    surface.apply(&ui::layout::initial_commands(&config.endpoint))?;

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let runner = EffectRunner::new(config, event_tx.clone());
    if let Some(path) = &args.replay {
        runner.replay(path.clone(), args.replay_interval());
    }
    // A replay keeps running after stdin closes; quit with /quit or Ctrl-C.
    spawn_input_thread(event_tx, args.replay.is_none());

    let mut state = AppState::new();
    surface.apply(&ui::render::render(&state.view()))?;

    while let Ok(event) = event_rx.recv() {
        match event {
            AppEvent::Core(msg) => {
                state = dispatch(state, msg, &runner);
                if state.consume_dirty() {
                    surface.apply(&ui::render::render(&state.view()))?;
                }
            }
            AppEvent::Notice(text) => surface.notice(&text)?,
            AppEvent::Quit => break,
        }
    }

    agent_info!("agent client exiting");
    Ok(())
}

fn dispatch(state: AppState, msg: Msg, runner: &EffectRunner) -> AppState {
    let (state, effects) = update(state, msg);
    agent_logging::set_turn(state.turn());
    runner.run(effects);
    state
}

fn spawn_input_thread(event_tx: mpsc::Sender<AppEvent>, quit_on_eof: bool) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    agent_warn!("stdin read failed: {}", err);
                    break;
                }
            };
            for event in input_events(&line) {
                if event_tx.send(event).is_err() {
                    return;
                }
            }
        }
        if quit_on_eof {
            let _ = event_tx.send(AppEvent::Quit);
        }
    });
}

fn input_events(line: &str) -> Vec<AppEvent> {
    match parse_line(line) {
        Ok(InputCommand::Chat(text)) => vec![
            AppEvent::Core(Msg::InputChanged(text)),
            AppEvent::Core(Msg::ChatSubmitted { at: Instant::now() }),
        ],
        Ok(InputCommand::Upload(path)) => vec![AppEvent::Core(Msg::UploadRequested { path })],
        Ok(InputCommand::Help) => vec![AppEvent::Notice(ui::layout::help_text())],
        Ok(InputCommand::Quit) => vec![AppEvent::Quit],
        Ok(InputCommand::Empty) => Vec::new(),
        Err(err) => vec![AppEvent::Notice(err.to_string())],
    }
}
