mod cli;
mod logger;
mod view;

use std::{
    process::ExitCode,
    time::{Duration, Instant},
};

use beat_meter::{
    cpal::StreamError,
    fetcher::{input_device_names, Fetcher, SystemAudioFetcher},
    Session, SessionError, Timer,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent};
use tracing::{error, info, warn};

use crate::view::View;

/// Time between two frames.
const FRAME_TIME: Duration = Duration::from_millis(1000 / 60);

fn main() -> std::io::Result<ExitCode> {
    let args = cli::parse();
    logger::init(&args.log_file)?;

    if args.list_devices {
        return list_devices();
    }

    let mut session = match init_session(&args) {
        Ok(session) => session,
        Err(err) => {
            error!("{}", err);
            eprintln!("Could not init microphone: {}", err);
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut terminal = ratatui::init();
    let result = run(&mut terminal, &mut session, args.refresh);
    ratatui::restore();

    result.map(|_| ExitCode::SUCCESS)
}

fn init_session(args: &cli::Args) -> Result<Session, SessionError> {
    let on_stream_error = |err: StreamError| warn!("Audio stream error: {}", err);

    let fetcher: Box<dyn Fetcher> = match &args.device {
        Some(name) => SystemAudioFetcher::with_device_name(name, on_stream_error)?,
        None => SystemAudioFetcher::default(on_stream_error)?,
    };

    let config = args.session_config();
    info!("{:?}", config);

    Session::new(fetcher, config)
}

/// Runs the detection task every frame and the refresh task every `refresh` milliseconds.
fn run(
    terminal: &mut ratatui::DefaultTerminal,
    session: &mut Session,
    refresh: f64,
) -> std::io::Result<()> {
    let start = Instant::now();
    let mut refresh_timer = Timer::new(refresh);
    let mut view = View::new();

    loop {
        let now = start.elapsed().as_secs_f64() * 1000.;

        view.report = Some(session.on_frame(now));
        if refresh_timer.is_due(now) {
            view.readout = Some(session.on_tick(now));
        }

        terminal.draw(|frame| view.draw(frame, session.analyser().frequency_data()))?;

        if event::poll(FRAME_TIME)? {
            if let Event::Key(KeyEvent { code, .. }) = event::read()? {
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('r') => {
                        info!("Reset");
                        session.reset();
                        view.readout = Some(session.on_tick(now));
                    }
                    KeyCode::Char('v') => view.show_visualiser = !view.show_visualiser,
                    _ => {}
                }
            }
        }
    }

    Ok(())
}

fn list_devices() -> std::io::Result<ExitCode> {
    match input_device_names() {
        Ok(names) if names.is_empty() => println!("No input devices found."),
        Ok(names) => {
            for name in names {
                println!("{}", name);
            }
        }
        Err(err) => {
            eprintln!("{}", err);
            return Ok(ExitCode::FAILURE);
        }
    }

    Ok(ExitCode::SUCCESS)
}
