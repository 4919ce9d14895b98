use crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    fs,
    io::{self, IsTerminal, Write},
    path::Path,
    process::ExitCode,
};

use clap::Parser;
use dynmenu::{
    config::Config,
    keymap,
    read_items,
    render::{self, TerminalMeasure, Theme},
    Action, Error, Result, Session, Status,
};

mod cli;

use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.display_version {
        println!("dynmenu {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(Status::Accepted) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            log::error!("{err}");
            eprintln!("dynmenu: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<Status> {
    init_logging(cli.verbosity, cli.log_file.as_deref())?;
    let config = Config::load(cli.config_file.as_deref(), &cli.overrides())?;
    let theme = Theme::from_colors(&config.colors)?;

    let items = read_items(io::stdin().lock());
    let item_count = items.len();
    ensure_tty_stdin().map_err(Error::Terminal)?;

    let (mut terminal, guard) = setup_terminal().map_err(Error::Terminal)?;
    let size = terminal.size()?;
    let mut rows = render::fit_rows(config.lines, item_count, size.height);
    let layout = render::menu_layout(rows, size.width, &config.prompt);
    let mut session = Session::new(
        items,
        config.session_config(layout),
        Box::new(TerminalMeasure),
    );

    let stdout = io::stdout();
    let stream = !stdout.is_terminal();
    let mut output = Output::new(stdout.lock(), stream);
    let mut force_draw = false;
    loop {
        output.push(session.take_output(), session.status().is_terminal())?;
        if session.status().is_terminal() {
            break;
        }

        if session.take_redraw() | std::mem::take(&mut force_draw) {
            let state = session.visible_state();
            terminal.draw(|frame| {
                let area = render::menu_area(frame.area(), rows, config.bottom);
                render::draw_menu(frame, area, &state, &theme, rows > 0);
            })?;
        }

        match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if let Some(action) = keymap::action_for(key) {
                    session.handle(action);
                }
            }
            Event::Paste(text) => {
                let line = text.lines().next().unwrap_or_default();
                session.handle(Action::Insert(line.as_bytes().to_vec()));
            }
            Event::Resize(width, height) => {
                rows = render::fit_rows(config.lines, item_count, height);
                session.set_layout(render::menu_layout(rows, width, &config.prompt));
                terminal.clear()?;
                force_draw = true;
            }
            _ => {}
        }
    }

    drop(terminal);
    drop(guard);
    output.finish()?;
    log::debug!("session ended: {:?}", session.status());
    Ok(session.status())
}

/// Destination for emitted lines.
///
/// While the menu owns the terminal, anything written to a terminal stdout
/// would land on the alternate screen. Lines are held back until
/// [`Output::finish`] unless stdout is a pipe, where multi-accepted lines are
/// passed on as they come. The final line always waits for teardown.
struct Output<W> {
    writer: W,
    stream: bool,
    pending: Vec<Vec<u8>>,
}

impl<W: Write> Output<W> {
    fn new(writer: W, stream: bool) -> Self {
        Self {
            writer,
            stream,
            pending: Vec::new(),
        }
    }

    fn push(&mut self, lines: Vec<Vec<u8>>, finished: bool) -> io::Result<()> {
        if finished || !self.stream {
            self.pending.extend(lines);
            return Ok(());
        }
        self.write_lines(lines)
    }

    fn finish(&mut self) -> io::Result<()> {
        let pending = std::mem::take(&mut self.pending);
        self.write_lines(pending)
    }

    fn write_lines(&mut self, lines: Vec<Vec<u8>>) -> io::Result<()> {
        for line in lines {
            self.writer.write_all(&line)?;
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()
    }
}

fn init_logging(verbosity: u8, log_file: Option<&Path>) -> Result<()> {
    let level = match verbosity {
        0 => "off",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));
    if let Some(path) = log_file {
        let file = fs::File::create(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    let _ = builder.try_init();
    Ok(())
}

/// Items arrive on stdin, so keyboard input has to come from the controlling
/// terminal instead.
fn ensure_tty_stdin() -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::io::AsRawFd;

        if io::stdin().is_terminal() {
            return Ok(());
        }

        let tty = fs::File::open("/dev/tty")?;
        let result = unsafe { libc::dup2(tty.as_raw_fd(), libc::STDIN_FILENO) };
        if result == -1 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

struct TerminalGuard {
    keyboard_enhanced: bool,
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.keyboard_enhanced {
            let _ = execute!(io::stderr(), PopKeyboardEnhancementFlags);
        }
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), DisableBracketedPaste, LeaveAlternateScreen);
    }
}

fn setup_terminal() -> io::Result<(Terminal<CrosstermBackend<io::Stderr>>, TerminalGuard)> {
    enable_raw_mode()?;
    let mut guard = TerminalGuard {
        keyboard_enhanced: false,
    };
    execute!(io::stderr(), EnterAlternateScreen, EnableBracketedPaste)?;
    // Ctrl+Enter and Shift+Enter are only distinguishable with the kitty
    // keyboard protocol.
    if matches!(supports_keyboard_enhancement(), Ok(true)) {
        execute!(
            io::stderr(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
        guard.keyboard_enhanced = true;
    }
    let backend = CrosstermBackend::new(io::stderr());
    let terminal = Terminal::new(backend)?;
    Ok((terminal, guard))
}
