use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use std::io;
use std::time::{Duration, Instant};
use icpc_board::{Command, Engine, OutputEvent, Scoreboard, Submit};

const TEAMS: u32 = 24;
const PROBLEMS: u32 = 10;
const DURATION: u32 = 300;
const FREEZE_AT: u32 = 240;
const STATUSES: [&str; 4] = ["Accepted", "Wrong_Answer", "Runtime_Error", "Time_Limit_Exceed"];

/// Synthetic contest driven one minute per tick
struct Demo {
    engine: Engine,
    rng: u64,
    minute: u32,
    paused: bool,
    board: Scoreboard,
    log: Vec<String>,
}

impl Demo {
    fn new() -> Self {
        let mut engine = Engine::new();
        for t in 0..TEAMS {
            engine.process_command(Command::AddTeam(format!("team{t:02}")));
        }
        engine.process_command(Command::Start { duration: DURATION, problems: PROBLEMS });
        let board = engine.contest.scoreboard();
        Self {
            engine,
            rng: 12345,
            minute: 0,
            paused: false,
            board,
            log: Vec::new(),
        }
    }

    fn next(&mut self) -> u64 {
        self.rng = self.rng.wrapping_mul(6364136223846793005).wrapping_add(1);
        self.rng >> 33
    }

    /// Advance one contest minute: a few submissions, then a flush
    fn tick(&mut self) {
        if self.paused || self.minute >= DURATION {
            return;
        }
        self.minute += 1;

        let count = self.next() % 4;
        for _ in 0..count {
            let team = format!("team{:02}", self.next() % TEAMS as u64);
            let problem = (b'A' + (self.next() % PROBLEMS as u64) as u8) as char;
            // Roughly one in three attempts is accepted
            let status = if self.next() % 3 == 0 { STATUSES[0] } else { STATUSES[1 + (self.next() % 3) as usize] };
            self.engine.process_command(Command::Submit(Submit {
                problem,
                team,
                status: status.to_string(),
                time: self.minute,
            }));
        }

        if self.minute == FREEZE_AT {
            self.freeze();
        }
        self.engine.process_command(Command::Flush);
        self.board = self.engine.contest.scoreboard();
    }

    fn freeze(&mut self) {
        for event in self.engine.process_command(Command::Freeze) {
            if let OutputEvent::Rejected { reason, .. } = event {
                self.log.push(format!("freeze rejected: {reason}"));
            } else {
                self.log.push(format!("[{:3}] scoreboard frozen", self.minute));
            }
        }
    }

    fn scroll(&mut self) {
        for event in self.engine.process_command(Command::Scroll) {
            match event {
                OutputEvent::RankChanged(c) => self.log.push(format!(
                    "{} passes {} ({} solved, {} min)",
                    c.team, c.passed, c.solved, c.penalty
                )),
                OutputEvent::Scoreboard(board) => self.board = board,
                OutputEvent::Rejected { reason, .. } => self.log.push(format!("scroll rejected: {reason}")),
                _ => {}
            }
        }
    }
}

fn render_board(board: &Scoreboard) -> String {
    let mut out = String::new();
    for row in &board.rows {
        out.push_str(&format!(
            "{:>3} {:<8} {:>2} {:>5}  {}\n",
            row.rank,
            row.team,
            row.solved,
            row.penalty,
            row.cells.iter().map(|c| format!("{:>5}", c.to_string())).collect::<String>()
        ));
    }
    out
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut demo = Demo::new();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(100);

    loop {
        // Handle input
        if event::poll(Duration::from_millis(20))? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') => break,
                    KeyCode::Char(' ') => demo.paused = !demo.paused,
                    KeyCode::Char('f') => demo.freeze(),
                    KeyCode::Char('s') => demo.scroll(),
                    _ => {}
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            demo.tick();
            last_tick = Instant::now();
        }

        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .margin(1)
                .constraints(
                    [
                        Constraint::Length(3), // Header
                        Constraint::Min(10),   // Board + log
                    ]
                    .as_ref(),
                )
                .split(f.size());

            // 1. Header
            let state = if demo.engine.contest.is_frozen() { "FROZEN" } else { "LIVE" };
            let header = Block::default().borders(Borders::ALL).title("ICPC Board Demo");
            let title = Paragraph::new(format!(
                "Minute {:3}/{} | {} | pending {} | 'f' freeze  's' scroll  space pause  'q' quit",
                demo.minute,
                DURATION,
                state,
                demo.engine.contest.pending_count()
            ))
            .block(header)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Cyan));
            f.render_widget(title, chunks[0]);

            // 2. Board and scroll log
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
                .split(chunks[1]);

            let board_color = if demo.engine.contest.is_frozen() { Color::Blue } else { Color::Green };
            let board_widget = Paragraph::new(render_board(&demo.board))
                .block(Block::default().borders(Borders::ALL).title("STANDINGS").style(Style::default().fg(board_color)));
            f.render_widget(board_widget, body[0]);

            let visible = body[1].height.saturating_sub(2) as usize;
            let log_text = demo.log.iter().rev().take(visible).rev().cloned().collect::<Vec<_>>().join("\n");
            let log_widget = Paragraph::new(log_text)
                .block(Block::default().borders(Borders::ALL).title("EVENTS"))
                .style(Style::default().fg(Color::Yellow));
            f.render_widget(log_widget, body[1]);
        })?;
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    Ok(())
}
