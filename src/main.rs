use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::{info, warn};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph};

use laliga_terminal::config::{AppConfig, app_cache_dir};
use laliga_terminal::dataset::{MatchTable, Role, load_match_table};
use laliga_terminal::demo_table::{DEMO_TEAMS, demo_table};
use laliga_terminal::export::{ExportViews, export_views, timestamped_path};
use laliga_terminal::state::{
    AppState, Screen, compare_title, season_title, team_columns_hint,
};

// Bars are integer-valued; floats are scaled by this before charting.
const BAR_SCALE: f64 = 100.0;
const DEMO_SEED: u64 = 2010;

struct App {
    state: AppState,
    table: MatchTable,
    export_dir: PathBuf,
    should_quit: bool,
}

impl App {
    fn new(config: &AppConfig) -> Self {
        let mut notes: Vec<String> = Vec::new();
        let (table, summary) = if config.demo {
            (demo_table(&config.seasons(), &DEMO_TEAMS, DEMO_SEED), None)
        } else {
            let (table, summary) = load_match_table(&config.data_dir, &config.seasons());
            if summary.nothing_loaded() {
                warn!(
                    "no season files loaded from {}, falling back to demo data",
                    config.data_dir.display()
                );
                notes.push("[WARN] No season data found; showing demo data".to_string());
                (
                    demo_table(&config.seasons(), &DEMO_TEAMS, DEMO_SEED),
                    Some(summary),
                )
            } else {
                (table, Some(summary))
            }
        };
        info!("match table ready: {} rows", table.len());

        let mut state = AppState::new(&table, config.league_title.clone());
        if let Some(summary) = summary.as_ref() {
            state.log_load_summary(summary);
        }
        state.demo = config.demo || !notes.is_empty();
        if config.demo {
            state.push_log("[INFO] Demo mode");
        }
        for note in notes {
            state.push_log(note);
        }

        Self {
            state,
            table,
            export_dir: config.export_dir.clone(),
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.state.screen = Screen::Team,
            KeyCode::Char('2') => self.state.screen = Screen::Compare,
            KeyCode::Char('3') => self.state.screen = Screen::Seasons,
            KeyCode::Tab => self.state.cycle_screen(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('s') => self.state.cycle_stat(),
            KeyCode::Char('m') if self.state.screen == Screen::Compare => {
                self.state.cycle_metric()
            }
            KeyCode::Char('a') if self.state.screen == Screen::Seasons => {
                self.state.toggle_season_mode()
            }
            KeyCode::Char('e') => self.export_current(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            _ => {}
        }
    }

    fn export_current(&mut self) {
        let path = timestamped_path(&self.export_dir);
        let team = self.state.team_view(&self.table);
        let ranking = self.state.compare_view(&self.table);
        let seasons = self.state.season_view(&self.table);
        let headline = self.state.season_headline(&seasons);
        let views = ExportViews {
            team: team.as_ref().map(|t| (t, self.state.team_option().label)),
            ranking: (&ranking, self.state.compare_option().label),
            seasons: (&seasons, self.state.season_option().label),
            headline: &headline,
        };

        match export_views(&path, &views) {
            Ok(report) => {
                info!("exported analysis to {}", report.path.display());
                self.state.push_log(format!(
                    "[INFO] Exported {} teams, {} seasons to {}",
                    report.ranking_rows,
                    report.season_rows,
                    report.path.display()
                ));
                self.state
                    .export
                    .finish(Some(report.path), "Export complete");
            }
            Err(err) => {
                warn!("export failed: {err:#}");
                self.state.push_log(format!("[WARN] Export failed: {err}"));
                self.state.export.finish(None, "Export failed");
            }
        }
    }
}

fn main() -> Result<()> {
    let mut config = AppConfig::load();
    let args: Vec<String> = std::env::args().skip(1).collect();
    config.apply_args(&args);
    let logger = init_file_logger(app_cache_dir());

    let mut app = App::new(&config);
    if let Err(err) = logger {
        app.state.push_log(format!("[WARN] File logging disabled: {err:#}"));
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

// The alternate screen owns stdout/stderr, so log records go to a file.
fn init_file_logger(dir: Option<PathBuf>) -> Result<PathBuf> {
    let dir = dir.context("no cache directory (HOME unset)")?;
    fs::create_dir_all(&dir).with_context(|| format!("create log dir {}", dir.display()))?;
    let path = dir.join("laliga_terminal.log");
    let file =
        File::create(&path).with_context(|| format!("create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("install logger")?;
    Ok(path)
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        app.state.export.clear_if_done_for(Instant::now(), 8);

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Team => render_team(frame, chunks[1], app),
        Screen::Compare => render_compare(frame, chunks[1], app),
        Screen::Seasons => render_seasons(frame, chunks[1], app),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let demo = if state.demo { " | DEMO DATA" } else { "" };
    let title = match state.screen {
        Screen::Team => format!(
            "{} ANALYSIS | TEAM | {}{demo}",
            state.league_title.to_uppercase(),
            state.team_option().label
        ),
        Screen::Compare => format!(
            "{} ANALYSIS | COMPARE | {} | {}{demo}",
            state.league_title.to_uppercase(),
            state.compare_option().label,
            state.compare_reducer().label()
        ),
        Screen::Seasons => format!(
            "{} ANALYSIS | SEASONS | {} | {}{demo}",
            state.league_title.to_uppercase(),
            state.season_option().label,
            state.season_mode.label()
        ),
    };
    let line1 = format!("  (o)  {title}");
    let line2 = "  /|\\".to_string();
    let line3 = "  / \\".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(state: &AppState) -> String {
    if state.export.active {
        let path = state
            .export
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        return format!("{} {path}", state.export.message);
    }
    let tabs = [Screen::Team, Screen::Compare, Screen::Seasons]
        .iter()
        .enumerate()
        .map(|(idx, s)| {
            if *s == state.screen {
                format!("[{} {}]", idx + 1, s.label())
            } else {
                format!("{} {}", idx + 1, s.label())
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    let keys = match state.screen {
        Screen::Team => "j/k Team | s Stat",
        Screen::Compare => "j/k Scroll | s Stat | m Metric",
        Screen::Seasons => "s Stat | a Absolute/Per Game",
    };
    format!("{tabs} | {keys} | e Export | ? Help | q Quit")
}

fn render_team(frame: &mut Frame, area: Rect, app: &App) {
    let state = &app.state;
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(30)])
        .split(area);

    let list_area = columns[0];
    let inner_height = list_area.height.saturating_sub(2) as usize;
    let (start, end) = visible_range(state.team_selected, state.teams.len(), inner_height);
    let lines: Vec<Line> = (start..end)
        .map(|idx| {
            let name = &state.teams[idx];
            if idx == state.team_selected {
                Line::styled(
                    format!("> {name}"),
                    Style::default().fg(Color::White).bg(Color::DarkGray),
                )
            } else {
                Line::raw(format!("  {name}"))
            }
        })
        .collect();
    let list =
        Paragraph::new(lines).block(Block::default().title("Teams").borders(Borders::ALL));
    frame.render_widget(list, list_area);

    let option = state.team_option();
    let Some(rate) = state.team_view(&app.table) else {
        let empty = Paragraph::new("No teams loaded")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(empty, columns[1]);
        return;
    };

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(3)])
        .split(columns[1]);

    let summary = Paragraph::new(format!(
        "Home: {}\nAway: {}\nColumns: {}",
        rate.home,
        rate.away,
        team_columns_hint(option.stat)
    ))
    .block(
        Block::default()
            .title(format!("{} by {}", option.label, rate.team))
            .borders(Borders::ALL),
    );
    frame.render_widget(summary, right[0]);

    let bars: Vec<Bar> = Role::ALL
        .iter()
        .map(|role| {
            let color = match role {
                Role::Home => Color::Blue,
                Role::Away => Color::Red,
            };
            scaled_bar(role.label(), rate.get(*role), Style::default().fg(color))
        })
        .collect();
    let chart = BarChart::default()
        .block(Block::default().title("Location").borders(Borders::ALL))
        .data(BarGroup::default().bars(&bars))
        .bar_width(9)
        .bar_gap(3);
    frame.render_widget(chart, right[1]);
}

fn render_compare(frame: &mut Frame, area: Rect, app: &App) {
    let state = &app.state;
    let option = state.compare_option();
    let ranking = state.compare_view(&app.table);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(48), Constraint::Min(20)])
        .split(area);

    if ranking.is_empty() {
        let empty = Paragraph::new("No matches loaded")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }

    let visible = columns[0].height.saturating_sub(3) as usize;
    let max_start = ranking.len().saturating_sub(visible.max(1));
    let start = state.compare_scroll.min(max_start);
    let end = (start + visible).min(ranking.len());

    let mut lines = vec![Line::styled(
        format!("{:>3} {:<18} {:>7} {:>7} {:>7}", "#", "Team", "Home", "Away", "Total"),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    for (idx, row) in ranking.rows()[start..end].iter().enumerate() {
        lines.push(Line::raw(format!(
            "{:>3} {:<18} {:>7.2} {:>7.2} {:>7.2}",
            start + idx + 1,
            truncate(&row.team, 18),
            row.home,
            row.away,
            row.total
        )));
    }
    let table = Paragraph::new(lines).block(
        Block::default()
            .title(compare_title(option.label, ranking.reducer))
            .borders(Borders::ALL),
    );
    frame.render_widget(table, columns[0]);

    let bars: Vec<Bar> = ranking.rows()[start..end]
        .iter()
        .map(|row| {
            scaled_bar(
                truncate(&row.team, 12),
                row.total,
                Style::default().fg(Color::Green),
            )
        })
        .collect();
    let chart = BarChart::default()
        .block(Block::default().title("Total").borders(Borders::ALL))
        .data(BarGroup::default().bars(&bars))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0);
    frame.render_widget(chart, columns[1]);
}

fn render_seasons(frame: &mut Frame, area: Rect, app: &App) {
    let state = &app.state;
    let option = state.season_option();
    let aggregate = state.season_view(&app.table);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let headline = Paragraph::new(state.season_headline(&aggregate))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(headline, rows[0]);

    let best = aggregate.best.as_ref().map(|b| &b.season);
    let bars: Vec<Bar> = aggregate
        .points
        .iter()
        .map(|p| {
            let style = if Some(&p.season) == best {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::Blue)
            };
            scaled_bar(p.season.short_label(), p.value, style)
        })
        .collect();
    let chart = BarChart::default()
        .block(
            Block::default()
                .title(season_title(option.label, aggregate.mode))
                .borders(Borders::ALL),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(7)
        .bar_gap(2);
    frame.render_widget(chart, rows[1]);
}

fn scaled_bar<'a>(label: impl Into<String>, value: f64, style: Style) -> Bar<'a> {
    let label: String = label.into();
    Bar::default()
        .label(Line::from(label))
        .value((value.max(0.0) * BAR_SCALE).round() as u64)
        .text_value(format_value(value))
        .style(style)
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn truncate(raw: &str, max: usize) -> String {
    if raw.chars().count() <= max {
        return raw.to_string();
    }
    raw.chars().take(max.saturating_sub(1)).chain(['…']).collect()
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let skip = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(skip)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "La Liga Analysis - Help",
        "",
        "Global:",
        "  1 / 2 / 3    Team / Compare / Seasons",
        "  Tab          Next screen",
        "  s            Cycle statistic",
        "  e            Export current views (.xlsx)",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Team:",
        "  j/k or ↑/↓   Select team",
        "",
        "Compare:",
        "  j/k or ↑/↓   Scroll ranking",
        "  m            Cycle metric (Mean/Median/Max/Min)",
        "",
        "Seasons:",
        "  a            Absolute / Per Game",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
