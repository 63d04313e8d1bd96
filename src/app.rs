use std::io;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDateTime};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame, Terminal,
};
use tokio::runtime::Runtime;

use crate::cli::Args;
use crate::errors::Error;
use crate::geo;
use crate::owm::{current::Current, forecast::Sample, Api, Location};
use crate::store::{self, KeyValue};
use crate::summary;

const MISSING: &str = "--";

/// Which input field receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    City,
    ApiKey,
}

/// The last successful query, ready for rendering.
#[derive(Debug)]
pub struct WeatherView {
    pub current: Current,
    pub daily: Vec<Sample>,
}

/// Action requested on the command line, performed once before the event
/// loop starts.
#[derive(Debug, Clone, Copy)]
enum Startup {
    Query,
    Geo,
}

pub struct App<S: KeyValue> {
    store: S,
    api: Option<Api>,
    focus: Focus,
    city_input: String,
    key_input: String,
    message: Option<String>,
    loading: bool,
    view: Option<WeatherView>,
    startup: Option<Startup>,
}

impl<S: KeyValue> App<S> {
    pub fn new(mut store: S, args: &Args) -> Result<Self, Error> {
        if let Some(key) = args.api_key.as_deref() {
            store.set(store::API_KEY, key.trim())?;
        }

        let api = match store.get(store::API_KEY) {
            Some(key) if !key.is_empty() => Some(Api::new(key)?),
            _ => None,
        };

        let city_input = args
            .city
            .clone()
            .or_else(|| store.get(store::LAST_CITY).map(str::to_owned))
            .unwrap_or_default();

        let startup = if args.city.is_some() {
            Some(Startup::Query)
        } else if args.geo {
            Some(Startup::Geo)
        } else {
            None
        };

        let message = if api.is_some() {
            Some("API key loaded. You can now search for weather.".to_string())
        } else {
            Some("Enter your OpenWeatherMap API key (Tab to reach the key field).".to_string())
        };

        Ok(Self {
            store,
            api,
            focus: Focus::City,
            city_input,
            key_input: String::new(),
            message,
            loading: false,
            view: None,
            startup,
        })
    }

    /// Validates and saves the key field, making the client available.
    pub fn submit_api_key(&mut self) -> Result<(), Error> {
        let key = self.key_input.trim().to_owned();
        if key.is_empty() {
            return Err(Error::MissingApiKey);
        }
        self.api = Some(Api::new(key.as_str())?);
        self.store.set(store::API_KEY, &key)?;
        self.key_input.clear();
        self.focus = Focus::City;
        self.message = Some("API key saved. You can now search for weather.".to_string());
        Ok(())
    }

    /// Queries current conditions + forecast for the city field and, on
    /// success, remembers the city for the next session.
    pub fn submit_city(&mut self, rt: &Runtime) -> Result<(), Error> {
        if self.api.is_none() {
            return Err(Error::MissingApiKey);
        }
        let city = self.city_input.trim().to_owned();
        if city.is_empty() {
            return Err(Error::MissingCity);
        }
        self.run_query(rt, Location::City(city.clone()))?;
        self.store.set(store::LAST_CITY, &city)?;
        Ok(())
    }

    /// Resolves the machine's coordinates and queries weather for them.
    pub fn locate_and_query(&mut self, rt: &Runtime) -> Result<(), Error> {
        if self.api.is_none() {
            return Err(Error::MissingApiKey);
        }
        let location = rt.block_on(geo::locate())?;
        self.run_query(rt, location)
    }

    fn run_query(&mut self, rt: &Runtime, location: Location) -> Result<(), Error> {
        let api = self.api.as_ref().ok_or(Error::MissingApiKey)?;
        let (current, forecast) = rt.block_on(api.query(&location))?;
        let today = Local::now().date_naive();
        let daily: Vec<Sample> = summary::daily_summaries(&forecast.list, today)?
            .into_iter()
            .cloned()
            .collect();
        self.view = Some(WeatherView { current, daily });
        self.message = None;
        Ok(())
    }

    fn report(&mut self, err: Error) {
        tracing::warn!("operation failed: {err}");
        self.message = Some(err.to_string());
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::City => Focus::ApiKey,
            Focus::ApiKey => Focus::City,
        };
    }

    fn active_input_mut(&mut self) -> &mut String {
        match self.focus {
            Focus::City => &mut self.city_input,
            Focus::ApiKey => &mut self.key_input,
        }
    }
}

pub fn run_app<B: Backend, S: KeyValue>(
    terminal: &mut Terminal<B>,
    rt: &Runtime,
    app: &mut App<S>,
) -> io::Result<()> {
    if let Some(action) = app.startup.take() {
        app.loading = true;
        terminal.draw(|f| ui(f, app))?;
        let res = match action {
            Startup::Query => app.submit_city(rt),
            Startup::Geo => app.locate_and_query(rt),
        };
        app.loading = false;
        if let Err(err) = res {
            app.report(err);
        }
    }

    loop {
        terminal.draw(|f| ui(f, app))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Esc => return Ok(()),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(())
            }
            KeyCode::Tab => app.toggle_focus(),
            KeyCode::Backspace => {
                app.active_input_mut().pop();
            }
            KeyCode::Enter => match app.focus {
                Focus::ApiKey => {
                    if let Err(err) = app.submit_api_key() {
                        app.report(err);
                    }
                }
                Focus::City => {
                    app.loading = true;
                    terminal.draw(|f| ui(f, app))?;
                    let res = app.submit_city(rt);
                    app.loading = false;
                    if let Err(err) = res {
                        app.report(err);
                    }
                }
            },
            KeyCode::F(2) => {
                app.loading = true;
                terminal.draw(|f| ui(f, app))?;
                let res = app.locate_and_query(rt);
                app.loading = false;
                if let Err(err) = res {
                    app.report(err);
                }
            }
            KeyCode::Char(c) => app.active_input_mut().push(c),
            _ => {}
        }
    }
}

fn input_field(title: &str, value: String, active: bool) -> Paragraph<'_> {
    let border = if active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Cyan)
    };
    Paragraph::new(value).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border)
            .title(Span::styled(title, Style::default().fg(Color::Yellow))),
    )
}

fn status_line<S: KeyValue>(app: &App<S>) -> Paragraph<'_> {
    if app.loading {
        return Paragraph::new(Span::styled(
            " Loading...",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    }
    match &app.message {
        Some(text) => Paragraph::new(Span::styled(
            format!(" {text}"),
            Style::default().fg(Color::Red),
        )),
        None => Paragraph::new(""),
    }
}

fn display_current_conditions(current: &Current) -> Table<'static> {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            " Current Conditions ",
            Style::default().fg(Color::Yellow),
        ))
        .title_alignment(Alignment::Left)
        .border_style(Style::default().fg(Color::Cyan))
        .border_type(BorderType::Rounded);

    let location = match current.sys.country.as_deref() {
        Some(country) => format!("{}, {}", current.name, country),
        None => current.name.clone(),
    };

    let conditions = current
        .condition()
        .map(|c| c.description.clone())
        .unwrap_or_else(|| MISSING.to_string());

    let visibility = current
        .visibility
        .map(|v| format!("{:.1} km", v / 1000.0))
        .unwrap_or_else(|| MISSING.to_string());

    let updated = DateTime::from_timestamp(current.dt, 0)
        .map(|dt| dt.with_timezone(&Local).format("%d-%m-%Y %H:%M").to_string())
        .unwrap_or_else(|| MISSING.to_string());

    let green = Style::default().fg(Color::Green);
    let mut rows = vec![Row::new(vec![Cell::from("")])];
    rows.push(Row::new(vec![
        Cell::from(" Location"),
        Cell::from(location).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    rows.push(Row::new(vec![
        Cell::from(" Temperature"),
        Cell::from(format!("{:.1} \u{00b0}C", current.main.temp)).style(green),
    ]));
    rows.push(Row::new(vec![
        Cell::from(" Feels like"),
        Cell::from(format!("{:.1} \u{00b0}C", current.main.feels_like)).style(green),
    ]));
    rows.push(Row::new(vec![
        Cell::from(" Humidity"),
        Cell::from(format!("{:.0}%", current.main.humidity)).style(green),
    ]));
    rows.push(Row::new(vec![
        Cell::from(" Pressure"),
        Cell::from(format!("{:.0} hPa", current.main.pressure)).style(green),
    ]));
    rows.push(Row::new(vec![
        Cell::from(" Wind"),
        Cell::from(format!("{:.1} m/s", current.wind.speed)).style(green),
    ]));
    rows.push(Row::new(vec![
        Cell::from(" Visibility"),
        Cell::from(visibility).style(green),
    ]));
    rows.push(Row::new(vec![
        Cell::from(" Conditions"),
        Cell::from(conditions).style(green),
    ]));
    rows.push(Row::new(vec![
        Cell::from(" Updated"),
        Cell::from(updated).style(Style::default().fg(Color::DarkGray)),
    ]));

    Table::new(rows, [Constraint::Length(13), Constraint::Length(28)]).block(block)
}

fn card_date(timestamp: &str) -> String {
    match NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S") {
        Ok(dt) => dt.format("%a %d %b").to_string(),
        Err(_) => timestamp
            .split(' ')
            .next()
            .unwrap_or(timestamp)
            .to_string(),
    }
}

fn forecast_card(sample: &Sample) -> Paragraph<'static> {
    let (description, icon) = match sample.condition() {
        Some(c) => (c.description.clone(), c.icon.clone()),
        None => (MISSING.to_string(), MISSING.to_string()),
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{:.0} \u{00b0}C", sample.main.temp),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::from(description),
        Line::from(Span::styled(icon, Style::default().fg(Color::DarkGray))),
    ];

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Cyan))
                .title(Span::styled(
                    format!(" {} ", card_date(&sample.timestamp)),
                    Style::default().fg(Color::Yellow),
                )),
        )
}

fn display_forecast(f: &mut Frame, area: Rect, daily: &[Sample]) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Ratio(1, summary::MAX_DAYS as u32);
            summary::MAX_DAYS
        ])
        .split(area);

    for (sample, chunk) in daily.iter().zip(chunks.iter()) {
        f.render_widget(forecast_card(sample), *chunk);
    }
}

fn ui<S: KeyValue>(f: &mut Frame, app: &App<S>) {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(f.area());

    let inputs = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(vert[0]);

    let key_display = if !app.key_input.is_empty() {
        "*".repeat(app.key_input.chars().count())
    } else if app.api.is_some() {
        "(saved)".to_string()
    } else {
        String::new()
    };

    f.render_widget(
        input_field(" City ", app.city_input.clone(), app.focus == Focus::City),
        inputs[0],
    );
    f.render_widget(
        input_field(" API Key ", key_display, app.focus == Focus::ApiKey),
        inputs[1],
    );

    f.render_widget(status_line(app), vert[1]);

    match &app.view {
        Some(view) => {
            let body = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(12), Constraint::Length(7)])
                .split(vert[2]);
            f.render_widget(display_current_conditions(&view.current), body[0]);
            display_forecast(f, body[1], &view.daily);
        }
        None => {
            let hint = Paragraph::new(vec![
                Line::from(""),
                Line::from("  No weather yet."),
                Line::from("  Type a city and press Enter, or press F2 for your location."),
            ])
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::Cyan)),
            );
            f.render_widget(hint, vert[2]);
        }
    }

    let help = Paragraph::new(Span::styled(
        " Enter search | Tab switch field | F2 my location | Esc quit",
        Style::default().fg(Color::DarkGray),
    ));
    f.render_widget(help, vert[3]);
}
