use clap::builder::{styling::AnsiColor, Styles};
use clap::Parser;

const ABOUT: &str = "OpenWeatherMap TUI";

const LONG_ABOUT: &str = "
TUI for viewing current conditions and a 5-day forecast from OpenWeatherMap.

Bring your own API key (the free tier is fine): save it once with --api-key, or
paste it into the key field inside the UI. The key and the last searched city
are remembered, so subsequent runs of `owm` pick up where you left off.

Inside the UI: type a city and press Enter, Tab to switch to the API key field,
F2 to look up weather for your current (IP-based) location, Esc to quit.
";

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Green.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, Debug)]
#[command(version, styles=STYLES, about=ABOUT, long_about = LONG_ABOUT)]
pub struct Args {
    #[arg(help = "City to query immediately (e.g. \"Madison\", \"Oslo,NO\")")]
    pub city: Option<String>,

    #[arg(long, help = "Save this OpenWeatherMap API key and use it")]
    pub api_key: Option<String>,

    #[arg(long, help = "Query weather for the current (IP-based) location")]
    pub geo: bool,
}
