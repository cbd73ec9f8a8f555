use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("pruvo")
        .about("Authentication and proof-progress API for the graph theory visualization app")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8000")
                .env("PRUVO_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("supabase-url")
                .long("supabase-url")
                .help("Base URL of the Supabase project, example: https://<project>.supabase.co")
                .env("PRUVO_SUPABASE_URL")
                .required(true),
        )
        .arg(
            Arg::new("supabase-key")
                .long("supabase-key")
                .help("Supabase service key used for the apikey and Authorization headers")
                .env("PRUVO_SUPABASE_KEY")
                .required(true),
        )
        .arg(
            Arg::new("origin")
                .long("origin")
                .help("Web origin allowed by CORS (credentials are allowed for it)")
                .default_value("http://localhost:3000")
                .env("PRUVO_ALLOW_ORIGIN"),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("PRUVO_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}
