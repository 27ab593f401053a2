use clap::{value_parser, Arg, ArgMatches};

pub fn parse_args() -> clap::Command {
    let cli = tracklog_device::cli::CommandBuilder::default().build();
    cli.name("tracklog")
        .author(clap::crate_authors!())
        .about("Record named waypoints from a serial GPS receiver")
        .arg(
            Arg::new("debug-mode")
                .value_name("debug-mode")
                .long("debug-mode")
                .action(clap::ArgAction::SetTrue)
                .help("Bypass the TUI and stream every valid fix to gps_log.txt. Useful for checking the receiver connection."),
        )
        .arg(
            Arg::new("log-file")
                .value_name("log-file")
                .long("log-file")
                .action(clap::ArgAction::SetTrue)
                .help("Log to file besides showing partial logs in the TUI"),
        )
        .arg(
            Arg::new("tui-rate")
                .value_name("tui-rate")
                .long("tui-rate")
                .required(false)
                .default_value("100")
                .value_parser(value_parser!(u64))
                .help("TUI refresh rate in milliseconds while waiting for input"),
        )
}

pub fn tui_rate(cli: &ArgMatches) -> u64 {
    cli.get_one::<u64>("tui-rate").copied().unwrap_or(100)
}

pub fn tui_debug_mode(cli: &ArgMatches) -> bool {
    cli.get_flag("debug-mode")
}

pub fn tui_log_to_file(cli: &ArgMatches) -> bool {
    cli.get_flag("log-file")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_default_off() {
        let cli = parse_args().try_get_matches_from(["tracklog"]).unwrap();
        assert!(!tui_debug_mode(&cli));
        assert!(!tui_log_to_file(&cli));
        assert_eq!(tui_rate(&cli), 100);
    }

    #[test]
    fn debug_mode_with_port() {
        let cli = parse_args()
            .try_get_matches_from(["tracklog", "--debug-mode", "-p", "/dev/ttyUSB1"])
            .unwrap();
        assert!(tui_debug_mode(&cli));
        let settings = tracklog_device::cli::Command::port_settings(&cli).unwrap();
        assert_eq!(settings.port_name.as_deref(), Some("/dev/ttyUSB1"));
    }
}
