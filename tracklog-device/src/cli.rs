use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgMatches};
use serialport::{FlowControl as SerialFlowControl, SerialPortBuilder};

pub const DEFAULT_BAUD: u32 = 57600;
pub const DEFAULT_TIMEOUT_MS: u64 = 200;
pub const DEFAULT_OUTPUT: &str = "log.csv";

pub struct CommandBuilder {
    command: clap::Command,
}

pub struct Command;

/// How to open the receiver. Kept for the whole run so a lost port is reopened
/// with the same settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PortSettings {
    /// `None` picks the first port the system reports
    pub port_name: Option<String>,
    pub baud_rate: u32,
    pub timeout: Duration,
    pub stop_bits: serialport::StopBits,
    pub data_bits: serialport::DataBits,
    pub parity: serialport::Parity,
}

impl Default for PortSettings {
    fn default() -> Self {
        Self {
            port_name: None,
            baud_rate: DEFAULT_BAUD,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            stop_bits: serialport::StopBits::One,
            data_bits: serialport::DataBits::Eight,
            parity: serialport::Parity::None,
        }
    }
}

impl PortSettings {
    pub fn builder(&self, port_name: &str) -> SerialPortBuilder {
        serialport::new(port_name, self.baud_rate)
            .stop_bits(self.stop_bits)
            .data_bits(self.data_bits)
            .timeout(self.timeout)
            .parity(self.parity)
            .flow_control(SerialFlowControl::None)
    }
}

impl Default for CommandBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandBuilder {
    pub fn new() -> Self {
        let command = clap::Command::new("tracklog device arguments")
            .about("Records named waypoints from an NMEA GPS receiver")
            .arg(
                Arg::new("port")
                    .value_name("port")
                    .short('p')
                    .long("port")
                    .required(false)
                    .help("Serial port of the GPS receiver, the first available port if omitted"),
            )
            .arg(
                Arg::new("baud")
                    .value_name("baud")
                    .short('s')
                    .long("baud")
                    .required(false)
                    .default_value("57600")
                    .value_parser(value_parser!(u32))
                    .help("Baud rate for the selected port"),
            )
            .arg(
                Arg::new("timeout")
                    .value_name("ms")
                    .long("timeout")
                    .required(false)
                    .default_value("200")
                    .value_parser(value_parser!(u64))
                    .help("Read timeout in milliseconds"),
            )
            .arg(
                Arg::new("stop-bits")
                    .long("stop-bits")
                    .help("Number of stop bits for the selected port")
                    .required(false)
                    .value_parser(["1", "2"])
                    .default_value("1"),
            )
            .arg(
                Arg::new("data-bits")
                    .long("data-bits")
                    .help("Number of data bits for the selected port")
                    .required(false)
                    .value_parser(["7", "8"])
                    .default_value("8"),
            )
            .arg(
                Arg::new("parity")
                    .long("parity")
                    .help("Parity to use for selected port")
                    .required(false)
                    .value_parser(["even", "odd"]),
            )
            .arg(
                Arg::new("output")
                    .value_name("file")
                    .short('o')
                    .long("output")
                    .required(false)
                    .default_value(DEFAULT_OUTPUT)
                    .value_parser(value_parser!(PathBuf))
                    .help("Row file the waypoints are saved to"),
            );
        Self { command }
    }

    pub fn build(&self) -> clap::Command {
        self.command.clone()
    }
}

impl Command {
    pub fn port_settings(cli: &ArgMatches) -> Result<PortSettings> {
        let port_name = cli.get_one::<String>("port").cloned();
        let baud_rate = cli
            .get_one::<u32>("baud")
            .cloned()
            .unwrap_or(DEFAULT_BAUD);
        let timeout = cli
            .get_one::<u64>("timeout")
            .cloned()
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        let stop_bits = match cli.get_one::<String>("stop-bits").map(|s| s.as_str()) {
            Some("2") => serialport::StopBits::Two,
            _ => serialport::StopBits::One,
        };
        let data_bits = match cli.get_one::<String>("data-bits").map(|s| s.as_str()) {
            Some("7") => serialport::DataBits::Seven,
            Some("8") | None => serialport::DataBits::Eight,
            Some(other) => anyhow::bail!("Unsupported number of data bits: {other}"),
        };
        let parity = match cli.get_one::<String>("parity").map(|s| s.as_str()) {
            Some("odd") => serialport::Parity::Odd,
            Some("even") => serialport::Parity::Even,
            _ => serialport::Parity::None,
        };

        Ok(PortSettings {
            port_name,
            baud_rate,
            timeout: Duration::from_millis(timeout),
            stop_bits,
            data_bits,
            parity,
        })
    }

    pub fn output(cli: &ArgMatches) -> Result<PathBuf> {
        cli.get_one::<PathBuf>("output")
            .cloned()
            .context("Missing output file argument")
    }
}
