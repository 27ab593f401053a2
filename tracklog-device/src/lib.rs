use std::io;

use serialport::{ClearBuffer, SerialPort};
use tracing::{debug, info};
use tracklog::{ByteSource, PortProvider};

pub mod cli;
pub use cli::PortSettings;
pub use tracklog;

/// An open serial connection to the receiver
pub struct SerialSource {
    port: Box<dyn SerialPort>,
}

impl SerialSource {
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }
}

impl ByteSource for SerialSource {
    /// Reads the serial port, converting timeouts into "no data received"
    fn read_bytes(&mut self, output: &mut [u8]) -> io::Result<usize> {
        match self.port.read(output) {
            Ok(b) => Ok(b),
            Err(e) => {
                if e.kind() == io::ErrorKind::TimedOut {
                    Ok(0)
                } else {
                    Err(e)
                }
            },
        }
    }

    fn discard_buffered(&mut self) -> io::Result<()> {
        self.port.clear(ClearBuffer::Input)?;
        Ok(())
    }
}

/// Opens the configured port, or the first one the system reports.
pub struct SerialProvider {
    settings: PortSettings,
}

impl SerialProvider {
    pub fn new(settings: PortSettings) -> Self {
        Self { settings }
    }

    fn port_name(&self) -> io::Result<String> {
        if let Some(name) = &self.settings.port_name {
            return Ok(name.clone());
        }
        let ports = serialport::available_ports()?;
        debug!(
            "Available ports: {:?}",
            ports.iter().map(|p| &p.port_name).collect::<Vec<_>>()
        );
        ports
            .into_iter()
            .next()
            .map(|p| p.port_name)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no serial ports found"))
    }
}

impl PortProvider for SerialProvider {
    type Port = SerialSource;

    fn acquire(&mut self) -> io::Result<SerialSource> {
        let name = self.port_name()?;
        let builder = self.settings.builder(&name);
        debug!("{:?}", &builder);
        let port = builder.open().map_err(|e| {
            io::Error::new(
                io::Error::from(e.clone()).kind(),
                format!("failed to open port {name}: {e}"),
            )
        })?;
        info!("Opened {} at {} baud", name, self.settings.baud_rate);
        Ok(SerialSource::new(port))
    }
}
