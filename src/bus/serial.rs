use std::io;
use tokio_serial::{SerialPortBuilderExt, SerialStream};

/// Serial port wrapper for async communication
pub struct SerialBus {
    port: SerialStream,
    /// Port path - useful for logging and error messages
    path: String,
}

impl SerialBus {
    /// Create a new serial bus connection with custom baud rate
    pub fn new_with_baud(path: &str, baud_rate: u32) -> io::Result<Self> {
        let port = tokio_serial::new(path, baud_rate).open_native_async()?;

        Ok(Self {
            port,
            path: path.to_string(),
        })
    }

    /// Get the port path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Consume self and return the underlying SerialStream
    pub fn into_stream(self) -> SerialStream {
        self.port
    }
}
