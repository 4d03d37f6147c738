//! High-level sensor interface
//!
//! One method per module command. Each builds its frame, sends it, waits
//! for the fixed-length acknowledgement and maps the confirmation code.

use std::time::Duration;

use tracing::{debug, info, trace, warn};

use fpterm_core::{
    CharBuffer, ConfirmationCode, Instruction, Packet, constants::response_len,
};
use fpterm_transport::{SerialTransport, TcpTransport, Transport};
use fpterm_types::{MatchResult, StoragePosition};

use crate::config::SensorConfig;
use crate::error::{Error, Result};

/// Buffer the Store command reads the merged template from
///
/// After RegModel both buffers hold the template; the module firmware
/// stores from the second.
pub const STORE_BUFFER: CharBuffer = CharBuffer::Two;

/// AS608 fingerprint module
///
/// # Examples
///
/// ```no_run
/// use fpterm::Sensor;
/// use fpterm::CharBuffer;
///
/// #[tokio::main]
/// async fn main() -> fpterm::Result<()> {
///     let mut sensor = Sensor::serial("/dev/ttyUSB0", 57600);
///     sensor.connect().await?;
///
///     sensor.generate_image().await?;
///     sensor.generate_character(CharBuffer::One).await?;
///     let found = sensor.search(CharBuffer::One, 0, 176).await?;
///     println!("{}", found);
///
///     sensor.disconnect().await?;
///     Ok(())
/// }
/// ```
pub struct Sensor {
    transport: Box<dyn Transport>,
    config: SensorConfig,
}

impl Sensor {
    /// Create a sensor over any transport
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
            config: SensorConfig::default(),
        }
    }

    /// Create a sensor wired to a local UART
    pub fn serial(path: impl Into<String>, baud_rate: u32) -> Self {
        Self::new(SerialTransport::new(path, baud_rate))
    }

    /// Create a sensor behind a TCP serial bridge
    pub fn tcp(addr: impl Into<String>, port: u16) -> Self {
        Self::new(TcpTransport::new(addr, port))
    }

    pub fn with_config(mut self, config: SensorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set response timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    /// Set module password (default: 0)
    pub fn with_password(mut self, password: u32) -> Self {
        self.config.password = password;
        self
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Open the link and verify the module password
    ///
    /// # Errors
    ///
    /// Any failure here means the module is unusable; callers should not
    /// start the controller.
    pub async fn connect(&mut self) -> Result<()> {
        info!("Connecting to sensor at {}...", self.transport.endpoint());

        if !self.transport.is_connected() {
            self.transport.connect().await?;
        }

        self.verify_password().await?;

        info!("Sensor ready at {}", self.transport.endpoint());
        Ok(())
    }

    /// Close the link
    pub async fn disconnect(&mut self) -> Result<()> {
        if !self.is_connected() {
            return Ok(());
        }

        info!("Disconnecting from {}...", self.transport.endpoint());
        self.transport.disconnect().await?;
        Ok(())
    }

    /// Check the module password (handshake)
    pub async fn verify_password(&mut self) -> Result<()> {
        let password = self.config.password.to_be_bytes();
        self.execute(Instruction::VfyPwd, &password).await?;

        debug!("Password verified");
        Ok(())
    }

    /// Capture the finger currently on the sensor into the image buffer
    pub async fn generate_image(&mut self) -> Result<()> {
        self.execute(Instruction::GenImg, &[]).await?;

        debug!("Image captured");
        Ok(())
    }

    /// Extract features from the image buffer into `buffer`
    pub async fn generate_character(&mut self, buffer: CharBuffer) -> Result<()> {
        self.execute(Instruction::Img2Tz, &[buffer.into()]).await?;

        debug!("Features extracted into {}", buffer);
        Ok(())
    }

    /// Merge both character buffers into a template
    ///
    /// A rejected merge is retried per the configured [`RetryPolicy`](crate::RetryPolicy);
    /// link failures abort at once.
    pub async fn register_model(&mut self) -> Result<()> {
        let retry = self.config.register_retry;
        let attempts = retry.attempts.max(1);
        let mut last_code = ConfirmationCode::Ok;

        for attempt in 1..=attempts {
            match self.execute(Instruction::RegModel, &[]).await {
                Ok(()) => {
                    debug!("Template registered (attempt {})", attempt);
                    return Ok(());
                }
                Err(Error::Protocol(fpterm_core::Error::UnexpectedConfirmationCode {
                    code, ..
                })) => {
                    warn!(
                        "Register model rejected (attempt {}/{}): {}",
                        attempt, attempts, code
                    );
                    last_code = code;

                    if attempt < attempts {
                        tokio::time::sleep(retry.pause).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(Error::RegistrationFailed {
            attempts,
            code: last_code,
        })
    }

    /// Persist the merged template at `position`
    pub async fn store_template(&mut self, position: StoragePosition) -> Result<()> {
        let [page_hi, page_lo] = position.get().to_be_bytes();
        self.execute(Instruction::Store, &[STORE_BUFFER.into(), page_hi, page_lo])
            .await?;

        debug!("Template stored at {}", position);
        Ok(())
    }

    /// Search `page_count` library pages from `start_page` for the features in `buffer`
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the module answers with any
    /// non-zero confirmation code.
    pub async fn search(
        &mut self,
        buffer: CharBuffer,
        start_page: u16,
        page_count: u16,
    ) -> Result<MatchResult> {
        let [start_hi, start_lo] = start_page.to_be_bytes();
        let [count_hi, count_lo] = page_count.to_be_bytes();
        let params = [buffer.into(), start_hi, start_lo, count_hi, count_lo];

        let response = self
            .transact(Instruction::Search, &params, response_len::SEARCH)
            .await?;

        let code = response.confirmation_code()?;
        if !code.is_success() {
            debug!("Search found nothing: {}", code);
            return Err(Error::NotFound { code });
        }

        let result = MatchResult::from_search_data(response.ack_data())?;
        debug!("Search matched: {}", result);
        Ok(result)
    }

    // Helper methods

    fn ensure_connected(&self) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }
        Ok(())
    }

    /// Send a command and require confirmation code 0
    async fn execute(&mut self, instruction: Instruction, params: &[u8]) -> Result<()> {
        let response = self.transact(instruction, params, response_len::ACK).await?;

        let code = response.confirmation_code()?;
        if !code.is_success() {
            return Err(fpterm_core::Error::UnexpectedConfirmationCode { instruction, code }.into());
        }
        Ok(())
    }

    /// One request/response exchange
    async fn transact(
        &mut self,
        instruction: Instruction,
        params: &[u8],
        response_len: usize,
    ) -> Result<Packet> {
        self.ensure_connected()?;

        let packet = Packet::command(instruction, params)?.with_address(self.config.address);
        trace!("Sending {}: {:?}", instruction, packet);
        self.transport.send(&packet.encode()).await?;

        let buf = self
            .transport
            .receive(response_len, self.config.read_timeout)
            .await?;
        let response = Packet::decode_from(buf, self.config.address)?;
        trace!("Received: {:?}", response);

        Ok(response)
    }
}
