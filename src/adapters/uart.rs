//! UART adapter for the GSM modem.
//!
//! Implements [`Transport`] over the ESP-IDF UART driver at 115200-8N1, no
//! flow control.  Only built for `target_os = "espidf"`; host tests drive
//! the core through mock transports instead.

use core::time::Duration;

use esp_idf_hal::delay::TickType;
use esp_idf_hal::gpio::{AnyIOPin, InputPin, OutputPin};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::sys::EspError;
use esp_idf_hal::uart::{config::Config, Uart, UartDriver};
use esp_idf_hal::units::Hertz;
use log::info;

use crate::pins;
use crate::sms::transport::Transport;

pub struct UartTransport<'d> {
    driver: UartDriver<'d>,
}

impl<'d> UartTransport<'d> {
    /// Install the UART driver on `uart` with the modem's line settings.
    pub fn new(
        uart: impl Peripheral<P = impl Uart> + 'd,
        tx: impl Peripheral<P = impl OutputPin> + 'd,
        rx: impl Peripheral<P = impl InputPin> + 'd,
    ) -> Result<Self, EspError> {
        let config = Config::default()
            .baudrate(Hertz(pins::MODEM_UART_BAUD))
            .rx_fifo_size(pins::MODEM_UART_RING_BYTES)
            .tx_fifo_size(pins::MODEM_UART_RING_BYTES);

        let driver = UartDriver::new(
            uart,
            tx,
            rx,
            Option::<AnyIOPin>::None,
            Option::<AnyIOPin>::None,
            &config,
        )?;
        info!(
            "UART | modem link on UART{} @ {} baud (TX={}, RX={})",
            pins::MODEM_UART_PORT,
            pins::MODEM_UART_BAUD,
            pins::MODEM_UART_TX_GPIO,
            pins::MODEM_UART_RX_GPIO
        );
        Ok(Self { driver })
    }
}

fn ticks(timeout: Duration) -> u32 {
    TickType::from(timeout).ticks()
}

impl Transport for UartTransport<'_> {
    type Error = EspError;

    fn write(&mut self, data: &[u8]) -> Result<usize, EspError> {
        self.driver.write(data)
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, EspError> {
        self.driver.read(buf, ticks(timeout))
    }

    fn flush_output(&mut self, timeout: Duration) -> Result<(), EspError> {
        self.driver.wait_tx_done(ticks(timeout))
    }

    fn discard_pending_input(&mut self) -> Result<(), EspError> {
        self.driver.clear_rx()
    }
}
