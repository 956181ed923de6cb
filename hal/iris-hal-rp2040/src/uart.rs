//! Blocking UART for the command protocol
//!
//! UART0 on GPIO0 (TX) and GPIO1 (RX). Reads return one byte at a time so
//! the line parser sees every delimiter as soon as it arrives.

use embassy_rp::uart::{Blocking, Config, Error, Uart};
use iris_hal::uart::{UartConfig, UartRx, UartTx};

use crate::pins::SerialPeripherals;

/// Command port
pub struct RpUart {
    uart: Uart<'static, Blocking>,
}

impl RpUart {
    /// Open the command port
    pub fn new(serial: SerialPeripherals, config: &UartConfig) -> Self {
        let mut uart_config = Config::default();
        uart_config.baudrate = config.baudrate;

        Self {
            uart: Uart::new_blocking(serial.uart, serial.tx, serial.rx, uart_config),
        }
    }
}

impl UartTx for RpUart {
    type Error = Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Error> {
        self.uart.blocking_write(data)
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.uart.blocking_flush()
    }
}

impl UartRx for RpUart {
    type Error = Error;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let Some(first) = buf.first_mut() else {
            return Ok(0);
        };
        self.uart.blocking_read(core::slice::from_mut(first))?;
        Ok(1)
    }
}
