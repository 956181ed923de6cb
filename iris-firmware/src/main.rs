//! Iris - Filter Wheel Firmware
//!
//! Main firmware binary for RP2040-based filter wheel controllers. A DC
//! motor turns the wheel, a home sensor and a proximity sensor confirm
//! slot positions, and a host drives it over a `#`-terminated ASCII
//! serial protocol.

#![no_std]
#![no_main]

use core::sync::atomic::AtomicBool;

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::Delay;
use {defmt_rtt as _, panic_probe as _};

use iris_core::config::PinConfig;
use iris_core::motion::PositionController;
use iris_core::session::Session;
use iris_hal::uart::UartConfig;
use iris_hal_rp2040::{PinBank, RpUart};

mod board;
mod config;
mod tasks;

/// Raised while a SETFILTER is executing
static BUSY: AtomicBool = AtomicBool::new(false);

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Iris firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    let (mut bank, serial) = PinBank::split(p);
    info!("Peripherals initialized");

    let mut wheel_config = config::load();
    if board::check_pins(&bank, &wheel_config.pins).is_err() {
        warn!("Configured pins unusable on this board, using default wiring");
        wheel_config.pins = PinConfig::default();
    }

    let hardware = match board::wire(&mut bank, &wheel_config.pins) {
        Ok(hardware) => hardware,
        Err(e) => defmt::panic!("Pin setup failed: {:?}", e),
    };

    let controller = match PositionController::new(
        &wheel_config,
        hardware.motor,
        hardware.home,
        hardware.proximity,
        Delay,
    ) {
        Ok(controller) => controller,
        Err(e) => defmt::panic!("Controller rejected configuration: {:?}", e),
    };
    info!("Position controller ready (position unconfirmed until first move)");

    let session = Session::new(controller, wheel_config.retry, &BUSY);

    let uart_config = UartConfig::default();
    let uart = RpUart::new(serial, &uart_config);
    info!("UART initialized at {} baud", uart_config.baudrate);

    tasks::serial_task(session, uart)
}
