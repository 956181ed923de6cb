//! Serial command task
//!
//! Announces the position once, then reads the command port byte by byte,
//! runs every complete command through the session and writes its reply.
//! Commands are executed one at a time on this task, so a move always
//! completes before the next line is read.

use defmt::*;
use iris_core::session::Session;
use iris_core::traits::FilterWheel;
use iris_hal::uart::{UartRx, UartTx};
use iris_hal_rp2040::RpUart;
use iris_protocol::{Command, LineParser, Reply};

/// Serve the command protocol forever
pub fn serial_task<W: FilterWheel>(mut session: Session<'_, W>, mut uart: RpUart) -> ! {
    info!("Serial task started");

    send(&mut uart, session.greeting());

    let mut parser = LineParser::new();

    loop {
        let byte = match uart.read_byte() {
            Ok(byte) => byte,
            Err(e) => {
                warn!("UART read error: {:?}", e);
                parser.reset();
                continue;
            }
        };

        match parser.feed(byte) {
            Ok(Some(line)) => handle_line(&mut session, &mut uart, &line),
            Ok(None) => {
                // Need more bytes
            }
            Err(e) => {
                warn!("Line parse error: {:?}", e);
            }
        }
    }
}

/// Execute one line and reply
fn handle_line<W: FilterWheel>(session: &mut Session<'_, W>, uart: &mut RpUart, line: &[u8]) {
    let command = match Command::parse(line) {
        Ok(command) => command,
        Err(e) => {
            debug!("Ignoring line {=[u8]:a}: {:?}", line, e);
            return;
        }
    };

    debug!("Command: {:?}", command);
    let reply = session.handle(command);

    if let Command::SetFilter(requested) = command {
        let status = session.wheel().status();
        match session.last_result() {
            Some(Ok(())) => info!("Moved to slot {}", status.position),
            Some(Err(e)) if e.leaves_lost() => error!(
                "SETFILTER{} failed: {:?}, position unconfirmed (last slot {})",
                requested, e, status.position
            ),
            Some(Err(e)) => warn!(
                "SETFILTER{} rejected: {:?}, staying at slot {}",
                requested, e, status.position
            ),
            None => {}
        }
    }

    send(uart, reply);
}

/// Write a reply to the command port
fn send(uart: &mut RpUart, reply: Reply) {
    let bytes = reply.encode();
    if let Err(e) = uart.write_blocking(&bytes).and_then(|()| uart.flush()) {
        warn!("Failed to send reply: {:?}", e);
    } else {
        trace!("Sent {=[u8]:a}", bytes.as_slice());
    }
}
