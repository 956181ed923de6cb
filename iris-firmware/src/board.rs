//! Board wiring
//!
//! Builds the motor and sensor drivers from the configured pin numbers.

use defmt::*;
use iris_core::config::{PinConfig, PinSpec};
use iris_drivers::motor::{DcMotor, DcMotorConfig};
use iris_drivers::sensor::DigitalSensor;
use iris_hal_rp2040::{PinBank, PinError, RpInput, RpOutput};

/// Wheel motor behind the H-bridge
pub type Motor = DcMotor<RpOutput, RpOutput>;

/// Home or proximity sensor
pub type Sensor = DigitalSensor<RpInput>;

/// Wheel hardware
pub struct Hardware {
    pub motor: Motor,
    pub home: Sensor,
    pub proximity: Sensor,
}

fn specs(pins: &PinConfig) -> [(&'static str, PinSpec); 4] {
    [
        ("motor_a", pins.motor_a),
        ("motor_b", pins.motor_b),
        ("home_sensor", pins.home_sensor),
        ("proximity_sensor", pins.proximity_sensor),
    ]
}

/// Check that every configured pin exists on this board and is free
pub fn check_pins(bank: &PinBank, pins: &PinConfig) -> Result<(), PinError> {
    for (name, spec) in specs(pins) {
        if let Err(e) = bank.check(spec.pin) {
            warn!("{} on gpio{}: {}", name, spec.pin, e);
            return Err(e);
        }
    }
    Ok(())
}

/// Take the configured pins and build the drivers
pub fn wire(bank: &mut PinBank, pins: &PinConfig) -> Result<Hardware, PinError> {
    let motor = DcMotor::new(
        RpOutput::from_spec(bank, &pins.motor_a)?,
        RpOutput::from_spec(bank, &pins.motor_b)?,
        DcMotorConfig::from_pins(pins),
    );
    let home = DigitalSensor::from_spec(
        RpInput::from_spec(bank, &pins.home_sensor)?,
        &pins.home_sensor,
    );
    let proximity = DigitalSensor::from_spec(
        RpInput::from_spec(bank, &pins.proximity_sensor)?,
        &pins.proximity_sensor,
    );

    info!(
        "Motor on gpio{}/gpio{} (reversed={}), home sensor gpio{}, proximity sensor gpio{}",
        pins.motor_a.pin,
        pins.motor_b.pin,
        pins.motor_reversed,
        pins.home_sensor.pin,
        pins.proximity_sensor.pin
    );

    Ok(Hardware {
        motor,
        home,
        proximity,
    })
}
