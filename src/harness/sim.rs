// src/harness/sim.rs

//! Simulated TMP006 board for host tests.
//!
//! Time only moves inside `PollDelay::delay_us`. Every elapsed millisecond
//! fires the tick callback; in continuous mode a conversion completes every
//! rate period, sets the status bit and, with the DRDY pin enabled, fires
//! the edge callback.

use crate::common::{
    hal_traits::{Callback, EdgeSource, PollDelay, RegisterTransport, TickSource},
    register::{ConfigWord, ConversionRate, Register, DRDY_ENABLE_MASK, DRDY_STATUS_MASK, MODE_MASK, RESET_MASK},
};
use std::{cell::RefCell, rc::Rc};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct SimBusError;

pub(crate) struct SimSensor<'a> {
    pub address: u8,
    /// Configuration word without the status bit.
    pub config: u16,
    pub ready: bool,
    pub ambient: u16,
    pub voltage: u16,
    pub manufacturer_id: u16,
    pub device_id: u16,

    // Fault injection
    /// No conversion completes once this many have.
    pub stall_after: Option<u32>,
    /// Every transfer fails.
    pub bus_fault: bool,
    /// Reads of this register fail.
    pub fault_register: Option<u8>,
    /// Keeps converting in power-down.
    pub ignore_power_down: bool,
    /// Converts at this period whatever rate is configured.
    pub fixed_period_us: Option<u64>,

    pub now_us: u64,
    pub conversions: u32,
    since_conversion_us: u64,
    tick: Option<Callback<'a>>,
    edge: Option<Callback<'a>>,
}

impl<'a> SimSensor<'a> {
    fn new() -> Self {
        SimSensor {
            address: 0x40,
            config: ConfigWord::POWER_ON_DEFAULT.bits(),
            ready: false,
            ambient: 0x02D0,
            voltage: 0xFFC0,
            manufacturer_id: 0x5449,
            device_id: 0x0067,
            stall_after: None,
            bus_fault: false,
            fault_register: None,
            ignore_power_down: false,
            fixed_period_us: None,
            now_us: 0,
            conversions: 0,
            since_conversion_us: 0,
            tick: None,
            edge: None,
        }
    }

    fn converting(&self) -> bool {
        let continuous = self.config & MODE_MASK == MODE_MASK;
        let stalled = self.stall_after.is_some_and(|limit| self.conversions >= limit);
        (continuous || self.ignore_power_down) && !stalled
    }

    fn period_us(&self) -> u64 {
        if let Some(period) = self.fixed_period_us {
            return period;
        }
        let rate = ConversionRate::from_field_bits(self.config).unwrap_or(ConversionRate::Rate250mHz);
        u64::from(rate.period_ms()) * 1000
    }

    fn advance(&mut self, us: u32) {
        let before_ms = self.now_us / 1000;
        self.now_us += u64::from(us);
        if let Some(tick) = self.tick {
            for _ in before_ms..self.now_us / 1000 {
                tick.fire();
            }
        }

        if !self.converting() {
            return;
        }
        self.since_conversion_us += u64::from(us);
        let period = self.period_us();
        while self.since_conversion_us >= period && self.converting() {
            self.since_conversion_us -= period;
            self.conversions += 1;
            self.ready = true;
            if self.config & DRDY_ENABLE_MASK != 0 {
                if let Some(edge) = self.edge {
                    edge.fire();
                }
            }
        }
    }

    fn read_register(&mut self, register: u8) -> u16 {
        match register {
            r if r == Register::Voltage.addr() => self.voltage,
            r if r == Register::AmbientTemperature.addr() => {
                self.ready = false;
                self.ambient
            }
            r if r == Register::Configuration.addr() => {
                self.config | if self.ready { DRDY_STATUS_MASK } else { 0 }
            }
            r if r == Register::ManufacturerId.addr() => self.manufacturer_id,
            r if r == Register::DeviceId.addr() => self.device_id,
            _ => 0,
        }
    }

    fn write_register(&mut self, register: u8, value: u16) {
        if register != Register::Configuration.addr() {
            return;
        }
        self.config = if value & RESET_MASK != 0 {
            ConfigWord::POWER_ON_DEFAULT.bits()
        } else {
            value & !(RESET_MASK | DRDY_STATUS_MASK)
        };
        // A config write restarts the running conversion.
        self.ready = false;
        self.since_conversion_us = 0;
    }
}

/// Cloneable handle on one simulated sensor: bus, delay and both interrupt
/// lines at once.
#[derive(Clone)]
pub(crate) struct SimBoard<'a> {
    inner: Rc<RefCell<SimSensor<'a>>>,
}

impl<'a> SimBoard<'a> {
    pub fn new() -> Self {
        SimBoard { inner: Rc::new(RefCell::new(SimSensor::new())) }
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut SimSensor<'a>) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }
}

impl RegisterTransport for SimBoard<'_> {
    type Error = SimBusError;

    fn read(&mut self, address: u8, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.with(|sensor| {
            if sensor.bus_fault || address != sensor.address || buffer.len() != 2 {
                return Err(SimBusError);
            }
            if sensor.fault_register == Some(register) {
                return Err(SimBusError);
            }
            buffer.copy_from_slice(&sensor.read_register(register).to_be_bytes());
            Ok(())
        })
    }

    fn write(&mut self, address: u8, register: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        self.with(|sensor| {
            if sensor.bus_fault || address != sensor.address || bytes.len() != 2 {
                return Err(SimBusError);
            }
            sensor.write_register(register, u16::from_be_bytes([bytes[0], bytes[1]]));
            Ok(())
        })
    }
}

impl PollDelay for SimBoard<'_> {
    fn delay_us(&mut self, us: u32) {
        self.with(|sensor| sensor.advance(us));
    }
}

impl<'a> TickSource<'a> for SimBoard<'a> {
    fn subscribe_tick(&mut self, callback: Callback<'a>) {
        self.with(|sensor| sensor.tick = Some(callback));
    }
}

impl<'a> EdgeSource<'a> for SimBoard<'a> {
    fn subscribe_edge(&mut self, callback: Callback<'a>) {
        self.with(|sensor| sensor.edge = Some(callback));
    }
}
