// src/driver/device.rs

use crate::common::{
    address::{BusAddress, PinState},
    error::Tmp006Error,
    hal_traits::RegisterTransport,
    log,
    register::{
        self, ConfigWord, ConversionRate, DataReadyPinMode, OperationMode, Register,
        DRDY_ENABLE_MASK, MODE_MASK, RATE_MASK,
    },
    types::{AmbientTemperature, SensorVoltage},
};

/// A TMP006 on the bus.
///
/// Holds the transport and the resolved bus address, nothing else. Every
/// field update is a fresh read-modify-write of the configuration register.
/// Calls must not overlap; the driver is not reentrant.
#[derive(Debug)]
pub struct Tmp006<T>
where
    T: RegisterTransport,
{
    transport: T,
    address: BusAddress,
}

impl<T> Tmp006<T>
where
    T: RegisterTransport,
{
    /// Creates the driver for the sensor strapped as `a0`/`a1`.
    ///
    /// Nothing is sent on the bus.
    pub fn new(transport: T, a0: PinState, a1: PinState) -> Result<Self, Tmp006Error<T::Error>> {
        let address = BusAddress::from_pins(a0, a1).map_err(|_| Tmp006Error::InvalidArgument)?;
        log::debug!("tmp006: address {:#x}", address.as_u8());
        Ok(Self::with_address(transport, address))
    }

    /// Creates the driver for an already resolved address.
    pub fn with_address(transport: T, address: BusAddress) -> Self {
        Tmp006 { transport, address }
    }

    pub fn address(&self) -> BusAddress {
        self.address
    }

    /// Gives the transport back.
    pub fn release(self) -> T {
        self.transport
    }

    // --- Raw register access ---

    /// Reads a 16-bit register, first byte most significant.
    pub fn read_register(&mut self, register: Register) -> Result<u16, Tmp006Error<T::Error>> {
        let mut bytes = [0u8; 2];
        self.transport
            .read(self.address.as_u8(), register.addr(), &mut bytes)
            .map_err(Tmp006Error::Transport)?;
        let value = u16::from_be_bytes(bytes);
        log::trace!("tmp006: read {:?} = {:#x}", register, value);
        Ok(value)
    }

    /// Writes a 16-bit register, most significant byte first.
    pub fn write_register(&mut self, register: Register, value: u16) -> Result<(), Tmp006Error<T::Error>> {
        log::trace!("tmp006: write {:?} = {:#x}", register, value);
        self.transport
            .write(self.address.as_u8(), register.addr(), &value.to_be_bytes())
            .map_err(Tmp006Error::Transport)
    }

    // --- Configuration ---

    pub fn read_config(&mut self) -> Result<ConfigWord, Tmp006Error<T::Error>> {
        self.read_register(Register::Configuration).map(ConfigWord::from_bits)
    }

    /// Read-modify-write of one configuration field: clears `mask`, ORs in
    /// `bits`, leaves everything else as the sensor reported it.
    fn modify_config(&mut self, mask: u16, bits: u16) -> Result<(), Tmp006Error<T::Error>> {
        let current = self.read_config()?;
        let updated = current.with_field(mask, bits);
        self.write_register(Register::Configuration, updated.bits())
    }

    pub fn set_conversion_rate(&mut self, rate: ConversionRate) -> Result<(), Tmp006Error<T::Error>> {
        self.modify_config(RATE_MASK, rate.field_bits())
    }

    pub fn set_data_ready_pin_mode(&mut self, mode: DataReadyPinMode) -> Result<(), Tmp006Error<T::Error>> {
        self.modify_config(DRDY_ENABLE_MASK, mode.field_bits())
    }

    /// Power-down takes effect immediately and aborts a running conversion.
    pub fn set_operation_mode(&mut self, mode: OperationMode) -> Result<(), Tmp006Error<T::Error>> {
        self.modify_config(MODE_MASK, mode.field_bits())
    }

    /// Software reset. Writes the reset bit alone; the sensor then returns to
    /// `ConfigWord::POWER_ON_DEFAULT`.
    pub fn reset(&mut self) -> Result<(), Tmp006Error<T::Error>> {
        log::debug!("tmp006: software reset");
        self.write_register(Register::Configuration, ConfigWord::RESET.bits())
    }

    // --- Readiness ---

    /// Status bit of the configuration word. Only meaningful while the DRDY
    /// pin is disabled.
    pub fn is_result_ready(&mut self) -> Result<bool, Tmp006Error<T::Error>> {
        self.read_config().map(ConfigWord::is_result_ready)
    }

    /// Non-blocking form of [`Tmp006::is_result_ready`]: `WouldBlock` until a
    /// conversion result is available.
    pub fn poll_result(&mut self) -> nb::Result<(), Tmp006Error<T::Error>> {
        match self.is_result_ready() {
            Ok(true) => Ok(()),
            Ok(false) => Err(nb::Error::WouldBlock),
            Err(e) => Err(nb::Error::Other(e)),
        }
    }

    // --- Results ---

    /// Raw ambient temperature, 1/32 °C per LSB.
    pub fn read_ambient_temperature(&mut self) -> Result<i16, Tmp006Error<T::Error>> {
        self.read_register(Register::AmbientTemperature).map(|raw| raw as i16)
    }

    /// Raw object sensor voltage, 156.25 nV per LSB.
    pub fn read_voltage(&mut self) -> Result<i16, Tmp006Error<T::Error>> {
        self.read_register(Register::Voltage).map(|raw| raw as i16)
    }

    pub fn ambient_temperature(&mut self) -> Result<AmbientTemperature, Tmp006Error<T::Error>> {
        self.read_ambient_temperature().map(AmbientTemperature::from_raw)
    }

    pub fn voltage(&mut self) -> Result<SensorVoltage, Tmp006Error<T::Error>> {
        self.read_voltage().map(SensorVoltage::from_raw)
    }

    // --- Identification ---

    pub fn read_manufacturer_id(&mut self) -> Result<u16, Tmp006Error<T::Error>> {
        self.read_register(Register::ManufacturerId)
    }

    pub fn read_device_id(&mut self) -> Result<u16, Tmp006Error<T::Error>> {
        self.read_register(Register::DeviceId)
    }

    /// Whether both ID registers carry the TMP006 values.
    pub fn is_tmp006(&mut self) -> Result<bool, Tmp006Error<T::Error>> {
        let manufacturer = self.read_manufacturer_id()?;
        let device = self.read_device_id()?;
        Ok(manufacturer == register::MANUFACTURER_ID && device == register::DEVICE_ID)
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::register::DRDY_STATUS_MASK;

    // --- Mock Bus Error ---
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    struct MockBusError;

    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    enum Op {
        Read { address: u8, register: u8, len: usize },
        Write { address: u8, register: u8, bytes: [u8; 2] },
    }

    // --- Mock Transport ---
    // A register file that answers reads and records every access. Config
    // writes behave like the sensor: reset restores the default, the status
    // bit cannot be written.
    struct MockTransport {
        registers: [u16; 256],
        log: [Option<Op>; 32],
        log_pos: usize,
        fail: bool,
    }

    impl MockTransport {
        fn new() -> Self {
            let mut registers = [0u16; 256];
            registers[Register::Configuration.addr() as usize] = 0x7400;
            registers[Register::ManufacturerId.addr() as usize] = 0x5449;
            registers[Register::DeviceId.addr() as usize] = 0x0067;
            MockTransport { registers, log: [None; 32], log_pos: 0, fail: false }
        }

        fn set(&mut self, register: Register, value: u16) {
            self.registers[register.addr() as usize] = value;
        }

        fn get(&self, register: Register) -> u16 {
            self.registers[register.addr() as usize]
        }

        fn record(&mut self, op: Op) {
            self.log[self.log_pos] = Some(op);
            self.log_pos += 1;
        }

        fn ops(&self) -> &[Option<Op>] {
            &self.log[..self.log_pos]
        }
    }

    impl RegisterTransport for MockTransport {
        type Error = MockBusError;

        fn read(&mut self, address: u8, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
            self.record(Op::Read { address, register, len: buffer.len() });
            if self.fail {
                return Err(MockBusError);
            }
            buffer.copy_from_slice(&self.registers[register as usize].to_be_bytes());
            Ok(())
        }

        fn write(&mut self, address: u8, register: u8, bytes: &[u8]) -> Result<(), Self::Error> {
            self.record(Op::Write { address, register, bytes: [bytes[0], bytes[1]] });
            if self.fail {
                return Err(MockBusError);
            }
            let value = u16::from_be_bytes([bytes[0], bytes[1]]);
            let slot = &mut self.registers[register as usize];
            if register == Register::Configuration.addr() {
                if value & 0x8000 != 0 {
                    *slot = 0x7400;
                } else {
                    *slot = (value & !DRDY_STATUS_MASK) | (*slot & DRDY_STATUS_MASK);
                }
            } else {
                *slot = value;
            }
            Ok(())
        }
    }

    fn device() -> Tmp006<MockTransport> {
        Tmp006::new(MockTransport::new(), PinState::Low, PinState::Low).unwrap()
    }

    #[test]
    fn test_construction_resolves_address() {
        let dev = Tmp006::new(MockTransport::new(), PinState::High, PinState::Scl).unwrap();
        assert_eq!(dev.address().as_u8(), 0x47);
        assert!(dev.release().ops().is_empty());
    }

    #[test]
    fn test_construction_rejects_bad_pins() {
        let result = Tmp006::new(MockTransport::new(), PinState::Sda, PinState::Low);
        assert!(matches!(result, Err(Tmp006Error::InvalidArgument)));
    }

    #[test]
    fn test_read_register_is_big_endian() {
        let mut dev = device();
        dev.transport.set(Register::AmbientTemperature, 0x1234);
        assert_eq!(dev.read_register(Register::AmbientTemperature), Ok(0x1234));
        assert_eq!(
            dev.transport.ops(),
            &[Some(Op::Read { address: 0x40, register: 0x01, len: 2 })]
        );
    }

    #[test]
    fn test_write_register_is_big_endian() {
        let mut dev = device();
        dev.write_register(Register::Configuration, 0x7500).unwrap();
        assert_eq!(
            dev.transport.ops(),
            &[Some(Op::Write { address: 0x40, register: 0x02, bytes: [0x75, 0x00] })]
        );
    }

    #[test]
    fn test_every_rate_round_trips() {
        let mut dev = device();
        for rate in ConversionRate::ALL {
            dev.set_conversion_rate(rate).unwrap();
            let word = dev.read_config().unwrap();
            assert_eq!(word.field(RATE_MASK), rate.field_bits());
            assert_eq!(word.conversion_rate(), Some(rate));
            // Neighbouring fields untouched.
            assert_eq!(word.field(MODE_MASK), 0x7000);
            assert_eq!(word.field(DRDY_ENABLE_MASK), 0);
        }
    }

    #[test]
    fn test_field_setters_are_read_modify_write() {
        let mut dev = device();
        dev.set_data_ready_pin_mode(DataReadyPinMode::Enabled).unwrap();
        assert_eq!(dev.transport.get(Register::Configuration), 0x7500);
        dev.set_operation_mode(OperationMode::PowerDown).unwrap();
        assert_eq!(dev.transport.get(Register::Configuration), 0x0500);
        dev.set_operation_mode(OperationMode::ContinuousConversion).unwrap();
        dev.set_data_ready_pin_mode(DataReadyPinMode::Disabled).unwrap();
        assert_eq!(dev.transport.get(Register::Configuration), 0x7400);

        let ops = dev.transport.ops();
        assert_eq!(ops.len(), 8);
        assert!(matches!(ops[0], Some(Op::Read { register: 0x02, .. })));
        assert!(matches!(ops[1], Some(Op::Write { register: 0x02, bytes: [0x75, 0x00], .. })));
    }

    #[test]
    fn test_status_bit_is_carried_not_forged() {
        let mut dev = device();
        dev.transport.set(Register::Configuration, 0x7480);
        dev.set_conversion_rate(ConversionRate::Rate4Hz).unwrap();
        // The write carries what was read, status bit included.
        assert_eq!(
            dev.transport.ops()[1],
            Some(Op::Write { address: 0x40, register: 0x02, bytes: [0x70, 0x80] })
        );
    }

    #[test]
    fn test_reset_writes_reset_bit_alone() {
        let mut dev = device();
        dev.set_conversion_rate(ConversionRate::Rate250mHz).unwrap();
        dev.set_data_ready_pin_mode(DataReadyPinMode::Enabled).unwrap();
        dev.reset().unwrap();
        assert_eq!(
            dev.transport.ops().last(),
            Some(&Some(Op::Write { address: 0x40, register: 0x02, bytes: [0x80, 0x00] }))
        );
        assert_eq!(dev.read_config().unwrap(), ConfigWord::POWER_ON_DEFAULT);
        assert_eq!(dev.read_config().unwrap().bits(), 0x7400);
    }

    #[test]
    fn test_result_ready_and_poll() {
        let mut dev = device();
        assert_eq!(dev.is_result_ready(), Ok(false));
        assert_eq!(dev.poll_result(), Err(nb::Error::WouldBlock));

        dev.transport.set(Register::Configuration, 0x7480);
        assert_eq!(dev.is_result_ready(), Ok(true));
        assert_eq!(dev.poll_result(), Ok(()));
    }

    #[test]
    fn test_result_registers_are_signed() {
        let mut dev = device();
        dev.transport.set(Register::AmbientTemperature, 0x02D0);
        dev.transport.set(Register::Voltage, 0xFFC0);
        assert_eq!(dev.read_ambient_temperature(), Ok(0x02D0));
        assert_eq!(dev.ambient_temperature().unwrap().celsius(), 22.5);
        assert_eq!(dev.read_voltage(), Ok(-64));
        assert_eq!(dev.voltage().unwrap().microvolts(), -10.0);
    }

    #[test]
    fn test_identity() {
        let mut dev = device();
        assert_eq!(dev.read_manufacturer_id(), Ok(0x5449));
        assert_eq!(dev.read_device_id(), Ok(0x0067));
        assert_eq!(dev.is_tmp006(), Ok(true));
        dev.transport.set(Register::DeviceId, 0x0078);
        assert_eq!(dev.is_tmp006(), Ok(false));
    }

    #[test]
    fn test_transport_error_propagates_without_retry() {
        let mut dev = device();
        dev.transport.fail = true;
        assert_eq!(
            dev.set_conversion_rate(ConversionRate::Rate2Hz),
            Err(Tmp006Error::Transport(MockBusError))
        );
        // The failed read stops the read-modify-write; nothing is retried.
        assert_eq!(dev.transport.ops().len(), 1);
        assert_eq!(dev.poll_result(), Err(nb::Error::Other(Tmp006Error::Transport(MockBusError))));
        assert_eq!(dev.reset(), Err(Tmp006Error::Transport(MockBusError)));
        assert_eq!(dev.transport.ops().len(), 3);
    }
}
