// libst95/src/device/handle.rs

//! Device handle and the chip command engine.

use std::marker::PhantomData;

use crate::config::St95Config;
use crate::constants::REG_ARC_B_READ;
use crate::protocol::codec;
use crate::protocol::commands::register;
use crate::protocol::commands::{IdleParams, Opcode};
use crate::protocol::{Command, Response};
use crate::timing::{Deadline, DeadlineKind, Delay, StdDelay, TimeoutSupervisor};
use crate::transport::Transport;
use crate::types::{ChipId, DeviceState, Interface, ProtocolConfig, WakeupSource};
use crate::{Error, Result};

/// Type-state markers
/// Not powered up yet.
pub struct Uninitialized;
/// Powered up and answering echo.
pub struct Initialized;

/// Calibration probes DacDataH in these steps, coarse to fine.
const CALIBRATION_STEPS: [u8; 6] = [0x80, 0x40, 0x20, 0x10, 0x08, 0x04];

/// Device handle that enforces initialization state at compile time.
pub struct Device<State = Uninitialized> {
    transport: Box<dyn Transport>,
    config: St95Config,
    timing: TimeoutSupervisor,
    state: DeviceState,
    protocol: Option<ProtocolConfig>,
    asleep: bool,
    /// Set when the echo probe gives up. Only a field cycle, idle or a
    /// fresh power-up clears it.
    faulted: bool,
    _state: PhantomData<State>,
}

impl<S> Device<S> {
    /// Current engine state.
    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// Configuration the device was built with.
    pub fn config(&self) -> &St95Config {
        &self.config
    }

    /// Carrier the chip is reached over.
    pub fn interface(&self) -> Interface {
        self.transport.interface()
    }

    /// True after a failed liveness probe until the field is cycled.
    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    fn reply_timeout_ms(&self, opcode: Opcode) -> u64 {
        let kind = match opcode {
            Opcode::Echo | Opcode::Baudrate => DeadlineKind::EchoWait,
            Opcode::Idle => DeadlineKind::NoResponse,
            _ => DeadlineKind::TagDetect,
        };
        self.timing.budget_ms(kind)
    }

    /// One framed exchange. The previous state is restored unless the
    /// reply could not be trusted; a good reply also ends an `Error` state.
    fn transact(&mut self, cmd: &Command) -> Result<Response> {
        let opcode = cmd.opcode();
        let frame = codec::encode_command_frame(cmd)?;
        let timeout_ms = self.reply_timeout_ms(opcode);
        log::debug!("-> {:?} ({} byte frame)", opcode, frame.len());

        let prev = self.state;
        self.state = DeviceState::AwaitingResponse;
        let res = self
            .transport
            .send(&frame)
            .and_then(|_| self.transport.receive(timeout_ms))
            .and_then(|raw| codec::decode_response_frame(opcode, &raw));

        self.state = match &res {
            Err(e) if e.is_malformed() || matches!(e, Error::Io(_)) => DeviceState::Error,
            Ok(_) if prev == DeviceState::Error && self.protocol.is_some() => DeviceState::FieldOn,
            Ok(_) if prev == DeviceState::Error => DeviceState::Idle,
            _ => prev,
        };
        match &res {
            Ok(resp) => log::debug!("<- {:?}", resp.opcode()),
            Err(e) => log::debug!("<- {:?} failed: {}", opcode, e),
        }
        res
    }

    /// Bounded echo retry. Never fails the caller.
    fn echo_with_retries(&mut self) -> bool {
        let attempts = self.config.echo_retries.max(1);
        for attempt in 1..=attempts {
            match self.transact(&Command::Echo) {
                Ok(_) => return true,
                Err(e) => log::debug!("echo attempt {}/{} failed: {}", attempt, attempts, e),
            }
        }
        false
    }
}

impl Device<Uninitialized> {
    /// Create a Device from an existing Transport instance with the default
    /// configuration and a sleeping delay.
    pub fn new_with_transport(transport: Box<dyn Transport>) -> Result<Self> {
        Ok(Self::with_parts(
            transport,
            St95Config::default(),
            Box::new(StdDelay),
        ))
    }

    /// Create a Device from its transport, configuration and delay.
    pub fn with_parts(
        transport: Box<dyn Transport>,
        config: St95Config,
        delay: Box<dyn Delay>,
    ) -> Self {
        let timing = TimeoutSupervisor::new(config.timings, delay);
        Self {
            transport,
            config,
            timing,
            state: DeviceState::Uninitialized,
            protocol: None,
            asleep: false,
            faulted: false,
            _state: PhantomData,
        }
    }

    /// Power-up sequence: carrier reset, wake pulse, ramp-up and oscillator
    /// settle, then an echo probe. Fails with `DeviceFault` when the chip
    /// never echoes. The initialized device starts without a fault.
    pub fn initialize(self) -> Result<Device<Initialized>> {
        let mut this = self;
        this.transport.reset()?;
        this.transport.wake()?;
        this.timing.settle();

        if !this.echo_with_retries() {
            log::warn!("chip did not answer echo after power-up");
            return Err(Error::DeviceFault);
        }
        log::debug!("chip alive on {:?}", this.transport.interface());

        Ok(Device {
            transport: this.transport,
            config: this.config,
            timing: this.timing,
            state: DeviceState::Idle,
            protocol: None,
            asleep: false,
            faulted: false,
            _state: PhantomData,
        })
    }
}

impl Device<Initialized> {
    /// Execute a command and return the parsed Response.
    ///
    /// Commands that change chip state are routed through their dedicated
    /// operations: `Protocol` behaves as `select_protocol`, `Baudrate`
    /// retunes the host side and `Idle` blocks until the chip wakes up.
    ///
    /// A faulted device rejects everything except field off and idle with
    /// `DeviceFault`.
    pub fn execute(&mut self, cmd: Command) -> Result<Response> {
        match cmd {
            Command::Protocol(cfg) => {
                self.select_protocol(cfg)?;
                Ok(Response::Protocol)
            }
            Command::Baudrate { code } => {
                self.apply_baud_code(code, Command::baud_for_code(code))?;
                Ok(Response::Baudrate)
            }
            Command::Idle(params) => {
                self.enter_idle(params)?;
                let wakeup = self.wait_wakeup(self.timing.budget_ms(DeadlineKind::NoResponse))?;
                Ok(Response::Idle { wakeup })
            }
            other => {
                self.ensure_healthy()?;
                self.ensure_awake()?;
                self.transact(&other)
            }
        }
    }

    /// Read the chip name and ROM CRC.
    pub fn get_idn(&mut self) -> Result<ChipId> {
        match self.execute(Command::Idn)? {
            Response::Idn(id) => Ok(id),
            other => Err(unexpected(Opcode::Idn, &other)),
        }
    }

    /// Liveness probe with bounded retry. Returns false instead of failing.
    pub fn echo(&mut self) -> bool {
        if let Err(e) = self.ensure_awake() {
            log::debug!("echo: wake-up failed: {}", e);
            return false;
        }
        self.echo_with_retries()
    }

    /// Echo probe that escalates to `DeviceFault` and moves to `Error`.
    /// The fault sticks until `field_off`, `idle` or a new power-up.
    pub fn probe(&mut self) -> Result<()> {
        if self.echo() {
            Ok(())
        } else {
            log::warn!("chip stopped answering echo, device faulted");
            self.state = DeviceState::Error;
            self.faulted = true;
            Err(Error::DeviceFault)
        }
    }

    /// Select an air protocol. Re-selecting the active configuration while
    /// the field is on only checks liveness and does not ramp up again.
    pub fn select_protocol(&mut self, cfg: ProtocolConfig) -> Result<()> {
        if cfg.is_field_on() {
            self.ensure_healthy()?;
        }
        self.ensure_awake()?;

        if cfg.is_field_on()
            && self.state == DeviceState::FieldOn
            && self.protocol == Some(cfg)
        {
            log::trace!("{:?} already selected", cfg.protocol);
            return self.probe();
        }

        match self.transact(&Command::Protocol(cfg))? {
            Response::Protocol => {}
            other => return Err(unexpected(Opcode::Protocol, &other)),
        }

        if cfg.is_field_on() {
            self.state = DeviceState::FieldOn;
            self.protocol = Some(cfg);
            self.timing.settle();
        } else {
            self.state = DeviceState::Idle;
            self.protocol = None;
            self.clear_fault();
        }
        log::debug!("protocol {:?}, state {:?}", cfg.protocol, self.state);
        Ok(())
    }

    /// Turn the RF field off. Clears a pending fault on success.
    pub fn field_off(&mut self) -> Result<()> {
        self.select_protocol(ProtocolConfig::FIELD_OFF)
    }

    /// Exchange `data` with a tag. The reply keeps the chip's status
    /// trailer.
    pub fn send_receive(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        self.ensure_healthy()?;
        if self.protocol.is_none() {
            return Err(Error::InvalidState(
                "send_receive needs an active protocol".into(),
            ));
        }
        match self.execute(Command::SendRecv {
            data: data.to_vec(),
        })? {
            Response::SendRecv { data } => Ok(data),
            other => Err(unexpected(Opcode::SendRecv, &other)),
        }
    }

    /// Enter low-power mode with the configured IDLE parameters.
    ///
    /// The chip answers only when it wakes up, so this does not wait. The
    /// next command pulses wake-up first and drains that reply.
    pub fn idle(&mut self) -> Result<()> {
        let params = self.config.idle;
        self.enter_idle(params)
    }

    /// Block until the sleeping chip reports why it woke up.
    pub fn wait_wakeup(&mut self, timeout_ms: u64) -> Result<WakeupSource> {
        if !self.asleep {
            return Err(Error::InvalidState("chip is not in low-power mode".into()));
        }
        let raw = self.transport.receive(timeout_ms)?;
        let wakeup = match codec::decode_response_frame(Opcode::Idle, &raw)? {
            Response::Idle { wakeup } => wakeup,
            other => return Err(unexpected(Opcode::Idle, &other)),
        };
        self.asleep = false;
        self.timing.wait(DeadlineKind::OscillatorSetup);
        log::debug!("woke up: {:?}", wakeup);
        Ok(wakeup)
    }

    /// Read `count` bytes starting at register `address`.
    pub fn read_register(&mut self, address: u8, count: u8) -> Result<Vec<u8>> {
        match self.execute(Command::ReadReg { address, count })? {
            Response::ReadReg { values } => Ok(values),
            other => Err(unexpected(Opcode::ReadReg, &other)),
        }
    }

    /// Write `data` to register `address`. `flags` selects auto-increment.
    pub fn write_register(&mut self, address: u8, flags: u8, data: &[u8]) -> Result<()> {
        match self.execute(Command::WriteReg {
            address,
            flags,
            data: data.to_vec(),
        })? {
            Response::WriteReg => Ok(()),
            other => Err(unexpected(Opcode::WriteReg, &other)),
        }
    }

    /// Read one entry of the analog configuration (ARC_B) window.
    pub fn read_analog_config(&mut self, index: u8) -> Result<u8> {
        let (addr, flags, data) = register::arc_b_select(index);
        self.write_register(addr, flags, &data)?;
        let values = self.read_register(REG_ARC_B_READ, 1)?;
        values
            .first()
            .copied()
            .ok_or(Error::InvalidLength {
                expected: 1,
                actual: 0,
            })
    }

    /// Write one entry of the ARC_B window.
    pub fn write_analog_config(&mut self, index: u8, value: u8) -> Result<()> {
        let (addr, flags, data) = register::arc_b_write(index, value);
        self.write_register(addr, flags, &data)
    }

    /// Program the ISO14443A timer window register.
    pub fn set_timer_window(&mut self, value: u8) -> Result<()> {
        let (addr, flags, data) = register::timer_window(value);
        self.write_register(addr, flags, &data)
    }

    /// Switch the UART speed on both sides and confirm with an echo.
    pub fn set_baud_rate(&mut self, baud: u32) -> Result<()> {
        let code = Command::baud_code(baud)?;
        self.apply_baud_code(code, baud)
    }

    /// Find the tag detector's DAC reference with the field off and no tag
    /// present. Returns the lowest DacDataH at which the detector stays
    /// quiet.
    pub fn calibrate_tag_detector(&mut self) -> Result<u8> {
        self.ensure_healthy()?;
        self.ensure_awake()?;
        let budget = self.timing.budget_ms(DeadlineKind::TagDetect);
        let mut dac_high = 0x00u8;
        for step in CALIBRATION_STEPS {
            let probe = dac_high.saturating_add(step);
            self.enter_idle(IdleParams::calibration(probe))?;
            match self.wait_wakeup(budget)? {
                WakeupSource::TagDetect => dac_high = probe,
                WakeupSource::Timeout => {}
                other => {
                    return Err(Error::UnexpectedResponse {
                        expected: u8::from(WakeupSource::Timeout),
                        actual: u8::from(other),
                    });
                }
            }
            log::trace!("calibration probe {:#04x} -> dac {:#04x}", probe, dac_high);
        }
        let reference = dac_high.saturating_add(CALIBRATION_STEPS[CALIBRATION_STEPS.len() - 1]);
        log::debug!("tag detector reference {:#04x}", reference);
        Ok(reference)
    }

    /// Active protocol configuration, `None` with the field off.
    pub fn protocol(&self) -> Option<ProtocolConfig> {
        self.protocol
    }

    /// True between entering low-power mode and the wake-up reply.
    pub fn is_asleep(&self) -> bool {
        self.asleep
    }

    /// Start a deadline of `kind` on this device's clock.
    pub fn deadline(&self, kind: DeadlineKind) -> Deadline {
        self.timing.start(kind)
    }

    /// Configured budget of `kind` in milliseconds.
    pub fn budget_ms(&self, kind: DeadlineKind) -> u64 {
        self.timing.budget_ms(kind)
    }

    /// Replace the parameters `idle()` uses.
    pub fn set_idle_params(&mut self, params: IdleParams) {
        self.config.idle = params;
    }

    fn ensure_healthy(&self) -> Result<()> {
        if self.faulted {
            return Err(Error::DeviceFault);
        }
        Ok(())
    }

    fn clear_fault(&mut self) {
        if self.faulted {
            log::debug!("fault cleared");
            self.faulted = false;
        }
    }

    fn enter_idle(&mut self, params: IdleParams) -> Result<()> {
        if self.asleep {
            log::trace!("already in low-power mode");
            return Ok(());
        }
        let frame = codec::encode_command_frame(&Command::Idle(params))?;
        self.transport.send(&frame)?;
        self.asleep = true;
        self.state = DeviceState::Idle;
        self.protocol = None;
        self.clear_fault();
        log::debug!("-> Idle (wake-up source {:#04x})", params.wakeup_source);
        Ok(())
    }

    /// Wake a sleeping chip and drain its wake-up reply before the next
    /// command.
    fn ensure_awake(&mut self) -> Result<()> {
        if !self.asleep {
            return Ok(());
        }
        self.transport.wake()?;
        let timeout = self.timing.budget_ms(DeadlineKind::EchoWait);
        match self.wait_wakeup(timeout) {
            Ok(_) => Ok(()),
            Err(Error::NoResponse) => {
                // Some boards do not report the wake-up; settle anyway.
                self.asleep = false;
                self.timing.wait(DeadlineKind::OscillatorSetup);
                Ok(())
            }
            Err(e) => {
                self.state = DeviceState::Error;
                Err(e)
            }
        }
    }

    fn apply_baud_code(&mut self, code: u8, host_baud: u32) -> Result<()> {
        if self.transport.interface() != Interface::Uart {
            return Err(Error::UnsupportedOperation(
                "baud rate applies to the UART carrier only".into(),
            ));
        }
        self.ensure_healthy()?;
        self.ensure_awake()?;
        match self.transact(&Command::Baudrate { code })? {
            Response::Baudrate => {}
            other => return Err(unexpected(Opcode::Baudrate, &other)),
        }
        self.transport.set_baud_rate(host_baud)?;
        self.config.uart_baud = host_baud;
        self.timing.settle();
        self.probe()
    }
}

fn unexpected(expected: Opcode, got: &Response) -> Error {
    Error::UnexpectedResponse {
        expected: expected.code(),
        actual: got.opcode().code(),
    }
}
