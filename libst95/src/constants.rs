// libst95/src/constants.rs
//! Chip and transport constants shared across the crate

/// Default UART baud rate after power-up
pub const UART_BAUD_DEFAULT: u32 = 57600;

/// Maximum gap between two bytes of one UART frame (microseconds)
pub const UART_INTER_BYTE_TIMEOUT_US: u32 = 500;

/// Highest SPI clock the chip accepts. The bus owner configures it;
/// `SpiTransport` never changes the bus speed.
pub const SPI_CLOCK_HZ: u32 = 1_000_000;

/// RF field / power-up ramp time
pub const RAMP_UP_TIME_MS: u64 = 9;

/// High-frequency oscillator setup time
pub const HFO_SETUP_TIME_MS: u64 = 9;

/// Maximum wait for the echo byte
pub const ECHO_WAIT_TIME_MS: u64 = 10;

/// Tag detection window for a single air exchange
pub const DETECT_TIME_MS: u64 = 1000;

/// Overall ceiling before a scan is reported as "nothing answered"
pub const NO_RESPONSE_TIME_MS: u64 = 2500;

/// Maximum payload bytes in one frame
pub const MAX_DATA_BYTES: usize = 254;

/// Echo request and reply byte
pub const ECHO_BYTE: u8 = 0x55;

/// Result code of a successful command
pub const RESULT_OK: u8 = 0x00;

/// SEND_RECV result code: frame received
pub const RESULT_FRAME_OK: u8 = 0x80;

/// SEND_RECV result code: frame received (short/partial-byte frame)
pub const RESULT_FRAME_OK_SHORT: u8 = 0x90;

/// SEND_RECV result code: no tag answered within the frame wait time
pub const RESULT_NO_TAG: u8 = 0x87;

/// SPI control bytes
/// SPI control byte: command follows
pub const SPI_CTRL_SEND: u8 = 0x00;
/// SPI control byte: reset the chip
pub const SPI_CTRL_RESET: u8 = 0x01;
/// SPI control byte: read the pending response
pub const SPI_CTRL_READ: u8 = 0x02;
/// SPI control byte: read the flags register
pub const SPI_CTRL_POLL: u8 = 0x03;

/// Bit in the SPI poll flags that signals a response is ready
pub const SPI_FLAG_DATA_READY: u8 = 0x08;

/// Number of echo attempts before the chip is declared faulty
pub const ECHO_RETRIES: u8 = 3;

/// Register address of the analog configuration (ARC_B) access window
pub const REG_ARC_B: u8 = 0x68;

/// Register address used to read back the selected analog register
pub const REG_ARC_B_READ: u8 = 0x69;

/// Register address of the ISO14443A timer window
pub const REG_TIMER_WINDOW: u8 = 0x3A;

/// Timer window value recommended for ISO14443A
pub const TIMER_WINDOW_14443A: u8 = 0x58;

/// Confirmation byte that must follow a timer window value
pub const TIMER_WINDOW_CONFIRM: u8 = 0x04;
