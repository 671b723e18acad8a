// libst95/src/protocol/commands/idle.rs

//! IDLE command parameters (14 bytes)

/// Wake-up source bits
pub const WU_TIMEOUT: u8 = 0x01;
/// Wake-up source: tag detector
pub const WU_TAG_DETECT: u8 = 0x02;
/// Wake-up source: external field
pub const WU_FIELD_DETECT: u8 = 0x04;
/// Wake-up source: low pulse on IRQ_IN
pub const WU_IRQ_IN: u8 = 0x08;
/// Wake-up source: low pulse on SPI_SS
pub const WU_IRQ_SPI_SS: u8 = 0x10;

/// Parameters of the IDLE command. Control words go on the wire LSB first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IdleParams {
    /// Wake-up source bits
    pub wakeup_source: u8,
    /// Control word applied when entering low power
    pub enter_ctrl: u16,
    /// Control word applied while waiting
    pub wakeup_ctrl: u16,
    /// Control word applied when leaving low power
    pub leave_ctrl: u16,
    /// Time between tag detector probes
    pub wakeup_period: u8,
    /// Oscillator start-up delay
    pub osc_start: u8,
    /// DAC start-up delay
    pub dac_start: u8,
    /// Tag detector lower reference
    pub dac_data_low: u8,
    /// Tag detector upper reference
    pub dac_data_high: u8,
    /// Swings before a detection probe
    pub swings_count: u8,
    /// Detection probes before a timeout wake-up
    pub max_sleep: u8,
}

impl IdleParams {
    /// Hibernate until a low pulse on IRQ_IN.
    pub fn hibernate() -> Self {
        Self {
            wakeup_source: WU_IRQ_IN,
            enter_ctrl: 0x0004,
            wakeup_ctrl: 0x0004,
            leave_ctrl: 0x0018,
            wakeup_period: 0x00,
            osc_start: 0x00,
            dac_start: 0x00,
            dac_data_low: 0x00,
            dac_data_high: 0x00,
            swings_count: 0x00,
            max_sleep: 0x00,
        }
    }

    /// Tag detector: wake when the antenna load leaves the
    /// `[dac_low, dac_high]` window, or on IRQ_IN.
    pub fn tag_detector(dac_low: u8, dac_high: u8) -> Self {
        Self {
            wakeup_source: WU_TAG_DETECT | WU_IRQ_IN,
            enter_ctrl: 0x0021,
            wakeup_ctrl: 0x0179,
            leave_ctrl: 0x0018,
            wakeup_period: 0x20,
            osc_start: 0x60,
            dac_start: 0x60,
            dac_data_low: dac_low,
            dac_data_high: dac_high,
            swings_count: 0x3F,
            max_sleep: 0x08,
        }
    }

    /// Tag detector centred on a calibrated DAC reference with a ±8 guard.
    pub fn tag_detector_around(dac_ref: u8) -> Self {
        Self::tag_detector(dac_ref.saturating_sub(8), dac_ref.saturating_add(8))
    }

    /// One calibration step: short sleep, wake on timeout or tag detect,
    /// probing `dac_high`.
    pub fn calibration(dac_high: u8) -> Self {
        Self {
            wakeup_source: WU_TIMEOUT | WU_TAG_DETECT,
            enter_ctrl: 0x00A1,
            wakeup_ctrl: 0x01B8,
            leave_ctrl: 0x0018,
            wakeup_period: 0x01,
            osc_start: 0x60,
            dac_start: 0x60,
            dac_data_low: 0x00,
            dac_data_high: dac_high,
            swings_count: 0x3F,
            max_sleep: 0x01,
        }
    }

    /// Wire bytes of the 14-byte parameter block.
    pub fn encode(&self) -> [u8; 14] {
        let [el, eh] = self.enter_ctrl.to_le_bytes();
        let [wl, wh] = self.wakeup_ctrl.to_le_bytes();
        let [ll, lh] = self.leave_ctrl.to_le_bytes();
        [
            self.wakeup_source,
            el,
            eh,
            wl,
            wh,
            ll,
            lh,
            self.wakeup_period,
            self.osc_start,
            self.dac_start,
            self.dac_data_low,
            self.dac_data_high,
            self.swings_count,
            self.max_sleep,
        ]
    }
}

impl Default for IdleParams {
    fn default() -> Self {
        Self::hibernate()
    }
}
