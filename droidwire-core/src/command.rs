//! Command buffer encoder and generic robot command builders
//!
//! Commands accumulate in an internal buffer as
//! `[(len+3)|0x20][sub_cmd][id][len|0x40]` + data records and are handed
//! to the transport in one piece by [`CommandBuffer::drain`]. Builders are
//! thin typed layers over [`CommandBuffer::append`] that enforce their own
//! field ranges.

use bytes::{BufMut, Bytes, BytesMut};

use crate::constants::{
    CMD_DATA_PRESENT, CMD_LEN_FLAG, MAX_CMD_DATA, SUB_CMD_IMMEDIATE, SUB_CMD_SCRIPT,
};
use crate::error::CodecError;
use crate::Result;

/// An accumulating buffer of encoded command records
#[derive(Debug, Clone, Default)]
pub struct CommandBuffer {
    buf: BytesMut,
    script_mode: bool,
}

impl CommandBuffer {
    /// Create an empty buffer in immediate mode
    pub fn new() -> Self {
        Self::default()
    }

    /// True if no commands are pending
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Encoded bytes currently pending
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Toggle script-recording mode.
    ///
    /// While enabled, every appended command is marked with the script
    /// sub-command so the robot stores it into the currently open command
    /// script instead of executing it.
    pub fn set_script_mode(&mut self, enabled: bool) {
        self.script_mode = enabled;
    }

    /// True while script-recording mode is enabled
    pub fn script_mode(&self) -> bool {
        self.script_mode
    }

    /// Return the accumulated records and reset the buffer.
    ///
    /// Draining an empty buffer returns empty bytes.
    pub fn drain(&mut self) -> Bytes {
        self.buf.split().freeze()
    }

    /// Append one command record, honoring the current script mode
    pub fn append(&mut self, id: u8, data: &[u8]) -> Result<()> {
        let sub_cmd = if self.script_mode {
            SUB_CMD_SCRIPT
        } else {
            SUB_CMD_IMMEDIATE
        };
        self.push(id, data, sub_cmd)
    }

    /// Append one command record marked for the open command script
    pub fn append_script(&mut self, id: u8, data: &[u8]) -> Result<()> {
        self.push(id, data, SUB_CMD_SCRIPT)
    }

    fn push(&mut self, id: u8, data: &[u8], sub_cmd: u8) -> Result<()> {
        if data.len() > MAX_CMD_DATA {
            return Err(CodecError::CommandTooLarge {
                len: data.len(),
                max: MAX_CMD_DATA,
            });
        }
        self.buf.put_u8((data.len() as u8 + 3) | CMD_LEN_FLAG);
        self.buf.put_u8(sub_cmd);
        self.buf.put_u8(id);
        self.buf.put_u8(data.len() as u8 | CMD_DATA_PRESENT);
        self.buf.put_slice(data);
        Ok(())
    }

    // --- generic robot command builders ---

    /// Request the robot/firmware id (reported in a notify event)
    pub fn request_id(&mut self) -> Result<()> {
        self.append(0x01, &[])
    }

    /// Set a mono LED to a brightness value. Index 0 addresses all mono
    /// LEDs.
    pub fn led_mono(&mut self, idx: u8, value: u8) -> Result<()> {
        self.append(0x02, &[idx, value])
    }

    /// Set an RGB LED to a color. Index 0 addresses all RGB LEDs.
    pub fn led_rgb(&mut self, idx: u8, rgb: (u8, u8, u8)) -> Result<()> {
        self.append(0x03, &[idx, rgb.0, rgb.1, rgb.2])
    }

    /// Ramp a mono LED to a brightness over `ramp_time`
    pub fn led_mono_ramp(&mut self, idx: u8, end_value: u8, ramp_time: u16) -> Result<()> {
        let t = ramp_time.to_be_bytes();
        self.append(0x04, &[0x01, idx, t[0], t[1], end_value])
    }

    /// Flash a mono LED between two brightness values for a number of
    /// on/off cycles
    pub fn led_mono_flash(
        &mut self,
        idx: u8,
        high_value: u8,
        low_value: u8,
        flashes: u8,
        high_period: u16,
        low_period: u16,
    ) -> Result<()> {
        let hp = high_period.to_be_bytes();
        let lp = low_period.to_be_bytes();
        self.append(
            0x04,
            &[
                0x02, idx, hp[0], hp[1], lp[0], lp[1], flashes, high_value, low_value,
            ],
        )
    }

    /// Pulse a mono LED between two brightness values. An odd cycle count
    /// leaves the LED high.
    pub fn led_mono_pulse(
        &mut self,
        idx: u8,
        high_value: u8,
        low_value: u8,
        cycles: u8,
        ramp_time: u16,
    ) -> Result<()> {
        let t = ramp_time.to_be_bytes();
        self.append(
            0x04,
            &[0x03, idx, t[0], t[1], cycles, high_value, low_value],
        )
    }

    /// Ramp an RGB LED to a color over `ramp_time`
    pub fn led_rgb_ramp(&mut self, idx: u8, rgb: (u8, u8, u8), ramp_time: u16) -> Result<()> {
        let t = ramp_time.to_be_bytes();
        self.append(0x04, &[0x04, idx, t[0], t[1], rgb.0, rgb.1, rgb.2])
    }

    /// Flash an RGB LED between two colors for a number of on/off cycles
    pub fn led_rgb_flash(
        &mut self,
        idx: u8,
        rgb_high: (u8, u8, u8),
        rgb_low: (u8, u8, u8),
        flashes: u8,
        high_period: u16,
        low_period: u16,
    ) -> Result<()> {
        let hp = high_period.to_be_bytes();
        let lp = low_period.to_be_bytes();
        self.append(
            0x04,
            &[
                0x05, idx, hp[0], hp[1], lp[0], lp[1], flashes, rgb_high.0, rgb_high.1,
                rgb_high.2, rgb_low.0, rgb_low.1, rgb_low.2,
            ],
        )
    }

    /// Pulse an RGB LED between two colors. An odd cycle count leaves the
    /// LED at the high color.
    pub fn led_rgb_pulse(
        &mut self,
        idx: u8,
        rgb_high: (u8, u8, u8),
        rgb_low: (u8, u8, u8),
        cycles: u8,
        ramp_time: u16,
    ) -> Result<()> {
        let t = ramp_time.to_be_bytes();
        self.append(
            0x04,
            &[
                0x06, idx, t[0], t[1], cycles, rgb_high.0, rgb_high.1, rgb_high.2, rgb_low.0,
                rgb_low.1, rgb_low.2,
            ],
        )
    }

    /// Set a motor's speed, ramping over `ramp_time`.
    ///
    /// `value` is a signed magnitude in `-255..=255`; a negative value
    /// sets the reverse bit (0x80) of the motor index and sends the
    /// magnitude.
    pub fn motor(&mut self, idx: u8, value: i16, ramp_time: u16) -> Result<()> {
        let (idx, magnitude) = split_signed_magnitude(idx, value, "motor value")?;
        let t = ramp_time.to_be_bytes();
        self.append(0x05, &[idx, magnitude, t[0], t[1]])
    }

    /// No-op command (possibly unimplemented in droid firmware)
    pub fn nop(&mut self) -> Result<()> {
        self.append(0x06, &[])
    }

    /// Start recording a new command script under `idx` (20-127; 1-19 are
    /// factory scripts and cannot be overwritten)
    pub fn script_open(&mut self, idx: u8) -> Result<()> {
        self.append(0x0C, &[idx, 0x00])
    }

    /// Store the currently open command script to flash
    pub fn script_finish(&mut self) -> Result<()> {
        self.append(0x0C, &[0x00, 0x01])
    }

    /// Run a stored command script
    pub fn script_run(&mut self, idx: u8) -> Result<()> {
        self.append(0x0C, &[idx, 0x02])
    }

    /// Delay before the next script instruction. A value of 0 uses the
    /// in-memory default seeded by a depot activator beacon. Only
    /// meaningful inside a command script.
    pub fn delay(&mut self, delay: u16) -> Result<()> {
        self.append(0x0D, &delay.to_be_bytes())
    }

    /// Device-specific command: `custom_id` names the robot model this
    /// command is valid for, `cmd` the model-specific sub-command
    pub fn custom(&mut self, custom_id: u8, cmd: u8, data: &[u8]) -> Result<()> {
        let mut payload = [0u8; 2 + MAX_CMD_DATA];
        if data.len() + 2 > MAX_CMD_DATA {
            return Err(CodecError::CommandTooLarge {
                len: data.len() + 2,
                max: MAX_CMD_DATA,
            });
        }
        payload[0] = custom_id;
        payload[1] = cmd;
        payload[2..2 + data.len()].copy_from_slice(data);
        self.append(0x0F, &payload[..2 + data.len()])
    }
}

/// Split a signed magnitude into a high-bit flag on `flag_byte` plus an
/// unsigned byte magnitude
pub(crate) fn split_signed_magnitude(
    flag_byte: u8,
    value: i16,
    field: &'static str,
) -> Result<(u8, u8)> {
    if !(-255..=255).contains(&value) {
        return Err(CodecError::ValueOutOfRange {
            field,
            value: i32::from(value),
        });
    }
    if value < 0 {
        Ok((flag_byte | 0x80, (-value) as u8))
    } else {
        Ok((flag_byte, value as u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_header_layout() {
        let mut buf = CommandBuffer::new();
        buf.append(0x05, &[0x00, 0x12, 0x34]).unwrap();
        let bytes = buf.drain();
        // (3+3)|0x20, immediate sub-command, id, 3|0x40, then data
        assert_eq!(
            bytes.as_ref(),
            &[0x26, 0x00, 0x05, 0x43, 0x00, 0x12, 0x34]
        );
    }

    #[test]
    fn test_script_record_marks_sub_cmd() {
        let mut buf = CommandBuffer::new();
        buf.append_script(0x0D, &[0x01, 0x2C]).unwrap();
        let bytes = buf.drain();
        assert_eq!(bytes.as_ref(), &[0x25, 0x42, 0x0D, 0x42, 0x01, 0x2C]);
    }

    #[test]
    fn test_script_mode_toggle() {
        let mut buf = CommandBuffer::new();
        buf.set_script_mode(true);
        buf.delay(300).unwrap();
        buf.set_script_mode(false);
        buf.nop().unwrap();
        let bytes = buf.drain();
        assert_eq!(bytes[1], 0x42);
        assert_eq!(bytes[7], 0x00);
    }

    #[test]
    fn test_drain_resets() {
        let mut buf = CommandBuffer::new();
        buf.request_id().unwrap();
        assert!(!buf.is_empty());
        assert_eq!(buf.drain().len(), 4);
        assert!(buf.is_empty());
        assert_eq!(buf.drain().len(), 0);
    }

    #[test]
    fn test_command_too_large_leaves_buffer_unchanged() {
        let mut buf = CommandBuffer::new();
        buf.request_id().unwrap();
        let before = buf.len();
        let err = buf.append(0x0F, &[0u8; 32]).unwrap_err();
        assert_eq!(err, CodecError::CommandTooLarge { len: 32, max: 0x1F });
        assert_eq!(buf.len(), before);
    }

    #[test]
    fn test_motor_reverse_sets_high_bit() {
        let mut buf = CommandBuffer::new();
        buf.motor(0x01, -200, 0x1234).unwrap();
        let bytes = buf.drain();
        assert_eq!(&bytes[4..], &[0x81, 200, 0x12, 0x34]);

        assert!(matches!(
            buf.motor(0, 256, 0),
            Err(CodecError::ValueOutOfRange { .. })
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_custom_prefixes_device_and_cmd() {
        let mut buf = CommandBuffer::new();
        buf.custom(0x44, 0x00, &[0x10, 0x07]).unwrap();
        let bytes = buf.drain();
        assert_eq!(bytes.as_ref(), &[0x27, 0x00, 0x0F, 0x44, 0x44, 0x00, 0x10, 0x07]);
    }

    #[test]
    fn test_led_mono_ramp_layout() {
        let mut buf = CommandBuffer::new();
        buf.led_mono_ramp(2, 0xFF, 0x0100).unwrap();
        let bytes = buf.drain();
        assert_eq!(&bytes[4..], &[0x01, 0x02, 0x01, 0x00, 0xFF]);
    }
}
