//! R2/BB8 specific command builders
//!
//! These wrap the custom command (0x0F) with the droid device id 0x44 and
//! the sub-command layouts the droid firmware understands.
//!
//! Drive flag contract: bit 0x80 of the flags byte is the reverse bit,
//! bit 0x01 marks an explicit speed value; with bit 0x01 clear the
//! firmware uses its default speed and the value byte is ignored.

use crate::command::{split_signed_magnitude, CommandBuffer};
use crate::constants::R2_CUSTOM_ID;
use crate::Result;

impl CommandBuffer {
    /// Serial register write to the GeneralPlus chip.
    ///
    /// Register 0x10 plays a sound (values 0-6); register 0x11 triggers an
    /// R2 special action (values 10-11).
    pub fn serial_reg_write(&mut self, reg: u8, value: u8) -> Result<()> {
        self.custom(R2_CUSTOM_ID, 0x00, &[reg, value])
    }

    /// Center the R2 unit's head at the given motor speed. `start_timer`
    /// inserts a 3s delay before the next script command; it has no effect
    /// outside command scripts.
    pub fn center_head(&mut self, value: u8, start_timer: bool) -> Result<()> {
        self.custom(R2_CUSTOM_ID, 0x01, &[value, u8::from(start_timer)])
    }

    /// Rotate the R2 unit's head. `value` is a signed motor magnitude in
    /// `-255..=255`, ramped over `ramp_time`; `delay` runs before the next
    /// script instruction.
    pub fn rotate_head(&mut self, value: i16, ramp_time: u16, delay: u16) -> Result<()> {
        let (flags, magnitude) = split_signed_magnitude(0x00, value, "head value")?;
        let t = ramp_time.to_be_bytes();
        let d = delay.to_be_bytes();
        self.custom(
            R2_CUSTOM_ID,
            0x02,
            &[flags, magnitude, t[0], t[1], d[0], d[1]],
        )
    }

    /// Rotate the R2 unit's head at full speed (255), no ramp
    pub fn rotate_head_simple(&mut self, forward: bool, delay: u8) -> Result<()> {
        let flags = if forward { 0x00 } else { 0x80 };
        self.custom(R2_CUSTOM_ID, 0x03, &[flags, delay])
    }

    /// Rotate the droid body. Same signed-magnitude contract as
    /// [`CommandBuffer::rotate_head`].
    pub fn rotate_body(&mut self, value: i16, ramp_time: u16, delay: u16) -> Result<()> {
        let (flags, magnitude) = split_signed_magnitude(0x00, value, "body value")?;
        let t = ramp_time.to_be_bytes();
        let d = delay.to_be_bytes();
        self.custom(
            R2_CUSTOM_ID,
            0x04,
            &[flags, magnitude, t[0], t[1], d[0], d[1]],
        )
    }

    /// Drive the droid forward or back at an explicit speed.
    ///
    /// Bit 0x01 of the flags byte is set to mark the speed as explicit.
    pub fn drive(&mut self, value: i16, ramp_time: u16, delay: u16) -> Result<()> {
        let (flags, magnitude) = split_signed_magnitude(0x01, value, "drive value")?;
        let t = ramp_time.to_be_bytes();
        let d = delay.to_be_bytes();
        self.custom(
            R2_CUSTOM_ID,
            0x05,
            &[flags, magnitude, t[0], t[1], d[0], d[1]],
        )
    }

    /// Drive the droid forward or back at the firmware default speed
    /// (+/- 220)
    pub fn drive_default(&mut self, forward: bool, ramp_time: u16, delay: u16) -> Result<()> {
        let flags = if forward { 0x00 } else { 0x80 };
        let t = ramp_time.to_be_bytes();
        let d = delay.to_be_bytes();
        self.custom(R2_CUSTOM_ID, 0x05, &[flags, 0x00, t[0], t[1], d[0], d[1]])
    }
}
