//! Device configuration
//!
//! Everything here is fixed at boot: which half this firmware runs on and
//! how many character cells the local display has.

/// Which half of the keyboard this device is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    /// Connected to the host over USB; answers HID requests
    Master,
    /// Reached only through the split link; never talks to the host
    Slave,
}

impl Role {
    /// Pick the role from USB presence, the way split keyboards do at boot
    pub fn from_usb_present(usb_present: bool) -> Self {
        if usb_present {
            Role::Master
        } else {
            Role::Slave
        }
    }

    pub fn is_master(self) -> bool {
        self == Role::Master
    }
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Columns or rows is zero
    ZeroDimension,
    /// `cols * rows` does not fit the buffer capacity
    TooManyCells,
}

/// Character grid of a display, as reported by its driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Geometry {
    pub cols: u8,
    pub rows: u8,
}

impl Geometry {
    /// SSD1306 128x32 with a 6x8 font
    pub const SSD1306_128X32: Geometry = Geometry { cols: 21, rows: 4 };

    pub const fn new(cols: u8, rows: u8) -> Self {
        Self { cols, rows }
    }

    /// Total number of cells
    pub const fn cells(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Check the grid is usable with a buffer of `capacity` cells
    pub fn validate(&self, capacity: usize) -> Result<(), ConfigError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(ConfigError::ZeroDimension);
        }
        if self.cells() > capacity {
            return Err(ConfigError::TooManyCells);
        }
        Ok(())
    }
}
