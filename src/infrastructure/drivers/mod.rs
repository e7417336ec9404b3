mod gpio_registers;

pub use gpio_registers::{GpioInputLine, GpioOutputBlock, REGISTER_SPAN, RegisterMapError};
