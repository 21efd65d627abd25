pub mod cdev;
pub mod iio;
pub mod simulated;

pub use cdev::CdevGpioInput;
pub use iio::{IioClimateSensor, IioLightSensor};
pub use simulated::{SimulatedClimate, SimulatedLight, SimulatedMoisture};
