pub mod hardware;

pub use hardware::handle_hardware_command;
