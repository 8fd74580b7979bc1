pub mod aim;
pub mod base;
pub mod dpi;
pub mod frontend;
pub mod memsys;
pub mod sim;
pub mod ui;
