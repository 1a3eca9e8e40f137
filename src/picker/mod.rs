// 选择器状态机模块

pub mod backend;
pub mod driver;
pub mod state;

pub use backend::{HttpBackend, PickerBackend};
pub use driver::PickerDriver;
pub use state::{Command, Crumb, Event, PickerMode, PickerState, SEARCH_DEBOUNCE};
