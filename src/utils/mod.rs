pub mod clock;
pub mod dir;
pub mod json;
pub mod logging;
pub mod time;
