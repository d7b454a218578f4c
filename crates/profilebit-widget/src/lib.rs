pub mod controls;
pub mod html;
pub mod render;
pub mod settings;
pub mod widget;

pub use controls::*;
pub use html::escape_html;
pub use render::*;
pub use settings::*;
pub use widget::*;
