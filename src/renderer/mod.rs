pub mod components;
pub mod context;
pub mod driver;
pub mod renderer;
pub mod renders;
pub mod state;
pub mod traits;

pub use components::*;
pub use context::*;
pub use driver::*;
pub use renderer::*;
pub use renders::*;
pub use state::*;
pub use traits::*;
