pub mod content;
pub mod prepare;
pub mod workstep;

pub use content::*;
pub use prepare::*;
pub use workstep::*;
