pub mod operator;
pub mod value;

pub use operator::*;
pub use value::*;
