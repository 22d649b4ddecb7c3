//! Intermediate representation: functions made of blocks made of
//! instructions, where every instruction (and every function
//! argument) is identified by a `Value`.

use crate::declare_entity;

declare_entity!(Func, "func");
declare_entity!(Block, "block");
declare_entity!(Value, "v");

mod module;
pub use module::*;
mod func;
pub use func::*;
mod value;
pub use value::*;
mod display;
pub use display::*;
