pub mod slots;

#[rustfmt::skip]
pub use slots::{SlotCell, SlotRow};
