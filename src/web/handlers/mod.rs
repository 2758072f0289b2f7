// Route handlers, one module per user operation.

pub mod comparison;
pub mod export;
pub mod upload;
