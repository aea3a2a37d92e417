pub mod op_helper;
pub mod sequential_op;
pub mod grid_op;
pub mod restream_op;
pub mod diagnostic_op;
