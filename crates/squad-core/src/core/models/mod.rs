pub mod build;
pub mod ids;
pub mod mode;
pub mod objective;
pub mod player;
pub mod request;
pub mod result;
