pub mod dispatch;
pub mod init;
pub mod plan;
