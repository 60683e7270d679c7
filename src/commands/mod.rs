pub mod index;
pub mod init;
pub mod rpc;
pub mod search;
pub mod watch;
