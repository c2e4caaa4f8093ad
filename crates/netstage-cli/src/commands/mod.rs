pub mod converged;
pub mod init;
pub mod reconcile;
