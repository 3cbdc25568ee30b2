pub(crate) mod common;
pub(crate) mod config;
pub(crate) mod flow;
pub(crate) mod inputs;
pub(crate) mod references;
pub(crate) mod step;
