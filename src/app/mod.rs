pub(crate) mod config;
pub(crate) mod exit_handler;
pub(crate) mod output;
pub(crate) mod runtime;
pub(crate) mod settings;
pub(crate) mod terminal;
