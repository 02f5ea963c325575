// Library root
// -----------
// This crate exposes the Premiumize.me client as a library. The binary
// (`main.rs`) wires configuration, logging and the CLI around it.
//
// Module responsibilities:
// - `api`: the API client. Builds authenticated requests, honours
//   dry-run, and returns validated, typed responses.
// - `shape` / `types`: declared response shapes and the models they
//   decode into.
// - `transport`: the HTTP seam. Tests swap in a mock here.
// - `error`: one error type shared by every layer.
// - `config` / `logging`: environment loading and tracing setup.
// - `cli` / `ui`: argument grammar, command handlers and rendering.
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod shape;
pub mod transport;
pub mod types;
pub mod ui;
