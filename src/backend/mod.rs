/// Backend submodules for the service collaborators and action handling
///
/// - `services`: async traits for the external collaborators
/// - `memory`: seeded in-process implementation of every collaborator
/// - `handlers`: dispatch of UI actions onto the collaborators
/// - `main_loop`: tokio runtime thread bridging crossbeam channels
pub mod handlers;
pub mod main_loop;
pub mod memory;
pub mod services;

pub use main_loop::run_backend;
pub use memory::InMemoryServices;
pub use services::{FileUploader, MessageSender, MessageSource, ReadTracker, Services, UserDirectory};
