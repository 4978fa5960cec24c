mod rest_api;
mod services;
mod sessions;
mod inputs;
mod reports;

pub use self::{rest_api::*, services::*};
