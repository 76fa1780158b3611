//! Domain definitions.

pub mod applicant;
pub mod application;
pub mod notification;
pub mod session;

pub use self::{
    applicant::{Applicant, Profile},
    application::Application,
    notification::Notification,
    session::Session,
};
