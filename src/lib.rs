//! Base controllers for server-rendered actix-web applications: an abstract
//! controller carrying the routing and view conventions, a generic CRUD
//! controller over an injected [`model::Model`], and a static page controller.

pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod util;
pub mod view;
pub mod web;

#[cfg(test)]
mod testing;

pub use controller::{
  AbstractController, Action, Controller, ControllerBase, ControllerParams, CrudController, CrudHooks,
  CrudParams, PageData, StaticController,
};
pub use error::{Error, ErrorKind, Result};
