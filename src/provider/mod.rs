pub use self::{
    database::{DatabasePool, Storage},
    event::Event,
    http::HTTP,
};

mod database;
mod event;
mod http;
