//! Inbound radio frames turned into control surface events

mod dispatcher;

pub use dispatcher::EventDispatcher;
