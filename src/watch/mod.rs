//! The watch-driven synchronization engine.
//!
//! A [`Watcher`] runs one loop task bound to one path and one handler. The
//! handler re-arms a one-shot store notification on every round; the loop
//! waits on it together with the loop and client stop signals. Recoverable
//! session failures park the loop on the client's dead-watcher queue until
//! the maintenance task revives it.

mod handler;
mod map_handler;
mod value_handler;
mod watcher;

pub use handler::ChildListener;
pub use handler::ValueListener;
pub(crate) use handler::WatchHandler;
pub(crate) use map_handler::MapHandler;
pub use value_handler::DeletePolicy;
pub(crate) use value_handler::ValueHandler;
pub use watcher::WatchState;
pub use watcher::Watcher;

#[cfg(test)]
mod value_handler_test;
#[cfg(test)]
mod watcher_test;
