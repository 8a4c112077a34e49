//! Application layer use cases for the bridge.
//!
//! # What use cases does the bridge have?
//!
//! - **`bridge`** – Runs the whole open, dispatch and close sequence.
//!
//! - **`connection`** – The boundary to the native CEC library: the
//!   `CecBackend`/`CecSession` traits and the bounded event queue that
//!   carries `RemoteKeyEvent`s from the library's callback thread.
//!
//! - **`lifecycle`** – Opens the single CEC connection under a timeout while a
//!   listener drains early events, hands the event stream to the dispatcher,
//!   and closes the connection under a timeout at shutdown.
//!
//! - **`dispatch`** – Looks up each received code in the `MappingTable` and
//!   replays the mapped actions.
//!
//! - **`replay_actions`** – Plays an action sequence on an `OutputDevice`,
//!   the virtual keyboard and mouse injected at construction time.
//!
//! **Dependency rule**: nothing here imports `infrastructure`.

pub mod bridge;
pub mod connection;
pub mod dispatch;
pub mod lifecycle;
pub mod replay_actions;
