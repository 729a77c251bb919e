pub mod core;
pub mod store;

// Read hooks and the store decorator that applies them
pub mod hooks;
pub mod interceptor;

// Write lifecycle: identity validation, change audit, transitions
pub mod lifecycle;

pub mod logging;
