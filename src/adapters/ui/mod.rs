pub mod console;

pub use console::ConsoleInputPort;
