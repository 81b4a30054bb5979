pub mod due;
pub mod filter;
pub mod form;
pub mod notifier;
pub mod todo_controller;
