pub mod pending_action;
pub mod task;

pub use pending_action::Entity as PendingAction;
pub use task::Entity as Task;
