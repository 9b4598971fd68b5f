pub mod enums;
pub mod payments;
pub mod stk_callback;
pub mod subscriptions;
