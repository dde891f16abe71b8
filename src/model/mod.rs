pub mod blocker;
pub mod kernel_node;
pub mod wl_list;
