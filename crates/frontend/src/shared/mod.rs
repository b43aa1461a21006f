pub mod api_utils;
pub mod components;
pub mod custom_fields;
pub mod http;
pub mod icons;
pub mod modal_frame;
pub mod modal_stack;
pub mod mount_guard;
