pub mod access_policy;
pub mod advisory;
pub mod config;
pub mod gateway;
pub mod gemini_api;
pub mod navigation;
pub mod session;
