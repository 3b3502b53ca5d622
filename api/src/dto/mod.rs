//! Request and response bodies of the HTTP endpoints

pub mod functions;

pub use functions::{GenerateCodeRequest, GenerateCodeResponse, VerifyCodeRequest};
