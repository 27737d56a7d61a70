//! Client for the price symmetry HTTP API.

pub mod client;

pub use client::{
    ConvertResponse, PricePolicy, SdkError, SelfTestReport, SymmetryClient, ValidationResult,
};
