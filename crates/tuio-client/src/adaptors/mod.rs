//! Ready-made bundle processors

pub mod containment;

pub use containment::ContainmentAdaptor;
