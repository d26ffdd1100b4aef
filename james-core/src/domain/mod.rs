//! Core domain types
//!
//! A [`pipeline::Pipeline`] owns a set of [`job::Job`]s. Both import the
//! keys they have in common through [`record::ConfigRecord`].

pub mod job;
pub mod jobs;
pub mod pipeline;
pub mod record;
