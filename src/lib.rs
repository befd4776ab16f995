//! Intake Bot - Conversational WhatsApp intake agent
//!
//! This crate collects a fixed set of issue-report fields from free-form,
//! multi-turn chat messages, confirms the record with the user and appends it
//! to a spreadsheet.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
