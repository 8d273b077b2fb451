#![cfg_attr(test, allow(clippy::expect_used, clippy::panic))]

//! Session-gated view controller for the patient-supervisor support desk.
//!
//! One view is active at a time; activating a view triggers its bound data
//! load, loads degrade to static fallbacks where the availability policy
//! allows it, and every rendered region is a plain value tree that tests can
//! assert on directly.

pub mod controller;
pub mod notify;
pub mod regions;
pub mod render;
pub mod view;

pub use controller::{Dashboard, SUPERVISOR_DISPLAY_NAME};
pub use notify::{NOTICE_TTL, Notice, NoticeBoard, Severity};
pub use regions::{RegionData, Regions};
pub use render::{Command, Node, render};
pub use view::{Activation, LoadAction, SectionRouter, ViewName};
